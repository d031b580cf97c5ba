use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::StorageBackend;
use crate::domain::{Key, Record, Rule, SchemaError};
use crate::schema::{DeletePolicy, Relationship, Schema};
use crate::validate::{check_cross_records, check_foreign_keys, check_record};

type Table = BTreeMap<Key, Record>;

/// Reference backend holding every table in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    schema: Option<Schema>,
    tables: BTreeMap<&'static str, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: &str, key: &Key) -> Option<&Record> {
        self.tables.get(entity)?.get(key)
    }

    pub fn count(&self, entity: &str) -> usize {
        self.tables.get(entity).map_or(0, BTreeMap::len)
    }

    pub fn records(&self, entity: &str) -> impl Iterator<Item = &Record> {
        self.tables.get(entity).into_iter().flat_map(BTreeMap::values)
    }

    fn schema(&self) -> Result<&Schema, SchemaError> {
        self.schema
            .as_ref()
            .ok_or_else(|| SchemaError::SchemaDefinition("schema has not been created".into()))
    }

    fn children<'a>(
        &'a self,
        rel: &'a Relationship,
        parent_key: &'a Key,
    ) -> impl Iterator<Item = &'a Key> + 'a {
        self.tables
            .get(rel.child)
            .into_iter()
            .flat_map(|table| table.iter())
            .filter(move |(_, record)| record.key(&rel.foreign_key) == *parent_key)
            .map(|(key, _)| key)
    }
}

impl StorageBackend for MemoryStore {
    fn create_schema(&mut self, schema: &Schema) -> Result<(), SchemaError> {
        match &self.schema {
            Some(existing) if existing == schema => return Ok(()),
            Some(_) if self.tables.values().any(|table| !table.is_empty()) => {
                return Err(SchemaError::SchemaDefinition(
                    "store already holds data for a different schema".into(),
                ));
            }
            _ => {}
        }

        self.tables = schema
            .entities()
            .iter()
            .map(|entity| (entity.name, Table::new()))
            .collect();
        self.schema = Some(schema.clone());
        info!(entities = schema.entities().len(), "schema created");
        Ok(())
    }

    fn insert(&mut self, entity: &str, record: Record) -> Result<(), SchemaError> {
        let schema = self.schema()?;
        let def = schema.require_entity(entity)?;
        let record = check_record(def, record)?;

        let key = record.key(def.primary_key.fields());
        let table = self.tables.get(def.name);
        if table.is_some_and(|rows| rows.contains_key(&key)) {
            return Err(SchemaError::violation(
                def.name,
                def.primary_key.fields().join(","),
                Rule::PrimaryKey,
                key.to_value(),
            ));
        }

        for unique in &def.unique {
            let candidate = record.key(&unique.fields);
            if candidate.has_null() {
                continue;
            }
            let clash = table
                .into_iter()
                .flat_map(BTreeMap::values)
                .any(|row| row.key(&unique.fields) == candidate);
            if clash {
                return Err(SchemaError::violation(
                    def.name,
                    unique.fields.join(","),
                    Rule::Unique(unique.name),
                    candidate.to_value(),
                ));
            }
        }

        check_foreign_keys(schema, def, &record, |parent, key| {
            self.get(parent, key).is_some()
        })?;
        check_cross_records(schema, def, &record, |entity, key| self.get(entity, key))?;

        let name = def.name;
        debug!(entity = name, %key, "record inserted");
        self.tables.entry(name).or_default().insert(key, record);
        Ok(())
    }

    fn delete(&mut self, entity: &str, key: &Key) -> Result<usize, SchemaError> {
        let schema = self.schema()?;
        let name = schema.require_entity(entity)?.name;
        if self.get(name, key).is_none() {
            return Err(SchemaError::NotFound {
                entity: name.to_string(),
                key: key.to_string(),
            });
        }

        // Everything reachable over cascade edges goes together.
        let mut doomed: BTreeSet<(&'static str, Key)> = BTreeSet::new();
        let mut pending = vec![(name, key.clone())];
        doomed.insert((name, key.clone()));
        while let Some((parent, parent_key)) = pending.pop() {
            for rel in schema.children_of(parent) {
                if rel.on_delete != DeletePolicy::Cascade {
                    continue;
                }
                for child_key in self.children(rel, &parent_key) {
                    if doomed.insert((rel.child, child_key.clone())) {
                        pending.push((rel.child, child_key.clone()));
                    }
                }
            }
        }

        // A restrict edge only blocks if the child survives this delete.
        for (parent, parent_key) in &doomed {
            for rel in schema.children_of(parent) {
                if rel.on_delete != DeletePolicy::Restrict {
                    continue;
                }
                let survivor = self
                    .children(rel, parent_key)
                    .any(|child_key| !doomed.contains(&(rel.child, child_key.clone())));
                if survivor {
                    return Err(SchemaError::RestrictedDeletion {
                        entity: parent.to_string(),
                        key: parent_key.to_string(),
                        child: rel.child.to_string(),
                    });
                }
            }
        }

        let removed = doomed.len();
        for (owner, doomed_key) in doomed {
            if let Some(table) = self.tables.get_mut(owner) {
                table.remove(&doomed_key);
            }
        }
        debug!(entity = name, %key, removed, "record deleted");
        Ok(removed)
    }

    fn within_transaction<T, F>(&mut self, f: F) -> Result<T, SchemaError>
    where
        F: FnOnce(&mut Self) -> Result<T, SchemaError>,
    {
        let snapshot = self.tables.clone();
        let result = f(self);
        if let Err(err) = &result {
            self.tables = snapshot;
            debug!(error = %err, "transaction rolled back");
        }
        result
    }
}
