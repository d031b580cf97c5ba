use async_trait::async_trait;
use examhall_core::domain::{EntityRecord, Question, QuestionId};
use examhall_core::seed::SeedSet;
use examhall_core::validate::{check_cross_records, check_foreign_keys, check_record, validate};
use examhall_core::{Key, Record, Rule, Schema, SchemaError};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{debug, info};

use crate::error::Result;
use crate::mapping::{self, Table};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Checks `record` against the schema and the stored parents, then writes it.
    async fn insert(&self, entity: &str, record: Record) -> Result<()>;

    /// Deletes one record; returns the number of rows removed from `entity`'s
    /// own table. Cascaded children are removed by the database.
    async fn delete(&self, entity: &str, key: &Key) -> Result<u64>;

    /// Validates and inserts a whole seed set in one transaction.
    async fn load(&self, seed: SeedSet) -> Result<usize>;

    async fn get(&self, entity: &str, key: &Key) -> Result<Option<Record>>;

    async fn count(&self, entity: &str) -> Result<u64>;

    async fn insert_entity<E>(&self, entity: &E) -> Result<()>
    where
        E: EntityRecord + Sync,
    {
        self.insert(E::ENTITY, entity.to_record()).await
    }
}

#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    schema: Schema,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection, schema: Schema) -> Self {
        Self { db, schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Reads a question back as its discriminated variant.
    pub async fn question(&self, id: QuestionId) -> Result<Option<Question>> {
        let key = Key::single(id);
        let record = mapping::fetch(&self.db, Table::Questions, &key).await?;
        Ok(record.map(|r| Question::from_record(&r)).transpose()?)
    }

    async fn insert_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        entity: &str,
        record: Record,
    ) -> Result<()> {
        let def = self.schema.require_entity(entity)?;
        let table = Table::parse(def.name)?;
        let record = check_record(def, record)?;

        let key = record.key(def.primary_key.fields());
        if mapping::fetch(conn, table, &key).await?.is_some() {
            return Err(SchemaError::violation(
                def.name,
                def.primary_key.fields().join(","),
                Rule::PrimaryKey,
                key.to_value(),
            )
            .into());
        }

        for unique in &def.unique {
            let taken = record.key(&unique.fields);
            if taken.has_null() {
                continue;
            }
            if mapping::taken(conn, table, &unique.fields, &taken).await? {
                return Err(SchemaError::violation(
                    def.name,
                    unique.fields.join(","),
                    Rule::Unique(unique.name),
                    taken.to_value(),
                )
                .into());
            }
        }

        let mut parents: Vec<(&'static str, Key, Record)> = Vec::new();
        for rel in self.schema.parents_of(def.name) {
            let fk = record.key(&rel.foreign_key);
            if fk.has_null() {
                continue;
            }
            if let Some(parent) = mapping::fetch(conn, Table::parse(rel.parent)?, &fk).await? {
                parents.push((rel.parent, fk, parent));
            }
        }
        let lookup = |entity: &str, key: &Key| {
            parents
                .iter()
                .find(|(parent, fk, _)| *parent == entity && fk == key)
                .map(|(_, _, record)| record)
        };
        check_foreign_keys(&self.schema, def, &record, |entity, key| {
            lookup(entity, key).is_some()
        })?;
        check_cross_records(&self.schema, def, &record, lookup)?;

        mapping::insert(conn, table, &record).await?;
        debug!(entity = def.name, key = %key, "record inserted");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SeaOrmStore {
    async fn insert(&self, entity: &str, record: Record) -> Result<()> {
        self.insert_on(&self.db, entity, record).await
    }

    async fn delete(&self, entity: &str, key: &Key) -> Result<u64> {
        let table = Table::parse(entity)?;
        let removed = mapping::delete(&self.db, table, key).await?;
        if removed == 0 {
            return Err(SchemaError::NotFound {
                entity: entity.to_string(),
                key: key.to_string(),
            }
            .into());
        }
        info!(entity, key = %key, "record deleted");
        Ok(removed)
    }

    async fn load(&self, seed: SeedSet) -> Result<usize> {
        validate(&self.schema, &seed)?;

        let total = seed.len();
        let txn = self.db.begin().await?;
        for (entity, record) in seed {
            self.insert_on(&txn, entity, record).await?;
        }
        txn.commit().await?;

        info!(records = total, "seed dataset loaded");
        Ok(total)
    }

    async fn get(&self, entity: &str, key: &Key) -> Result<Option<Record>> {
        mapping::fetch(&self.db, Table::parse(entity)?, key).await
    }

    async fn count(&self, entity: &str) -> Result<u64> {
        mapping::count(&self.db, Table::parse(entity)?).await
    }
}
