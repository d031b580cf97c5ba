use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use super::contract::{CrossCheck, EntityDef, PrimaryKey, Relationship, Schema};
use crate::domain::{FieldType, SchemaError};

/// Collects entity definitions and relationships and checks them into an
/// immutable [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entities: Vec<EntityDef>,
    relationships: Vec<Relationship>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(mut self, entity: EntityDef) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut warnings = Vec::new();
        let mut seen_entities = HashSet::new();

        for entity in &self.entities {
            if !seen_entities.insert(entity.name) {
                return Err(definition(format!("entity '{}' is declared twice", entity.name)));
            }
            check_entity(entity, &mut warnings)?;
        }

        let mut seen_relationships = HashSet::new();
        for rel in &self.relationships {
            if !seen_relationships.insert(rel.name) {
                return Err(definition(format!("relationship '{}' is declared twice", rel.name)));
            }
            check_relationship(&self.entities, rel)?;
        }

        for entity in &self.entities {
            for cross in &entity.cross_checks {
                check_cross_check(&self.entities, entity, cross)?;
            }
        }

        debug!(
            entities = self.entities.len(),
            relationships = self.relationships.len(),
            warnings = warnings.len(),
            "schema built"
        );

        Ok(Schema {
            entities: self.entities,
            relationships: self.relationships,
            warnings,
        })
    }
}

fn definition(message: String) -> SchemaError {
    SchemaError::SchemaDefinition(message)
}

fn require_field(entity: &EntityDef, field: &str, context: &str) -> Result<(), SchemaError> {
    if entity.field(field).is_some() {
        Ok(())
    } else {
        Err(definition(format!(
            "{context} references undefined field {}.{field}",
            entity.name
        )))
    }
}

fn find<'a>(entities: &'a [EntityDef], name: &str, context: &str) -> Result<&'a EntityDef, SchemaError> {
    entities
        .iter()
        .find(|entity| entity.name == name)
        .ok_or_else(|| definition(format!("{context} references undefined entity '{name}'")))
}

fn check_entity(entity: &EntityDef, warnings: &mut Vec<String>) -> Result<(), SchemaError> {
    let mut names = HashSet::new();
    for field in &entity.fields {
        if !names.insert(field.name) {
            return Err(definition(format!(
                "field {}.{} is declared twice",
                entity.name, field.name
            )));
        }
        if field.variant.is_some() && entity.discriminator.is_none() {
            return Err(definition(format!(
                "variant field {}.{} on an entity without a discriminator",
                entity.name, field.name
            )));
        }
        if field.scale.is_some() && field.ty != FieldType::Decimal {
            return Err(definition(format!(
                "scale declared on non-decimal field {}.{}",
                entity.name, field.name
            )));
        }
    }

    match &entity.primary_key {
        PrimaryKey::Single(field) => require_field(entity, field, "primary key")?,
        PrimaryKey::Composite(fields) => {
            if fields.len() < 2 {
                return Err(definition(format!(
                    "composite key of '{}' needs at least two fields, got {}",
                    entity.name,
                    fields.len()
                )));
            }
            for field in fields {
                require_field(entity, field, "composite key")?;
            }
        }
    }

    let mut unique_sets: Vec<(BTreeSet<&str>, &str)> = Vec::new();
    for unique in &entity.unique {
        if unique.fields.is_empty() {
            return Err(definition(format!("unique constraint '{}' has no fields", unique.name)));
        }
        for field in &unique.fields {
            require_field(entity, field, unique.name)?;
        }

        let set: BTreeSet<&str> = unique.fields.iter().copied().collect();
        if let Some((_, earlier)) = unique_sets.iter().find(|(other, _)| *other == set) {
            let message = format!(
                "unique constraint '{}' on {} duplicates '{}'",
                unique.name, entity.name, earlier
            );
            warn!(entity = entity.name, constraint = unique.name, "redundant unique constraint");
            warnings.push(message);
        } else {
            unique_sets.push((set, unique.name));
        }
    }

    for check in &entity.checks {
        for field in check.predicate.fields() {
            require_field(entity, field, check.name)?;
        }
    }

    if let Some(discriminator) = &entity.discriminator {
        let field = entity.field(discriminator.field).ok_or_else(|| {
            definition(format!(
                "discriminator references undefined field {}.{}",
                entity.name, discriminator.field
            ))
        })?;
        if field.ty != FieldType::Text || field.nullable {
            return Err(definition(format!(
                "discriminator {}.{} must be a required text field",
                entity.name, discriminator.field
            )));
        }
        if discriminator.variants.is_empty() {
            return Err(definition(format!(
                "discriminator on '{}' declares no variants",
                entity.name
            )));
        }
    }

    Ok(())
}

fn check_relationship(entities: &[EntityDef], rel: &Relationship) -> Result<(), SchemaError> {
    let parent = find(entities, rel.parent, rel.name)?;
    let child = find(entities, rel.child, rel.name)?;

    for field in &rel.foreign_key {
        require_field(child, field, rel.name)?;
    }

    let key_len = parent.primary_key.fields().len();
    if rel.foreign_key.len() != key_len {
        return Err(definition(format!(
            "relationship '{}' has {} foreign key fields but {} has a {}-field key",
            rel.name,
            rel.foreign_key.len(),
            parent.name,
            key_len
        )));
    }

    Ok(())
}

fn check_cross_check(
    entities: &[EntityDef],
    entity: &EntityDef,
    cross: &CrossCheck,
) -> Result<(), SchemaError> {
    match cross {
        CrossCheck::AnswerMatchesVariant {
            name,
            question_entity,
            question_fk,
            selected_field,
            boolean_field,
        } => {
            for field in [question_fk, selected_field, boolean_field] {
                require_field(entity, field, name)?;
            }
            let question = find(entities, question_entity, name)?;
            if question.discriminator.is_none() {
                return Err(definition(format!(
                    "'{name}' needs '{question_entity}' to carry a discriminator"
                )));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DeletePolicy, FieldDef, UniqueConstraint};

    fn person(name: &'static str) -> EntityDef {
        EntityDef::new(
            name,
            PrimaryKey::Single("id"),
            vec![
                FieldDef::required("id", FieldType::Int),
                FieldDef::required("email", FieldType::Text),
            ],
        )
    }

    #[test]
    fn relationship_to_undefined_entity_fails() {
        let err = SchemaBuilder::new()
            .entity(person("students"))
            .relationship(Relationship::new(
                "fk_attempts_student",
                "students",
                "exam_attempts",
                &["student_id"],
                DeletePolicy::Restrict,
            ))
            .build()
            .expect_err("undefined child should fail");

        assert!(matches!(err, SchemaError::SchemaDefinition(msg) if msg.contains("exam_attempts")));
    }

    #[test]
    fn relationship_to_undefined_field_fails() {
        let err = SchemaBuilder::new()
            .entity(person("students"))
            .entity(person("notes"))
            .relationship(Relationship::new(
                "fk_notes_student",
                "students",
                "notes",
                &["student_id"],
                DeletePolicy::Cascade,
            ))
            .build()
            .expect_err("undefined fk field should fail");

        assert!(matches!(err, SchemaError::SchemaDefinition(msg) if msg.contains("notes.student_id")));
    }

    #[test]
    fn scale_on_text_field_fails() {
        let entity = EntityDef::new(
            "courses",
            PrimaryKey::Single("id"),
            vec![
                FieldDef::required("id", FieldType::Int),
                FieldDef::required("title", FieldType::Text).scale(2),
            ],
        );

        let err = SchemaBuilder::new()
            .entity(entity)
            .build()
            .expect_err("scale only applies to decimals");

        assert!(matches!(err, SchemaError::SchemaDefinition(msg) if msg.contains("courses.title")));
    }

    #[test]
    fn composite_key_with_one_field_fails() {
        let entity = EntityDef::new(
            "student_courses",
            PrimaryKey::Composite(vec!["student_id"]),
            vec![FieldDef::required("student_id", FieldType::Int)],
        );

        let err = SchemaBuilder::new()
            .entity(entity)
            .build()
            .expect_err("single-field composite should fail");

        assert!(matches!(err, SchemaError::SchemaDefinition(_)));
    }

    #[test]
    fn redundant_unique_constraint_is_a_warning() {
        let entity = person("instructors")
            .unique(UniqueConstraint::new("ux_instructors_email", &["email"]))
            .unique(UniqueConstraint::new("ux_instructors_email_again", &["email"]));

        let schema = SchemaBuilder::new()
            .entity(entity)
            .build()
            .expect("redundancy is not fatal");

        assert_eq!(schema.warnings().len(), 1);
        assert!(schema.warnings()[0].contains("ux_instructors_email_again"));
    }
}
