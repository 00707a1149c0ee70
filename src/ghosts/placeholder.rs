use super::GhostSource;
use crate::core::{FieldValues, Value};
use std::fmt;
use std::ops::Deref;

/// An entity produced by ghost materialization, tagged with whether it was
/// fetched from storage or synthesized as a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized<E> {
    entity: E,
    ghost: bool,
}

impl<E> Materialized<E> {
    pub fn stored(entity: E) -> Self {
        Self { entity, ghost: false }
    }

    pub(crate) fn placeholder(entity: E) -> Self {
        Self { entity, ghost: true }
    }

    /// True iff the entity was synthesized rather than fetched.
    pub fn is_ghost(&self) -> bool {
        self.ghost
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn into_inner(self) -> E {
        self.entity
    }
}

impl<E> Deref for Materialized<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.entity
    }
}

impl<E: fmt::Display> fmt::Display for Materialized<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.ghost {
            return self.entity.fmt(f);
        }
        let rendered = self.entity.to_string();
        match rendered.strip_prefix("#<") {
            Some(rest) => write!(f, "#<ghost {}", rest),
            None => write!(f, "ghost {}", rendered),
        }
    }
}

/// Merges query conditions with caller defaults. Defaults win on conflict.
pub fn merge_fields(conditions: FieldValues, defaults: &FieldValues) -> FieldValues {
    let mut fields = conditions;
    fields.extend(defaults.iter().map(|(name, value)| (name.clone(), value.clone())));
    fields
}

/// Builds placeholders for one materialization call.
///
/// Field precedence, lowest to highest: query conditions, caller defaults,
/// the key field set to the missing key.
#[derive(Debug, Clone)]
pub struct PlaceholderFactory {
    key_field: String,
    fields: FieldValues,
}

impl PlaceholderFactory {
    pub fn new(conditions: FieldValues, defaults: &FieldValues, key_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            fields: merge_fields(conditions, defaults),
        }
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn fields_for(&self, key: i64) -> FieldValues {
        let mut fields = self.fields.clone();
        fields.insert(self.key_field.clone(), Value::Integer(key));
        fields
    }

    /// A fresh, unsaved entity for `key`. Nothing is written to the source.
    pub fn build<S>(&self, source: &S, query: &S::Query, key: i64) -> Result<Materialized<S::Entity>, S::Error>
    where
        S: GhostSource + ?Sized,
    {
        source
            .new_entity(query, self.fields_for(key))
            .map(Materialized::placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fields;

    #[test]
    fn test_defaults_override_conditions() {
        let conditions = fields([("completed", Value::from(true)), ("user_id", Value::from(1))]);
        let defaults = fields([("completed", Value::from(false)), ("points", Value::from(50))]);

        let merged = merge_fields(conditions, &defaults);
        assert_eq!(merged["completed"], Value::Boolean(false));
        assert_eq!(merged["user_id"], Value::Integer(1));
        assert_eq!(merged["points"], Value::Integer(50));
    }

    #[test]
    fn test_key_field_overrides_everything() {
        let conditions = fields([("level", Value::from(9))]);
        let defaults = fields([("level", Value::from(10))]);

        let factory = PlaceholderFactory::new(conditions, &defaults, "level");
        assert_eq!(factory.fields_for(3)["level"], Value::Integer(3));
        assert_eq!(factory.fields_for(4)["level"], Value::Integer(4));
    }

    #[test]
    fn test_display_marks_ghosts() {
        struct Named(&'static str);
        impl fmt::Display for Named {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0)
            }
        }

        assert_eq!(Materialized::stored(Named("#<levels id: 1>")).to_string(), "#<levels id: 1>");
        assert_eq!(Materialized::placeholder(Named("#<levels id: nil>")).to_string(), "#<ghost levels id: nil>");
        assert_eq!(Materialized::placeholder(Named("level 2")).to_string(), "ghost level 2");
    }
}
