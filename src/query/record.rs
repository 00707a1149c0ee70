use crate::core::{FieldValues, RowId, Value};
use std::fmt;

/// A row of a table, either fetched from storage or built in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    table: String,
    id: Option<RowId>,
    fields: FieldValues,
}

impl Record {
    pub fn stored(table: impl Into<String>, id: RowId, fields: FieldValues) -> Self {
        Self {
            table: table.into(),
            id: Some(id),
            fields,
        }
    }

    /// A record that has never been saved and has no row id.
    pub fn transient(table: impl Into<String>, fields: FieldValues) -> Self {
        Self {
            table: table.into(),
            id: None,
            fields,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id(&self) -> Option<RowId> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    pub fn fields(&self) -> &FieldValues {
        &self.fields
    }

    pub fn into_fields(self) -> FieldValues {
        self.fields
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{} id: ", self.table)?;
        match self.id {
            Some(id) => write!(f, "{}", id)?,
            None => write!(f, "nil")?,
        }
        for (name, value) in &self.fields {
            match value {
                Value::Null => write!(f, ", {}: nil", name)?,
                Value::Text(s) => write!(f, ", {}: {:?}", name, s)?,
                other => write!(f, ", {}: {}", name, other)?,
            }
        }
        write!(f, ">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_renders_fields_in_name_order() {
        let mut fields = FieldValues::new();
        fields.insert("paid".into(), Value::Boolean(true));
        fields.insert("number".into(), Value::Integer(1));
        fields.insert("note".into(), Value::from("first"));
        fields.insert("amount".into(), Value::Null);

        let record = Record::stored("invoices", 3, fields.clone());
        assert_eq!(
            record.to_string(),
            r#"#<invoices id: 3, amount: nil, note: "first", number: 1, paid: true>"#
        );

        let record = Record::transient("invoices", fields);
        assert!(record.to_string().starts_with("#<invoices id: nil,"));
        assert!(!record.is_persisted());
    }
}
