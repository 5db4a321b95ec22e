use std::collections::BTreeMap;

use crate::{ClientError, SessionValue};

/// Options handed to a [`Connector`] when a fresh client is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub socket: Option<String>,
    pub flags: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowFormat {
    /// Columns are addressed by index.
    #[default]
    Positional,
    /// Columns are addressed by name.
    Keyed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Textual rendering of a non-null value; invalid UTF-8 is replaced lossily.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Int(value) => Some(value.to_string()),
            Self::UInt(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Bytes(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Bytes(value.as_bytes().to_vec())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    Positional(Vec<Vec<Value>>),
    Keyed(Vec<BTreeMap<String, Value>>),
}

impl Rows {
    /// Materializes wire rows in the requested shape.
    pub fn materialize(format: RowFormat, columns: &[String], rows: Vec<Vec<Value>>) -> Self {
        match format {
            RowFormat::Positional => Self::Positional(rows),
            RowFormat::Keyed => Self::Keyed(
                rows.into_iter()
                    .map(|row| columns.iter().cloned().zip(row).collect())
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Positional(rows) => rows.len(),
            Self::Keyed(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// String quoting backed by the wire client's own escape routine.
pub trait Quoter {
    /// Escapes `raw` for embedding between single quotes.
    fn escape_string(&self, raw: &str) -> String;

    fn quote_string(&self, raw: &str) -> String {
        format!("'{}'", self.escape_string(raw))
    }

    fn quote(&self, value: &SessionValue) -> String {
        match value {
            SessionValue::Default => "DEFAULT".to_string(),
            SessionValue::Null => "NULL".to_string(),
            SessionValue::Bool(true) => "TRUE".to_string(),
            SessionValue::Bool(false) => "FALSE".to_string(),
            SessionValue::Integer(value) => value.to_string(),
            SessionValue::Float(value) => value.to_string(),
            SessionValue::Text(value) => self.quote_string(value),
        }
    }
}

/// One live connection of the underlying MySQL-wire client.
pub trait WireClient: Quoter {
    fn execute(&mut self, sql: &str) -> Result<(), ClientError>;

    fn query_as(&mut self, sql: &str, format: RowFormat) -> Result<Rows, ClientError>;

    fn query(&mut self, sql: &str) -> Result<Rows, ClientError> {
        let format = self.row_format();
        self.query_as(sql, format)
    }

    fn row_format(&self) -> RowFormat;

    fn set_row_format(&mut self, format: RowFormat);

    fn ping(&mut self) -> bool;

    /// Version string the server reports, e.g. `5.7.25-OceanBase_CE-v4.2.1.0`.
    fn server_version(&mut self) -> Result<String, ClientError>;

    /// Closes the handle. Closing twice is a no-op.
    fn close(&mut self);
}

pub trait Connector {
    fn connect(&self, options: &ClientOptions) -> Result<Box<dyn WireClient>, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::{Quoter, RowFormat, Rows, Value};
    use crate::SessionValue;

    struct DoublingQuoter;

    impl Quoter for DoublingQuoter {
        fn escape_string(&self, raw: &str) -> String {
            raw.replace('\'', "''")
        }
    }

    #[test]
    fn quote_renders_each_session_value_kind() {
        let quoter = DoublingQuoter;

        assert_eq!(quoter.quote(&SessionValue::Integer(0)), "0");
        assert_eq!(quoter.quote(&SessionValue::Bool(true)), "TRUE");
        assert_eq!(quoter.quote(&SessionValue::Float(0.5)), "0.5");
        assert_eq!(quoter.quote(&SessionValue::Default), "DEFAULT");
        assert_eq!(
            quoter.quote(&SessionValue::Text("it's".to_string())),
            "'it''s'"
        );
    }

    #[test]
    fn keyed_materialization_pairs_columns_with_values() {
        let columns = vec!["Field".to_string(), "Null".to_string()];
        let rows = Rows::materialize(
            RowFormat::Keyed,
            &columns,
            vec![vec![Value::from("id"), Value::from("NO")]],
        );

        let Rows::Keyed(rows) = rows else {
            panic!("keyed format must produce keyed rows");
        };
        assert_eq!(rows[0].get("Field"), Some(&Value::from("id")));
        assert_eq!(rows[0].get("Null"), Some(&Value::from("NO")));
    }
}
