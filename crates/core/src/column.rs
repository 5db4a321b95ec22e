use std::collections::BTreeMap;

use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Boolean,
    Integer,
    Decimal,
    Float,
    String,
    Text,
    Binary,
    Date,
    Datetime,
    Time,
    Json,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetadata {
    pub sql_type: String,
    pub category: ColumnType,
    pub extra: String,
    pub limit: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub unsigned: bool,
}

impl TypeMetadata {
    pub fn auto_increment(&self) -> bool {
        self.extra.to_ascii_lowercase().contains("auto_increment")
    }
}

/// Resolves a MySQL-family column type string such as `decimal(10,2) unsigned`.
pub fn fetch_type_metadata(sql_type: &str, extra: &str) -> TypeMetadata {
    let lowered = sql_type.trim().to_ascii_lowercase();
    let base_end = lowered
        .find(|ch: char| ch == '(' || ch.is_whitespace())
        .unwrap_or(lowered.len());
    let base = &lowered[..base_end];
    let params = type_parameters(&lowered);
    let first = params.first().copied();

    let category = match base {
        "tinyint" if first == Some(1) => ColumnType::Boolean,
        "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "year" => {
            ColumnType::Integer
        }
        "decimal" | "numeric" | "dec" | "fixed" => ColumnType::Decimal,
        "float" | "double" | "real" => ColumnType::Float,
        "char" | "varchar" | "enum" | "set" => ColumnType::String,
        "tinytext" | "text" | "mediumtext" | "longtext" => ColumnType::Text,
        "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" | "bit" => {
            ColumnType::Binary
        }
        "date" => ColumnType::Date,
        "datetime" | "timestamp" => ColumnType::Datetime,
        "time" => ColumnType::Time,
        "json" => ColumnType::Json,
        _ => ColumnType::Other,
    };

    let (limit, precision, scale) = match category {
        ColumnType::Integer | ColumnType::Boolean => (integer_byte_width(base), None, None),
        ColumnType::Decimal | ColumnType::Float => (None, first, params.get(1).copied()),
        ColumnType::Datetime | ColumnType::Time => (None, first, None),
        ColumnType::String | ColumnType::Binary if base != "enum" && base != "set" => {
            (first, None, None)
        }
        _ => (None, None, None),
    };

    TypeMetadata {
        sql_type: sql_type.trim().to_string(),
        category,
        extra: extra.to_string(),
        limit,
        precision,
        scale,
        unsigned: lowered.split_whitespace().any(|word| word == "unsigned"),
    }
}

fn type_parameters(lowered: &str) -> Vec<u32> {
    let Some(open) = lowered.find('(') else {
        return Vec::new();
    };
    let Some(close) = lowered[open..].find(')') else {
        return Vec::new();
    };
    lowered[open + 1..open + close]
        .split(',')
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .collect()
}

fn integer_byte_width(base: &str) -> Option<u32> {
    match base {
        "tinyint" => Some(1),
        "smallint" => Some(2),
        "mediumint" => Some(3),
        "int" | "integer" => Some(4),
        "bigint" => Some(8),
        _ => None,
    }
}

/// One row of `SHOW FULL FIELDS`, exactly as the server reported it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawColumnDescriptor {
    pub field: String,
    pub sql_type: String,
    pub collation: Option<String>,
    pub null: String,
    pub key: String,
    pub default: Option<String>,
    pub extra: String,
    pub privileges: String,
    pub comment: Option<String>,
}

impl RawColumnDescriptor {
    pub fn from_row(row: &BTreeMap<String, Value>) -> Self {
        let text = |name: &str| row.get(name).and_then(Value::to_text);

        Self {
            field: text("Field").unwrap_or_default(),
            sql_type: text("Type").unwrap_or_default(),
            collation: text("Collation"),
            null: text("Null").unwrap_or_default(),
            key: text("Key").unwrap_or_default(),
            default: text("Default"),
            extra: text("Extra").unwrap_or_default(),
            privileges: text("Privileges").unwrap_or_default(),
            comment: text("Comment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub table_name: String,
    pub type_metadata: TypeMetadata,
    pub default: Option<String>,
    pub default_function: Option<String>,
    pub null: bool,
    pub collation: Option<String>,
    pub comment: Option<String>,
}

impl Column {
    pub fn category(&self) -> ColumnType {
        self.type_metadata.category
    }
}
