use oblink_core::{Column, ColumnType, RawColumnDescriptor, fetch_type_metadata};

const CURRENT_TIMESTAMP: &str = "CURRENT_TIMESTAMP";
const CURRENT_TIMESTAMP_CALL: &str = "CURRENT_TIMESTAMP()";
// OceanBase reports a missing default or collation as the text `NULL`.
const NULL_LITERAL: &str = "NULL";

pub fn normalize_column(table_name: &str, raw: &RawColumnDescriptor) -> Column {
    let type_metadata = fetch_type_metadata(&raw.sql_type, &raw.extra);

    let (default, default_function) = if type_metadata.category == ColumnType::Datetime
        && raw.default.as_deref().is_some_and(is_current_timestamp)
    {
        (None, Some(CURRENT_TIMESTAMP.to_string()))
    } else {
        (raw.default.clone(), None)
    };

    Column {
        name: raw.field.clone(),
        table_name: table_name.to_string(),
        type_metadata,
        default: default.filter(|value| value != NULL_LITERAL),
        default_function,
        null: raw.null == "YES",
        collation: raw
            .collation
            .clone()
            .filter(|collation| collation != NULL_LITERAL),
        comment: raw
            .comment
            .clone()
            .filter(|comment| !comment.trim().is_empty()),
    }
}

fn is_current_timestamp(literal: &str) -> bool {
    literal.eq_ignore_ascii_case(CURRENT_TIMESTAMP)
        || literal.eq_ignore_ascii_case(CURRENT_TIMESTAMP_CALL)
}
