pub(crate) const SHOW_SERVER_VERSION_QUERY: &str = "SELECT VERSION()";

pub(crate) fn show_full_fields_query(table_name: &str) -> String {
    format!("SHOW FULL FIELDS FROM {}", quote_table_name(table_name))
}

/// `schema.table` is quoted part by part.
pub(crate) fn quote_table_name(table_name: &str) -> String {
    table_name
        .split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}
