use crate::{Capability, Column, Result, Rows, Version};

/// A connected dialect adapter. Every method that touches the connection takes
/// `&mut self`; one adapter serves one caller at a time.
pub trait DatabaseAdapter {
    fn adapter_name(&self) -> &str;

    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Rows in the session's current materialization mode.
    fn select_rows(&mut self, sql: &str) -> Result<Rows>;

    fn columns(&mut self, table_name: &str) -> Result<Vec<Column>>;

    fn quote_string(&self, raw: &str) -> Result<String>;

    fn supports(&mut self, capability: Capability) -> Result<bool>;

    fn get_advisory_lock(&mut self, lock_name: &str, timeout_seconds: i64) -> bool;

    fn release_advisory_lock(&mut self, lock_name: &str) -> bool;

    fn is_active(&mut self) -> bool;

    fn reconnect(&mut self) -> Result<()>;

    fn reset(&mut self) -> Result<()> {
        self.reconnect()
    }

    fn disconnect(&mut self);

    fn server_version(&mut self) -> Result<Version>;

    fn prepared_statements(&self) -> bool;
}
