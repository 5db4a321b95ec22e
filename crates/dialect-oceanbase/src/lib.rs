mod adapter;
mod capability;
mod client;
mod column;
mod export_queries;
mod factory;
mod session;

use oblink_core::{AdapterRegistry, Connector, DatabaseAdapter, Dialect, RawConfig, Result};

pub use adapter::{ADAPTER_NAME, OceanbaseAdapter};
pub use capability::{
    get_advisory_lock, is_mariadb, release_advisory_lock, resolve_capabilities, static_support,
};
pub use client::MysqlConnector;
pub use column::normalize_column;
pub use factory::{classify_connect_error, establish, oceanbase_connection, prepare_config};
pub use session::{
    DEFAULT_WAIT_TIMEOUT_SECONDS, SessionPlan, apply_session, plan_session, sql_mode_expression,
};

pub const REGISTRY_NAME: &str = "oceanbase";

#[derive(Debug, Default, Clone, Copy)]
pub struct OceanbaseDialect;

impl Dialect for OceanbaseDialect {
    fn name(&self) -> &str {
        REGISTRY_NAME
    }

    fn connector(&self) -> Box<dyn Connector> {
        Box::new(MysqlConnector)
    }

    fn establish(
        &self,
        connector: Box<dyn Connector>,
        config: &RawConfig,
    ) -> Result<Box<dyn DatabaseAdapter>> {
        let adapter = establish(connector, config)?;
        Ok(Box::new(adapter))
    }
}

/// Adds the `oceanbase` adapter to a caller-owned registry.
pub fn register(registry: &mut AdapterRegistry) {
    registry.register(REGISTRY_NAME, oceanbase_connection);
}

pub fn show_full_fields_query(table_name: &str) -> String {
    export_queries::show_full_fields_query(table_name)
}
