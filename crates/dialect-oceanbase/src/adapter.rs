use oblink_core::{
    Capability, CapabilitySet, ClientError, Column, ConnectionConfig, Connector, DatabaseAdapter,
    Error, ExecutionError, RawColumnDescriptor, Result, RowFormat, Rows, Version, WireClient,
    parse_server_version,
};
use tracing::info;

use crate::{capability, column::normalize_column, export_queries, session::configure_connection};

pub const ADAPTER_NAME: &str = "Oceanbase";

/// One OceanBase session: owns its connection and rebuilds it on reconnect.
pub struct OceanbaseAdapter {
    connector: Box<dyn Connector>,
    config: ConnectionConfig,
    client: Option<Box<dyn WireClient>>,
    full_version: Option<String>,
    capabilities: Option<CapabilitySet>,
}

impl OceanbaseAdapter {
    /// Takes over a freshly built client and configures its session.
    pub(crate) fn from_client(
        connector: Box<dyn Connector>,
        config: ConnectionConfig,
        mut client: Box<dyn WireClient>,
    ) -> Result<Self> {
        configure_connection(client.as_mut(), &config)?;
        info!(
            host = config.host.as_deref().unwrap_or_default(),
            database = config.database.as_deref().unwrap_or_default(),
            "oceanbase session configured"
        );

        Ok(Self {
            connector,
            config,
            client: Some(client),
            full_version: None,
            capabilities: None,
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Server version string, fetched once per connection.
    pub fn full_version(&mut self) -> Result<String> {
        if let Some(full_version) = &self.full_version {
            return Ok(full_version.clone());
        }

        let full_version = self.client_mut()?.server_version()?;
        self.full_version = Some(full_version.clone());
        Ok(full_version)
    }

    pub fn capabilities(&mut self) -> Result<CapabilitySet> {
        if let Some(capabilities) = self.capabilities {
            return Ok(capabilities);
        }

        let capabilities = capability::resolve_capabilities(&self.full_version()?);
        self.capabilities = Some(capabilities);
        Ok(capabilities)
    }

    pub fn error_number(&self, error: &Error) -> Option<u16> {
        error.error_number()
    }

    fn connect(&mut self) -> Result<()> {
        let options = self.config.client_options()?;
        let mut client = self.connector.connect(&options)?;
        configure_connection(client.as_mut(), &self.config)?;
        self.client = Some(client);
        info!(
            host = self.config.host.as_deref().unwrap_or_default(),
            database = self.config.database.as_deref().unwrap_or_default(),
            "oceanbase session reconnected"
        );
        Ok(())
    }

    fn client_mut(&mut self) -> Result<&mut Box<dyn WireClient>> {
        self.client.as_mut().ok_or(Error::NotConnected)
    }
}

impl DatabaseAdapter for OceanbaseAdapter {
    fn adapter_name(&self) -> &str {
        ADAPTER_NAME
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.client_mut()?
            .execute(sql)
            .map_err(|source| execution_error(sql, source))
    }

    fn select_rows(&mut self, sql: &str) -> Result<Rows> {
        self.client_mut()?
            .query(sql)
            .map_err(|source| execution_error(sql, source))
    }

    fn columns(&mut self, table_name: &str) -> Result<Vec<Column>> {
        let sql = export_queries::show_full_fields_query(table_name);
        let rows = self
            .client_mut()?
            .query_as(&sql, RowFormat::Keyed)
            .map_err(|source| execution_error(&sql, source))?;

        // Clients always honor the requested format; positional rows carry no names.
        let Rows::Keyed(rows) = rows else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .map(|row| normalize_column(table_name, &RawColumnDescriptor::from_row(row)))
            .collect())
    }

    fn quote_string(&self, raw: &str) -> Result<String> {
        self.client
            .as_ref()
            .map(|client| client.quote_string(raw))
            .ok_or(Error::NotConnected)
    }

    fn supports(&mut self, capability: Capability) -> Result<bool> {
        if let Some(supported) = capability::static_support(capability) {
            return Ok(supported);
        }
        Ok(self.capabilities()?.supports(capability))
    }

    fn get_advisory_lock(&mut self, lock_name: &str, timeout_seconds: i64) -> bool {
        capability::get_advisory_lock(lock_name, timeout_seconds)
    }

    fn release_advisory_lock(&mut self, lock_name: &str) -> bool {
        capability::release_advisory_lock(lock_name)
    }

    fn is_active(&mut self) -> bool {
        self.client.as_mut().is_some_and(|client| client.ping())
    }

    fn reconnect(&mut self) -> Result<()> {
        self.disconnect();
        self.connect()
    }

    fn disconnect(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.close();
            info!(
                host = self.config.host.as_deref().unwrap_or_default(),
                "oceanbase connection closed"
            );
        }
        self.full_version = None;
        self.capabilities = None;
    }

    fn server_version(&mut self) -> Result<Version> {
        let full_version = self.full_version()?;
        parse_server_version(&full_version).ok_or_else(|| {
            Error::Client(ClientError::new(format!(
                "failed to parse server version string: `{full_version}`"
            )))
        })
    }

    fn prepared_statements(&self) -> bool {
        self.config.prepared_statements()
    }
}

fn execution_error(sql: &str, source: ClientError) -> Error {
    ExecutionError::query_failed(sql, source).into()
}
