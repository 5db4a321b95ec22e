use oblink_core::{
    ClientError, ConnectionConfig, Connector, DatabaseAdapter, Error, RawConfig, Result,
};
use tracing::warn;

use crate::{adapter::OceanbaseAdapter, client::MysqlConnector};

// Matched against the client's message. If the client ever exposes a stable
// error code for this condition (MySQL 1049), switch to checking that instead.
const UNKNOWN_DATABASE_MARKER: &str = "Unknown database";

/// Normalizes caller options and requests matched-row counts from the server.
pub fn prepare_config(raw: &RawConfig) -> Result<ConnectionConfig> {
    let mut config = ConnectionConfig::from_raw(raw)?;
    config.flags = std::mem::take(&mut config.flags).with_found_rows();
    Ok(config)
}

/// Builds a configured adapter on top of any wire client implementation.
pub fn establish(connector: Box<dyn Connector>, raw: &RawConfig) -> Result<OceanbaseAdapter> {
    let config = prepare_config(raw)?;
    let options = config.client_options()?;
    let client = connector
        .connect(&options)
        .map_err(|source| classify_connect_error(config.database.as_deref(), source))?;

    OceanbaseAdapter::from_client(connector, config, client)
}

/// Entry point registered under the `oceanbase` adapter name.
pub fn oceanbase_connection(raw: &RawConfig) -> Result<Box<dyn DatabaseAdapter>> {
    let adapter = establish(Box::new(MysqlConnector), raw)?;
    Ok(Box::new(adapter))
}

pub fn classify_connect_error(database: Option<&str>, source: ClientError) -> Error {
    if !source.message.contains(UNKNOWN_DATABASE_MARKER) {
        return Error::Client(source);
    }

    warn!(
        database = database.unwrap_or_default(),
        error = %source,
        "oceanbase rejected the configured database"
    );
    Error::NoDatabase {
        database: database.map(str::to_string),
        source,
    }
}
