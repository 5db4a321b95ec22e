mod adapter;
mod capability;
mod client;
mod column;
mod config;
mod dialect;
mod error;
mod registry;
mod version;

pub use adapter::DatabaseAdapter;
pub use capability::{Capability, CapabilitySet};
pub use client::{ClientOptions, Connector, Quoter, RowFormat, Rows, Value, WireClient};
pub use column::{Column, ColumnType, RawColumnDescriptor, TypeMetadata, fetch_type_metadata};
pub use config::{
    ClientFlags, ConfigValue, ConnectionConfig, DEFAULT_SENTINELS, RawConfig, SessionValue,
    SessionVariables, StrictMode, canonical_key,
};
pub use dialect::Dialect;
pub use error::{ClientError, ConfigError, Error, ExecutionError, Result};
pub use registry::{AdapterFactory, AdapterRegistry};
pub use version::{Version, parse_server_version};
