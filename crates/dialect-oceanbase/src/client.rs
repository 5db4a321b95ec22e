use mysql::{Compression, Conn, OptsBuilder, Row, consts::CapabilityFlags, prelude::Queryable};
use oblink_core::{
    ClientError, ClientOptions, Connector, Quoter, RowFormat, Rows, Value, WireClient,
};

use crate::export_queries;

const DEFAULT_OCEANBASE_HOST: &str = "127.0.0.1";
const DEFAULT_OCEANBASE_PORT: u16 = 2881;
const CLOSED_CONNECTION_MESSAGE: &str = "mysql connection is closed";
const EMPTY_RESULT_MESSAGE: &str = "query returned no rows";

/// Builds blocking `mysql` connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlConnector;

impl Connector for MysqlConnector {
    fn connect(&self, options: &ClientOptions) -> Result<Box<dyn WireClient>, ClientError> {
        let conn = Conn::new(opts_builder(options)).map_err(client_error)?;
        Ok(Box::new(MysqlClient {
            conn: Some(conn),
            row_format: RowFormat::default(),
        }))
    }
}

/// Capability bits the handshake forwards as requested.
fn passthrough_flags() -> CapabilityFlags {
    CapabilityFlags::CLIENT_LONG_FLAG
        | CapabilityFlags::CLIENT_FOUND_ROWS
        | CapabilityFlags::CLIENT_NO_SCHEMA
        | CapabilityFlags::CLIENT_ODBC
        | CapabilityFlags::CLIENT_IGNORE_SPACE
        | CapabilityFlags::CLIENT_INTERACTIVE
        | CapabilityFlags::CLIENT_IGNORE_SIGPIPE
}

fn opts_builder(options: &ClientOptions) -> OptsBuilder {
    let requested = CapabilityFlags::from_bits_truncate(options.flags);
    // PROTOCOL_41, LONG_PASSWORD, TRANSACTIONS, LOCAL_FILES, CONNECT_WITH_DB
    // and the multi-statement/result bits are always negotiated by the client.
    let mut builder = OptsBuilder::new()
        .ip_or_hostname(
            options
                .host
                .clone()
                .or(Some(DEFAULT_OCEANBASE_HOST.to_string())),
        )
        .tcp_port(options.port.unwrap_or(DEFAULT_OCEANBASE_PORT))
        .user(options.user.clone())
        .pass(options.password.clone())
        .db_name(options.database.clone())
        .additional_capabilities(requested & passthrough_flags());
    if requested.contains(CapabilityFlags::CLIENT_COMPRESS) {
        builder = builder.compress(Some(Compression::default()));
    }
    if let Some(socket) = &options.socket {
        builder = builder.socket(Some(socket.clone()));
    }
    builder
}

struct MysqlClient {
    conn: Option<Conn>,
    row_format: RowFormat,
}

impl MysqlClient {
    fn conn_mut(&mut self) -> Result<&mut Conn, ClientError> {
        self.conn
            .as_mut()
            .ok_or_else(|| ClientError::new(CLOSED_CONNECTION_MESSAGE))
    }
}

impl Quoter for MysqlClient {
    fn escape_string(&self, raw: &str) -> String {
        escape_string(raw)
    }
}

impl WireClient for MysqlClient {
    fn execute(&mut self, sql: &str) -> Result<(), ClientError> {
        self.conn_mut()?.query_drop(sql).map_err(client_error)
    }

    fn query_as(&mut self, sql: &str, format: RowFormat) -> Result<Rows, ClientError> {
        let rows = self
            .conn_mut()?
            .query::<Row, _>(sql)
            .map_err(client_error)?;
        let columns = rows
            .first()
            .map(|row| {
                row.columns_ref()
                    .iter()
                    .map(|column| column.name_str().into_owned())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let values = rows
            .into_iter()
            .map(|row| {
                (0..row.len())
                    .map(|index| row.as_ref(index).cloned().map_or(Value::Null, wire_value))
                    .collect()
            })
            .collect();

        Ok(Rows::materialize(format, &columns, values))
    }

    fn row_format(&self) -> RowFormat {
        self.row_format
    }

    fn set_row_format(&mut self, format: RowFormat) {
        self.row_format = format;
    }

    fn ping(&mut self) -> bool {
        self.conn.as_mut().is_some_and(|conn| conn.ping().is_ok())
    }

    fn server_version(&mut self) -> Result<String, ClientError> {
        self.conn_mut()?
            .query_first::<String, _>(export_queries::SHOW_SERVER_VERSION_QUERY)
            .map_err(client_error)?
            .ok_or_else(|| ClientError::new(EMPTY_RESULT_MESSAGE))
    }

    fn close(&mut self) {
        // Dropping the handle sends COM_QUIT.
        self.conn.take();
    }
}

/// Escapes with the client's own literal renderer, minus the surrounding quotes.
pub(crate) fn escape_string(raw: &str) -> String {
    let quoted = mysql::Value::from(raw).as_sql(false);
    let inner = quoted
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''));
    inner.unwrap_or(&quoted).to_string()
}

fn wire_value(value: mysql::Value) -> Value {
    match value {
        mysql::Value::NULL => Value::Null,
        mysql::Value::Bytes(bytes) => Value::Bytes(bytes),
        mysql::Value::Int(value) => Value::Int(value),
        mysql::Value::UInt(value) => Value::UInt(value),
        mysql::Value::Float(value) => Value::Float(f64::from(value)),
        mysql::Value::Double(value) => Value::Float(value),
        temporal => {
            let literal = temporal.as_sql(true);
            Value::Bytes(literal.trim_matches('\'').as_bytes().to_vec())
        }
    }
}

fn client_error(error: mysql::Error) -> ClientError {
    match &error {
        mysql::Error::MySqlError(server) => ClientError::with_code(server.code, error.to_string()),
        _ => ClientError::new(error.to_string()),
    }
}
