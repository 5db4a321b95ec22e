use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use oblink_core::{
    ClientError, ClientOptions, Connector, Quoter, RowFormat, Rows, Value, WireClient,
};

pub const DEFAULT_FAKE_SERVER_VERSION: &str = "5.7.25-OceanBase_CE-v4.2.1.0";
const CLOSED_CONNECTION_MESSAGE: &str = "fake connection is closed";

#[derive(Debug, Clone)]
struct FailureRule {
    sql: String,
    error: ClientError,
}

#[derive(Debug, Clone, Default)]
struct CannedResult {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Everything one fake connection saw, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionLog {
    pub options: ClientOptions,
    pub statements: Vec<String>,
    pub row_formats: Vec<RowFormat>,
    pub version_queries: usize,
    pub closed: bool,
}

#[derive(Debug)]
struct FakeServerState {
    server_version: String,
    reachable: bool,
    connect_failure: Option<ClientError>,
    fail_on_sql: Option<FailureRule>,
    results: BTreeMap<String, CannedResult>,
    connections: Vec<ConnectionLog>,
}

impl Default for FakeServerState {
    fn default() -> Self {
        Self {
            server_version: DEFAULT_FAKE_SERVER_VERSION.to_string(),
            reachable: true,
            connect_failure: None,
            fail_on_sql: None,
            results: BTreeMap::new(),
            connections: Vec::new(),
        }
    }
}

/// In-memory stand-in for the wire client. Clones share one fake server, so a
/// test keeps a clone to inspect what the adapter did with the other.
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    state: Rc<RefCell<FakeServerState>>,
}

impl FakeConnector {
    pub fn set_server_version(&self, version: impl Into<String>) {
        self.state.borrow_mut().server_version = version.into();
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.borrow_mut().reachable = reachable;
    }

    pub fn fail_connect_with(&self, error: ClientError) {
        self.state.borrow_mut().connect_failure = Some(error);
    }

    pub fn clear_connect_failure(&self) {
        self.state.borrow_mut().connect_failure = None;
    }

    pub fn fail_on_sql(&self, sql: impl Into<String>, error: ClientError) {
        self.state.borrow_mut().fail_on_sql = Some(FailureRule {
            sql: sql.into(),
            error,
        });
    }

    pub fn clear_fail_on_sql(&self) {
        self.state.borrow_mut().fail_on_sql = None;
    }

    pub fn set_query_result(&self, sql: impl Into<String>, columns: &[&str], rows: Vec<Vec<Value>>) {
        self.state.borrow_mut().results.insert(
            sql.into(),
            CannedResult {
                columns: columns.iter().map(|column| column.to_string()).collect(),
                rows,
            },
        );
    }

    pub fn connection_count(&self) -> usize {
        self.state.borrow().connections.len()
    }

    pub fn connections(&self) -> Vec<ConnectionLog> {
        self.state.borrow().connections.clone()
    }

    pub fn statements_for(&self, connection_index: usize) -> Vec<String> {
        self.state
            .borrow()
            .connections
            .get(connection_index)
            .map(|log| log.statements.clone())
            .unwrap_or_default()
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.state
            .borrow()
            .connections
            .iter()
            .flat_map(|log| log.statements.iter().cloned())
            .collect()
    }

    pub fn last_options(&self) -> Option<ClientOptions> {
        self.state
            .borrow()
            .connections
            .last()
            .map(|log| log.options.clone())
    }

    pub fn open_connections(&self) -> usize {
        self.state
            .borrow()
            .connections
            .iter()
            .filter(|log| !log.closed)
            .count()
    }
}

impl Connector for FakeConnector {
    fn connect(&self, options: &ClientOptions) -> Result<Box<dyn WireClient>, ClientError> {
        let mut state = self.state.borrow_mut();
        if let Some(error) = &state.connect_failure {
            return Err(error.clone());
        }

        state.connections.push(ConnectionLog {
            options: options.clone(),
            ..ConnectionLog::default()
        });
        Ok(Box::new(FakeClient {
            state: Rc::clone(&self.state),
            index: state.connections.len() - 1,
            open: true,
            row_format: RowFormat::default(),
        }))
    }
}

#[derive(Debug)]
pub struct FakeClient {
    state: Rc<RefCell<FakeServerState>>,
    index: usize,
    open: bool,
    row_format: RowFormat,
}

impl FakeClient {
    fn record(&mut self, sql: &str) -> Result<(), ClientError> {
        if !self.open {
            return Err(ClientError::new(CLOSED_CONNECTION_MESSAGE));
        }

        let mut state = self.state.borrow_mut();
        if let Some(rule) = &state.fail_on_sql
            && rule.sql == sql
        {
            return Err(rule.error.clone());
        }
        state.connections[self.index].statements.push(sql.to_string());
        Ok(())
    }
}

impl Quoter for FakeClient {
    fn escape_string(&self, raw: &str) -> String {
        let mut escaped = String::with_capacity(raw.len());
        for ch in raw.chars() {
            match ch {
                '\0' => escaped.push_str("\\0"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\x1a' => escaped.push_str("\\Z"),
                '\\' | '\'' | '"' => {
                    escaped.push('\\');
                    escaped.push(ch);
                }
                _ => escaped.push(ch),
            }
        }
        escaped
    }
}

impl WireClient for FakeClient {
    fn execute(&mut self, sql: &str) -> Result<(), ClientError> {
        self.record(sql)
    }

    fn query_as(&mut self, sql: &str, format: RowFormat) -> Result<Rows, ClientError> {
        self.record(sql)?;
        let result = self
            .state
            .borrow()
            .results
            .get(sql)
            .cloned()
            .unwrap_or_default();
        Ok(Rows::materialize(format, &result.columns, result.rows))
    }

    fn row_format(&self) -> RowFormat {
        self.row_format
    }

    fn set_row_format(&mut self, format: RowFormat) {
        self.row_format = format;
        self.state.borrow_mut().connections[self.index]
            .row_formats
            .push(format);
    }

    fn ping(&mut self) -> bool {
        self.open && self.state.borrow().reachable
    }

    fn server_version(&mut self) -> Result<String, ClientError> {
        if !self.open {
            return Err(ClientError::new(CLOSED_CONNECTION_MESSAGE));
        }

        let mut state = self.state.borrow_mut();
        state.connections[self.index].version_queries += 1;
        Ok(state.server_version.clone())
    }

    fn close(&mut self) {
        self.open = false;
        self.state.borrow_mut().connections[self.index].closed = true;
    }
}
