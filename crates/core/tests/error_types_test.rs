use std::error::Error as StdError;

use oblink_core::{ClientError, ConfigError, ConnectionConfig, Error, ExecutionError, RawConfig};

#[test]
fn statement_failures_render_index_sql_and_cause() {
    let error = ExecutionError::statement_failed(
        2,
        "SET @@SESSION.wait_timeout = 2147483",
        2,
        ClientError::with_code(1227, "Access denied"),
    );

    assert_eq!(
        error.to_string(),
        "statement[2] failed after 2 executed statements: `SET @@SESSION.wait_timeout = 2147483`: Access denied"
    );
    let source = error.source().expect("client error is the source");
    assert_eq!(source.to_string(), "Access denied");
}

#[test]
fn single_query_failures_omit_the_statement_index() {
    let error: Error =
        ExecutionError::query_failed("DELETE FROM t", ClientError::with_code(1205, "lock wait timeout"))
            .into();

    assert_eq!(error.to_string(), "query failed: `DELETE FROM t`: lock wait timeout");
    assert_eq!(error.error_number(), Some(1205));
    assert!(!error.to_string().contains("statement["));
}

#[test]
fn no_database_errors_keep_the_client_failure() {
    let error = Error::NoDatabase {
        database: Some("ghost".to_string()),
        source: ClientError::with_code(1049, "Unknown database 'ghost'"),
    };

    assert_eq!(
        error.to_string(),
        "database does not exist (database=ghost): Unknown database 'ghost'"
    );
    assert_eq!(error.error_number(), Some(1049));
    assert!(error.source().is_some());

    let unnamed = Error::NoDatabase {
        database: None,
        source: ClientError::new("Unknown database ''"),
    };
    assert!(unnamed.to_string().contains("database=none"));
    assert_eq!(unnamed.error_number(), None);
}

#[test]
fn client_errors_pass_through_transparently() {
    let client = ClientError::with_code(2013, "Lost connection to MySQL server during query");
    let error = Error::from(client.clone());

    assert_eq!(error.to_string(), client.message);
    assert_eq!(error.error_number(), Some(2013));
}

#[test]
fn config_errors_surface_through_the_crate_error() {
    let raw = RawConfig::new().with("port", "not-a-port");
    let error: Error = ConnectionConfig::from_raw(&raw)
        .expect_err("port must be numeric")
        .into();

    assert!(matches!(
        error,
        Error::Config(ConfigError::InvalidValue { ref key, .. }) if key == "port"
    ));
    assert_eq!(error.to_string(), "invalid value for `port`: expected a TCP port number");
    assert_eq!(error.error_number(), None);
}

#[test]
fn lifecycle_errors_have_no_server_code() {
    assert_eq!(Error::NotConnected.error_number(), None);
    assert_eq!(
        Error::UnknownAdapter {
            name: "mysql2".to_string()
        }
        .to_string(),
        "no adapter registered under `mysql2`"
    );
}
