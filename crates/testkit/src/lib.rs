use oblink_core::RawConfig;

mod fake_client;
mod yaml_runner;

pub use fake_client::{ConnectionLog, DEFAULT_FAKE_SERVER_VERSION, FakeClient, FakeConnector};
pub use yaml_runner::{
    REJECTED_STATEMENT_MESSAGE, SessionCase, TestResult, load_session_cases_from_str,
    run_session_case,
};

pub fn local_config(database: &str) -> RawConfig {
    RawConfig::new()
        .with("host", "127.0.0.1")
        .with("port", 2881)
        .with("username", "root")
        .with("database", database)
}
