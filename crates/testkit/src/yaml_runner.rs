use std::collections::BTreeMap;

use oblink_core::{Capability, ClientError, DatabaseAdapter, Dialect, RawConfig};
use serde::Deserialize;

use crate::fake_client::FakeConnector;

/// One connection scenario: the options handed to the dialect and what the
/// fake server should have seen.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionCase {
    pub config: RawConfig,
    /// Exact statements executed on the first connection, in order.
    pub statements: Option<Vec<String>>,
    pub error: Option<String>,
    pub server_version: Option<String>,
    /// Statement the fake server rejects.
    pub fail_on: Option<String>,
    pub supports_json: Option<bool>,
    pub prepared_statements: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed(String),
}

pub const REJECTED_STATEMENT_MESSAGE: &str = "rejected by fake server";

pub fn load_session_cases_from_str(
    yaml: &str,
) -> Result<BTreeMap<String, SessionCase>, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

pub fn run_session_case(dialect: &dyn Dialect, case: &SessionCase) -> TestResult {
    let connector = FakeConnector::default();
    if let Some(version) = &case.server_version {
        connector.set_server_version(version.as_str());
    }
    if let Some(sql) = &case.fail_on {
        connector.fail_on_sql(sql.as_str(), ClientError::new(REJECTED_STATEMENT_MESSAGE));
    }

    let outcome = dialect
        .establish(Box::new(connector.clone()), &case.config)
        .map_err(|error| error.to_string());

    match run_session_flow(case, outcome, &connector) {
        Ok(()) => TestResult::Passed,
        Err(message) => TestResult::Failed(message),
    }
}

fn run_session_flow(
    case: &SessionCase,
    outcome: Result<Box<dyn DatabaseAdapter>, String>,
    connector: &FakeConnector,
) -> Result<(), String> {
    let adapter = evaluate_expected_error(case, outcome)?;
    assert_expected_statements(case.statements.as_deref(), &connector.statements_for(0))?;

    let Some(mut adapter) = adapter else {
        return Ok(());
    };

    if let Some(expected) = case.supports_json {
        let actual = adapter
            .supports(Capability::Json)
            .map_err(|error| error.to_string())?;
        if actual != expected {
            return Err(format!(
                "json support mismatch; expected {expected}, got {actual}"
            ));
        }
    }

    if let Some(expected) = case.prepared_statements {
        let actual = adapter.prepared_statements();
        if actual != expected {
            return Err(format!(
                "prepared statements mismatch; expected {expected}, got {actual}"
            ));
        }
    }

    Ok(())
}

fn evaluate_expected_error(
    case: &SessionCase,
    outcome: Result<Box<dyn DatabaseAdapter>, String>,
) -> Result<Option<Box<dyn DatabaseAdapter>>, String> {
    let Some(expected_error) = case.error.as_deref() else {
        return outcome.map(Some);
    };

    match outcome {
        Ok(_) => Err(format!(
            "expected error: {expected_error}, but got no error"
        )),
        Err(actual_error) if actual_error == expected_error => Ok(None),
        Err(actual_error) => Err(format!(
            "expected error: {expected_error}, but got: {actual_error}"
        )),
    }
}

fn assert_expected_statements(expected: Option<&[String]>, actual: &[String]) -> Result<(), String> {
    let Some(expected) = expected else {
        return Ok(());
    };
    if expected == actual {
        return Ok(());
    }

    Err(format!(
        "session SQL mismatch; expected:\n{}\nactual:\n{}",
        expected.join("\n"),
        actual.join("\n")
    ))
}
