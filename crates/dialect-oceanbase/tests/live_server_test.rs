use oblink_core::{Capability, Dialect, RawConfig};
use oblink_dialect_oceanbase::{OceanbaseDialect, show_full_fields_query};

#[test]
fn show_full_fields_query_quotes_schema_qualified_names() {
    assert_eq!(
        show_full_fields_query("app.users"),
        "SHOW FULL FIELDS FROM `app`.`users`"
    );
}

#[test]
#[ignore = "requires oceanbase container runtime"]
fn session_smoke_test_with_container_runtime() {
    if std::env::var("OBLINK_OCEANBASE_ENABLE_IGNORED").as_deref() != Ok("1") {
        return;
    }

    let host = std::env::var("OBLINK_OCEANBASE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("OBLINK_OCEANBASE_PORT")
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(2881);
    let user = std::env::var("OBLINK_OCEANBASE_USER").unwrap_or_else(|_| "root@test".to_string());
    let password = std::env::var("OBLINK_OCEANBASE_PASSWORD").unwrap_or_default();
    let database =
        std::env::var("OBLINK_OCEANBASE_DATABASE").unwrap_or_else(|_| "test".to_string());

    let config = RawConfig::new()
        .with("host", host)
        .with("port", port)
        .with("username", user)
        .with("password", password)
        .with("database", database)
        .with("encoding", "utf8mb4");

    let mut adapter = OceanbaseDialect
        .connect(&config)
        .expect("connect should succeed for integration runtime");

    assert!(adapter.is_active());
    adapter
        .execute("CREATE TABLE IF NOT EXISTS oblink_smoke (id BIGINT PRIMARY KEY, note VARCHAR(32) COMMENT 'n')")
        .expect("create table");
    let columns = adapter.columns("oblink_smoke").expect("columns");
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[1].comment.as_deref(), Some("n"));

    let version = adapter.server_version().expect("server version");
    assert!(version.major >= 5);
    adapter.supports(Capability::Json).expect("capabilities");

    adapter.reconnect().expect("reconnect");
    assert!(adapter.is_active());
    adapter
        .execute("DROP TABLE oblink_smoke")
        .expect("drop table");
    adapter.disconnect();
    assert!(!adapter.is_active());
}
