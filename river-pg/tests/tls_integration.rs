//! TLS integration tests for qail-pg.
//!
//! These hit a real PostgreSQL server over TLS, so they are `#[ignore]`d by
//! default. Point them at a server with `QAIL_TLS_HOST` / `QAIL_TLS_PORT` /
//! `QAIL_TLS_USER` / `QAIL_TLS_PASSWORD` / `QAIL_TLS_DATABASE`, then run with
//! `cargo test --test tls_integration -- --ignored`.

use qail_core::ast::{Action, Constraint, Expr, Operator, Qail};
use qail_pg::{PgConnection, PgDriver, PgResult};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn host() -> String {
    env_or("QAIL_TLS_HOST", "localhost")
}

fn port() -> u16 {
    env_or("QAIL_TLS_PORT", "5432").parse().unwrap_or(5432)
}

fn user() -> String {
    env_or("QAIL_TLS_USER", "postgres")
}

fn password() -> String {
    env_or("QAIL_TLS_PASSWORD", "postgres")
}

fn database() -> String {
    env_or("QAIL_TLS_DATABASE", "postgres")
}

#[tokio::test]
#[ignore = "requires a live TLS-enabled PostgreSQL server"]
async fn test_tls_connection() -> PgResult<()> {
    let _conn =
        PgConnection::connect_tls(&host(), port(), &user(), &database(), Some(&password())).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a live TLS-enabled PostgreSQL server"]
async fn test_tls_simple_query() -> PgResult<()> {
    let mut driver = PgDriver::new(
        PgConnection::connect_tls(&host(), port(), &user(), &database(), Some(&password())).await?,
    );

    let cmd = Qail::get("pg_stat_activity").columns(["pid", "state"]);
    let rows = driver.fetch_all(&cmd).await?;

    println!("got {} rows from pg_stat_activity", rows.len());
    Ok(())
}

#[tokio::test]
#[ignore = "requires a live TLS-enabled PostgreSQL server"]
async fn test_tls_list_tables() -> PgResult<()> {
    let mut driver = PgDriver::new(
        PgConnection::connect_tls(&host(), port(), &user(), &database(), Some(&password())).await?,
    );

    let cmd = Qail::get("information_schema.tables")
        .columns(["table_name"])
        .filter("table_schema", Operator::Eq, "public");

    let rows = driver.fetch_all(&cmd).await?;
    for row in &rows {
        if let Some(name) = row.get_string(0) {
            println!("   - {}", name);
        }
    }

    assert!(!rows.is_empty(), "expected at least one table");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a live TLS-enabled PostgreSQL server"]
async fn test_tls_ast_query() -> PgResult<()> {
    let mut driver = PgDriver::new(
        PgConnection::connect_tls(&host(), port(), &user(), &database(), Some(&password())).await?,
    );

    let cmd = Qail::get("pg_stat_activity")
        .columns(["pid", "state", "query"])
        .filter("state", Operator::IsNotNull, "ignored");

    let rows = driver.fetch_all(&cmd).await?;
    println!("got {} active connections", rows.len());
    Ok(())
}

#[tokio::test]
#[ignore = "requires a live TLS-enabled PostgreSQL server"]
async fn test_tls_execute() -> PgResult<()> {
    let mut driver = PgDriver::new(
        PgConnection::connect_tls(&host(), port(), &user(), &database(), Some(&password())).await?,
    );

    let create_cmd = Qail {
        action: Action::Make,
        table: "qail_tls_test".to_string(),
        columns: vec![
            Expr::Def {
                name: "id".to_string(),
                data_type: "serial".to_string(),
                constraints: vec![Constraint::PrimaryKey],
            },
            Expr::Def {
                name: "message".to_string(),
                data_type: "text".to_string(),
                constraints: vec![],
            },
            Expr::Def {
                name: "created_at".to_string(),
                data_type: "timestamptz".to_string(),
                constraints: vec![],
            },
        ],
        ..Default::default()
    };

    match driver.execute(&create_cmd).await {
        Ok(_) => println!("   table created"),
        Err(_) => println!("   table already exists (OK)"),
    }

    let cmd = Qail::get("users").columns(["id", "email"]);
    let rows = driver.fetch_all(&cmd).await?;
    println!("got {} users", rows.len());

    for row in rows.iter().take(3) {
        let id = row.get_i32(0);
        let email = row.get_string(1);
        println!("   id={:?}, email={:?}", id, email);
    }

    Ok(())
}

#[tokio::test]
#[ignore = "requires a live TLS-enabled PostgreSQL server"]
async fn test_tls_stress() -> PgResult<()> {
    let mut driver = PgDriver::new(
        PgConnection::connect_tls(&host(), port(), &user(), &database(), Some(&password())).await?,
    );

    let start = std::time::Instant::now();
    for i in 0..100 {
        let cmd = Qail::get("pg_stat_activity").columns(["pid", "state"]);
        let rows = driver.fetch_all(&cmd).await?;
        if i % 20 == 0 {
            println!("   query {}: {} rows", i, rows.len());
        }
    }

    let elapsed = start.elapsed();
    println!(
        "100 queries completed in {:?} ({:.2}ms/query)",
        elapsed,
        elapsed.as_millis() as f64 / 100.0
    );

    Ok(())
}
