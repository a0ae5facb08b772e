//! Schema DDL and first-run seeding.
//!
//! # Responsibility
//! - Declare the five persisted entity tables.
//! - Seed the default credential and ticker rows when their tables are empty.
//!
//! # Invariants
//! - DDL uses `CREATE TABLE IF NOT EXISTS` throughout; applying it to an
//!   already-initialized database is a no-op.
//! - Exactly one `admin` credential is seeded, and only if the username is
//!   absent.

use super::DbResult;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

const SCHEMA_SQL: &str = include_str!("schema.sql");

pub(crate) const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Default password for the seeded credential. Deployments are expected to
/// change it through the password-change flow after first login.
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin@123";

const DEFAULT_TICKER_ITEMS: &[(&str, &str)] = &[
    ("Welcome to the events portal", "/about/"),
    ("Registrations for upcoming events are now open", "/events/"),
    ("New photo galleries from recent events are live", "/gallery/"),
];

/// Applies the entity table DDL. Idempotent.
pub(crate) fn apply_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Seeds the default credential and ticker rows on first run.
pub(crate) fn seed_defaults(conn: &Connection) -> DbResult<()> {
    seed_admin(conn)?;
    seed_ticker(conn)?;
    Ok(())
}

fn seed_admin(conn: &Connection) -> DbResult<()> {
    let existing = conn
        .query_row(
            "SELECT id FROM admin WHERE username = ?1;",
            params![DEFAULT_ADMIN_USERNAME],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    if existing.is_some() {
        return Ok(());
    }

    let password_hash = bcrypt::hash(DEFAULT_ADMIN_PASSWORD, bcrypt::DEFAULT_COST)?;
    conn.execute(
        "INSERT INTO admin (username, password) VALUES (?1, ?2);",
        params![DEFAULT_ADMIN_USERNAME, password_hash],
    )?;
    info!(
        "event=seed_admin module=db status=ok username={}",
        DEFAULT_ADMIN_USERNAME
    );
    Ok(())
}

fn seed_ticker(conn: &Connection) -> DbResult<()> {
    let count = conn.query_row("SELECT COUNT(*) FROM news_ticker;", [], |row| {
        row.get::<_, i64>(0)
    })?;
    if count > 0 {
        return Ok(());
    }

    for (sort_order, (text, link)) in DEFAULT_TICKER_ITEMS.iter().enumerate() {
        conn.execute(
            "INSERT INTO news_ticker (text, link, sort_order) VALUES (?1, ?2, ?3);",
            params![text, link, sort_order as i64],
        )?;
    }
    info!(
        "event=seed_ticker module=db status=ok rows={}",
        DEFAULT_TICKER_ITEMS.len()
    );
    Ok(())
}
