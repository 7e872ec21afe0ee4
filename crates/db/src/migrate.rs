//! Migration ledger and executor.
//!
//! Pending migrations run in the order given, inside one transaction: either
//! every pending migration lands or none does.

use std::collections::HashSet;

use biblio_kernel::Migration;
use rusqlite::{params, Connection};

use crate::{DbError, DbResult};

const LEDGER_SQL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    module     TEXT NOT NULL,
    id         TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    PRIMARY KEY (module, id)
);";

/// A migration recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub module: String,
    pub id: String,
}

/// Apply every migration not yet in the ledger; returns the newly applied ones.
pub fn apply(
    conn: &mut Connection,
    migrations: &[(String, Migration)],
) -> DbResult<Vec<AppliedMigration>> {
    let tx = conn.transaction()?;
    tx.execute_batch(LEDGER_SQL)?;

    let done: HashSet<(String, String)> = {
        let mut stmt = tx.prepare("SELECT module, id FROM schema_migrations;")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<_, _>>()?
    };

    let mut applied = Vec::new();
    for (module, migration) in migrations {
        if done.contains(&(module.clone(), migration.id.to_string())) {
            continue;
        }

        tx.execute_batch(migration.up)
            .map_err(|source| DbError::Migration {
                module: module.clone(),
                id: migration.id.to_string(),
                source,
            })?;
        tx.execute(
            "INSERT INTO schema_migrations (module, id) VALUES (?1, ?2);",
            params![module, migration.id],
        )?;

        applied.push(AppliedMigration {
            module: module.clone(),
            id: migration.id.to_string(),
        });
    }

    tx.commit()?;
    Ok(applied)
}

/// Migrations already recorded, in application order.
#[cfg(test)]
fn applied(conn: &Connection) -> DbResult<Vec<AppliedMigration>> {
    let mut stmt = conn.prepare(
        "SELECT module, id FROM schema_migrations ORDER BY applied_at, rowid;",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(AppliedMigration {
            module: row.get(0)?,
            id: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrations() -> Vec<(String, Migration)> {
        vec![
            (
                "shelves".to_string(),
                Migration {
                    id: "001_create_shelves",
                    up: "CREATE TABLE shelves (id INTEGER PRIMARY KEY, label TEXT NOT NULL);",
                },
            ),
            (
                "shelves".to_string(),
                Migration {
                    id: "002_label_index",
                    up: "CREATE UNIQUE INDEX shelves_label ON shelves (label);",
                },
            ),
        ]
    }

    #[test]
    fn applies_pending_migrations_once() {
        let mut conn = Connection::open_in_memory().unwrap();

        let first = apply(&mut conn, &migrations()).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, "001_create_shelves");

        let second = apply(&mut conn, &migrations()).unwrap();
        assert!(second.is_empty());

        let ledger = applied(&conn).unwrap();
        assert_eq!(ledger, first);
    }

    #[test]
    fn failed_migration_rolls_back_the_batch() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut batch = migrations();
        batch.push((
            "shelves".to_string(),
            Migration {
                id: "003_broken",
                up: "ALTER TABLE nowhere ADD COLUMN x TEXT;",
            },
        ));

        let err = apply(&mut conn, &batch).unwrap_err();
        assert!(matches!(err, DbError::Migration { ref id, .. } if id == "003_broken"));

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name IN ('shelves', 'schema_migrations');",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
    }
}
