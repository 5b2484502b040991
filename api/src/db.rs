use std::path::Path;
use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::ApiResult;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn open_pool(path: impl AsRef<Path>) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Ok(())
    });
    r2d2::Pool::new(manager)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS comments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            content     TEXT NOT NULL,
            author      TEXT NOT NULL,
            created_at  INTEGER NOT NULL,
            upvotes     INTEGER NOT NULL DEFAULT 0,
            downvotes   INTEGER NOT NULL DEFAULT 0,
            popularity  INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_comments_created ON comments(created_at);
        CREATE INDEX IF NOT EXISTS idx_comments_popularity ON comments(popularity);
        CREATE INDEX IF NOT EXISTS idx_comments_author ON comments(author);

        CREATE TABLE IF NOT EXISTS pagination_state (
            scope        TEXT PRIMARY KEY,
            total        INTEGER NOT NULL DEFAULT 0 CHECK (total >= 0),
            page_size    INTEGER NOT NULL CHECK (page_size > 0),
            current_page INTEGER NOT NULL CHECK (current_page > 0),
            filter       TEXT NOT NULL
        );
        ",
    )?;

    Ok(())
}

/// Runs `f` on a pooled connection off the async runtime.
pub async fn with_conn<T, F>(pool: &DbPool, f: F) -> ApiResult<T>
where
    F: FnOnce(&mut Connection) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut conn)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = open_pool(tmp.path().join("board.db")).unwrap();
        run_migrations(&pool).unwrap();
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('comments', 'pagination_state')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn page_size_must_be_positive() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = open_pool(tmp.path().join("board.db")).unwrap();
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        let result = conn.execute(
            "INSERT INTO pagination_state (scope, total, page_size, current_page, filter)
             VALUES ('global', 0, 0, 1, 'newest')",
            [],
        );
        assert!(result.is_err());
    }
}
