use std::fmt;

use axum::{
    extract::{Form, State},
    http::HeaderMap,
    response::Redirect,
    Json,
};
use comment_board_shared::{FilterForm, PageIndexForm, PageSizeForm, PaginationState};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::{auth, db, AppState};

/// The boundary under which one pagination-state record is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Global,
    User(String),
}

impl Scope {
    pub fn key(&self) -> String {
        match self {
            Scope::Global => "global".to_string(),
            Scope::User(identity) => format!("user:{identity}"),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

// ── State manager ──

pub fn get(conn: &Connection, scope: &Scope) -> rusqlite::Result<Option<PaginationState>> {
    conn.query_row(
        "SELECT total, page_size, current_page, filter
         FROM pagination_state WHERE scope = ?1",
        [scope.key()],
        |row| {
            Ok(PaginationState {
                total: row.get(0)?,
                page_size: row.get(1)?,
                current_page: row.get(2)?,
                filter: row.get(3)?,
            })
        },
    )
    .optional()
}

/// Returns the record for `scope`, creating it with defaults when absent.
///
/// A new record's `total` starts at the number of comments already stored.
/// The insert is keyed on the scope's primary key, so concurrent first
/// readers still end up sharing a single record.
pub fn get_or_init(conn: &Connection, scope: &Scope) -> ApiResult<PaginationState> {
    if let Some(existing) = get(conn, scope)? {
        return Ok(existing);
    }

    let defaults = PaginationState::default();
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO pagination_state (scope, total, page_size, current_page, filter)
         VALUES (?1, (SELECT COUNT(*) FROM comments), ?2, ?3, ?4)",
        params![
            scope.key(),
            defaults.page_size,
            defaults.current_page,
            defaults.filter
        ],
    )?;
    if inserted == 1 {
        info!(%scope, "initialized pagination state");
    }

    get(conn, scope)?.ok_or_else(|| not_found(scope))
}

/// Rejects a non-positive `new_size` without touching the store.
pub fn set_page_size(conn: &Connection, scope: &Scope, new_size: i64) -> ApiResult<()> {
    if new_size <= 0 {
        return Err(ApiError::InvalidInput(format!("page size {new_size}")));
    }
    update(
        conn,
        scope,
        "UPDATE pagination_state SET page_size = ?1 WHERE scope = ?2",
        &new_size,
    )
}

/// `index` is zero-based; the stored page is one-based.
pub fn set_page(conn: &Connection, scope: &Scope, index: i64) -> ApiResult<()> {
    let Some(page) = index.checked_add(1).filter(|page| *page > 0) else {
        return Err(ApiError::InvalidInput(format!("page index {index}")));
    };
    update(
        conn,
        scope,
        "UPDATE pagination_state SET current_page = ?1 WHERE scope = ?2",
        &page,
    )
}

/// Stored verbatim; the planner decides what it means at read time.
pub fn set_filter(conn: &Connection, scope: &Scope, value: &str) -> ApiResult<()> {
    update(
        conn,
        scope,
        "UPDATE pagination_state SET filter = ?1 WHERE scope = ?2",
        &value,
    )
}

pub fn increment_total(conn: &Connection, scope: &Scope, delta: i64) -> ApiResult<()> {
    update(
        conn,
        scope,
        "UPDATE pagination_state SET total = total + ?1 WHERE scope = ?2",
        &delta,
    )
}

/// Bumps every scope except `scope`; each record counts all comments.
pub fn increment_other_totals(conn: &Connection, scope: &Scope, delta: i64) -> ApiResult<()> {
    conn.execute(
        "UPDATE pagination_state SET total = total + ?1 WHERE scope <> ?2",
        params![delta, scope.key()],
    )?;
    Ok(())
}

fn update(conn: &Connection, scope: &Scope, sql: &str, value: &dyn ToSql) -> ApiResult<()> {
    let changed = conn.execute(sql, params![value, scope.key()])?;
    if changed == 0 {
        return Err(not_found(scope));
    }
    Ok(())
}

fn not_found(scope: &Scope) -> ApiError {
    ApiError::NotFound(format!("pagination state for {scope}"))
}

// ── Handlers ──

fn parse_number(raw: Option<&str>, field: &str) -> ApiResult<i64> {
    let raw = raw.ok_or_else(|| ApiError::InvalidInput(format!("missing {field}")))?;
    raw.parse()
        .map_err(|_| ApiError::InvalidInput(format!("{field} {raw:?} is not a number")))
}

/// Form posts always land on the confirmation page. Invalid input is a
/// logged no-op; anything else is reported to the caller.
pub fn redirect_after(state: &AppState, outcome: ApiResult<()>) -> ApiResult<Redirect> {
    match outcome {
        Ok(()) => {}
        Err(ApiError::InvalidInput(reason)) => debug!("ignoring form input: {reason}"),
        Err(e) => return Err(e),
    }
    Ok(Redirect::to(&state.redirect_to))
}

/// GET /pagination-state
pub async fn get_pagination_state(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<PaginationState>> {
    let scope = auth::resolve_scope(&state, &headers)?;
    let current = db::with_conn(&state.db, move |conn| get_or_init(conn, &scope)).await?;
    Ok(Json(current))
}

/// POST /pagination-state — `i` is the zero-based page to show
pub async fn update_current_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<PageIndexForm>,
) -> ApiResult<Redirect> {
    let scope = auth::resolve_scope(&state, &headers)?;
    let outcome = match parse_number(form.i.as_deref(), "i") {
        Ok(index) => db::with_conn(&state.db, move |conn| set_page(conn, &scope, index)).await,
        Err(e) => Err(e),
    };
    redirect_after(&state, outcome)
}

/// POST /pagination-config — `max-comments` is the new page size
pub async fn update_page_size(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<PageSizeForm>,
) -> ApiResult<Redirect> {
    let scope = auth::resolve_scope(&state, &headers)?;
    let outcome = match parse_number(form.max_comments.as_deref(), "max-comments") {
        Ok(size) => db::with_conn(&state.db, move |conn| set_page_size(conn, &scope, size)).await,
        Err(e) => Err(e),
    };
    redirect_after(&state, outcome)
}

/// POST /pagination-filter
pub async fn update_filter(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FilterForm>,
) -> ApiResult<Redirect> {
    let scope = auth::resolve_scope(&state, &headers)?;
    let outcome = match form.filter {
        Some(filter) => {
            db::with_conn(&state.db, move |conn| set_filter(conn, &scope, &filter)).await
        }
        None => Err(ApiError::InvalidInput("missing filter".into())),
    };
    redirect_after(&state, outcome)
}
