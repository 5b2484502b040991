use axum::{
    extract::{Form, State},
    http::HeaderMap,
    response::Redirect,
    Json,
};
use chrono::Utc;
use comment_board_shared::{Comment, CreateComment, ANONYMOUS};
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{self, Scope};
use crate::paging::{self, Window};
use crate::planner::{self, QueryPlan};
use crate::{auth, db, AppState};

pub type CommentRows<'a> = dyn Iterator<Item = rusqlite::Result<Comment>> + 'a;

/// Empty or missing names are recorded as [`ANONYMOUS`].
pub fn normalize_author(author: Option<&str>) -> String {
    match author {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ANONYMOUS.to_string(),
    }
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
        upvotes: row.get(3)?,
        downvotes: row.get(4)?,
        author: row.get(5)?,
    })
}

fn insert(conn: &Connection, content: &str, author: &str, created_at: i64) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO comments (content, author, created_at, upvotes, downvotes, popularity)
         VALUES (?1, ?2, ?3, 0, 0, 0)",
        params![content, author, created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Stores a comment and bumps the running total of every scope in one
/// transaction. The record for `scope` is created first if absent.
///
/// Content is kept exactly as submitted, empty included.
pub fn create(
    conn: &mut Connection,
    scope: &Scope,
    content: &str,
    author: Option<&str>,
    created_at: i64,
) -> ApiResult<i64> {
    let author = normalize_author(author);
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    pagination::get_or_init(&tx, scope)?;
    let id = insert(&tx, content, &author, created_at)?;
    pagination::increment_total(&tx, scope, 1)?;
    pagination::increment_other_totals(&tx, scope, 1)?;
    tx.commit()?;
    Ok(id)
}

/// Runs `plan` and hands the unpaginated, ordered rows to `consume`.
///
/// Rows are read from the cursor as `consume` pulls them.
pub fn list<T>(
    conn: &Connection,
    plan: &QueryPlan,
    consume: impl FnOnce(&mut CommentRows<'_>) -> T,
) -> rusqlite::Result<T> {
    let sql = format!(
        "SELECT id, content, created_at, upvotes, downvotes, author FROM comments {}",
        plan.clause()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params_from_iter(plan.bindings()), comment_from_row)?;
    Ok(consume(&mut rows))
}

/// The current page of comments for `scope`, as its pagination state describes.
pub fn current_page(conn: &Connection, scope: &Scope) -> ApiResult<Vec<Comment>> {
    let settings = pagination::get_or_init(conn, scope)?;
    let plan = planner::plan(&settings.filter);
    let window = Window::from(&settings);
    let page = list(conn, &plan, |rows| paging::page(rows, &window))??;
    Ok(page)
}

// ── Handlers ──

/// GET /comments
pub async fn list_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Comment>>> {
    let scope = auth::resolve_scope(&state, &headers)?;
    let comments = db::with_conn(&state.db, move |conn| current_page(conn, &scope)).await?;
    Ok(Json(comments))
}

/// POST /comments
pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(payload): Form<CreateComment>,
) -> ApiResult<Redirect> {
    let scope = auth::resolve_scope(&state, &headers)?;
    let Some(content) = payload.user_comment else {
        let missing = ApiError::InvalidInput("missing user-comment".into());
        return pagination::redirect_after(&state, Err(missing));
    };
    let author = payload.user_name;
    let created_at = Utc::now().timestamp_millis();

    let id = db::with_conn(&state.db, move |conn| {
        create(conn, &scope, &content, author.as_deref(), created_at)
    })
    .await?;
    info!(comment_id = id, "comment created");

    pagination::redirect_after(&state, Ok(()))
}
