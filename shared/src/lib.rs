use serde::{Deserialize, Serialize};

/// Author recorded when the submitter leaves the name field blank.
pub const ANONYMOUS: &str = "Anonymous";

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const DEFAULT_FILTER: &str = "newest";

// ── Comments ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub upvotes: i64,
    pub downvotes: i64,
    pub author: String,
}

/// Form body of `POST /comments`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateComment {
    #[serde(rename = "user-name")]
    pub user_name: Option<String>,
    #[serde(rename = "user-comment")]
    pub user_comment: Option<String>,
}

// ── Pagination ──

/// How reads are windowed for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// Comments ever created in this scope, not a live count.
    pub total: i64,
    pub page_size: i64,
    /// One-based.
    pub current_page: i64,
    /// A sort mode keyword, or an author name to filter on.
    pub filter: String,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            total: 0,
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

/// Form body of `POST /pagination-config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSizeForm {
    #[serde(rename = "max-comments")]
    pub max_comments: Option<String>,
}

/// Form body of `POST /pagination-state`. `i` is zero-based.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageIndexForm {
    pub i: Option<String>,
}

/// Form body of `POST /pagination-filter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterForm {
    pub filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_serializes_with_camel_case_fields() {
        let comment = Comment {
            id: 7,
            content: "hi".into(),
            created_at: 1_600_000_000_000,
            upvotes: 0,
            downvotes: 0,
            author: ANONYMOUS.into(),
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["createdAt"], 1_600_000_000_000i64);
        assert_eq!(json["author"], "Anonymous");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn default_state_matches_initial_record() {
        let state = PaginationState::default();
        assert_eq!(state.total, 0);
        assert_eq!(state.page_size, 10);
        assert_eq!(state.current_page, 1);
        assert_eq!(state.filter, "newest");
    }

    #[test]
    fn state_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(PaginationState::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "total": 0,
                "pageSize": 10,
                "currentPage": 1,
                "filter": "newest"
            })
        );
    }
}
