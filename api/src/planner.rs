//! Turns a stored filter selection into the clause used to read comments.
//!
//! The five sort-mode keywords share the `filter` field with author names, so
//! an author literally named `newest` can never be filtered on.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Popularity,
    Author,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Popularity => "popularity",
            SortField::Author => "author",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    Sort { field: SortField, direction: Direction },
    AuthorEquals(String),
}

/// Every input maps to a plan; unknown values become author filters.
pub fn plan(filter: &str) -> QueryPlan {
    use Direction::*;
    use SortField::*;

    let (field, direction) = match filter {
        "newest" => (CreatedAt, Descending),
        "oldest" => (CreatedAt, Ascending),
        "mostPopular" => (Popularity, Descending),
        "leastPopular" => (Popularity, Ascending),
        "alphabetical" => (Author, Ascending),
        author => return QueryPlan::AuthorEquals(author.to_string()),
    };
    QueryPlan::Sort { field, direction }
}

impl QueryPlan {
    /// `WHERE`/`ORDER BY` tail for a `SELECT ... FROM comments`. Ties fall back
    /// to `id` in the same direction so results are deterministic.
    pub fn clause(&self) -> String {
        match self {
            QueryPlan::Sort { field, direction } => format!(
                "ORDER BY {col} {dir}, id {dir}",
                col = field.column(),
                dir = direction.keyword()
            ),
            QueryPlan::AuthorEquals(_) => "WHERE author = ?1 ORDER BY id ASC".to_string(),
        }
    }

    /// Values bound to the placeholders in [`QueryPlan::clause`].
    pub fn bindings(&self) -> Option<&str> {
        match self {
            QueryPlan::Sort { .. } => None,
            QueryPlan::AuthorEquals(author) => Some(author),
        }
    }
}
