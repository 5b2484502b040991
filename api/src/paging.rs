use comment_board_shared::PaginationState;

/// Page bounds derived from a [`PaginationState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub total: u64,
    pub page_size: u64,
    /// One-based.
    pub current_page: u64,
}

impl Window {
    /// Position of the first element on the current page.
    pub fn start(&self) -> u64 {
        self.page_size
            .saturating_mul(self.current_page.saturating_sub(1))
    }

    /// Exclusive upper bound; never past `total`.
    pub fn end(&self) -> u64 {
        self.page_size
            .saturating_mul(self.current_page)
            .min(self.total)
    }
}

impl From<&PaginationState> for Window {
    fn from(state: &PaginationState) -> Self {
        let non_negative = |v: i64| u64::try_from(v).unwrap_or(0);
        Self {
            total: non_negative(state.total),
            page_size: non_negative(state.page_size),
            current_page: non_negative(state.current_page),
        }
    }
}

/// Collects the `[start, end)` slice of an ordered source.
///
/// The source is pulled one element at a time and never past `end`, so it can
/// be a live cursor. A source shorter than `total` simply ends the page early.
pub fn page<I, T, E>(source: I, window: &Window) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let (start, end) = (window.start(), window.end());
    let mut items = Vec::new();
    if start >= end {
        return Ok(items);
    }

    let mut source = source.into_iter();
    let mut position = 0;
    while position < end {
        let Some(item) = source.next() else {
            break;
        };
        let item = item?;
        if position >= start {
            items.push(item);
        }
        position += 1;
    }
    Ok(items)
}
