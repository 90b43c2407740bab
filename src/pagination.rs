//! Pagination arithmetic over an ordered result set.
//!
//! Ordering is the caller's responsibility (tank queries order by name); this
//! module only computes the visible window for a requested page. Requested
//! page numbers are clamped rather than rejected: navigation buttons are
//! computed against a total count that may be stale by the time the user taps
//! them, so an out-of-range page is a race, not an error.

/// How many items one page shows.
pub const PER_PAGE: usize = 10;
/// How many selector buttons fit in one keyboard row.
pub const MAX_BUTTON_IN_ROW: usize = 5;
/// Pages are numbered from 1.
pub const DEFAULT_PAGE: i64 = 1;

/// The minimal projection of a tank needed to render one list line and to
/// re-select the tank from an inline button.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TankRow {
    pub id: i64,
    /// 1-based display index within the current page.
    pub number: usize,
    pub name: String,
    pub temperature: Option<f64>,
}

/// One page of an ordered result set plus navigation availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Index range of the visible items within the source slice.
    pub start: usize,
    pub end: usize,
    /// Requested page clamped into `[1, total_pages]`.
    pub page: i64,
    pub total_pages: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Compute the visible window for `requested_page` over `total` ordered items.
///
/// Never fails: pages below 1 resolve to the first page, pages past the end
/// resolve to the last one. An empty source resolves to page 1 with an empty
/// window and no navigation in either direction.
pub fn paginate(total: usize, per_page: usize, requested_page: i64) -> PageWindow {
    let total_pages = (total.div_ceil(per_page)) as i64;
    let page = requested_page.clamp(DEFAULT_PAGE, total_pages.max(DEFAULT_PAGE));

    let start = ((page - 1) as usize * per_page).min(total);
    let end = (start + per_page).min(total);

    PageWindow {
        start,
        end,
        page,
        total_pages,
        has_previous: page > DEFAULT_PAGE,
        has_next: page < total_pages,
    }
}

/// Project the window's slice of `items` into display rows numbered from 1.
pub fn page_rows<T, F>(items: &[T], window: &PageWindow, project: F) -> Vec<TankRow>
where
    F: Fn(&T) -> (i64, String, Option<f64>),
{
    items[window.start..window.end]
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let (id, name, temperature) = project(item);
            TankRow { id, number: index + 1, name, temperature }
        })
        .collect()
}
