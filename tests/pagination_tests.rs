//! Property-style checks for pagination arithmetic and keyboard layout.

use vinoteka_bot::bot::ui_builder::tank_list_keyboard;
use vinoteka_bot::pagination::{page_rows, paginate, TankRow, MAX_BUTTON_IN_ROW, PER_PAGE};

fn rows_for(window: &vinoteka_bot::pagination::PageWindow, total: usize) -> Vec<TankRow> {
    let names: Vec<String> = (0..total).map(|i| format!("Tank {i:03}")).collect();
    page_rows(&names, window, |name| (1, name.clone(), None))
}

#[test]
fn test_any_requested_page_resolves_within_bounds() {
    for total in [0usize, 1, 9, 10, 11, 25, 100] {
        for requested in -5..15 {
            let window = paginate(total, PER_PAGE, requested);
            assert!(window.page >= 1, "page {} for total {total}", window.page);
            assert!(
                window.page <= window.total_pages.max(1),
                "page {} beyond last for total {total}",
                window.page
            );
            assert!(window.end <= total);
            assert!(window.start <= window.end);
        }
    }
}

#[test]
fn test_total_pages_matches_ceiling_division() {
    for k in 0..4usize {
        for r in 0..PER_PAGE {
            let total = PER_PAGE * k + r;
            let expected = (k + usize::from(r > 0)) as i64;
            assert_eq!(paginate(total, PER_PAGE, 1).total_pages, expected, "total {total}");
        }
    }
}

#[test]
fn test_keyboard_row_counts() {
    // ceil(N / 5) selector rows plus 0 or 1 navigation rows.
    for total in [1usize, 4, 5, 6, 10, 12, 23] {
        for requested in 1..=3i64 {
            let window = paginate(total, PER_PAGE, requested);
            let rows = rows_for(&window, total);
            let keyboard = tank_list_keyboard(&rows, &window);

            let selector_rows = rows.len().div_ceil(MAX_BUTTON_IN_ROW);
            let nav_rows = usize::from(window.has_previous || window.has_next);
            assert_eq!(
                keyboard.inline_keyboard.len(),
                selector_rows + nav_rows,
                "total {total} page {requested}"
            );

            if window.has_previous && window.has_next {
                assert_eq!(keyboard.inline_keyboard.last().unwrap().len(), 2);
            } else if nav_rows == 1 {
                assert_eq!(keyboard.inline_keyboard.last().unwrap().len(), 1);
            }
        }
    }
}

#[test]
fn test_window_preserves_source_order() {
    let names: Vec<String> = (0..23).map(|i| format!("Tank {i:03}")).collect();
    let window = paginate(names.len(), PER_PAGE, 2);
    let rows = page_rows(&names, &window, |name| (1, name.clone(), None));

    let listed: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    let expected: Vec<&str> = names[10..20].iter().map(String::as_str).collect();
    assert_eq!(listed, expected);
}
