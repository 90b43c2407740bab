//! Callback codec round-trip and rejection tests.

use vinoteka_bot::callback::{
    decode, encode, CallbackCommand, CallbackError, PageDirection, NEXT_PAGE_EMOJI,
    PREV_PAGE_EMOJI, SWITCH_PAGE_CALLBACK_KEY, SWITCH_WINERY_CALLBACK_KEY,
    WINERY_SELECTION_CALLBACK_KEY,
};

#[test]
fn test_round_trip_law_for_supported_tags() {
    let cases = [
        (
            encode(SWITCH_PAGE_CALLBACK_KEY, NEXT_PAGE_EMOJI),
            CallbackCommand::PageNavigation(PageDirection::Next),
        ),
        (
            encode(SWITCH_PAGE_CALLBACK_KEY, PREV_PAGE_EMOJI),
            CallbackCommand::PageNavigation(PageDirection::Previous),
        ),
        (
            encode(WINERY_SELECTION_CALLBACK_KEY, "31"),
            CallbackCommand::WinerySelection(31),
        ),
        (
            encode(SWITCH_WINERY_CALLBACK_KEY, "8"),
            CallbackCommand::WinerySwitch(8),
        ),
    ];

    for (payload, expected) in cases {
        assert_eq!(decode(&payload), Ok(expected), "payload {payload}");
    }
}

#[test]
fn test_wire_format_is_tag_colon_argument() {
    assert_eq!(encode(WINERY_SELECTION_CALLBACK_KEY, "42"), "winery_selection:42");
    assert_eq!(encode(SWITCH_PAGE_CALLBACK_KEY, NEXT_PAGE_EMOJI), "switch_page:➡️");
}

#[test]
fn test_bare_payloads() {
    assert_eq!(
        decode(NEXT_PAGE_EMOJI),
        Ok(CallbackCommand::PageNavigation(PageDirection::Next))
    );
    assert_eq!(decode("7788"), Ok(CallbackCommand::TankSelection(7788)));
}

#[test]
fn test_stale_or_foreign_payloads_never_panic() {
    let garbage = [
        "",
        ":",
        "::",
        "switch_page:",
        "unknown_tag:1",
        "winery_selection:NaN",
        "just words",
        "🙂",
        "-5",
    ];
    for payload in garbage {
        assert!(
            matches!(decode(payload), Err(CallbackError::UnknownCallback(_))),
            "payload {payload:?} should be rejected"
        );
    }
}
