//! Callback payload codec for inline keyboard buttons.
//!
//! Every inline button carries a string payload that Telegram echoes back
//! verbatim when the button is tapped. This module is the single place where
//! those strings are produced and interpreted: the rest of the bot dispatches
//! over [`CallbackCommand`], never over raw payload text.

use regex::Regex;
use std::sync::LazyLock;

pub const SWITCH_PAGE_CALLBACK_KEY: &str = "switch_page";
pub const WINERY_SELECTION_CALLBACK_KEY: &str = "winery_selection";
pub const SWITCH_WINERY_CALLBACK_KEY: &str = "switch_winery";

pub const NEXT_PAGE_EMOJI: &str = "➡️";
pub const PREV_PAGE_EMOJI: &str = "⬅️";

/// Tank selector buttons carry the bare tank id as their payload.
static TANK_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("tank id pattern is valid"));

/// Direction of a page-switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Next,
    Previous,
}

/// A decoded callback payload.
///
/// Constructed only by [`decode`]; never stored between updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackCommand {
    PageNavigation(PageDirection),
    TankSelection(i64),
    WinerySelection(i64),
    WinerySwitch(i64),
}

/// Failure to interpret a callback payload.
///
/// Inline keyboards go stale (a user can tap a button on an old message long
/// after the bot restarted), so callers must treat this as an update to
/// ignore, not as a crash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    UnknownCallback(String),
}

impl std::fmt::Display for CallbackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallbackError::UnknownCallback(payload) => {
                write!(f, "Unknown callback payload: {payload}")
            }
        }
    }
}

impl std::error::Error for CallbackError {}

/// Encode a tagged callback payload as `"<tag>:<argument>"`.
pub fn encode(tag: &str, argument: &str) -> String {
    format!("{tag}:{argument}")
}

/// Decode a callback payload into a [`CallbackCommand`].
///
/// Tagged payloads split on the first `:`. Payloads without a separator are
/// either a raw direction emoji (page navigation) or a bare decimal tank id;
/// everything else is [`CallbackError::UnknownCallback`].
pub fn decode(payload: &str) -> Result<CallbackCommand, CallbackError> {
    let unknown = || CallbackError::UnknownCallback(payload.to_string());

    match payload.split_once(':') {
        Some((SWITCH_PAGE_CALLBACK_KEY, argument)) => {
            direction_from(argument).map(CallbackCommand::PageNavigation).ok_or_else(unknown)
        }
        Some((WINERY_SELECTION_CALLBACK_KEY, argument)) => {
            parse_id(argument).map(CallbackCommand::WinerySelection).ok_or_else(unknown)
        }
        Some((SWITCH_WINERY_CALLBACK_KEY, argument)) => {
            parse_id(argument).map(CallbackCommand::WinerySwitch).ok_or_else(unknown)
        }
        Some(_) => Err(unknown()),
        None => {
            if let Some(direction) = direction_from(payload) {
                Ok(CallbackCommand::PageNavigation(direction))
            } else if TANK_ID_PATTERN.is_match(payload) {
                parse_id(payload).map(CallbackCommand::TankSelection).ok_or_else(unknown)
            } else {
                Err(unknown())
            }
        }
    }
}

fn direction_from(token: &str) -> Option<PageDirection> {
    match token {
        NEXT_PAGE_EMOJI => Some(PageDirection::Next),
        PREV_PAGE_EMOJI => Some(PageDirection::Previous),
        _ => None,
    }
}

fn parse_id(argument: &str) -> Option<i64> {
    argument.parse::<i64>().ok()
}
