//! Conversation router: maps an inbound update to its handler.
//!
//! Every update passes the authentication gate first (an account must exist
//! for the chat), then dispatches on shape: slash commands, free text that
//! may resume a pending command, or callback payloads. All session reads and
//! writes go through the explicit store; there is no ambient context.

use anyhow::Result;
use teloxide::types::{ChatId, ReplyMarkup};
use tracing::debug;

use crate::directory::{Account, Directory, Tank};
use crate::localization::{t_args_lang, t_lang};
use crate::pagination::{page_rows, paginate, DEFAULT_PAGE, PER_PAGE};
use crate::session::{PendingCommand, SessionStore};

use super::{auth, callback_handler, ui_builder, Inbound, Outbound};
use crate::callback::SWITCH_WINERY_CALLBACK_KEY;

/// Handle one inbound update, returning the messages to send.
pub async fn handle_update<D: Directory>(
    directory: &D,
    sessions: &SessionStore,
    chat_id: ChatId,
    inbound: Inbound,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    match inbound {
        Inbound::Command { name, args } => {
            handle_command(directory, sessions, chat_id, &name, args, language_code).await
        }
        Inbound::Text { text, replied_to, contact } => {
            handle_text(directory, sessions, chat_id, &text, replied_to, contact, language_code)
                .await
        }
        Inbound::Callback { payload } => {
            callback_handler::handle_callback(directory, sessions, chat_id, &payload, language_code)
                .await
        }
    }
}

async fn handle_command<D: Directory>(
    directory: &D,
    sessions: &SessionStore,
    chat_id: ChatId,
    name: &str,
    args: Vec<String>,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    let Some(account) = directory.account_by_chat(chat_id).await? else {
        return auth::begin_authentication(sessions, chat_id, language_code).await;
    };

    match name {
        "start" => Ok(vec![Outbound::plain(t_lang("start", language_code))]),
        "search" => search(directory, sessions, chat_id, &account, args, language_code).await,
        "list" => list(directory, sessions, chat_id, &account, language_code).await,
        "switch_winery" => switch_winery(directory, &account, language_code).await,
        _ => {
            debug!(user_id = %chat_id, command = %name, "Ignoring unknown command");
            Ok(vec![])
        }
    }
}

async fn handle_text<D: Directory>(
    directory: &D,
    sessions: &SessionStore,
    chat_id: ChatId,
    text: &str,
    replied_to: Option<String>,
    contact: Option<String>,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    // A contact shared in reply to the authentication prompt is recognized by
    // shape, before any gate: the sender is not authenticated yet.
    if let Some(phone_number) = contact {
        if replied_to.as_deref() == Some(t_lang("authentication-prompt", language_code).as_str()) {
            return auth::verify_phone(directory, sessions, chat_id, &phone_number, language_code)
                .await;
        }
    }

    let Some(account) = directory.account_by_chat(chat_id).await? else {
        return auth::begin_authentication(sessions, chat_id, language_code).await;
    };

    let mut session = sessions.load(chat_id).await;
    match session.take_pending_command() {
        Some(PendingCommand::Search) => {
            // The marker stays cleared unless the search re-saves it.
            sessions.store(chat_id, session).await;
            run_search(directory, sessions, chat_id, &account, text.trim(), language_code).await
        }
        Some(PendingCommand::Authenticate) | None => {
            sessions.store(chat_id, session).await;
            debug!(user_id = %chat_id, "Ignoring free text with no pending command");
            Ok(vec![])
        }
    }
}

/// `/search` with arguments runs immediately; without them it saves itself
/// as pending and prompts for a query.
async fn search<D: Directory>(
    directory: &D,
    sessions: &SessionStore,
    chat_id: ChatId,
    account: &Account,
    args: Vec<String>,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    if args.is_empty() {
        let mut session = sessions.load(chat_id).await;
        session.save_pending_command(PendingCommand::Search);
        sessions.store(chat_id, session).await;
        return Ok(vec![Outbound::plain(t_lang("search-prompt", language_code))]);
    }

    run_search(directory, sessions, chat_id, account, &args.join(" "), language_code).await
}

async fn run_search<D: Directory>(
    directory: &D,
    sessions: &SessionStore,
    chat_id: ChatId,
    account: &Account,
    query: &str,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    let tanks = directory.tanks_of(account.winery_id, Some(query)).await?;
    debug!(user_id = %chat_id, hits = tanks.len(), "Tank search completed");

    if tanks.is_empty() {
        let mut session = sessions.load(chat_id).await;
        session.save_pending_command(PendingCommand::Search);
        sessions.store(chat_id, session).await;
        return Ok(vec![Outbound::plain(t_lang("search-not-found", language_code))]);
    }

    if tanks.len() == 1 {
        return Ok(vec![Outbound::plain(ui_builder::tank_info_text(&tanks[0], language_code))]);
    }

    render_tank_list(sessions, chat_id, &tanks, DEFAULT_PAGE).await
}

async fn list<D: Directory>(
    directory: &D,
    sessions: &SessionStore,
    chat_id: ChatId,
    account: &Account,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    let tanks = directory.tanks_of(account.winery_id, None).await?;

    if tanks.is_empty() {
        return Ok(vec![Outbound::plain(t_lang("no-tanks", language_code))]);
    }

    render_tank_list(sessions, chat_id, &tanks, DEFAULT_PAGE).await
}

async fn switch_winery<D: Directory>(
    directory: &D,
    account: &Account,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    let wineries = directory.wineries_of(account.user_id).await?;

    if wineries.len() == 1 {
        return Ok(vec![Outbound::plain(t_args_lang(
            "one-available-winery",
            &[("winery", &wineries[0].name)],
            language_code,
        ))]);
    }

    Ok(vec![Outbound::with_markup(
        t_lang("available-wineries-list", language_code),
        ReplyMarkup::InlineKeyboard(ui_builder::winery_keyboard(
            &wineries,
            SWITCH_WINERY_CALLBACK_KEY,
        )),
    )])
}

/// Render one page of `tanks` and remember the snapshot in the session so
/// that navigation callbacks can resume from it.
pub(super) async fn render_tank_list(
    sessions: &SessionStore,
    chat_id: ChatId,
    tanks: &[Tank],
    requested_page: i64,
) -> Result<Vec<Outbound>> {
    let window = paginate(tanks.len(), PER_PAGE, requested_page);
    let rows = page_rows(tanks, &window, |tank| (tank.id, tank.name.clone(), tank.temperature));

    let mut session = sessions.load(chat_id).await;
    session.save_page(rows.clone(), window.page);
    sessions.store(chat_id, session).await;

    let keyboard = ui_builder::tank_list_keyboard(&rows, &window);
    Ok(vec![Outbound::with_markup(
        ui_builder::format_tank_list(&rows),
        ReplyMarkup::InlineKeyboard(keyboard),
    )])
}
