//! Callback handler: dispatch for decoded inline-button payloads.
//!
//! Undecodable payloads and payloads whose required session state is gone
//! are dropped silently: they come from keyboards on old messages, not from
//! user mistakes.

use anyhow::Result;
use teloxide::types::{ChatId, KeyboardRemove, ReplyMarkup};
use tracing::{debug, info};

use crate::callback::{decode, CallbackCommand, CallbackError, PageDirection};
use crate::directory::{Account, Directory, DomainError};
use crate::localization::t_args_lang;
use crate::session::SessionStore;

use super::{auth, router, ui_builder, Outbound};

/// Handle one callback payload.
pub async fn handle_callback<D: Directory>(
    directory: &D,
    sessions: &SessionStore,
    chat_id: ChatId,
    payload: &str,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    let command = match decode(payload) {
        Ok(command) => command,
        Err(CallbackError::UnknownCallback(payload)) => {
            debug!(user_id = %chat_id, payload = %payload, "Ignoring unknown callback payload");
            return Ok(vec![]);
        }
    };

    // Winery selection is the tail of the authentication flow; the sender
    // has no account yet, so it must not pass the gate.
    if let CallbackCommand::WinerySelection(winery_id) = command {
        return winery_selection(directory, sessions, chat_id, winery_id, language_code).await;
    }

    let Some(account) = directory.account_by_chat(chat_id).await? else {
        return auth::begin_authentication(sessions, chat_id, language_code).await;
    };

    match command {
        CallbackCommand::PageNavigation(direction) => {
            switch_page(directory, sessions, chat_id, &account, direction).await
        }
        CallbackCommand::TankSelection(tank_id) => {
            tank_selection(directory, chat_id, &account, tank_id, language_code).await
        }
        CallbackCommand::WinerySwitch(winery_id) => {
            winery_switch(directory, chat_id, winery_id, language_code).await
        }
        // Already handled before the gate.
        CallbackCommand::WinerySelection(_) => Ok(vec![]),
    }
}

/// Move one page forward or back from the session's current page.
///
/// A navigation tap with no stored page number is a stale keyboard: no
/// reply, session untouched.
async fn switch_page<D: Directory>(
    directory: &D,
    sessions: &SessionStore,
    chat_id: ChatId,
    account: &Account,
    direction: PageDirection,
) -> Result<Vec<Outbound>> {
    let session = sessions.load(chat_id).await;
    let Some(current_page) = session.current_page() else {
        debug!(user_id = %chat_id, "Ignoring page navigation with no current page");
        return Ok(vec![]);
    };

    let requested_page = match direction {
        PageDirection::Next => current_page + 1,
        PageDirection::Previous => current_page - 1,
    };

    let tanks = directory.tanks_of(account.winery_id, None).await?;
    router::render_tank_list(sessions, chat_id, &tanks, requested_page).await
}

async fn tank_selection<D: Directory>(
    directory: &D,
    chat_id: ChatId,
    account: &Account,
    tank_id: i64,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    let tank = directory
        .tank_by_id(account.winery_id, tank_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Tank {tank_id}")))?;

    debug!(user_id = %chat_id, tank = %tank.name, "Rendering tank details");
    Ok(vec![Outbound::plain(ui_builder::tank_info_text(&tank, language_code))])
}

async fn winery_switch<D: Directory>(
    directory: &D,
    chat_id: ChatId,
    winery_id: i64,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    directory.set_account_winery(chat_id, winery_id).await?;
    let winery = directory
        .winery_by_id(winery_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Winery {winery_id}")))?;

    info!(user_id = %chat_id, winery = %winery.name, "Account switched winery");
    Ok(vec![Outbound::plain(t_args_lang(
        "authorization-success",
        &[("winery", &winery.name)],
        language_code,
    ))])
}

/// Finish authentication for a user who owns several wineries.
async fn winery_selection<D: Directory>(
    directory: &D,
    sessions: &SessionStore,
    chat_id: ChatId,
    winery_id: i64,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    let mut session = sessions.load(chat_id).await;
    let Some(user_id) = session.take_pending_user_id() else {
        debug!(user_id = %chat_id, "Ignoring winery selection with no pending user");
        return Ok(vec![]);
    };
    sessions.store(chat_id, session).await;

    let winery = directory
        .winery_by_id(winery_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Winery {winery_id}")))?;

    // The selected winery must actually belong to the candidate user.
    let wineries = directory.wineries_of(user_id).await?;
    if !wineries.iter().any(|candidate| candidate.id == winery.id) {
        return Err(DomainError::NotFound(format!(
            "User {user_id} has no access to winery {winery_id}"
        ))
        .into());
    }

    directory.create_account(chat_id, user_id, winery.id).await?;

    info!(user_id = %chat_id, winery = %winery.name, "Account created after winery choice");
    Ok(vec![Outbound::with_markup(
        t_args_lang("authorization-success", &[("winery", &winery.name)], language_code),
        ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    )])
}
