//! Authentication flow.
//!
//! Authentication is a gate, not an exception: any update from a chat with
//! no account diverts here, prompts for a phone number, and the original
//! update is dropped. The flow finishes either immediately (user owns one
//! winery) or after a `winery_selection` callback (user owns several).

use anyhow::Result;
use teloxide::types::{ChatId, KeyboardRemove, ReplyMarkup};
use tracing::{debug, info};

use crate::callback::WINERY_SELECTION_CALLBACK_KEY;
use crate::directory::Directory;
use crate::localization::{t_args_lang, t_lang};
use crate::phone;
use crate::session::{PendingCommand, SessionStore};

use super::ui_builder;
use super::Outbound;

/// Enter the flow: save the pending marker and ask for a contact.
pub async fn begin_authentication(
    sessions: &SessionStore,
    chat_id: ChatId,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    info!(user_id = %chat_id, "Prompting unauthenticated chat for a phone number");

    let mut session = sessions.load(chat_id).await;
    session.save_pending_command(PendingCommand::Authenticate);
    sessions.store(chat_id, session).await;

    Ok(vec![Outbound::with_markup(
        t_lang("authentication-prompt", language_code),
        ReplyMarkup::Keyboard(ui_builder::contact_request_keyboard(language_code)),
    )])
}

/// A contact was shared in reply to the authentication prompt: verify the
/// phone number and either bind the account or defer to a winery choice.
pub async fn verify_phone<D: Directory>(
    directory: &D,
    sessions: &SessionStore,
    chat_id: ChatId,
    phone_number: &str,
    language_code: Option<&str>,
) -> Result<Vec<Outbound>> {
    let subscriber_number = phone::subscriber_number(phone_number);

    let Some(user) = directory.user_by_subscriber_number(&subscriber_number).await? else {
        debug!(user_id = %chat_id, "No user matches the shared phone number");
        let mut session = sessions.load(chat_id).await;
        session.save_pending_command(PendingCommand::Authenticate);
        sessions.store(chat_id, session).await;
        return Ok(vec![Outbound::plain(t_lang("no-user", language_code))]);
    };

    let wineries = directory.wineries_of(user.id).await?;

    let mut session = sessions.load(chat_id).await;
    session.take_pending_command();

    if wineries.len() == 1 {
        let winery = &wineries[0];
        directory.create_account(chat_id, user.id, winery.id).await?;
        sessions.store(chat_id, session).await;

        info!(user_id = %chat_id, winery = %winery.name, "Account created");
        Ok(vec![Outbound::with_markup(
            t_args_lang("authorization-success", &[("winery", &winery.name)], language_code),
            ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
        )])
    } else {
        // Final binding is deferred to a winery_selection callback.
        session.save_pending_user_id(user.id);
        sessions.store(chat_id, session).await;

        debug!(
            user_id = %chat_id,
            wineries = wineries.len(),
            "User owns several wineries, awaiting choice"
        );
        Ok(vec![Outbound::with_markup(
            t_lang("available-wineries-list", language_code),
            ReplyMarkup::InlineKeyboard(ui_builder::winery_keyboard(
                &wineries,
                WINERY_SELECTION_CALLBACK_KEY,
            )),
        )])
    }
}
