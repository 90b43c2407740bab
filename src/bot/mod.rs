//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `router`: Maps inbound updates to handlers, consulting session state
//! - `auth`: Phone-number authentication flow
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages
//!
//! This file holds the transport boundary: teloxide updates are reduced to
//! [`Inbound`] values, handlers return [`Outbound`] values, and the entry
//! functions below do the actual sending plus the validation-error rescue.

pub mod auth;
pub mod callback_handler;
pub mod router;
pub mod ui_builder;

pub use router::handle_update;

use anyhow::Result;
use std::sync::Arc;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ReplyMarkup;
use tracing::{debug, error, warn};

use crate::directory::{Directory, DomainError, PgDirectory};
use crate::localization::t_lang;
use crate::session::SessionStore;

/// An inbound update, reduced to the shape the router dispatches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A `/command` message, arguments split on whitespace.
    Command { name: String, args: Vec<String> },
    /// Free text, possibly a reply and possibly carrying a shared contact.
    Text { text: String, replied_to: Option<String>, contact: Option<String> },
    /// An inline-button tap echoing its payload.
    Callback { payload: String },
}

/// One outbound chat message.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub text: String,
    pub reply_markup: Option<ReplyMarkup>,
}

impl Outbound {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), reply_markup: None }
    }

    pub fn with_markup(text: impl Into<String>, reply_markup: ReplyMarkup) -> Self {
        Self { text: text.into(), reply_markup: Some(reply_markup) }
    }
}

/// Reduce a Telegram message to an [`Inbound`], or `None` for message kinds
/// the bot does not handle (photos, stickers, ...).
pub fn classify(msg: &Message) -> Option<Inbound> {
    if let Some(contact) = msg.contact() {
        return Some(Inbound::Text {
            text: msg.text().unwrap_or_default().to_string(),
            replied_to: replied_to_text(msg),
            contact: Some(contact.phone_number.clone()),
        });
    }

    let text = msg.text()?;
    if text.starts_with('/') {
        if let Some((name, args)) = parse_command(text) {
            return Some(Inbound::Command { name, args });
        }
    }

    Some(Inbound::Text {
        text: text.to_string(),
        replied_to: replied_to_text(msg),
        contact: None,
    })
}

fn replied_to_text(msg: &Message) -> Option<String> {
    msg.reply_to_message().and_then(|replied| replied.text()).map(ToString::to_string)
}

fn parse_command(text: &str) -> Option<(String, Vec<String>)> {
    let mut parts = text.split_whitespace();
    let first = parts.next()?;
    let name = first.strip_prefix('/')?;
    // Commands in groups arrive as /command@bot_name.
    let name = name.split('@').next().unwrap_or(name);
    if name.is_empty() {
        return None;
    }

    Some((name.to_lowercase(), parts.map(str::to_string).collect()))
}

/// Entry point for message updates.
pub async fn message_entry(
    bot: Bot,
    msg: Message,
    directory: Arc<PgDirectory>,
    sessions: SessionStore,
) -> Result<()> {
    let Some(inbound) = classify(&msg) else {
        debug!(user_id = %msg.chat.id, "Ignoring unsupported message type");
        return Ok(());
    };

    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_ref())
        .map(|s| s.as_str());

    process(&bot, msg.chat.id, inbound, directory.as_ref(), &sessions, language_code).await
}

/// Entry point for callback-query updates.
pub async fn callback_entry(
    bot: Bot,
    q: CallbackQuery,
    directory: Arc<PgDirectory>,
    sessions: SessionStore,
) -> Result<()> {
    let chat_id = match q.message.as_ref() {
        Some(message) => message.chat().id,
        None => ChatId(q.from.id.0 as i64),
    };
    let language_code = q.from.language_code.as_deref();

    let result = match q.data {
        Some(payload) => {
            process(
                &bot,
                chat_id,
                Inbound::Callback { payload },
                directory.as_ref(),
                &sessions,
                language_code,
            )
            .await
        }
        None => Ok(()),
    };

    // Always clear the client-side loading state, even after a failure.
    bot.answer_callback_query(q.id).await?;

    result
}

async fn process<D: Directory>(
    bot: &Bot,
    chat_id: ChatId,
    inbound: Inbound,
    directory: &D,
    sessions: &SessionStore,
    language_code: Option<&str>,
) -> Result<()> {
    match router::handle_update(directory, sessions, chat_id, inbound, language_code).await {
        Ok(outbound) => deliver(bot, chat_id, outbound).await,
        Err(error) => match error.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(message)) => {
                warn!(user_id = %chat_id, error = %message, "Domain validation failed");
                let banner =
                    format!("{} \n\n{}", t_lang("error-prefix", language_code), message);
                bot.send_message(chat_id, banner).await?;
                Ok(())
            }
            _ => {
                error!(user_id = %chat_id, error = %error, "Update handling failed");
                Err(error)
            }
        },
    }
}

async fn deliver(bot: &Bot, chat_id: ChatId, outbound: Vec<Outbound>) -> Result<()> {
    for message in outbound {
        let request = bot.send_message(chat_id, message.text);
        match message.reply_markup {
            Some(markup) => request.reply_markup(markup).await?,
            None => request.await?,
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start"), Some(("start".to_string(), vec![])));
        assert_eq!(
            parse_command("/search cab franc"),
            Some(("search".to_string(), vec!["cab".to_string(), "franc".to_string()]))
        );
        assert_eq!(
            parse_command("/list@winery_bot"),
            Some(("list".to_string(), vec![]))
        );
        assert_eq!(parse_command("/"), None);
    }

    #[test]
    fn test_outbound_constructors() {
        let plain = Outbound::plain("hello");
        assert_eq!(plain.text, "hello");
        assert!(plain.reply_markup.is_none());

        let markup = Outbound::with_markup(
            "hi",
            ReplyMarkup::KeyboardRemove(teloxide::types::KeyboardRemove::new()),
        );
        assert!(markup.reply_markup.is_some());
    }
}
