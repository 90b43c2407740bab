//! Per-chat session state.
//!
//! A session holds just enough to resume a multi-step interaction: which
//! command is waiting for a follow-up reply, which user is waiting for a
//! winery choice, and the last rendered tank page. Every handler receives the
//! store explicitly and reads/writes whole sessions; there is no ambient
//! conversation context. Expiry of idle sessions is the hosting environment's
//! policy, not implemented here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio::sync::Mutex;

use crate::pagination::TankRow;

/// A command that saved itself and is waiting for the next inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingCommand {
    Authenticate,
    Search,
}

/// Conversation state for one chat.
///
/// `tanks_page` and `current_page` are set together or not at all; the
/// accessors below are the only way to touch them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pending_command: Option<PendingCommand>,
    pending_user_id: Option<i64>,
    tanks_page: Option<Vec<TankRow>>,
    current_page: Option<i64>,
}

impl Session {
    pub fn pending_command(&self) -> Option<PendingCommand> {
        self.pending_command
    }

    /// Save a pending command, to be resumed by the next inbound message.
    pub fn save_pending_command(&mut self, command: PendingCommand) {
        self.pending_command = Some(command);
    }

    /// Take the pending command, leaving none behind. A handler that wants to
    /// stay pending re-saves it explicitly.
    pub fn take_pending_command(&mut self) -> Option<PendingCommand> {
        self.pending_command.take()
    }

    pub fn pending_user_id(&self) -> Option<i64> {
        self.pending_user_id
    }

    pub fn save_pending_user_id(&mut self, user_id: i64) {
        self.pending_user_id = Some(user_id);
    }

    pub fn take_pending_user_id(&mut self) -> Option<i64> {
        self.pending_user_id.take()
    }

    /// Store the rendered page snapshot together with its page number.
    pub fn save_page(&mut self, rows: Vec<TankRow>, page: i64) {
        self.tanks_page = Some(rows);
        self.current_page = Some(page);
    }

    pub fn current_page(&self) -> Option<i64> {
        self.current_page
    }

    /// Take the current page number, clearing the snapshot with it.
    pub fn take_page(&mut self) -> Option<i64> {
        self.tanks_page = None;
        self.current_page.take()
    }
}

/// In-memory session store keyed by chat id.
///
/// One map guarded by one mutex; handlers load a clone, mutate it, and store
/// it back. Rapid taps from the same chat may interleave, which downstream
/// code tolerates by clamping page numbers and no-opping on missing state.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<ChatId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the session for a chat, creating an empty one on first contact.
    pub async fn load(&self, chat_id: ChatId) -> Session {
        self.sessions.lock().await.entry(chat_id).or_default().clone()
    }

    pub async fn store(&self, chat_id: ChatId, session: Session) {
        self.sessions.lock().await.insert(chat_id, session);
    }
}
