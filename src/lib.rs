//! # Vinoteka Telegram Bot
//!
//! A Telegram front-end for a winery-management backend: authenticates chat
//! users by phone number, routes commands and inline-button callbacks, and
//! paginates tank lists through per-chat session state.

pub mod bot;
pub mod callback;
pub mod directory;
pub mod localization;
pub mod pagination;
pub mod phone;
pub mod session;
