//! In-memory directory fake shared by the integration tests.

use anyhow::Result;
use std::sync::Mutex;
use teloxide::types::ChatId;

use vinoteka_bot::directory::{Account, Directory, DomainError, Tank, User, Winery};

/// Reduce a stored phone number the way the production SQL does: strip a
/// leading `+7`, then a leading `8`, in sequence. Distinct from the inbound
/// reduction, which strips one prefix or the other.
fn stored_subscriber_number(raw: &str) -> &str {
    let stripped = raw.strip_prefix("+7").unwrap_or(raw);
    stripped.strip_prefix('8').unwrap_or(stripped)
}

#[derive(Default)]
pub struct FakeDirectory {
    pub users: Vec<User>,
    pub wineries: Vec<Winery>,
    /// (user_id, winery_id) membership pairs.
    pub memberships: Vec<(i64, i64)>,
    /// (winery_id, tank) pairs.
    pub tanks: Vec<(i64, Tank)>,
    pub accounts: Mutex<Vec<Account>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: i64, name: &str, phone_number: &str) -> Self {
        self.users.push(User {
            id,
            name: name.to_string(),
            phone_number: phone_number.to_string(),
        });
        self
    }

    pub fn with_winery(mut self, id: i64, name: &str) -> Self {
        self.wineries.push(Winery { id, name: name.to_string() });
        self
    }

    pub fn with_membership(mut self, user_id: i64, winery_id: i64) -> Self {
        self.memberships.push((user_id, winery_id));
        self
    }

    pub fn with_tank(mut self, winery_id: i64, id: i64, name: &str) -> Self {
        self.tanks.push((
            winery_id,
            Tank { id, name: name.to_string(), batch_number: None, temperature: None },
        ));
        self
    }

    pub fn with_account(self, chat_id: ChatId, user_id: i64, winery_id: i64) -> Self {
        self.accounts.lock().unwrap().push(Account {
            chat_id: chat_id.0,
            user_id,
            winery_id,
        });
        self
    }

    pub fn account(&self, chat_id: ChatId) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|account| account.chat_id == chat_id.0)
            .cloned()
    }
}

impl Directory for FakeDirectory {
    async fn account_by_chat(&self, chat_id: ChatId) -> Result<Option<Account>> {
        Ok(self.account(chat_id))
    }

    async fn user_by_subscriber_number(&self, number: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|user| stored_subscriber_number(&user.phone_number) == number)
            .cloned())
    }

    async fn wineries_of(&self, user_id: i64) -> Result<Vec<Winery>> {
        let mut wineries: Vec<Winery> = self
            .wineries
            .iter()
            .filter(|winery| {
                self.memberships
                    .iter()
                    .any(|(member, owned)| *member == user_id && *owned == winery.id)
            })
            .cloned()
            .collect();
        wineries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(wineries)
    }

    async fn winery_by_id(&self, winery_id: i64) -> Result<Option<Winery>> {
        Ok(self.wineries.iter().find(|winery| winery.id == winery_id).cloned())
    }

    async fn tanks_of(&self, winery_id: i64, filter: Option<&str>) -> Result<Vec<Tank>> {
        let needle = filter.map(str::to_lowercase);
        let mut tanks: Vec<Tank> = self
            .tanks
            .iter()
            .filter(|(owner, _)| *owner == winery_id)
            .map(|(_, tank)| tank.clone())
            .filter(|tank| match &needle {
                Some(needle) => {
                    tank.name.to_lowercase().contains(needle)
                        || tank
                            .batch_number
                            .as_deref()
                            .is_some_and(|batch| batch.to_lowercase().contains(needle))
                }
                None => true,
            })
            .collect();
        tanks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tanks)
    }

    async fn tank_by_id(&self, winery_id: i64, tank_id: i64) -> Result<Option<Tank>> {
        Ok(self
            .tanks
            .iter()
            .find(|(owner, tank)| *owner == winery_id && tank.id == tank_id)
            .map(|(_, tank)| tank.clone()))
    }

    async fn create_account(&self, chat_id: ChatId, user_id: i64, winery_id: i64) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|account| account.chat_id == chat_id.0) {
            return Err(DomainError::Validation(format!(
                "An account already exists for chat {chat_id}"
            ))
            .into());
        }
        accounts.push(Account { chat_id: chat_id.0, user_id, winery_id });
        Ok(())
    }

    async fn set_account_winery(&self, chat_id: ChatId, winery_id: i64) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.iter_mut().find(|account| account.chat_id == chat_id.0) {
            Some(account) => {
                account.winery_id = winery_id;
                Ok(())
            }
            None => Err(DomainError::NotFound(format!("No account for chat {chat_id}")).into()),
        }
    }
}
