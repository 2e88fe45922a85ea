//! Account mutations

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountDraft};
use crate::protocol::{account_fields, verbs};

use super::store::EntityStore;

pub type AccountStore = EntityStore<Account>;

impl EntityStore<Account> {
    /// Create an account on the backend, then append it to the cache
    ///
    /// The backend answers `OK|id`. Older servers answer a bare `OK`; the
    /// store then reloads and picks out the new entry.
    pub async fn add(&self, draft: AccountDraft) -> Result<Account> {
        let draft = draft.normalized();
        draft.validate().map_err(Error::validation)?;

        let response = self
            .request(verbs::ADD_ACCOUNT, &account_fields(&draft))
            .await?;
        response.expect_verb(verbs::OK)?;

        match response.field(0).map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                let account = draft.into_account(id);
                let added = account.clone();
                // A push-driven reload may already have cached it
                self.apply(move |items| match items.iter_mut().find(|a| a.id == added.id) {
                    Some(slot) => *slot = added,
                    None => items.push(added),
                });
                Ok(account)
            }
            None => {
                debug!("ADD_ACCOUNT returned no id, reloading accounts");
                let known: HashSet<String> =
                    self.snapshot().iter().map(|a| a.id.clone()).collect();
                let snapshot = self.load().await?;
                snapshot
                    .iter()
                    .filter(|a| !known.contains(&a.id))
                    .find(|a| a.name == draft.name)
                    .or_else(|| snapshot.iter().rev().find(|a| a.name == draft.name))
                    .cloned()
                    .ok_or_else(|| {
                        Error::protocol(format!("added account '{}' missing after reload", draft.name))
                    })
            }
        }
    }

    /// Replace an account's fields; the cache entry changes only after `OK`
    pub async fn update(&self, id: &str, draft: AccountDraft) -> Result<Account> {
        let draft = draft.normalized();
        draft.validate().map_err(Error::validation)?;

        let mut fields = Vec::with_capacity(5);
        fields.push(id.to_string());
        fields.extend(account_fields(&draft));
        self.request(verbs::UPDATE_ACCOUNT, &fields)
            .await?
            .expect_verb(verbs::OK)?;

        let account = draft.into_account(id);
        let updated = account.clone();
        self.apply(move |items| match items.iter_mut().find(|a| a.id == updated.id) {
            Some(slot) => *slot = updated,
            None => items.push(updated),
        });
        Ok(account)
    }

    /// Delete an account; returns the removed id
    pub async fn remove(&self, id: &str) -> Result<String> {
        self.request(verbs::DELETE_ACCOUNT, &[id.to_string()])
            .await?
            .expect_verb(verbs::OK)?;

        let removed = id.to_string();
        self.apply(|items| items.retain(|a| a.id != removed));
        Ok(id.to_string())
    }

    pub fn find(&self, id: &str) -> Option<Account> {
        self.snapshot().iter().find(|a| a.id == id).cloned()
    }

    pub fn find_by_name(&self, name: &str) -> Option<Account> {
        let name = name.trim();
        self.snapshot()
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Sum of all cached balances, saturating at the `i64` bounds
    pub fn total_balance(&self) -> i64 {
        self.snapshot()
            .iter()
            .map(|a| a.balance)
            .fold(0, i64::saturating_add)
    }

    /// Callback form of [`add`](Self::add)
    pub fn add_to_backend<S, E>(self: &Arc<Self>, draft: AccountDraft, on_success: S, on_error: E)
    where
        S: FnOnce(Account) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.spawn(|store| async move { store.add(draft).await }, on_success, on_error);
    }

    /// Callback form of [`update`](Self::update)
    pub fn update_on_backend<S, E>(
        self: &Arc<Self>,
        id: impl Into<String>,
        draft: AccountDraft,
        on_success: S,
        on_error: E,
    ) where
        S: FnOnce(Account) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        let id = id.into();
        self.spawn(
            |store| async move { store.update(&id, draft).await },
            on_success,
            on_error,
        );
    }

    /// Callback form of [`remove`](Self::remove)
    pub fn remove_from_backend<S, E>(self: &Arc<Self>, id: impl Into<String>, on_success: S, on_error: E)
    where
        S: FnOnce(String) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        let id = id.into();
        self.spawn(|store| async move { store.remove(&id).await }, on_success, on_error);
    }
}
