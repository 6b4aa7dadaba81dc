//! Simulated sign-in.
//!
//! No authentication happens: the name given to [`Account::login`] is stored
//! under the `user` key and trusted by every view.

use tracing::instrument;

use crate::cart::Outcome;
use crate::error::Result;
use crate::models::{SessionUser, keys};
use crate::store::JsonStore;

/// The signed-in user of a session.
#[derive(Debug, Clone)]
pub struct Account {
    store: JsonStore,
}

impl Account {
    #[must_use]
    pub const fn new(store: JsonStore) -> Self {
        Self { store }
    }

    /// The stored user, if anyone is signed in.
    #[must_use]
    pub fn current_user(&self) -> Option<SessionUser> {
        self.store.load(keys::USER, None)
    }

    /// Sign in as `name`. A blank name is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Store` if the write fails.
    #[instrument(skip(self, email))]
    pub fn login(&self, name: &str, email: Option<&str>) -> Result<Outcome> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("Login ignored: blank name");
            return Ok(Outcome::Unchanged);
        }

        let user = SessionUser {
            name: name.to_string(),
            email: email
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .map(str::to_string),
        };
        self.store.save(keys::USER, &user)?;
        tracing::info!("Signed in");
        Ok(Outcome::Changed)
    }

    /// Sign out. Signing out when nobody is signed in is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Store` if the write fails.
    pub fn logout(&self) -> Result<Outcome> {
        if self.current_user().is_none() {
            return Ok(Outcome::Unchanged);
        }
        self.store.remove(keys::USER)?;
        tracing::info!("Signed out");
        Ok(Outcome::Changed)
    }
}
