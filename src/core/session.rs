//! Session - the locally known sign-in state.
//!
//! Authentication itself happens at an external identity provider. This module keeps
//! the identity the rest of the core partitions data by, plus the credential checks
//! the client runs before bothering the provider.

use crate::{
    errors::{Error, Result},
    models::UserIdentity,
};
use tokio::sync::watch;

/// Shortest password the sign-up form accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Author name used on reviews when no email local part is available.
pub const GUEST_AUTHOR: &str = "Guest";

/// Rejects a sign-up password the provider would refuse anyway. The email is left
/// for the provider to judge.
///
/// # Errors
/// Returns [`Error::InvalidCredentials`] when the password is shorter than
/// [`MIN_PASSWORD_LEN`] characters.
pub fn validate_sign_up(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::InvalidCredentials {
            reason: format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        });
    }

    Ok(())
}

/// Signed-in user details.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionUser {
    /// Whose data is visible
    pub identity: UserIdentity,
    /// Sign-in email, when the provider supplied one
    pub email: Option<String>,
    /// Profile name
    pub display_name: String,
}

impl SessionUser {
    /// Name attached to reviews: the part of the email before `@`, or [`GUEST_AUTHOR`].
    #[must_use]
    pub fn author_name(&self) -> String {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .map(str::trim)
            .filter(|local| !local.is_empty())
            .map_or_else(|| GUEST_AUTHOR.to_string(), str::to_string)
    }
}

/// Holds the current identity and notifies observers when it changes.
#[derive(Debug)]
pub struct Session {
    current: watch::Sender<SessionUser>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Starts signed out.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: watch::Sender::new(SessionUser::default()),
        }
    }

    /// Records a successful provider sign-in.
    pub fn sign_in(&self, uid: impl Into<String>, email: Option<String>, display_name: impl Into<String>) {
        let user = SessionUser {
            identity: UserIdentity::Authenticated(uid.into()),
            email,
            display_name: display_name.into(),
        };
        tracing::info!("User signed in: {}", user.identity);
        self.current.send_replace(user);
    }

    /// Drops back to the anonymous identity.
    pub fn sign_out(&self) {
        tracing::info!("User signed out");
        self.current.send_replace(SessionUser::default());
    }

    /// The identity data is currently partitioned by.
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        self.current.borrow().identity.clone()
    }

    /// Profile name, or "No Name" when the provider has none.
    #[must_use]
    pub fn display_name(&self) -> String {
        let user = self.current.borrow();
        if user.display_name.trim().is_empty() {
            "No Name".to_string()
        } else {
            user.display_name.clone()
        }
    }

    /// Name to attach to reviews written now.
    #[must_use]
    pub fn author_name(&self) -> String {
        self.current.borrow().author_name()
    }

    /// Receiver notified on sign-in and sign-out.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionUser> {
        self.current.subscribe()
    }
}
