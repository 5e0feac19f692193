//! Who the current user is, as far as locally partitioned data is concerned.

use std::fmt;

/// Storage id of the anonymous favorites bucket.
pub const GUEST_USER_ID: &str = "guest";

/// The identity favorites and reviews are attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum UserIdentity {
    /// Signed in through the identity provider with this uid
    Authenticated(String),
    /// No session
    #[default]
    Anonymous,
}

impl UserIdentity {
    /// Builds an identity from an optional provider uid.
    #[must_use]
    pub fn from_uid(uid: Option<String>) -> Self {
        uid.map_or(Self::Anonymous, Self::Authenticated)
    }

    /// Storage partition `(user_id, is_guest)` for this identity.
    #[must_use]
    pub fn partition(&self) -> (&str, bool) {
        match self {
            Self::Authenticated(uid) => (uid.as_str(), false),
            Self::Anonymous => (GUEST_USER_ID, true),
        }
    }

    /// Whether a provider session exists.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated(uid) => write!(f, "{uid}"),
            Self::Anonymous => write!(f, "{GUEST_USER_ID}"),
        }
    }
}
