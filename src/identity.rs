//! Who is using the dashboard.
//!
//! Authentication itself happens elsewhere; this crate only receives the
//! outcome as an opaque user id or "anonymous".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    /// Visitor without an account; sees locally generated demo data.
    #[default]
    Anonymous,

    User(UserId),
}

impl Identity {
    pub fn user(id: impl Into<String>) -> Self {
        Identity::User(UserId::new(id))
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::Anonymous => None,
            Identity::User(id) => Some(id),
        }
    }
}
