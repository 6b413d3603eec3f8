//! Current-learner port.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Identity of the learner the engine acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub id: String,
    /// Premium learners bypass prerequisite locks.
    #[serde(default)]
    pub is_premium: bool,
}

impl UserContext {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_premium: false,
        }
    }

    pub fn premium(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_premium: true,
        }
    }
}

pub trait SessionStore: Send + Sync {
    /// The authenticated learner, if any.
    fn current_user(&self) -> Option<UserContext>;
}

/// Session held in process memory.
#[derive(Debug, Default)]
pub struct LocalSession {
    user: RwLock<Option<UserContext>>,
}

impl LocalSession {
    pub fn new(user: UserContext) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: UserContext) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    pub fn sign_out(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl SessionStore for LocalSession {
    fn current_user(&self) -> Option<UserContext> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
