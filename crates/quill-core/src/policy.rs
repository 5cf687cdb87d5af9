//! # Authorization Policy
//!
//! The two-tier model evaluated on every procedure call: a visibility tier
//! (may the caller see drafts?) and a mutation tier (may the caller write?).
//! Both checks live here so a new procedure cannot quietly miss one.

use crate::error::{AppError, Result};
use crate::models::{Role, User};

/// The resolved identity of the current request, or anonymous.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    user: Option<User>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.user, Some(User { role: Role::Admin, .. }))
    }

    /// Visibility tier: only authenticated admins may see unpublished posts.
    /// Callers that fail this check have any opt-in flag silently ignored.
    pub fn can_view_unpublished(&self) -> bool {
        self.is_admin()
    }

    /// Mutation tier: rejects everyone but authenticated admins, before any
    /// data access happens.
    pub fn require_admin(&self) -> Result<&User> {
        match &self.user {
            Some(user) if user.role == Role::Admin => Ok(user),
            _ => Err(AppError::Forbidden("Admin access required".into())),
        }
    }
}
