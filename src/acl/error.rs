//! Permission core error types.

use thiserror::Error;

use crate::models::MembershipId;

/// Errors raised by the permission core.
///
/// Malformed host input and missing ownership data never show up here; they
/// are handled by excluding the affected records.
#[derive(Debug, Error)]
pub enum AclError {
    /// The relationship type setting has never been stored.
    #[error("Configuration value '{key}' is not set")]
    MissingConfig {
        /// The config key that was looked up.
        key: String,
    },

    /// The configured relationship type name matches no relationship type.
    #[error("Relationship type '{name}' does not exist")]
    UnknownRelationshipType {
        /// The configured A-to-B name.
        name: String,
    },

    /// The configured name matches several relationship types.
    #[error("Relationship type name '{name}' is ambiguous ({count} matches)")]
    AmbiguousRelationshipType {
        /// The configured A-to-B name.
        name: String,
        /// Number of matching types.
        count: usize,
    },

    /// The user may not edit this membership.
    #[error("You do not have permission to edit membership {membership_id}")]
    AccessDenied {
        /// The membership the user tried to open.
        membership_id: MembershipId,
    },

    /// The host user account has no linked contact.
    #[error("No contact is linked to user account {uf_id}")]
    UnknownUser {
        /// Host user ID.
        uf_id: i64,
    },

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl AclError {
    /// Misconfiguration that an operator has to fix.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingConfig { .. }
                | Self::UnknownRelationshipType { .. }
                | Self::AmbiguousRelationshipType { .. }
        )
    }

    /// Authorization failure to show to the end user.
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

pub type AclResult<T> = std::result::Result<T, AclError>;
