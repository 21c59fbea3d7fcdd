//! Error types for navigation and dispatch
//!
//! Every per-request failure funnels into [`NavError`] and is converted into
//! a best-effort reply at the registry boundary, so no inbound request can
//! crash the process. Configuration failures live in
//! [`crate::registry::RegistryError`] and surface at startup instead.

use convene_route::{ConstructionError, RoutePath, TokenError};

use crate::request::CallerId;

/// Main navigation error type
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Inbound token failed to parse
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// A token or control could not be built at render time
    #[error("construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// Token parsed but no live node matches its path
    #[error("no live node at path '{path}'")]
    NodeNotFound {
        /// The unresolvable path
        path: String,
    },

    /// A permission predicate on the resolved node denied the caller
    #[error("caller '{caller}' is not authorized for '{path}'")]
    PermissionDenied {
        /// The denied caller
        caller: String,
        /// The node the caller tried to reach
        path: String,
    },

    /// Node exists but does not recognize the operation id
    #[error("unknown operation '{operation}' on action '{action}'")]
    UnknownOperation {
        /// Path of the addressed action
        action: String,
        /// The unrecognized operation id
        operation: String,
    },

    /// A second reply was attempted for the same request
    #[error("request already has a reply")]
    AlreadyResponded,

    /// `update` was called for a request with no originating message
    #[error("update requires an originating message")]
    UpdateWithoutOrigin,

    /// `component()` was called on an action without a standalone control
    #[error("action '{action}' has no standalone control")]
    NoStandaloneControl {
        /// Path of the action
        action: String,
    },

    /// A collaborator call failed in a way the action did not absorb
    #[error("collaborator failure: {0}")]
    Collaborator(String),
}

impl NavError {
    /// Build a [`NavError::NodeNotFound`] for a path
    #[inline]
    #[must_use]
    pub fn node_not_found(path: &RoutePath) -> Self {
        Self::NodeNotFound {
            path: path.to_string(),
        }
    }

    /// Build a [`NavError::PermissionDenied`] for a caller and node
    #[inline]
    #[must_use]
    pub fn permission_denied(caller: &CallerId, path: &RoutePath) -> Self {
        Self::PermissionDenied {
            caller: caller.to_string(),
            path: path.to_string(),
        }
    }

    /// Build a [`NavError::UnknownOperation`] for an action and operation id
    #[inline]
    #[must_use]
    pub fn unknown_operation(action: &RoutePath, operation: &str) -> Self {
        Self::UnknownOperation {
            action: action.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Build a [`NavError::NoStandaloneControl`] for an action
    #[inline]
    #[must_use]
    pub fn no_standalone_control(action: &RoutePath) -> Self {
        Self::NoStandaloneControl {
            action: action.to_string(),
        }
    }

    /// Whether this failure is an expected navigation outcome rather than a
    /// bug signal (drives log severity at the dispatch boundary)
    #[inline]
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound { .. } | Self::PermissionDenied { .. }
        )
    }
}
