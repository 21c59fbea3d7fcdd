//! Dashboard: the root of one navigation tree
//!
//! A dashboard renders nothing itself: a token addressing the dashboard key
//! alone delegates to its home screen's default view.

use std::sync::Arc;

use convene_route::{ConstructionError, RoutePath, RoutingToken, TokenArgs};

use crate::node::{PermissionPredicate, Screen, HOME_OPERATION};

/// Root navigation node, addressable by a human key
pub struct Dashboard {
    key: String,
    path: RoutePath,
    home: Arc<dyn Screen>,
    screens: Vec<Arc<dyn Screen>>,
    permissions: Vec<Arc<dyn PermissionPredicate>>,
}

impl Dashboard {
    /// Create a dashboard owning `home` as its home screen
    ///
    /// The home screen is part of the screen tree; additional top-level
    /// screens are attached with [`Dashboard::with_screen`].
    #[must_use]
    pub fn new(key: impl Into<String>, home: Arc<dyn Screen>) -> Self {
        let key = key.into();
        Self {
            path: RoutePath::single(key.clone()),
            key,
            screens: vec![home.clone()],
            home,
            permissions: Vec::new(),
        }
    }

    /// Attach another top-level screen
    #[inline]
    #[must_use]
    pub fn with_screen(mut self, screen: Arc<dyn Screen>) -> Self {
        self.screens.push(screen);
        self
    }

    /// Attach a permission predicate
    #[inline]
    #[must_use]
    pub fn with_permission(mut self, predicate: Arc<dyn PermissionPredicate>) -> Self {
        self.permissions.push(predicate);
        self
    }

    /// The human key this dashboard is registered under
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The single-segment path of this dashboard
    #[inline]
    #[must_use]
    pub fn path(&self) -> &RoutePath {
        &self.path
    }

    /// The home screen the first response is delegated to
    #[inline]
    #[must_use]
    pub fn home(&self) -> &Arc<dyn Screen> {
        &self.home
    }

    /// All top-level screens, home first
    #[inline]
    #[must_use]
    pub fn screens(&self) -> &[Arc<dyn Screen>] {
        &self.screens
    }

    /// Permission predicates guarding the dashboard root
    #[inline]
    #[must_use]
    pub fn permissions(&self) -> &[Arc<dyn PermissionPredicate>] {
        &self.permissions
    }

    /// Token that opens this dashboard's home view
    ///
    /// Useful for "back to start" controls and for the host's initial
    /// message in a channel.
    ///
    /// # Errors
    /// Construction rules as in [`RoutingToken::encode`].
    pub fn home_token(&self) -> Result<RoutingToken, ConstructionError> {
        RoutingToken::encode(&self.path, HOME_OPERATION, &TokenArgs::new())
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("key", &self.key)
            .field("screens", &self.screens.len())
            .finish()
    }
}
