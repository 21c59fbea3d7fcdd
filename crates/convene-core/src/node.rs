//! Navigation node traits: screens, actions, and permission predicates
//!
//! Nodes form a static tree (dashboard, screens, actions) built once at
//! startup and immutable afterwards. There are no parent pointers: each node
//! carries its own [`RoutePath`] (an id list from the dashboard root), and
//! the registry verifies the paths line up when the tree is indexed.

use std::sync::Arc;

use async_trait::async_trait;
use convene_route::{RoutePath, TokenArgs};

use crate::content::Control;
use crate::context::RequestContext;
use crate::error::NavError;
use crate::request::CallerId;

/// Reserved operation id that renders a screen's (or dashboard's) default view
pub const HOME_OPERATION: &str = "home";

/// Allow/deny check evaluated before any operation body runs
///
/// Predicates are synchronous: the decode/resolve/permission path performs
/// no I/O, so eligibility data a predicate consults must already be in
/// memory. The default for nodes without predicates is allow.
pub trait PermissionPredicate: Send + Sync {
    /// Whether `caller` may reach the node at `path`
    fn allows(&self, caller: &CallerId, path: &RoutePath) -> bool;
}

impl<F> PermissionPredicate for F
where
    F: Fn(&CallerId, &RoutePath) -> bool + Send + Sync,
{
    fn allows(&self, caller: &CallerId, path: &RoutePath) -> bool {
        self(caller, path)
    }
}

/// A terminal handler exposing a fixed set of named operations
///
/// The operation id arrives inside the token; dispatching over it is one
/// exhaustive match whose default arm returns
/// [`NavError::UnknownOperation`] so stale tokens degrade gracefully.
#[async_trait]
pub trait Action: Send + Sync {
    /// Full path of this action, dashboard key first
    fn path(&self) -> &RoutePath;

    /// Id of this action within its screen
    fn id(&self) -> &str {
        self.path().leaf().unwrap_or_default()
    }

    /// The fixed, enumerable set of operation ids this action handles
    fn operations(&self) -> &[&str];

    /// Permission predicates guarding this action (default: allow)
    fn permissions(&self) -> &[Arc<dyn PermissionPredicate>] {
        &[]
    }

    /// Dispatch one operation
    ///
    /// `args` is the decoded token argument set, or, when another action
    /// delegates a step, that action's augmented copy. Kind-specific payload
    /// (form fields, selected values) comes through `ctx`.
    async fn handle_operation(
        &self,
        ctx: &mut RequestContext,
        operation: &str,
        args: &TokenArgs,
    ) -> Result<(), NavError>;

    /// A renderable control pre-bound to this action's default operation
    ///
    /// Actions reached only by delegation have no standalone control; the
    /// default returns [`NavError::NoStandaloneControl`], which is a
    /// design-time error: render code propagates it and tests fail fast.
    fn component(&self) -> Result<Control, NavError> {
        Err(NavError::no_standalone_control(self.path()))
    }
}

/// Groups related actions and child screens, and renders a default view
#[async_trait]
pub trait Screen: Send + Sync {
    /// Full path of this screen, dashboard key first
    fn path(&self) -> &RoutePath;

    /// Id of this screen within its parent
    fn id(&self) -> &str {
        self.path().leaf().unwrap_or_default()
    }

    /// Child screens, complete: the registry indexes the whole tree from
    /// this enumeration at startup
    fn sub_screens(&self) -> Vec<Arc<dyn Screen>> {
        Vec::new()
    }

    /// Actions attached to this screen, complete
    fn actions(&self) -> Vec<Arc<dyn Action>>;

    /// Permission predicates guarding this screen (default: allow)
    fn permissions(&self) -> &[Arc<dyn PermissionPredicate>] {
        &[]
    }

    /// Render the default view: the initial message offering navigational
    /// choices
    async fn render(&self, ctx: &mut RequestContext) -> Result<(), NavError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_predicate() {
        let allow_alice = |caller: &CallerId, _: &RoutePath| caller.as_str() == "alice";
        let path = RoutePath::single("consider");
        assert!(allow_alice.allows(&CallerId::new("alice"), &path));
        assert!(!allow_alice.allows(&CallerId::new("bob"), &path));
    }
}
