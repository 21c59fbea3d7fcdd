//! Process-wide navigation registry and the single dispatch boundary
//!
//! The registry is built once at startup from registered dashboards, walking
//! every screen/action enumeration into one flat `path → node` index, and is
//! immutable afterwards. [`NavigationRegistry::handle_interaction`] is the
//! only entry point for inbound requests: decode, resolve, permission-check,
//! dispatch, with every failure converted into a best-effort reply right
//! here, so no single bad request can terminate the service.

use std::collections::HashMap;
use std::sync::Arc;

use convene_route::{validate_segment, ConstructionError, RoutingToken};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::content::Content;
use crate::context::{Reply, RequestContext};
use crate::dashboard::Dashboard;
use crate::error::NavError;
use crate::node::{Action, PermissionPredicate, Screen};
use crate::request::Request;

static GLOBAL: OnceCell<NavigationRegistry> = OnceCell::new();

/// Configuration-time errors raised while assembling the registry
///
/// All of these mean the node tree is wired wrong. They surface during
/// startup (or in tests), never from a live request.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A dashboard key was registered twice
    #[error("dashboard key '{0}' is already registered")]
    DuplicateDashboard(String),

    /// The registration key does not match the dashboard's own key
    #[error("registration key '{registered}' does not match dashboard key '{dashboard}'")]
    KeyMismatch {
        /// Key passed to `register_dashboard`
        registered: String,
        /// Key the dashboard was constructed with
        dashboard: String,
    },

    /// Two nodes resolved to the same path
    #[error("node path '{0}' is already registered")]
    DuplicateNode(String),

    /// A child node's recorded path is not anchored under its parent
    #[error("node '{node}' is not anchored under '{parent}'")]
    MisanchoredNode {
        /// Path of the enclosing parent
        parent: String,
        /// Path the child carries
        node: String,
    },

    /// A node id cannot survive the token wire format
    #[error("invalid node id: {0}")]
    InvalidNodeId(#[from] ConstructionError),

    /// A registry was already installed into the process-wide slot
    #[error("a navigation registry is already installed")]
    AlreadyInstalled,
}

/// A resolved node: what a decoded path points at
enum NodeTarget {
    Dashboard(Arc<Dashboard>),
    Screen(Arc<dyn Screen>),
    Action(Arc<dyn Action>),
}

impl NodeTarget {
    fn permissions(&self) -> &[Arc<dyn PermissionPredicate>] {
        match self {
            NodeTarget::Dashboard(dashboard) => dashboard.permissions(),
            NodeTarget::Screen(screen) => screen.permissions(),
            NodeTarget::Action(action) => action.permissions(),
        }
    }
}

/// Builder for the write-once registry
#[derive(Default)]
pub struct RegistryBuilder {
    dashboards: IndexMap<String, Arc<Dashboard>>,
}

impl RegistryBuilder {
    /// Create an empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dashboard under its key
    ///
    /// # Errors
    /// - `RegistryError::DuplicateDashboard`: keys are registered once
    /// - `RegistryError::KeyMismatch`: the key must equal the dashboard's
    ///   own key, or no token minted by its nodes would resolve back to it
    pub fn register_dashboard(
        &mut self,
        key: impl Into<String>,
        dashboard: Arc<Dashboard>,
    ) -> Result<&mut Self, RegistryError> {
        let key = key.into();
        if key != dashboard.key() {
            return Err(RegistryError::KeyMismatch {
                registered: key,
                dashboard: dashboard.key().to_string(),
            });
        }
        if self.dashboards.contains_key(&key) {
            return Err(RegistryError::DuplicateDashboard(key));
        }
        self.dashboards.insert(key, dashboard);
        Ok(self)
    }

    /// Walk every registered tree into the flat dispatch index
    ///
    /// # Errors
    /// Any mis-wired node fails the whole build; a service should not come
    /// up with a partially routable tree.
    pub fn build(self) -> Result<NavigationRegistry, RegistryError> {
        let mut nodes: HashMap<String, NodeTarget> = HashMap::new();

        for (key, dashboard) in &self.dashboards {
            validate_segment(key)?;
            insert_node(
                &mut nodes,
                dashboard.path().to_string(),
                NodeTarget::Dashboard(dashboard.clone()),
            )?;
            for screen in dashboard.screens() {
                index_screen(&mut nodes, dashboard.path().to_string(), screen)?;
            }
        }

        info!(
            dashboards = self.dashboards.len(),
            nodes = nodes.len(),
            "navigation registry built"
        );
        Ok(NavigationRegistry {
            dashboards: self.dashboards,
            nodes,
        })
    }
}

fn index_screen(
    nodes: &mut HashMap<String, NodeTarget>,
    parent: String,
    screen: &Arc<dyn Screen>,
) -> Result<(), RegistryError> {
    let path = screen.path();
    validate_segment(screen.id())?;
    anchored_under(&parent, path.to_string())?;
    insert_node(nodes, path.to_string(), NodeTarget::Screen(screen.clone()))?;

    for action in screen.actions() {
        validate_segment(action.id())?;
        anchored_under(&path.to_string(), action.path().to_string())?;
        insert_node(
            nodes,
            action.path().to_string(),
            NodeTarget::Action(action.clone()),
        )?;
    }
    for child in screen.sub_screens() {
        index_screen(nodes, path.to_string(), &child)?;
    }
    Ok(())
}

fn anchored_under(parent: &str, node: String) -> Result<(), RegistryError> {
    let anchored = node
        .rsplit_once(convene_route::PATH_DELIMITER)
        .is_some_and(|(prefix, _)| prefix == parent);
    if anchored {
        Ok(())
    } else {
        Err(RegistryError::MisanchoredNode {
            parent: parent.to_string(),
            node,
        })
    }
}

fn insert_node(
    nodes: &mut HashMap<String, NodeTarget>,
    path: String,
    target: NodeTarget,
) -> Result<(), RegistryError> {
    if nodes.contains_key(&path) {
        return Err(RegistryError::DuplicateNode(path));
    }
    nodes.insert(path, target);
    Ok(())
}

/// Immutable index from registration key to dashboard, and from path to node
///
/// Shared read-only across all request tasks; the only mutation surface is
/// [`RegistryBuilder`], which is consumed by `build`.
pub struct NavigationRegistry {
    dashboards: IndexMap<String, Arc<Dashboard>>,
    nodes: HashMap<String, NodeTarget>,
}

impl NavigationRegistry {
    /// Turn one inbound request into exactly one routed invocation
    ///
    /// Every error on the way (malformed token, stale path, permission
    /// denial, unknown operation, handler failure) is caught here, logged
    /// at the appropriate severity, and converted into a reply. `None` means
    /// the handler completed without producing one.
    pub async fn handle_interaction(&self, request: Request) -> Option<Reply> {
        let raw_token = request.token().to_string();
        let caller = request.caller().to_string();

        match self.dispatch(request).await {
            Ok(reply) => reply,
            Err(err) => {
                log_failure(&raw_token, &caller, &err);
                Some(Reply::Respond(failure_content(&err)))
            }
        }
    }

    /// Look up a registered dashboard by key
    #[inline]
    #[must_use]
    pub fn dashboard(&self, key: &str) -> Option<&Arc<Dashboard>> {
        self.dashboards.get(key)
    }

    /// Number of indexed nodes across all dashboards
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Install this registry into the process-wide slot
    ///
    /// # Errors
    /// `RegistryError::AlreadyInstalled` on a second install; there is no
    /// replace or mutate operation after that.
    pub fn install(self) -> Result<(), RegistryError> {
        GLOBAL
            .set(self)
            .map_err(|_| RegistryError::AlreadyInstalled)
    }

    /// The process-wide registry, if one was installed
    #[inline]
    #[must_use]
    pub fn global() -> Option<&'static NavigationRegistry> {
        GLOBAL.get()
    }

    async fn dispatch(&self, request: Request) -> Result<Option<Reply>, NavError> {
        let route = RoutingToken::decode(request.token())?;

        let target = self
            .nodes
            .get(&route.path.to_string())
            .ok_or_else(|| NavError::node_not_found(&route.path))?;

        for predicate in target.permissions() {
            if !predicate.allows(request.caller(), &route.path) {
                return Err(NavError::permission_denied(request.caller(), &route.path));
            }
        }

        let operation = route.operation.clone();
        let args = route.args.clone();
        let mut ctx = RequestContext::new(request, route);

        match target {
            NodeTarget::Dashboard(dashboard) => dashboard.home().render(&mut ctx).await?,
            NodeTarget::Screen(screen) => screen.render(&mut ctx).await?,
            NodeTarget::Action(action) => {
                debug!(
                    action = %action.path(),
                    operation = %operation,
                    "dispatching operation"
                );
                action.handle_operation(&mut ctx, &operation, &args).await?;
            }
        }

        Ok(ctx.into_reply())
    }
}

impl std::fmt::Debug for NavigationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationRegistry")
            .field("dashboards", &self.dashboards.len())
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

fn log_failure(token: &str, caller: &str, err: &NavError) {
    match err {
        NavError::Token(source) => {
            warn!(token, caller, %source, "inbound token failed to parse");
        }
        NavError::NodeNotFound { path } => {
            info!(token, caller, path, "token references a node that is no longer registered");
        }
        NavError::PermissionDenied { .. } => {
            debug!(token, caller, "permission predicate denied request");
        }
        NavError::UnknownOperation { action, operation } => {
            warn!(token, caller, action, operation, "unrecognized operation id");
        }
        other => {
            error!(token, caller, %other, "request handling failed");
        }
    }
}

fn failure_content(err: &NavError) -> Content {
    let text = match err {
        NavError::Token(_) | NavError::UnknownOperation { .. } => {
            "That control could not be processed. Please start again from the menu."
        }
        NavError::NodeNotFound { .. } => {
            "That menu is no longer available. It may have been replaced in an update."
        }
        NavError::PermissionDenied { .. } => "You are not authorized to use this control.",
        _ => "Something went wrong while handling this request.",
    };
    Content::text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use async_trait::async_trait;
    use convene_route::{RoutePath, TokenArgs};

    struct BareScreen {
        path: RoutePath,
        actions: Vec<Arc<dyn Action>>,
    }

    #[async_trait]
    impl Screen for BareScreen {
        fn path(&self) -> &RoutePath {
            &self.path
        }

        fn actions(&self) -> Vec<Arc<dyn Action>> {
            self.actions.clone()
        }

        async fn render(&self, ctx: &mut RequestContext) -> Result<(), NavError> {
            ctx.respond(Content::text("default view"))?;
            Ok(())
        }
    }

    struct EchoAction {
        path: RoutePath,
    }

    #[async_trait]
    impl Action for EchoAction {
        fn path(&self) -> &RoutePath {
            &self.path
        }

        fn operations(&self) -> &[&str] {
            &["show"]
        }

        async fn handle_operation(
            &self,
            ctx: &mut RequestContext,
            operation: &str,
            _args: &TokenArgs,
        ) -> Result<(), NavError> {
            match operation {
                "show" => {
                    ctx.respond(Content::text("shown"))?;
                    Ok(())
                }
                other => Err(NavError::unknown_operation(self.path(), other)),
            }
        }
    }

    fn dashboard(key: &str) -> Arc<Dashboard> {
        let screen_path = RoutePath::single(key).child("home");
        let action = Arc::new(EchoAction {
            path: screen_path.child("echo"),
        });
        let screen = Arc::new(BareScreen {
            path: screen_path,
            actions: vec![action],
        });
        Arc::new(Dashboard::new(key, screen))
    }

    #[test]
    fn duplicate_dashboard_key_rejected() {
        let mut builder = RegistryBuilder::new();
        builder.register_dashboard("vote", dashboard("vote")).unwrap();
        let result = builder.register_dashboard("vote", dashboard("vote"));
        assert!(matches!(result, Err(RegistryError::DuplicateDashboard(_))));
    }

    #[test]
    fn key_mismatch_rejected() {
        let mut builder = RegistryBuilder::new();
        let result = builder.register_dashboard("admin", dashboard("vote"));
        assert!(matches!(result, Err(RegistryError::KeyMismatch { .. })));
    }

    #[test]
    fn build_indexes_whole_tree() {
        let mut builder = RegistryBuilder::new();
        builder.register_dashboard("vote", dashboard("vote")).unwrap();
        let registry = builder.build().unwrap();
        // dashboard + screen + action
        assert_eq!(registry.node_count(), 3);
        assert!(registry.dashboard("vote").is_some());
        assert!(registry.dashboard("admin").is_none());
    }

    #[test]
    fn misanchored_screen_fails_build() {
        let screen = Arc::new(BareScreen {
            // Anchored under a different dashboard key on purpose.
            path: RoutePath::single("other").child("home"),
            actions: Vec::new(),
        });
        let dashboard = Arc::new(Dashboard::new("vote", screen));
        let mut builder = RegistryBuilder::new();
        builder.register_dashboard("vote", dashboard).unwrap();
        let result = builder.build();
        assert!(matches!(result, Err(RegistryError::MisanchoredNode { .. })));
    }

    #[tokio::test]
    async fn dashboard_token_renders_home_view() {
        let mut builder = RegistryBuilder::new();
        builder.register_dashboard("vote", dashboard("vote")).unwrap();
        let registry = builder.build().unwrap();

        let home = registry.dashboard("vote").unwrap().home_token().unwrap();
        let reply = registry
            .handle_interaction(Request::control_activation(home.as_str(), "caller-1"))
            .await
            .unwrap();
        assert_eq!(reply.content().text.as_deref(), Some("default view"));
    }

    #[tokio::test]
    async fn malformed_token_yields_generic_reply() {
        let registry = RegistryBuilder::new().build().unwrap();
        let reply = registry
            .handle_interaction(Request::control_activation("nonsense", "caller-1"))
            .await
            .unwrap();
        assert!(reply
            .content()
            .text
            .as_deref()
            .unwrap()
            .contains("could not be processed"));
    }

    #[tokio::test]
    async fn install_once_then_duplicate_fails() {
        let registry = RegistryBuilder::new().build().unwrap();
        registry.install().unwrap();
        assert!(NavigationRegistry::global().is_some());

        let second = RegistryBuilder::new().build().unwrap();
        assert!(matches!(
            second.install(),
            Err(RegistryError::AlreadyInstalled)
        ));
    }
}
