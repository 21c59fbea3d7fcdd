//! Testing utilities for the Convene workspace
//!
//! Shared fixtures: probe actions with invocation counters, bare screens,
//! and ready-made dashboards for dispatch tests.

#![allow(missing_docs)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use convene_core::{
    Action, CallerId, Content, Dashboard, NavError, PermissionPredicate, RequestContext, Screen,
};
use convene_route::{RoutePath, TokenArgs};

/// Action that records every invocation so tests can assert on dispatch.
pub struct ProbeAction {
    path: RoutePath,
    invocations: AtomicUsize,
    last_call: Mutex<Option<RecordedCall>>,
}

/// One recorded `handle_operation` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub caller: CallerId,
    pub operation: String,
    pub args: TokenArgs,
}

impl ProbeAction {
    pub fn new(path: RoutePath) -> Self {
        Self {
            path,
            invocations: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.last_call.lock().expect("probe lock poisoned").clone()
    }
}

#[async_trait]
impl Action for ProbeAction {
    fn path(&self) -> &RoutePath {
        &self.path
    }

    fn operations(&self) -> &[&str] {
        &["poke", "show"]
    }

    async fn handle_operation(
        &self,
        ctx: &mut RequestContext,
        operation: &str,
        args: &TokenArgs,
    ) -> Result<(), NavError> {
        match operation {
            "poke" | "show" => {
                self.invocations.fetch_add(1, Ordering::SeqCst);
                *self.last_call.lock().expect("probe lock poisoned") = Some(RecordedCall {
                    caller: ctx.caller().clone(),
                    operation: operation.to_string(),
                    args: args.clone(),
                });
                ctx.respond(Content::text(format!(
                    "handled {} for {}",
                    operation,
                    ctx.caller()
                )))?;
                Ok(())
            }
            other => Err(NavError::unknown_operation(self.path(), other)),
        }
    }
}

/// Screen that renders a fixed line and exposes a fixed action list.
pub struct StaticScreen {
    path: RoutePath,
    actions: Vec<Arc<dyn Action>>,
    permissions: Vec<Arc<dyn PermissionPredicate>>,
}

impl StaticScreen {
    pub fn new(path: RoutePath, actions: Vec<Arc<dyn Action>>) -> Self {
        Self {
            path,
            actions,
            permissions: Vec::new(),
        }
    }

    pub fn with_permission(mut self, predicate: Arc<dyn PermissionPredicate>) -> Self {
        self.permissions.push(predicate);
        self
    }
}

#[async_trait]
impl Screen for StaticScreen {
    fn path(&self) -> &RoutePath {
        &self.path
    }

    fn actions(&self) -> Vec<Arc<dyn Action>> {
        self.actions.clone()
    }

    fn permissions(&self) -> &[Arc<dyn PermissionPredicate>] {
        &self.permissions
    }

    async fn render(&self, ctx: &mut RequestContext) -> Result<(), NavError> {
        ctx.respond(Content::text(format!("screen {}", self.path())))?;
        Ok(())
    }
}

/// A dashboard with one home screen and one probe action under it.
///
/// Returns the dashboard together with the probe for assertions. The probe
/// lives at `<key>:home:probe`.
pub fn probe_dashboard(key: &str) -> (Arc<Dashboard>, Arc<ProbeAction>) {
    let screen_path = RoutePath::single(key).child("home");
    let probe = Arc::new(ProbeAction::new(screen_path.child("probe")));
    let screen = Arc::new(StaticScreen::new(
        screen_path,
        vec![probe.clone() as Arc<dyn Action>],
    ));
    (Arc::new(Dashboard::new(key, screen)), probe)
}

/// Same fixture, but with `predicate` guarding the probe action.
pub fn guarded_probe_dashboard(
    key: &str,
    predicate: Arc<dyn PermissionPredicate>,
) -> (Arc<Dashboard>, Arc<GuardedProbe>) {
    let screen_path = RoutePath::single(key).child("home");
    let probe = Arc::new(GuardedProbe {
        inner: ProbeAction::new(screen_path.child("probe")),
        permissions: vec![predicate],
    });
    let screen = Arc::new(StaticScreen::new(
        screen_path,
        vec![probe.clone() as Arc<dyn Action>],
    ));
    (Arc::new(Dashboard::new(key, screen)), probe)
}

/// Probe wrapper carrying permission predicates.
pub struct GuardedProbe {
    inner: ProbeAction,
    permissions: Vec<Arc<dyn PermissionPredicate>>,
}

impl GuardedProbe {
    pub fn invocations(&self) -> usize {
        self.inner.invocations()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.inner.last_call()
    }
}

#[async_trait]
impl Action for GuardedProbe {
    fn path(&self) -> &RoutePath {
        self.inner.path()
    }

    fn operations(&self) -> &[&str] {
        self.inner.operations()
    }

    fn permissions(&self) -> &[Arc<dyn PermissionPredicate>] {
        &self.permissions
    }

    async fn handle_operation(
        &self,
        ctx: &mut RequestContext,
        operation: &str,
        args: &TokenArgs,
    ) -> Result<(), NavError> {
        self.inner.handle_operation(ctx, operation, args).await
    }
}
