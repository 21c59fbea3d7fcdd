//! Per-request context and the reply slot
//!
//! A [`RequestContext`] is built by the registry for exactly one inbound
//! request, handed down through the handler chain, and discarded once the
//! reply is extracted. It is owned by the task handling the request and is
//! never shared.

use convene_route::{DecodedRoute, TokenArgs};

use crate::content::Content;
use crate::error::NavError;
use crate::request::{CallerId, Request, RequestKind};

/// What the host platform should do with the produced content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Send a new response to the caller
    Respond(Content),
    /// Replace the message the request originated from
    Update(Content),
}

impl Reply {
    /// The content carried either way
    #[inline]
    #[must_use]
    pub fn content(&self) -> &Content {
        match self {
            Reply::Respond(content) | Reply::Update(content) => content,
        }
    }

    /// Whether this reply replaces the originating message
    #[inline]
    #[must_use]
    pub fn is_update(&self) -> bool {
        matches!(self, Reply::Update(_))
    }
}

/// Uniform wrapper around one inbound request
///
/// Exposes the caller identity, the originating token and its decoded parts,
/// the kind-specific payload (submitted fields, selected values), and the
/// two reply operations. The reply slot accepts exactly one reply; the
/// choice between responding fresh and updating in place is made explicitly
/// at each call site.
#[derive(Debug)]
pub struct RequestContext {
    request: Request,
    route: DecodedRoute,
    reply: Option<Reply>,
}

impl RequestContext {
    /// Wrap a request and its decoded route
    #[inline]
    #[must_use]
    pub fn new(request: Request, route: DecodedRoute) -> Self {
        Self {
            request,
            route,
            reply: None,
        }
    }

    /// The caller issuing the request
    #[inline]
    #[must_use]
    pub fn caller(&self) -> &CallerId {
        self.request.caller()
    }

    /// The originating token, verbatim as the host echoed it
    #[inline]
    #[must_use]
    pub fn token(&self) -> &str {
        self.request.token()
    }

    /// The decoded route the token carried
    #[inline]
    #[must_use]
    pub fn route(&self) -> &DecodedRoute {
        &self.route
    }

    /// Arguments decoded from the originating token
    #[inline]
    #[must_use]
    pub fn args(&self) -> &TokenArgs {
        &self.route.args
    }

    /// The wrapped request
    #[inline]
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// A submitted form field, when this is a form-submission request
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&str> {
        match self.request.kind() {
            RequestKind::FormSubmission { fields } => fields.get(id).map(String::as_str),
            _ => None,
        }
    }

    /// Selected list values, empty for non-list requests
    #[must_use]
    pub fn selected_values(&self) -> &[String] {
        match self.request.kind() {
            RequestKind::ListSelection { values } => values,
            _ => &[],
        }
    }

    /// The first selected list value, if any
    #[inline]
    #[must_use]
    pub fn first_selected(&self) -> Option<&str> {
        self.selected_values().first().map(String::as_str)
    }

    /// Send the first response for this request
    ///
    /// # Errors
    /// `NavError::AlreadyResponded` if a reply was already produced.
    pub fn respond(&mut self, content: Content) -> Result<(), NavError> {
        if self.reply.is_some() {
            return Err(NavError::AlreadyResponded);
        }
        self.reply = Some(Reply::Respond(content));
        Ok(())
    }

    /// Replace the message this request originated from
    ///
    /// # Errors
    /// - `NavError::UpdateWithoutOrigin` for a fresh top-level invocation
    /// - `NavError::AlreadyResponded` if a reply was already produced
    pub fn update(&mut self, content: Content) -> Result<(), NavError> {
        if self.request.origin().is_none() {
            return Err(NavError::UpdateWithoutOrigin);
        }
        if self.reply.is_some() {
            return Err(NavError::AlreadyResponded);
        }
        self.reply = Some(Reply::Update(content));
        Ok(())
    }

    /// Whether a reply has been produced
    #[inline]
    #[must_use]
    pub fn has_replied(&self) -> bool {
        self.reply.is_some()
    }

    /// Extract the reply, consuming the context
    #[inline]
    #[must_use]
    pub fn into_reply(self) -> Option<Reply> {
        self.reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MessageRef;
    use convene_route::RoutingToken;
    use indexmap::IndexMap;

    fn context_for(request: Request) -> RequestContext {
        let route = RoutingToken::decode(request.token()).unwrap();
        RequestContext::new(request, route)
    }

    #[test]
    fn respond_only_once() {
        let mut ctx = context_for(Request::control_activation("a:b:show", "caller-1"));
        ctx.respond(Content::text("first")).unwrap();
        let second = ctx.respond(Content::text("second"));
        assert!(matches!(second, Err(NavError::AlreadyResponded)));

        match ctx.into_reply() {
            Some(Reply::Respond(content)) => assert_eq!(content.text.as_deref(), Some("first")),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn update_requires_origin() {
        let mut ctx = context_for(Request::control_activation("a:b:show", "caller-1"));
        let result = ctx.update(Content::text("nope"));
        assert!(matches!(result, Err(NavError::UpdateWithoutOrigin)));
        assert!(!ctx.has_replied());
    }

    #[test]
    fn update_with_origin_replaces_message() {
        let request = Request::control_activation("a:b:show", "caller-1")
            .with_origin(MessageRef::new("m-1"));
        let mut ctx = context_for(request);
        ctx.update(Content::text("replaced")).unwrap();
        assert!(ctx.into_reply().unwrap().is_update());
    }

    #[test]
    fn update_after_respond_rejected() {
        let request = Request::control_activation("a:b:show", "caller-1")
            .with_origin(MessageRef::new("m-1"));
        let mut ctx = context_for(request);
        ctx.respond(Content::text("first")).unwrap();
        assert!(matches!(
            ctx.update(Content::text("second")),
            Err(NavError::AlreadyResponded)
        ));
    }

    #[test]
    fn field_access_for_form_submission() {
        let mut fields = IndexMap::new();
        fields.insert("reason".to_string(), "well argued".to_string());
        let ctx = context_for(Request::form_submission("a:b:confirm", "caller-1", fields));

        assert_eq!(ctx.field("reason"), Some("well argued"));
        assert_eq!(ctx.field("missing"), None);
        assert!(ctx.selected_values().is_empty());
    }

    #[test]
    fn selected_values_for_list_selection() {
        let ctx = context_for(Request::list_selection(
            "a:b:select",
            "caller-1",
            vec!["12".to_string()],
        ));
        assert_eq!(ctx.first_selected(), Some("12"));
        assert_eq!(ctx.field("reason"), None);
    }

    #[test]
    fn token_args_visible_through_context() {
        let ctx = context_for(Request::control_activation("a:b:show:round=3", "caller-1"));
        assert_eq!(ctx.args().get("round"), Some("3"));
        assert_eq!(ctx.route().operation, "show");
    }
}
