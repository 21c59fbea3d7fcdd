//! Inbound request model
//!
//! The host platform adapter turns its own event types into a [`Request`]
//! before anything reaches the router. The kind union is closed: control
//! activation, form submission, list selection. Any other platform event is
//! the adapter's problem and never constructs a `Request`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Stable caller identity supplied by the host platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerId(String);

impl CallerId {
    /// Wrap a host-supplied caller id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CallerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CallerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Host-opaque reference to the rendered message a request originated from
///
/// Present when the caller activated a control inside an existing message;
/// absent for fresh top-level invocations. Its presence is what makes
/// [`crate::RequestContext::update`] legal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef(String);

impl MessageRef {
    /// Wrap a host-supplied message reference
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw reference string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The closed set of request kinds the router accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// A button-style control was activated
    ControlActivation,
    /// A form was submitted with named field values
    FormSubmission {
        /// Submitted values keyed by field id
        fields: IndexMap<String, String>,
    },
    /// One or more entries were chosen from a list control
    ListSelection {
        /// Chosen values in selection order
        values: Vec<String>,
    },
}

/// One inbound request: the echoed token, the caller, and kind payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    token: String,
    caller: CallerId,
    origin: Option<MessageRef>,
    kind: RequestKind,
}

impl Request {
    /// Build a control-activation request
    #[inline]
    #[must_use]
    pub fn control_activation(token: impl Into<String>, caller: impl Into<CallerId>) -> Self {
        Self {
            token: token.into(),
            caller: caller.into(),
            origin: None,
            kind: RequestKind::ControlActivation,
        }
    }

    /// Build a form-submission request
    #[inline]
    #[must_use]
    pub fn form_submission(
        token: impl Into<String>,
        caller: impl Into<CallerId>,
        fields: IndexMap<String, String>,
    ) -> Self {
        Self {
            token: token.into(),
            caller: caller.into(),
            origin: None,
            kind: RequestKind::FormSubmission { fields },
        }
    }

    /// Build a list-selection request
    #[inline]
    #[must_use]
    pub fn list_selection(
        token: impl Into<String>,
        caller: impl Into<CallerId>,
        values: Vec<String>,
    ) -> Self {
        Self {
            token: token.into(),
            caller: caller.into(),
            origin: None,
            kind: RequestKind::ListSelection { values },
        }
    }

    /// Attach the originating message reference
    #[inline]
    #[must_use]
    pub fn with_origin(mut self, origin: MessageRef) -> Self {
        self.origin = Some(origin);
        self
    }

    /// The token echoed back by the host platform, verbatim
    #[inline]
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The caller issuing this request
    #[inline]
    #[must_use]
    pub fn caller(&self) -> &CallerId {
        &self.caller
    }

    /// Originating message, when the request came from a rendered control
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Option<&MessageRef> {
        self.origin.as_ref()
    }

    /// The request kind and its payload
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }
}

impl From<String> for CallerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
