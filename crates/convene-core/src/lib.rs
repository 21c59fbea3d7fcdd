//! Convene Core - sessionless dialog navigation
//!
//! The dispatch engine for a multi-step dialog front end that keeps no
//! server-side session:
//! - One bounded token per inbound request carries the full navigation state
//! - Dashboards, screens, and actions form a static tree, registered once
//! - The registry turns each request into exactly one permission-checked
//!   handler invocation
//! - Pagination composes onto any action through the same token mechanism
//!
//! Rendering text and persisting domain records are collaborators behind the
//! [`content`] and handler boundaries; nothing in this crate stores domain
//! state between requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use convene_core::{NavigationRegistry, RegistryBuilder, Request};
//!
//! # async fn example(dashboard: std::sync::Arc<convene_core::Dashboard>) {
//! let mut builder = RegistryBuilder::new();
//! builder.register_dashboard("consider", dashboard).unwrap();
//! let registry = builder.build().unwrap();
//!
//! let request = Request::control_activation("consider:home", "caller-1");
//! let reply = registry.handle_interaction(request).await;
//! # }
//! ```

pub mod content;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod node;
pub mod pagination;
pub mod registry;
pub mod request;

// Re-exports for convenience
pub use content::{
    Block, Button, Content, Control, ControlRow, ControlStyle, FormField, FormSpec, SelectMenu,
    SelectOption, Visibility,
};
pub use context::{Reply, RequestContext};
pub use dashboard::Dashboard;
pub use error::NavError;
pub use node::{Action, PermissionPredicate, Screen, HOME_OPERATION};
pub use pagination::{Paginated, PAGE_ARG, PAGE_SIZE, PAGINATE_OPERATION};
pub use registry::{NavigationRegistry, RegistryBuilder, RegistryError};
pub use request::{CallerId, MessageRef, Request, RequestKind};

// Token vocabulary re-exported so downstream crates depend on one surface.
pub use convene_route::{
    ConstructionError, DecodedRoute, RoutePath, RoutingToken, TokenArgs, TokenError,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building dashboards on the navigation core
    pub use crate::{
        Action, Block, Button, CallerId, Content, Control, ControlRow, Dashboard, NavError,
        NavigationRegistry, Paginated, PermissionPredicate, RegistryBuilder, Reply, Request,
        RequestContext, RoutePath, RoutingToken, Screen, SelectMenu, SelectOption, TokenArgs,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
