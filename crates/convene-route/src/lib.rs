//! Routing token primitives for the Convene dialog router
//!
//! Everything a caller-held navigation token is made of:
//! - [`RoutePath`]: ordered segments addressing one node in a dashboard tree
//! - [`TokenArgs`]: insertion-ordered, unique key/value arguments
//! - [`RoutingToken`]: the bounded wire string and its codec
//!
//! Tokens are the only navigation state the system keeps: the host platform
//! echoes a token back verbatim when a control is activated, and the full
//! (dashboard, screen, action, operation, arguments) tuple is reconstructed
//! from it. Nothing here touches domain data; argument values are short
//! opaque identifiers.
//!
//! # Example
//!
//! ```rust
//! use convene_route::{RoutePath, RoutingToken, TokenArgs};
//!
//! # fn example() -> Result<(), convene_route::ConstructionError> {
//! let path = RoutePath::single("vote").child("selectRound");
//! let mut args = TokenArgs::new();
//! args.insert("fundingRoundId", "12")?;
//!
//! let token = RoutingToken::encode(&path, "show", &args)?;
//! assert_eq!(token.as_str(), "vote:selectRound:show:fundingRoundId=12");
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod error;
pub mod path;
pub mod token;

pub use args::TokenArgs;
pub use error::{ConstructionError, TokenError};
pub use path::{validate_segment, RoutePath};
pub use token::{DecodedRoute, RoutingToken, ARG_DELIMITER, MAX_TOKEN_LEN, PATH_DELIMITER};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
