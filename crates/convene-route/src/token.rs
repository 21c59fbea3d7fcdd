//! The bounded wire codec
//!
//! A [`RoutingToken`] is the single string the host platform round-trips for
//! us: `segment(:segment)*:operation(:key=value)*`, at most
//! [`MAX_TOKEN_LEN`] ASCII characters. Length and character rules are
//! enforced when a token is *built*: a control that cannot round-trip must
//! fail at render time, never when the caller activates it.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::args::TokenArgs;
use crate::error::{ConstructionError, TokenError};
use crate::path::{validate_segment, RoutePath};

/// Hard platform bound on token length
pub const MAX_TOKEN_LEN: usize = 100;

/// Delimiter between path segments and the operation id
pub const PATH_DELIMITER: char = ':';

/// Delimiter inside a `key=value` argument pair
pub const ARG_DELIMITER: char = '=';

/// An encoded, length-checked navigation token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingToken(String);

/// The parts a token decodes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRoute {
    /// Node address, dashboard key first
    pub path: RoutePath,
    /// Operation id scoped to the addressed action
    pub operation: String,
    /// Named arguments in wire order
    pub args: TokenArgs,
}

impl DecodedRoute {
    /// Re-encode these parts into a token
    ///
    /// # Errors
    /// Same rules as [`RoutingToken::encode`].
    pub fn to_token(&self) -> Result<RoutingToken, ConstructionError> {
        RoutingToken::encode(&self.path, &self.operation, &self.args)
    }
}

impl RoutingToken {
    /// Encode a path, operation id, and arguments into one token
    ///
    /// # Errors
    /// - `ConstructionError::InvalidSegment` for reserved delimiters or
    ///   non-ASCII in path segments or the operation id
    /// - `ConstructionError::TokenTooLong` when the encoding exceeds
    ///   [`MAX_TOKEN_LEN`]
    ///
    /// Argument keys/values were already validated when the [`TokenArgs`]
    /// were built.
    pub fn encode(
        path: &RoutePath,
        operation: &str,
        args: &TokenArgs,
    ) -> Result<Self, ConstructionError> {
        if path.is_empty() {
            return Err(ConstructionError::InvalidSegment(String::new()));
        }
        path.validate()?;
        validate_segment(operation)?;

        let mut raw = String::new();
        for segment in path.iter() {
            raw.push_str(segment);
            raw.push(PATH_DELIMITER);
        }
        raw.push_str(operation);
        for (key, value) in args.iter() {
            raw.push(PATH_DELIMITER);
            raw.push_str(key);
            raw.push(ARG_DELIMITER);
            raw.push_str(value);
        }

        if raw.len() > MAX_TOKEN_LEN {
            return Err(ConstructionError::TokenTooLong {
                length: raw.len(),
                limit: MAX_TOKEN_LEN,
            });
        }
        Ok(Self(raw))
    }

    /// Decode an inbound token into its parts
    ///
    /// Splits on [`PATH_DELIMITER`]; elements containing [`ARG_DELIMITER`]
    /// are argument pairs and must all trail the route part. The last bare
    /// element is the operation id, everything before it the path. Length is
    /// deliberately not re-checked here; the bound is a construction-time
    /// contract.
    ///
    /// # Errors
    /// Any structural violation yields a [`TokenError`].
    pub fn decode(raw: &str) -> Result<DecodedRoute, TokenError> {
        if raw.is_empty() {
            return Err(TokenError::Empty);
        }

        let mut route: Vec<String> = Vec::new();
        let mut args = TokenArgs::new();
        let mut in_args = false;

        for element in raw.split(PATH_DELIMITER) {
            match element.split_once(ARG_DELIMITER) {
                Some((key, value)) => {
                    if key.is_empty() {
                        return Err(TokenError::EmptyArgumentKey {
                            pair: element.to_string(),
                        });
                    }
                    if args.contains(key) {
                        return Err(TokenError::DuplicateArgument {
                            key: key.to_string(),
                        });
                    }
                    args.set(key, value)
                        .map_err(|_| TokenError::InvalidArgument {
                            pair: element.to_string(),
                        })?;
                    in_args = true;
                }
                None => {
                    if in_args {
                        return Err(TokenError::SegmentAfterArguments {
                            segment: element.to_string(),
                        });
                    }
                    if element.is_empty() {
                        return Err(TokenError::EmptySegment(raw.to_string()));
                    }
                    route.push(element.to_string());
                }
            }
        }

        if route.len() < 2 {
            return Err(TokenError::MissingOperation(raw.to_string()));
        }
        let operation = route.pop().unwrap_or_default();

        Ok(DecodedRoute {
            path: RoutePath::new(route),
            operation,
            args,
        })
    }

    /// Tolerant partial read of one named argument
    ///
    /// Scans the raw string for `key=value` pairs without requiring the rest
    /// of the token to be well-formed. An absent key is `None`, not an error.
    #[must_use]
    pub fn argument(raw: &str, key: &str) -> Option<String> {
        raw.split(PATH_DELIMITER)
            .filter_map(|element| element.split_once(ARG_DELIMITER))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }

    /// The encoded wire string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the wire string
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for RoutingToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RoutingToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<RoutingToken> for String {
    fn from(token: RoutingToken) -> Self {
        token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(segments: &[&str]) -> RoutePath {
        RoutePath::from(segments)
    }

    #[test]
    fn encode_concrete_scenario() {
        let args = TokenArgs::from_pairs(&[("fundingRoundId", "12")]).unwrap();
        let token = RoutingToken::encode(&path(&["vote", "selectRound"]), "show", &args).unwrap();
        assert_eq!(token.as_str(), "vote:selectRound:show:fundingRoundId=12");

        let decoded = RoutingToken::decode(token.as_str()).unwrap();
        assert_eq!(decoded.path.segments(), &["vote", "selectRound"]);
        assert_eq!(decoded.operation, "show");
        assert_eq!(decoded.args.get("fundingRoundId"), Some("12"));
    }

    #[test]
    fn encode_rejects_empty_path() {
        let result = RoutingToken::encode(&RoutePath::default(), "show", &TokenArgs::new());
        assert!(matches!(result, Err(ConstructionError::InvalidSegment(_))));
    }

    #[test]
    fn encode_no_args() {
        let token =
            RoutingToken::encode(&path(&["consider", "home"]), "home", &TokenArgs::new()).unwrap();
        assert_eq!(token.as_str(), "consider:home:home");
    }

    #[test]
    fn encode_rejects_oversized_token() {
        let args = TokenArgs::from_pairs(&[("k", "v".repeat(90).as_str())]).unwrap();
        let result = RoutingToken::encode(&path(&["dash", "screen", "action"]), "show", &args);
        assert!(matches!(
            result,
            Err(ConstructionError::TokenTooLong { limit: 100, .. })
        ));
    }

    #[test]
    fn encode_rejects_reserved_delimiter_in_operation() {
        let result = RoutingToken::encode(&path(&["dash"]), "sh:ow", &TokenArgs::new());
        assert!(matches!(result, Err(ConstructionError::InvalidSegment(_))));
    }

    #[test]
    fn encode_boundary_length_is_accepted() {
        // "dash:" (5) + "op" (2) + ":k=" (3) + 90 = 100 exactly
        let args = TokenArgs::from_pairs(&[("k", "v".repeat(90).as_str())]).unwrap();
        let token = RoutingToken::encode(&path(&["dash"]), "op", &args).unwrap();
        assert_eq!(token.as_str().len(), 100);
    }

    #[test]
    fn decode_empty_token() {
        assert!(matches!(RoutingToken::decode(""), Err(TokenError::Empty)));
    }

    #[test]
    fn decode_requires_operation() {
        let result = RoutingToken::decode("admin");
        assert!(matches!(result, Err(TokenError::MissingOperation(_))));
    }

    #[test]
    fn decode_rejects_empty_segment() {
        let result = RoutingToken::decode("admin::show");
        assert!(matches!(result, Err(TokenError::EmptySegment(_))));
    }

    #[test]
    fn decode_rejects_segment_after_arguments() {
        let result = RoutingToken::decode("a:b:show:k=v:stray");
        assert!(matches!(
            result,
            Err(TokenError::SegmentAfterArguments { .. })
        ));
    }

    #[test]
    fn decode_rejects_empty_argument_key() {
        let result = RoutingToken::decode("a:b:show:=v");
        assert!(matches!(result, Err(TokenError::EmptyArgumentKey { .. })));
    }

    #[test]
    fn decode_rejects_duplicate_argument() {
        let result = RoutingToken::decode("a:b:show:k=1:k=2");
        assert!(matches!(result, Err(TokenError::DuplicateArgument { .. })));
    }

    #[test]
    fn decode_rejects_non_ascii_argument() {
        let result = RoutingToken::decode("a:b:show:k=héllo");
        assert!(matches!(result, Err(TokenError::InvalidArgument { .. })));
    }

    #[test]
    fn decode_preserves_argument_order() {
        let decoded = RoutingToken::decode("a:b:show:z=1:a=2:m=3").unwrap();
        let keys: Vec<_> = decoded.args.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(decoded.to_token().unwrap().as_str(), "a:b:show:z=1:a=2:m=3");
    }

    #[test]
    fn argument_is_tolerant() {
        assert_eq!(
            RoutingToken::argument("a:b:show:round=3:page=1", "page"),
            Some("1".to_string())
        );
        assert_eq!(RoutingToken::argument("a:b:show:round=3", "page"), None);
        // Still readable when the route part would not decode.
        assert_eq!(
            RoutingToken::argument("::page=7", "page"),
            Some("7".to_string())
        );
    }

    #[test]
    fn argument_empty_value() {
        assert_eq!(
            RoutingToken::argument("a:b:show:flag=", "flag"),
            Some(String::new())
        );
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    const SEGMENT: &str = "[a-zA-Z0-9_]{1,10}";
    const VALUE: &str = "[a-zA-Z0-9_]{0,8}";

    proptest! {
        #[test]
        fn roundtrip_encode_then_decode(
            segments in proptest::collection::vec(SEGMENT, 1..4),
            operation in SEGMENT,
            pairs in proptest::collection::vec((SEGMENT, VALUE), 0..4),
        ) {
            let path = RoutePath::new(segments.clone());
            let mut args = TokenArgs::new();
            for (k, v) in &pairs {
                // Generated keys may repeat; keep first occurrence.
                let _ = args.insert(k.as_str(), v.as_str());
            }

            match RoutingToken::encode(&path, &operation, &args) {
                Ok(token) => {
                    prop_assert!(token.as_str().len() <= MAX_TOKEN_LEN);
                    let decoded = RoutingToken::decode(token.as_str()).unwrap();
                    prop_assert_eq!(&decoded.path, &path);
                    prop_assert_eq!(&decoded.operation, &operation);
                    prop_assert_eq!(&decoded.args, &args);
                    // Re-encoding reproduces the identical wire string.
                    let reencoded = decoded.to_token().unwrap();
                    prop_assert_eq!(reencoded.as_str(), token.as_str());
                }
                Err(ConstructionError::TokenTooLong { length, limit }) => {
                    prop_assert!(length > limit);
                }
                Err(other) => return Err(TestCaseError::fail(format!("unexpected: {other}"))),
            }
        }
    }
}
