//! Route paths for addressing nodes in a dashboard tree
//!
//! Provides [`RoutePath`] for hierarchical addressing: dashboard key first,
//! then screen ids, then an action id.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::TokenError;
use crate::ConstructionError;

/// Reject a segment that could not survive the wire format.
///
/// Segments travel inside a `:`-delimited token with `=`-delimited argument
/// pairs, so both delimiters are reserved. There is no escaping layer; ids
/// are expected to be short ASCII identifiers by convention.
pub fn validate_segment(segment: &str) -> Result<(), ConstructionError> {
    if segment.is_empty()
        || !segment.is_ascii()
        || segment.contains(crate::PATH_DELIMITER)
        || segment.contains(crate::ARG_DELIMITER)
    {
        return Err(ConstructionError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

/// Path from a dashboard root to a node
///
/// # Examples
/// - `["vote", "selectRound"]` → `vote:selectRound`
/// - `["consider", "home", "proposals"]` → `consider:home:proposals`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RoutePath(Vec<String>);

impl RoutePath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Create a path with one segment (a dashboard key)
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the path has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if any)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// First segment: the dashboard key this path lives under
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<&str> {
        self.0.first().map(|s| s.as_str())
    }

    /// Last segment: the id of the node the path addresses
    #[inline]
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(|s| s.as_str())
    }

    /// Append a segment, returning the child path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.0.push(segment.into());
        next
    }

    /// Validate every segment against the wire character rules
    ///
    /// # Errors
    /// Returns the first offending segment.
    pub fn validate(&self) -> Result<(), ConstructionError> {
        for segment in &self.0 {
            validate_segment(segment)?;
        }
        Ok(())
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }
}

impl Display for RoutePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(":"))
    }
}

impl FromStr for RoutePath {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(TokenError::Empty);
        }

        let segments: Vec<String> = s
            .split(crate::PATH_DELIMITER)
            .map(|seg| {
                if seg.is_empty() {
                    Err(TokenError::EmptySegment(s.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl From<Vec<String>> for RoutePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for RoutePath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| (*s).to_string()).collect())
    }
}
