//! Ordered named arguments carried inside a token
//!
//! Provides [`TokenArgs`], an insertion-ordered key/value map. Ordering is
//! load-bearing: a token must re-encode to the identical string it decoded
//! from, so arguments keep the order they were added in.

use indexmap::IndexMap;

use crate::error::ConstructionError;
use crate::path::validate_segment;

/// Insertion-ordered, unique key/value arguments
///
/// Keys follow the same character rules as path segments. Values may be
/// empty but must also avoid the reserved delimiters; they are short
/// opaque identifiers (record ids, enum tags), never free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenArgs(IndexMap<String, String>);

impl TokenArgs {
    /// Create an empty argument set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an argument set from ordered pairs
    ///
    /// # Errors
    /// Rejects invalid keys/values and duplicate keys.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Result<Self, ConstructionError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut args = Self::new();
        for (key, value) in pairs {
            args.insert(key.as_ref(), value.as_ref())?;
        }
        Ok(args)
    }

    /// Insert a new argument
    ///
    /// # Errors
    /// - `ConstructionError::DuplicateKey` if the key is already present
    /// - `ConstructionError::InvalidKey` / `InvalidValue` on reserved
    ///   delimiters or non-ASCII input
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ConstructionError> {
        let key = key.into();
        let value = value.into();
        validate_segment(&key).map_err(|_| ConstructionError::InvalidKey(key.clone()))?;
        validate_value(&value)?;
        if self.0.contains_key(&key) {
            return Err(ConstructionError::DuplicateKey(key));
        }
        self.0.insert(key, value);
        Ok(())
    }

    /// Insert or overwrite an argument, keeping its original position when
    /// the key already exists
    ///
    /// # Errors
    /// Same character rules as [`TokenArgs::insert`]; overwriting is allowed.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ConstructionError> {
        let key = key.into();
        let value = value.into();
        validate_segment(&key).map_err(|_| ConstructionError::InvalidKey(key.clone()))?;
        validate_value(&value)?;
        self.0.insert(key, value);
        Ok(())
    }

    /// Look up an argument by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.as_str())
    }

    /// Check whether a key is present
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of arguments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no arguments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn validate_value(value: &str) -> Result<(), ConstructionError> {
    if !value.is_ascii()
        || value.contains(crate::PATH_DELIMITER)
        || value.contains(crate::ARG_DELIMITER)
    {
        return Err(ConstructionError::InvalidValue(value.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_insert_and_get() {
        let mut args = TokenArgs::new();
        args.insert("fundingRoundId", "12").unwrap();
        assert_eq!(args.get("fundingRoundId"), Some("12"));
        assert_eq!(args.get("missing"), None);
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn args_duplicate_key_rejected() {
        let mut args = TokenArgs::new();
        args.insert("page", "0").unwrap();
        let result = args.insert("page", "1");
        assert!(matches!(result, Err(ConstructionError::DuplicateKey(_))));
        assert_eq!(args.get("page"), Some("0"));
    }

    #[test]
    fn args_set_overwrites_in_place() {
        let mut args = TokenArgs::new();
        args.insert("round", "3").unwrap();
        args.insert("page", "0").unwrap();
        args.set("round", "5").unwrap();

        let pairs: Vec<_> = args.iter().collect();
        assert_eq!(pairs, vec![("round", "5"), ("page", "0")]);
    }

    #[test]
    fn args_preserve_insertion_order() {
        let args = TokenArgs::from_pairs(&[("b", "2"), ("a", "1"), ("c", "3")]).unwrap();
        let keys: Vec<_> = args.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn args_reject_reserved_characters() {
        let mut args = TokenArgs::new();
        assert!(matches!(
            args.insert("bad:key", "1"),
            Err(ConstructionError::InvalidKey(_))
        ));
        assert!(matches!(
            args.insert("key", "bad=value"),
            Err(ConstructionError::InvalidValue(_))
        ));
    }

    #[test]
    fn args_empty_value_allowed() {
        let mut args = TokenArgs::new();
        args.insert("flag", "").unwrap();
        assert_eq!(args.get("flag"), Some(""));
    }
}
