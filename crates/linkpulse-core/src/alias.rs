use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Symbols allowed in an alias, in the order random generators index them.
pub const ALIAS_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// A validated alias identifying a short link.
///
/// Aliases must be 3-32 characters long and contain only
/// alphanumeric characters, hyphens, or underscores.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alias(String);

impl Alias {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 32;

    /// Creates a new `Alias` after validating the input.
    pub fn new(alias: impl Into<String>) -> Result<Self, CoreError> {
        let alias = alias.into();
        Self::validate(&alias)?;
        Ok(Self(alias))
    }

    /// Creates an `Alias` without validation.
    ///
    /// Use this only for aliases produced by trusted internal sources
    /// (generators drawing from [`ALIAS_ALPHABET`], rows read back from a store).
    pub fn new_unchecked(alias: impl Into<String>) -> Self {
        Self(alias.into())
    }

    /// Builds the public short URL for this alias under `base_url`.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(alias: &str) -> Result<(), CoreError> {
        if alias.len() < Self::MIN_LEN || alias.len() > Self::MAX_LEN {
            return Err(CoreError::InvalidAlias(format!(
                "length must be between {} and {}, got {}",
                Self::MIN_LEN,
                Self::MAX_LEN,
                alias.len()
            )));
        }

        if !alias.bytes().all(|b| ALIAS_ALPHABET.contains(&b)) {
            return Err(CoreError::InvalidAlias(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                alias
            )));
        }

        Ok(())
    }
}

impl TryFrom<String> for Alias {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Alias> for String {
    fn from(alias: Alias) -> Self {
        alias.0
    }
}

impl Display for Alias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_aliases() {
        assert!(Alias::new("abc").is_ok());
        assert!(Alias::new("Abc-123_xyz").is_ok());
        assert!(Alias::new("a".repeat(32)).is_ok());
    }

    #[test]
    fn too_short() {
        assert!(Alias::new("ab").is_err());
        assert!(Alias::new("").is_err());
    }

    #[test]
    fn too_long() {
        assert!(Alias::new("a".repeat(33)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(Alias::new("abc def").is_err());
        assert!(Alias::new("abc/def").is_err());
        assert!(Alias::new("abc!def").is_err());
        assert!(Alias::new("café1").is_err());
    }

    #[test]
    fn to_url_trims_trailing_slash() {
        let alias = Alias::new("test123").unwrap();
        assert_eq!(
            alias.to_url("https://lp.example/api"),
            "https://lp.example/api/test123"
        );
        assert_eq!(
            alias.to_url("https://lp.example/api/"),
            "https://lp.example/api/test123"
        );
    }

    #[test]
    fn deserialize_rejects_invalid_alias() {
        let ok: Result<Alias, _> = serde_json::from_str("\"my-alias\"");
        assert_eq!(ok.unwrap().as_str(), "my-alias");

        let err: Result<Alias, _> = serde_json::from_str("\"no way\"");
        assert!(err.is_err());
    }
}
