use crate::alias::Alias;
use crate::error::CoreError;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Store-assigned identifier of a [`ShortLink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub u64);

impl LinkId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of the owner of a short link.
///
/// Supplied by the identity layer; core only compares it for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(owner: impl Into<String>) -> Result<Self, CoreError> {
        let owner = owner.into();
        if owner.trim().is_empty() {
            return Err(CoreError::InvalidOwner("owner cannot be empty".to_string()));
        }
        Ok(Self(owner))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse marketing category attached to a link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Acquisition,
    Activation,
    Retention,
    /// No topic was given at creation.
    #[default]
    #[serde(rename = "none")]
    Untagged,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Acquisition => "acquisition",
            Topic::Activation => "activation",
            Topic::Retention => "retention",
            Topic::Untagged => "none",
        }
    }
}

impl FromStr for Topic {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "acquisition" => Ok(Topic::Acquisition),
            "activation" => Ok(Topic::Activation),
            "retention" => Ok(Topic::Retention),
            "none" => Ok(Topic::Untagged),
            other => Err(CoreError::InvalidTopic(format!(
                "expected one of acquisition, activation, retention, none: '{other}'"
            ))),
        }
    }
}

impl Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted alias → destination mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: LinkId,
    pub owner: OwnerId,
    pub destination_url: String,
    pub alias: Alias,
    pub topic: Topic,
    /// Authoritative resolution count, maintained by the store.
    pub click_count: u64,
    pub created_at: Timestamp,
}

impl ShortLink {
    pub fn short_url(&self, base_url: &str) -> String {
        self.alias.to_url(base_url)
    }
}

/// The fields a caller supplies when inserting a link; the store assigns the
/// id and starts the counter at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub owner: OwnerId,
    pub destination_url: String,
    pub alias: Alias,
    pub topic: Topic,
    pub created_at: Timestamp,
}

impl NewShortLink {
    pub fn into_link(self, id: LinkId) -> ShortLink {
        ShortLink {
            id,
            owner: self.owner,
            destination_url: self.destination_url,
            alias: self.alias,
            topic: self.topic,
            click_count: 0,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_parses_known_names() {
        assert_eq!("acquisition".parse::<Topic>().unwrap(), Topic::Acquisition);
        assert_eq!("activation".parse::<Topic>().unwrap(), Topic::Activation);
        assert_eq!("retention".parse::<Topic>().unwrap(), Topic::Retention);
        assert_eq!("none".parse::<Topic>().unwrap(), Topic::Untagged);
        assert!("growth".parse::<Topic>().is_err());
    }

    #[test]
    fn topic_round_trips_through_as_str() {
        for topic in [
            Topic::Acquisition,
            Topic::Activation,
            Topic::Retention,
            Topic::Untagged,
        ] {
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
        }
    }

    #[test]
    fn topic_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Topic::Retention).unwrap(),
            "\"retention\""
        );
        assert_eq!(serde_json::to_string(&Topic::Untagged).unwrap(), "\"none\"");
    }

    #[test]
    fn owner_rejects_blank() {
        assert!(OwnerId::new("user-1").is_ok());
        assert!(OwnerId::new("   ").is_err());
    }

    #[test]
    fn new_link_starts_with_zero_clicks() {
        let link = NewShortLink {
            owner: OwnerId::new("u1").unwrap(),
            destination_url: "https://example.com".to_string(),
            alias: Alias::new("abc123").unwrap(),
            topic: Topic::default(),
            created_at: Timestamp::UNIX_EPOCH,
        }
        .into_link(LinkId(7));

        assert_eq!(link.id, LinkId(7));
        assert_eq!(link.click_count, 0);
        assert_eq!(link.topic, Topic::Untagged);
        assert_eq!(link.short_url("http://lp.test/api"), "http://lp.test/api/abc123");
    }
}
