use crate::agent::{Browser, DeviceType, OsType, UserAgentInfo};
use crate::link::LinkId;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

const UNKNOWN_IP: &str = "unknown";

/// Log-assigned identifier of a [`ClickEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

/// One immutable record of a single resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub id: EventId,
    pub short_link_id: LinkId,
    pub timestamp: Timestamp,
    pub source_ip: String,
    pub user_agent: String,
    pub os_type: OsType,
    pub device_type: DeviceType,
    pub browser: Browser,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// A click event that has not been appended to the log yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClickEvent {
    pub short_link_id: LinkId,
    pub timestamp: Timestamp,
    pub source_ip: String,
    pub user_agent: String,
    pub os_type: OsType,
    pub device_type: DeviceType,
    pub browser: Browser,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl NewClickEvent {
    /// Builds an event for `short_link_id` from raw request metadata,
    /// classifying the user agent and picking the client address.
    pub fn from_request(
        short_link_id: LinkId,
        metadata: &RequestMetadata,
        timestamp: Timestamp,
    ) -> Self {
        let user_agent = metadata.user_agent.clone().unwrap_or_default();
        let info = UserAgentInfo::classify(&user_agent);

        Self {
            short_link_id,
            timestamp,
            source_ip: metadata.client_ip(),
            user_agent,
            os_type: info.os,
            device_type: info.device,
            browser: info.browser,
            country: metadata.country.clone(),
            city: metadata.city.clone(),
        }
    }

    pub fn into_event(self, id: EventId) -> ClickEvent {
        ClickEvent {
            id,
            short_link_id: self.short_link_id,
            timestamp: self.timestamp,
            source_ip: self.source_ip,
            user_agent: self.user_agent,
            os_type: self.os_type,
            device_type: self.device_type,
            browser: self.browser,
            country: self.country,
            city: self.city,
        }
    }
}

/// Transport-independent view of the request that triggered a resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    /// Raw `X-Forwarded-For` chain, client first.
    pub forwarded_for: Option<String>,
    /// Raw `X-Real-IP` value.
    pub real_ip: Option<String>,
    /// Address of the directly connected peer.
    pub peer_addr: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl RequestMetadata {
    /// The originating client address: the first entry of the forwarding
    /// chain, then `X-Real-IP`, then the peer address.
    pub fn client_ip(&self) -> String {
        let forwarded = self
            .forwarded_for
            .as_deref()
            .and_then(|chain| chain.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_owned();
        }

        if let Some(ip) = self
            .real_ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return ip.to_owned();
        }

        self.peer_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| UNKNOWN_IP.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn client_ip_takes_first_forwarded_entry() {
        let metadata = RequestMetadata {
            forwarded_for: Some(" 203.0.113.7 , 10.0.0.1, 10.0.0.2".to_string()),
            real_ip: Some("198.51.100.1".to_string()),
            peer_addr: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))),
            ..Default::default()
        };
        assert_eq!(metadata.client_ip(), "203.0.113.7");
    }

    #[test]
    fn client_ip_falls_back_to_real_ip_then_peer() {
        let metadata = RequestMetadata {
            forwarded_for: Some("  ".to_string()),
            real_ip: Some("198.51.100.1".to_string()),
            peer_addr: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))),
            ..Default::default()
        };
        assert_eq!(metadata.client_ip(), "198.51.100.1");

        let metadata = RequestMetadata {
            peer_addr: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))),
            ..Default::default()
        };
        assert_eq!(metadata.client_ip(), "10.0.0.2");

        assert_eq!(RequestMetadata::default().client_ip(), "unknown");
    }

    #[test]
    fn from_request_classifies_user_agent() {
        let metadata = RequestMetadata {
            forwarded_for: Some("1.1.1.1".to_string()),
            user_agent: Some(
                "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0"
                    .to_string(),
            ),
            country: Some("DE".to_string()),
            ..Default::default()
        };

        let event = NewClickEvent::from_request(LinkId(1), &metadata, Timestamp::UNIX_EPOCH);
        assert_eq!(event.source_ip, "1.1.1.1");
        assert_eq!(event.os_type, OsType::Linux);
        assert_eq!(event.device_type, DeviceType::Desktop);
        assert_eq!(event.browser, Browser::Firefox);
        assert_eq!(event.country.as_deref(), Some("DE"));
        assert_eq!(event.city, None);
    }

    #[test]
    fn missing_user_agent_is_unknown_not_error() {
        let event = NewClickEvent::from_request(
            LinkId(1),
            &RequestMetadata::default(),
            Timestamp::UNIX_EPOCH,
        );
        assert_eq!(event.user_agent, "");
        assert_eq!(event.os_type, OsType::Unknown);
        assert_eq!(event.device_type, DeviceType::Unknown);
        assert_eq!(event.browser, Browser::Unknown);
    }
}
