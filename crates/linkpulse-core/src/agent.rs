//! User-agent classification.
//!
//! The raw string is parsed with woothee, then its open-ended OS, category
//! and browser labels are folded onto closed enums through ordered prefix
//! tables. Labels no rule knows map to the `Unknown` variant.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use woothee::parser::Parser;

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
            #[serde(rename = "Unknown")]
            Unknown,
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Unknown => "Unknown",
                }
            }

            /// Maps a stored label back to its variant; unrecognised labels
            /// become `Unknown`.
            pub fn from_label(label: &str) -> Self {
                match label {
                    $($label => $name::$variant,)+
                    _ => $name::Unknown,
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

labelled_enum!(
    /// Operating system family.
    OsType {
        Windows => "Windows",
        MacOs => "macOS",
        Ios => "iOS",
        Android => "Android",
        ChromeOs => "ChromeOS",
        Linux => "Linux",
    }
);

labelled_enum!(
    /// Device class.
    DeviceType {
        Desktop => "Desktop",
        Mobile => "Mobile",
        Tablet => "Tablet",
        Bot => "Bot",
    }
);

labelled_enum!(
    /// Browser family.
    Browser {
        Edge => "Edge",
        Opera => "Opera",
        Chrome => "Chrome",
        Firefox => "Firefox",
        Safari => "Safari",
        InternetExplorer => "Internet Explorer",
    }
);

/// Maps a woothee label onto a closed variant. Entries are tried in order
/// and the first prefix that matches wins.
struct LabelRule<T> {
    prefix: &'static str,
    value: T,
}

const fn rule<T>(prefix: &'static str, value: T) -> LabelRule<T> {
    LabelRule { prefix, value }
}

const OS_RULES: &[LabelRule<OsType>] = &[
    rule("iPhone", OsType::Ios),
    rule("iPad", OsType::Ios),
    rule("iPod", OsType::Ios),
    rule("iOS", OsType::Ios),
    rule("Android", OsType::Android),
    rule("ChromeOS", OsType::ChromeOs),
    rule("Windows", OsType::Windows),
    rule("Mac OS", OsType::MacOs),
    rule("Linux", OsType::Linux),
];

// woothee reports iPads as smartphones, so the os rule runs first
const TABLET_OS: &str = "iPad";

const CATEGORY_RULES: &[LabelRule<DeviceType>] = &[
    rule("crawler", DeviceType::Bot),
    rule("smartphone", DeviceType::Mobile),
    rule("mobilephone", DeviceType::Mobile),
    rule("pc", DeviceType::Desktop),
];

const BROWSER_RULES: &[LabelRule<Browser>] = &[
    rule("Edge", Browser::Edge),
    rule("Opera", Browser::Opera),
    rule("Chrome", Browser::Chrome),
    rule("Firefox", Browser::Firefox),
    rule("Safari", Browser::Safari),
    rule("Internet Explorer", Browser::InternetExplorer),
];

fn lookup<T: Copy>(rules: &[LabelRule<T>], label: &str, fallback: T) -> T {
    rules
        .iter()
        .find(|rule| label.starts_with(rule.prefix))
        .map_or(fallback, |rule| rule.value)
}

/// Result of classifying a raw user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub os: OsType,
    pub device: DeviceType,
    pub browser: Browser,
}

impl UserAgentInfo {
    pub const UNKNOWN: Self = Self {
        os: OsType::Unknown,
        device: DeviceType::Unknown,
        browser: Browser::Unknown,
    };

    /// Classifies `user_agent`. Never fails: unmatched input is `Unknown`.
    pub fn classify(user_agent: &str) -> Self {
        if user_agent.trim().is_empty() {
            return Self::UNKNOWN;
        }
        match Parser::new().parse(user_agent) {
            Some(parsed) => Self::from_labels(&parsed.os, &parsed.category, &parsed.name),
            None => Self::UNKNOWN,
        }
    }

    fn from_labels(os: &str, category: &str, name: &str) -> Self {
        let device = if os == TABLET_OS {
            DeviceType::Tablet
        } else {
            lookup(CATEGORY_RULES, category, DeviceType::Unknown)
        };
        Self {
            os: lookup(OS_RULES, os, OsType::Unknown),
            device,
            browser: lookup(BROWSER_RULES, name, Browser::Unknown),
        }
    }
}
