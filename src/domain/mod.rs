//! Domain primitives shared by the vault, the codecs and the sync engine.
//!
//! Identifiers follow the newtype pattern so account ids, API key ids and
//! saved addon ids cannot be mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier of a managed account.
    ///
    /// ```rust
    /// use addonvault::domain::AccountId;
    ///
    /// let id = AccountId::new();
    /// let parsed: AccountId = id.to_string().parse().unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    AccountId
);

uuid_id!(
    /// Unique identifier of an API key owned by an account.
    ApiKeyId
);

uuid_id!(
    /// Unique identifier of a saved addon template.
    SavedAddonId
);

/// Health of an account's link with the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Error,
}

impl AccountStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Premium download services whose keys can be embedded in addon URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebridService {
    RealDebrid,
    TorBox,
    AllDebrid,
    Premiumize,
    DebridLink,
    Offcloud,
}

impl DebridService {
    pub const ALL: [Self; 6] = [
        Self::RealDebrid,
        Self::TorBox,
        Self::AllDebrid,
        Self::Premiumize,
        Self::DebridLink,
        Self::Offcloud,
    ];

    /// Identifier used in storage and in addon URL parameters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RealDebrid => "realdebrid",
            Self::TorBox => "torbox",
            Self::AllDebrid => "alldebrid",
            Self::Premiumize => "premiumize",
            Self::DebridLink => "debridlink",
            Self::Offcloud => "offcloud",
        }
    }

    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::RealDebrid => "Real-Debrid",
            Self::TorBox => "TorBox",
            Self::AllDebrid => "AllDebrid",
            Self::Premiumize => "Premiumize",
            Self::DebridLink => "Debrid-Link",
            Self::Offcloud => "Offcloud",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == id)
    }
}

impl fmt::Display for DebridService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Service an API key belongs to.
///
/// Known services get their own variant; anything else is carried verbatim in
/// [`ApiService::Other`] so user-defined service ids survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApiService {
    Debrid(DebridService),
    Tmdb,
    Trakt,
    Other(String),
}

impl ApiService {
    #[must_use]
    pub const fn debrid(&self) -> Option<DebridService> {
        match self {
            Self::Debrid(service) => Some(*service),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_debrid(&self) -> bool {
        matches!(self, Self::Debrid(_))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Debrid(service) => service.as_str(),
            Self::Tmdb => "tmdb",
            Self::Trakt => "trakt",
            Self::Other(id) => id,
        }
    }
}

impl From<String> for ApiService {
    fn from(id: String) -> Self {
        if let Some(service) = DebridService::from_id(&id) {
            return Self::Debrid(service);
        }
        match id.as_str() {
            "tmdb" => Self::Tmdb,
            "trakt" => Self::Trakt,
            _ => Self::Other(id),
        }
    }
}

impl From<&str> for ApiService {
    fn from(id: &str) -> Self {
        Self::from(id.to_string())
    }
}

impl From<ApiService> for String {
    fn from(service: ApiService) -> Self {
        match service {
            ApiService::Other(id) => id,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ApiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
