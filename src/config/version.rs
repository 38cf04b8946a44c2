//! Shopify Admin API versions.

use crate::error::ConfigError;
use chrono::{Datelike, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

/// Months a stable release stays supported after it ships.
const SUPPORT_MONTHS: u32 = 12;

/// Shopify Admin API version used for GraphQL calls.
///
/// Stable versions ship quarterly as `YYYY-01`, `-04`, `-07` and `-10`.
/// The app pins one ([`ApiVersion::pinned`]) and logs a warning at startup
/// when the configured version has fallen out of Shopify's support window.
///
/// ```rust
/// use shopify_app::ApiVersion;
///
/// let version: ApiVersion = "2024-07".parse().unwrap();
/// assert_eq!(version, ApiVersion::V2024_07);
/// assert_eq!(version.to_string(), "2024-07");
/// assert!(ApiVersion::V2024_07 < ApiVersion::Unstable);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApiVersion {
    /// A quarterly stable release.
    Release {
        /// Release year.
        year: u16,
        /// Release month, one of 1, 4, 7 or 10.
        month: u8,
    },
    /// The `unstable` channel.
    Unstable,
}

impl ApiVersion {
    pub const V2024_07: Self = Self::release(2024, 7);
    pub const V2024_10: Self = Self::release(2024, 10);
    pub const V2025_01: Self = Self::release(2025, 1);
    pub const V2025_04: Self = Self::release(2025, 4);

    const fn release(year: u16, month: u8) -> Self {
        Self::Release { year, month }
    }

    /// The version the app was built and tested against.
    #[must_use]
    pub const fn pinned() -> Self {
        Self::V2024_07
    }

    /// Returns `true` if the release left the support window before `today`.
    ///
    /// `Unstable` never counts as deprecated.
    #[must_use]
    pub fn is_deprecated_at(self, today: NaiveDate) -> bool {
        let Self::Release { year, month } = self else {
            return false;
        };
        let released = u32::from(year) * 12 + u32::from(month) - 1;
        let current = u32::try_from(today.year()).unwrap_or(0) * 12 + today.month0();
        current >= released + SUPPORT_MONTHS
    }

    /// [`ApiVersion::is_deprecated_at`] for the current UTC date.
    #[must_use]
    pub fn is_deprecated(self) -> bool {
        self.is_deprecated_at(Utc::now().date_naive())
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::pinned()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release { year, month } => write!(f, "{year}-{month:02}"),
            Self::Unstable => f.write_str("unstable"),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "unstable" {
            return Ok(Self::Unstable);
        }

        let parsed = s.split_once('-').and_then(|(year, month)| {
            if year.len() != 4 || !matches!(month, "01" | "04" | "07" | "10") {
                return None;
            }
            Some(Self::release(year.parse().ok()?, month.parse().ok()?))
        });
        parsed.ok_or(ConfigError::InvalidApiVersion { version: s })
    }
}
