//! Supported UI locales and request locale negotiation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Locales the application ships translations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ko,
    En,
    Ja,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::Ko, Locale::En, Locale::Ja];

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Ko => "ko",
            Locale::En => "en",
            Locale::Ja => "ja",
        }
    }

    /// Match a BCP 47 language tag on its primary subtag (`en-US` -> `En`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?;
        match primary.to_ascii_lowercase().as_str() {
            "ko" => Some(Locale::Ko),
            "en" => Some(Locale::En),
            "ja" => Some(Locale::Ja),
            _ => None,
        }
    }

    /// Pick the best supported locale from an `Accept-Language` header.
    ///
    /// Entries are ordered by q-value; equal weights keep header order.
    /// `q=0` entries and the `*` wildcard never match.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut ranges: Vec<(&str, f32)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let tag = pieces.next()?.trim();
                if tag.is_empty() || tag == "*" {
                    return None;
                }
                let mut quality = 1.0_f32;
                for param in pieces {
                    if let Some(q) = param.trim().strip_prefix("q=") {
                        quality = q.trim().parse().unwrap_or(0.0);
                    }
                }
                (quality > 0.0).then_some((tag, quality))
            })
            .collect();

        // sort_by is stable, so ties stay in header order
        ranges.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranges.into_iter().find_map(|(tag, _)| Locale::from_tag(tag))
    }

    /// Resolve the request locale: cookie, then `Accept-Language`, then default.
    pub fn negotiate(cookie: Option<&str>, accept_language: Option<&str>, default: Locale) -> Self {
        cookie
            .and_then(Locale::from_tag)
            .or_else(|| accept_language.and_then(Locale::from_accept_language))
            .unwrap_or(default)
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| DomainError::validation("validation.locale_unsupported"))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
