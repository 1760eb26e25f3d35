use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ShowcaseError;

static UNIVERSE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/games/(\d+)").expect("universe id pattern compiles"));

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Ar,
    Es,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::En, Lang::Ar, Lang::Es];

    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ar => "ar",
            Lang::Es => "es",
        }
    }

    pub fn dir(self) -> &'static str {
        match self {
            Lang::Ar => "rtl",
            Lang::En | Lang::Es => "ltr",
        }
    }

    pub fn locale(self) -> Locale {
        match self {
            Lang::En => Locale::En,
            Lang::Ar => Locale::Ar,
            Lang::Es => Locale::Es,
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
    Es,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Ar => write!(f, "ar"),
            Locale::Es => write!(f, "es"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniverseId(String);

impl UniverseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UniverseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UniverseId {
    type Err = ShowcaseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ShowcaseError::InvalidUniverseId(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub reference_url: String,
    pub owner: String,
    pub designer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntry {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub identifier: Option<UniverseId>,
}

pub fn resolve_identifier(reference: &str) -> Option<UniverseId> {
    UNIVERSE_ID_PATTERN
        .captures(reference)
        .and_then(|caps| caps.get(1))
        .map(|digits| UniverseId(digits.as_str().to_string()))
}

pub fn resolve_catalog(catalog: &[CatalogEntry]) -> Vec<ResolvedEntry> {
    catalog
        .iter()
        .map(|entry| {
            let identifier = resolve_identifier(&entry.reference_url);
            if identifier.is_none() {
                tracing::debug!(url = %entry.reference_url, "no universe id in reference");
            }
            ResolvedEntry {
                entry: entry.clone(),
                identifier,
            }
        })
        .collect()
}

pub fn request_identifiers(resolved: &[ResolvedEntry]) -> Vec<UniverseId> {
    let mut seen = std::collections::HashSet::new();
    resolved
        .iter()
        .filter_map(|entry| entry.identifier.as_ref())
        .filter(|id| seen.insert((*id).clone()))
        .cloned()
        .collect()
}
