use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::batch::{IMAGERY_BATCH_LIMIT, METADATA_BATCH_LIMIT};
use crate::domain::{CatalogEntry, Lang, Locale};
use crate::error::ShowcaseError;

pub const CONFIG_FILE: &str = "showcase.json";
pub const DEFAULT_TITLE: &str = "Games";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub lang: Option<Lang>,
    #[serde(default)]
    pub locale: Option<Locale>,
    #[serde(default)]
    pub defaults: Option<EntryDefaults>,
    #[serde(default)]
    pub games: Vec<GameEntry>,
    #[serde(default)]
    pub upstream: Option<UpstreamConfig>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EntryDefaults {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, alias = "ui")]
    pub designer: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GameEntry {
    Shorthand(String),
    Detailed(GameEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GameEntryObject {
    pub url: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, alias = "ui")]
    pub designer: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub games_base_url: Option<String>,
    #[serde(default)]
    pub thumbnails_base_url: Option<String>,
    #[serde(default)]
    pub icon_size: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub metadata_batch_size: Option<usize>,
    #[serde(default)]
    pub imagery_batch_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSettings {
    pub games_base_url: String,
    pub thumbnails_base_url: String,
    pub icon_size: String,
    pub timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            games_base_url: "https://games.roblox.com".to_string(),
            thumbnails_base_url: "https://thumbnails.roblox.com".to_string(),
            icon_size: "420x420".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub title: String,
    pub lang: Lang,
    pub locale: Option<Locale>,
    pub catalog: Vec<CatalogEntry>,
    pub upstream: UpstreamSettings,
    pub metadata_batch: NonZeroUsize,
    pub imagery_batch: NonZeroUsize,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ShowcaseError> {
        let config_path = Self::locate(path)?;
        tracing::debug!(path = %config_path.display(), "loading catalog config");

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ShowcaseError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| ShowcaseError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn locate(path: Option<&str>) -> Result<PathBuf, ShowcaseError> {
        if let Some(path) = path {
            return Ok(PathBuf::from(path));
        }
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Ok(local);
        }
        user_config_path()
            .filter(|candidate| candidate.exists())
            .ok_or(ShowcaseError::MissingConfig)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, ShowcaseError> {
        let schema_version = config.schema_version.unwrap_or(SCHEMA_VERSION);
        if schema_version != SCHEMA_VERSION {
            return Err(ShowcaseError::InvalidConfig(format!(
                "unsupported schema_version {schema_version}, expected {SCHEMA_VERSION}"
            )));
        }
        let lang = config.lang.unwrap_or_default();
        let locale = config.locale;
        let defaults = config.defaults.unwrap_or_default();

        let catalog = config
            .games
            .into_iter()
            .map(|entry| match entry {
                GameEntry::Shorthand(url) => build_entry(url, None, None, &defaults),
                GameEntry::Detailed(obj) => build_entry(obj.url, obj.owner, obj.designer, &defaults),
            })
            .collect::<Result<Vec<_>, ShowcaseError>>()?;

        let upstream_config = config.upstream.unwrap_or_default();
        let fallback = UpstreamSettings::default();
        let upstream = UpstreamSettings {
            games_base_url: upstream_config
                .games_base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(fallback.games_base_url),
            thumbnails_base_url: upstream_config
                .thumbnails_base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(fallback.thumbnails_base_url),
            icon_size: upstream_config.icon_size.unwrap_or(fallback.icon_size),
            timeout: upstream_config
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(fallback.timeout),
        };

        let metadata_batch = batch_size(
            "metadata_batch_size",
            upstream_config.metadata_batch_size,
            METADATA_BATCH_LIMIT,
        )?;
        let imagery_batch = batch_size(
            "imagery_batch_size",
            upstream_config.imagery_batch_size,
            IMAGERY_BATCH_LIMIT,
        )?;

        Ok(ResolvedConfig {
            title: config.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            lang,
            locale,
            catalog,
            upstream,
            metadata_batch,
            imagery_batch,
        })
    }
}

impl ResolvedConfig {
    pub fn locale(&self) -> Locale {
        self.locale.unwrap_or_else(|| self.lang.locale())
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "game-showcase").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

fn build_entry(
    url: String,
    owner: Option<String>,
    designer: Option<String>,
    defaults: &EntryDefaults,
) -> Result<CatalogEntry, ShowcaseError> {
    let reference_url = url.trim().to_string();
    let owner = owner
        .or_else(|| defaults.owner.clone())
        .ok_or_else(|| ShowcaseError::InvalidConfig(format!("game {reference_url} has no owner")))?;
    let designer = designer.or_else(|| defaults.designer.clone()).ok_or_else(|| {
        ShowcaseError::InvalidConfig(format!("game {reference_url} has no designer"))
    })?;
    Ok(CatalogEntry {
        reference_url,
        owner,
        designer,
    })
}

fn batch_size(
    field: &str,
    value: Option<usize>,
    limit: usize,
) -> Result<NonZeroUsize, ShowcaseError> {
    let value = value.unwrap_or(limit);
    if value > limit {
        return Err(ShowcaseError::InvalidConfig(format!(
            "{field} must be at most {limit}, got {value}"
        )));
    }
    NonZeroUsize::new(value)
        .ok_or_else(|| ShowcaseError::InvalidConfig(format!("{field} must be at least 1")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config_with(games: Vec<GameEntry>, upstream: Option<UpstreamConfig>) -> Config {
        Config {
            schema_version: None,
            title: None,
            lang: None,
            locale: None,
            defaults: Some(EntryDefaults {
                owner: Some("SnowStorm".to_string()),
                designer: Some("youssef_design".to_string()),
            }),
            games,
            upstream,
        }
    }

    #[test]
    fn parse_config_shorthand() {
        let config = config_with(
            vec![GameEntry::Shorthand(
                "https://www.roblox.com/games/17745731375/Bous-Revenge-HORROR".to_string(),
            )],
            None,
        );

        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.lang, Lang::En);
        assert_eq!(resolved.locale(), Locale::En);
        assert_eq!(resolved.catalog[0].owner, "SnowStorm");
        assert_eq!(resolved.metadata_batch.get(), METADATA_BATCH_LIMIT);
        assert_eq!(resolved.imagery_batch.get(), IMAGERY_BATCH_LIMIT);
        assert_eq!(resolved.upstream, UpstreamSettings::default());
    }

    #[test]
    fn unknown_schema_version_rejected() {
        let mut config = config_with(vec![], None);
        config.schema_version = Some(2);
        let err = ConfigLoader::resolve_config(config).unwrap_err();
        assert_matches!(err, ShowcaseError::InvalidConfig(_));
    }

    #[test]
    fn batch_size_above_ceiling_rejected() {
        let config = config_with(
            vec![],
            Some(UpstreamConfig {
                metadata_batch_size: Some(51),
                ..UpstreamConfig::default()
            }),
        );
        let err = ConfigLoader::resolve_config(config).unwrap_err();
        assert_matches!(err, ShowcaseError::InvalidConfig(_));
    }

    #[test]
    fn zero_batch_size_rejected() {
        let config = config_with(
            vec![],
            Some(UpstreamConfig {
                imagery_batch_size: Some(0),
                ..UpstreamConfig::default()
            }),
        );
        let err = ConfigLoader::resolve_config(config).unwrap_err();
        assert_matches!(err, ShowcaseError::InvalidConfig(_));
    }
}
