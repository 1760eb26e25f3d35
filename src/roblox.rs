use std::str::FromStr;

use num_bigint::BigUint;
use reqwest::blocking::{Client, Response};
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::batch::{IMAGERY_BATCH_LIMIT, METADATA_BATCH_LIMIT};
use crate::config::UpstreamSettings;
use crate::domain::UniverseId;
use crate::error::ShowcaseError;
use crate::fetch::Keyed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Metadata,
    Imagery,
}

impl Endpoint {
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Metadata => "metadata",
            Endpoint::Imagery => "imagery",
        }
    }

    pub fn batch_limit(self) -> usize {
        match self {
            Endpoint::Metadata => METADATA_BATCH_LIMIT,
            Endpoint::Imagery => IMAGERY_BATCH_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub identifier: UniverseId,
    pub display_name: Option<String>,
    pub visit_count: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageryRecord {
    pub identifier: UniverseId,
    pub image_url: Option<String>,
}

impl Keyed for MetadataRecord {
    fn key(&self) -> &UniverseId {
        &self.identifier
    }
}

impl Keyed for ImageryRecord {
    fn key(&self) -> &UniverseId {
        &self.identifier
    }
}

pub trait RobloxClient: Send + Sync {
    fn fetch_game_details(&self, batch: &[UniverseId])
    -> Result<Vec<MetadataRecord>, ShowcaseError>;
    fn fetch_game_icons(&self, batch: &[UniverseId]) -> Result<Vec<ImageryRecord>, ShowcaseError>;
}

#[derive(Debug, Deserialize)]
struct GamesResponse {
    #[serde(default)]
    data: Option<Vec<GameDetails>>,
}

#[derive(Debug, Deserialize)]
struct GameDetails {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    visits: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct IconsResponse {
    #[serde(default)]
    data: Option<Vec<GameIcon>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameIcon {
    #[serde(default)]
    target_id: Option<Value>,
    #[serde(default)]
    state: Option<Value>,
    #[serde(default)]
    image_url: Option<Value>,
}

#[derive(Clone)]
pub struct RobloxHttpClient {
    client: Client,
    settings: UpstreamSettings,
}

impl RobloxHttpClient {
    pub fn new(settings: UpstreamSettings) -> Result<Self, ShowcaseError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("game-showcase/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ShowcaseError::InvalidConfig(err.to_string()))?,
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|err| ShowcaseError::Http {
                endpoint: "client",
                message: err.to_string(),
            })?;
        Ok(Self { client, settings })
    }

    pub fn details_url(&self, batch: &[UniverseId]) -> String {
        format!(
            "{}/v1/games?universeIds={}",
            self.settings.games_base_url,
            join_ids(batch)
        )
    }

    pub fn icons_url(&self, batch: &[UniverseId]) -> String {
        format!(
            "{}/v1/games/icons?universeIds={}&size={}&format=Png&isCircular=false",
            self.settings.thumbnails_base_url,
            join_ids(batch),
            self.settings.icon_size
        )
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint, url: &str) -> Result<T, ShowcaseError> {
        debug!(endpoint = endpoint.name(), %url, "upstream request");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ShowcaseError::Http {
                endpoint: endpoint.name(),
                message: err.to_string(),
            })?;
        let response = Self::handle_status(endpoint, response)?;
        let body = response.bytes().map_err(|err| ShowcaseError::Http {
            endpoint: endpoint.name(),
            message: err.to_string(),
        })?;
        serde_json::from_slice(&body).map_err(|err| ShowcaseError::Decode {
            endpoint: endpoint.name(),
            message: err.to_string(),
        })
    }

    fn handle_status(endpoint: Endpoint, response: Response) -> Result<Response, ShowcaseError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| format!("{} request failed", endpoint.name()));
        Err(ShowcaseError::Status {
            endpoint: endpoint.name(),
            status,
            message,
        })
    }
}

impl RobloxClient for RobloxHttpClient {
    fn fetch_game_details(
        &self,
        batch: &[UniverseId],
    ) -> Result<Vec<MetadataRecord>, ShowcaseError> {
        let url = self.details_url(batch);
        let response: GamesResponse = self.get_json(Endpoint::Metadata, &url)?;
        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(metadata_record)
            .collect())
    }

    fn fetch_game_icons(&self, batch: &[UniverseId]) -> Result<Vec<ImageryRecord>, ShowcaseError> {
        let url = self.icons_url(batch);
        let response: IconsResponse = self.get_json(Endpoint::Imagery, &url)?;
        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(imagery_record)
            .collect())
    }
}

fn metadata_record(raw: GameDetails) -> Option<MetadataRecord> {
    let Some(identifier) = raw.id.as_ref().and_then(parse_identifier) else {
        warn!(id = ?raw.id, "skipping game details without a usable id");
        return None;
    };
    let visit_count = match raw.visits.as_ref() {
        None | Some(Value::Null) => BigUint::default(),
        Some(value) => parse_visit_count(value).unwrap_or_else(|| {
            warn!(%identifier, visits = %value, "unreadable visit count, using 0");
            BigUint::default()
        }),
    };
    let display_name = text_field(&identifier, "name", raw.name.as_ref());
    Some(MetadataRecord {
        identifier,
        display_name,
        visit_count,
    })
}

fn imagery_record(raw: GameIcon) -> Option<ImageryRecord> {
    let Some(identifier) = raw.target_id.as_ref().and_then(parse_identifier) else {
        warn!(target_id = ?raw.target_id, "skipping icon without a usable target id");
        return None;
    };
    let image_url = text_field(&identifier, "imageUrl", raw.image_url.as_ref());
    if image_url.is_none() {
        let state = text_field(&identifier, "state", raw.state.as_ref());
        debug!(%identifier, state = ?state, "icon has no image url");
    }
    Some(ImageryRecord {
        identifier,
        image_url,
    })
}

// Blank strings and nulls are absent; any other non-string is dropped with a warning.
fn text_field(identifier: &UniverseId, field: &str, value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            warn!(%identifier, field, value = %other, "ignoring non-string field");
            None
        }
    }
}

fn parse_identifier(value: &Value) -> Option<UniverseId> {
    match value {
        Value::Number(number) => number.to_string().parse().ok(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

// Literal JSON digits, never through f64.
pub fn parse_visit_count(value: &Value) -> Option<BigUint> {
    match value {
        Value::Number(number) => BigUint::from_str(&number.to_string()).ok(),
        Value::String(text) => BigUint::from_str(text.trim()).ok(),
        _ => None,
    }
}

fn join_ids(batch: &[UniverseId]) -> String {
    batch
        .iter()
        .map(UniverseId::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
