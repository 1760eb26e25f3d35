use std::collections::HashMap;

use num_bigint::BigUint;
use serde::Serialize;

use crate::domain::{Locale, ResolvedEntry, UniverseId};
use crate::format::format_count;
use crate::roblox::{ImageryRecord, MetadataRecord};

pub const UNKNOWN_NAME: &str = "Unknown Game";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderModel {
    pub identifier: UniverseId,
    pub display_name: String,
    pub visit_count_formatted: String,
    pub image_url: Option<String>,
    pub owner: String,
    pub designer: String,
    pub reference_url: String,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub models: Vec<Option<RenderModel>>,
    pub total: BigUint,
}

pub fn merge(
    entries: &[ResolvedEntry],
    metadata: &HashMap<UniverseId, MetadataRecord>,
    imagery: &HashMap<UniverseId, ImageryRecord>,
    locale: Locale,
) -> MergeOutcome {
    let mut total = BigUint::default();
    let zero = BigUint::default();

    let models = entries
        .iter()
        .map(|resolved| {
            let identifier = resolved.identifier.as_ref()?;
            let meta = metadata.get(identifier);
            let visits = meta.map(|record| &record.visit_count).unwrap_or(&zero);
            total += visits;

            Some(RenderModel {
                identifier: identifier.clone(),
                display_name: meta
                    .and_then(|record| record.display_name.clone())
                    .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                visit_count_formatted: format_count(visits, locale),
                image_url: imagery
                    .get(identifier)
                    .and_then(|record| record.image_url.clone()),
                owner: resolved.entry.owner.clone(),
                designer: resolved.entry.designer.clone(),
                reference_url: resolved.entry.reference_url.clone(),
            })
        })
        .collect();

    MergeOutcome { models, total }
}
