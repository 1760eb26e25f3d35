use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info};

use crate::config::ResolvedConfig;
use crate::domain::{
    CatalogEntry, Lang, Locale, ResolvedEntry, UniverseId, request_identifiers, resolve_catalog,
};
use crate::error::ShowcaseError;
use crate::fetch::fetch_keyed;
use crate::localize::Localize;
use crate::merge::{MergeOutcome, merge};
use crate::render::{CatalogPage, RunPhase};
use crate::roblox::{Endpoint, RobloxClient};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub lang: Lang,
    pub locale: Locale,
    pub metadata_batch: NonZeroUsize,
    pub imagery_batch: NonZeroUsize,
}

impl RunOptions {
    // A language override only moves the locale when the config left it unset.
    pub fn for_config(config: &ResolvedConfig, lang: Option<Lang>) -> Self {
        let lang = lang.unwrap_or(config.lang);
        Self {
            lang,
            locale: config.locale.unwrap_or_else(|| lang.locale()),
            metadata_batch: config.metadata_batch,
            imagery_batch: config.imagery_batch,
        }
    }
}

impl From<&ResolvedConfig> for RunOptions {
    fn from(config: &ResolvedConfig) -> Self {
        Self::for_config(config, None)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub phase: RunPhase,
    pub generated_at: String,
    pub resolved: usize,
    pub unresolved: usize,
    pub total_visits: Option<String>,
    pub error: Option<String>,
    pub page: CatalogPage,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveReport {
    pub entries: Vec<ResolvedEntry>,
    pub resolved: usize,
    pub unresolved: usize,
}

#[derive(Debug, Clone, Copy)]
pub enum ProgressSinkKind {
    Build,
    Resolve,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink: Sync {
    fn event(&self, event: ProgressEvent);
}

pub trait PagePublisher {
    fn publish(&self, page: &CatalogPage) -> Result<(), ShowcaseError>;
}

#[derive(Clone)]
pub struct App<C: RobloxClient> {
    client: C,
}

impl<C: RobloxClient> App<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn run(
        &self,
        catalog: &[CatalogEntry],
        options: &RunOptions,
        publisher: &dyn PagePublisher,
        sink: &dyn ProgressSink,
    ) -> Result<RunReport, ShowcaseError> {
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; resolving {} catalog entries", catalog.len()),
            elapsed: None,
        });
        let resolved = resolve_catalog(catalog);
        let resolved_count = resolved.iter().filter(|e| e.identifier.is_some()).count();
        let unresolved = resolved.len() - resolved_count;
        info!(resolved = resolved_count, unresolved, "catalog resolved");

        let mut page = CatalogPage::placeholders(&resolved);
        page.apply_language(options.lang);
        sink.event(ProgressEvent {
            message: "phase=Render; placeholder cards".to_string(),
            elapsed: None,
        });
        publisher.publish(&page)?;

        let mut total_visits = None;
        let mut failure = None;
        match self.aggregate(&resolved, options, sink) {
            Ok(outcome) => {
                total_visits = Some(outcome.total.to_str_radix(10));
                page.resolve(&resolved, &outcome, options.locale)?;
                sink.event(ProgressEvent {
                    message: format!("phase=Render; resolved {} cards", resolved_count),
                    elapsed: None,
                });
            }
            Err(err) => {
                error!(error = %err, "catalog aggregation failed");
                sink.event(ProgressEvent {
                    message: format!("phase=Render; failed: {err}"),
                    elapsed: None,
                });
                failure = Some(err.to_string());
                page.fail()?;
            }
        }
        page.apply_language(options.lang);

        sink.event(ProgressEvent {
            message: "phase=Publish; writing page".to_string(),
            elapsed: None,
        });
        publisher.publish(&page)?;

        Ok(RunReport {
            phase: page.phase(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            resolved: resolved_count,
            unresolved,
            total_visits,
            error: failure,
            page,
        })
    }

    fn aggregate(
        &self,
        resolved: &[ResolvedEntry],
        options: &RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<MergeOutcome, ShowcaseError> {
        let ids: Vec<UniverseId> = request_identifiers(resolved);

        let (metadata, imagery) = thread::scope(|scope| {
            let imagery = scope.spawn(|| {
                fetch_keyed(Endpoint::Imagery, &ids, options.imagery_batch, sink, |batch| {
                    self.client.fetch_game_icons(batch)
                })
            });
            let metadata = fetch_keyed(
                Endpoint::Metadata,
                &ids,
                options.metadata_batch,
                sink,
                |batch| self.client.fetch_game_details(batch),
            );
            let imagery = imagery
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
            (metadata, imagery)
        });
        let metadata = metadata?;
        let imagery = imagery?;

        sink.event(ProgressEvent {
            message: format!(
                "phase=Merge; {} details, {} icons",
                metadata.len(),
                imagery.len()
            ),
            elapsed: None,
        });
        Ok(merge(resolved, &metadata, &imagery, options.locale))
    }
}

pub fn resolve_only(catalog: &[CatalogEntry], sink: &dyn ProgressSink) -> ResolveReport {
    sink.event(ProgressEvent {
        message: format!("phase=Resolve; resolving {} catalog entries", catalog.len()),
        elapsed: None,
    });
    let entries = resolve_catalog(catalog);
    let resolved = entries.iter().filter(|e| e.identifier.is_some()).count();
    ResolveReport {
        unresolved: entries.len() - resolved,
        resolved,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use num_bigint::BigUint;

    use super::*;
    use crate::output::JsonOutput;
    use crate::roblox::{ImageryRecord, MetadataRecord};

    #[derive(Default)]
    struct MockRoblox {
        detail_calls: Mutex<usize>,
    }

    impl RobloxClient for MockRoblox {
        fn fetch_game_details(
            &self,
            batch: &[UniverseId],
        ) -> Result<Vec<MetadataRecord>, ShowcaseError> {
            *self.detail_calls.lock().unwrap() += 1;
            Ok(batch
                .iter()
                .map(|id| MetadataRecord {
                    identifier: id.clone(),
                    display_name: Some(format!("Game {id}")),
                    visit_count: BigUint::from(5u32),
                })
                .collect())
        }

        fn fetch_game_icons(
            &self,
            _batch: &[UniverseId],
        ) -> Result<Vec<ImageryRecord>, ShowcaseError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct Recorder {
        pages: Mutex<Vec<CatalogPage>>,
    }

    impl PagePublisher for Recorder {
        fn publish(&self, page: &CatalogPage) -> Result<(), ShowcaseError> {
            self.pages.lock().unwrap().push(page.clone());
            Ok(())
        }
    }

    #[test]
    fn run_publishes_placeholders_before_results() {
        let catalog = vec![CatalogEntry {
            reference_url: "https://www.roblox.com/games/3/c".to_string(),
            owner: "nilcous".to_string(),
            designer: "youssef_design".to_string(),
        }];
        let options = RunOptions {
            lang: Lang::En,
            locale: Locale::En,
            metadata_batch: NonZeroUsize::new(50).unwrap(),
            imagery_batch: NonZeroUsize::new(100).unwrap(),
        };
        let recorder = Recorder::default();
        let app = App::new(MockRoblox::default());

        let report = app.run(&catalog, &options, &recorder, &JsonOutput).unwrap();

        let pages = recorder.pages.lock().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].phase(), RunPhase::Placeholder);
        assert_eq!(pages[1].phase(), RunPhase::Resolved);
        assert_eq!(report.total_visits.as_deref(), Some("5"));
        assert_eq!(*app.client.detail_calls.lock().unwrap(), 1);
    }
}
