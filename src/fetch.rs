use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Instant;

use tracing::info;

use crate::app::{ProgressEvent, ProgressSink};
use crate::batch::BatchPlan;
use crate::domain::UniverseId;
use crate::error::ShowcaseError;
use crate::roblox::Endpoint;

pub trait Keyed {
    fn key(&self) -> &UniverseId;
}

// Batch k + 1 is only requested once batch k has been parsed.
// Batch k + 1 is only requested once batch k has been parsed.
pub fn fetch_keyed<R, F>(
    endpoint: Endpoint,
    ids: &[UniverseId],
    batch_size: NonZeroUsize,
    sink: &dyn ProgressSink,
    mut fetch_batch: F,
) -> Result<HashMap<UniverseId, R>, ShowcaseError>
where
    R: Keyed,
    F: FnMut(&[UniverseId]) -> Result<Vec<R>, ShowcaseError>,
{
    debug_assert!(batch_size.get() <= endpoint.batch_limit());
    let plan = BatchPlan::new(ids, batch_size);
    let total = plan.len();
    let mut records = HashMap::with_capacity(ids.len());

    for (index, batch) in plan.iter().enumerate() {
        sink.event(ProgressEvent {
            message: format!(
                "phase=Fetch; {}.request batch {}/{} ({} ids)",
                endpoint.name(),
                index + 1,
                total,
                batch.len()
            ),
            elapsed: None,
        });
        let started = Instant::now();
        let fetched = fetch_batch(batch)?;
        let elapsed = started.elapsed();
        sink.event(ProgressEvent {
            message: format!("latency_ms={}", elapsed.as_millis()),
            elapsed: Some(elapsed),
        });

        let received = fetched.len();
        for record in fetched {
            records.insert(record.key().clone(), record);
        }
        info!(
            endpoint = endpoint.name(),
            batch = index + 1,
            requested = batch.len(),
            received,
            "batch fetched"
        );
    }

    Ok(records)
}
