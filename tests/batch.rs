use std::num::NonZeroUsize;

use game_showcase::batch::{BatchPlan, IMAGERY_BATCH_LIMIT, METADATA_BATCH_LIMIT};

fn size(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[test]
fn batch_count_is_ceiling_of_length_over_size() {
    let items: Vec<u32> = (0..237).collect();
    for n in [1, 7, 50, 100, 237, 500] {
        let plan = BatchPlan::new(&items, size(n));
        assert_eq!(plan.len(), items.len().div_ceil(n), "batch size {n}");
        assert_eq!(plan.iter().count(), plan.len());
    }
}

#[test]
fn concatenated_batches_reproduce_input() {
    let items: Vec<u32> = (0..123).collect();
    let plan = BatchPlan::new(&items, size(METADATA_BATCH_LIMIT));
    let joined: Vec<u32> = plan.iter().flatten().copied().collect();
    assert_eq!(joined, items);

    let sizes: Vec<usize> = plan.iter().map(<[u32]>::len).collect();
    assert_eq!(sizes, vec![50, 50, 23]);
}

#[test]
fn no_batch_exceeds_endpoint_ceiling() {
    let items: Vec<u32> = (0..250).collect();
    let plan = BatchPlan::new(&items, size(IMAGERY_BATCH_LIMIT));
    assert!(plan.iter().all(|batch| batch.len() <= IMAGERY_BATCH_LIMIT));
    assert_eq!(plan.len(), 3);
}

#[test]
fn empty_input_yields_no_batches() {
    let items: Vec<u32> = Vec::new();
    let plan = BatchPlan::new(&items, size(50));
    assert!(plan.is_empty());
    assert_eq!(plan.iter().count(), 0);
}
