use std::num::NonZeroUsize;
use std::slice::Chunks;

pub const METADATA_BATCH_LIMIT: usize = 50;
pub const IMAGERY_BATCH_LIMIT: usize = 100;

#[derive(Debug)]
pub struct BatchPlan<'a, T> {
    items: &'a [T],
    size: NonZeroUsize,
}

impl<'a, T> BatchPlan<'a, T> {
    pub fn new(items: &'a [T], size: NonZeroUsize) -> Self {
        Self { items, size }
    }

    pub fn len(&self) -> usize {
        self.items.len().div_ceil(self.size.get())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> Chunks<'a, T> {
        self.items.chunks(self.size.get())
    }
}

impl<'a, T> IntoIterator for &BatchPlan<'a, T> {
    type Item = &'a [T];
    type IntoIter = Chunks<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn last_batch_is_shorter() {
        let items = [1, 2, 3, 4, 5];
        let plan = BatchPlan::new(&items, size(2));
        let batches: Vec<&[i32]> = plan.iter().collect();
        assert_eq!(batches, vec![&[1, 2][..], &[3, 4][..], &[5][..]]);
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn empty_input_has_no_batches() {
        let items: [u8; 0] = [];
        let plan = BatchPlan::new(&items, size(50));
        assert_eq!(plan.iter().count(), 0);
        assert_eq!(plan.len(), 0);
        assert!(plan.is_empty());
    }

    #[test]
    fn plan_can_be_walked_twice() {
        let items = [1, 2, 3];
        let plan = BatchPlan::new(&items, size(2));
        assert_eq!(plan.iter().count(), (&plan).into_iter().count());
    }
}
