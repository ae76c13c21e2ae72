//! Table configuration.

use crate::entry::{Destructors, Mode};
use crate::error::Result;
use crate::hash_table::HashTable;

/// Bucket count of a freshly created table.
pub const DEFAULT_BUCKET_COUNT: usize = 128;

/// Load ratio at which a table doubles (and, inverted, halves).
pub const DEFAULT_GROW_RATIO: usize = 4;

/// Largest bucket count a table will allocate. Growth stops here and chains
/// lengthen instead.
pub const MAX_BUCKET_COUNT: usize = u32::MAX as usize;

/// Builder for `HashTable`.
///
/// ```
/// use chained_hashtable::{HashTable, Mode};
///
/// let table = HashTable::builder(Mode::CopyBoth)
///     .initial_buckets(16)
///     .grow_ratio(2)
///     .build()
///     .unwrap();
/// assert_eq!(table.bucket_count(), 16);
/// ```
pub struct Builder<'a> {
    mode: Mode,
    buckets: usize,
    grow_ratio: usize,
    destructors: Destructors<'a>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(mode: Mode) -> Self {
        Self {
            mode,
            buckets: DEFAULT_BUCKET_COUNT,
            grow_ratio: DEFAULT_GROW_RATIO,
            destructors: Destructors::default(),
        }
    }

    /// Number of buckets allocated up front. Must be in `1..=MAX_BUCKET_COUNT`.
    pub fn initial_buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets;
        self
    }

    /// Load ratio threshold; values below 1 are raised to 1.
    pub fn grow_ratio(mut self, ratio: usize) -> Self {
        self.grow_ratio = ratio.max(1);
        self
    }

    pub fn key_destructor<F>(mut self, f: F) -> Self
    where
        F: FnMut(&'a [u8]) + 'a,
    {
        self.destructors.key = Some(Box::new(f));
        self
    }

    pub fn value_destructor<F>(mut self, f: F) -> Self
    where
        F: FnMut(&'a [u8]) + 'a,
    {
        self.destructors.value = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<HashTable<'a>> {
        let buckets = HashTable::alloc_buckets(self.buckets)?;
        Ok(HashTable::assemble(
            self.mode,
            buckets,
            self.grow_ratio,
            self.destructors,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults() {
        let t = HashTable::builder(Mode::BorrowBoth).build().unwrap();
        assert_eq!(t.bucket_count(), DEFAULT_BUCKET_COUNT);
        assert_eq!(t.grow_ratio(), DEFAULT_GROW_RATIO);
        assert_eq!(t.mode(), Mode::BorrowBoth);
        assert!(t.is_empty());
    }

    #[test]
    fn zero_ratio_is_clamped() {
        let t = HashTable::builder(Mode::CopyBoth).grow_ratio(0).build().unwrap();
        assert_eq!(t.grow_ratio(), 1);
    }

    #[test]
    fn zero_buckets_rejected() {
        match HashTable::builder(Mode::CopyBoth).initial_buckets(0).build() {
            Err(Error::InvalidBucketCount { requested: 0 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
