//! HashTable: bucket array of singly linked chains over a node arena.

use crate::builder::{Builder, DEFAULT_BUCKET_COUNT, DEFAULT_GROW_RATIO, MAX_BUCKET_COUNT};
use crate::cursor::Cursor;
use crate::entry::{Destructor, Destructors, Entry, Mode};
use crate::error::{Error, Result};
use crate::hasher::hash_bytes;
use core::fmt;
use core::mem;
use log::{debug, trace, warn};
use slotmap::{DefaultKey, SlotMap};
use std::borrow::Cow;

/// A key/value pair detached from the table by `steal`.
pub type Stolen<'a> = (Cow<'a, [u8]>, Cow<'a, [u8]>);

/// Separately chained table keyed by raw bytes.
///
/// Keys are equal when their lengths and bytes are equal. Whether keys and
/// values are copied or borrowed is decided by the table's `Mode`; borrowed
/// data must outlive the table (`'a`).
pub struct HashTable<'a> {
    pub(crate) buckets: Vec<Option<DefaultKey>>,
    pub(crate) nodes: SlotMap<DefaultKey, Entry<'a>>, // chain nodes, linked through `Entry::next`
    mode: Mode,
    grow_ratio: usize,
    destructors: Destructors<'a>,
    pub(crate) cursor: Cursor,
    // Bumped on every structural change; invalidates the cursor.
    pub(crate) epoch: u64,
}

impl<'a> HashTable<'a> {
    /// Empty table with `DEFAULT_BUCKET_COUNT` buckets and no destructors.
    pub fn new(mode: Mode) -> Self {
        Self::with_destructors(mode, None, None)
    }

    /// Empty table whose borrowed keys/values are reported to the given
    /// callbacks when a notifying operation releases them.
    pub fn with_destructors(
        mode: Mode,
        key_destructor: Option<Destructor<'a>>,
        value_destructor: Option<Destructor<'a>>,
    ) -> Self {
        Self::assemble(
            mode,
            vec![None; DEFAULT_BUCKET_COUNT],
            DEFAULT_GROW_RATIO,
            Destructors {
                key: key_destructor,
                value: value_destructor,
            },
        )
    }

    pub fn builder(mode: Mode) -> Builder<'a> {
        Builder::new(mode)
    }

    pub(crate) fn assemble(
        mode: Mode,
        buckets: Vec<Option<DefaultKey>>,
        grow_ratio: usize,
        destructors: Destructors<'a>,
    ) -> Self {
        debug_assert!(!buckets.is_empty());
        Self {
            buckets,
            nodes: SlotMap::with_key(),
            mode,
            grow_ratio,
            destructors,
            cursor: Cursor::default(),
            epoch: 0,
        }
    }

    /// Fallibly allocate `count` empty chain heads.
    pub(crate) fn alloc_buckets(count: usize) -> Result<Vec<Option<DefaultKey>>> {
        if count == 0 || count > MAX_BUCKET_COUNT {
            return Err(Error::InvalidBucketCount { requested: count });
        }
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(count).map_err(|_| {
            warn!("cannot allocate {} buckets", count);
            Error::OutOfMemory
        })?;
        buckets.resize(count, None);
        Ok(buckets)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn grow_ratio(&self) -> usize {
        self.grow_ratio
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    fn bucket_of(&self, key: &[u8]) -> usize {
        hash_bytes(key, self.buckets.len())
    }

    #[inline]
    fn touch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Number of nodes reachable by walking every chain.
    pub(crate) fn chained_len(&self) -> usize {
        let mut count = 0;
        for head in &self.buckets {
            let mut cur = *head;
            while let Some(k) = cur {
                count += 1;
                cur = self.nodes.get(k).and_then(|e| e.next);
            }
        }
        count
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert_eq!(
            self.chained_len(),
            self.nodes.len(),
            "chain walk disagrees with entry count"
        );
    }

    fn find_node(&self, key: &[u8]) -> Option<DefaultKey> {
        let mut cur = self.buckets[self.bucket_of(key)];
        while let Some(k) = cur {
            let entry = &self.nodes[k];
            if entry.matches(key) {
                return Some(k);
            }
            cur = entry.next;
        }
        None
    }

    /// Insert `key -> value`. An existing equal key is replaced in place and
    /// its old key/value are released with destructor notification.
    ///
    /// Grows the table to twice its bucket count first when the load ratio
    /// has reached `grow_ratio`.
    pub fn insert(&mut self, key: &'a [u8], value: &'a [u8]) -> Result<()> {
        self.put(key, value, true)
    }

    /// Swap the value stored under an existing `key` without notifying the
    /// value destructor. Returns `NotFound`, leaving the table untouched,
    /// when `key` is absent.
    pub fn replace(&mut self, key: &'a [u8], value: &'a [u8]) -> Result<()> {
        if self.find_node(key).is_none() {
            trace!("replace: key of {} bytes not present", key.len());
            return Err(Error::NotFound);
        }
        self.put(key, value, false)
    }

    fn put(&mut self, key: &'a [u8], value: &'a [u8], notify: bool) -> Result<()> {
        self.debug_check();
        let entry = Entry::new(self.mode, key, value)?;

        let buckets = self.buckets.len();
        if self.nodes.len() / buckets >= self.grow_ratio {
            let target = buckets.saturating_mul(2).min(MAX_BUCKET_COUNT);
            if target > buckets {
                debug!(
                    "load ratio {} reached limit {}, growing to {} buckets",
                    self.nodes.len() / buckets,
                    self.grow_ratio,
                    target
                );
                self.resize(target)?;
            }
        }

        let idx = self.bucket_of(key);
        let mut prev = None;
        let mut cur = self.buckets[idx];
        while let Some(k) = cur {
            let node = &mut self.nodes[k];
            if node.matches(key) {
                trace!("replacing entry in bucket {}", idx);
                let old = Entry {
                    key: mem::replace(&mut node.key, entry.key),
                    value: mem::replace(&mut node.value, entry.value),
                    next: None,
                };
                self.destructors.release(self.mode, old, notify);
                self.touch();
                return Ok(());
            }
            prev = cur;
            cur = node.next;
        }

        let new = self.nodes.insert(entry);
        match prev {
            None => self.buckets[idx] = Some(new),
            Some(p) => self.nodes[p].next = Some(new),
        }
        trace!("appended entry to bucket {}", idx);
        self.touch();
        Ok(())
    }

    pub fn lookup(&self, key: &[u8]) -> Option<&[u8]> {
        self.find_node(key).map(|k| &*self.nodes[k].value)
    }

    /// Like `lookup`, but also returns the table's own stored key.
    pub fn lookup_extended(&self, key: &[u8]) -> Option<(&[u8], &[u8])> {
        self.find_node(key).map(|k| {
            let e = &self.nodes[k];
            (&*e.key, &*e.value)
        })
    }

    pub fn has_key(&self, key: &[u8]) -> bool {
        self.find_node(key).is_some()
    }

    /// Remove `key`, notifying destructors for the released entry.
    ///
    /// When the inverse load ratio has reached `grow_ratio`, the table is
    /// first halved. A failed shrink is skipped; the removal still happens.
    pub fn remove(&mut self, key: &[u8]) -> Result<()> {
        self.debug_check();
        if self.find_node(key).is_none() {
            trace!("remove: key of {} bytes not present", key.len());
            return Err(Error::NotFound);
        }
        self.maybe_shrink();
        let entry = self.unlink(key)?;
        self.destructors.release(self.mode, entry, true);
        Ok(())
    }

    /// Remove `key` without notifying destructors and hand the stored key
    /// and value back to the caller. Never shrinks the table.
    pub fn steal(&mut self, key: &[u8]) -> Result<Stolen<'a>> {
        self.debug_check();
        let entry = self.unlink(key)?;
        Ok((entry.key, entry.value))
    }

    fn maybe_shrink(&mut self) {
        let count = self.nodes.len();
        if count == 0 {
            return;
        }
        let buckets = self.buckets.len();
        if buckets > 1 && buckets / count >= self.grow_ratio {
            debug!(
                "inverse load ratio {} reached limit {}, shrinking to {} buckets",
                buckets / count,
                self.grow_ratio,
                buckets / 2
            );
            if let Err(e) = self.resize(buckets / 2) {
                warn!("shrink to {} buckets abandoned: {}", buckets / 2, e);
            }
        }
    }

    fn unlink(&mut self, key: &[u8]) -> Result<Entry<'a>> {
        let idx = self.bucket_of(key);
        let mut prev = None;
        let mut cur = self.buckets[idx];
        while let Some(k) = cur {
            let next = self.nodes[k].next;
            if self.nodes[k].matches(key) {
                match prev {
                    None => self.buckets[idx] = next,
                    Some(p) => self.nodes[p].next = next,
                }
                self.touch();
                trace!("unlinked entry from bucket {}", idx);
                return self.nodes.remove(k).ok_or(Error::NotFound);
            }
            prev = cur;
            cur = next;
        }
        Err(Error::NotFound)
    }

    /// Rebuild the bucket array with `bucket_count` buckets and relink every
    /// entry by its hash against the new size. Entries are moved, never
    /// copied, and no destructor runs. On failure the table is unchanged.
    pub fn resize(&mut self, bucket_count: usize) -> Result<()> {
        let mut fresh = Self::alloc_buckets(bucket_count)?;
        debug!(
            "resizing from {} to {} buckets ({} entries)",
            self.buckets.len(),
            bucket_count,
            self.nodes.len()
        );

        let old = mem::take(&mut self.buckets);
        let mut moved = 0;
        for head in old {
            let mut cur = head;
            while let Some(k) = cur {
                let node = &mut self.nodes[k];
                cur = node.next;
                let idx = hash_bytes(&node.key, bucket_count);
                node.next = fresh[idx];
                fresh[idx] = Some(k);
                moved += 1;
            }
        }
        debug_assert_eq!(moved, self.nodes.len(), "resize lost entries");

        self.buckets = fresh;
        self.touch();
        Ok(())
    }

    /// Remove every entry, notifying destructors. The bucket count is kept.
    pub fn clear(&mut self) {
        self.drain(true);
    }

    fn drain(&mut self, notify: bool) {
        for i in 0..self.buckets.len() {
            let mut cur = self.buckets[i].take();
            while let Some(k) = cur {
                let Some(entry) = self.nodes.remove(k) else {
                    break;
                };
                cur = entry.next;
                self.destructors.release(self.mode, entry, notify);
            }
        }
        debug_assert!(self.nodes.is_empty());
        self.touch();
    }

    /// Tear the table down, notifying destructors for every entry.
    pub fn destroy(mut self) {
        self.drain(true);
    }

    /// Tear the table down without notifying destructors; borrowed keys and
    /// values stay with their owners. Equivalent to dropping the table.
    pub fn release(self) {}
}

impl fmt::Debug for HashTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("mode", &self.mode)
            .field("len", &self.nodes.len())
            .field("buckets", &self.buckets.len())
            .field("grow_ratio", &self.grow_ratio)
            .finish_non_exhaustive()
    }
}
