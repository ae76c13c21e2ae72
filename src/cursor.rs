//! Key iteration.
//!
//! Two flavours are provided:
//! - the embedded cursor (`iter_reset` / `iter_is_done` / `iter_next`), whose
//!   position lives inside the table, so one walk is active per table and a
//!   new `iter_reset` restarts it. Any structural change (insert, replace,
//!   remove, steal, resize, clear) after `iter_reset` ends the walk: the
//!   cursor reports done until reset again.
//! - `iter()` / `keys()`, ordinary borrowing iterators that cannot observe
//!   mutation.
//!
//! Both visit buckets in index order and each chain front to back; the order
//! is not insertion order.

use crate::hash_table::HashTable;
use slotmap::DefaultKey;

/// Position of the embedded key cursor.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Cursor {
    bucket: usize,
    node: Option<DefaultKey>,
    epoch: u64,
}

impl<'a> HashTable<'a> {
    /// Position the cursor on the first entry of the first non-empty bucket.
    pub fn iter_reset(&mut self) {
        self.cursor = Cursor {
            bucket: 0,
            node: None,
            epoch: self.epoch,
        };
        if !self.is_empty() {
            self.seek(0);
        }
    }

    pub fn iter_is_done(&self) -> bool {
        self.is_empty() || self.cursor.node.is_none() || self.cursor.epoch != self.epoch
    }

    /// Return the key under the cursor and advance. `None` once done.
    pub fn iter_next(&mut self) -> Option<&[u8]> {
        if self.iter_is_done() {
            return None;
        }
        let current = self.cursor.node?;
        let next = self.nodes.get(current)?.next;
        match next {
            Some(next) => self.cursor.node = Some(next),
            None => self.seek(self.cursor.bucket + 1),
        }
        self.nodes.get(current).map(|e| &*e.key)
    }

    fn seek(&mut self, from: usize) {
        let found = self
            .buckets
            .iter()
            .enumerate()
            .skip(from)
            .find_map(|(i, head)| head.map(|k| (i, k)));
        match found {
            Some((bucket, node)) => {
                self.cursor.bucket = bucket;
                self.cursor.node = Some(node);
            }
            None => {
                self.cursor.bucket = self.buckets.len();
                self.cursor.node = None;
            }
        }
    }

    /// Borrowing iterator over `(key, value)` pairs in bucket order.
    pub fn iter(&self) -> Iter<'_, 'a> {
        Iter {
            table: self,
            bucket: 0,
            node: None,
        }
    }

    pub fn keys(&self) -> Keys<'_, 'a> {
        Keys { inner: self.iter() }
    }
}

/// Iterator over the entries of a `HashTable`.
pub struct Iter<'t, 'a> {
    table: &'t HashTable<'a>,
    bucket: usize,
    node: Option<DefaultKey>,
}

impl<'t, 'a> Iterator for Iter<'t, 'a> {
    type Item = (&'t [u8], &'t [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.node {
                let e = self.table.nodes.get(k)?;
                self.node = e.next;
                return Some((&*e.key, &*e.value));
            }
            let head = self.table.buckets.get(self.bucket)?;
            self.node = *head;
            self.bucket += 1;
        }
    }
}

/// Iterator over the keys of a `HashTable`.
pub struct Keys<'t, 'a> {
    inner: Iter<'t, 'a>,
}

impl<'t, 'a> Iterator for Keys<'t, 'a> {
    type Item = &'t [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

impl<'t, 'a> IntoIterator for &'t HashTable<'a> {
    type Item = (&'t [u8], &'t [u8]);
    type IntoIter = Iter<'t, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::entry::Mode;
    use crate::hash_table::HashTable;
    use std::collections::BTreeSet;

    fn drain_cursor(t: &mut HashTable<'_>) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        t.iter_reset();
        while !t.iter_is_done() {
            out.push(t.iter_next().expect("cursor not done").to_vec());
        }
        out
    }

    #[test]
    fn empty_table_is_done_immediately() {
        let mut t = HashTable::new(Mode::CopyBoth);
        assert!(t.iter_is_done());
        t.iter_reset();
        assert!(t.iter_is_done());
        assert_eq!(t.iter_next(), None);
    }

    #[test]
    fn cursor_visits_every_key_once_across_chains() {
        let keys: Vec<[u8; 4]> = (0u32..40).map(|i| i.to_le_bytes()).collect();
        let mut t = HashTable::builder(Mode::BorrowBoth)
            .initial_buckets(3)
            .grow_ratio(100)
            .build()
            .unwrap();
        for k in &keys {
            t.insert(k, b"v").unwrap();
        }
        let seen = drain_cursor(&mut t);
        assert_eq!(seen.len(), keys.len());
        let set: BTreeSet<Vec<u8>> = seen.into_iter().collect();
        let expected: BTreeSet<Vec<u8>> = keys.iter().map(|k| k.to_vec()).collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn reset_restarts_walk() {
        let mut t = HashTable::new(Mode::CopyBoth);
        t.insert(b"a", b"1").unwrap();
        t.insert(b"b", b"2").unwrap();
        t.iter_reset();
        let first = t.iter_next().unwrap().to_vec();
        t.iter_reset();
        assert_eq!(t.iter_next().unwrap(), &first[..]);
        assert_eq!(drain_cursor(&mut t).len(), 2);
    }

    #[test]
    fn cursors_of_distinct_tables_are_independent() {
        let mut a = HashTable::builder(Mode::CopyBoth)
            .initial_buckets(1)
            .build()
            .unwrap();
        let mut b = HashTable::builder(Mode::CopyBoth)
            .initial_buckets(1)
            .build()
            .unwrap();
        for k in [b"1", b"2", b"3"] {
            a.insert(k, b"a").unwrap();
            b.insert(k, b"b").unwrap();
        }
        a.iter_reset();
        b.iter_reset();
        let mut from_a = Vec::new();
        let mut from_b = Vec::new();
        while !a.iter_is_done() || !b.iter_is_done() {
            if let Some(k) = a.iter_next() {
                from_a.push(k.to_vec());
            }
            if let Some(k) = b.iter_next() {
                from_b.push(k.to_vec());
            }
        }
        assert_eq!(from_a, vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);
        assert_eq!(from_a, from_b);
    }

    #[test]
    fn mutation_ends_the_walk() {
        let mut t = HashTable::new(Mode::CopyBoth);
        t.insert(b"a", b"1").unwrap();
        t.insert(b"b", b"2").unwrap();
        t.iter_reset();
        assert!(!t.iter_is_done());
        t.insert(b"c", b"3").unwrap();
        assert!(t.iter_is_done());
        assert_eq!(t.iter_next(), None);

        t.iter_reset();
        t.resize(5).unwrap();
        assert!(t.iter_is_done());
    }

    #[test]
    fn borrowing_iter_matches_cursor() {
        let keys: Vec<[u8; 2]> = (0u16..100).map(|i| i.to_le_bytes()).collect();
        let mut t = HashTable::new(Mode::CopyKeyBorrowValue);
        for k in &keys {
            t.insert(k, k).unwrap();
        }
        let via_iter: Vec<Vec<u8>> = t.keys().map(|k| k.to_vec()).collect();
        assert_eq!(via_iter, drain_cursor(&mut t));
        for (k, v) in &t {
            assert_eq!(k, v);
        }
        assert_eq!(t.iter().count(), keys.len());
    }
}
