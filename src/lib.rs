//! chained-hashtable: a single-threaded, separately chained hash table
//! keyed by raw bytes, with per-table ownership modes for keys and values.
//!
//! Internal Design:
//!
//! Summary
//! - Buckets: a `Vec<Option<DefaultKey>>` of chain heads. Each chain is a
//!   singly linked list whose nodes live in a `SlotMap` arena and link to
//!   each other by arena key. Splicing a node out is O(1) once its
//!   predecessor is known; search is linear in the chain.
//! - Hashing: `hasher::hash_bytes` folds 16-bit words of the key and reduces
//!   modulo the bucket count. Keys compare by length, then bytes.
//! - Resize: a fresh head array is allocated first, then every node is
//!   relinked by its hash against the new size. Payloads never move, and
//!   a failed allocation leaves the table untouched.
//!
//! Ownership modes
//! - `Mode::CopyBoth`: key and value are copied into table storage.
//! - `Mode::CopyKeyBorrowValue`: key is copied, value is borrowed.
//! - `Mode::BorrowBoth`: key and value are borrowed.
//!   Borrowed data has lifetime `'a` and must outlive the table. Optional
//!   destructor callbacks see borrowed keys/values when a notifying
//!   operation releases them (`insert` over an existing key, `remove`,
//!   `clear`, `destroy`). `replace`, `steal`, `release` and dropping the
//!   table never notify. Copied data is simply freed.
//!
//! Growth and shrink
//! - Before an insert, if `len / bucket_count >= grow_ratio` the table
//!   doubles, up to `MAX_BUCKET_COUNT`.
//! - Before a removal (not a steal), if `bucket_count / len >= grow_ratio`
//!   the table halves. The check is skipped for an empty table and never
//!   goes below one bucket.
//!
//! Iteration
//! - The embedded cursor (`iter_reset`/`iter_is_done`/`iter_next`) keeps its
//!   position inside the table; every table has its own. Structural changes
//!   end an in-progress walk.
//! - `iter()`/`keys()` borrow the table and are unaffected by the cursor.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` through the boxed destructors.
//! - Null keys and values cannot be expressed; `&[u8]` is always valid.
//! - Internal consistency (chain walk count equals `len`) is checked with
//!   `debug_assert!` at the start of every mutating operation.

mod builder;
mod cursor;
mod entry;
mod error;
mod hash_table;
mod hash_table_proptest;
pub mod hasher;

// Public surface
pub use builder::{Builder, DEFAULT_BUCKET_COUNT, DEFAULT_GROW_RATIO, MAX_BUCKET_COUNT};
pub use cursor::{Iter, Keys};
pub use entry::{Destructor, Mode};
pub use error::{Error, Result};
pub use hash_table::{HashTable, Stolen};
