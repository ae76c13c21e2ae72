//! Error types for `HashTable` operations.

/// Failures surfaced by table operations. A failed operation leaves the
/// table exactly as it was.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Copying a key/value or allocating a bucket array failed.
    #[error("out of memory")]
    OutOfMemory,

    /// The key is not present in the table.
    #[error("key not found")]
    NotFound,

    /// A bucket count of zero, or one above `MAX_BUCKET_COUNT`, was requested.
    #[error("invalid bucket count {requested}")]
    InvalidBucketCount { requested: usize },
}

pub type Result<T> = core::result::Result<T, Error>;
