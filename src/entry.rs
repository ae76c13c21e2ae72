//! Chain nodes and the per-mode ownership rules.

use crate::error::{Error, Result};
use slotmap::DefaultKey;
use std::borrow::Cow;

/// Ownership policy of a table, fixed at construction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Mode {
    /// Keys and values are copied into table-owned storage.
    CopyBoth,
    /// Keys are copied; values are borrowed from the caller.
    CopyKeyBorrowValue,
    /// Keys and values are both borrowed from the caller.
    BorrowBoth,
}

impl Mode {
    #[inline]
    pub fn copies_key(self) -> bool {
        matches!(self, Mode::CopyBoth | Mode::CopyKeyBorrowValue)
    }

    #[inline]
    pub fn copies_value(self) -> bool {
        matches!(self, Mode::CopyBoth)
    }
}

/// Callback notified with a borrowed key or value when a notifying
/// operation (`remove`, replacing `insert`, `destroy`) releases it.
pub type Destructor<'a> = Box<dyn FnMut(&'a [u8]) + 'a>;

#[derive(Debug)]
pub(crate) struct Entry<'a> {
    pub(crate) key: Cow<'a, [u8]>,
    pub(crate) value: Cow<'a, [u8]>,
    pub(crate) next: Option<DefaultKey>,
}

impl<'a> Entry<'a> {
    /// Build a detached node, copying whatever `mode` says the table owns.
    pub(crate) fn new(mode: Mode, key: &'a [u8], value: &'a [u8]) -> Result<Self> {
        let key = if mode.copies_key() {
            Cow::Owned(copy_bytes(key)?)
        } else {
            Cow::Borrowed(key)
        };
        let value = if mode.copies_value() {
            Cow::Owned(copy_bytes(value)?)
        } else {
            Cow::Borrowed(value)
        };
        Ok(Entry {
            key,
            value,
            next: None,
        })
    }

    /// Length first, then bytes.
    #[inline]
    pub(crate) fn matches(&self, key: &[u8]) -> bool {
        self.key.len() == key.len() && *self.key == *key
    }
}

/// Fallible copy into a fresh exact-size buffer.
pub(crate) fn copy_bytes(src: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(src.len()).map_err(|_| {
        log::warn!("cannot allocate {} bytes for a copy", src.len());
        Error::OutOfMemory
    })?;
    buf.extend_from_slice(src);
    Ok(buf)
}

/// Optional destructor callbacks held by a table.
#[derive(Default)]
pub(crate) struct Destructors<'a> {
    pub(crate) key: Option<Destructor<'a>>,
    pub(crate) value: Option<Destructor<'a>>,
}

impl<'a> Destructors<'a> {
    /// Dispose of a node that has already been unlinked.
    ///
    /// Copied payloads are freed by dropping them. Borrowed payloads are
    /// handed to the matching destructor only when `notify` is set.
    pub(crate) fn release(&mut self, mode: Mode, entry: Entry<'a>, notify: bool) {
        match mode {
            Mode::CopyBoth => drop(entry),
            Mode::CopyKeyBorrowValue => {
                if notify {
                    if let (Some(f), Cow::Borrowed(v)) = (self.value.as_mut(), entry.value) {
                        f(v);
                    }
                }
            }
            Mode::BorrowBoth => {
                if notify {
                    if let (Some(f), Cow::Borrowed(k)) = (self.key.as_mut(), entry.key) {
                        f(k);
                    }
                    if let (Some(f), Cow::Borrowed(v)) = (self.value.as_mut(), entry.value) {
                        f(v);
                    }
                }
            }
        }
    }
}
