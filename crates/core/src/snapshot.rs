//! Immutable byte-buffer value type

use bytes::Bytes;
use std::fmt;

/// An immutable view over cached bytes.
///
/// `Snapshot` is the value type every cache in meshcache stores and
/// returns. It is backed by [`Bytes`], so cloning is cheap and the
/// underlying buffer can never be mutated through a snapshot. The
/// default snapshot is empty, which is distinct from a key being
/// absent (`None` at lookup sites).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    bytes: Bytes,
}

impl Snapshot {
    /// Wrap raw bytes in a snapshot.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Number of bytes in the snapshot.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for the empty snapshot.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// An independent owned copy of the bytes. Mutating the returned
    /// vector cannot touch the cached data.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl AsRef<[u8]> for Snapshot {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for Snapshot {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Snapshot {
    fn from(bytes: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(bytes))
    }
}

impl From<&str> for Snapshot {
    fn from(s: &str) -> Self {
        Self::new(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<Bytes> for Snapshot {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}
