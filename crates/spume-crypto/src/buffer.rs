//! Zeroized secret buffers.
//!
//! Scratch space for computed authentication tags. Tags up to 128 bytes live
//! in an inline array; anything larger is heap-allocated through a fallible
//! reservation so an allocation failure surfaces as an error instead of an
//! abort. Both storage modes are wiped on drop.

use crate::error::CryptoError;
use zeroize::Zeroize;

/// Inline capacity before the buffer switches to heap storage.
pub const INLINE_CAP: usize = 128;

/// A fixed-length secret byte buffer with small-buffer optimization.
pub struct SecretBuffer {
    storage: Storage,
}

enum Storage {
    Inline { buf: [u8; INLINE_CAP], len: usize },
    Heap(Vec<u8>),
}

impl SecretBuffer {
    /// Allocate a zero-filled buffer of exactly `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::AllocationFailed`] if the heap reservation for
    /// an oversized buffer fails. No partial state is retained on that path.
    pub fn new(len: usize) -> Result<Self, CryptoError> {
        let storage = if len <= INLINE_CAP {
            Storage::Inline {
                buf: [0u8; INLINE_CAP],
                len,
            }
        } else {
            let mut vec = Vec::new();
            vec.try_reserve_exact(len)
                .map_err(|_| CryptoError::AllocationFailed(len))?;
            vec.resize(len, 0);
            Storage::Heap(vec)
        };
        Ok(Self { storage })
    }

    /// View the buffer contents.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Storage::Inline { buf, len } => &buf[..*len],
            Storage::Heap(vec) => vec,
        }
    }

    /// Mutable view of the buffer contents.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Storage::Inline { buf, len } => &mut buf[..*len],
            Storage::Heap(vec) => vec,
        }
    }

    /// Wipe the buffer contents in place.
    ///
    /// The inline variant wipes the full backing array, not just the
    /// logical length.
    pub fn wipe(&mut self) {
        match &mut self.storage {
            Storage::Inline { buf, .. } => buf.zeroize(),
            Storage::Heap(vec) => vec.as_mut_slice().zeroize(),
        }
    }
}

impl Drop for SecretBuffer {
    fn drop(&mut self) {
        self.wipe();
    }
}
