//! # SPUME Crypto
//!
//! Keyed-sponge stream primitives built on the SHA-3 sponge family.
//!
//! This crate provides:
//! - KMAC-based AEAD stream cipher (Encrypt-then-MAC, XOF keystream)
//! - `ShakeDrbg` fast-key-erasure deterministic random bit generator
//! - `KmacDrbg` fast-key-erasure generator with KMAC domain separation
//! - Constant-time tag comparison
//! - Zeroized secret buffers with small-buffer optimization
//!
//! ## Cryptographic Suite
//!
//! | Function | Algorithm | Security Level |
//! |----------|-----------|----------------|
//! | Keystream / MAC | KMACXOF256 (cSHAKE256) | 256-bit key |
//! | DRBG | SHAKE256 fast-key-erasure | 256-bit |
//! | DRBG (variant) | KMAC256 fast-key-erasure | 256-bit |
//! | Comparison | `subtle` constant-time | N/A |
//!
//! ## Security Notes
//!
//! The AEAD keystream is an XOR construction: keystream uniqueness across
//! encryption operations is the caller's responsibility. Reusing a (key, IV)
//! pair leaks the XOR of the two plaintexts. The IV may be any length,
//! including empty, and does not need to be secret; it only needs to be
//! unique per key.
//!
//! Both DRBGs overwrite their chaining value from the same sponge squeeze
//! that produces the output, before any output bytes are released. Compromise
//! of generator state therefore reveals nothing about previously generated
//! output (backtracking resistance).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod aead;
pub mod buffer;
pub mod constant_time;
pub mod drbg;
pub mod error;
pub mod kmac;

pub use aead::{Decryptor, Encryptor, decrypt, encrypt};
pub use drbg::{KmacDrbg, ShakeDrbg};
pub use error::CryptoError;

/// Minimum AEAD key size (32 bytes / 256 bits). Longer keys are accepted.
pub const AEAD_KEY_SIZE: usize = 32;

/// Authentication subkey size derived during AEAD setkey (32 bytes).
pub const AUTH_KEY_SIZE: usize = 32;

/// AEAD keystream block size (one cSHAKE256 rate block).
pub const KEYSTREAM_BLOCK: usize = 136;

/// DRBG chaining value size (64 bytes / 512 bits).
pub const DRBG_KEY_SIZE: usize = 64;

/// Maximum DRBG output produced per re-key of the chaining value.
pub const DRBG_MAX_CHUNK: usize = 272;
