//! KMAC-based AEAD stream cipher.
//!
//! The keystream generator is a keyed KMACXOF256 instance: the key and IV
//! initialize the sponge, and the squeeze stream is consumed in 136-byte
//! blocks. The first 32 bytes of the stream become the authentication
//! subkey, which seeds a second, independent KMACXOF256 instance with empty
//! customization. Data is encrypted by XOR with the remaining stream, and
//! the tag is computed over `ciphertext || aad` (Encrypt-then-MAC).
//!
//! ```text
//! KS stream  = KMACXOF256(K = key, X = "", S = iv)
//! auth_key   = KS[0..32]
//! ciphertext = plaintext XOR KS[32..]
//! tag        = KMACXOF256(K = auth_key, X = ciphertext || aad, S = "")
//! ```
//!
//! Each engine instance is single-use: [`Encryptor::finalize`] and
//! [`Decryptor::finalize`] consume it. Keystream uniqueness across messages
//! rests on the caller never reusing a (key, IV) pair.
//!
//! Decryption always produces the plaintext before the tag is verified, so
//! the timing of a failed decrypt is indistinguishable from a successful
//! one. On failure the caller must discard the plaintext; the one-shot
//! [`decrypt`] wipes it before returning the error.

use crate::buffer::SecretBuffer;
use crate::constant_time::{verify_tag, xor_into};
use crate::error::CryptoError;
use crate::kmac::{CSHAKE256_RATE, KmacXof256};
use crate::{AEAD_KEY_SIZE, AUTH_KEY_SIZE, KEYSTREAM_BLOCK};
use sha3::CShake256Reader;
use sha3::digest::XofReader;
use std::sync::OnceLock;
use zeroize::{Zeroize, ZeroizeOnDrop};

// Multiple partial squeezes of the keystream XOF must concatenate to the
// same stream a single large squeeze would yield; refilling in whole rate
// blocks keeps this true for any squeeze discipline.
const _: () = assert!(KEYSTREAM_BLOCK % CSHAKE256_RATE == 0);
const _: () = assert!(AUTH_KEY_SIZE <= KEYSTREAM_BLOCK);

/// One block of buffered keystream, wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
struct KeystreamBuf([u8; KEYSTREAM_BLOCK]);

/// Shared cryptor state: chunked keystream plus the authentication sponge.
struct AeadState {
    reader: CShake256Reader,
    buf: KeystreamBuf,
    cursor: usize,
    auth: KmacXof256,
}

impl AeadState {
    fn setkey(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        if key.len() < AEAD_KEY_SIZE {
            return Err(CryptoError::InvalidParameter(format!(
                "key must be at least {AEAD_KEY_SIZE} bytes, got {}",
                key.len()
            )));
        }

        let keystream = KmacXof256::new(key, iv);
        let mut reader = keystream.finalize_xof();
        let mut buf = KeystreamBuf([0u8; KEYSTREAM_BLOCK]);
        reader.read(&mut buf.0);

        // The leading stream bytes key the authenticator; the keystream
        // proper starts right behind them.
        let auth = KmacXof256::new(&buf.0[..AUTH_KEY_SIZE], b"");

        Ok(Self {
            reader,
            buf,
            cursor: AUTH_KEY_SIZE,
            auth,
        })
    }

    /// XOR the buffered keystream into `data`, refilling one block at a
    /// time. Handles any data length across arbitrarily many refills.
    fn crypt_in_place(&mut self, data: &mut [u8]) {
        let mut off = 0;
        while off < data.len() {
            if self.cursor == KEYSTREAM_BLOCK {
                self.reader.read(&mut self.buf.0);
                self.cursor = 0;
            }
            let todo = (data.len() - off).min(KEYSTREAM_BLOCK - self.cursor);
            xor_into(
                &mut data[off..off + todo],
                &self.buf.0[self.cursor..self.cursor + todo],
            );
            off += todo;
            self.cursor += todo;
        }
    }
}

/// Streaming AEAD encryptor.
///
/// Feed plaintext in chunks of any size with [`update`](Self::update) or
/// [`update_in_place`](Self::update_in_place); the chunking is invisible in
/// the output. [`finalize`](Self::finalize) absorbs the trailing AAD and
/// produces the tag.
pub struct Encryptor {
    state: AeadState,
}

impl Encryptor {
    /// Set up an encryption session from `key` and `iv`.
    ///
    /// The IV may have any length, including empty; it must be unique per
    /// key but does not need to be secret.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidParameter`] if the key is shorter than
    /// [`AEAD_KEY_SIZE`], or [`CryptoError::SelfTestFailed`] if the one-time
    /// power-on known-answer check did not pass.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        self_test()?;
        Self::new_unchecked(key, iv)
    }

    fn new_unchecked(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self {
            state: AeadState::setkey(key, iv)?,
        })
    }

    /// Encrypt a chunk of plaintext in place and absorb the resulting
    /// ciphertext into the authenticator.
    pub fn update_in_place(&mut self, data: &mut [u8]) {
        self.state.crypt_in_place(data);
        self.state.auth.update(data);
    }

    /// Encrypt a chunk of plaintext, returning the ciphertext.
    #[must_use]
    pub fn update(&mut self, plaintext: &[u8]) -> Vec<u8> {
        let mut out = plaintext.to_vec();
        self.update_in_place(&mut out);
        out
    }

    /// Absorb the trailing AAD and produce a tag of `taglen` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidParameter`] if `taglen` is zero.
    pub fn finalize(mut self, aad: &[u8], taglen: usize) -> Result<Vec<u8>, CryptoError> {
        if taglen == 0 {
            return Err(CryptoError::InvalidParameter(
                "tag length must be nonzero".into(),
            ));
        }
        self.state.auth.update(aad);
        let mut tag = vec![0u8; taglen];
        self.state.auth.finalize_xof().read(&mut tag);
        Ok(tag)
    }
}

/// Streaming AEAD decryptor.
///
/// The mirror of [`Encryptor`]: ciphertext chunks are absorbed into the
/// authenticator and decrypted; [`finalize`](Self::finalize) verifies the
/// tag in constant time. The plaintext produced by `update` calls is only
/// trustworthy once `finalize` has returned `Ok`.
pub struct Decryptor {
    state: AeadState,
}

impl Decryptor {
    /// Set up a decryption session from `key` and `iv`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Encryptor::new`].
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        self_test()?;
        Self::new_unchecked(key, iv)
    }

    fn new_unchecked(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self {
            state: AeadState::setkey(key, iv)?,
        })
    }

    /// Absorb a chunk of ciphertext into the authenticator, then decrypt it
    /// in place.
    pub fn update_in_place(&mut self, data: &mut [u8]) {
        self.state.auth.update(data);
        self.state.crypt_in_place(data);
    }

    /// Decrypt a chunk of ciphertext, returning the (unverified) plaintext.
    #[must_use]
    pub fn update(&mut self, ciphertext: &[u8]) -> Vec<u8> {
        let mut out = ciphertext.to_vec();
        self.update_in_place(&mut out);
        out
    }

    /// Absorb the trailing AAD, compute the expected tag, and compare it
    /// with `tag` in constant time.
    ///
    /// The computed tag always has the same length as the supplied one, and
    /// the comparison never short-circuits; the scratch buffer holding it
    /// is wiped before this returns, on every path.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::AuthenticationFailed`] on mismatch; the
    /// caller must discard all plaintext produced by this session.
    /// Returns [`CryptoError::InvalidParameter`] if `tag` is empty, or
    /// [`CryptoError::AllocationFailed`] if scratch space for an oversized
    /// tag cannot be allocated.
    pub fn finalize(mut self, aad: &[u8], tag: &[u8]) -> Result<(), CryptoError> {
        if tag.is_empty() {
            return Err(CryptoError::InvalidParameter(
                "tag length must be nonzero".into(),
            ));
        }
        self.state.auth.update(aad);

        let mut computed = SecretBuffer::new(tag.len())?;
        self.state.auth.finalize_xof().read(computed.as_mut_slice());

        let ok = verify_tag(computed.as_slice(), tag);
        computed.wipe();
        if ok {
            Ok(())
        } else {
            Err(CryptoError::AuthenticationFailed)
        }
    }
}

/// One-shot authenticated encryption.
///
/// Equivalent to a single [`Encryptor::update`] followed by
/// [`Encryptor::finalize`]. Returns `(ciphertext, tag)`.
///
/// # Errors
///
/// Propagates the conditions of [`Encryptor::new`] and
/// [`Encryptor::finalize`].
pub fn encrypt(
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
    aad: &[u8],
    taglen: usize,
) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    let mut enc = Encryptor::new(key, iv)?;
    let ciphertext = enc.update(plaintext);
    let tag = enc.finalize(aad, taglen)?;
    Ok((ciphertext, tag))
}

/// One-shot authenticated decryption.
///
/// The plaintext is computed unconditionally before the tag comparison so
/// that failure timing matches success timing; on authentication failure it
/// is wiped and only the error is returned.
///
/// # Errors
///
/// Propagates the conditions of [`Decryptor::new`] and
/// [`Decryptor::finalize`].
pub fn decrypt(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    aad: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut dec = Decryptor::new(key, iv)?;
    let mut plaintext = ciphertext.to_vec();
    dec.update_in_place(&mut plaintext);
    match dec.finalize(aad, tag) {
        Ok(()) => Ok(plaintext),
        Err(e) => {
            plaintext.zeroize();
            Err(e)
        }
    }
}

/// Power-on known-answer check, run once per process.
fn self_test() -> Result<(), CryptoError> {
    static PASSED: OnceLock<bool> = OnceLock::new();

    let passed = *PASSED.get_or_init(|| {
        const EXP_CT: [u8; 64] = [
            0xac, 0x08, 0xfd, 0x63, 0x19, 0x0c, 0xd7, 0x49, 0x89, 0x4e, 0xfe, 0x02, 0x2c, 0x97,
            0x06, 0x8f, 0xfc, 0x1e, 0xd4, 0xc3, 0x7e, 0x7d, 0x01, 0x05, 0x10, 0x6e, 0x03, 0xec,
            0x26, 0xe4, 0x57, 0x30, 0xe7, 0x6f, 0x98, 0x33, 0x40, 0x3f, 0x75, 0x49, 0xbf, 0x65,
            0xd0, 0x49, 0x90, 0xf9, 0x33, 0x37, 0xb8, 0x18, 0x0e, 0xcb, 0xf8, 0xc5, 0x9d, 0x52,
            0xe5, 0x7e, 0x28, 0xac, 0x51, 0xcb, 0xdf, 0xd1,
        ];
        const EXP_TAG: [u8; 32] = [
            0x76, 0x6e, 0x5a, 0xd3, 0xa5, 0x30, 0x37, 0x45, 0x4a, 0xd0, 0x3f, 0xf8, 0x58, 0x07,
            0xee, 0xa2, 0x44, 0x17, 0xec, 0xda, 0x08, 0x8c, 0x9a, 0x29, 0xa2, 0xd9, 0x97, 0x31,
            0x71, 0x68, 0x8a, 0xb4,
        ];

        let key: Vec<u8> = (0u8..32).collect();
        let mut data: Vec<u8> = (0u8..64).collect();

        let Ok(mut enc) = Encryptor::new_unchecked(&key, &[]) else {
            return false;
        };
        enc.update_in_place(&mut data);
        let Ok(tag) = enc.finalize(&[], EXP_TAG.len()) else {
            return false;
        };

        data == EXP_CT && tag == EXP_TAG
    });

    if passed {
        Ok(())
    } else {
        Err(CryptoError::SelfTestFailed("kmac-aead"))
    }
}
