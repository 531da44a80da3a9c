//! KMACXOF256 on top of cSHAKE256.
//!
//! SP800-185 KMAC in XOF mode: the key is framed with
//! `bytepad(encode_string(K), rate)` and absorbed ahead of the message, and
//! finalization appends `right_encode(0)` before switching the sponge to
//! squeezing. XOF mode means the output stream does not depend on the
//! requested length, so tags of different lengths over the same transcript
//! are prefix-consistent, and the squeeze stream can be consumed
//! incrementally in chunks of any size.
//!
//! The sponge itself comes from the `sha3` crate; this module only adds the
//! KMAC framing.

use sha3::{
    CShake256, CShake256Core, CShake256Reader,
    digest::{ExtendableOutput, Update},
};

/// cSHAKE256 rate (block size) in bytes.
pub const CSHAKE256_RATE: usize = 136;

const KMAC_FUNCTION_NAME: &[u8] = b"KMAC";
const ZERO_PAD: [u8; CSHAKE256_RATE] = [0u8; CSHAKE256_RATE];

/// `left_encode(value)` from SP800-185: big-endian value prefixed with its
/// byte length. Returns the encoding within `buf`.
pub(crate) fn left_encode(buf: &mut [u8; 9], value: u64) -> &[u8] {
    let bytes = value.to_be_bytes();
    let skip = if value == 0 {
        7
    } else {
        value.leading_zeros() as usize / 8
    };
    let n = 8 - skip;
    buf[0] = n as u8;
    buf[1..=n].copy_from_slice(&bytes[skip..]);
    &buf[..=n]
}

/// `right_encode(value)` from SP800-185: big-endian value suffixed with its
/// byte length.
pub(crate) fn right_encode(buf: &mut [u8; 9], value: u64) -> &[u8] {
    let bytes = value.to_be_bytes();
    let skip = if value == 0 {
        7
    } else {
        value.leading_zeros() as usize / 8
    };
    let n = 8 - skip;
    buf[..n].copy_from_slice(&bytes[skip..]);
    buf[n] = n as u8;
    &buf[..=n]
}

/// Incremental KMACXOF256 instance.
///
/// Construct with a key and customization string, absorb message data with
/// [`update`](Self::update), then [`finalize_xof`](Self::finalize_xof) to
/// obtain an unbounded squeeze stream.
pub struct KmacXof256 {
    state: CShake256,
}

impl KmacXof256 {
    /// Initialize with `key` and a customization string.
    ///
    /// Any key length is accepted, including empty; callers enforce their
    /// own minimum strength.
    #[must_use]
    pub fn new(key: &[u8], customization: &[u8]) -> Self {
        let core = CShake256Core::new_with_function_name(KMAC_FUNCTION_NAME, customization);
        let mut state = CShake256::from_core(core);

        // bytepad(encode_string(K), rate)
        let mut enc = [0u8; 9];
        let mut absorbed = 0usize;

        let w = left_encode(&mut enc, CSHAKE256_RATE as u64);
        state.update(w);
        absorbed += w.len();

        let klen = left_encode(&mut enc, (key.len() as u64) * 8);
        state.update(klen);
        absorbed += klen.len();

        state.update(key);
        absorbed += key.len();

        let rem = absorbed % CSHAKE256_RATE;
        if rem != 0 {
            state.update(&ZERO_PAD[..CSHAKE256_RATE - rem]);
        }

        Self { state }
    }

    /// Absorb message data.
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Finalize in XOF mode and return the squeeze stream.
    #[must_use]
    pub fn finalize_xof(mut self) -> CShake256Reader {
        let mut enc = [0u8; 9];
        let r = right_encode(&mut enc, 0);
        self.state.update(r);
        self.state.finalize_xof()
    }
}
