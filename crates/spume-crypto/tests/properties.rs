//! Property-based tests for the AEAD and the DRBGs.
//!
//! Uses proptest to verify invariants across large input spaces.

use proptest::prelude::*;

// ============================================================================
// AEAD properties
// ============================================================================

mod aead_properties {
    use super::*;
    use spume_crypto::aead::{decrypt, encrypt, Decryptor, Encryptor};
    use spume_crypto::error::CryptoError;

    proptest! {
        /// Encrypt then decrypt recovers the plaintext for any key, IV,
        /// message, associated data, and tag length.
        #[test]
        fn aead_roundtrip(
            key in prop::collection::vec(any::<u8>(), 32..=64),
            iv in prop::collection::vec(any::<u8>(), 0..32),
            plaintext in prop::collection::vec(any::<u8>(), 0..1024),
            aad in prop::collection::vec(any::<u8>(), 0..128),
            taglen in 1usize..=64,
        ) {
            let (ct, tag) = encrypt(&key, &iv, &plaintext, &aad, taglen).unwrap();
            prop_assert_eq!(ct.len(), plaintext.len());
            prop_assert_eq!(tag.len(), taglen);

            let recovered = decrypt(&key, &iv, &ct, &aad, &tag).unwrap();
            prop_assert_eq!(recovered, plaintext);
        }

        /// Feeding the plaintext in two pieces produces the same ciphertext
        /// and tag as one call, for every split point.
        #[test]
        fn aead_split_transparent(
            key in any::<[u8; 32]>(),
            plaintext in prop::collection::vec(any::<u8>(), 0..600),
            split_frac in 0.0f64..=1.0,
        ) {
            let split = (plaintext.len() as f64 * split_frac) as usize;

            let (expected_ct, expected_tag) = encrypt(&key, &[], &plaintext, &[], 32).unwrap();

            let mut enc = Encryptor::new(&key, &[]).unwrap();
            let mut ct = enc.update(&plaintext[..split]);
            ct.extend_from_slice(&enc.update(&plaintext[split..]));
            let tag = enc.finalize(&[], 32).unwrap();

            prop_assert_eq!(ct, expected_ct);
            prop_assert_eq!(tag, expected_tag);
        }

        /// Flipping any single bit of the ciphertext makes authentication
        /// fail.
        #[test]
        fn aead_ciphertext_tamper_detected(
            key in any::<[u8; 32]>(),
            plaintext in prop::collection::vec(any::<u8>(), 1..256),
            bit in any::<u32>(),
        ) {
            let (mut ct, tag) = encrypt(&key, &[], &plaintext, &[], 16).unwrap();
            let bit = bit as usize % (ct.len() * 8);
            ct[bit / 8] ^= 1 << (bit % 8);

            prop_assert_eq!(
                decrypt(&key, &[], &ct, &[], &tag),
                Err(CryptoError::AuthenticationFailed)
            );
        }

        /// Flipping any single bit of the tag or the associated data makes
        /// authentication fail.
        #[test]
        fn aead_tag_and_aad_tamper_detected(
            key in any::<[u8; 32]>(),
            plaintext in prop::collection::vec(any::<u8>(), 0..256),
            aad in prop::collection::vec(any::<u8>(), 1..64),
            tag_bit in any::<u32>(),
            aad_bit in any::<u32>(),
        ) {
            let (ct, tag) = encrypt(&key, &[], &plaintext, &aad, 32).unwrap();

            let mut bad_tag = tag.clone();
            let bit = tag_bit as usize % (bad_tag.len() * 8);
            bad_tag[bit / 8] ^= 1 << (bit % 8);
            prop_assert_eq!(
                decrypt(&key, &[], &ct, &aad, &bad_tag),
                Err(CryptoError::AuthenticationFailed)
            );

            let mut bad_aad = aad.clone();
            let bit = aad_bit as usize % (bad_aad.len() * 8);
            bad_aad[bit / 8] ^= 1 << (bit % 8);
            prop_assert_eq!(
                decrypt(&key, &[], &ct, &bad_aad, &tag),
                Err(CryptoError::AuthenticationFailed)
            );
        }

        /// A truncated tag is a prefix of the full tag and still verifies.
        #[test]
        fn aead_tag_prefix_consistency(
            key in any::<[u8; 32]>(),
            plaintext in prop::collection::vec(any::<u8>(), 0..256),
            short in 1usize..64,
        ) {
            let (ct, full_tag) = encrypt(&key, &[], &plaintext, &[], 64).unwrap();
            let (_, short_tag) = encrypt(&key, &[], &plaintext, &[], short).unwrap();

            prop_assert_eq!(&short_tag[..], &full_tag[..short]);
            decrypt(&key, &[], &ct, &[], &short_tag).unwrap();
        }

        /// Distinct IVs under one key produce unrelated ciphertexts.
        #[test]
        fn aead_iv_separates_streams(
            key in any::<[u8; 32]>(),
            iv_a in prop::collection::vec(any::<u8>(), 1..24),
            iv_b in prop::collection::vec(any::<u8>(), 1..24),
            plaintext in prop::collection::vec(any::<u8>(), 32..256),
        ) {
            prop_assume!(iv_a != iv_b);

            let (ct_a, _) = encrypt(&key, &iv_a, &plaintext, &[], 16).unwrap();
            let (ct_b, _) = encrypt(&key, &iv_b, &plaintext, &[], 16).unwrap();
            prop_assert_ne!(ct_a, ct_b);
        }

        /// Decryption can stream the ciphertext in pieces and still verify.
        #[test]
        fn aead_streaming_decrypt(
            key in any::<[u8; 32]>(),
            plaintext in prop::collection::vec(any::<u8>(), 1..512),
            chunk in 1usize..128,
        ) {
            let (ct, tag) = encrypt(&key, &[], &plaintext, &[], 32).unwrap();

            let mut dec = Decryptor::new(&key, &[]).unwrap();
            let mut recovered = Vec::new();
            for piece in ct.chunks(chunk) {
                recovered.extend_from_slice(&dec.update(piece));
            }
            dec.finalize(&[], &tag).unwrap();
            prop_assert_eq!(recovered, plaintext);
        }
    }
}

// ============================================================================
// DRBG properties
// ============================================================================

mod drbg_properties {
    use super::*;
    use spume_crypto::drbg::{KmacDrbg, ShakeDrbg};

    proptest! {
        /// Two generators with the same inputs produce identical streams.
        #[test]
        fn shake_drbg_deterministic(
            seed in prop::collection::vec(any::<u8>(), 1..64),
            pers in prop::collection::vec(any::<u8>(), 0..32),
            addtl in prop::collection::vec(any::<u8>(), 0..32),
            len in 1usize..600,
        ) {
            let mut a = ShakeDrbg::new();
            a.seed(&seed, &pers).unwrap();
            let mut b = ShakeDrbg::new();
            b.seed(&seed, &pers).unwrap();

            prop_assert_eq!(
                a.generate_vec(&addtl, len).unwrap(),
                b.generate_vec(&addtl, len).unwrap()
            );
        }

        /// Same for the KMAC generator.
        #[test]
        fn kmac_drbg_deterministic(
            seed in prop::collection::vec(any::<u8>(), 1..64),
            pers in prop::collection::vec(any::<u8>(), 0..32),
            addtl in prop::collection::vec(any::<u8>(), 0..32),
            len in 1usize..600,
        ) {
            let mut a = KmacDrbg::new();
            a.seed(&seed, &pers).unwrap();
            let mut b = KmacDrbg::new();
            b.seed(&seed, &pers).unwrap();

            prop_assert_eq!(
                a.generate_vec(&addtl, len).unwrap(),
                b.generate_vec(&addtl, len).unwrap()
            );
        }

        /// Different seeds diverge.
        #[test]
        fn shake_drbg_seed_separation(
            seed_a in prop::collection::vec(any::<u8>(), 1..32),
            seed_b in prop::collection::vec(any::<u8>(), 1..32),
        ) {
            prop_assume!(seed_a != seed_b);

            let mut a = ShakeDrbg::new();
            a.seed(&seed_a, &[]).unwrap();
            let mut b = ShakeDrbg::new();
            b.seed(&seed_b, &[]).unwrap();

            prop_assert_ne!(
                a.generate_vec(&[], 32).unwrap(),
                b.generate_vec(&[], 32).unwrap()
            );
        }

        /// Splitting a request at a multiple of the chunk bound matches the
        /// single-call stream; both generators end in the same state.
        #[test]
        fn shake_drbg_chunk_aligned_split(
            seed in prop::collection::vec(any::<u8>(), 1..32),
            chunks in 1usize..3,
            tail in 0usize..272,
        ) {
            let first = chunks * 272;

            let mut split = ShakeDrbg::new();
            split.seed(&seed, &[]).unwrap();
            let mut joined = ShakeDrbg::new();
            joined.seed(&seed, &[]).unwrap();

            let mut a = split.generate_vec(&[], first).unwrap();
            a.extend_from_slice(&split.generate_vec(&[], tail).unwrap());
            let b = joined.generate_vec(&[], first + tail).unwrap();
            prop_assert_eq!(a, b);
        }
    }

    /// Exhaustive single-bit tampering over a fixed-size message: every bit
    /// of ciphertext, tag, and associated data must be load-bearing.
    #[test]
    fn test_every_ciphertext_and_tag_bit_authenticated() {
        use spume_crypto::aead::{decrypt, encrypt};
        use spume_crypto::error::CryptoError;

        let key = [0x5au8; 32];
        let pt: Vec<u8> = (0..150).map(|i| (i * 7 % 256) as u8).collect();
        let (ct, tag) = encrypt(&key, b"iv", &pt, b"aad", 16).unwrap();

        for byte in 0..ct.len() {
            for bit in 0..8 {
                let mut bad = ct.clone();
                bad[byte] ^= 1 << bit;
                assert_eq!(
                    decrypt(&key, b"iv", &bad, b"aad", &tag),
                    Err(CryptoError::AuthenticationFailed),
                    "ciphertext bit {bit} of byte {byte} not authenticated"
                );
            }
        }
        for byte in 0..tag.len() {
            for bit in 0..8 {
                let mut bad = tag.clone();
                bad[byte] ^= 1 << bit;
                assert_eq!(
                    decrypt(&key, b"iv", &ct, b"aad", &bad),
                    Err(CryptoError::AuthenticationFailed),
                    "tag bit {bit} of byte {byte} accepted"
                );
            }
        }
        for byte in 0..3 {
            for bit in 0..8 {
                let mut bad = b"aad".to_vec();
                bad[byte] ^= 1 << bit;
                assert_eq!(
                    decrypt(&key, b"iv", &ct, &bad, &tag),
                    Err(CryptoError::AuthenticationFailed),
                    "aad bit {bit} of byte {byte} not authenticated"
                );
            }
        }
    }
}
