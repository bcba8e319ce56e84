//! Salted identifier-to-code codec.
//!
//! Maps a positive identifier to a short printable string. The
//! identifier is mixed with salt-derived multiplicative and XOR
//! parameters before base58 encoding, so consecutive identifiers do
//! not produce consecutive codes and the mapping differs per
//! deployment salt. Encoding is deterministic per `(id, salt, flavor)`
//! and infallible; decoding is never needed because resolution is done
//! by direct code lookup.

use curtail_core::{Code, Flavor};
use sha2::{Digest as _, Sha512};
use typed_builder::TypedBuilder;

const LOWER_40_BITS_MASK: u64 = (1_u64 << 40) - 1;

/// The bs58 default alphabet, used for keystream padding characters.
const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Configures a [`CodeCodec`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct CodecSettings {
    /// Secret salt that makes codes non-guessable per deployment.
    #[builder(default = String::from("salt"), setter(into))]
    pub salt: String,
    /// Minimum output length for the long/obscure flavor.
    #[builder(default = 12)]
    pub min_long_length: usize,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Salt-derived multiplicative + XOR mixing over a masked bit width.
///
/// The multiplier is forced odd so the mapping is a bijection modulo
/// the mask width: distinct identifiers always mix to distinct values.
#[derive(Debug, Clone, Copy)]
struct Mixer {
    prime: u64,
    mask: u64,
    width_mask: u64,
}

impl Mixer {
    fn derive(salt: &str, tag: &[u8], width_mask: u64) -> Self {
        let mut hasher = Sha512::new();
        hasher.update(salt.as_bytes());
        hasher.update([0u8]);
        hasher.update(tag);
        let d = hasher.finalize();

        let prime =
            u64::from_be_bytes([d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]]) | 1;
        let mask =
            u64::from_be_bytes([d[8], d[9], d[10], d[11], d[12], d[13], d[14], d[15]])
                & width_mask;

        Self {
            prime,
            mask,
            width_mask,
        }
    }

    fn mix(&self, id: u64) -> u64 {
        (id.wrapping_mul(self.prime) ^ self.mask) & self.width_mask
    }
}

/// Encodes monotonic identifiers into short codes.
///
/// The two flavors draw from the same identifier space but use
/// independent salt-derived parameters: short codes mix in a 40-bit
/// space (at most 7 base58 characters), long codes mix in the full
/// 64-bit space with a salt-derived lottery byte and are padded up to
/// the configured minimum length. The flavors' outputs are therefore
/// length-disjoint and cannot collide with each other's key space
/// under normal operation.
#[derive(Debug, Clone)]
pub struct CodeCodec {
    salt: String,
    min_long_length: usize,
    short: Mixer,
    long: Mixer,
}

impl CodeCodec {
    pub fn new(settings: CodecSettings) -> Self {
        let short = Mixer::derive(&settings.salt, b"short", LOWER_40_BITS_MASK);
        let long = Mixer::derive(&settings.salt, b"long", u64::MAX);
        Self {
            salt: settings.salt,
            min_long_length: settings.min_long_length,
            short,
            long,
        }
    }

    /// Encodes an identifier with the requested flavor.
    ///
    /// Same identifier, salt, and flavor always yield the same code.
    pub fn encode(&self, id: u64, flavor: Flavor) -> Code {
        match flavor {
            Flavor::Short => self.encode_short(id),
            Flavor::Long => self.encode_long(id),
        }
    }

    fn encode_short(&self, id: u64) -> Code {
        let mixed = self.short.mix(id).to_be_bytes();
        // Low 40 bits only: 5 bytes, at most 7 base58 characters.
        Code::new(bs58::encode(&mixed[3..]).into_string())
    }

    fn encode_long(&self, id: u64) -> Code {
        let stream = self.keystream(id);
        let mixed = self.long.mix(id).to_be_bytes();

        let mut buf = [0u8; 9];
        buf[0] = stream[0];
        buf[1..].copy_from_slice(&mixed);

        let mut encoded = bs58::encode(buf).into_string();
        // 9 bytes encode to 12-13 characters; the keystream covers the
        // rare short encodings and any larger configured minimum.
        let mut next = 1;
        while encoded.len() < self.min_long_length {
            let b = stream[next % stream.len()];
            encoded.insert(0, BASE58_ALPHABET[(b % 58) as usize] as char);
            next += 1;
        }
        Code::new(encoded)
    }

    /// Deterministic per-identifier byte stream for the lottery byte
    /// and padding characters.
    fn keystream(&self, id: u64) -> [u8; 64] {
        let mut hasher = Sha512::new();
        hasher.update(self.salt.as_bytes());
        hasher.update([1u8]);
        hasher.update(id.to_be_bytes());
        let digest = hasher.finalize();

        let mut stream = [0u8; 64];
        stream.copy_from_slice(&digest);
        stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn codec() -> CodeCodec {
        CodeCodec::new(CodecSettings::default())
    }

    #[test]
    fn encode_is_deterministic() {
        let a = codec().encode(42, Flavor::Short);
        let b = codec().encode(42, Flavor::Short);
        assert_eq!(a, b);

        let a = codec().encode(42, Flavor::Long);
        let b = codec().encode(42, Flavor::Long);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_ids_produce_distinct_codes() {
        let codec = codec();
        let mut seen = HashSet::new();
        for id in 1..=500u64 {
            assert!(seen.insert(codec.encode(id, Flavor::Short)));
        }
    }

    #[test]
    fn small_ids_do_not_leak_into_codes() {
        // Without mixing, id 1 would encode to "2" and id 2 to "3".
        let codec = codec();
        assert_ne!(codec.encode(1, Flavor::Short).as_str(), "2");
        assert_ne!(codec.encode(2, Flavor::Short).as_str(), "3");
    }

    #[test]
    fn short_codes_stay_compact() {
        let codec = codec();
        for id in 1..=100u64 {
            assert!(codec.encode(id, Flavor::Short).as_str().len() <= 7);
        }
    }

    #[test]
    fn long_codes_meet_minimum_length() {
        let codec = codec();
        for id in 1..=100u64 {
            assert!(codec.encode(id, Flavor::Long).as_str().len() >= 12);
        }
    }

    #[test]
    fn flavors_never_collide() {
        // Short codes top out at 7 characters, long codes start at 12;
        // the key spaces are length-disjoint.
        let codec = codec();
        for id in 1..=100u64 {
            let short = codec.encode(id, Flavor::Short);
            let long = codec.encode(id, Flavor::Long);
            assert_ne!(short, long);
            assert!(short.as_str().len() < long.as_str().len());
        }
    }

    #[test]
    fn different_salts_produce_different_codes() {
        let a = CodeCodec::new(CodecSettings::builder().salt("alpha").build());
        let b = CodeCodec::new(CodecSettings::builder().salt("beta").build());
        assert_ne!(a.encode(7, Flavor::Short), b.encode(7, Flavor::Short));
        assert_ne!(a.encode(7, Flavor::Long), b.encode(7, Flavor::Long));
    }

    #[test]
    fn raised_minimum_pads_long_codes() {
        let codec = CodeCodec::new(CodecSettings::builder().min_long_length(20).build());
        let code = codec.encode(7, Flavor::Long);
        assert!(code.as_str().len() >= 20);
        // Padding is deterministic too.
        assert_eq!(code, codec.encode(7, Flavor::Long));
    }

    #[test]
    fn default_settings() {
        let settings = CodecSettings::default();
        assert_eq!(settings.salt, "salt");
        assert_eq!(settings.min_long_length, 12);
    }
}
