// Effect token mapping - persisted string tokens for the effect enums
//
// Each enum has a single ordered table of (value, token, is_default)
// entries that serves both the encode and the decode direction, so the
// two directions cannot drift apart.

use super::config::{AntialiasEffect, ScalingEffect};

/// One row of a token table.
struct TokenEntry<E: Copy> {
    value: E,
    token: &'static str,
    is_default: bool,
}

const SCALING_TOKENS: &[TokenEntry<ScalingEffect>] = &[
    TokenEntry {
        value: ScalingEffect::Bilinear,
        token: "",
        is_default: true,
    },
    TokenEntry {
        value: ScalingEffect::Cas,
        token: "cas",
        is_default: false,
    },
    TokenEntry {
        value: ScalingEffect::Fsr,
        token: "fsr",
        is_default: false,
    },
];

const ANTIALIAS_TOKENS: &[TokenEntry<AntialiasEffect>] = &[
    TokenEntry {
        value: AntialiasEffect::None,
        token: "",
        is_default: true,
    },
    TokenEntry {
        value: AntialiasEffect::Fxaa,
        token: "fxaa",
        is_default: false,
    },
    TokenEntry {
        value: AntialiasEffect::FxaaExtreme,
        token: "fxaa_extreme",
        is_default: false,
    },
];

/// Decode a persisted token. Unrecognized or malformed tokens yield the
/// table's default value; decoding never fails.
fn decode<E: Copy + PartialEq>(table: &[TokenEntry<E>], token: &str) -> E {
    table
        .iter()
        .find(|entry| !entry.is_default && entry.token == token)
        .or_else(|| table.iter().find(|entry| entry.is_default))
        .map(|entry| entry.value)
        .expect("token table has a default entry")
}

/// Encode a value to its persisted token. The default value encodes to
/// the empty token so the store need not carry a value for it.
fn encode<E: Copy + PartialEq>(table: &[TokenEntry<E>], value: E) -> &'static str {
    table
        .iter()
        .find(|entry| entry.value == value)
        .map(|entry| if entry.is_default { "" } else { entry.token })
        .expect("token table covers every enum value")
}

impl ScalingEffect {
    /// Parse a persisted token, defaulting to [`ScalingEffect::Bilinear`].
    pub fn from_token(token: &str) -> Self {
        decode(SCALING_TOKENS, token)
    }

    /// The token persisted for this value.
    pub fn token(self) -> &'static str {
        encode(SCALING_TOKENS, self)
    }
}

impl AntialiasEffect {
    /// Parse a persisted token, defaulting to [`AntialiasEffect::None`].
    pub fn from_token(token: &str) -> Self {
        decode(ANTIALIAS_TOKENS, token)
    }

    /// The token persisted for this value.
    pub fn token(self) -> &'static str {
        encode(ANTIALIAS_TOKENS, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_round_trip() {
        for effect in [
            ScalingEffect::Bilinear,
            ScalingEffect::Cas,
            ScalingEffect::Fsr,
        ] {
            assert_eq!(ScalingEffect::from_token(effect.token()), effect);
        }
    }

    #[test]
    fn test_antialias_round_trip() {
        for effect in [
            AntialiasEffect::None,
            AntialiasEffect::Fxaa,
            AntialiasEffect::FxaaExtreme,
        ] {
            assert_eq!(AntialiasEffect::from_token(effect.token()), effect);
        }
    }

    #[test]
    fn test_default_encodes_empty() {
        assert_eq!(ScalingEffect::Bilinear.token(), "");
        assert_eq!(AntialiasEffect::None.token(), "");
    }

    #[test]
    fn test_unrecognized_tokens_decode_to_default() {
        for token in ["", "bilinear", "none", "CAS", "fsr2", "garbage", " fsr"] {
            assert_eq!(ScalingEffect::from_token(token), ScalingEffect::Bilinear);
        }
        for token in ["", "FXAA", "fxaa-extreme", "smaa", "what"] {
            assert_eq!(AntialiasEffect::from_token(token), AntialiasEffect::None);
        }
    }

    #[test]
    fn test_known_tokens_decode() {
        assert_eq!(ScalingEffect::from_token("cas"), ScalingEffect::Cas);
        assert_eq!(ScalingEffect::from_token("fsr"), ScalingEffect::Fsr);
        assert_eq!(AntialiasEffect::from_token("fxaa"), AntialiasEffect::Fxaa);
        assert_eq!(
            AntialiasEffect::from_token("fxaa_extreme"),
            AntialiasEffect::FxaaExtreme
        );
    }
}
