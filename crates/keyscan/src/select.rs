//! Best-key selection: custody tiers, then algorithm family and strength.

use derive_more::Display;
use tracing::debug;

use crate::types::{Card, Key, Presence};

/// Marker substring identifying TPM custody in a key's `card_no` field,
/// matched case-insensitively.
const TPM_MARKER: &str = "tpm";

/// Recognized algorithm families, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
enum Family {
    #[display("EdDSA")]
    Ed,
    #[display("NIST P-curve")]
    NistP,
    #[display("RSA")]
    Rsa,
}

impl Family {
    /// Split an algorithm name into family and numeric strength suffix.
    /// Algorithms outside the three recognized families are not candidates.
    fn classify(algorithm: &str) -> Option<(Self, u32)> {
        let family = if algorithm.starts_with("ed") {
            Self::Ed
        } else if algorithm.starts_with("nistp") {
            Self::NistP
        } else if algorithm.starts_with("rsa") {
            Self::Rsa
        } else {
            return None;
        };

        let suffix = algorithm.trim_start_matches(|c: char| !c.is_ascii_digit());
        Some((family, suffix.parse().unwrap_or(0)))
    }
}

/// Outcome of a ranking pass.
///
/// "No eligible key" is a normal, representable result: callers branch on
/// [`Ranking::best`] rather than handling an error.
#[derive(Debug, Clone, Copy)]
pub struct Ranking<'a> {
    /// The selected key, if any candidate was eligible
    pub best: Option<&'a Key>,
    /// Number of candidates excluded for an unrecognized algorithm family
    pub excluded: usize,
}

/// Rank `candidates` by algorithm family and strength.
///
/// EdDSA beats NIST P-curve beats RSA, and only the best non-empty family
/// is considered. Within the NIST and RSA families the highest numeric
/// suffix wins; remaining ties keep the first candidate in input order.
/// Keys outside the three families are never selected, and their count is
/// reported instead of being silently dropped.
pub fn best_key<'a>(candidates: impl IntoIterator<Item = &'a Key>) -> Ranking<'a> {
    let mut excluded = 0;
    let mut best: Option<(Family, u32, &'a Key)> = None;

    for key in candidates {
        let Some((family, strength)) = Family::classify(&key.algorithm) else {
            excluded += 1;
            continue;
        };

        let better = match &best {
            None => true,
            Some((best_family, best_strength, _)) => {
                family < *best_family
                    // EdDSA candidates are interchangeable for ranking;
                    // the earliest stays.
                    || (family == *best_family
                        && family != Family::Ed
                        && strength > *best_strength)
            }
        };
        if better {
            best = Some((family, strength, key));
        }
    }

    if excluded > 0 {
        debug!("{excluded} candidate(s) excluded: unrecognized algorithm family");
    }
    if let Some((family, _, key)) = &best {
        debug!("selected {} key {}", family, key.fingerprint());
    }

    Ranking {
        best: best.map(|(_, _, key)| key),
        excluded,
    }
}

/// Select the most trusted signing key.
///
/// Custody tiers, best first: keys filling one of the card's slots, then
/// TPM-backed keys, then locally present material. The first tier with any
/// candidate determines the result; only within that tier does the family
/// ranking of [`best_key`] apply.
pub fn best_signing_key<'a>(signing: &'a [Key], card: Option<&Card>) -> Ranking<'a> {
    if let Some(card) = card {
        let slots = card.slot_fingerprints();
        let on_card: Vec<&Key> = signing
            .iter()
            .filter(|key| slots.iter().any(|slot| slot == key.fingerprint()))
            .collect();
        if !on_card.is_empty() {
            return best_key(on_card);
        }
    }

    let tpm_backed: Vec<&Key> = signing
        .iter()
        .filter(|key| key.card_no.to_ascii_lowercase().contains(TPM_MARKER))
        .collect();
    if !tpm_backed.is_empty() {
        return best_key(tpm_backed);
    }

    let local: Vec<&Key> = signing
        .iter()
        .filter(|key| key.presence == Presence::Local)
        .collect();
    best_key(local)
}
