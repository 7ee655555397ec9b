//! Key-listing pipeline: raw `gpg -K` text to typed key records.

use tracing::debug;

use crate::grammar::{GrammarTable, KEY_LISTING};
use crate::types::Key;
use crate::{Result, filter, parser};

/// Parse the output of `gpg -K --with-keygrip --with-subkey-fingerprint`
/// into key records, in listing order.
pub fn parse_listing(text: &str) -> Result<Vec<Key>> {
    let grammar = GrammarTable::builtin().get(KEY_LISTING)?;
    let records = parser::parse(grammar, text)?;
    let keys = records
        .iter()
        .map(Key::try_from)
        .collect::<Result<Vec<_>>>()?;

    debug!("listing contains {} key(s)", keys.len());
    Ok(keys)
}

/// The signing-capable subset of `keys`, in input order.
pub fn signing_keys(keys: &[Key]) -> Result<Vec<&Key>> {
    filter::filter_by(keys, "capability", "S")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::types::Presence;

    // Sample generated with `gpg -K --with-keygrip --with-subkey-fingerprint`.
    const LISTING: &str = "
sec   ed25519 2025-09-22 [SC] [expires: 2030-09-21]
      603A72CD92F84EAA35127FB2D1724E537A0844E2
      Keygrip = 5643B43609004D57AF91CCF1FE78E14E166F52DC
uid           [ultimate] Test (Key generated purely for testing purposes) <test@example>
ssb   cv25519 2025-09-22 [E] [expires: 2030-09-21]
      31F5A7299414BD57611F2A2A28737947AD89864B
      Keygrip = 772EDDBB1AB8A97872AFF4C4F092BD5239692EF7
ssb   rsa2048 2025-09-22 [SEA] [expires: 2026-09-22]
      02FA8E12ECFFFA384131F777C39F59AAF4EF1469
      Keygrip = 57A109CD953DEF332E83ECAFD45CA3F3BF355714
ssb   nistp384 2025-09-22 [SA]
      2C7B06B7C632DC195ADE1394949536148C87FE64
      Keygrip = 4C3DC92CA8B036CA6CB39837BBBF6124166D5A83
";

    fn expected_keys() -> [Key; 4] {
        let primary = "603A72CD92F84EAA35127FB2D1724E537A0844E2".to_string();
        [
            Key {
                algorithm: "ed25519".to_string(),
                capability: "SC".to_string(),
                card_no: String::new(),
                creation: "2025-09-22".to_string(),
                expiration: "2030-09-21".to_string(),
                keygrip: "5643B43609004D57AF91CCF1FE78E14E166F52DC".to_string(),
                presence: Presence::Local,
                primary_key: primary.clone(),
                subkey: String::new(),
            },
            Key {
                algorithm: "cv25519".to_string(),
                capability: "E".to_string(),
                card_no: String::new(),
                creation: "2025-09-22".to_string(),
                expiration: "2030-09-21".to_string(),
                keygrip: "772EDDBB1AB8A97872AFF4C4F092BD5239692EF7".to_string(),
                presence: Presence::Local,
                primary_key: primary.clone(),
                subkey: "31F5A7299414BD57611F2A2A28737947AD89864B".to_string(),
            },
            Key {
                algorithm: "rsa2048".to_string(),
                capability: "SEA".to_string(),
                card_no: String::new(),
                creation: "2025-09-22".to_string(),
                expiration: "2026-09-22".to_string(),
                keygrip: "57A109CD953DEF332E83ECAFD45CA3F3BF355714".to_string(),
                presence: Presence::Local,
                primary_key: primary.clone(),
                subkey: "02FA8E12ECFFFA384131F777C39F59AAF4EF1469".to_string(),
            },
            Key {
                algorithm: "nistp384".to_string(),
                capability: "SA".to_string(),
                card_no: String::new(),
                creation: "2025-09-22".to_string(),
                expiration: String::new(),
                keygrip: "4C3DC92CA8B036CA6CB39837BBBF6124166D5A83".to_string(),
                presence: Presence::Local,
                primary_key: primary,
                subkey: "2C7B06B7C632DC195ADE1394949536148C87FE64".to_string(),
            },
        ]
    }

    #[test]
    fn test_listing_round_trip() {
        let keys = parse_listing(LISTING).unwrap();
        assert_eq!(keys, expected_keys());
    }

    #[test]
    fn test_signing_keys_subset() {
        let keys = parse_listing(LISTING).unwrap();
        let signing = signing_keys(&keys).unwrap();
        let algorithms: Vec<_> = signing.iter().map(|key| key.algorithm.as_str()).collect();
        assert_eq!(algorithms, ["ed25519", "rsa2048", "nistp384"]);
    }

    #[test]
    fn test_card_resident_key_carries_serial() {
        let text = "
sec>  ed25519 2025-09-22 [SC]
      603A72CD92F84EAA35127FB2D1724E537A0844E2
      Keygrip = 5643B43609004D57AF91CCF1FE78E14E166F52DC
      Card serial no. = 0006 12345678
";
        let keys = parse_listing(text).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].presence, Presence::Card);
        assert_eq!(keys[0].card_no, "0006 12345678");
    }

    #[test]
    fn test_drifted_output_is_a_grammar_mismatch() {
        let result = parse_listing("gpg (GnuPG) 2.4.4\nno secret keys here\n");
        assert!(matches!(result, Err(Error::GrammarMismatch { .. })));
    }
}
