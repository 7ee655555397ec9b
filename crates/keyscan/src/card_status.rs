//! Card-status pipeline: `gpg --card-status` text to a typed card record.

use tracing::debug;

use crate::grammar::{CARD_HEADER, CARD_KEYS, GrammarTable};
use crate::types::{Card, Key};
use crate::{Error, Result, parser};

/// Marker opening the key region of card-status output.
const PRIMARY_KEY_MARKER: &str = "sec";

/// Parse `gpg --card-status` output into a card record.
///
/// The text splits into two regions at the first line starting with the
/// primary-key marker: the scalar header above it, the key blocks from it
/// onward. Slot fingerprints in the header are extracted literally,
/// embedded spaces included; the selection policy normalizes them before
/// any comparison. A key region yielding zero records fails with
/// [`Error::GrammarMismatch`]: a card with no primary key is not a
/// representable state.
pub fn parse_card_status(text: &str) -> Result<Card> {
    let table = GrammarTable::builtin();
    let (header_text, keys_text) = split_regions(text);

    let header = parser::parse(table.get(CARD_HEADER)?, header_text)?
        .into_iter()
        .next()
        .unwrap_or_default();

    let mut keys = parser::parse(table.get(CARD_KEYS)?, keys_text)?
        .iter()
        .map(Key::try_from)
        .collect::<Result<Vec<_>>>()?
        .into_iter();

    let Some(primary_key) = keys.next() else {
        return Err(Error::GrammarMismatch { grammar: CARD_KEYS });
    };
    let subkeys: Vec<Key> = keys.collect();

    debug!(
        "card {} holds {} subkey(s)",
        header.get("application_id").map_or("?", String::as_str),
        subkeys.len()
    );
    Ok(Card::from_parts(&header, primary_key, subkeys))
}

/// Split the text at the first primary-key marker at start of line.
fn split_regions(text: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.starts_with(PRIMARY_KEY_MARKER) {
            return (&text[..offset], &text[offset..]);
        }
        offset += line.len();
    }
    (text, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Presence;

    const CARD_STATUS: &str = "\
Reader ...........: Yubico YubiKey OTP FIDO CCID 00 00
Application ID ...: D2760001240103040006123456780000
Application type .: OpenPGP
Version ..........: 3.4
Manufacturer .....: Yubico
Serial number ....: 12345678
Name of cardholder: Test Holder
Language prefs ...: en
Salutation .......:
URL of public key : [not set]
Login data .......: [not set]
Signature PIN ....: not forced
Key attributes ...: ed25519 cv25519 nistp384
Max. PIN lengths .: 127 127 127
PIN retry counter : 3 0 3
Signature counter : 4
KDF setting ......: off
UIF setting ......: Sign=off Decrypt=off Auth=fixed
Signature key ....: 603A 72CD 92F8 4EAA 3512  7FB2 D172 4E53 7A08 44E2
      created ....: 2025-09-22 12:00:11
Encryption key....: 31F5 A729 9414 BD57 611F  2A2A 2873 7947 AD89 864B
      created ....: 2025-09-22 12:00:12
Authentication key: 2C7B 06B7 C632 DC19 5ADE  1394 9495 3614 8C87 FE64
      created ....: 2025-09-22 12:00:13
General key info..: [none]
sec>  ed25519 2025-09-22 [SC] [expires: 2030-09-21]
      603A72CD92F84EAA35127FB2D1724E537A0844E2
      Keygrip = 5643B43609004D57AF91CCF1FE78E14E166F52DC
      card-no: 0006 12345678
ssb>  nistp384 2025-09-22 [SA]
      2C7B06B7C632DC195ADE1394949536148C87FE64
      Keygrip = 4C3DC92CA8B036CA6CB39837BBBF6124166D5A83
      card-no: 0006 12345678
";

    #[test]
    fn test_header_fields_are_extracted() {
        let card = parse_card_status(CARD_STATUS).unwrap();

        assert_eq!(card.reader, "Yubico YubiKey OTP FIDO CCID 00 00");
        assert_eq!(card.application_id, "D2760001240103040006123456780000");
        assert_eq!(card.serial_number, "12345678");
        assert_eq!(card.cardholder_name, "Test Holder");
        assert_eq!(card.salutation, "");
        assert_eq!(card.public_key_url, "[not set]");
        assert_eq!(card.kdf_setting, "off");
        assert_eq!(card.uif_sign, "off");
        assert_eq!(card.uif_decrypt, "off");
        assert_eq!(card.uif_auth, "fixed");
    }

    #[test]
    fn test_slot_fingerprints_keep_embedded_spaces() {
        let card = parse_card_status(CARD_STATUS).unwrap();

        assert_eq!(
            card.card_signature_key,
            "603A 72CD 92F8 4EAA 3512  7FB2 D172 4E53 7A08 44E2"
        );
        assert_eq!(card.card_signature_key_creation, "2025-09-22 12:00:11");
        assert_eq!(card.card_encryption_key_creation, "2025-09-22 12:00:12");
        assert_eq!(card.card_authentication_key_creation, "2025-09-22 12:00:13");
    }

    #[test]
    fn test_key_region_yields_primary_and_subkeys() {
        let card = parse_card_status(CARD_STATUS).unwrap();

        assert_eq!(card.primary_key.algorithm, "ed25519");
        assert_eq!(card.primary_key.presence, Presence::Card);
        assert_eq!(card.primary_key.card_no, "0006 12345678");
        assert_eq!(card.subkeys.len(), 1);
        assert_eq!(
            card.subkeys[0].subkey,
            "2C7B06B7C632DC195ADE1394949536148C87FE64"
        );
        assert_eq!(
            card.subkeys[0].primary_key,
            "603A72CD92F84EAA35127FB2D1724E537A0844E2"
        );
    }

    #[test]
    fn test_missing_key_region_is_a_grammar_mismatch() {
        let header_only: String = CARD_STATUS
            .lines()
            .take_while(|line| !line.starts_with(PRIMARY_KEY_MARKER))
            .map(|line| format!("{line}\n"))
            .collect();

        let result = parse_card_status(&header_only);
        assert!(matches!(
            result,
            Err(Error::GrammarMismatch { grammar: CARD_KEYS })
        ));
    }

    #[test]
    fn test_garbage_input_is_a_grammar_mismatch() {
        let result = parse_card_status("gpg: OpenPGP card not available\n");
        assert!(matches!(result, Err(Error::GrammarMismatch { .. })));
    }
}
