use std::fmt;

use crate::parser::FieldMap;

use super::Key;

/// Smart-card metadata plus the keys resident on or referenced by the card.
///
/// Scalar fields hold the header text verbatim; in particular the three slot
/// fingerprints keep the embedded spaces gpg prints. Normalization for
/// cross-referencing happens in [`Card::slot_fingerprints`], invoked by the
/// selection policy, never by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Card {
    pub reader: String,
    pub application_id: String,
    pub application_type: String,
    pub version: String,
    pub manufacturer: String,
    pub serial_number: String,
    pub cardholder_name: String,
    pub language_prefs: String,
    pub salutation: String,
    pub public_key_url: String,
    pub login_data: String,
    pub signature_pin: String,
    pub key_attributes: String,
    pub max_pin_lengths: String,
    pub pin_retry_counter: String,
    pub signature_counter: String,
    pub kdf_setting: String,
    pub uif_sign: String,
    pub uif_decrypt: String,
    pub uif_auth: String,
    /// Fingerprint in the signature slot, verbatim
    pub card_signature_key: String,
    /// Fingerprint in the encryption slot, verbatim
    pub card_encryption_key: String,
    /// Fingerprint in the authentication slot, verbatim
    pub card_authentication_key: String,
    pub card_signature_key_creation: String,
    pub card_encryption_key_creation: String,
    pub card_authentication_key_creation: String,
    /// The card's resident primary key
    pub primary_key: Key,
    /// Subkeys resident on or referenced by the card, in block order
    pub subkeys: Vec<Key>,
}

impl Card {
    pub(crate) fn from_parts(header: &FieldMap, primary_key: Key, subkeys: Vec<Key>) -> Self {
        let field = |name: &str| header.get(name).cloned().unwrap_or_default();

        Self {
            reader: field("reader"),
            application_id: field("application_id"),
            application_type: field("application_type"),
            version: field("version"),
            manufacturer: field("manufacturer"),
            serial_number: field("serial_number"),
            cardholder_name: field("cardholder_name"),
            language_prefs: field("language_prefs"),
            salutation: field("salutation"),
            public_key_url: field("public_key_url"),
            login_data: field("login_data"),
            signature_pin: field("signature_pin"),
            key_attributes: field("key_attributes"),
            max_pin_lengths: field("max_pin_lengths"),
            pin_retry_counter: field("pin_retry_counter"),
            signature_counter: field("signature_counter"),
            kdf_setting: field("kdf_setting"),
            uif_sign: field("uif_sign"),
            uif_decrypt: field("uif_decrypt"),
            uif_auth: field("uif_auth"),
            card_signature_key: field("card_signature_key"),
            card_encryption_key: field("card_encryption_key"),
            card_authentication_key: field("card_authentication_key"),
            card_signature_key_creation: field("card_signature_key_creation"),
            card_encryption_key_creation: field("card_encryption_key_creation"),
            card_authentication_key_creation: field("card_authentication_key_creation"),
            primary_key,
            subkeys,
        }
    }

    /// The slot fingerprints with embedded whitespace removed.
    ///
    /// Empty and unset slots (gpg prints `[none]`) are skipped. A single
    /// physical key may fill more than one slot, so the result can repeat.
    pub fn slot_fingerprints(&self) -> Vec<String> {
        [
            &self.card_signature_key,
            &self.card_encryption_key,
            &self.card_authentication_key,
        ]
        .into_iter()
        .map(|slot| slot.split_whitespace().collect::<String>())
        .filter(|slot| !slot.is_empty() && slot.chars().all(|c| c.is_ascii_hexdigit()))
        .collect()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Card:")?;
        writeln!(f, "  Reader: {}", self.reader)?;
        writeln!(f, "  Application ID: {}", self.application_id)?;
        writeln!(f, "  Application type: {}", self.application_type)?;
        writeln!(f, "  Version: {}", self.version)?;
        writeln!(f, "  Manufacturer: {}", self.manufacturer)?;
        writeln!(f, "  Serial number: {}", self.serial_number)?;
        writeln!(f, "  Cardholder: {}", self.cardholder_name)?;
        writeln!(f, "  Signature counter: {}", self.signature_counter)?;
        writeln!(f, "  PIN retry counter: {}", self.pin_retry_counter)?;
        writeln!(f, "  Signature key: {}", self.card_signature_key)?;
        writeln!(f, "  Encryption key: {}", self.card_encryption_key)?;
        writeln!(f, "  Authentication key: {}", self.card_authentication_key)?;

        writeln!(f, "Primary key:")?;
        for line in self.primary_key.to_string().lines().skip(1) {
            writeln!(f, "{line}")?;
        }

        write!(f, "Subkeys on card: {}", self.subkeys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_header_fields_default_to_empty() {
        let header: FieldMap = [("application_id", "D2760001240103040006123456780000")]
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let card = Card::from_parts(&header, Key::default(), Vec::new());
        assert_eq!(card.application_id, "D2760001240103040006123456780000");
        assert_eq!(card.reader, "");
        assert!(card.subkeys.is_empty());
    }

    #[test]
    fn test_slot_fingerprints_strip_embedded_spaces() {
        let card = Card {
            card_signature_key: "603A 72CD 92F8 4EAA 3512  7FB2 D172 4E53 7A08 44E2".to_string(),
            card_encryption_key: "[none]".to_string(),
            card_authentication_key: String::new(),
            ..Default::default()
        };

        assert_eq!(
            card.slot_fingerprints(),
            ["603A72CD92F84EAA35127FB2D1724E537A0844E2"]
        );
    }
}
