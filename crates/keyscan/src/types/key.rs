use std::fmt;

use derive_more::Display;

use crate::parser::FieldMap;

/// Where a key's private material resides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
pub enum Presence {
    /// Material present in the local key store
    #[default]
    #[display("local")]
    Local,
    /// Stub only; the secret material is absent
    #[display("stub")]
    Stub,
    /// Material stored on an external card or device
    #[display("card")]
    Card,
}

impl Presence {
    /// The single-character marker gpg appends to `sec`/`ssb` tokens
    /// (a space for locally present material).
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Local => " ",
            Self::Stub => "#",
            Self::Card => ">",
        }
    }

    fn from_marker(marker: &str) -> Self {
        match marker {
            "#" => Self::Stub,
            ">" => Self::Card,
            _ => Self::Local,
        }
    }
}

/// One secret key or subkey extracted from a gpg listing.
///
/// Immutable value record; built once per parse and never updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Key {
    /// Algorithm name: alphabetic family prefix plus optional numeric
    /// strength suffix (`ed25519`, `nistp384`, `rsa2048`)
    pub algorithm: String,
    /// Capability letters over `{S,E,A,C}`, each present at most once
    pub capability: String,
    /// Device identifier when the key is card or TPM resident; empty otherwise
    pub card_no: String,
    /// Creation date, `YYYY-MM-DD`
    pub creation: String,
    /// Expiration date, `YYYY-MM-DD`; empty means no expiration
    pub expiration: String,
    /// Private-material storage identifier, unique per key
    pub keygrip: String,
    /// Where the private material resides
    pub presence: Presence,
    /// Fingerprint of the owning primary key
    pub primary_key: String,
    /// Fingerprint of this key when it is a subkey; empty for the primary
    /// key's own record
    pub subkey: String,
}

impl Key {
    /// Fingerprint identifying this record: the subkey fingerprint, or the
    /// primary fingerprint for the primary key's own record.
    pub fn fingerprint(&self) -> &str {
        if self.subkey.is_empty() {
            &self.primary_key
        } else {
            &self.subkey
        }
    }

    /// Whether the key carries every capability letter of `letters`,
    /// regardless of order or additional letters.
    pub fn has_capabilities(&self, letters: &str) -> bool {
        letters
            .chars()
            .all(|letter| self.capability.contains(letter.to_ascii_uppercase()))
    }

    fn required(fields: &FieldMap, field: &'static str) -> crate::Result<String> {
        fields
            .get(field)
            .cloned()
            .ok_or(crate::Error::MalformedRecord { field })
    }

    fn optional(fields: &FieldMap, field: &str) -> String {
        fields.get(field).cloned().unwrap_or_default()
    }
}

impl TryFrom<&FieldMap> for Key {
    type Error = crate::Error;

    fn try_from(fields: &FieldMap) -> Result<Self, Self::Error> {
        Ok(Self {
            algorithm: Self::required(fields, "algorithm")?,
            capability: Self::optional(fields, "capability"),
            card_no: Self::optional(fields, "card_no"),
            creation: Self::optional(fields, "creation"),
            expiration: Self::optional(fields, "expiration"),
            keygrip: Self::required(fields, "keygrip")?,
            presence: Presence::from_marker(&Self::optional(fields, "presence")),
            primary_key: Self::required(fields, "primary_key")?,
            subkey: Self::optional(fields, "subkey"),
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Key:")?;
        writeln!(f, "  Fingerprint: {}", self.fingerprint())?;
        writeln!(f, "  Algorithm: {}", self.algorithm)?;
        writeln!(f, "  Capability: {}", self.capability)?;
        writeln!(f, "  Created: {}", self.creation)?;

        if self.expiration.is_empty() {
            writeln!(f, "  Expires: never")?;
        } else {
            writeln!(f, "  Expires: {}", self.expiration)?;
        }

        writeln!(f, "  Presence: {}", self.presence)?;

        if !self.card_no.is_empty() {
            writeln!(f, "  Card no: {}", self.card_no)?;
        }

        write!(f, "  Keygrip: {}", self.keygrip)
    }
}
