//! Generic attribute filter over key records.

use crate::types::Key;
use crate::{Error, Result};

/// Typed getter for one filterable key field.
type FieldAccessor = fn(&Key) -> &str;

/// Dispatch table from field name to getter. Keeps the "unknown field"
/// failure mode without any runtime reflection.
fn accessor(name: &str) -> Option<FieldAccessor> {
    Some(match name {
        "algorithm" => |key: &Key| key.algorithm.as_str(),
        "capability" => |key: &Key| key.capability.as_str(),
        "card_no" => |key: &Key| key.card_no.as_str(),
        "creation" => |key: &Key| key.creation.as_str(),
        "expiration" => |key: &Key| key.expiration.as_str(),
        "keygrip" => |key: &Key| key.keygrip.as_str(),
        "presence" => |key: &Key| key.presence.marker(),
        "primary_key" => |key: &Key| key.primary_key.as_str(),
        "subkey" => |key: &Key| key.subkey.as_str(),
        _ => return None,
    })
}

/// Return the ordered subsequence of `keys` whose `attribute` matches
/// `value`.
///
/// The default rule is exact match on the field text. The `capability`
/// field instead upper-cases `value` and treats it as a set of letters:
/// a key matches when every requested letter is present, in any order,
/// additional letters allowed. A single subkey commonly carries several
/// capabilities, and callers ask "does this key sign", not "is the
/// capability exactly `S`".
pub fn filter_by<'a>(keys: &'a [Key], attribute: &str, value: &str) -> Result<Vec<&'a Key>> {
    let accessor = accessor(attribute).ok_or_else(|| Error::UnknownAttribute {
        attribute: attribute.to_string(),
    })?;

    if attribute == "capability" {
        return Ok(keys
            .iter()
            .filter(|key| key.has_capabilities(value))
            .collect());
    }

    Ok(keys.iter().filter(|key| accessor(key) == value).collect())
}
