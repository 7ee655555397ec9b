//! Structured inventory of GnuPG key material.
//!
//! Parses the free-text output of gpg's listing commands into typed key and
//! card records, and selects the best signing key by a deterministic
//! custody-then-strength policy: smart-card slots beat TPM-backed keys beat
//! locally present material, and within a tier EdDSA beats NIST P-curves
//! beats RSA, stronger parameters first.
//!
//! The crate is purely synchronous and does no I/O: callers run the gpg
//! binary with the argument lists from [`invocation`] and hand the captured
//! standard output to [`parse_listing`] or [`parse_card_status`].

mod card_status;
mod error;
mod filter;
mod grammar;
pub mod invocation;
mod listing;
mod parser;
mod select;
mod types;

pub use card_status::parse_card_status;
pub use error::{Error, Result};
pub use filter::filter_by;
pub use grammar::{CARD_HEADER, CARD_KEYS, Grammar, GrammarTable, KEY_LISTING};
pub use listing::{parse_listing, signing_keys};
pub use parser::{FieldMap, parse};
pub use select::{Ranking, best_key, best_signing_key};
pub use types::{Card, Key, Presence};
