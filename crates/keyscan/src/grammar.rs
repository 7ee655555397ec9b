//! Line-pattern grammars for the gpg output shapes keyscan understands.
//!
//! A grammar is an ordered list of line rules. Each rule names the parser
//! states it applies in, a pattern whose named capture groups are the record
//! fields it extracts, the action it triggers on the record under
//! construction, and an optional state transition. The built-in table is
//! compiled once per process and is read-only afterwards, so it can be shared
//! freely across parses.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// Grammar for `gpg -K --with-keygrip --with-subkey-fingerprint` output.
pub const KEY_LISTING: &str = "key-listing";
/// Grammar for the scalar header region of `gpg --card-status` output.
pub const CARD_HEADER: &str = "card-status-header";
/// Grammar for the key region of `gpg --card-status` output.
pub const CARD_KEYS: &str = "card-status-keys";

/// Wildcard entry matching any parser state.
const ANY_STATE: &str = "*";

/// What a matched rule does with the record under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Emit the current record if complete, then start a new one from this
    /// line's captures.
    Start,
    /// Merge this line's captures into the current record.
    Fill,
}

/// A line-match rule in source form.
struct RuleDef {
    /// Parser states in which the rule applies.
    states: &'static [&'static str],
    /// Pattern over one line; named capture groups are the field names.
    pattern: &'static str,
    action: Action,
    /// State entered after the rule matches.
    next: Option<&'static str>,
}

/// A compiled line-match rule.
pub(crate) struct Rule {
    states: &'static [&'static str],
    regex: Regex,
    pub(crate) action: Action,
    pub(crate) next: Option<&'static str>,
}

impl Rule {
    pub(crate) fn applies_in(&self, state: &str) -> bool {
        self.states
            .iter()
            .any(|entry| *entry == ANY_STATE || *entry == state)
    }

    pub(crate) const fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// A grammar definition in source form.
struct GrammarDef {
    name: &'static str,
    initial: &'static str,
    required: &'static [&'static [&'static str]],
    filldown: &'static [&'static str],
    rules: &'static [RuleDef],
}

/// A compiled, immutable line grammar.
pub struct Grammar {
    name: &'static str,
    initial: &'static str,
    /// Completeness requirement: each inner group must have at least one
    /// field captured by the record itself.
    required: &'static [&'static [&'static str]],
    /// Fields whose last captured value carries into subsequent records.
    filldown: &'static [&'static str],
    rules: Vec<Rule>,
}

impl Grammar {
    fn compile(def: &GrammarDef) -> Self {
        let rules = def
            .rules
            .iter()
            .map(|rule| Rule {
                states: rule.states,
                regex: Regex::new(rule.pattern).expect("invalid grammar pattern"),
                action: rule.action,
                next: rule.next,
            })
            .collect();

        Self {
            name: def.name,
            initial: def.initial,
            required: def.required,
            filldown: def.filldown,
            rules,
        }
    }

    /// Name the grammar is registered under.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) const fn initial(&self) -> &'static str {
        self.initial
    }

    pub(crate) const fn required(&self) -> &'static [&'static [&'static str]] {
        self.required
    }

    pub(crate) const fn filldown(&self) -> &'static [&'static str] {
        self.filldown
    }

    pub(crate) fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// The process-wide set of named grammars.
pub struct GrammarTable {
    grammars: BTreeMap<&'static str, Grammar>,
}

impl GrammarTable {
    /// The built-in grammar table, compiled once on first access.
    ///
    /// A malformed built-in pattern panics here; that is a deployment
    /// failure, not a runtime-data failure.
    pub fn builtin() -> &'static Self {
        static TABLE: LazyLock<GrammarTable> = LazyLock::new(|| GrammarTable::compile(GRAMMARS));
        &TABLE
    }

    fn compile(defs: &'static [GrammarDef]) -> Self {
        let grammars = defs
            .iter()
            .map(|def| (def.name, Grammar::compile(def)))
            .collect();
        Self { grammars }
    }

    /// Look up a grammar by name.
    pub fn get(&self, name: &str) -> Result<&Grammar> {
        self.grammars.get(name).ok_or_else(|| Error::UnknownGrammar {
            name: name.to_string(),
        })
    }
}

// Key listing lines. A record opens on a `sec`/`ssb` line, which may carry a
// presence marker directly after the leading token (`sec#`, `ssb>`). The
// bare fingerprint line that follows belongs to the primary key or the
// subkey depending on which token opened the record, hence the two states.
const SEC_LINE: &str = r"^sec(?P<presence>[#>])?\s+(?P<algorithm>[A-Za-z0-9]+)\s+(?P<creation>\d{4}-\d{2}-\d{2})\s+\[(?P<capability>[CSEA]+)\](?:\s+\[expires:\s+(?P<expiration>\d{4}-\d{2}-\d{2})\])?";
const SSB_LINE: &str = r"^ssb(?P<presence>[#>])?\s+(?P<algorithm>[A-Za-z0-9]+)\s+(?P<creation>\d{4}-\d{2}-\d{2})\s+\[(?P<capability>[CSEA]+)\](?:\s+\[expires:\s+(?P<expiration>\d{4}-\d{2}-\d{2})\])?";
const PRIMARY_FPR_LINE: &str = r"^\s*(?P<primary_key>[0-9A-F]{40})\s*$";
const SUBKEY_FPR_LINE: &str = r"^\s*(?P<subkey>[0-9A-F]{40})\s*$";
const KEYGRIP_LINE: &str = r"^\s*Keygrip\s*=\s*(?P<keygrip>[0-9A-F]{40})\s*$";
const CARD_SERIAL_LINE: &str = r"^\s*Card serial no\.\s*=\s*(?P<card_no>\S.*?)\s*$";
const CARD_NO_LINE: &str = r"^\s*card-no:\s*(?P<card_no>\S.*?)\s*$";

static GRAMMARS: &[GrammarDef] = &[
    GrammarDef {
        name: KEY_LISTING,
        initial: "keys",
        // A key record is complete once its keygrip and its own fingerprint
        // (primary or subkey, per the opening token) have been captured.
        required: &[&["keygrip"], &["primary_key", "subkey"]],
        // Subkey records inherit the primary fingerprint from the `sec`
        // record that precedes them.
        filldown: &["primary_key"],
        rules: &[
            RuleDef {
                states: &[ANY_STATE],
                pattern: SEC_LINE,
                action: Action::Start,
                next: Some("primary"),
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: SSB_LINE,
                action: Action::Start,
                next: Some("subkey"),
            },
            RuleDef {
                states: &["primary"],
                pattern: PRIMARY_FPR_LINE,
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &["subkey"],
                pattern: SUBKEY_FPR_LINE,
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: KEYGRIP_LINE,
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: CARD_SERIAL_LINE,
                action: Action::Fill,
                next: None,
            },
        ],
    },
    GrammarDef {
        name: CARD_HEADER,
        initial: "header",
        required: &[&["application_id"]],
        filldown: &[],
        rules: &[
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Reader[ .]*:\s*(?P<reader>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Application ID[ .]*:\s*(?P<application_id>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Application type[ .]*:\s*(?P<application_type>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Version[ .]*:\s*(?P<version>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Manufacturer[ .]*:\s*(?P<manufacturer>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Serial number[ .]*:\s*(?P<serial_number>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Name of cardholder[ .]*:\s*(?P<cardholder_name>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Language prefs[ .]*:\s*(?P<language_prefs>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Salutation[ .]*:\s*(?P<salutation>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^URL of public key[ .]*:\s*(?P<public_key_url>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Login data[ .]*:\s*(?P<login_data>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Signature PIN[ .]*:\s*(?P<signature_pin>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Key attributes[ .]*:\s*(?P<key_attributes>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Max\. PIN lengths[ .]*:\s*(?P<max_pin_lengths>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^PIN retry counter[ .]*:\s*(?P<pin_retry_counter>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Signature counter[ .]*:\s*(?P<signature_counter>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^KDF setting[ .]*:\s*(?P<kdf_setting>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^UIF setting[ .]*:\s*Sign=(?P<uif_sign>\S+)\s+Decrypt=(?P<uif_decrypt>\S+)\s+Auth=(?P<uif_auth>\S+)\s*$",
                action: Action::Fill,
                next: None,
            },
            // Slot fingerprints are kept verbatim, embedded spaces included.
            // Each slot line routes the indented `created` line that follows
            // it to the matching timestamp field.
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Signature key[ .]*:\s*(?P<card_signature_key>.*?)\s*$",
                action: Action::Fill,
                next: Some("sig"),
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Encryption key[ .]*:\s*(?P<card_encryption_key>.*?)\s*$",
                action: Action::Fill,
                next: Some("enc"),
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: r"^Authentication key[ .]*:\s*(?P<card_authentication_key>.*?)\s*$",
                action: Action::Fill,
                next: Some("auth"),
            },
            RuleDef {
                states: &["sig"],
                pattern: r"^\s+created[ .]*:\s*(?P<card_signature_key_creation>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &["enc"],
                pattern: r"^\s+created[ .]*:\s*(?P<card_encryption_key_creation>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &["auth"],
                pattern: r"^\s+created[ .]*:\s*(?P<card_authentication_key_creation>.*?)\s*$",
                action: Action::Fill,
                next: None,
            },
        ],
    },
    GrammarDef {
        name: CARD_KEYS,
        initial: "keys",
        required: &[&["keygrip"], &["primary_key", "subkey"]],
        filldown: &["primary_key"],
        rules: &[
            RuleDef {
                states: &[ANY_STATE],
                pattern: SEC_LINE,
                action: Action::Start,
                next: Some("primary"),
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: SSB_LINE,
                action: Action::Start,
                next: Some("subkey"),
            },
            RuleDef {
                states: &["primary"],
                pattern: PRIMARY_FPR_LINE,
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &["subkey"],
                pattern: SUBKEY_FPR_LINE,
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: KEYGRIP_LINE,
                action: Action::Fill,
                next: None,
            },
            RuleDef {
                states: &[ANY_STATE],
                pattern: CARD_NO_LINE,
                action: Action::Fill,
                next: None,
            },
        ],
    },
];
