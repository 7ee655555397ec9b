//! Generic line-grammar engine.
//!
//! Applies one [`Grammar`] to one input text and produces the ordered
//! sequence of field mappings, one per completed record. The engine walks
//! the input line by line with a current state; the first rule that applies
//! in that state and matches the line wins. Lines no rule matches are
//! skipped. A record whose terminating fields never appear is dropped, not
//! emitted.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::grammar::{Action, Grammar};
use crate::{Error, Result};

/// One parsed record: field name to verbatim captured text.
pub type FieldMap = BTreeMap<String, String>;

#[derive(Default)]
struct RecordBuilder {
    fields: FieldMap,
}

impl RecordBuilder {
    /// Whether every required field group has at least one field captured
    /// by this record itself (filldown values do not count).
    fn is_complete(&self, grammar: &Grammar) -> bool {
        grammar
            .required()
            .iter()
            .all(|group| group.iter().any(|field| self.fields.contains_key(*field)))
    }

    fn finish(mut self, filldown: &BTreeMap<String, String>) -> FieldMap {
        for (field, value) in filldown {
            self.fields
                .entry(field.clone())
                .or_insert_with(|| value.clone());
        }
        self.fields
    }
}

/// Apply `grammar` to `text`, producing one field mapping per completed
/// record, in the order each record's opening line appeared.
///
/// Zero records from non-blank input fail with [`Error::GrammarMismatch`]:
/// either the tool output format drifted or the wrong grammar was selected,
/// and neither may be conflated with an empty inventory. Blank input is an
/// empty inventory and parses to an empty sequence.
pub fn parse(grammar: &Grammar, text: &str) -> Result<Vec<FieldMap>> {
    let mut records = Vec::new();
    let mut current = RecordBuilder::default();
    let mut filldown: BTreeMap<String, String> = BTreeMap::new();
    let mut state = grammar.initial();

    for line in text.lines() {
        let mut matched = None;
        for rule in grammar.rules() {
            if !rule.applies_in(state) {
                continue;
            }
            if let Some(captures) = rule.regex().captures(line) {
                matched = Some((rule, captures));
                break;
            }
        }
        let Some((rule, captures)) = matched else {
            trace!("skipping line: {line:?}");
            continue;
        };

        if rule.action == Action::Start {
            let finished = std::mem::take(&mut current);
            if finished.is_complete(grammar) {
                records.push(finished.finish(&filldown));
            }
        }

        for name in rule.regex().capture_names().flatten() {
            let Some(value) = captures.name(name) else {
                continue;
            };
            current
                .fields
                .insert(name.to_string(), value.as_str().to_string());
            if grammar.filldown().iter().any(|field| *field == name) {
                filldown.insert(name.to_string(), value.as_str().to_string());
            }
        }

        if let Some(next) = rule.next {
            state = next;
        }
    }

    if current.is_complete(grammar) {
        records.push(current.finish(&filldown));
    }

    if records.is_empty() && !text.trim().is_empty() {
        return Err(Error::GrammarMismatch {
            grammar: grammar.name(),
        });
    }

    debug!(
        "grammar {:?} produced {} record(s)",
        grammar.name(),
        records.len()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarTable, KEY_LISTING};

    fn parse_listing_records(text: &str) -> Result<Vec<FieldMap>> {
        parse(GrammarTable::builtin().get(KEY_LISTING).unwrap(), text)
    }

    #[test]
    fn test_records_keep_input_order() {
        let text = "\
sec   ed25519 2025-09-22 [SC] [expires: 2030-09-21]
      603A72CD92F84EAA35127FB2D1724E537A0844E2
      Keygrip = 5643B43609004D57AF91CCF1FE78E14E166F52DC
ssb   cv25519 2025-09-22 [E] [expires: 2030-09-21]
      31F5A7299414BD57611F2A2A28737947AD89864B
      Keygrip = 772EDDBB1AB8A97872AFF4C4F092BD5239692EF7
";
        let records = parse_listing_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["algorithm"], "ed25519");
        assert_eq!(records[1]["algorithm"], "cv25519");
    }

    #[test]
    fn test_subkeys_inherit_primary_fingerprint() {
        let text = "\
sec   ed25519 2025-09-22 [SC]
      603A72CD92F84EAA35127FB2D1724E537A0844E2
      Keygrip = 5643B43609004D57AF91CCF1FE78E14E166F52DC
ssb   rsa2048 2025-09-22 [SEA]
      02FA8E12ECFFFA384131F777C39F59AAF4EF1469
      Keygrip = 57A109CD953DEF332E83ECAFD45CA3F3BF355714
";
        let records = parse_listing_records(text).unwrap();
        assert_eq!(
            records[1]["primary_key"],
            "603A72CD92F84EAA35127FB2D1724E537A0844E2"
        );
        assert_eq!(
            records[1]["subkey"],
            "02FA8E12ECFFFA384131F777C39F59AAF4EF1469"
        );
        // The primary record carries no subkey fingerprint at all.
        assert!(!records[0].contains_key("subkey"));
    }

    #[test]
    fn test_presence_markers() {
        let text = "\
sec#  ed25519 2025-09-22 [SC]
      603A72CD92F84EAA35127FB2D1724E537A0844E2
      Keygrip = 5643B43609004D57AF91CCF1FE78E14E166F52DC
ssb   cv25519 2025-09-22 [E]
      31F5A7299414BD57611F2A2A28737947AD89864B
      Keygrip = 772EDDBB1AB8A97872AFF4C4F092BD5239692EF7
ssb>  rsa2048 2025-09-22 [SEA]
      02FA8E12ECFFFA384131F777C39F59AAF4EF1469
      Keygrip = 57A109CD953DEF332E83ECAFD45CA3F3BF355714
ssb   nistp384 2025-09-22 [SA]
      2C7B06B7C632DC195ADE1394949536148C87FE64
      Keygrip = 4C3DC92CA8B036CA6CB39837BBBF6124166D5A83
";
        let records = parse_listing_records(text).unwrap();
        let markers: Vec<_> = records
            .iter()
            .map(|record| record.get("presence").map(String::as_str))
            .collect();
        assert_eq!(markers, [Some("#"), None, Some(">"), None]);
    }

    #[test]
    fn test_incomplete_trailing_record_is_dropped() {
        let text = "\
sec   ed25519 2025-09-22 [SC]
      603A72CD92F84EAA35127FB2D1724E537A0844E2
      Keygrip = 5643B43609004D57AF91CCF1FE78E14E166F52DC
ssb   cv25519 2025-09-22 [E]
      31F5A7299414BD57611F2A2A28737947AD89864B
";
        let records = parse_listing_records(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["algorithm"], "ed25519");
    }

    #[test]
    fn test_unmatched_input_is_a_grammar_mismatch() {
        let result = parse_listing_records("pub   ed25519 2025-09-22 [SC]\n");
        assert!(matches!(result, Err(Error::GrammarMismatch { .. })));
    }

    #[test]
    fn test_blank_input_is_an_empty_inventory() {
        assert!(parse_listing_records("").unwrap().is_empty());
        assert!(parse_listing_records("  \n\n").unwrap().is_empty());
    }
}
