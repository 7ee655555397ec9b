/// Result type for keyscan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for keyscan operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external gpg binary could not be found on the execution path
    #[error("gpg binary not found: {program}")]
    ToolUnavailable {
        /// Program name or path that failed to resolve
        program: String,
    },

    /// No grammar is registered under the requested name
    #[error("unknown grammar: {name}")]
    UnknownGrammar {
        /// The name that failed to resolve
        name: String,
    },

    /// A grammar produced zero records from non-empty input.
    ///
    /// Signals tool-output format drift or a wrong grammar selection, which
    /// is a different condition from an empty key inventory.
    #[error("grammar {grammar:?} matched no records in non-empty input")]
    GrammarMismatch {
        /// Name of the grammar that failed to match
        grammar: &'static str,
    },

    /// A parsed record lacks a field the model requires
    #[error("parsed record is missing required field {field:?}")]
    MalformedRecord {
        /// The missing field name
        field: &'static str,
    },

    /// The attribute filter was invoked with a field name the model does not define
    #[error("unknown key attribute: {attribute}")]
    UnknownAttribute {
        /// The unrecognized field name
        attribute: String,
    },
}
