//! Command implementations for the keyscan CLI

mod card_operations;
mod key_operations;

pub use card_operations::card_info_command;
pub use key_operations::{exact_command, list_keys_command, list_signing_command};
