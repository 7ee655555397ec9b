//! Argument lists for the external gpg binary.
//!
//! The core never spawns processes: it produces the arguments to pass and
//! consumes the captured standard output. Running the tool is the caller's
//! concern.

/// Arguments listing all secret keys with keygrips and subkey
/// fingerprints, optionally narrowed to one primary key.
pub fn secret_key_listing_args(primary_key: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "-K".to_string(),
        "--with-keygrip".to_string(),
        "--with-subkey-fingerprint".to_string(),
    ];
    if let Some(primary_key) = primary_key {
        args.push(primary_key.to_string());
    }
    args
}

/// Arguments querying the status of the currently inserted card.
pub fn card_status_args() -> Vec<String> {
    vec!["--card-status".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_args() {
        assert_eq!(
            secret_key_listing_args(None),
            ["-K", "--with-keygrip", "--with-subkey-fingerprint"]
        );
        assert_eq!(
            secret_key_listing_args(Some("603A72CD92F84EAA35127FB2D1724E537A0844E2")),
            [
                "-K",
                "--with-keygrip",
                "--with-subkey-fingerprint",
                "603A72CD92F84EAA35127FB2D1724E537A0844E2",
            ]
        );
    }

    #[test]
    fn test_card_status_args() {
        assert_eq!(card_status_args(), ["--card-status"]);
    }
}
