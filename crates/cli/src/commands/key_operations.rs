//! Commands for listing and ranking keys

use std::error::Error;

use gpg_keyscan::{Key, best_signing_key, parse_card_status, parse_listing, signing_keys};
use tracing::info;

use crate::tool::GpgTool;
use crate::utils::display;

/// List secret keys, optionally narrowed to one primary key
pub async fn list_keys_command(tool: &GpgTool, primary: Option<&str>) -> Result<(), Box<dyn Error>> {
    let text = tool.secret_key_listing(primary).await?;
    let keys = parse_listing(&text)?;

    if keys.is_empty() {
        println!("{}", display::info("No secret keys found"));
        return Ok(());
    }

    for key in &keys {
        println!("{key}");
        println!();
    }

    Ok(())
}

/// List signing-capable keys as an aligned algorithm/fingerprint table
pub async fn list_signing_command(tool: &GpgTool) -> Result<(), Box<dyn Error>> {
    let text = tool.secret_key_listing(None).await?;
    let keys = parse_listing(&text)?;
    let signing = signing_keys(&keys)?;

    if signing.is_empty() {
        println!("{}", display::info("No signing-capable keys found"));
        return Ok(());
    }

    let width = signing
        .iter()
        .map(|key| key.algorithm.len())
        .max()
        .unwrap_or(0);
    for key in &signing {
        println!("{:<width$} -- {}", key.algorithm, key.fingerprint());
    }

    Ok(())
}

/// Resolve the single best signing key across custody tiers
pub async fn exact_command(tool: &GpgTool) -> Result<(), Box<dyn Error>> {
    let text = tool.secret_key_listing(None).await?;
    let keys = parse_listing(&text)?;
    let signing: Vec<Key> = signing_keys(&keys)?.into_iter().cloned().collect();

    let card = match tool.card_status().await? {
        Some(status) => Some(parse_card_status(&status)?),
        None => None,
    };

    let ranking = best_signing_key(&signing, card.as_ref());
    if ranking.excluded > 0 {
        info!(
            "{} signing key(s) held algorithms outside the selection policy",
            ranking.excluded
        );
    }

    match ranking.best {
        Some(key) => println!("{}", key.fingerprint()),
        None => {
            println!("{}", display::warning("No eligible signing key"));
            std::process::exit(1);
        }
    }

    Ok(())
}
