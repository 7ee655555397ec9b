//! Commands for card inspection

use std::error::Error;

use gpg_keyscan::parse_card_status;

use crate::tool::GpgTool;
use crate::utils::display;

/// Show the inserted card and its resident keys
pub async fn card_info_command(tool: &GpgTool) -> Result<(), Box<dyn Error>> {
    let Some(status) = tool.card_status().await? else {
        println!("{}", display::info("No card present"));
        return Ok(());
    };

    let card = parse_card_status(&status)?;

    println!("{}", display::section_title("Card Information"));
    println!("{card}");

    Ok(())
}
