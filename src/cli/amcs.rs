use super::ui;
use crate::catalog_view::CatalogView;
use anyhow::{Context, Result};

pub fn display_amcs(amcs: &[String], first_word: bool) -> String {
    let title = if first_word { "AMC List" } else { "AMC Filters" };
    let mut output = format!("{}\n\n", ui::style_text(title, ui::StyleType::Title));
    for amc in amcs {
        output.push_str(amc);
        output.push('\n');
    }
    output.push_str(&ui::style_text(
        &format!("{} labels", amcs.len()),
        ui::StyleType::Subtle,
    ));
    output
}

pub async fn run(view: &CatalogView, first_word: bool) -> Result<()> {
    let spinner = ui::new_spinner("Loading funds...");
    let loaded = view.refresh().await;
    spinner.finish_and_clear();
    loaded.context("Failed to load fund catalog")?;

    let amcs = if first_word {
        view.amc_listing().await
    } else {
        view.amcs().await
    };
    println!("{}", display_amcs(&amcs, first_word));
    Ok(())
}
