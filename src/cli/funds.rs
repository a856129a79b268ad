use super::ui;
use crate::catalog_view::CatalogView;
use crate::core::Fund;
use crate::filter::FundFilter;
use anyhow::{Context, Result};
use comfy_table::Cell;

pub fn display_funds(
    funds: &[Fund],
    total: usize,
    filter: &FundFilter,
    limit: Option<usize>,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Scheme"),
        ui::header_cell("ISIN (Growth)"),
        ui::header_cell("ISIN (Div Reinvestment)"),
    ]);

    let shown = limit.map_or(funds.len(), |l| l.min(funds.len()));
    for fund in &funds[..shown] {
        table.add_row(vec![
            Cell::new(fund.scheme_code),
            Cell::new(&fund.scheme_name),
            Cell::new(fund.isin_growth.as_deref().unwrap_or("-")),
            Cell::new(fund.isin_div_reinvestment.as_deref().unwrap_or("-")),
        ]);
    }

    let mut output = format!(
        "{}\n{}\n\n",
        ui::style_text("Funds", ui::StyleType::Title),
        ui::style_text(
            &format!(
                "AMC: {} | Category: {} | Type: {} | Search: '{}'",
                filter.amc, filter.category, filter.fund_type, filter.search
            ),
            ui::StyleType::Subtle
        )
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\nShowing {} of {} matching ({} in catalog)",
        shown,
        funds.len(),
        total
    ));
    output
}

pub async fn run(view: &CatalogView, filter: &FundFilter, limit: Option<usize>) -> Result<()> {
    let spinner = ui::new_spinner("Loading funds...");
    let loaded = view.refresh().await;
    spinner.finish_and_clear();
    loaded.context("Failed to load fund catalog")?;

    let total = view.funds().await.len();
    let matching = view.filtered(filter).await;
    println!("{}", display_funds(&matching, total, filter, limit));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_respects_limit() {
        let funds = vec![
            Fund::new(100, "HDFC Equity Fund"),
            Fund::new(102, "Axis Equity Fund"),
        ];
        let filter = FundFilter::new().category("Equity");

        let output = display_funds(&funds, 5, &filter, Some(1));

        assert!(output.contains("HDFC Equity Fund"));
        assert!(!output.contains("Axis Equity Fund"));
        assert!(output.contains("Showing 1 of 2 matching (5 in catalog)"));
        assert!(output.contains("Category: Equity"));
    }
}
