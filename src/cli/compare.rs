use super::ui;
use crate::comparison::{ComparisonSelection, MAX_COMPARED, MIN_COMPARED, Toggle};
use crate::core::{CatalogError, Fund, FundCatalog, FundDetail, SchemeCode};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment};
use futures::future::join_all;
use std::collections::BTreeSet;
use tracing::warn;

const NAV_ROWS: usize = 10;

/// Builds the comparison selection from the requested codes. Repeated codes
/// count once; codes beyond the cap are ignored.
pub fn select(scheme_codes: &[SchemeCode]) -> ComparisonSelection {
    let mut selection = ComparisonSelection::new();
    selection.enter();
    for &code in scheme_codes {
        if selection.contains(code) {
            continue;
        }
        if selection.toggle(&Fund::new(code, code.to_string())) == Toggle::Rejected {
            warn!("At most {} funds can be compared, ignoring {}", MAX_COMPARED, code);
        }
    }
    selection
}

pub fn display_comparison(results: &[(Fund, Result<FundDetail, CatalogError>)]) -> String {
    let name = |fund: &Fund, result: &Result<FundDetail, CatalogError>| match result {
        Ok(detail) => detail.fund.scheme_name.clone(),
        Err(_) => fund.scheme_code.to_string(),
    };

    let mut header = vec![ui::header_cell("")];
    header.extend(results.iter().map(|(f, r)| ui::header_cell(&name(f, r))));

    let mut table = ui::new_styled_table();
    table.set_header(header);

    let text_row = |label: &str, pick: fn(&Fund) -> Option<String>| {
        let mut row = vec![Cell::new(label)];
        row.extend(results.iter().map(|(_, r)| match r {
            Ok(detail) => pick(&detail.fund).map_or(ui::na_cell(false), Cell::new),
            Err(_) => ui::na_cell(true),
        }));
        row
    };
    table.add_row(text_row("Scheme code", |f| Some(f.scheme_code.to_string())));
    table.add_row(text_row("Fund house", |f| f.fund_house.clone()));
    table.add_row(text_row("Category", |f| f.scheme_category.clone()));
    table.add_row(text_row("Type", |f| f.scheme_type.clone()));

    let mut latest = vec![Cell::new("Latest NAV")];
    latest.extend(results.iter().map(|(_, r)| match r {
        Ok(detail) => ui::format_optional_cell(detail.latest(), |s| {
            format!("{:.4} ({})", s.nav, s.date.format("%Y-%m-%d"))
        }),
        Err(_) => ui::na_cell(true),
    }));
    table.add_row(latest);

    let mut output = format!(
        "{}\n\n{}",
        ui::style_text("Comparison", ui::StyleType::Title),
        table
    );

    // NAV series on the most recent dates any compared fund has
    let dates: BTreeSet<NaiveDate> = results
        .iter()
        .filter_map(|(_, r)| r.as_ref().ok())
        .flat_map(|d| d.recent(NAV_ROWS).iter().map(|s| s.date))
        .collect();
    if !dates.is_empty() {
        let mut series = ui::new_styled_table();
        let mut header = vec![ui::header_cell("Date")];
        header.extend(results.iter().map(|(f, r)| ui::header_cell(&name(f, r))));
        series.set_header(header);

        for date in dates.iter().rev().take(NAV_ROWS) {
            let mut row = vec![Cell::new(date.format("%Y-%m-%d"))];
            row.extend(results.iter().map(|(_, r)| {
                let nav = r.as_ref().ok().and_then(|d| {
                    d.nav_history
                        .iter()
                        .find(|s| s.date == *date)
                        .map(|s| s.nav)
                });
                ui::format_optional_cell(nav, |v| format!("{v:.4}"))
                    .set_alignment(CellAlignment::Right)
            }));
            series.add_row(row);
        }
        output.push_str(&format!(
            "\n\n{}\n\n{}",
            ui::style_text("Recent NAV", ui::StyleType::Label),
            series
        ));
    }

    for (fund, result) in results {
        if let Err(e) = result {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!("Scheme {}: {}", fund.scheme_code, e),
                    ui::StyleType::Error
                )
            ));
        }
    }
    output
}

pub async fn run(catalog: &dyn FundCatalog, scheme_codes: &[SchemeCode]) -> Result<()> {
    let selection = select(scheme_codes);
    let Some(funds) = selection.comparison() else {
        bail!(
            "Select between {} and {} distinct funds to compare, got {}",
            MIN_COMPARED,
            MAX_COMPARED,
            selection.len()
        );
    };

    let spinner = ui::new_spinner("Loading NAVs...");
    let details = join_all(funds.iter().map(|f| catalog.fetch_detail(f.scheme_code))).await;
    spinner.finish_and_clear();

    let results: Vec<_> = funds.iter().cloned().zip(details).collect();
    if results.iter().all(|(_, r)| r.is_err()) {
        bail!("Failed to load any of the selected schemes");
    }
    println!("{}", display_comparison(&results));
    Ok(())
}
