use super::ui;
use crate::core::{FundCatalog, FundDetail, SchemeCode};
use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment};

impl FundDetail {
    pub fn display_as_table(&self, days: usize) -> String {
        let fund = &self.fund;
        let field = |label: &str, value: Option<&str>| {
            format!(
                "{}: {}\n",
                ui::style_text(label, ui::StyleType::Label),
                value.unwrap_or("N/A")
            )
        };

        let mut output = format!(
            "{}\n\n",
            ui::style_text(&fund.scheme_name, ui::StyleType::Title)
        );
        output.push_str(&field("Scheme code", Some(fund.scheme_code.to_string().as_str())));
        output.push_str(&field("Fund house", fund.fund_house.as_deref()));
        output.push_str(&field("Category", fund.scheme_category.as_deref()));
        output.push_str(&field("Type", fund.scheme_type.as_deref()));
        output.push_str(&field("ISIN (Growth)", fund.isin_growth.as_deref()));
        output.push_str(&field(
            "ISIN (Div Reinvestment)",
            fund.isin_div_reinvestment.as_deref(),
        ));

        if self.nav_history.is_empty() {
            output.push_str(&format!(
                "\n{}",
                ui::style_text("No NAV history available", ui::StyleType::Subtle)
            ));
            return output;
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("NAV"),
            ui::header_cell("Change"),
        ]);

        // Include one extra sample so the oldest shown row has a change value
        let window = self.recent(days.saturating_add(1));
        let skip = window.len().saturating_sub(days);
        for (idx, sample) in window.iter().enumerate().skip(skip).rev() {
            let change = idx
                .checked_sub(1)
                .map(|prev| &window[prev])
                .filter(|prev| prev.nav > 0.0)
                .map(|prev| (sample.nav - prev.nav) / prev.nav * 100.0);
            table.add_row(vec![
                Cell::new(sample.date.format("%Y-%m-%d")),
                Cell::new(format!("{:.4}", sample.nav)).set_alignment(CellAlignment::Right),
                change.map_or(ui::na_cell(false), ui::change_cell),
            ]);
        }

        output.push('\n');
        output.push_str(&table.to_string());
        output
    }
}

pub async fn run(catalog: &dyn FundCatalog, scheme_code: SchemeCode, days: usize) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Loading scheme {scheme_code}..."));
    let detail = catalog.fetch_detail(scheme_code).await;
    spinner.finish_and_clear();

    let detail = detail.with_context(|| format!("Failed to load scheme {scheme_code}"))?;
    println!("{}", detail.display_as_table(days));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::core::{Fund, FundDetail, NavSample};
    use chrono::NaiveDate;

    fn detail() -> FundDetail {
        let day = |d| NaiveDate::from_ymd_opt(2025, 8, d).unwrap();
        let mut fund = Fund::new(100, "HDFC Equity Fund");
        fund.fund_house = Some("HDFC Mutual Fund".to_string());
        FundDetail {
            fund,
            nav_history: vec![
                NavSample { date: day(1), nav: 100.0 },
                NavSample { date: day(2), nav: 110.0 },
                NavSample { date: day(3), nav: 99.0 },
            ],
            status: "SUCCESS".to_string(),
        }
    }

    #[test]
    fn test_detail_table_shows_recent_changes() {
        let output = detail().display_as_table(2);

        assert!(output.contains("HDFC Mutual Fund"));
        assert!(output.contains("2025-08-03"));
        assert!(output.contains("2025-08-02"));
        assert!(!output.contains("2025-08-01"));
        assert!(output.contains("+10.00%"));
        assert!(output.contains("-10.00%"));
        assert!(output.contains("Category"));
    }

    #[test]
    fn test_detail_without_history() {
        let mut detail = detail();
        detail.nav_history.clear();

        assert!(detail.display_as_table(5).contains("No NAV history available"));
    }

    #[test]
    fn test_detail_table_with_unbounded_days_shows_full_history() {
        let output = detail().display_as_table(usize::MAX);

        assert!(output.contains("2025-08-01"));
        assert!(output.contains("2025-08-03"));
        assert!(output.contains("+10.00%"));
    }
}
