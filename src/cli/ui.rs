use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::core::{CurrencyCode, RateSnapshot};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn rate_cell(rate: f64) -> Cell {
    Cell::new(format_rate(rate)).set_alignment(CellAlignment::Right)
}

/// Creates a cell for "N/A" values.
pub fn na_cell() -> Cell {
    Cell::new("N/A")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

/// Rates span many magnitudes (0.00001 BTC vs 15000 IDR), so small values
/// keep more significant digits.
pub fn format_rate(rate: f64) -> String {
    if rate.abs() >= 1.0 {
        format!("{rate:.4}")
    } else {
        format!("{rate:.8}")
    }
}

/// Creates a spinner shown while a request is outstanding.
pub fn new_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Renders a snapshot as a titled table. With a non-empty `only`, just those
/// counter currencies are shown, in the given order.
pub fn render_snapshot(snapshot: &RateSnapshot, only: &[CurrencyCode]) -> String {
    let base = snapshot.base.as_str().to_uppercase();

    let mut table = new_styled_table();
    table.set_header(vec![header_cell("Currency"), header_cell(&format!("Rate (1 {base})"))]);

    if only.is_empty() {
        for (code, rate) in snapshot.rates.sorted() {
            table.add_row(vec![Cell::new(code.to_uppercase()), rate_cell(rate)]);
        }
    } else {
        for code in only {
            let rate = snapshot
                .rates
                .get(code.as_str())
                .map_or_else(na_cell, rate_cell);
            table.add_row(vec![Cell::new(code.as_str().to_uppercase()), rate]);
        }
    }

    let date = snapshot
        .date
        .map_or_else(String::new, |d| format!(" as of {d}"));

    let mut output = format!(
        "Base: {}{}\n\n",
        style_text(&base, StyleType::Title),
        style_text(&date, StyleType::Subtle)
    );
    output.push_str(&table.to_string());
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateTable;
    use chrono::NaiveDate;

    fn snapshot() -> RateSnapshot {
        let rates: RateTable = [("jpy".to_string(), 149.5), ("eur".to_string(), 0.92)]
            .into_iter()
            .collect();
        RateSnapshot {
            base: CurrencyCode::new("usd"),
            date: NaiveDate::from_ymd_opt(2024, 3, 6),
            rates,
        }
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(149.5), "149.5000");
        assert_eq!(format_rate(0.92), "0.92000000");
    }

    #[test]
    fn test_render_all_rates_sorted() {
        console::set_colors_enabled(false);
        let output = render_snapshot(&snapshot(), &[]);

        assert!(output.contains("Base: USD as of 2024-03-06"));
        assert!(output.contains("Rate (1 USD)"));
        let eur = output.find("EUR").unwrap();
        let jpy = output.find("JPY").unwrap();
        assert!(eur < jpy);
        assert!(output.contains("149.5000"));
    }

    #[test]
    fn test_render_only_selected_rates() {
        console::set_colors_enabled(false);
        let only = vec![CurrencyCode::new("jpy"), CurrencyCode::new("chf")];
        let output = render_snapshot(&snapshot(), &only);

        assert!(output.contains("JPY"));
        assert!(output.contains("CHF"));
        assert!(output.contains("N/A"));
        assert!(!output.contains("EUR"));
    }

    #[test]
    fn test_render_only_matches_provider_key_case() {
        console::set_colors_enabled(false);
        let snapshot = RateSnapshot {
            base: CurrencyCode::new("usd"),
            date: None,
            rates: [("EUR".to_string(), 0.92)].into_iter().collect(),
        };
        let output = render_snapshot(&snapshot, &[CurrencyCode::new("eur")]);

        assert!(output.contains("0.92000000"));
        assert!(!output.contains("N/A"));
    }
}
