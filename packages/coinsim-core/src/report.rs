//! Balance report: the ledger as a table.

use crate::ledger::{Ledger, LedgerStorage};
use crate::types::LedgerRow;
use serde::{Deserialize, Serialize};

const HEADERS: [&str; 2] = ["Currency/Crypto", "Amount"];

/// Printed instead of a table when there are no rows.
pub const EMPTY_PORTFOLIO: &str = "Portfolio is empty.";

/// Snapshot of every ledger row, ascending by currency code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceReport {
    pub rows: Vec<LedgerRow>,
}

impl BalanceReport {
    pub fn from_ledger<S: LedgerStorage>(ledger: &Ledger<S>) -> Self {
        Self {
            rows: ledger.rows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(currency, formatted amount)` for each row.
    pub fn formatted_rows(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .map(|row| (row.currency.clone(), format_amount(row)))
            .collect()
    }

    /// Render as a grid table, or [`EMPTY_PORTFOLIO`].
    pub fn render(&self) -> String {
        if self.is_empty() {
            return EMPTY_PORTFOLIO.to_string();
        }

        let rows = self.formatted_rows();
        let code_width = rows
            .iter()
            .map(|(code, _)| code.chars().count())
            .chain([HEADERS[0].len()])
            .max()
            .unwrap_or_default();
        let amount_width = rows
            .iter()
            .map(|(_, amount)| amount.chars().count())
            .chain([HEADERS[1].len()])
            .max()
            .unwrap_or_default();

        let rule = |fill: char| {
            format!(
                "+{}+{}+",
                fill.to_string().repeat(code_width + 2),
                fill.to_string().repeat(amount_width + 2)
            )
        };

        let mut lines = vec![
            rule('-'),
            format!(
                "| {:<code_width$} | {:<amount_width$} |",
                HEADERS[0], HEADERS[1]
            ),
            rule('='),
        ];
        for (code, amount) in &rows {
            lines.push(format!(
                "| {:<code_width$} | {:<amount_width$} |",
                code, amount
            ));
            lines.push(rule('-'));
        }
        lines.join("\n")
    }
}

/// `$1,234.56` for USD, `1,234.5678` for everything else.
pub fn format_amount(row: &LedgerRow) -> String {
    if row.is_usd() {
        format!("${}", group_thousands(row.amount, 2))
    } else {
        group_thousands(row.amount, 4)
    }
}

/// Format with `decimals` places and comma-separated thousands.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.00 prints as 0.00
    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Plain number for messages: whole values keep one decimal (`100.0`).
pub fn display_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
