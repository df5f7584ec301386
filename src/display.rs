//! Terminal rendering helpers for amounts and tables.
//!
//! Amounts are shown with the currency symbol, thousands separators, and
//! up to two fraction digits (trailing zeros dropped).

use crate::engine::tracker::StepStatus;
use crate::strategy::series::TradeSeries;
use crate::types::Currency;

/// Format an amount for display, e.g. `$1,234.5` or `-Rs 300`.
pub fn format_amount(amount: f64, currency: Currency) -> String {
    if !amount.is_finite() {
        return "n/a".to_string();
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let frac = cents % 100;

    let number = if frac == 0 {
        whole
    } else if frac % 10 == 0 {
        format!("{whole}.{}", frac / 10)
    } else {
        format!("{whole}.{frac:02}")
    };

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    let sep = match currency {
        Currency::Usd => "",
        Currency::Pkr => " ",
    };
    format!("{sign}{}{sep}{number}", currency.symbol())
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render the stake table, one row per step.
pub fn series_table(series: &TradeSeries, currency: Currency, statuses: Option<&[StepStatus]>) -> String {
    let mut out = String::new();
    let mut lost_before = 0.0;
    for (i, stake) in series.trades.iter().enumerate() {
        let marker = match statuses.and_then(|s| s.get(i)) {
            Some(StepStatus::Lost) => "x",
            Some(StepStatus::Current) => ">",
            _ => " ",
        };
        out.push_str(&format!(
            "{marker} Step {:>2}  stake {:>14}  risked {:>14}\n",
            i + 1,
            format_amount(*stake, currency),
            format_amount(lost_before + stake, currency),
        ));
        lost_before += stake;
    }
    out
}
