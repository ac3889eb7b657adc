//! Portuguese labels for reference months and publish dates.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

const SHORT_MONTHS: [&str; 12] = ["Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez"];

const FULL_MONTHS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Split `YYYY-MM` into the year text and a zero-based month index.
fn parse_month(month_ref: &str) -> Option<(&str, usize)> {
    let (year, month) = month_ref.split_once('-')?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: usize = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month - 1))
}

/// `"2024-03"` → `"Mar/24"`; empty for malformed input.
#[must_use]
pub fn month_label(month_ref: &str) -> String {
    parse_month(month_ref)
        .map(|(year, idx)| format!("{}/{}", SHORT_MONTHS[idx], &year[2..]))
        .unwrap_or_default()
}

/// `"2024-03"` → `"Março 2024"`; empty for malformed input.
#[must_use]
pub fn month_label_full(month_ref: &str) -> String {
    parse_month(month_ref)
        .map(|(year, idx)| format!("{} {year}", FULL_MONTHS[idx]))
        .unwrap_or_default()
}

/// RFC 3339 timestamp → `dd/mm/yyyy hh:mm` in its own offset.
///
/// Unparseable input is returned unchanged.
#[must_use]
pub fn format_publish_date(timestamp: &str) -> String {
    let Ok(parsed) = OffsetDateTime::parse(timestamp, &Rfc3339) else {
        return timestamp.to_owned();
    };
    parsed
        .format(format_description!("[day]/[month]/[year] [hour]:[minute]"))
        .unwrap_or_else(|_| timestamp.to_owned())
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;
