//! Display helpers shared by the list views: Colombian peso amounts, short
//! Spanish timestamps, and the substring predicate every search box uses.

use chrono::{Datelike, NaiveDateTime, Timelike};

const MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// Formats whole pesos as `$ 125.000`.
pub fn format_cop(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("$ {grouped}")
}

/// Formats a timestamp as `17 feb 2025, 08:30`.
pub fn format_datetime(value: NaiveDateTime) -> String {
    let month = MONTHS[value.month0() as usize];
    format!(
        "{} {} {}, {:02}:{:02}",
        value.day(),
        month,
        value.year(),
        value.hour(),
        value.minute()
    )
}

pub fn format_optional_datetime(value: Option<NaiveDateTime>) -> String {
    value
        .map(format_datetime)
        .unwrap_or_else(|| "N/A".to_string())
}

/// Lowercases and strips Spanish diacritics so `Uroanálisis` matches `uroanalisis`.
pub fn fold(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .map(|ch| match ch {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Case-insensitive substring match against any of `fields`. A blank query
/// matches everything.
pub fn matches_query(query: &str, fields: &[&str]) -> bool {
    let needle = fold(query);
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|field| fold(field).contains(&needle))
}
