//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Up to two uppercase initials for an avatar bubble.
///
/// Usage in templates: `{{ user.name|initials }}`
#[askama::filter_fn]
pub fn initials(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(initials_of(&value.to_string()))
}

/// Unread badge text: the count, capped at `99+`, or nothing for zero.
///
/// Usage in templates: `{{ unread|badge_count }}`
#[askama::filter_fn]
pub fn badge_count(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(badge_text(&value.to_string()))
}

fn initials_of(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

fn badge_text(raw: &str) -> String {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => String::new(),
        Ok(n) if n > 99 => "99+".to_string(),
        Ok(n) => n.to_string(),
    }
}
