//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Formats a price for display, e.g. `$ 75000.00`.
///
/// Usage in templates: `{{ product.price|currency }}`
#[askama::filter_fn]
pub fn currency(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("$ {value}"))
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}
