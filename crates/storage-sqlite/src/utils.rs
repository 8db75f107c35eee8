//! Helpers for SQLite statement limits and text-encoded columns.

use log::warn;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Ids bound per `IN (...)` clause, well below SQLITE_MAX_VARIABLE_NUMBER.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Splits ids into slices small enough for one `IN (...)` clause each.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Parses a TEXT money column, falling back to zero on malformed data.
pub fn parse_decimal_tolerant(value: &str, field_name: &str) -> Decimal {
    Decimal::from_str(value).unwrap_or_else(|e| {
        warn!(
            "Failed to parse {} '{}' as Decimal: {}. Falling back to ZERO.",
            field_name, value, e
        );
        Decimal::ZERO
    })
}

/// Parses a TEXT enum column, falling back to the type's default.
pub fn parse_enum_tolerant<T>(value: &str, field_name: &str) -> T
where
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    T::from_str(value).unwrap_or_else(|e| {
        warn!("Unrecognised {} '{}': {}", field_name, value, e);
        T::default()
    })
}

/// Like [`parse_enum_tolerant`] for nullable columns; unknown values become `None`.
pub fn parse_optional_enum<T>(value: Option<&str>, field_name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.and_then(|v| match T::from_str(v) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Unrecognised {} '{}': {}", field_name, v, e);
            None
        }
    })
}
