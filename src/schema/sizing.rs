//! Sizing rules from sampled values to SQL column types
//!
//! These functions see plain Rust values; the Arrow plumbing lives in
//! `inference`. Null entries are skipped everywhere.

use crate::types::SqlType;

/// Extra characters added to the longest observed text value
pub const TEXT_MARGIN: u32 = 5;

/// Widest `decimal` precision SQL Server and DuckDB accept
pub const MAX_DECIMAL_PRECISION: u32 = 38;

/// Longest fixed `varchar` length before falling back to `varchar(max)`
pub const VARCHAR_LIMIT: u32 = 8000;

/// Size a `varchar` column from text values
pub fn size_text<'a, I>(values: I) -> SqlType
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    text_type(longest_text(values), TEXT_MARGIN, VARCHAR_LIMIT)
}

/// Length in characters (not bytes) of the longest non-null value
pub(crate) fn longest_text<'a, I>(values: I) -> usize
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values
        .into_iter()
        .flatten()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
}

pub(crate) fn text_type(longest: usize, margin: u32, limit: u32) -> SqlType {
    let length = longest.saturating_add(margin as usize);
    if length > limit as usize {
        SqlType::Varchar { length: None }
    } else {
        SqlType::Varchar {
            length: Some(length as u32),
        }
    }
}

/// Pick an integer class from the largest absolute value
pub fn size_integer<I>(values: I) -> SqlType
where
    I: IntoIterator<Item = Option<i128>>,
{
    let max_abs = values
        .into_iter()
        .flatten()
        .map(i128::unsigned_abs)
        .max()
        .unwrap_or(0);
    integer_type(max_abs)
}

// Magnitude ladder: 100..=9999 is smallint, 10000..=999_999_999 falls
// through to int. The sign is ignored, so negatives can land in SQL Server's
// unsigned tinyint.
pub(crate) fn integer_type(max_abs: u128) -> SqlType {
    if max_abs <= 99 {
        SqlType::TinyInt
    } else if max_abs <= 9_999 {
        SqlType::SmallInt
    } else if max_abs > 999_999_999 {
        SqlType::BigInt
    } else {
        SqlType::Int
    }
}

/// Size a `decimal` column from floating-point values
///
/// NaN and infinities are treated like nulls.
pub fn size_float<I>(values: I) -> SqlType
where
    I: IntoIterator<Item = Option<f64>>,
{
    decimal_type(
        values
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .map(|v| decimal_digits(&v.to_string())),
    )
}

/// `decimal(before + after + 2, after)` over the widest parts seen
///
/// Past [`MAX_DECIMAL_PRECISION`] the scale gives way so every integer
/// digit still fits; when even a scale of zero is too wide the column
/// becomes `float`.
pub(crate) fn decimal_type<I>(digits: I) -> SqlType
where
    I: IntoIterator<Item = (u32, u32)>,
{
    let (before, after) = digits
        .into_iter()
        .fold((0, 0), |(b, a), (nb, na)| (b.max(nb), a.max(na)));
    let whole = before + 2;
    if whole + after <= MAX_DECIMAL_PRECISION {
        SqlType::Decimal {
            precision: whole + after,
            scale: after,
        }
    } else if whole <= MAX_DECIMAL_PRECISION {
        SqlType::Decimal {
            precision: MAX_DECIMAL_PRECISION,
            scale: MAX_DECIMAL_PRECISION - whole,
        }
    } else {
        SqlType::Float
    }
}

/// Count digits before and after the decimal point of a rendered number
///
/// The sign is not a digit; a value without a `.` has no fractional digits.
pub fn decimal_digits(text: &str) -> (u32, u32) {
    let text = text.trim().trim_start_matches(['-', '+']);
    match text.split_once('.') {
        Some((whole, fraction)) => (whole.len() as u32, fraction.len() as u32),
        None => (text.len() as u32, 0),
    }
}
