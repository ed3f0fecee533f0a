//! Exact rounding of decimal numerals of any length.
//!
//! The solver hands back numerals that can be far wider than an `f64` mantissa
//! (think token amounts with 18 decimals). Everything here works on the digit
//! strings themselves, so `"1999999999999999999999999999999999999999.9999"`
//! rounds to `"2000000000000000000000000000000000000000"` without losing a digit.
//!
//! ```
//! use lp_clp::decimal;
//!
//! assert_eq!(decimal::round("1999.5").unwrap(), "2000");
//! assert_eq!(decimal::round("-1999.5").unwrap(), "-2000");
//! assert_eq!(decimal::ceil("-0.25").unwrap(), "0");
//! assert_eq!(decimal::floor("-0.25").unwrap(), "-1");
//! ```
use std::cmp::Ordering;

use crate::error::{Error, Result};

struct Parts<'a> {
    negative: bool,
    integer: &'a str,
    fraction: &'a str,
}

fn split(s: &str) -> Result<Parts<'_>> {
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !digits_only(integer) || !digits_only(fraction) {
        return Err(Error::InvalidDecimalFormat(s.to_string()));
    }
    Ok(Parts {
        negative,
        integer,
        fraction,
    })
}

fn is_zero(digits: &str) -> bool {
    digits.bytes().all(|b| b == b'0')
}

/// Adds one to an unsigned digit string. The carry may grow the string by one digit.
fn increment(digits: &str) -> String {
    let mut out = digits.as_bytes().to_vec();
    let mut carry = true;
    for digit in out.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        out.insert(0, b'1');
    }
    out.into_iter().map(char::from).collect()
}

fn finish(negative: bool, magnitude: &str) -> String {
    let trimmed = magnitude.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else if negative {
        format!("-{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Nearest,
    Up,
    Down,
}

fn to_integer(s: &str, direction: Direction) -> Result<String> {
    let Parts {
        negative,
        integer,
        fraction,
    } = split(s)?;
    if is_zero(fraction) {
        return Ok(finish(negative, integer));
    }
    // work on the magnitude: only "away from zero" ever needs arithmetic
    let away_from_zero = match direction {
        Direction::Nearest => fraction.as_bytes()[0] >= b'5',
        Direction::Up => !negative,
        Direction::Down => negative,
    };
    if away_from_zero {
        Ok(finish(negative, &increment(integer)))
    } else {
        Ok(finish(negative, integer))
    }
}

/// Nearest integer. A fractional part of exactly one half rounds away from zero.
pub fn round(s: &str) -> Result<String> {
    to_integer(s, Direction::Nearest)
}

/// Smallest integer greater than or equal to the numeral
pub fn ceil(s: &str) -> Result<String> {
    to_integer(s, Direction::Up)
}

/// Largest integer less than or equal to the numeral
pub fn floor(s: &str) -> Result<String> {
    to_integer(s, Direction::Down)
}

/// Whether `s` is a plain decimal numeral: optional sign, digits, optional fraction
pub fn is_valid(s: &str) -> bool {
    split(s).is_ok()
}

fn canonical(s: &str) -> Result<(bool, &str, &str)> {
    let Parts {
        negative,
        integer,
        fraction,
    } = split(s)?;
    let integer = integer.trim_start_matches('0');
    let fraction = fraction.trim_end_matches('0');
    let zero = integer.is_empty() && fraction.is_empty();
    Ok((negative && !zero, integer, fraction))
}

/// Canonical spelling of a numeral: no `+`, no redundant zeros, no `-0`.
pub fn normalize(s: &str) -> Result<String> {
    let (negative, integer, fraction) = canonical(s)?;
    let mut out = String::with_capacity(s.len());
    if negative {
        out.push('-');
    }
    out.push_str(if integer.is_empty() { "0" } else { integer });
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    Ok(out)
}

/// Exact numeric ordering of two numerals
pub fn compare(a: &str, b: &str) -> Result<Ordering> {
    let (a_negative, a_integer, a_fraction) = canonical(a)?;
    let (b_negative, b_integer, b_fraction) = canonical(b)?;
    let magnitude = a_integer
        .len()
        .cmp(&b_integer.len())
        .then_with(|| a_integer.cmp(b_integer))
        .then_with(|| a_fraction.cmp(b_fraction));
    Ok(match (a_negative, b_negative) {
        (false, false) => magnitude,
        (true, true) => magnitude.reverse(),
        (false, true) => Ordering::Greater,
        (true, false) => Ordering::Less,
    })
}
