use std::cmp::Ordering;

use lp_clp::decimal::{ceil, compare, floor, is_valid, normalize, round};
use lp_clp::Error;
use test_case::test_case;

const WIDE_NINES: &str = "1999999999999999999999999999999999999999.9999999999999999";
const WIDE_FOURS: &str = "1999999999999999999999999999999999999999.4999999999999999";
const WIDE_LOW: &str = "1999999999999999999999999999999999999999";
const WIDE_HIGH: &str = "2000000000000000000000000000000000000000";

#[test_case("1999.9999999999999999", "2000")]
#[test_case("1999.4999999999999999", "1999")]
#[test_case(WIDE_NINES, WIDE_HIGH)]
#[test_case(WIDE_FOURS, WIDE_LOW)]
#[test_case("1999.5", "2000")]
#[test_case("-1999.5", "-2000"; "negative half")]
#[test_case("-1999.4999", "-1999"; "negative below half")]
#[test_case("0.5", "1")]
#[test_case("-0.4", "0"; "no negative zero")]
#[test_case("+12.5", "13"; "leading plus dropped")]
#[test_case("007", "7"; "leading zeros stripped")]
#[test_case(".5", "1")]
#[test_case("3.", "3")]
fn rounds_to_nearest(input: &str, expected: &str) {
    assert_eq!(round(input).unwrap(), expected);
}

#[test_case("1999.9999999999999999", "2000")]
#[test_case("1999.4999999999999999", "2000")]
#[test_case(WIDE_NINES, WIDE_HIGH)]
#[test_case(WIDE_FOURS, WIDE_HIGH)]
#[test_case("-0.25", "0")]
#[test_case("-1.5", "-1")]
#[test_case("42", "42")]
#[test_case("42.000", "42")]
#[test_case("999.1", "1000")]
fn ceils(input: &str, expected: &str) {
    assert_eq!(ceil(input).unwrap(), expected);
}

#[test_case("1999.9999999999999999", "1999")]
#[test_case("1999.4999999999999999", "1999")]
#[test_case(WIDE_NINES, WIDE_LOW)]
#[test_case(WIDE_FOURS, WIDE_LOW)]
#[test_case("-0.25", "-1")]
#[test_case("-999.5", "-1000")]
#[test_case("0.0001", "0")]
#[test_case("-7", "-7")]
fn floors(input: &str, expected: &str) {
    assert_eq!(floor(input).unwrap(), expected);
}

#[test_case(""; "empty")]
#[test_case("-"; "sign only")]
#[test_case("."; "dot only")]
#[test_case("1e5"; "scientific")]
#[test_case("1.2.3"; "two dots")]
#[test_case("12a"; "letters")]
#[test_case(" 1"; "whitespace")]
#[test_case("inf"; "infinity")]
fn rejects_malformed(input: &str) {
    assert!(!is_valid(input));
    for op in [round, ceil, floor] {
        match op(input) {
            Err(Error::InvalidDecimalFormat(s)) => assert_eq!(s, input),
            other => panic!("expected InvalidDecimalFormat for {:?}, got {:?}", input, other),
        }
    }
}

/// `n + 1` for a normalized integer numeral
fn successor(n: &str) -> String {
    fn step(magnitude: &str, up: bool) -> String {
        let mut digits: Vec<u8> = magnitude.bytes().collect();
        for d in digits.iter_mut().rev() {
            match (up, *d) {
                (true, b'9') => *d = b'0',
                (false, b'0') => *d = b'9',
                (true, _) => {
                    *d += 1;
                    return trimmed(digits);
                }
                (false, _) => {
                    *d -= 1;
                    return trimmed(digits);
                }
            }
        }
        digits.insert(0, b'1');
        trimmed(digits)
    }
    fn trimmed(digits: Vec<u8>) -> String {
        let s = String::from_utf8(digits).unwrap();
        match s.trim_start_matches('0') {
            "" => "0".to_string(),
            rest => rest.to_string(),
        }
    }
    match n.strip_prefix('-') {
        Some(magnitude) => match step(magnitude, false).as_str() {
            "0" => "0".to_string(),
            m => format!("-{}", m),
        },
        None => step(n, true),
    }
}

#[test_case("0", "1")]
#[test_case("9", "10")]
#[test_case("-1", "0"; "minus one")]
#[test_case("-10", "-9"; "minus ten")]
#[test_case("1999", "2000")]
fn successor_helper(n: &str, expected: &str) {
    assert_eq!(successor(n), expected);
}

#[test]
fn floor_round_ceil_are_ordered() {
    let inputs = [
        "0",
        "0.5",
        "-0.5",
        "1.0001",
        "-1.0001",
        "123456789012345678901234567890.5",
        "-98765432109876543210.49",
        WIDE_NINES,
        WIDE_FOURS,
    ];
    for input in inputs {
        let (f, r, c) = (floor(input).unwrap(), round(input).unwrap(), ceil(input).unwrap());
        assert_ne!(compare(&f, input).unwrap(), Ordering::Greater, "floor({})", input);
        assert_ne!(compare(&c, input).unwrap(), Ordering::Less, "ceil({})", input);
        assert_ne!(compare(&f, &r).unwrap(), Ordering::Greater, "{}", input);
        assert_ne!(compare(&r, &c).unwrap(), Ordering::Greater, "{}", input);
        // ceil - floor is 0 for integers and 1 otherwise
        let expected_ceil = if compare(&f, input).unwrap() == Ordering::Equal {
            f.clone()
        } else {
            successor(&f)
        };
        assert_eq!(c, expected_ceil, "ceil({}) - floor({})", input, input);
    }
}

#[test]
fn integers_are_fixed_points() {
    for input in ["0", "-3", "17", WIDE_LOW, WIDE_HIGH] {
        assert_eq!(round(input).unwrap(), input);
        assert_eq!(ceil(input).unwrap(), input);
        assert_eq!(floor(input).unwrap(), input);
    }
}

#[test_case("-0.000", "0")]
#[test_case("+001.2300", "1.23")]
#[test_case("5.", "5")]
#[test_case(".25", "0.25")]
fn normalizes(input: &str, expected: &str) {
    assert_eq!(normalize(input).unwrap(), expected);
}

#[test_case("5", "5.00", Ordering::Equal)]
#[test_case("-0", "0", Ordering::Equal)]
#[test_case("10", "9.999", Ordering::Greater)]
#[test_case("-10", "-9.999", Ordering::Less; "negative magnitudes")]
#[test_case("-1", "0.5", Ordering::Less)]
#[test_case(WIDE_NINES, WIDE_HIGH, Ordering::Less)]
fn compares_exactly(a: &str, b: &str, expected: Ordering) {
    assert_eq!(compare(a, b).unwrap(), expected);
    assert_eq!(compare(b, a).unwrap(), expected.reverse());
}
