//! Scalar text conversions used by the serde driver.
//!
//! Nodes keep scalars as text; these helpers give them a type once the target field
//! asks for one. Failures return a short reason that the archive turns into a full
//! diagnostic.

/// Parse a YAML 1.1 boolean (handles the "Norway problem" by accepting it).
///
/// Accepted TRUE literals (case-insensitive): "y", "yes", "true", "on"
/// Accepted FALSE literals (case-insensitive): "n", "no", "false", "off"
pub(crate) fn parse_yaml11_bool(s: &str) -> Result<bool, String> {
    let t = s.trim();
    const TRUE: [&str; 4] = ["true", "yes", "y", "on"];
    const FALSE: [&str; 4] = ["false", "no", "n", "off"];
    if TRUE.iter().any(|lit| t.eq_ignore_ascii_case(lit)) {
        Ok(true)
    } else if FALSE.iter().any(|lit| t.eq_ignore_ascii_case(lit)) {
        Ok(false)
    } else {
        Err(format!("invalid YAML 1.1 bool: `{s}`"))
    }
}

/// Strip an optional `0x`/`0o`/`0b` prefix.
fn split_radix(rest: &str) -> (u32, &str) {
    let lower = |p: &str, q: &str| rest.strip_prefix(p).or_else(|| rest.strip_prefix(q));
    if let Some(r) = lower("0x", "0X") {
        (16, r)
    } else if let Some(r) = lower("0o", "0O") {
        (8, r)
    } else if let Some(r) = lower("0b", "0B") {
        (2, r)
    } else {
        (10, rest)
    }
}

/// Magnitude of `digits` in `radix`; `_` separators are skipped.
fn parse_magnitude(digits: &str, radix: u32) -> Option<u128> {
    let mut val: u128 = 0;
    let mut saw = false;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let d = c.to_digit(radix)?;
        val = val.checked_mul(radix as u128)?.checked_add(d as u128)?;
        saw = true;
    }
    saw.then_some(val)
}

fn split_sign(t: &str) -> (bool, &str) {
    match t.strip_prefix('+') {
        Some(r) => (false, r),
        None => match t.strip_prefix('-') {
            Some(r) => (true, r),
            None => (false, t),
        },
    }
}

pub(crate) fn parse_int_signed<T>(s: &str, ty: &'static str) -> Result<T, String>
where
    T: TryFrom<i128>,
{
    let invalid = || format!("invalid {ty}: `{s}`");
    let (neg, rest) = split_sign(s.trim());
    let (radix, digits) = split_radix(rest);
    let mag = parse_magnitude(digits, radix).ok_or_else(invalid)?;
    let value: i128 = if neg {
        // i128::MIN has no positive counterpart
        if mag == i128::MIN.unsigned_abs() {
            i128::MIN
        } else {
            i128::try_from(mag).map_err(|_| invalid())?.checked_neg().ok_or_else(invalid)?
        }
    } else {
        i128::try_from(mag).map_err(|_| invalid())?
    };
    T::try_from(value).map_err(|_| invalid())
}

pub(crate) fn parse_int_unsigned<T>(s: &str, ty: &'static str) -> Result<T, String>
where
    T: TryFrom<u128>,
{
    let invalid = || format!("invalid {ty}: `{s}`");
    let t = s.trim();
    if t.starts_with('-') {
        return Err(invalid());
    }
    let rest = t.strip_prefix('+').unwrap_or(t);
    let (radix, digits) = split_radix(rest);
    let mag = parse_magnitude(digits, radix).ok_or_else(invalid)?;
    T::try_from(mag).map_err(|_| invalid())
}

pub(crate) fn parse_yaml12_f64(s: &str) -> Result<f64, String> {
    let t = s.trim();
    match t.to_ascii_lowercase().as_str() {
        ".nan" | "+.nan" | "-.nan" => Ok(f64::NAN),
        ".inf" | "+.inf" => Ok(f64::INFINITY),
        "-.inf" => Ok(f64::NEG_INFINITY),
        _ => t
            .replace('_', "")
            .parse::<f64>()
            .map_err(|_| format!("invalid floating point value: `{s}`")),
    }
}

pub(crate) fn parse_yaml12_f32(s: &str) -> Result<f32, String> {
    parse_yaml12_f64(s).map(|v| v as f32)
}

/// Best guess of a scalar's type when the target does not say (`deserialize_any`).
#[derive(Debug, PartialEq)]
pub(crate) enum Inferred<'a> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(&'a str),
}

pub(crate) fn infer(s: &str) -> Inferred<'_> {
    match s {
        "true" | "True" | "TRUE" => return Inferred::Bool(true),
        "false" | "False" | "FALSE" => return Inferred::Bool(false),
        _ => {}
    }
    let starts_numeric = s
        .trim_start_matches(['+', '-'])
        .starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if !starts_numeric {
        return Inferred::Str(s);
    }
    if let Ok(v) = parse_int_signed::<i64>(s, "i64") {
        return Inferred::Int(v);
    }
    if let Ok(v) = parse_int_unsigned::<u64>(s, "u64") {
        return Inferred::UInt(v);
    }
    match parse_yaml12_f64(s) {
        Ok(v) => Inferred::Float(v),
        Err(_) => Inferred::Str(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans() {
        assert_eq!(parse_yaml11_bool("Yes"), Ok(true));
        assert_eq!(parse_yaml11_bool("off"), Ok(false));
        assert!(parse_yaml11_bool("maybe").is_err());
    }

    #[test]
    fn integers_with_bases_and_separators() {
        assert_eq!(parse_int_signed::<i32>("-0x1F", "i32"), Ok(-31));
        assert_eq!(parse_int_signed::<i64>("1_000", "i64"), Ok(1000));
        assert_eq!(parse_int_unsigned::<u8>("0b1010", "u8"), Ok(10));
        assert_eq!(parse_int_signed::<i128>(&i128::MIN.to_string(), "i128"), Ok(i128::MIN));
        assert!(parse_int_unsigned::<u8>("256", "u8").is_err());
        assert!(parse_int_unsigned::<u32>("-1", "u32").is_err());
        assert!(parse_int_signed::<i32>("12abc", "i32").is_err());
        assert!(parse_int_signed::<i32>("", "i32").is_err());
    }

    #[test]
    fn floats() {
        assert_eq!(parse_yaml12_f64("-.inf"), Ok(f64::NEG_INFINITY));
        assert!(parse_yaml12_f64(".NaN").unwrap().is_nan());
        assert_eq!(parse_yaml12_f64("1e3"), Ok(1000.0));
        assert!(parse_yaml12_f64("one").is_err());
    }

    #[test]
    fn inference() {
        assert_eq!(infer("true"), Inferred::Bool(true));
        assert_eq!(infer("-5"), Inferred::Int(-5));
        assert_eq!(infer("18446744073709551615"), Inferred::UInt(u64::MAX));
        assert_eq!(infer("2.5"), Inferred::Float(2.5));
        assert_eq!(infer("bob"), Inferred::Str("bob"));
        assert_eq!(infer("1.2.3"), Inferred::Str("1.2.3"));
    }
}
