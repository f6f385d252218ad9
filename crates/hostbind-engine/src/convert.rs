//! Type conversion matrix
//!
//! Converts slot values between kinds for host-to-script calls: arguments
//! into the callee's declared slot kinds, and slot 0 into the kind the
//! caller asked for.
//!
//! ```text
//!  from \ to   int    float  bool   string object vector3f
//!  int         =      yes    yes    yes    id?    -
//!  float       trunc  =      yes    yes    -      -
//!  bool        yes    yes    =      yes    -      -
//!  string      atoi   atof   yes    =      atoi   parse
//!  object      id     -      live?  yes    =      -
//!  vector3f    -      -      -      yes    -      =
//! ```
//!
//! Anything converts to `void` (the value is discarded).

use hostbind_sdk::{Kind, ObjectId, ObjectRegistry, SlotValue, Vector3f};

/// Convert `value` to `to`, or `None` when the pair is not convertible
pub fn convert(value: &SlotValue, to: Kind, objects: &dyn ObjectRegistry) -> Option<SlotValue> {
    if value.kind() == to {
        return Some(value.clone());
    }

    match (value, to) {
        (_, Kind::Void) => Some(SlotValue::Void),
        (_, Kind::Unregistered) | (SlotValue::Void, _) => None,
        (SlotValue::String(s), _) => convert_str(s, to),
        (_, Kind::String) => Some(SlotValue::string(value.to_string())),

        (SlotValue::Int(i), Kind::Float) => Some(SlotValue::Float(*i as f32)),
        (SlotValue::Int(i), Kind::Bool) => Some(SlotValue::Bool(*i != 0)),
        (SlotValue::Int(i), Kind::Object) => {
            let id = ObjectId(*i as u32);
            Some(SlotValue::Object(if objects.contains(id) { id } else { ObjectId::NONE }))
        }

        (SlotValue::Float(f), Kind::Int) => Some(SlotValue::Int(*f as i32)),
        (SlotValue::Float(f), Kind::Bool) => Some(SlotValue::Bool(*f != 0.0)),

        (SlotValue::Bool(b), Kind::Int) => Some(SlotValue::Int(*b as i32)),
        (SlotValue::Bool(b), Kind::Float) => Some(SlotValue::Float(if *b { 1.0 } else { 0.0 })),

        (SlotValue::Object(id), Kind::Int) => Some(SlotValue::Int(id.0 as i32)),
        (SlotValue::Object(id), Kind::Bool) => Some(SlotValue::Bool(objects.contains(*id))),

        _ => None,
    }
}

/// Convert a string to `to`, reading it in place
pub fn convert_str(s: &str, to: Kind) -> Option<SlotValue> {
    match to {
        Kind::String => Some(SlotValue::string(s)),
        Kind::Void => Some(SlotValue::Void),
        Kind::Int => Some(SlotValue::Int(atoi(s))),
        Kind::Float => Some(SlotValue::Float(atof(s))),
        Kind::Bool => Some(SlotValue::Bool(string_to_bool(s))),
        Kind::Object => Some(SlotValue::Object(ObjectId(atoi(s) as u32))),
        Kind::Vector3f => string_to_vector3f(s).map(SlotValue::Vector3f),
        Kind::Unregistered => None,
    }
}

/// Lenient integer parse: optional `-`, then `0x` hex, `0b` binary or
/// decimal digits. Parsing stops at the first invalid character.
pub fn atoi(s: &str) -> i32 {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1i32, rest),
        None => (1i32, s),
    };

    let (radix, digits) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (2, bin)
    } else {
        (10, digits)
    };

    let mut result: i32 = 0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => result = result.wrapping_mul(radix as i32).wrapping_add(d as i32),
            None => break,
        }
    }
    sign.wrapping_mul(result)
}

/// Lenient float parse: the longest numeric prefix after leading
/// whitespace, or 0.0 when there is none.
pub fn atof(s: &str) -> f32 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0.0;
    }

    // exponent only counts when followed by at least one digit
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f32>().unwrap_or(0.0)
}

/// False for "", "false", "0", "0.0" and "0.0f"; true otherwise
pub fn string_to_bool(s: &str) -> bool {
    !matches!(s, "" | "false" | "0" | "0.0" | "0.0f")
}

/// Parse "x y z" or "x, y, z"; the empty string is the zero vector
pub fn string_to_vector3f(s: &str) -> Option<Vector3f> {
    if s.is_empty() {
        return Some(Vector3f::ZERO);
    }

    let mut parts = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<f32>());

    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    Some(Vector3f::new(x, y, z))
}
