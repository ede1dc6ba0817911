// SPDX-License-Identifier: MIT

//! Decoding of the packed HID Unit value, see Section 6.2.2.7. A unit
//! packs a measurement system into the lowest nibble and one signed 4-bit
//! exponent per dimension into the nibbles above it.

use crate::types::{Unit, UnitExponent};

/// Unit symbols per measurement system, in dimension nibble order:
/// length, mass, time, temperature, current, luminous intensity.
const SYSTEMS: [[&str; 6]; 4] = [
    ["cm", "g", "s", "K", "A", "cd"],      // SI Linear
    ["rad", "g", "s", "K", "A", "cd"],     // SI Rotation
    ["inch", "slug", "s", "F", "A", "cd"], // English Linear
    ["deg", "slug", "s", "F", "A", "cd"],  // English Rotation
];

/// A 4-bit exponent is signed: values above 7 wrap to negative.
fn nibble_exponent(nibble: u32) -> i32 {
    let nibble = nibble as i32;
    if nibble > 7 {
        nibble - 16
    } else {
        nibble
    }
}

/// The per-dimension `(symbol, exponent)` factors of a unit, skipping
/// dimensions with a zero exponent. `None` if the system nibble is not
/// one of the four defined measurement systems. The reserved 8th nibble
/// is ignored.
pub fn factors(unit: Unit) -> Option<Vec<(&'static str, i32)>> {
    let raw = u32::from(unit);
    let symbols = match raw & 0xf {
        system @ 1..=4 => &SYSTEMS[(system - 1) as usize],
        _ => return None,
    };
    let factors = symbols
        .iter()
        .enumerate()
        .filter_map(|(dimension, symbol)| {
            let exponent = nibble_exponent((raw >> (4 * (dimension + 1))) & 0xf);
            (exponent != 0).then_some((*symbol, exponent))
        })
        .collect();
    Some(factors)
}

/// A display label for a unit: the non-zero factors joined by single
/// spaces, e.g. `deg` or `cm^2 g s^-2`. A unit from an undefined
/// measurement system renders as its raw value in hex.
pub fn label(unit: Unit) -> String {
    match factors(unit) {
        Some(factors) => factors
            .iter()
            .map(|(symbol, exponent)| match exponent {
                1 => (*symbol).to_string(),
                _ => format!("{symbol}^{exponent}"),
            })
            .collect::<Vec<_>>()
            .join(" "),
        None => format!("{:#x}", u32::from(unit)),
    }
}

/// The scale factor `10^e` declared by a Unit Exponent item, 1.0 when the
/// item is absent. The stored value wraps like a nibble: above 7 means
/// negative.
pub fn multiplier(exponent: Option<UnitExponent>) -> f64 {
    let raw = exponent.map_or(0, u32::from);
    let exponent = if raw > 7 {
        i64::from(raw) - 16
    } else {
        i64::from(raw)
    };
    10f64.powf(exponent as f64)
}

/// Formats like C's `%.15g`: at most 15 significant digits, trailing
/// zeros trimmed, scientific notation with a signed two-digit exponent
/// once the value leaves the fixed-notation range.
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return String::from(if value.is_sign_negative() { "-0" } else { "0" });
    }
    // The notation depends on the decimal exponent of the value *after*
    // rounding to 15 significant digits.
    let sci = format!("{value:.14e}");
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exponent: i32 = match exponent.parse() {
        Ok(exponent) => exponent,
        Err(_) => return sci,
    };
    if !(-4..15).contains(&exponent) {
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        let decimals = (14 - exponent).max(0) as usize;
        let fixed = format!("{value:.decimals$}");
        if fixed.contains('.') {
            fixed
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string()
        } else {
            fixed
        }
    }
}
