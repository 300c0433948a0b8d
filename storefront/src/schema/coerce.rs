//! Best-effort coercion of loosely typed stored fields.
//!
//! Values that cannot be converted fall back to a zero default so the document
//! can still advance; callers decide whether to log the loss.

use mongodb::bson::Bson;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coercion<T> {
    /// The stored value already had the expected type.
    Exact(T),
    /// The stored value was converted from another type.
    Converted(T),
    /// The stored value was missing or unusable and was replaced by a default.
    Defaulted(T),
}

impl<T: Copy> Coercion<T> {
    pub fn value(&self) -> T {
        match self {
            Coercion::Exact(v) | Coercion::Converted(v) | Coercion::Defaulted(v) => *v,
        }
    }

    pub fn is_lossy(&self) -> bool {
        matches!(self, Coercion::Defaulted(_))
    }
}

pub fn coerce_f64(value: Option<&Bson>) -> Coercion<f64> {
    match value {
        Some(Bson::Double(v)) if v.is_finite() => Coercion::Exact(*v),
        Some(Bson::Int32(v)) => Coercion::Converted(f64::from(*v)),
        Some(Bson::Int64(v)) => Coercion::Converted(*v as f64),
        Some(Bson::String(s)) => parse_f64(s).map_or(Coercion::Defaulted(0.0), Coercion::Converted),
        Some(Bson::Decimal128(d)) => parse_f64(&d.to_string()).map_or(Coercion::Defaulted(0.0), Coercion::Converted),
        _ => Coercion::Defaulted(0.0),
    }
}

pub fn coerce_i64(value: Option<&Bson>) -> Coercion<i64> {
    match value {
        Some(Bson::Int64(v)) => Coercion::Exact(*v),
        Some(Bson::Int32(v)) => Coercion::Converted(i64::from(*v)),
        Some(Bson::Double(v)) if v.is_finite() => Coercion::Converted(v.trunc() as i64),
        Some(Bson::String(s)) => match s.trim().parse::<i64>() {
            Ok(v) => Coercion::Converted(v),
            Err(_) => parse_f64(s).map_or(Coercion::Defaulted(0), |v| Coercion::Converted(v.trunc() as i64)),
        },
        _ => Coercion::Defaulted(0),
    }
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
