use serde::de::Error;
use serde::{Deserialize, Deserializer};

/// Counters and ids arrive either as JSON numbers or as numeric strings
/// depending on the endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl Loose {
    fn to_i64<E: Error>(&self) -> Result<Option<i64>, E> {
        match self {
            Loose::Int(n) => Ok(Some(*n)),
            Loose::UInt(n) => i64::try_from(*n).map(Some).map_err(E::custom),
            Loose::Float(f) => Ok(Some(*f as i64)),
            Loose::Str(s) if s.trim().is_empty() => Ok(None),
            Loose::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| E::custom(format!("expected a number, got {s:?}"))),
        }
    }

    fn to_u64<E: Error>(&self) -> Result<Option<u64>, E> {
        match self {
            Loose::UInt(n) => Ok(Some(*n)),
            Loose::Int(n) => u64::try_from(*n).map(Some).map_err(E::custom),
            Loose::Float(f) if *f >= 0.0 => Ok(Some(*f as u64)),
            Loose::Float(f) => Err(E::custom(format!("expected a non-negative number, got {f}"))),
            Loose::Str(s) if s.trim().is_empty() => Ok(None),
            Loose::Str(s) => s
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| E::custom(format!("expected a number, got {s:?}"))),
        }
    }

    fn into_string(self) -> String {
        match self {
            Loose::Int(n) => n.to_string(),
            Loose::UInt(n) => n.to_string(),
            Loose::Float(f) => f.to_string(),
            Loose::Str(s) => s,
        }
    }
}

pub fn opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    match Option::<Loose>::deserialize(d)? {
        Some(v) => v.to_u64(),
        None => Ok(None),
    }
}

pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    match Option::<Loose>::deserialize(d)? {
        Some(v) => v.to_i64(),
        None => Ok(None),
    }
}

/// Ids and cursors: accept a string or a number, keep it as text.
pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Loose>::deserialize(d)?.map(Loose::into_string))
}
