//! Parse a status attribute map into a ResponseStatus.

use std::time::Duration;

use serde_json::{Map, Value};

use super::{
    ResponseStatus, ACTIVITY_ID, REQUEST_CHARGE, RETRY_AFTER, RETRY_AFTER_MS, STATUS_CODE,
    SUB_STATUS_CODE, TOTAL_REQUEST_CHARGE,
};

/// A present attribute whose value cannot be interpreted.
struct Malformed;

type Field<T> = Result<Option<T>, Malformed>;

/// Build a [`ResponseStatus`] from the attributes attached to a response.
///
/// `Value::Null` (no attributes at all) yields a status with every field
/// absent. Anything that is not a JSON object, or an object with a
/// recognised key holding garbage, yields [`ResponseStatus::malformed`].
pub fn extract(attributes: &Value) -> ResponseStatus {
    match attributes {
        Value::Null => ResponseStatus::default(),
        Value::Object(map) => from_map(map).unwrap_or_else(|Malformed| {
            tracing::warn!("could not interpret status attributes: {}", attributes);
            ResponseStatus::malformed()
        }),
        other => {
            tracing::warn!("status attributes are not an object: {}", other);
            ResponseStatus::malformed()
        }
    }
}

/// Parse a retry-after attribute value.
///
/// Accepts milliseconds as a JSON number or numeric string, or a TimeSpan
/// string such as `00:00:00.2000000`. Returns `None` for absent or
/// uninterpretable values.
pub fn parse_retry_after(value: &Value) -> Option<Duration> {
    retry_after_value(value).ok().flatten()
}

fn from_map(map: &Map<String, Value>) -> Result<ResponseStatus, Malformed> {
    let retry_after = match map.get(RETRY_AFTER_MS) {
        Some(v) if !v.is_null() => retry_after_value(v)?,
        _ => optional(map.get(RETRY_AFTER), retry_after_value)?,
    };
    let request_charge = match optional(map.get(TOTAL_REQUEST_CHARGE), f64_value)? {
        Some(c) => Some(c),
        None => optional(map.get(REQUEST_CHARGE), f64_value)?,
    };

    Ok(ResponseStatus {
        status_code: optional(map.get(STATUS_CODE), i64_value)?,
        sub_status_code: optional(map.get(SUB_STATUS_CODE), i64_value)?,
        retry_after,
        request_charge,
        activity_id: optional(map.get(ACTIVITY_ID), string_value)?,
        extraction_failed: false,
    })
}

fn optional<T>(value: Option<&Value>, parse: fn(&Value) -> Field<T>) -> Field<T> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse(v),
    }
}

fn i64_value(value: &Value) -> Field<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.is_finite() => Ok(Some(f as i64)),
                _ => Err(Malformed),
            }
        }
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<i64>().map(Some).map_err(|_| Malformed),
        _ => Err(Malformed),
    }
}

fn f64_value(value: &Value) -> Field<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64().ok_or(Malformed)?,
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| Malformed)?,
        _ => return Err(Malformed),
    };
    if f.is_finite() {
        Ok(Some(f))
    } else {
        Err(Malformed)
    }
}

fn string_value(value: &Value) -> Field<String> {
    match value {
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.trim().to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(Malformed),
    }
}

fn retry_after_value(value: &Value) -> Field<Duration> {
    match value {
        Value::Null => Ok(None),
        Value::Number(_) => millis(f64_value(value)?),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if s.contains(':') {
                return timespan(s).map(Some);
            }
            millis(s.parse::<f64>().ok())
        }
        _ => Err(Malformed),
    }
}

fn millis(ms: Option<f64>) -> Field<Duration> {
    match ms {
        Some(ms) if ms.is_finite() && ms >= 0.0 => {
            Ok(Some(Duration::from_nanos((ms * 1_000_000.0).round() as u64)))
        }
        _ => Err(Malformed),
    }
}

/// `[d.]hh:mm:ss[.fffffff]`
fn timespan(s: &str) -> Result<Duration, Malformed> {
    let mut parts = s.splitn(3, ':');
    let (Some(h), Some(m), Some(sec)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Malformed);
    };
    let (days, hours) = match h.split_once('.') {
        Some((d, h)) => (parse_u64(d)?, parse_u64(h)?),
        None => (0, parse_u64(h)?),
    };
    let minutes = parse_u64(m)?;
    let (seconds, nanos) = match sec.split_once('.') {
        Some((s, frac)) => (parse_u64(s)?, fraction_nanos(frac)?),
        None => (parse_u64(sec)?, 0),
    };
    if minutes >= 60 || seconds >= 60 {
        return Err(Malformed);
    }
    let whole = days
        .checked_mul(86_400)
        .and_then(|d| hours.checked_mul(3_600).and_then(|h| d.checked_add(h)))
        .and_then(|t| t.checked_add(minutes * 60 + seconds))
        .ok_or(Malformed)?;
    Ok(Duration::new(whole, nanos))
}

/// Fractional-second digits to nanoseconds; digits past the ninth are dropped.
fn fraction_nanos(frac: &str) -> Result<u32, Malformed> {
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Malformed);
    }
    let digits: String = frac.chars().chain(std::iter::repeat('0')).take(9).collect();
    digits.parse().map_err(|_| Malformed)
}

fn parse_u64(s: &str) -> Result<u64, Malformed> {
    s.parse().map_err(|_| Malformed)
}
