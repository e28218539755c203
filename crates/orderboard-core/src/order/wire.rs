//! Lenient decoding of spreadsheet-backed JSON.
//!
//! The remote store is not strictly typed: a timestamp may come back as a
//! number, a numeric string or a date string, a flag as `"TRUE"`, an id as
//! a number. These helpers accept all of those shapes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;

use super::{DurationUnit, OrderResult, OrderStatus};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// Parse a timestamp string into epoch milliseconds.
///
/// Accepts integer or decimal milliseconds, RFC 3339, and naive
/// `YYYY-MM-DD[THH:MM[:SS]]` forms. Naive values are read in `tz`; a bare
/// date means midnight.
pub fn parse_timestamp<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(ms) = text.parse::<i64>() {
        return Some(ms);
    }
    if let Ok(ms) = text.parse::<f64>() {
        return ms.is_finite().then(|| ms.round() as i64);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

pub(crate) fn epoch_ms<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Int(ms)) => Ok(ms),
        Some(Loose::Float(ms)) if ms.is_finite() => Ok(ms.round() as i64),
        Some(Loose::Text(text)) => parse_timestamp(&text, &Utc)
            .ok_or_else(|| de::Error::custom(format!("unparseable timestamp '{text}'"))),
        _ => Err(de::Error::custom("expected a timestamp")),
    }
}

pub(crate) fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Option::<Loose>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Loose::Int(n)) => Ok(n as f64),
        Some(Loose::Float(n)) => Ok(n),
        Some(Loose::Text(text)) if text.trim().is_empty() => Ok(0.0),
        Some(Loose::Text(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| de::Error::custom(format!("expected a number, got '{text}'"))),
        Some(Loose::Bool(_)) => Err(de::Error::custom("expected a number, got a boolean")),
    }
}

pub(crate) fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Int(n)) => Ok(n.to_string()),
        Some(Loose::Float(n)) if n.fract() == 0.0 && n.is_finite() => Ok(format!("{}", n as i64)),
        Some(Loose::Float(n)) => Ok(n.to_string()),
        Some(Loose::Text(text)) if !text.is_empty() => Ok(text),
        _ => Err(de::Error::custom("order id is missing")),
    }
}

pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        None => String::new(),
        Some(Loose::Text(text)) => text,
        Some(Loose::Int(n)) => n.to_string(),
        Some(Loose::Float(n)) => n.to_string(),
        Some(Loose::Bool(b)) => b.to_string(),
    })
}

pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Bool(b)) => b,
        Some(Loose::Int(n)) => n != 0,
        Some(Loose::Float(n)) => n != 0.0,
        Some(Loose::Text(text)) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        ),
        None => false,
    })
}

/// Anything other than `"completed"` counts as active, matching how the
/// board has always filtered orders.
pub(crate) fn status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OrderStatus, D::Error> {
    let raw = text(deserializer)?;
    Ok(if raw.trim().eq_ignore_ascii_case("completed") {
        OrderStatus::Completed
    } else {
        OrderStatus::Active
    })
}

pub(crate) fn result<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<OrderResult>, D::Error> {
    let raw = text(deserializer)?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse::<OrderResult>().map(Some).map_err(de::Error::custom)
}

/// Blank or missing means the record predates the unit tag.
pub(crate) fn duration_unit<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DurationUnit>, D::Error> {
    let raw = text(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "hours" => Ok(Some(DurationUnit::Hours)),
        "minutes" => Ok(Some(DurationUnit::Minutes)),
        other => Err(de::Error::custom(format!("unknown duration unit '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;
    use chrono::FixedOffset;
    use serde_json::json;

    #[test]
    fn timestamp_accepts_numbers_and_dates() {
        assert_eq!(parse_timestamp("1700000000000", &Utc), Some(1_700_000_000_000));
        assert_eq!(parse_timestamp("1700000000000.4", &Utc), Some(1_700_000_000_000));
        assert_eq!(parse_timestamp("1970-01-01T00:00:01Z", &Utc), Some(1_000));
        assert_eq!(parse_timestamp("1970-01-01T01:00", &Utc), Some(3_600_000));
        assert_eq!(parse_timestamp("1970-01-02", &Utc), Some(86_400_000));
        assert_eq!(parse_timestamp("soon", &Utc), None);
    }

    #[test]
    fn naive_timestamp_uses_given_zone() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(
            parse_timestamp("1970-01-01T08:00", &tz),
            Some(0),
        );
    }

    #[test]
    fn decodes_stringly_typed_row() {
        let row = json!({
            "id": 1700000000000i64,
            "customerName": "Acme",
            "orderDetails": "",
            "resource": "Machine A",
            "startTime": "1700000000000",
            "dueTime": "2023-11-14T23:13:20.000Z",
            "duration": "1.5",
            "notified": "TRUE",
            "status": "completed",
            "result": "fail"
        });
        let order: Order = serde_json::from_value(row).unwrap();
        assert_eq!(order.id, "1700000000000");
        assert_eq!(order.start_time, 1_700_000_000_000);
        assert_eq!(order.due_time, 1_700_003_600_000);
        assert_eq!(order.duration, 1.5);
        assert!(order.notified);
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.result, Some(OrderResult::Fail));
        assert_eq!(order.duration_unit, None);
    }

    #[test]
    fn blank_cells_fall_back_to_defaults() {
        let row = json!({
            "id": "42",
            "startTime": 0,
            "dueTime": 60000,
            "duration": "",
            "notified": "",
            "status": "",
            "result": ""
        });
        let order: Order = serde_json::from_value(row).unwrap();
        assert_eq!(order.customer_name, "");
        assert_eq!(order.duration, 0.0);
        assert!(!order.notified);
        assert_eq!(order.status, OrderStatus::Active);
        assert_eq!(order.result, None);
    }

    #[test]
    fn blank_duration_unit_reads_as_untagged() {
        let row = json!({
            "id": "1",
            "startTime": 0,
            "dueTime": 3_600_000,
            "duration": 60,
            "durationUnit": ""
        });
        let order: Order = serde_json::from_value(row).unwrap();
        assert_eq!(order.duration_unit, None);

        let row = json!({ "id": "2", "startTime": 0, "dueTime": 0, "durationUnit": null });
        assert_eq!(serde_json::from_value::<Order>(row).unwrap().duration_unit, None);

        let row = json!({ "id": "3", "startTime": 0, "dueTime": 0, "durationUnit": " Minutes " });
        assert_eq!(
            serde_json::from_value::<Order>(row).unwrap().duration_unit,
            Some(DurationUnit::Minutes)
        );

        let row = json!({ "id": "4", "startTime": 0, "dueTime": 0, "durationUnit": "days" });
        assert!(serde_json::from_value::<Order>(row).is_err());
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        let row = json!({ "id": "1", "startTime": "later", "dueTime": 0 });
        assert!(serde_json::from_value::<Order>(row).is_err());
    }
}
