use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;
const WEEK_MS: i64 = 7 * DAY_MS;

/// Placeholder used in the location list.
pub const FALLBACK_DASH: &str = "—";
/// Placeholder used on the location detail card.
pub const FALLBACK_UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocationRecord {
    pub ip: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub last_seen: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recency {
    pub recent: bool,
    pub text: String,
}

impl Recency {
    fn unknown(fallback: &str) -> Self {
        Self {
            recent: false,
            text: fallback.to_string(),
        }
    }
}

/// Classifies a last-seen timestamp against `now`.
///
/// `recent` is set for anything strictly younger than 24 hours. Missing or
/// unparseable timestamps never error; they come back as `fallback`. The
/// absolute date shown for entries a week or older is rendered in `now`'s
/// timezone.
pub fn classify<Tz>(last_seen: Option<&str>, now: &DateTime<Tz>, fallback: &str) -> Recency
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let Some(raw) = last_seen else {
        return Recency::unknown(fallback);
    };
    let Some(seen) = parse_timestamp(raw) else {
        debug!(timestamp = raw, "unparseable last-seen timestamp");
        return Recency::unknown(fallback);
    };

    let age_ms = now.timestamp_millis() - seen.timestamp_millis();
    let text = if age_ms < MINUTE_MS {
        "Just now".to_string()
    } else if age_ms < HOUR_MS {
        format!("{}m ago", age_ms / MINUTE_MS)
    } else if age_ms < DAY_MS {
        format!("{}h ago", age_ms / HOUR_MS)
    } else if age_ms < WEEK_MS {
        format!("{}d ago", age_ms / DAY_MS)
    } else {
        seen.with_timezone(&now.timezone())
            .format("%-m/%-d/%Y")
            .to_string()
    };

    Recency {
        recent: age_ms < DAY_MS,
        text,
    }
}

/// Accepts RFC 3339, an ISO date-time without offset (read as UTC), or a bare
/// `YYYY-MM-DD` (UTC midnight).
fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }

    let utc = FixedOffset::east_opt(0)?;
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| utc.from_utc_datetime(&midnight))
}

/// "City, Region, Country" from whichever parts are present.
pub fn location_label(record: &GeoLocationRecord) -> String {
    let parts: Vec<&str> = [&record.city, &record.region, &record.country]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        "Unknown location".to_string()
    } else {
        parts.join(", ")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedLocation {
    pub ip: String,
    pub label: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub last_seen: Option<String>,
    pub recent: bool,
    pub seen: String,
}

/// Classifies every record and orders them newest first. Records whose
/// timestamp is missing or unreadable sort last, keeping their input order.
pub fn classify_locations(
    records: &[GeoLocationRecord],
    now: DateTime<Utc>,
    fallback: &str,
) -> Vec<ClassifiedLocation> {
    let mut keyed: Vec<(Option<i64>, ClassifiedLocation)> = records
        .iter()
        .map(|record| {
            let last_seen = record.last_seen.as_deref();
            let recency = classify(last_seen, &now, fallback);
            let sort_key = last_seen
                .and_then(parse_timestamp)
                .map(|seen| seen.timestamp_millis());
            let location = ClassifiedLocation {
                ip: record.ip.clone(),
                label: location_label(record),
                latitude: record.latitude,
                longitude: record.longitude,
                last_seen: record.last_seen.clone(),
                recent: recency.recent,
                seen: recency.text,
            };
            (sort_key, location)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
    keyed.into_iter().map(|(_, location)| location).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap()
    }

    fn ago(duration: Duration) -> String {
        (now() - duration).to_rfc3339()
    }

    fn check(duration: Duration) -> Recency {
        classify(Some(ago(duration).as_str()), &now(), FALLBACK_DASH)
    }

    #[test]
    fn missing_timestamp_uses_fallback() {
        let recency = classify(None, &now(), FALLBACK_UNKNOWN);
        assert_eq!(recency, Recency { recent: false, text: "Unknown".into() });
    }

    #[test]
    fn malformed_timestamp_uses_fallback() {
        for raw in ["", "yesterday", "2024-13-40T00:00:00Z", "1710084600"] {
            let recency = classify(Some(raw), &now(), FALLBACK_DASH);
            assert!(!recency.recent, "{raw}");
            assert_eq!(recency.text, FALLBACK_DASH, "{raw}");
        }
    }

    #[test]
    fn under_a_minute_is_just_now() {
        assert_eq!(check(Duration::seconds(30)), Recency { recent: true, text: "Just now".into() });
        assert_eq!(check(Duration::seconds(59)).text, "Just now");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let recency = check(Duration::minutes(-5));
        assert!(recency.recent);
        assert_eq!(recency.text, "Just now");
    }

    #[test]
    fn minutes_bucket_floors() {
        assert_eq!(check(Duration::seconds(60)).text, "1m ago");
        assert_eq!(check(Duration::seconds(59 * 60 + 59)).text, "59m ago");
    }

    #[test]
    fn hours_bucket_floors() {
        let recency = check(Duration::minutes(90));
        assert_eq!(recency, Recency { recent: true, text: "1h ago".into() });
        assert_eq!(check(Duration::minutes(23 * 60 + 59)).text, "23h ago");
    }

    #[test]
    fn recent_boundary_is_exclusive_at_24_hours() {
        assert!(check(Duration::minutes(23 * 60 + 59)).recent);
        let day_old = check(Duration::hours(24));
        assert!(!day_old.recent);
        assert_eq!(day_old.text, "1d ago");
    }

    #[test]
    fn days_bucket() {
        assert_eq!(check(Duration::days(3)), Recency { recent: false, text: "3d ago".into() });
        assert_eq!(check(Duration::days(7) - Duration::milliseconds(1)).text, "6d ago");
    }

    #[test]
    fn week_or_older_shows_calendar_date() {
        let recency = check(Duration::days(7));
        assert!(!recency.recent);
        assert_eq!(recency.text, "3/3/2024");
    }

    #[test]
    fn absolute_date_follows_viewer_offset() {
        let seen = "2024-01-01T02:00:00Z";
        let utc = classify(Some(seen), &now(), FALLBACK_DASH);
        assert_eq!(utc.text, "1/1/2024");

        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let local = classify(Some(seen), &now().with_timezone(&pacific), FALLBACK_DASH);
        assert_eq!(local.text, "12/31/2023");
    }

    #[test]
    fn offset_less_and_date_only_timestamps_parse_as_utc() {
        assert_eq!(classify(Some("2024-03-10T15:00:00"), &now(), FALLBACK_DASH).text, "30m ago");
        assert_eq!(classify(Some("2024-03-10 13:30:00.250"), &now(), FALLBACK_DASH).text, "1h ago");
        assert_eq!(classify(Some("2024-03-08"), &now(), FALLBACK_DASH).text, "2d ago");
    }

    #[test]
    fn offsets_are_honoured() {
        let recency = classify(Some("2024-03-10T16:00:00+02:00"), &now(), FALLBACK_DASH);
        assert_eq!(recency.text, "1h ago");
    }

    #[test]
    fn label_skips_missing_parts() {
        let mut record = GeoLocationRecord {
            ip: "10.0.0.1".into(),
            city: Some("Lyon".into()),
            country: Some("France".into()),
            ..Default::default()
        };
        assert_eq!(location_label(&record), "Lyon, France");

        record.city = Some("  ".into());
        record.country = None;
        assert_eq!(location_label(&record), "Unknown location");
    }

    #[test]
    fn locations_sorted_newest_first_with_unknowns_last() {
        let records = vec![
            GeoLocationRecord { ip: "a".into(), last_seen: None, ..Default::default() },
            GeoLocationRecord { ip: "b".into(), last_seen: Some(ago(Duration::days(2))), ..Default::default() },
            GeoLocationRecord { ip: "c".into(), last_seen: Some("garbage".into()), ..Default::default() },
            GeoLocationRecord { ip: "d".into(), last_seen: Some(ago(Duration::minutes(5))), ..Default::default() },
        ];

        let classified = classify_locations(&records, now(), FALLBACK_DASH);
        let ips: Vec<&str> = classified.iter().map(|l| l.ip.as_str()).collect();
        assert_eq!(ips, ["d", "b", "a", "c"]);
        assert!(classified[0].recent);
        assert_eq!(classified[0].seen, "5m ago");
        assert!(!classified[1].recent);
        assert_eq!(classified[2].seen, FALLBACK_DASH);
        assert_eq!(classified[2].label, "Unknown location");
    }

    #[test]
    fn record_deserializes_with_missing_fields() {
        let record: GeoLocationRecord = serde_json::from_str(r#"{"ip":"192.0.2.7"}"#).unwrap();
        assert_eq!(record.ip, "192.0.2.7");
        assert!(record.last_seen.is_none());
        assert!(record.city.is_none());
    }
}
