use crate::calendar::{CalendarDate, DateRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesKey {
    Movies,
    Tv,
    LiveTv,
    Music,
    Audiobooks,
    Books,
}

impl SeriesKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SeriesKey::Movies => "movies",
            SeriesKey::Tv => "tv",
            SeriesKey::LiveTv => "live-tv",
            SeriesKey::Music => "music",
            SeriesKey::Audiobooks => "audiobooks",
            SeriesKey::Books => "books",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesDescriptor {
    pub key: SeriesKey,
    pub label: &'static str,
    pub color: &'static str,
}

pub const SERIES: [SeriesDescriptor; 6] = [
    SeriesDescriptor { key: SeriesKey::Movies, label: "Movies", color: "#3b82f6" },
    SeriesDescriptor { key: SeriesKey::Tv, label: "TV Shows", color: "#10b981" },
    SeriesDescriptor { key: SeriesKey::LiveTv, label: "Live TV", color: "#ef4444" },
    SeriesDescriptor { key: SeriesKey::Music, label: "Music", color: "#f59e0b" },
    SeriesDescriptor { key: SeriesKey::Audiobooks, label: "Audiobooks", color: "#8b5cf6" },
    SeriesDescriptor { key: SeriesKey::Books, label: "Books", color: "#ec4899" },
];

/// Per-day play counts as delivered by the stats source, e.g.
/// `{"date": "2024-03-03", "movies": 2, "tv": 5}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatRecord {
    pub date: CalendarDate,
    #[serde(flatten)]
    pub counts: BTreeMap<String, u64>,
}

impl DayStatRecord {
    pub fn value(&self, key: SeriesKey) -> u64 {
        self.counts.get(key.as_str()).copied().unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
pub struct ChartTick {
    pub date: CalendarDate,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct ChartSeries {
    pub key: SeriesKey,
    pub label: &'static str,
    pub color: &'static str,
    pub values: Vec<u64>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct ShapedChart {
    pub range: DateRange,
    pub ticks: Vec<ChartTick>,
    pub series: Vec<ChartSeries>,
    pub has_data: bool,
}

/// True when some record holds a positive count for one of `series`.
///
/// An empty slice and a slice of all-zero records both report `false`; either
/// way there is nothing worth charting.
pub fn has_any_data<'a, I>(records: I, series: &[SeriesDescriptor]) -> bool
where
    I: IntoIterator<Item = &'a DayStatRecord>,
{
    records
        .into_iter()
        .any(|record| series.iter().any(|descriptor| record.value(descriptor.key) > 0))
}

/// Short axis label such as `"Mar 3"`.
///
/// Formatted from the UTC-noon instant of the date so that the label is the
/// same calendar day wherever it ends up being displayed.
pub fn format_tick(date: CalendarDate) -> String {
    match date.noon_utc() {
        Some(noon) => noon.format("%b %-d").to_string(),
        None => date.to_string(),
    }
}

pub fn shape_series(
    records: &[DayStatRecord],
    range: DateRange,
    series: &[SeriesDescriptor],
) -> ShapedChart {
    let day_count = range.len_days() as usize;
    let in_range: Vec<&DayStatRecord> = records
        .iter()
        .filter(|record| range.contains(&record.date))
        .collect();

    let series_out = series
        .iter()
        .map(|descriptor| {
            let mut values = vec![0u64; day_count];
            for record in &in_range {
                let index = range.start.days_until(&record.date) as usize;
                values[index] = values[index].saturating_add(record.value(descriptor.key));
            }
            let total = values.iter().fold(0u64, |sum, value| sum.saturating_add(*value));
            ChartSeries {
                key: descriptor.key,
                label: descriptor.label,
                color: descriptor.color,
                values,
                total,
            }
        })
        .collect();

    let ticks = range
        .days()
        .map(|date| ChartTick {
            date,
            label: format_tick(date),
        })
        .collect();

    let has_data = has_any_data(in_range.iter().copied(), series);

    ShapedChart {
        range,
        ticks,
        series: series_out,
        has_data,
    }
}
