use crate::calendar::{CalendarDate, DateRange};
use crate::geo::{ClassifiedLocation, GeoLocationRecord};
use crate::series::DayStatRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics snapshot served by the dashboard. Play counts arrive already
/// aggregated per day.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardData {
    #[serde(default)]
    pub plays: Vec<DayStatRecord>,
    #[serde(default)]
    pub plays_by_server: BTreeMap<String, Vec<DayStatRecord>>,
    #[serde(default)]
    pub locations: Vec<GeoLocationRecord>,
}

impl DashboardData {
    /// Records for one server, or the combined series when no server is given.
    /// An unknown server has no records.
    pub fn plays_for(&self, server_id: Option<&str>) -> &[DayStatRecord] {
        match server_id {
            None => &self.plays,
            Some(id) => self
                .plays_by_server
                .get(id)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub days: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub today: Option<String>,
    pub server_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LocationsQuery {
    pub fallback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RangeResponse {
    pub start: CalendarDate,
    pub end: CalendarDate,
    pub days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
}

impl RangeResponse {
    pub fn new(range: DateRange, server_id: Option<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            days: range.len_days(),
            server_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub recent_count: usize,
    pub locations: Vec<ClassifiedLocation>,
}
