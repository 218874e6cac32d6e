use crate::calendar::{local_today, resolve_selection, CalendarDate, DateRange, RangeSelection};
use crate::errors::AppError;
use crate::geo::{classify_locations, FALLBACK_DASH};
use crate::models::{DashboardData, LocationsQuery, LocationsResponse, RangeQuery, RangeResponse};
use crate::series::{shape_series, SeriesDescriptor, ShapedChart, SERIES};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use chrono::{DateTime, Utc};
use tracing::debug;

pub async fn index() -> Html<String> {
    Html(render_index(local_today()))
}

pub async fn get_range(Query(query): Query<RangeQuery>) -> Result<Json<RangeResponse>, AppError> {
    let range = resolve_query_range(&query, local_today())?;
    Ok(Json(RangeResponse::new(range, query.server_id)))
}

pub async fn get_series() -> Json<&'static [SeriesDescriptor]> {
    let series: &'static [SeriesDescriptor] = &SERIES;
    Json(series)
}

pub async fn get_plays(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ShapedChart>, AppError> {
    Ok(Json(build_plays_at(local_today(), &state.data, &query)?))
}

pub async fn get_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationsQuery>,
) -> Json<LocationsResponse> {
    let fallback = query.fallback.as_deref().unwrap_or(FALLBACK_DASH);
    Json(build_locations_at(Utc::now(), &state.data, fallback))
}

/// Range requested by the query. The viewer's own `today` wins over the
/// server clock when supplied.
pub fn resolve_query_range(query: &RangeQuery, fallback_today: CalendarDate) -> Result<DateRange, AppError> {
    let today = match query.today.as_deref() {
        Some(raw) => raw.parse::<CalendarDate>()?,
        None => fallback_today,
    };
    let selection = match query.days.as_deref() {
        Some(raw) => raw.parse::<RangeSelection>()?,
        None => RangeSelection::default(),
    };

    Ok(resolve_selection(
        selection,
        query.start.as_deref(),
        query.end.as_deref(),
        today,
    )?)
}

pub fn build_plays_at(
    fallback_today: CalendarDate,
    data: &DashboardData,
    query: &RangeQuery,
) -> Result<ShapedChart, AppError> {
    let range = resolve_query_range(query, fallback_today)?;
    let records = data.plays_for(query.server_id.as_deref());
    let chart = shape_series(records, range, &SERIES);
    debug!(
        start = %range.start,
        end = %range.end,
        server_id = query.server_id.as_deref().unwrap_or("all"),
        has_data = chart.has_data,
        "shaped plays chart"
    );
    Ok(chart)
}

pub fn build_locations_at(now: DateTime<Utc>, data: &DashboardData, fallback: &str) -> LocationsResponse {
    let locations = classify_locations(&data.locations, now, fallback);
    LocationsResponse {
        recent_count: locations.iter().filter(|location| location.recent).count(),
        locations,
    }
}
