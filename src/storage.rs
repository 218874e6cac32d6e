use crate::models::DashboardData;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, info};

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/dashboard.json")
}

/// Reads the statistics snapshot. A missing or unreadable file leaves the
/// dashboard empty rather than stopping the server.
pub async fn load_data(path: &Path) -> DashboardData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<DashboardData>(&bytes) {
            Ok(data) => {
                info!(
                    plays = data.plays.len(),
                    servers = data.plays_by_server.len(),
                    locations = data.locations.len(),
                    "loaded dashboard snapshot"
                );
                data
            }
            Err(err) => {
                error!("failed to parse data file {}: {err}", path.display());
                DashboardData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!("no data file at {}, starting empty", path.display());
            DashboardData::default()
        }
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            DashboardData::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("media_dashboard_{}_{name}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let data = load_data(&temp_path("missing")).await;
        assert!(data.plays.is_empty());
        assert!(data.locations.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_loads_empty() {
        let path = temp_path("malformed");
        fs::write(&path, b"{ not json").await.unwrap();
        let data = load_data(&path).await;
        assert!(data.plays.is_empty());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn snapshot_loads_all_sections() {
        let path = temp_path("snapshot");
        let body = serde_json::json!({
            "plays": [{ "date": "2024-03-03", "movies": 2 }],
            "plays_by_server": { "den": [{ "date": "2024-03-03", "tv": 1 }] },
            "locations": [{ "ip": "192.0.2.1", "city": "Oslo" }]
        });
        fs::write(&path, serde_json::to_vec(&body).unwrap()).await.unwrap();

        let data = load_data(&path).await;
        assert_eq!(data.plays.len(), 1);
        assert_eq!(data.plays_for(Some("den")).len(), 1);
        assert!(data.plays_for(Some("attic")).is_empty());
        assert_eq!(data.locations[0].city.as_deref(), Some("Oslo"));
        let _ = fs::remove_file(&path).await;
    }
}
