use crate::models::DashboardData;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub data: Arc<DashboardData>,
}

impl AppState {
    pub fn new(data: DashboardData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }
}
