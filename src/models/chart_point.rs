use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// One sample in the charting series, written alongside each snapshot refresh.
// `kind` tags the series ("price" for now); queried by timestamp range.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChartPoint {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub vwap: Option<f64>,
    pub ma9: Option<f64>,
    pub kind: String,
}
