mod chart_point;
mod snapshot;

pub use chart_point::ChartPoint;
pub use snapshot::QuoteSnapshot;
