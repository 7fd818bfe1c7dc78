pub(crate) mod chart_point_queries;
pub(crate) mod snapshot_queries;
