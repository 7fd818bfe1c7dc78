pub(crate) mod freshness;
pub(crate) mod history_service;
pub(crate) mod market_data_service;
