pub(crate) mod health;
pub(crate) mod history;
pub(crate) mod market_data;
