pub(crate) mod paper;
pub(crate) mod quote_provider;
