pub mod args;
pub mod errors;
pub mod metrics;
pub mod record;
pub mod target;
