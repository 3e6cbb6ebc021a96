pub mod aggregation;
pub mod load_power;
pub mod transformer;
pub mod units;
