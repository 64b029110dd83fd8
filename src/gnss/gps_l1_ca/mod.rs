
pub mod catalog;
pub mod code;
pub mod signal_modulation;
pub mod tracking;

pub const CODE_LENGTH:usize = 1023;
pub const CHIP_RATE_HZ:f64 = 1.023e6;
pub const L1_CARRIER_HZ:f64 = 1.57542e9;
