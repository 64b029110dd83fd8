
/// GPS L1 C/A code tables and local replica generation
pub mod gps_l1_ca;

/// Doppler / code phase search over a block of samples
pub mod acquisition;

/// Lock detection and per-interval reports shared by tracking loops
pub mod tracking;
