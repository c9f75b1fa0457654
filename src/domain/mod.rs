// Domain layer - Vessel GPS records and query envelopes
pub mod vessel_gps;
