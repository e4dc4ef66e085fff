pub mod deal;
pub mod recalculate;
pub mod rent_roll;
