pub mod facts;
pub mod file;
pub mod rent_roll;
pub mod stdin;
