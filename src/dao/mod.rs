pub mod farms;
pub mod statistics;
