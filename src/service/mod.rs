pub mod calculator;
pub mod initializer;
pub mod statistics;
