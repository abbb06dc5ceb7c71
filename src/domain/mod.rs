// Domain layer - Core trimming logic

pub mod errors;
pub mod model;
pub mod rules;
