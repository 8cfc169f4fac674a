pub mod candidate;
pub mod tournament;
