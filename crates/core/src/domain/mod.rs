pub mod candidate;
pub mod recommendation;
pub mod score;
