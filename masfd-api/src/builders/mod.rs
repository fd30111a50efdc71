pub mod distribution;
pub mod reinforce;
