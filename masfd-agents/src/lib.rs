pub mod reinforce;

pub use reinforce::Reinforce;
