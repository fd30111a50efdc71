pub mod agents;
pub mod distributions;
pub mod env;
pub mod network;
pub mod on_policy_algorithm;
pub mod policies;
pub mod rng;
pub mod sampler;
pub mod utils;

use anyhow::Result;

/// A learning algorithm. `OnPolicyAlgorithm` is the only implementor for now,
/// but the remote service could back an off policy alternative later.
pub trait Algorithm {
    fn train(&mut self) -> Result<()>;
}
