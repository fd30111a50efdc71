pub mod bernoulli_distribution;
pub mod categorical_distribution;

use candle_core::{Result, Tensor};
use enum_dispatch::enum_dispatch;

pub use bernoulli_distribution::BernoulliDistribution;
pub use categorical_distribution::CategoricalDistribution;

#[enum_dispatch]
pub trait Distribution {
    /// Sample an action for a single (rank 1) observation.
    fn get_action(&self, observation: &Tensor) -> Result<Tensor>;

    /// Log probabilities for a batch of state/action pairs.
    fn log_probs(&self, states: &Tensor, actions: &Tensor) -> Result<Tensor>;

    /// Mean entropy of the action distribution over a batch of states.
    fn entropy(&self, states: &Tensor) -> Result<Tensor>;
}

#[enum_dispatch(Distribution)]
#[derive(Clone, Debug)]
pub enum DistributionKind {
    Categorical(CategoricalDistribution),
    Bernoulli(BernoulliDistribution),
}
