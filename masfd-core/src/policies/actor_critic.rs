use super::{OptimizerWithMaxGrad, ValueFunction};
use crate::distributions::DistributionKind;
use crate::network::Mlp;
use candle_core::{Result, Tensor};
use candle_nn::Optimizer;

/// Policy head plus value baseline, each with its own optimizer so the two
/// nets cannot leak gradients into each other.
#[derive(Debug)]
pub struct ActorCritic {
    pub distribution: DistributionKind,
    pub value_net: Mlp,
    pub policy_optimizer: OptimizerWithMaxGrad,
    pub value_optimizer: OptimizerWithMaxGrad,
}

impl ActorCritic {
    pub fn policy_learning_rate(&self) -> f64 {
        self.policy_optimizer.optimizer.learning_rate()
    }

    pub fn update(&mut self, policy_loss: &Tensor, value_loss: &Tensor) -> Result<()> {
        self.policy_optimizer.backward_step(policy_loss)?;
        self.value_optimizer.backward_step(value_loss)?;
        Ok(())
    }
}

impl ValueFunction for ActorCritic {
    fn calculate_values(&self, observation: &Tensor) -> Result<Tensor> {
        self.value_net.forward(observation)?.squeeze(1)
    }
}
