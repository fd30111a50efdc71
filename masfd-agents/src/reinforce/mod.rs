use anyhow::Result;
use candle_core::Device;
use masfd_core::{
    agents::Agent,
    distributions::{Distribution, DistributionKind},
    policies::{ActorCritic, ValueFunction},
    utils::rollout_buffer::{RolloutBatch, RolloutBatchIterator, RolloutBuffer, normalize},
};

/// Episodic policy gradient with discounted returns-to-go and a learned value
/// baseline. The log probabilities are recomputed per batch so the loss stays
/// attached to the policy graph.
pub struct Reinforce {
    pub module: ActorCritic,
    device: Device,
    gamma: f32,
    sample_size: usize,
    normalize_returns: bool,
}

impl Reinforce {
    pub fn new(
        module: ActorCritic,
        device: Device,
        gamma: f32,
        sample_size: usize,
        normalize_returns: bool,
    ) -> Self {
        Self {
            module,
            device,
            gamma,
            sample_size,
            normalize_returns,
        }
    }

    fn train_single_batch(&mut self, batch: RolloutBatch) -> Result<()> {
        let values_pred = self.module.calculate_values(&batch.observations)?;
        let advantages = (batch.returns.clone() - values_pred.detach())?;
        let logps = self
            .module
            .distribution
            .log_probs(&batch.observations, &batch.actions)?;
        let policy_loss = advantages.mul(&logps)?.neg()?.mean_all()?;
        let value_loss = batch.returns.sub(&values_pred)?.sqr()?.mean_all()?;
        self.module.update(&policy_loss, &value_loss)?;
        Ok(())
    }
}

impl Agent for Reinforce {
    type Dist = DistributionKind;

    fn distribution(&self) -> &DistributionKind {
        &self.module.distribution
    }

    fn learn(&mut self, rollouts: Vec<RolloutBuffer>) -> Result<()> {
        let mut returns: Vec<Vec<f32>> = rollouts
            .iter()
            .map(|rollout| rollout.discounted_returns(self.gamma))
            .collect();
        if self.normalize_returns {
            for rollout_returns in returns.iter_mut() {
                normalize(rollout_returns);
            }
        }
        let batch_iter =
            RolloutBatchIterator::new(&rollouts, &returns, self.sample_size, self.device.clone());
        for batch in batch_iter {
            self.train_single_batch(batch)?;
        }
        Ok(())
    }
}
