use crate::{distributions::Distribution, utils::rollout_buffer::RolloutBuffer};
use anyhow::Result;

pub trait Agent {
    type Dist: Distribution;

    /// The distribution used for sampling actions during rollouts.
    fn distribution(&self) -> &Self::Dist;

    /// Consume the collected rollouts and update the policy.
    fn learn(&mut self, rollouts: Vec<RolloutBuffer>) -> Result<()>;
}
