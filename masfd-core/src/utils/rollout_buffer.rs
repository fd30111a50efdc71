use crate::rng::RNG;
use candle_core::{Device, Tensor};
use rand::seq::SliceRandom;

/// Steps collected from a single environment during one rollout phase. May
/// span several episodes; `dones` marks the boundaries.
#[derive(Debug, Default)]
pub struct RolloutBuffer {
    pub states: Vec<Tensor>,
    pub actions: Vec<Tensor>,
    pub rewards: Vec<f32>,
    pub dones: Vec<bool>,
}

impl RolloutBuffer {
    pub fn push_step(&mut self, state: Tensor, action: Tensor, reward: f32, done: bool) {
        self.states.push(state);
        self.actions.push(action);
        self.rewards.push(reward);
        self.dones.push(done);
    }

    pub fn total_steps(&self) -> usize {
        self.rewards.len()
    }

    /// Discounted returns-to-go, restarting the accumulator at every episode
    /// boundary.
    pub fn discounted_returns(&self, gamma: f32) -> Vec<f32> {
        let total_steps = self.rewards.len();
        let mut returns = vec![0f32; total_steps];
        let mut running = 0f32;
        for i in (0..total_steps).rev() {
            if self.dones[i] {
                running = 0.;
            }
            running = self.rewards[i] + gamma * running;
            returns[i] = running;
        }
        returns
    }
}

/// In place mean/std normalization, the usual variance reduction before the
/// policy gradient step.
pub fn normalize(values: &mut [f32]) {
    if values.is_empty() {
        return;
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let variance =
        values.iter().map(|x| (*x - mean).powi(2)).sum::<f32>() / values.len() as f32;
    let std = variance.sqrt() + 1e-8;
    for x in values.iter_mut() {
        *x = (*x - mean) / std;
    }
}

pub struct RolloutBatch {
    pub observations: Tensor,
    pub actions: Tensor,
    pub returns: Tensor,
}

/// Iterates minibatches over the flattened, shuffled step indices of a set of
/// rollouts. The final batch may be smaller than `sample_size`.
pub struct RolloutBatchIterator<'a> {
    rollouts: &'a [RolloutBuffer],
    returns: &'a [Vec<f32>],
    indices: Vec<(usize, usize)>,
    current: usize,
    sample_size: usize,
    device: Device,
}

impl<'a> RolloutBatchIterator<'a> {
    pub fn new(
        rollouts: &'a [RolloutBuffer],
        returns: &'a [Vec<f32>],
        sample_size: usize,
        device: Device,
    ) -> Self {
        let mut indices = (0..rollouts.len())
            .flat_map(|rollout_idx| {
                (0..rollouts[rollout_idx].total_steps())
                    .map(move |step_idx| (rollout_idx, step_idx))
            })
            .collect::<Vec<_>>();
        RNG.with_borrow_mut(|rng| indices.shuffle(rng));
        Self {
            rollouts,
            returns,
            indices,
            current: 0,
            sample_size,
            device,
        }
    }
}

impl Iterator for RolloutBatchIterator<'_> {
    type Item = RolloutBatch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.indices.len() {
            return None;
        }
        let end = (self.current + self.sample_size).min(self.indices.len());
        let batch_indices = &self.indices[self.current..end];
        self.current = end;
        let mut states = Vec::with_capacity(batch_indices.len());
        let mut actions = Vec::with_capacity(batch_indices.len());
        let mut returns = Vec::with_capacity(batch_indices.len());
        for (rollout_idx, step_idx) in batch_indices {
            let rollout = &self.rollouts[*rollout_idx];
            states.push(&rollout.states[*step_idx]);
            actions.push(&rollout.actions[*step_idx]);
            returns.push(self.returns[*rollout_idx][*step_idx]);
        }
        let observations = Tensor::stack(&states, 0).ok()?;
        let actions = Tensor::stack(&actions, 0).ok()?;
        let returns = Tensor::from_slice(&returns, returns.len(), &self.device).ok()?;
        Some(RolloutBatch {
            observations,
            actions,
            returns,
        })
    }
}
