use anyhow::Result;
use candle_core::{Device, Tensor};
use masfd_core::distributions::Distribution;
use masfd_core::env::{Env, EnvironmentDescription, SnapShot, Space};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Deterministic stand-in for the remote service: a seeded transaction
/// stream where each step shows a window of transactions and expects one
/// flag decision per transaction. The last feature of every transaction
/// leaks the planted label (with some noise on the other features), so a
/// policy has something learnable to latch onto. Reward is +1 per correct
/// decision and -1 per miss or false alarm.
pub struct ScriptedFraudEnv {
    rng: StdRng,
    device: Device,
    num_transactions: usize,
    fraud_ratio: f64,
    flags_per_step: usize,
    features_per_transaction: usize,
    cursor: usize,
    window_labels: Vec<bool>,
}

impl ScriptedFraudEnv {
    pub fn new(num_transactions: usize, fraud_ratio: f64, flags_per_step: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(0),
            device: Device::Cpu,
            num_transactions,
            fraud_ratio,
            flags_per_step,
            features_per_transaction: 4,
            cursor: 0,
            window_labels: Vec::new(),
        }
    }

    fn next_window(&mut self) -> Result<Tensor> {
        let mut features =
            Vec::with_capacity(self.flags_per_step * self.features_per_transaction);
        self.window_labels.clear();
        for _ in 0..self.flags_per_step {
            let fraud = self.rng.random_bool(self.fraud_ratio);
            self.window_labels.push(fraud);
            for _ in 0..self.features_per_transaction - 1 {
                features.push(self.rng.random::<f32>());
            }
            features.push(if fraud { 1. } else { 0. });
        }
        let observation_size = features.len();
        Ok(Tensor::from_vec(features, observation_size, &self.device)?)
    }
}

impl Env for ScriptedFraudEnv {
    fn reset(&mut self, seed: u64) -> Result<Tensor> {
        self.rng = StdRng::seed_from_u64(seed);
        self.cursor = 0;
        self.next_window()
    }

    fn step(&mut self, action: &Tensor) -> Result<SnapShot> {
        let flags: Vec<f32> = action.to_vec1()?;
        let mut reward = 0f32;
        for (flag, label) in flags.iter().zip(&self.window_labels) {
            reward += if (*flag > 0.5) == *label { 1. } else { -1. };
        }
        self.cursor += self.flags_per_step;
        let terminated = self.cursor >= self.num_transactions;
        let state = self.next_window()?;
        Ok(SnapShot {
            state,
            reward,
            terminated,
            truncated: false,
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::new(
            Space::continuous_from_dims(vec![
                self.flags_per_step * self.features_per_transaction,
            ]),
            Space::MultiBinary(self.flags_per_step),
        )
    }
}

/// Play a few greedy-ish episodes and return the average episode reward.
pub fn run_episodes(
    env: &mut impl Env,
    ep_count: usize,
    distribution: &impl Distribution,
) -> Result<f32> {
    let mut total_reward = 0f32;
    for ep in 0..ep_count {
        let mut state = env.reset(ep as u64)?;
        loop {
            let action = distribution.get_action(&state)?;
            let snapshot = env.step(&action)?;
            total_reward += snapshot.reward;
            if snapshot.terminated || snapshot.truncated {
                break;
            }
            state = snapshot.state;
        }
    }
    Ok(total_reward / ep_count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_length_matches_transaction_count() -> Result<()> {
        let mut env = ScriptedFraudEnv::new(20, 0.2, 5);
        let mut state = env.reset(7)?;
        assert_eq!(state.dims(), &[20]);
        let mut steps = 0;
        loop {
            let action = Tensor::zeros(5, candle_core::DType::F32, &Device::Cpu)?;
            let snapshot = env.step(&action)?;
            steps += 1;
            assert!(snapshot.reward >= -5. && snapshot.reward <= 5.);
            if snapshot.terminated {
                break;
            }
            state = snapshot.state;
        }
        let _ = state;
        assert_eq!(steps, 4);
        Ok(())
    }

    #[test]
    fn reset_is_deterministic_per_seed() -> Result<()> {
        let mut env = ScriptedFraudEnv::new(20, 0.2, 5);
        let first: Vec<f32> = env.reset(42)?.to_vec1()?;
        let second: Vec<f32> = env.reset(42)?.to_vec1()?;
        assert_eq!(first, second);
        Ok(())
    }
}
