use crate::client::MasfdClient;
use crate::types::{EnvConfig, TransactionAction};
use anyhow::{Context, Result, bail};
use candle_core::{Device, Tensor};
use masfd_core::env::{Env, EnvironmentDescription, SnapShot, Space};
use std::collections::HashMap;
use tracing::info;

/// Drives the remote simulation through the `Env` trait so the training loop
/// cannot tell it apart from a local environment. Every step flags the next
/// `flags_per_step` transaction ids in order; ids wrap around the configured
/// transaction count.
pub struct RemoteMasfdEnv {
    client: MasfdClient,
    config: EnvConfig,
    device: Device,
    flags_per_step: usize,
    observation_size: usize,
    next_transaction_id: u64,
}

impl RemoteMasfdEnv {
    /// Creates the environment on the service and probes the initial state
    /// once to learn the observation width.
    pub fn connect(
        client: MasfdClient,
        config: EnvConfig,
        flags_per_step: usize,
        device: Device,
    ) -> Result<Self> {
        if flags_per_step == 0 {
            bail!("flags_per_step must be at least 1");
        }
        // Ids wrap modulo the transaction count, so a wider window would
        // fold onto itself and drop flags from the step payload.
        if flags_per_step > config.num_transactions {
            bail!(
                "flags_per_step ({flags_per_step}) cannot exceed the transaction count ({})",
                config.num_transactions
            );
        }
        let ack = client
            .create_env(&config)
            .context("createMASFDEnv failed")?;
        info!(%ack, "remote environment created");
        let state = client.get_state().context("initial getState failed")?;
        if state.is_empty() {
            bail!("remote environment returned an empty initial state");
        }
        Ok(Self {
            observation_size: state.len(),
            next_transaction_id: 0,
            client,
            config,
            device,
            flags_per_step,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    fn state_tensor(&self, mut state: Vec<f32>) -> Result<Tensor> {
        // The width was fixed at connect time; pad or trim so a shape drift
        // on the service side cannot poison the rollout buffers.
        state.resize(self.observation_size, 0.);
        Ok(Tensor::from_vec(state, self.observation_size, &self.device)?)
    }
}

impl Env for RemoteMasfdEnv {
    // The service owns its rng, so the seed has nowhere to go.
    fn reset(&mut self, _seed: u64) -> Result<Tensor> {
        self.client.reset()?;
        self.next_transaction_id = 0;
        let state = self.client.get_state()?;
        self.state_tensor(state)
    }

    fn step(&mut self, action: &Tensor) -> Result<SnapShot> {
        let flags: Vec<f32> = action.to_vec1()?;
        let mut actions = HashMap::with_capacity(flags.len());
        for flag in flags {
            let transaction_id =
                self.next_transaction_id % self.config.num_transactions as u64;
            self.next_transaction_id += 1;
            actions.insert(
                transaction_id,
                TransactionAction {
                    transaction_id,
                    flag: flag > 0.5,
                },
            );
        }
        let outcome = self.client.step(&actions)?;
        let reward = outcome.rewards.iter().sum();
        let state = self.state_tensor(outcome.state)?;
        Ok(SnapShot {
            state,
            reward,
            terminated: outcome.done,
            truncated: false,
        })
    }

    fn env_description(&self) -> EnvironmentDescription {
        EnvironmentDescription::new(
            Space::continuous_from_dims(vec![self.observation_size]),
            Space::MultiBinary(self.flags_per_step),
        )
    }
}
