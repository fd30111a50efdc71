use crate::distributions::Distribution;
use crate::env::{Env, EnvironmentDescription, RolloutMode, SnapShot};
use crate::rng::RNG;
use crate::utils::rollout_buffer::RolloutBuffer;
use anyhow::{Result, bail};
use candle_core::Tensor;
use rand::Rng;

pub trait Sampler {
    fn collect_rollouts(&mut self, distribution: &dyn Distribution) -> Result<Vec<RolloutBuffer>>;

    fn env_description(&self) -> EnvironmentDescription;
}

/// Sample one action, step the environment and reset it when the episode is
/// over, so the returned state is always a valid starting point.
pub fn single_step_env(
    distribution: &dyn Distribution,
    state: &Tensor,
    env: &mut impl Env,
) -> Result<(Tensor, Tensor, f32, bool)> {
    let action = distribution.get_action(state)?;
    let SnapShot {
        state: mut next_state,
        reward,
        terminated,
        truncated,
    } = env.step(&action)?;
    let done = terminated || truncated;
    if done {
        let seed = RNG.with_borrow_mut(|rng| rng.random::<u64>());
        next_state = env.reset(seed)?;
    }
    Ok((next_state, action, reward, done))
}

fn run_rollout(
    distribution: &dyn Distribution,
    env: &mut impl Env,
    rollout_mode: RolloutMode,
    mut state: Tensor,
) -> Result<(RolloutBuffer, Tensor)> {
    let mut buffer = RolloutBuffer::default();
    match rollout_mode {
        RolloutMode::EpisodeBound { n_episodes } => {
            let mut finished = 0;
            while finished < n_episodes {
                let (next_state, action, reward, done) =
                    single_step_env(distribution, &state, env)?;
                buffer.push_step(state, action, reward, done);
                state = next_state;
                if done {
                    finished += 1;
                }
            }
        }
        RolloutMode::StepBound { n_steps } => {
            for _ in 0..n_steps {
                let (next_state, action, reward, done) =
                    single_step_env(distribution, &state, env)?;
                buffer.push_step(state, action, reward, done);
                state = next_state;
            }
        }
    }
    Ok((buffer, state))
}

/// Steps a set of environments one after the other. Synchronous and
/// blocking, which matches how the remote service expects to be driven.
pub struct VecEnvSampler<E: Env> {
    envs: Vec<E>,
    states: Vec<Tensor>,
    rollout_mode: RolloutMode,
    env_description: EnvironmentDescription,
}

impl<E: Env> VecEnvSampler<E> {
    pub fn new(mut envs: Vec<E>, rollout_mode: RolloutMode) -> Result<Self> {
        if envs.is_empty() {
            bail!("a sampler needs at least one environment");
        }
        let env_description = envs[0].env_description();
        let states = envs
            .iter_mut()
            .map(|env| {
                let seed = RNG.with_borrow_mut(|rng| rng.random::<u64>());
                env.reset(seed)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            envs,
            states,
            rollout_mode,
            env_description,
        })
    }

    pub fn num_envs(&self) -> usize {
        self.envs.len()
    }
}

impl<E: Env> Sampler for VecEnvSampler<E> {
    fn collect_rollouts(&mut self, distribution: &dyn Distribution) -> Result<Vec<RolloutBuffer>> {
        let mut buffers = Vec::with_capacity(self.envs.len());
        for (env, state) in self.envs.iter_mut().zip(self.states.iter_mut()) {
            let (buffer, last_state) =
                run_rollout(distribution, env, self.rollout_mode, state.clone())?;
            *state = last_state;
            buffers.push(buffer);
        }
        Ok(buffers)
    }

    fn env_description(&self) -> EnvironmentDescription {
        self.env_description.clone()
    }
}
