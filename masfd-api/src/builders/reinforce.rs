use crate::builders::distribution::DistributionType;
use anyhow::Result;
use candle_core::{DType, Device};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use masfd_agents::Reinforce;
use masfd_core::{
    env::{Env, RolloutMode},
    network::build_mlp,
    on_policy_algorithm::{
        DefaultOnPolicyAlgorithmHooks, LearningSchedule, OnPolicyAlgorithm,
    },
    policies::{ActorCritic, OptimizerWithMaxGrad},
    sampler::{Sampler, VecEnvSampler},
};

pub type ReinforceAlgorithm<E> =
    OnPolicyAlgorithm<VecEnvSampler<E>, Reinforce, DefaultOnPolicyAlgorithmHooks>;

pub struct ReinforceBuilder {
    pub distribution_type: DistributionType,
    pub value_layers: Vec<usize>,
    pub learning_rate: f64,
    pub max_grad_norm: Option<f32>,
    pub gamma: f32,
    pub sample_size: usize,
    pub normalize_returns: bool,
    pub rollout_mode: RolloutMode,
    pub learning_schedule: LearningSchedule,
}

impl Default for ReinforceBuilder {
    fn default() -> Self {
        Self {
            distribution_type: DistributionType::default(),
            value_layers: vec![64, 64],
            learning_rate: 3e-4,
            max_grad_norm: Some(0.5),
            gamma: 0.99,
            sample_size: 64,
            normalize_returns: true,
            rollout_mode: RolloutMode::StepBound { n_steps: 512 },
            learning_schedule: LearningSchedule::total_step_bound(50_000),
        }
    }
}

impl ReinforceBuilder {
    pub fn set_learning_schedule(&mut self, learning_schedule: LearningSchedule) {
        self.learning_schedule = learning_schedule;
    }

    pub fn set_rollout_mode(&mut self, rollout_mode: RolloutMode) {
        self.rollout_mode = rollout_mode;
    }

    pub fn set_sample_size(&mut self, sample_size: usize) {
        self.sample_size = sample_size;
    }

    pub fn set_gamma(&mut self, gamma: f32) {
        self.gamma = gamma;
    }

    pub fn build<E: Env>(&self, envs: Vec<E>) -> Result<ReinforceAlgorithm<E>> {
        let device = Device::Cpu;
        let sampler = VecEnvSampler::new(envs, self.rollout_mode)?;
        let env_description = sampler.env_description();

        let optimizer_params = ParamsAdamW {
            lr: self.learning_rate,
            weight_decay: 0.01,
            ..Default::default()
        };

        let policy_varmap = VarMap::new();
        let policy_vb = VarBuilder::from_varmap(&policy_varmap, DType::F32, &device);
        let distribution = self
            .distribution_type
            .build(&policy_vb, &device, &env_description)?;
        let policy_optimizer = AdamW::new(policy_varmap.all_vars(), optimizer_params.clone())?;
        let policy_optimizer =
            OptimizerWithMaxGrad::new(policy_optimizer, self.max_grad_norm, policy_varmap);

        let value_varmap = VarMap::new();
        let value_vb = VarBuilder::from_varmap(&value_varmap, DType::F32, &device);
        let value_layers = [&self.value_layers[..], &[1]].concat();
        let value_net = build_mlp(
            env_description.observation_size(),
            &value_layers,
            &value_vb,
            "value",
        )?;
        let value_optimizer = AdamW::new(value_varmap.all_vars(), optimizer_params)?;
        let value_optimizer =
            OptimizerWithMaxGrad::new(value_optimizer, self.max_grad_norm, value_varmap);

        let module = ActorCritic {
            distribution,
            value_net,
            policy_optimizer,
            value_optimizer,
        };
        let agent = Reinforce::new(
            module,
            device,
            self.gamma,
            self.sample_size,
            self.normalize_returns,
        );
        let hooks = DefaultOnPolicyAlgorithmHooks::new(self.learning_schedule);
        Ok(OnPolicyAlgorithm {
            sampler,
            agent,
            hooks,
        })
    }
}
