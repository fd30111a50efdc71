use candle_core::{Device, Result, bail};
use candle_nn::VarBuilder;
use masfd_core::{
    distributions::{BernoulliDistribution, CategoricalDistribution, DistributionKind},
    env::{EnvironmentDescription, Space},
};

pub enum DistributionType {
    /// Pick the head from the action space of the environment.
    Dynamic { hidden_layers: Vec<usize> },
    Categorical { hidden_layers: Vec<usize> },
    Bernoulli { hidden_layers: Vec<usize> },
}

impl Default for DistributionType {
    fn default() -> Self {
        Self::Dynamic {
            hidden_layers: vec![64, 64],
        }
    }
}

impl DistributionType {
    fn build_categorical(
        vb: &VarBuilder,
        env_description: &EnvironmentDescription,
        device: &Device,
        hidden_layers: &[usize],
    ) -> Result<DistributionKind> {
        let distr = CategoricalDistribution::build(
            env_description.observation_size(),
            env_description.action_size(),
            hidden_layers,
            vb,
            device.clone(),
            "policy",
        )?;
        Ok(DistributionKind::Categorical(distr))
    }

    fn build_bernoulli(
        vb: &VarBuilder,
        env_description: &EnvironmentDescription,
        device: &Device,
        hidden_layers: &[usize],
    ) -> Result<DistributionKind> {
        let distr = BernoulliDistribution::build(
            env_description.observation_size(),
            env_description.action_size(),
            hidden_layers,
            vb,
            device.clone(),
            "policy",
        )?;
        Ok(DistributionKind::Bernoulli(distr))
    }

    pub fn build(
        &self,
        vb: &VarBuilder,
        device: &Device,
        env_description: &EnvironmentDescription,
    ) -> Result<DistributionKind> {
        match &self {
            Self::Categorical { hidden_layers } => {
                Self::build_categorical(vb, env_description, device, hidden_layers)
            }
            Self::Bernoulli { hidden_layers } => {
                Self::build_bernoulli(vb, env_description, device, hidden_layers)
            }
            Self::Dynamic { hidden_layers } => match env_description.action_space {
                Space::Discrete(..) => {
                    Self::build_categorical(vb, env_description, device, hidden_layers)
                }
                Space::MultiBinary(..) => {
                    Self::build_bernoulli(vb, env_description, device, hidden_layers)
                }
                Space::Continuous { .. } => {
                    bail!("continuous action spaces are not supported")
                }
            },
        }
    }
}
