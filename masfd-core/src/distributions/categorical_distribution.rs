use super::Distribution;
use crate::network::{Mlp, build_mlp};
use crate::rng::RNG;
use candle_core::{Device, Error, Result, Tensor};
use candle_nn::VarBuilder;
use candle_nn::ops::{log_softmax, softmax};
use rand::distr::Distribution as SampleDistribution;
use rand::distr::weighted::WeightedIndex;

/// Softmax policy head over a fixed number of alternatives. Actions are one
/// hot encoded so `log_probs` is a single masked sum over the logits.
#[derive(Clone, Debug)]
pub struct CategoricalDistribution {
    action_size: usize,
    logits: Mlp,
    device: Device,
}

impl CategoricalDistribution {
    pub fn new(action_size: usize, logits: Mlp, device: Device) -> Self {
        Self {
            action_size,
            logits,
            device,
        }
    }

    pub fn build(
        input_dim: usize,
        action_size: usize,
        hidden_layers: &[usize],
        vb: &VarBuilder,
        device: Device,
        prefix: &str,
    ) -> Result<Self> {
        let layers = [hidden_layers, &[action_size]].concat();
        let logits = build_mlp(input_dim, &layers, vb, prefix)?;
        Ok(Self {
            action_size,
            logits,
            device,
        })
    }

    pub fn action_size(&self) -> usize {
        self.action_size
    }
}

impl Distribution for CategoricalDistribution {
    fn get_action(&self, observation: &Tensor) -> Result<Tensor> {
        assert!(
            observation.rank() == 1,
            "observation should be a flattened tensor"
        );
        let observation = observation.unsqueeze(0)?;
        let logits = self.logits.forward(&observation)?;
        let action_probs: Vec<f32> = softmax(&logits, 1)?.squeeze(0)?.to_vec1()?;
        let index = RNG.with_borrow_mut(|rng| {
            WeightedIndex::new(&action_probs).map(|weights| weights.sample(rng))
        })
        .map_err(Error::wrap)?;
        let mut one_hot = vec![0f32; self.action_size];
        one_hot[index] = 1.;
        Ok(Tensor::from_vec(one_hot, self.action_size, &self.device)?.detach())
    }

    fn log_probs(&self, states: &Tensor, actions: &Tensor) -> Result<Tensor> {
        let logits = self.logits.forward(states)?;
        let log_probs = log_softmax(&logits, 1)?;
        actions.mul(&log_probs)?.sum(1)
    }

    fn entropy(&self, states: &Tensor) -> Result<Tensor> {
        let logits = self.logits.forward(states)?;
        let log_probs = log_softmax(&logits, 1)?;
        let probs = log_probs.exp()?;
        probs.mul(&log_probs)?.sum(1)?.neg()?.mean_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    fn build_distribution(obs: usize, actions: usize) -> Result<CategoricalDistribution> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        CategoricalDistribution::build(obs, actions, &[8], &vb, device, "policy")
    }

    #[test]
    fn sampled_action_is_one_hot() -> Result<()> {
        let dist = build_distribution(4, 3)?;
        let observation = Tensor::zeros(4, DType::F32, &Device::Cpu)?;
        let action: Vec<f32> = dist.get_action(&observation)?.to_vec1()?;
        assert_eq!(action.len(), 3);
        assert_eq!(action.iter().filter(|a| **a == 1.).count(), 1);
        assert_eq!(action.iter().filter(|a| **a == 0.).count(), 2);
        Ok(())
    }

    #[test]
    fn sampling_is_replayable_per_seed() -> Result<()> {
        let dist = build_distribution(4, 3)?;
        let observation = Tensor::zeros(4, DType::F32, &Device::Cpu)?;
        crate::rng::set_seed(11);
        let first: Vec<f32> = dist.get_action(&observation)?.to_vec1()?;
        crate::rng::set_seed(11);
        let second: Vec<f32> = dist.get_action(&observation)?.to_vec1()?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn log_probs_are_negative() -> Result<()> {
        let dist = build_distribution(4, 3)?;
        let states = Tensor::zeros((5, 4), DType::F32, &Device::Cpu)?;
        let mut actions = vec![0f32; 15];
        for row in 0..5 {
            actions[row * 3 + row % 3] = 1.;
        }
        let actions = Tensor::from_vec(actions, (5, 3), &Device::Cpu)?;
        let logps: Vec<f32> = dist.log_probs(&states, &actions)?.to_vec1()?;
        assert_eq!(logps.len(), 5);
        assert!(logps.iter().all(|l| l.is_finite() && *l < 0.));
        Ok(())
    }
}
