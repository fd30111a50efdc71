use super::Distribution;
use crate::network::{Mlp, build_mlp};
use crate::rng::RNG;
use candle_core::{Device, Result, Tensor};
use candle_nn::VarBuilder;
use candle_nn::ops::sigmoid;
use rand::Rng;

// Keeps log(p) and log(1 - p) away from -inf when a head saturates.
const PROB_EPS: f32 = 1e-6;

/// Independent sigmoid heads, one per flag. This is the natural policy for a
/// `MultiBinary` action space where every transaction in the window gets its
/// own flag/clear decision.
#[derive(Clone, Debug)]
pub struct BernoulliDistribution {
    flag_count: usize,
    logits: Mlp,
    device: Device,
}

impl BernoulliDistribution {
    pub fn new(flag_count: usize, logits: Mlp, device: Device) -> Self {
        Self {
            flag_count,
            logits,
            device,
        }
    }

    pub fn build(
        input_dim: usize,
        flag_count: usize,
        hidden_layers: &[usize],
        vb: &VarBuilder,
        device: Device,
        prefix: &str,
    ) -> Result<Self> {
        let layers = [hidden_layers, &[flag_count]].concat();
        let logits = build_mlp(input_dim, &layers, vb, prefix)?;
        Ok(Self {
            flag_count,
            logits,
            device,
        })
    }

    pub fn flag_count(&self) -> usize {
        self.flag_count
    }

    fn flag_probs(&self, states: &Tensor) -> Result<Tensor> {
        let logits = self.logits.forward(states)?;
        sigmoid(&logits)?.clamp(PROB_EPS, 1. - PROB_EPS)
    }
}

impl Distribution for BernoulliDistribution {
    fn get_action(&self, observation: &Tensor) -> Result<Tensor> {
        assert!(
            observation.rank() == 1,
            "observation should be a flattened tensor"
        );
        let observation = observation.unsqueeze(0)?;
        let probs: Vec<f32> = self.flag_probs(&observation)?.squeeze(0)?.to_vec1()?;
        let flags = RNG.with_borrow_mut(|rng| {
            probs
                .into_iter()
                .map(|p| if rng.random::<f32>() < p { 1f32 } else { 0f32 })
                .collect::<Vec<_>>()
        });
        Ok(Tensor::from_vec(flags, self.flag_count, &self.device)?.detach())
    }

    fn log_probs(&self, states: &Tensor, actions: &Tensor) -> Result<Tensor> {
        let probs = self.flag_probs(states)?;
        let log_p = probs.log()?;
        let log_not_p = probs.affine(-1., 1.)?.log()?;
        let not_actions = actions.affine(-1., 1.)?;
        (actions.mul(&log_p)? + not_actions.mul(&log_not_p)?)?.sum(1)
    }

    fn entropy(&self, states: &Tensor) -> Result<Tensor> {
        let probs = self.flag_probs(states)?;
        let not_probs = probs.affine(-1., 1.)?;
        let per_flag = (probs.mul(&probs.log()?)? + not_probs.mul(&not_probs.log()?)?)?;
        per_flag.sum(1)?.neg()?.mean_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    fn build_distribution(obs: usize, flags: usize) -> Result<BernoulliDistribution> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        BernoulliDistribution::build(obs, flags, &[8], &vb, device, "policy")
    }

    #[test]
    fn sampled_action_is_binary() -> Result<()> {
        let dist = build_distribution(6, 4)?;
        let observation = Tensor::zeros(6, DType::F32, &Device::Cpu)?;
        let action: Vec<f32> = dist.get_action(&observation)?.to_vec1()?;
        assert_eq!(action.len(), 4);
        assert!(action.iter().all(|a| *a == 0. || *a == 1.));
        Ok(())
    }

    #[test]
    fn log_probs_sum_over_flags() -> Result<()> {
        let dist = build_distribution(6, 4)?;
        let states = Tensor::zeros((3, 6), DType::F32, &Device::Cpu)?;
        let actions = Tensor::from_vec(
            vec![1f32, 0., 0., 1., 0., 0., 1., 1., 1., 1., 1., 1.],
            (3, 4),
            &Device::Cpu,
        )?;
        let logps: Vec<f32> = dist.log_probs(&states, &actions)?.to_vec1()?;
        assert_eq!(logps.len(), 3);
        assert!(logps.iter().all(|l| l.is_finite() && *l < 0.));
        Ok(())
    }

    #[test]
    fn sampling_is_replayable_per_seed() -> Result<()> {
        let dist = build_distribution(6, 4)?;
        let observation = Tensor::zeros(6, DType::F32, &Device::Cpu)?;
        crate::rng::set_seed(11);
        let first: Vec<f32> = dist.get_action(&observation)?.to_vec1()?;
        crate::rng::set_seed(11);
        let second: Vec<f32> = dist.get_action(&observation)?.to_vec1()?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn entropy_is_positive() -> Result<()> {
        let dist = build_distribution(6, 4)?;
        let states = Tensor::zeros((3, 6), DType::F32, &Device::Cpu)?;
        let entropy: f32 = dist.entropy(&states)?.to_scalar()?;
        assert!(entropy > 0.);
        Ok(())
    }
}
