pub mod actor_critic;

use candle_core::{Result, Tensor, backprop::GradStore};
use candle_nn::{AdamW, Optimizer, VarMap};
use std::fmt::Debug;

pub use actor_critic::ActorCritic;

pub trait ValueFunction {
    fn calculate_values(&self, observation: &Tensor) -> Result<Tensor>;
}

/// Backward pass with global gradient norm clipping over every var in the
/// varmap.
fn clip_grad(loss: &Tensor, varmap: &VarMap, max_norm: f32) -> Result<GradStore> {
    let mut grad_store = loss.backward()?;
    let all_vars = varmap.all_vars();
    let mut total_norm_squared = 0f32;
    for var in all_vars.iter() {
        if let Some(grad) = grad_store.get_id(var.id()) {
            total_norm_squared += grad.sqr()?.sum_all()?.to_scalar::<f32>()?;
        }
    }
    let total_norm = total_norm_squared.sqrt();
    if total_norm > max_norm {
        let clip_coef = max_norm / (total_norm + 1e-6);
        for var in all_vars.iter() {
            if let Some(grad) = grad_store.get_id(var.id()).cloned() {
                let clipped = grad.affine(clip_coef as f64, 0.)?;
                grad_store.insert(var.as_tensor(), clipped);
            }
        }
    }
    Ok(grad_store)
}

pub struct OptimizerWithMaxGrad {
    pub optimizer: AdamW,
    pub max_grad_norm: Option<f32>,
    pub varmap: VarMap,
}

impl Debug for OptimizerWithMaxGrad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizerWithMaxGrad")
            .field("optimizer", &self.optimizer)
            .field("max_grad_norm", &self.max_grad_norm)
            .finish()
    }
}

impl OptimizerWithMaxGrad {
    pub fn new(optimizer: AdamW, max_grad_norm: Option<f32>, varmap: VarMap) -> Self {
        Self {
            optimizer,
            max_grad_norm,
            varmap,
        }
    }

    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        let grads = if let Some(max_norm) = self.max_grad_norm {
            clip_grad(loss, &self.varmap, max_norm)?
        } else {
            loss.backward()?
        };
        self.optimizer.step(&grads)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::{ParamsAdamW, VarBuilder};

    #[test]
    fn backward_step_updates_vars() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let net = crate::network::build_mlp(3, &[4, 1], &vb, "value")?;
        let optimizer = AdamW::new(
            varmap.all_vars(),
            ParamsAdamW {
                lr: 1e-2,
                ..Default::default()
            },
        )?;
        let mut optimizer = OptimizerWithMaxGrad::new(optimizer, Some(0.5), varmap);

        let xs = Tensor::ones((2, 3), DType::F32, &device)?;
        let before: f32 = net.forward(&xs)?.sum_all()?.to_scalar()?;
        let loss = net.forward(&xs)?.sqr()?.mean_all()?;
        optimizer.backward_step(&loss)?;
        let after: f32 = net.forward(&xs)?.sum_all()?.to_scalar()?;
        assert!(before != after);
        Ok(())
    }
}
