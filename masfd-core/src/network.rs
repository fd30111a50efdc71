use candle_core::{Result, Tensor};
use candle_nn::{Linear, Module, VarBuilder, linear};

/// A small feed forward stack: relu after every layer except the last one,
/// which stays linear so it can serve as logits or a value head.
#[derive(Clone, Debug)]
pub struct Mlp {
    layers: Vec<Linear>,
}

impl Mlp {
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let last = self.layers.len().saturating_sub(1);
        let mut xs = xs.clone();
        for (layer_idx, layer) in self.layers.iter().enumerate() {
            xs = layer.forward(&xs)?;
            if layer_idx != last {
                xs = xs.relu()?;
            }
        }
        Ok(xs)
    }
}

pub fn build_mlp(
    input_dim: usize,
    layers: &[usize],
    vb: &VarBuilder,
    prefix: &str,
) -> Result<Mlp> {
    let mut last_dim = input_dim;
    let mut built = Vec::with_capacity(layers.len());
    for (layer_idx, layer_size) in layers.iter().enumerate() {
        built.push(linear(last_dim, *layer_size, vb.pp(format!("{prefix}{layer_idx}")))?);
        last_dim = *layer_size;
    }
    Ok(Mlp { layers: built })
}
