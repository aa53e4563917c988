use {
    crate::components::soft_update::{
        parameters,
        track,
    },
    candle_core::{
        DType,
        Device,
        Error,
        Module,
        Result,
        Tensor,
        Var,
    },
    candle_nn::{
        func,
        linear,
        sequential::seq,
        Activation,
        Sequential,
        VarBuilder,
        VarMap,
    },
    std::{
        collections::HashMap,
        path::Path,
    },
};

/// A local network and its slowly tracking target copy, with all parameters
/// kept in one [`VarMap`] under `{prefix}-*` and `target-{prefix}-*`.
struct TrackedNetwork {
    varmap: VarMap,
    network: Sequential,
    target_network: Sequential,
    prefix: &'static str,
    target_prefix: String,
}

impl TrackedNetwork {
    fn new(
        device: &Device,
        prefix: &'static str,
        dims: &[(usize, usize)],
        bounded: bool,
    ) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F64, device);

        let make_network = |prefix: &str| {
            let mut seq = seq();
            for (i, &(in_dim, out_dim)) in dims.iter().enumerate() {
                if i > 0 {
                    seq = seq.add(Activation::Relu);
                }
                seq = seq.add(linear(in_dim, out_dim, vb.pp(format!("{prefix}-fc{i}")))?);
            }
            if bounded {
                seq = seq.add(func(|xs| xs.tanh()));
            }
            Ok::<Sequential, Error>(seq)
        };

        let target_prefix = format!("target-{prefix}");
        let network = make_network(prefix)?;
        let target_network = make_network(&target_prefix)?;

        // this sets the two networks to be equal to each other using tau = 1.0
        track(&varmap, &target_prefix, prefix, 1.0)?;

        Ok(Self {
            varmap,
            network,
            target_network,
            prefix,
            target_prefix,
        })
    }

    fn parameters(&self) -> Result<Vec<(String, Var)>> {
        parameters(&self.varmap, self.prefix)
    }

    fn target_parameters(&self) -> Result<Vec<(String, Var)>> {
        parameters(&self.varmap, &self.target_prefix)
    }

    fn track(
        &self,
        tau: f64,
    ) -> Result<()> {
        track(&self.varmap, &self.target_prefix, self.prefix, tau)
    }

    fn save(
        &self,
        path: &Path,
    ) -> Result<()> {
        let tensors = self
            .parameters()?
            .into_iter()
            .map(|(name, var)| (name, var.as_tensor().clone()))
            .collect::<HashMap<String, Tensor>>();
        candle_core::safetensors::save(&tensors, path)
    }

    fn load(
        &self,
        path: &Path,
        device: &Device,
    ) -> Result<()> {
        let tensors = candle_core::safetensors::load(path, device)?;
        for (name, var) in self.parameters()? {
            let tensor = tensors.get(&name).ok_or_else(|| {
                Error::Msg(format!("{} holds no parameter {name}", path.display()))
            })?;
            var.set(&tensor.to_dtype(DType::F64)?)?;
        }
        self.track(1.0)
    }
}

/// The policy network, mapping states to actions in \[-1, 1\].
pub struct Actor {
    inner: TrackedNetwork,
}

impl Actor {
    pub fn new(
        device: &Device,
        size_state: usize,
        size_action: usize,
        hidden_1_size: usize,
        hidden_2_size: usize,
    ) -> Result<Self> {
        Ok(Self {
            inner: TrackedNetwork::new(
                device,
                "actor",
                &[
                    (size_state, hidden_1_size),
                    (hidden_1_size, hidden_2_size),
                    (hidden_2_size, size_action),
                ],
                true,
            )?,
        })
    }

    pub fn forward(
        &self,
        state: &Tensor,
    ) -> Result<Tensor> {
        self.inner.network.forward(state)
    }

    pub fn target_forward(
        &self,
        state: &Tensor,
    ) -> Result<Tensor> {
        self.inner.target_network.forward(state)
    }

    pub fn track(
        &self,
        tau: f64,
    ) -> Result<()> {
        self.inner.track(tau)
    }

    /// Local parameters, ordered by name.
    pub fn parameters(&self) -> Result<Vec<(String, Var)>> {
        self.inner.parameters()
    }

    /// Target parameters, ordered by name (aligned with [`Actor::parameters`]).
    pub fn target_parameters(&self) -> Result<Vec<(String, Var)>> {
        self.inner.target_parameters()
    }

    pub fn save(
        &self,
        path: &Path,
    ) -> Result<()> {
        self.inner.save(path)
    }

    pub fn load(
        &self,
        path: &Path,
        device: &Device,
    ) -> Result<()> {
        self.inner.load(path, device)
    }
}

/// The value network, mapping (state, action) pairs to a single Q-value.
pub struct Critic {
    inner: TrackedNetwork,
}

impl Critic {
    pub fn new(
        device: &Device,
        size_state: usize,
        size_action: usize,
        hidden_1_size: usize,
        hidden_2_size: usize,
    ) -> Result<Self> {
        Ok(Self {
            inner: TrackedNetwork::new(
                device,
                "critic",
                &[
                    (size_state + size_action, hidden_1_size),
                    (hidden_1_size, hidden_2_size),
                    (hidden_2_size, 1),
                ],
                false,
            )?,
        })
    }

    pub fn forward(
        &self,
        state: &Tensor,
        action: &Tensor,
    ) -> Result<Tensor> {
        let xs = Tensor::cat(&[state, action], 1)?;
        self.inner.network.forward(&xs)
    }

    pub fn target_forward(
        &self,
        state: &Tensor,
        action: &Tensor,
    ) -> Result<Tensor> {
        let xs = Tensor::cat(&[state, action], 1)?;
        self.inner.target_network.forward(&xs)
    }

    pub fn track(
        &self,
        tau: f64,
    ) -> Result<()> {
        self.inner.track(tau)
    }

    pub fn parameters(&self) -> Result<Vec<(String, Var)>> {
        self.inner.parameters()
    }

    pub fn target_parameters(&self) -> Result<Vec<(String, Var)>> {
        self.inner.target_parameters()
    }

    pub fn save(
        &self,
        path: &Path,
    ) -> Result<()> {
        self.inner.save(path)
    }

    pub fn load(
        &self,
        path: &Path,
        device: &Device,
    ) -> Result<()> {
        self.inner.load(path, device)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn values(t: &Tensor) -> Vec<f64> {
        t.flatten_all().unwrap().to_vec1::<f64>().unwrap()
    }

    #[test]
    fn actor_output_is_bounded() {
        let device = &Device::Cpu;
        let actor = Actor::new(device, 4, 2, 16, 16).unwrap();
        let states = Tensor::new(&[[100.0, -300.0, 50.0, 7.0], [0.0, 0.0, 0.0, 0.0]], device).unwrap();
        let actions = actor.forward(&states).unwrap();
        assert_eq!(actions.dims(), &[2, 2]);
        assert!(values(&actions).iter().all(|a| (-1.0..=1.0).contains(a)));
    }

    #[test]
    fn actor_rows_are_independent() {
        let device = &Device::Cpu;
        let actor = Actor::new(device, 3, 2, 8, 8).unwrap();
        let a = Tensor::new(&[[0.1, 0.2, 0.3]], device).unwrap();
        let b = Tensor::new(&[[-0.5, 0.9, 0.0]], device).unwrap();
        let both = Tensor::cat(&[&a, &b], 0).unwrap();

        let together = actor.forward(&both).unwrap().to_vec2::<f64>().unwrap();
        let alone_a = actor.forward(&a).unwrap().to_vec2::<f64>().unwrap();
        let alone_b = actor.forward(&b).unwrap().to_vec2::<f64>().unwrap();
        for (x, y) in together[0].iter().zip(alone_a[0].iter()) {
            assert!((x - y).abs() < 1e-12);
        }
        for (x, y) in together[1].iter().zip(alone_b[0].iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn critic_outputs_one_value_per_row() {
        let device = &Device::Cpu;
        let critic = Critic::new(device, 4, 2, 16, 8).unwrap();
        let states = Tensor::zeros((5, 4), DType::F64, device).unwrap();
        let actions = Tensor::ones((5, 2), DType::F64, device).unwrap();
        assert_eq!(critic.forward(&states, &actions).unwrap().dims(), &[5, 1]);
    }

    #[test]
    fn targets_start_equal_to_locals() {
        let device = &Device::Cpu;
        let critic = Critic::new(device, 3, 1, 8, 8).unwrap();
        let locals = critic.parameters().unwrap();
        let targets = critic.target_parameters().unwrap();
        assert_eq!(locals.len(), 6);
        assert_eq!(locals.len(), targets.len());
        for ((l_name, l), (t_name, t)) in locals.iter().zip(targets.iter()) {
            assert_eq!(format!("target-{l_name}"), *t_name);
            assert_eq!(l.as_tensor().dims(), t.as_tensor().dims());
            assert_eq!(values(l.as_tensor()), values(t.as_tensor()));
        }
    }

    #[test]
    fn save_then_load_restores_local_weights() {
        let device = &Device::Cpu;
        let dir = std::env::temp_dir().join(format!("tennis_rl_networks_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("actor.safetensors");

        let trained = Actor::new(device, 3, 2, 8, 8).unwrap();
        trained.save(&path).unwrap();

        let fresh = Actor::new(device, 3, 2, 8, 8).unwrap();
        fresh.load(&path, device).unwrap();

        let state = Tensor::new(&[[0.3, -0.7, 0.1]], device).unwrap();
        assert_eq!(
            values(&trained.forward(&state).unwrap()),
            values(&fresh.forward(&state).unwrap()),
        );
        assert_eq!(
            values(&fresh.forward(&state).unwrap()),
            values(&fresh.target_forward(&state).unwrap()),
        );

        let wrong_shape = Actor::new(device, 5, 2, 8, 8).unwrap();
        assert!(wrong_shape.load(&path, device).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
