use {
    candle_core::{
        Device,
        Result,
        Tensor,
    },
    rand::{
        rngs::StdRng,
        SeedableRng,
    },
    rand_distr::{
        Distribution,
        StandardNormal,
    },
};

/// Multiplicative decay of the volatility, applied once per [`OuNoise::reset`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SigmaDecay {
    pub factor: f64,
    pub min: f64,
}

/// The Ornstein-Uhlenbeck process.
///
/// Produces temporally correlated noise of shape `(rows, size_action)`:
///
/// $$dx = \theta (\mu - x) + \sigma \mathcal{N}(0, 1)$$
///
/// The state starts at `mu` and only returns there on [`OuNoise::reset`].
#[derive(Clone)]
pub struct OuNoise {
    mu: f64,
    theta: f64,
    sigma: f64,
    decay: Option<SigmaDecay>,
    shape: (usize, usize),
    state: Vec<f64>,
    rng: StdRng,
    device: Device,
}
impl OuNoise {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mu: f64,
        theta: f64,
        sigma: f64,
        decay: Option<SigmaDecay>,
        rows: usize,
        size_action: usize,
        seed: u64,
        device: &Device,
    ) -> Self {
        Self {
            mu,
            theta,
            sigma,
            decay,
            shape: (rows, size_action),
            state: vec![mu; rows * size_action],
            rng: StdRng::seed_from_u64(seed),
            device: device.clone(),
        }
    }

    /// Put the state back to the mean and decay sigma (if enabled).
    pub fn reset(&mut self) {
        self.state.iter_mut().for_each(|x| *x = self.mu);
        if let Some(SigmaDecay { factor, min }) = self.decay {
            self.sigma = (self.sigma * factor).max(min);
        }
    }

    /// Advance the process by one step and return the new state.
    pub fn sample(&mut self) -> Result<Tensor> {
        for x in self.state.iter_mut() {
            let n: f64 = StandardNormal.sample(&mut self.rng);
            *x += self.theta * (self.mu - *x) + self.sigma * n;
        }
        Tensor::from_vec(self.state.clone(), self.shape, &self.device)
    }

    pub fn state(&self) -> &[f64] {
        &self.state
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn noise(decay: Option<SigmaDecay>) -> OuNoise {
        OuNoise::new(0.0, 0.15, 0.2, decay, 1, 2, 42, &Device::Cpu)
    }

    #[test]
    fn starts_at_the_mean() {
        let noise = OuNoise::new(0.3, 0.15, 0.2, None, 2, 2, 0, &Device::Cpu);
        assert_eq!(noise.state(), &[0.3; 4]);
    }

    #[test]
    fn sample_has_the_configured_shape() {
        let mut noise = OuNoise::new(0.0, 0.15, 0.2, None, 2, 3, 0, &Device::Cpu);
        let x = noise.sample().unwrap();
        assert_eq!(x.dims(), &[2, 3]);
    }

    #[test]
    fn reset_restores_exactly_mu() {
        let mut noise = OuNoise::new(0.5, 0.15, 0.2, None, 1, 4, 7, &Device::Cpu);
        for _ in 0..50 {
            noise.sample().unwrap();
        }
        assert!(noise.state().iter().any(|&x| x != 0.5));
        noise.reset();
        assert_eq!(noise.state(), &[0.5; 4]);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = noise(None);
        let mut b = noise(None);
        for _ in 0..10 {
            assert_eq!(
                a.sample().unwrap().to_vec2::<f64>().unwrap(),
                b.sample().unwrap().to_vec2::<f64>().unwrap(),
            );
        }
    }

    #[test]
    fn sequence_is_mean_reverting_and_autocorrelated() {
        let mut noise = OuNoise::new(0.0, 0.15, 0.2, None, 1, 1, 3, &Device::Cpu);
        let xs: Vec<f64> = (0..2_000)
            .map(|_| noise.sample().unwrap().flatten_all().unwrap().to_vec1::<f64>().unwrap()[0])
            .collect();

        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
        let cov = xs
            .windows(2)
            .map(|w| (w[0] - mean) * (w[1] - mean))
            .sum::<f64>();

        // x_{t+1} = (1 - theta) x_t + noise, so the lag-1 autocorrelation sits near 0.85
        let autocorrelation = cov / var;
        assert!(autocorrelation > 0.5, "autocorrelation was {autocorrelation}");
    }

    #[test]
    fn sigma_decays_monotonically_to_the_floor() {
        let mut noise = noise(Some(SigmaDecay { factor: 0.5, min: 0.05 }));
        let mut last = noise.sigma();
        for _ in 0..10 {
            noise.reset();
            assert!(noise.sigma() <= last);
            assert!(noise.sigma() >= 0.05);
            last = noise.sigma();
        }
        assert_eq!(noise.sigma(), 0.05);
    }

    #[test]
    fn sigma_is_constant_without_decay() {
        let mut noise = noise(None);
        noise.reset();
        noise.reset();
        assert_eq!(noise.sigma(), 0.2);
    }
}
