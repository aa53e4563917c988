use {
    crate::{
        components::SigmaDecay,
        error::{
            DdpgError,
            Result,
        },
    },
    serde::{
        Serialize,
        Deserialize,
    },
};


#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DDPG_Config {
    // The learning rates for the Actor and Critic networks
    pub actor_learning_rate: f64,
    pub critic_learning_rate: f64,
    // Weight decay of the Critic optimizer (the Actor uses none).
    pub weight_decay: f64,
    // The impact of the q value of the next state on the current state's q value.
    pub gamma: f64,
    // The weight for updating the target networks.
    pub tau: f64,
    // The number of neurons in the hidden layers of the Actor and Critic networks.
    pub hidden_1_size: usize,
    pub hidden_2_size: usize,
    // The capacity of the replay buffer used for sampling training data.
    pub replay_buffer_capacity: usize,
    // The training batch size for each training iteration.
    pub training_batch_size: usize,
    // The number of state rows one agent acts on per call.
    pub agent_instances: usize,
    // Ornstein-Uhlenbeck process parameters.
    pub ou_mu: f64,
    pub ou_theta: f64,
    pub ou_sigma: f64,
    // Shrink sigma on every episode reset, down to ou_sigma_min.
    pub ou_use_sigma_decay: bool,
    pub ou_sigma_decay: f64,
    pub ou_sigma_min: f64,
}
impl Default for DDPG_Config {
    fn default() -> Self {
        Self {
            actor_learning_rate: 0.00005,
            critic_learning_rate: 0.0003,
            weight_decay: 0.0,
            gamma: 0.99,
            tau: 0.15,
            hidden_1_size: 256,
            hidden_2_size: 128,
            replay_buffer_capacity: 100_000,
            training_batch_size: 512,
            agent_instances: 1,
            ou_mu: 0.0,
            ou_theta: 0.15,
            ou_sigma: 0.2,
            ou_use_sigma_decay: false,
            ou_sigma_decay: 0.99,
            ou_sigma_min: 0.05,
        }
    }
}
impl DDPG_Config {
    /// A small and fast configuration, handy for smoke runs on the scripted
    /// environment.
    pub fn scripted() -> Self {
        Self {
            hidden_1_size: 32,
            hidden_2_size: 32,
            replay_buffer_capacity: 1_000,
            training_batch_size: 8,
            ..Self::default()
        }
    }

    pub fn sigma_decay(&self) -> Option<SigmaDecay> {
        self.ou_use_sigma_decay.then_some(SigmaDecay {
            factor: self.ou_sigma_decay,
            min: self.ou_sigma_min,
        })
    }

    /// Check every hyperparameter against its valid range.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(DdpgError::Configuration(msg));

        if !(self.tau > 0.0 && self.tau <= 1.0) {
            return invalid(format!("tau must lie in (0, 1], got {}", self.tau));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return invalid(format!("gamma must lie in [0, 1], got {}", self.gamma));
        }
        if !(self.actor_learning_rate > 0.0 && self.critic_learning_rate > 0.0) {
            return invalid(format!(
                "learning rates must be positive, got {} (actor) and {} (critic)",
                self.actor_learning_rate, self.critic_learning_rate,
            ));
        }
        if !(self.weight_decay >= 0.0) {
            return invalid(format!("weight decay must be non-negative, got {}", self.weight_decay));
        }
        if self.hidden_1_size == 0 || self.hidden_2_size == 0 {
            return invalid("hidden layers need at least one neuron".to_owned());
        }
        if self.training_batch_size == 0 {
            return invalid("training batch size must be at least 1".to_owned());
        }
        if self.replay_buffer_capacity < self.training_batch_size {
            return invalid(format!(
                "replay buffer capacity {} cannot hold a batch of {}",
                self.replay_buffer_capacity, self.training_batch_size,
            ));
        }
        if self.agent_instances == 0 {
            return invalid("an agent needs at least one instance".to_owned());
        }
        if self.ou_use_sigma_decay {
            if !(self.ou_sigma_decay > 0.0 && self.ou_sigma_decay <= 1.0) {
                return invalid(format!("sigma decay must lie in (0, 1], got {}", self.ou_sigma_decay));
            }
            if self.ou_sigma_min > self.ou_sigma {
                return invalid(format!(
                    "sigma floor {} lies above sigma {}",
                    self.ou_sigma_min, self.ou_sigma,
                ));
            }
        }
        Ok(())
    }
}
