mod ddpg;
mod networks;

pub use ddpg::{
    LearnReport,
    DDPG,
};
pub use networks::{
    Actor,
    Critic,
};


use {
    crate::{
        components::{
            Batch,
            ReplayBuffer,
        },
        error::Result,
    },
    candle_core::{
        Device,
        Tensor,
    },
    std::{
        fmt::Display,
        path::Path,
    },
};


/// The execution mode of an agent is either training or testing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Train,
    Test,
}

impl RunMode {
    /// Only training explores (i.e. adds noise to actions).
    pub fn explores(&self) -> bool {
        matches!(self, RunMode::Train)
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Train => write!(f, "Train"),
            RunMode::Test => write!(f, "Test"),
        }
    }
}

pub trait Algorithm {
    type Config;

    fn config(&self) -> &Self::Config;
    fn from_config(
        device: &Device,
        config: &Self::Config,
        size_state: usize,
        size_action: usize,
        seed: u64,
    ) -> Result<Box<Self>>;

    fn act(
        &mut self,
        state: &Tensor,
        explore: bool,
    ) -> Result<Tensor>;

    /// Called once per episode boundary.
    fn reset(&mut self);
}

pub trait OffPolicyAlgorithm: Algorithm {
    /// Store one transition per state row, and learn from one fresh batch once
    /// the replay buffer holds more than a batch worth of transitions.
    fn step(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &[f64],
        next_state: &Tensor,
        done: &[bool],
    ) -> Result<Option<LearnReport>>;

    fn learn(
        &mut self,
        batch: &Batch,
    ) -> Result<LearnReport>;

    fn replay_buffer(&self) -> &ReplayBuffer;
}

pub trait SaveableAlgorithm {
    fn save<P: AsRef<Path> + ?Sized>(
        &self,
        path: &P,
        name: &str,
    ) -> Result<()>;

    fn load<P: AsRef<Path> + ?Sized>(
        &mut self,
        path: &P,
        name: &str,
    ) -> Result<()>;
}
