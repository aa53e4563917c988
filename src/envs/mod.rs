//! # Environments
//!
//! Multi-agent environments in which every agent sees the same joint
//! observation and controls its own slice of the joint action.
//!
//! - [`ScriptedEnv`] is a small deterministic environment with fixed rewards
//!   and a fixed episode length.
//! - `UnityEnv` (behind the `unity` feature) drives the Tennis game through
//!   the Python `unityagents` package.

mod scripted;
#[cfg(feature = "unity")]
mod unity;

use anyhow::Result;

pub use scripted::{
    ScriptedConfig,
    ScriptedEnv,
};
#[cfg(feature = "unity")]
pub use unity::{
    UnityConfig,
    UnityEnv,
};

/// The outcome of stepping all agents at once.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// The joint observation, `state_size()` values.
    pub observation: Vec<f64>,
    /// One reward per agent.
    pub rewards: Vec<f64>,
    /// One done flag per agent.
    pub dones: Vec<bool>,
}

pub trait Environment {
    type Config;

    fn new(config: Self::Config) -> Result<Box<Self>>;
    fn config(&self) -> &Self::Config;

    /// Start a new episode and return the joint observation.
    fn reset(&mut self) -> Result<Vec<f64>>;

    /// Apply the joint action: `num_agents() * action_size()` values, agent
    /// slices concatenated in agent order.
    fn step(
        &mut self,
        actions: &[f64],
    ) -> Result<Step>;

    fn close(&mut self) -> Result<()>;

    fn num_agents(&self) -> usize;
    /// Width of the joint observation each agent acts on.
    fn state_size(&self) -> usize;
    /// Width of a single agent's action.
    fn action_size(&self) -> usize;
}
