use {
    super::{
        Environment,
        Step,
    },
    anyhow::{
        anyhow,
        Result,
    },
    serde::{
        Deserialize,
        Serialize,
    },
};


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedConfig {
    num_agents: usize,
    // Per agent, the joint observation is `num_agents * observation_size` wide.
    observation_size: usize,
    action_size: usize,
    episode_length: usize,
    // The reward each agent receives on every step.
    rewards: Vec<f64>,
}
impl Default for ScriptedConfig {
    fn default() -> Self {
        Self {
            num_agents: 2,
            observation_size: 24,
            action_size: 2,
            episode_length: 10,
            rewards: vec![0.01, 0.02],
        }
    }
}
impl ScriptedConfig {
    pub fn new(
        num_agents: usize,
        observation_size: usize,
        action_size: usize,
        episode_length: usize,
        rewards: Vec<f64>,
    ) -> Self {
        Self {
            num_agents,
            observation_size,
            action_size,
            episode_length,
            rewards,
        }
    }

    pub fn num_agents(&self) -> usize {
        self.num_agents
    }
    pub fn observation_size(&self) -> usize {
        self.observation_size
    }
    pub fn action_size(&self) -> usize {
        self.action_size
    }
    pub fn episode_length(&self) -> usize {
        self.episode_length
    }
    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }
}


/// A deterministic stand-in for the Tennis game.
///
/// Observations are a fixed function of the step count, so two runs with the
/// same agents see exactly the same episodes. All agents are done after
/// `episode_length` steps.
#[derive(Clone, Debug)]
pub struct ScriptedEnv {
    config: ScriptedConfig,
    t: usize,
    done: bool,
    closed: bool,
}

impl ScriptedEnv {
    fn observation(&self) -> Vec<f64> {
        let width = self.config.observation_size;
        (0..self.config.num_agents * width)
            .map(|i| {
                let (agent, j) = (i / width, i % width);
                (0.1 * (self.t * (j + 1) + agent) as f64).sin()
            })
            .collect()
    }

    /// Steps taken in the current episode.
    pub fn t(&self) -> usize {
        self.t
    }
}

impl Environment for ScriptedEnv {
    type Config = ScriptedConfig;

    fn new(config: ScriptedConfig) -> Result<Box<Self>> {
        if config.num_agents == 0 || config.observation_size == 0 || config.action_size == 0 {
            Err(anyhow!("A scripted environment needs agents, observations and actions"))?
        }
        if config.episode_length == 0 {
            Err(anyhow!("Episodes must last at least one step"))?
        }
        if config.rewards.len() != config.num_agents {
            Err(anyhow!(
                "Got {} rewards for {} agents",
                config.rewards.len(),
                config.num_agents,
            ))?
        }
        Ok(Box::new(Self {
            config,
            t: 0,
            done: false,
            closed: false,
        }))
    }

    fn config(&self) -> &ScriptedConfig {
        &self.config
    }

    fn reset(&mut self) -> Result<Vec<f64>> {
        if self.closed {
            Err(anyhow!("The environment has been closed"))?
        }
        self.t = 0;
        self.done = false;
        Ok(self.observation())
    }

    fn step(
        &mut self,
        actions: &[f64],
    ) -> Result<Step> {
        if self.closed {
            Err(anyhow!("The environment has been closed"))?
        }
        if self.done {
            Err(anyhow!("The episode is over, reset the environment first"))?
        }
        let expected = self.config.num_agents * self.config.action_size;
        if actions.len() != expected {
            Err(anyhow!(
                "Expected a joint action of {expected} values, got {}",
                actions.len(),
            ))?
        }

        self.t += 1;
        self.done = self.t >= self.config.episode_length;
        Ok(Step {
            observation: self.observation(),
            rewards: self.config.rewards.clone(),
            dones: vec![self.done; self.config.num_agents],
        })
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn num_agents(&self) -> usize {
        self.config.num_agents
    }

    fn state_size(&self) -> usize {
        self.config.num_agents * self.config.observation_size
    }

    fn action_size(&self) -> usize {
        self.config.action_size
    }
}
