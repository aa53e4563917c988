use {
    crate::{
        agents::{
            Algorithm,
            DDPG,
        },
        configs::{
            DDPG_Config,
            TestConfig,
            TrainConfig,
        },
        engines::{
            play_agents,
            train_agents,
        },
        envs::Environment,
        util::read_config,
    },
    anyhow::Result,
    candle_core::Device,
    clap::{
        Parser,
        ValueEnum,
    },
    std::path::PathBuf,
    tracing::{
        warn,
        Level,
    },
};


#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Train,
    Test,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Scripted,
    Unity,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceArg {
    Cpu,
    Cuda,
}
impl DeviceArg {
    pub fn device(&self) -> Result<Device> {
        Ok(match self {
            DeviceArg::Cpu => Device::Cpu,
            DeviceArg::Cuda => Device::new_cuda(0)?,
        })
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loglevel {
    Error, // put these only during active debugging and then downgrade later
    Warn,  // main events in the program
    Info,  // all the little details
    None,  // don't log anything
}
impl Loglevel {
    pub fn level(&self) -> Option<Level> {
        match self {
            Loglevel::Error => Some(Level::ERROR),
            Loglevel::Warn => Some(Level::WARN),
            Loglevel::Info => Some(Level::INFO),
            Loglevel::None => None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Train new agents, or watch trained ones play.
    #[arg(long, value_enum, default_value_t=Mode::Train)]
    pub mode: Mode,

    /// The environment to run.
    #[arg(long, value_enum, default_value_t=Env::Scripted)]
    pub env: Env,

    /// The Unity build of the Tennis game.
    #[arg(long, default_value = "Tennis.app")]
    pub unity_file: String,

    #[arg(long, value_enum, default_value_t=DeviceArg::Cpu)]
    pub device: DeviceArg,

    /// A `.ron` file with the agent hyperparameters.
    #[arg(long)]
    pub alg_config: Option<PathBuf>,

    /// A `.ron` file with the training settings.
    #[arg(long)]
    pub train_config: Option<PathBuf>,

    /// A `.ron` file with the test settings.
    #[arg(long)]
    pub test_config: Option<PathBuf>,

    /// Seed for the exploration noise and the replay buffers.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Setup logging
    #[arg(long, value_enum, default_value_t=Loglevel::None)]
    pub log: Loglevel,

    #[arg(long, default_value = crate::logging::DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

/// One agent per player. Agent `i` gets seed `seed + 2i`, so that no two
/// noise processes or replay buffers share a seed.
pub fn make_agents(
    device: &Device,
    config: &DDPG_Config,
    num_agents: usize,
    size_state: usize,
    size_action: usize,
    seed: u64,
) -> Result<Vec<DDPG>> {
    (0..num_agents)
        .map(|i| -> Result<DDPG> {
            Ok(*DDPG::from_config(
                device,
                config,
                size_state,
                size_action,
                seed.wrapping_add(2 * i as u64),
            )?)
        })
        .collect()
}

/// Build the agents for `env` and train or test them, depending on `args`.
pub fn run<E: Environment>(
    mut env: E,
    alg_config: DDPG_Config,
    args: &Args,
) -> Result<()> {
    let device = args.device.device()?;

    match args.mode {
        Mode::Train => {
            let mut train_config: TrainConfig = match &args.train_config {
                Some(path) => read_config(path)?,
                None => TrainConfig::default(),
            };
            if let Some(seed) = args.seed {
                train_config.set_seed(seed);
            }

            let mut agents = make_agents(
                &device,
                &alg_config,
                env.num_agents(),
                env.state_size(),
                env.action_size(),
                train_config.seed(),
            )?;
            train_agents(&mut env, &mut agents, &train_config, &device)?;
        }
        Mode::Test => {
            let test_config: TestConfig = match &args.test_config {
                Some(path) => read_config(path)?,
                None => TestConfig::default(),
            };

            let mut agents = make_agents(
                &device,
                &alg_config,
                env.num_agents(),
                env.state_size(),
                env.action_size(),
                args.seed.unwrap_or(0),
            )?;
            let scores = play_agents(&mut env, &mut agents, &test_config, &device)?;
            warn!("Played {} games with scores {scores:?}", scores.len());
        }
    }
    Ok(())
}
