//! Wrapper around the Python API of the `unityagents` package
use {
    super::{
        Environment,
        Step,
    },
    anyhow::{
        anyhow,
        Error,
        Result,
    },
    pyo3::{
        types::PyDict,
        PyAny,
        PyErr,
        PyObject,
        PyResult,
        Python,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    tracing::warn,
};

fn w(res: PyErr) -> Error {
    anyhow!(res)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnityConfig {
    file_name: String,
    seed: u64,
    // Unity runs faster in train mode, and renders nothing with no_graphics.
    train_mode: bool,
    no_graphics: bool,
}
impl Default for UnityConfig {
    fn default() -> Self {
        Self {
            file_name: "Tennis.app".to_owned(),
            seed: 0,
            train_mode: true,
            no_graphics: true,
        }
    }
}
impl UnityConfig {
    pub fn new(
        file_name: impl Into<String>,
        seed: u64,
        train_mode: bool,
        no_graphics: bool,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            seed,
            train_mode,
            no_graphics,
        }
    }
}

/// The parts of a `BrainInfo` the agents care about.
struct BrainInfo {
    observations: Vec<Vec<f64>>,
    rewards: Vec<f64>,
    dones: Vec<bool>,
}

fn brain_info(
    info: &PyAny,
) -> PyResult<BrainInfo> {
    Ok(BrainInfo {
        observations: info
            .getattr("vector_observations")?
            .call_method0("tolist")?
            .extract()?,
        rewards: info.getattr("rewards")?.extract()?,
        dones: info.getattr("local_done")?.extract()?,
    })
}

/// The Unity Tennis game: two rackets, each observing its own row of the
/// observation matrix. The rows are flattened into one joint observation.
pub struct UnityEnv {
    config: UnityConfig,
    env: PyObject,
    brain_name: String,
    num_agents: usize,
    observation_size: usize,
    action_size: usize,
}

impl UnityEnv {
    fn reset_info(&self) -> Result<BrainInfo> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("train_mode", self.config.train_mode)?;
            let infos = self.env.call_method(py, "reset", (), Some(kwargs))?;
            brain_info(infos.as_ref(py).get_item(self.brain_name.as_str())?)
        })
        .map_err(w)
    }

    pub fn brain_name(&self) -> &str {
        &self.brain_name
    }
}

impl Environment for UnityEnv {
    type Config = UnityConfig;

    fn new(config: UnityConfig) -> Result<Box<Self>> {
        let (env, brain_name, action_size) = Python::with_gil(|py| {
            let unityagents = py.import("unityagents")?;
            let kwargs = PyDict::new(py);
            kwargs.set_item("file_name", config.file_name.as_str())?;
            kwargs.set_item("no_graphics", config.no_graphics)?;
            kwargs.set_item("seed", config.seed)?;
            let env = unityagents
                .getattr("UnityEnvironment")?
                .call((), Some(kwargs))?;

            let brain_name: String = env.getattr("brain_names")?.get_item(0)?.extract()?;
            let brain = env.getattr("brains")?.get_item(brain_name.as_str())?;
            let action_size: usize = brain.getattr("vector_action_space_size")?.extract()?;

            Ok::<(PyObject, String, usize), PyErr>((env.into(), brain_name, action_size))
        })
        .map_err(w)?;

        let mut unity = Self {
            config,
            env,
            brain_name,
            num_agents: 0,
            observation_size: 0,
            action_size,
        };
        let info = unity.reset_info()?;
        unity.num_agents = info.observations.len();
        unity.observation_size = info.observations.first().map_or(0, Vec::len);

        warn!("Brain name: {}", unity.brain_name);
        warn!("Number of agents: {}", unity.num_agents);
        warn!("Each agent observes a state with length: {}", unity.observation_size);
        warn!("Each agent acts on a joint state with length: {}", unity.state_size());

        Ok(Box::new(unity))
    }

    fn config(&self) -> &UnityConfig {
        &self.config
    }

    fn reset(&mut self) -> Result<Vec<f64>> {
        Ok(self.reset_info()?.observations.concat())
    }

    fn step(
        &mut self,
        actions: &[f64],
    ) -> Result<Step> {
        let expected = self.num_agents * self.action_size;
        if actions.len() != expected {
            Err(anyhow!(
                "Expected a joint action of {expected} values, got {}",
                actions.len(),
            ))?
        }
        let rows: Vec<Vec<f64>> = actions
            .chunks(self.action_size)
            .map(|row| row.to_vec())
            .collect();

        let info = Python::with_gil(|py| {
            let numpy = py.import("numpy")?;
            let actions = numpy.call_method1("array", (rows,))?;
            let infos = self.env.call_method1(py, "step", (actions,))?;
            brain_info(infos.as_ref(py).get_item(self.brain_name.as_str())?)
        })
        .map_err(w)?;

        Ok(Step {
            observation: info.observations.concat(),
            rewards: info.rewards,
            dones: info.dones,
        })
    }

    fn close(&mut self) -> Result<()> {
        Python::with_gil(|py| self.env.call_method0(py, "close").map(|_| ())).map_err(w)
    }

    fn num_agents(&self) -> usize {
        self.num_agents
    }

    fn state_size(&self) -> usize {
        self.num_agents * self.observation_size
    }

    fn action_size(&self) -> usize {
        self.action_size
    }
}
