use {
    super::ScoreHistory,
    crate::{
        agents::SaveableAlgorithm,
        error::DdpgError,
        util::{
            read_config,
            write_config,
        },
    },
    anyhow::Result,
    polars::prelude::ParquetWriter,
    serde::Serialize,
    std::{
        fs::{
            create_dir_all,
            File,
        },
        path::{
            Path,
            PathBuf,
        },
    },
    tracing::{
        info,
        warn,
    },
};

const SOLVED_PREFIX: &str = "solved_";

/// Report any failure to touch `path` as [`DdpgError::Persistence`].
fn persisted<T, E: ToString>(
    path: &Path,
    result: std::result::Result<T, E>,
) -> Result<T> {
    Ok(result.map_err(|e| DdpgError::persistence(path, e))?)
}

/// Owns the `<results_dir>/results_<iteration>` folder of one run: agent
/// weights, the score record and the configs it was started with.
#[derive(Clone, Debug)]
pub struct Checkpointer {
    folder: PathBuf,
}

impl Checkpointer {
    pub fn new(
        results_dir: impl AsRef<Path>,
        iteration: usize,
    ) -> Self {
        Self {
            folder: results_dir.as_ref().join(format!("results_{iteration}")),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Create the results folder. An existing folder is left as it is.
    pub fn ensure_folder(&self) -> Result<()> {
        persisted(&self.folder, create_dir_all(&self.folder))
    }

    fn agent_name(
        index: usize,
        solved: bool,
    ) -> String {
        let prefix = if solved { SOLVED_PREFIX } else { "" };
        format!("{prefix}agent{}", index + 1)
    }

    /// Save the local weights of every agent as `agent{i}_actor` /
    /// `agent{i}_critic` (prefixed with `solved_` for the solved snapshot).
    pub fn save_models<Alg: SaveableAlgorithm>(
        &self,
        agents: &[Alg],
        solved: bool,
    ) -> Result<()> {
        self.ensure_folder()?;
        for (i, agent) in agents.iter().enumerate() {
            agent.save(&self.folder, &Self::agent_name(i, solved))?;
        }
        info!("Saved {} agents to {}", agents.len(), self.folder.display());
        Ok(())
    }

    pub fn load_models<Alg: SaveableAlgorithm>(
        &self,
        agents: &mut [Alg],
        solved: bool,
    ) -> Result<()> {
        for (i, agent) in agents.iter_mut().enumerate() {
            agent.load(&self.folder, &Self::agent_name(i, solved))?;
        }
        warn!("Loaded {} agents from {}", agents.len(), self.folder.display());
        Ok(())
    }

    /// Write `scores.ron` and `scores.parquet`.
    pub fn save_scores(
        &self,
        history: &ScoreHistory,
    ) -> Result<()> {
        self.ensure_folder()?;

        let ron_path = self.folder.join("scores.ron");
        persisted(&ron_path, write_config(history, &ron_path))?;

        let parquet_path = self.folder.join("scores.parquet");
        let file = persisted(&parquet_path, File::create(&parquet_path))?;
        persisted(
            &parquet_path,
            ParquetWriter::new(file).finish(&mut history.to_dataframe()?),
        )?;
        Ok(())
    }

    pub fn load_scores(&self) -> Result<ScoreHistory> {
        let path = self.folder.join("scores.ron");
        persisted(&path, read_config(&path))
    }

    pub fn write_configs<A: Serialize, T: Serialize>(
        &self,
        alg_config: &A,
        train_config: &T,
    ) -> Result<()> {
        self.ensure_folder()?;
        let alg_path = self.folder.join("config_algorithm.ron");
        persisted(&alg_path, write_config(alg_config, &alg_path))?;
        let train_path = self.folder.join("config_training.ron");
        persisted(&train_path, write_config(train_config, &train_path))
    }
}


#[cfg(test)]
mod tests {
    use {
        super::*,
        polars::prelude::{
            ParquetReader,
            SerReader,
        },
    };

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tennis_rl_checkpoint_{name}_{}", std::process::id()))
    }

    #[test]
    fn folder_is_named_after_the_iteration() {
        let checkpointer = Checkpointer::new("results", 8);
        assert_eq!(checkpointer.folder(), Path::new("results/results_8"));
        assert_eq!(Checkpointer::agent_name(0, false), "agent1");
        assert_eq!(Checkpointer::agent_name(1, true), "solved_agent2");
    }

    #[test]
    fn ensure_folder_twice_is_fine() {
        let dir = scratch("twice");
        let checkpointer = Checkpointer::new(&dir, 3);
        checkpointer.ensure_folder().unwrap();
        checkpointer.ensure_folder().unwrap();
        assert!(checkpointer.folder().is_dir());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn scores_round_trip() {
        let dir = scratch("scores");
        let checkpointer = Checkpointer::new(&dir, 1);

        let mut history = ScoreHistory::new(1, 5, 100, 0.5);
        history.record(0.1, 12);
        history.record(0.0, 9);
        checkpointer.save_scores(&history).unwrap();

        assert_eq!(checkpointer.load_scores().unwrap(), history);

        let df = ParquetReader::new(File::open(checkpointer.folder().join("scores.parquet")).unwrap())
            .finish()
            .unwrap();
        assert_eq!(df.height(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    fn is_persistence_error(result: Result<impl std::fmt::Debug>) -> bool {
        matches!(
            result.unwrap_err().downcast_ref::<DdpgError>(),
            Some(DdpgError::Persistence { .. })
        )
    }

    #[test]
    fn unwritable_results_dir_is_a_persistence_error() {
        // a plain file where the results folder should go
        let blocker = scratch("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let checkpointer = Checkpointer::new(&blocker, 1);

        assert!(is_persistence_error(checkpointer.ensure_folder()));
        assert!(is_persistence_error(
            checkpointer.save_scores(&ScoreHistory::new(1, 5, 100, 0.5))
        ));
        assert!(is_persistence_error(checkpointer.write_configs(&1, &2)));

        std::fs::remove_file(&blocker).ok();
    }

    #[test]
    fn missing_scores_are_a_persistence_error() {
        let checkpointer = Checkpointer::new(scratch("no_scores"), 1);
        assert!(is_persistence_error(checkpointer.load_scores()));
    }
}
