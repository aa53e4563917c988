use {
    serde::{
        Serialize,
        Deserialize,
    },
    std::path::PathBuf,
};


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    // Results of this run go to `<results_dir>/results_<iteration>`.
    iteration: usize,
    results_dir: PathBuf,
    // The total number of episodes.
    max_episodes: usize,
    // Write the score record every this many episodes.
    save_every: usize,
    // The number of episodes the rolling average score is taken over.
    score_window: usize,
    // The rolling average score at which the environment counts as solved.
    solve_score: f64,
    // Seed for the agents' noise processes and replay buffers.
    seed: u64,
}
impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            iteration: 8,
            results_dir: PathBuf::from("results"),
            max_episodes: 5_000,
            save_every: 100,
            score_window: 100,
            solve_score: 0.5,
            seed: 0,
        }
    }
}
impl TrainConfig {
    pub fn new(
        iteration: usize,
        results_dir: impl Into<PathBuf>,
        max_episodes: usize,
        save_every: usize,
    ) -> Self {
        Self {
            iteration,
            results_dir: results_dir.into(),
            max_episodes,
            save_every,
            ..Self::default()
        }
    }
}

impl TrainConfig {
    pub fn iteration(&self) -> usize {
        self.iteration
    }
    pub fn results_dir(&self) -> &PathBuf {
        &self.results_dir
    }
    pub fn max_episodes(&self) -> usize {
        self.max_episodes
    }
    pub fn save_every(&self) -> usize {
        self.save_every
    }
    pub fn score_window(&self) -> usize {
        self.score_window
    }
    pub fn solve_score(&self) -> f64 {
        self.solve_score
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
    pub fn set_iteration(&mut self, iteration: usize) {
        self.iteration = iteration;
    }
    pub fn set_results_dir(&mut self, results_dir: impl Into<PathBuf>) {
        self.results_dir = results_dir.into();
    }
    pub fn set_max_episodes(&mut self, max_episodes: usize) {
        self.max_episodes = max_episodes;
    }
    pub fn set_save_every(&mut self, save_every: usize) {
        self.save_every = save_every;
    }
    pub fn set_score_window(&mut self, score_window: usize) {
        self.score_window = score_window;
    }
    pub fn set_solve_score(&mut self, solve_score: f64) {
        self.solve_score = solve_score;
    }
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }
}
