use {
    anyhow::Result,
    polars::prelude::{
        DataFrame,
        NamedFrom,
        Series,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::time::{
        SystemTime,
        UNIX_EPOCH,
    },
};

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// What recording a single episode changed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeProgress {
    /// 1-based episode number.
    pub episode: usize,
    pub score: f64,
    pub average_score: f64,
    /// The rolling average beat the previous best.
    pub improved: bool,
    /// The rolling average reached the solve score for the first time.
    pub solved: bool,
}

/// The score record of one training run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistory {
    iteration: usize,
    episodes: usize,
    timestamp: u64,
    window: usize,
    solve_score: f64,
    best_score: f64,
    all_scores: Vec<f64>,
    average_scores: Vec<f64>,
    steps: Vec<usize>,
    solved_after: Option<usize>,
}

impl ScoreHistory {
    pub fn new(
        iteration: usize,
        episodes: usize,
        window: usize,
        solve_score: f64,
    ) -> Self {
        Self {
            iteration,
            episodes,
            timestamp: now(),
            window: window.max(1),
            solve_score,
            best_score: 0.0,
            all_scores: Vec::new(),
            average_scores: Vec::new(),
            steps: Vec::new(),
            solved_after: None,
        }
    }

    /// Record the score (the best agent's total reward) and length of the
    /// episode that just finished.
    pub fn record(
        &mut self,
        score: f64,
        steps: usize,
    ) -> EpisodeProgress {
        self.all_scores.push(score);
        self.steps.push(steps);

        let recent = &self.all_scores[self.all_scores.len().saturating_sub(self.window)..];
        let average_score = recent.iter().sum::<f64>() / recent.len() as f64;
        self.average_scores.push(average_score);

        let improved = average_score > self.best_score;
        if improved {
            self.best_score = average_score;
        }

        let episode = self.all_scores.len();
        let solved = self.solved_after.is_none() && average_score >= self.solve_score;
        if solved {
            self.solved_after = Some(episode);
        }
        self.timestamp = now();

        EpisodeProgress {
            episode,
            score,
            average_score,
            improved,
            solved,
        }
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }
    /// The number of episodes the run was planned for.
    pub fn episodes(&self) -> usize {
        self.episodes
    }
    pub fn episodes_run(&self) -> usize {
        self.all_scores.len()
    }
    /// Seconds since the epoch at the last update.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
    pub fn best_score(&self) -> f64 {
        self.best_score
    }
    pub fn scores(&self) -> &[f64] {
        &self.all_scores
    }
    pub fn average_scores(&self) -> &[f64] {
        &self.average_scores
    }
    pub fn steps(&self) -> &[usize] {
        &self.steps
    }
    pub fn solved_after(&self) -> Option<usize> {
        self.solved_after
    }
    pub fn latest_average(&self) -> Option<f64> {
        self.average_scores.last().copied()
    }

    /// One row per episode: `episode`, `score`, `average_score`, `steps`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let episodes: Vec<u64> = (1..=self.all_scores.len() as u64).collect();
        let steps: Vec<u64> = self.steps.iter().map(|&s| s as u64).collect();
        Ok(DataFrame::new(vec![
            Series::new("episode", &episodes),
            Series::new("score", &self.all_scores),
            Series::new("average_score", &self.average_scores),
            Series::new("steps", &steps),
        ])?)
    }
}
