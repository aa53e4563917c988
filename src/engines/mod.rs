mod checkpoint;
mod play;
mod run;
mod scores;
mod train;

pub use checkpoint::Checkpointer;
pub use play::play_agents;
pub use run::{
    episode_score,
    run_episode,
};
pub use scores::{
    EpisodeProgress,
    ScoreHistory,
};
pub use train::train_agents;
