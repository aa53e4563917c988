use {
    super::{
        run::{
            episode_score,
            run_episode,
        },
        Checkpointer,
        ScoreHistory,
    },
    crate::{
        agents::{
            OffPolicyAlgorithm,
            RunMode,
            SaveableAlgorithm,
        },
        configs::TrainConfig,
        envs::Environment,
    },
    anyhow::Result,
    candle_core::Device,
    serde::Serialize,
    tracing::warn,
};


/// Train all agents against each other for `config.max_episodes()` episodes.
///
/// After every episode the weights are saved whenever the rolling average
/// score improves, the score record is written every `config.save_every()`
/// episodes, and a `solved_` snapshot is taken the first time the average
/// reaches `config.solve_score()`. The environment is closed at the end.
///
/// # Arguments
///
/// * `env` - The environment to train in.
/// * `agents` - One agent per player, in the environment's agent order.
/// * `config` - Episodes, checkpointing and the results folder.
/// * `device` - The device to run on.
pub fn train_agents<Env, Alg>(
    env: &mut Env,
    agents: &mut [Alg],
    config: &TrainConfig,
    device: &Device,
) -> Result<ScoreHistory>
where
    Env: Environment,
    Alg: OffPolicyAlgorithm + SaveableAlgorithm,
    Alg::Config: Serialize,
{
    let checkpointer = Checkpointer::new(config.results_dir(), config.iteration());
    checkpointer.ensure_folder()?;
    if let Some(agent) = agents.first() {
        checkpointer.write_configs(agent.config(), config)?;
    }

    warn!(
        "Training {} agents for {} episodes into {}",
        agents.len(),
        config.max_episodes(),
        checkpointer.folder().display(),
    );

    let mut history = ScoreHistory::new(
        config.iteration(),
        config.max_episodes(),
        config.score_window(),
        config.solve_score(),
    );

    for _ in 0..config.max_episodes() {
        let (scores, steps) = run_episode(env, agents, RunMode::Train, device)?;
        let progress = history.record(episode_score(&scores), steps);

        warn!(
            "Episode: {} \t Episode score: {:.2} \t Average score: {:.2}",
            progress.episode, progress.score, progress.average_score,
        );

        if progress.improved {
            checkpointer.save_models(agents, false)?;
        }

        if config.save_every() > 0 && progress.episode % config.save_every() == 0 {
            warn!(
                "Checkpoint at episode {}: best score {:.2}, average score {:.2}",
                progress.episode,
                history.best_score(),
                progress.average_score,
            );
            checkpointer.save_scores(&history)?;
        }

        if progress.solved {
            warn!(
                "Environment solved after {} episodes with an average score of {:.2}",
                progress.episode, progress.average_score,
            );
            checkpointer.save_models(agents, true)?;
        }
    }

    checkpointer.save_scores(&history)?;
    env.close()?;

    warn!(
        "Ran {} episodes, best average score {:.2}",
        history.episodes_run(),
        history.best_score(),
    );
    if let Some(episode) = history.solved_after() {
        warn!("Solved after {episode} episodes");
    }

    Ok(history)
}
