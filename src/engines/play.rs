use {
    super::{
        run::{
            episode_score,
            run_episode,
        },
        Checkpointer,
    },
    crate::{
        agents::{
            OffPolicyAlgorithm,
            RunMode,
            SaveableAlgorithm,
        },
        configs::TestConfig,
        envs::Environment,
    },
    anyhow::Result,
    candle_core::Device,
    tracing::warn,
};


/// Load the weights of a finished run and let the agents play without
/// exploring or learning. Returns the score of every game.
pub fn play_agents<Env, Alg>(
    env: &mut Env,
    agents: &mut [Alg],
    config: &TestConfig,
    device: &Device,
) -> Result<Vec<f64>>
where
    Env: Environment,
    Alg: OffPolicyAlgorithm + SaveableAlgorithm,
{
    Checkpointer::new(config.results_dir(), config.iteration())
        .load_models(agents, config.solved())?;

    let mut games = Vec::with_capacity(config.games_to_play());
    for game in 1..=config.games_to_play() {
        let (scores, steps) = run_episode(env, agents, RunMode::Test, device)?;
        let score = episode_score(&scores);
        warn!("Game {game}: score {score:.2} after {steps} steps");
        games.push(score);
    }

    env.close()?;
    Ok(games)
}
