use {
    crate::{
        agents::{
            OffPolicyAlgorithm,
            RunMode,
        },
        envs::Environment,
    },
    anyhow::{
        anyhow,
        Result,
    },
    candle_core::{
        Device,
        Tensor,
    },
    tracing::info,
};


/// Play a single episode with every agent acting on the joint observation.
///
/// In [`RunMode::Train`] actions are explored and every agent `step`s on its
/// own reward and done flag. The episode ends as soon as any agent is done.
///
/// Returns each agent's summed reward and the number of steps taken.
pub fn run_episode<Env, Alg>(
    env: &mut Env,
    agents: &mut [Alg],
    mode: RunMode,
    device: &Device,
) -> Result<(Vec<f64>, usize)>
where
    Env: Environment,
    Alg: OffPolicyAlgorithm,
{
    if agents.len() != env.num_agents() {
        Err(anyhow!(
            "The environment has {} agents but {} were given",
            env.num_agents(),
            agents.len(),
        ))?
    }

    let mut state = Tensor::new(env.reset()?.as_slice(), device)?.unsqueeze(0)?;
    for agent in agents.iter_mut() {
        agent.reset();
    }

    let mut scores = vec![0.0; agents.len()];
    let mut steps = 0;

    loop {
        let actions = agents
            .iter_mut()
            .map(|agent| agent.act(&state, mode.explores()))
            .collect::<Result<Vec<Tensor>, _>>()?;
        let joint_action = Tensor::cat(&actions, 1)?.flatten_all()?.to_vec1::<f64>()?;

        let step = env.step(&joint_action)?;
        if step.rewards.len() != agents.len() || step.dones.len() != agents.len() {
            Err(anyhow!(
                "Expected {} rewards and dones, got {} and {}",
                agents.len(),
                step.rewards.len(),
                step.dones.len(),
            ))?
        }
        let next_state = Tensor::new(step.observation.as_slice(), device)?.unsqueeze(0)?;

        if mode == RunMode::Train {
            for (i, (agent, action)) in agents.iter_mut().zip(actions.iter()).enumerate() {
                agent.step(
                    &state,
                    action,
                    &step.rewards[i..=i],
                    &next_state,
                    &step.dones[i..=i],
                )?;
            }
        }

        for (score, reward) in scores.iter_mut().zip(step.rewards.iter()) {
            *score += reward;
        }
        steps += 1;
        state = next_state;

        if step.dones.iter().any(|&done| done) {
            break;
        }
    }

    info!("{mode} episode finished after {steps} steps with scores {scores:?}");
    Ok((scores, steps))
}

/// The score of an episode is the best agent's summed reward.
pub fn episode_score(scores: &[f64]) -> f64 {
    scores.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
