use {
    candle_core::{
        Device,
        Tensor,
    },
    std::path::PathBuf,
    tennis_rl::{
        agents::{
            OffPolicyAlgorithm,
            RunMode,
            DDPG,
        },
        cli::make_agents,
        configs::{
            DDPG_Config,
            TestConfig,
            TrainConfig,
        },
        engines::{
            play_agents,
            run_episode,
            train_agents,
            Checkpointer,
        },
        envs::{
            Environment,
            ScriptedConfig,
            ScriptedEnv,
        },
    },
};

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tennis_rl_it_{name}_{}", std::process::id()))
}

fn env() -> ScriptedEnv {
    *ScriptedEnv::new(ScriptedConfig::default()).unwrap()
}

fn agents(env: &ScriptedEnv, seed: u64) -> Vec<DDPG> {
    make_agents(
        &Device::Cpu,
        &DDPG_Config::scripted(),
        env.num_agents(),
        env.state_size(),
        env.action_size(),
        seed,
    )
    .unwrap()
}

fn actions(agent: &DDPG) -> Vec<f64> {
    let state = Tensor::ones((1, 48), candle_core::DType::F64, &Device::Cpu).unwrap();
    agent.actor().forward(&state).unwrap().flatten_all().unwrap().to_vec1::<f64>().unwrap()
}

#[test]
fn training_writes_scores_and_checkpoints() {
    let dir = scratch("train");
    let mut config = TrainConfig::new(1, &dir, 3, 2);
    config.set_solve_score(0.15);

    let mut env = env();
    let mut agents = agents(&env, 0);
    let history = train_agents(&mut env, &mut agents, &config, &Device::Cpu).unwrap();

    assert_eq!(history.scores().len(), 3);
    assert_eq!(history.steps(), &[10, 10, 10]);
    // the better agent collects 0.02 per step
    for score in history.scores() {
        assert!((score - 0.2).abs() < 1e-9);
    }
    assert_eq!(history.solved_after(), Some(1));
    assert!(history.best_score() > 0.0);

    // both agents stored one transition per step
    for agent in &agents {
        assert_eq!(agent.replay_buffer().len(), 30);
    }

    let folder = Checkpointer::new(&dir, 1).folder().to_path_buf();
    for file in [
        "agent1_actor.safetensors",
        "agent1_critic.safetensors",
        "agent2_actor.safetensors",
        "agent2_critic.safetensors",
        "solved_agent1_actor.safetensors",
        "solved_agent2_critic.safetensors",
        "scores.ron",
        "scores.parquet",
        "config_algorithm.ron",
        "config_training.ron",
    ] {
        assert!(folder.join(file).exists(), "{file} is missing");
    }

    let saved = Checkpointer::new(&dir, 1).load_scores().unwrap();
    assert_eq!(saved, history);

    // closed after training
    assert!(env.reset().is_err());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn training_into_an_existing_folder_is_fine() {
    let dir = scratch("existing");
    let config = TrainConfig::new(2, &dir, 1, 1);
    Checkpointer::new(&dir, 2).ensure_folder().unwrap();

    let mut env = env();
    let mut agents = agents(&env, 3);
    let history = train_agents(&mut env, &mut agents, &config, &Device::Cpu).unwrap();
    assert_eq!(history.episodes_run(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn trained_agents_can_be_played_back() {
    let dir = scratch("play");
    let config = TrainConfig::new(4, &dir, 2, 1);

    let mut env = env();
    let mut trained = agents(&env, 0);
    train_agents(&mut env, &mut trained, &config, &Device::Cpu).unwrap();

    let mut env = self::env();
    let mut players = agents(&env, 9);
    let test_config = TestConfig::new(4, &dir, 2);
    let scores = play_agents(&mut env, &mut players, &test_config, &Device::Cpu).unwrap();

    assert_eq!(scores.len(), 2);
    for score in &scores {
        assert!((score - 0.2).abs() < 1e-9);
    }
    // playing never learns
    for agent in &players {
        assert!(agent.replay_buffer().is_empty());
    }
    // the checkpoint of episode 1 is the one on disk, and it was never
    // overwritten because the average did not improve afterwards
    let mut reference = agents(&env, 5);
    Checkpointer::new(&dir, 4).load_models(&mut reference, false).unwrap();
    for (player, reference) in players.iter().zip(reference.iter()) {
        assert_eq!(actions(player), actions(reference));
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn playing_without_checkpoints_fails() {
    let dir = scratch("missing");
    let mut env = env();
    let mut players = agents(&env, 0);
    let test_config = TestConfig::new(99, &dir, 1);
    assert!(play_agents(&mut env, &mut players, &test_config, &Device::Cpu).is_err());
}

#[test]
fn saved_weights_restore_identical_policies() {
    let dir = scratch("weights");
    let checkpointer = Checkpointer::new(&dir, 5);

    let env = env();
    let originals = agents(&env, 0);
    checkpointer.save_models(&originals, false).unwrap();

    let mut restored = agents(&env, 1);
    checkpointer.load_models(&mut restored, false).unwrap();
    for (original, restored) in originals.iter().zip(restored.iter()) {
        assert_eq!(actions(original), actions(restored));
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn agent_count_must_match_the_environment() {
    let mut env = env();
    let mut agents = agents(&env, 0);
    agents.pop();
    assert!(run_episode(&mut env, &mut agents, RunMode::Train, &Device::Cpu).is_err());
}
