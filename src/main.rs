use {
    anyhow::Result,
    clap::Parser,
    tennis_rl::{
        cli::{
            run,
            Args,
            Env,
        },
        configs::DDPG_Config,
        envs::{
            Environment,
            ScriptedConfig,
            ScriptedEnv,
        },
        logging::setup_logging,
        util::read_config,
    },
};


fn main() -> Result<()> {
    let args = Args::parse();
    if args.log.level().is_some() {
        setup_logging(
            &args.log_file,
            args.log.level(),
            args.log.level(),
        )?;
    }

    match args.env {
        Env::Scripted => {
            let alg_config = match &args.alg_config {
                Some(path) => read_config(path)?,
                None => DDPG_Config::scripted(),
            };
            let env = *ScriptedEnv::new(ScriptedConfig::default())?;
            run(env, alg_config, &args)
        }

        #[cfg(feature = "unity")]
        Env::Unity => {
            use tennis_rl::{
                cli::Mode,
                envs::{
                    UnityConfig,
                    UnityEnv,
                },
            };

            let alg_config = match &args.alg_config {
                Some(path) => read_config(path)?,
                None => DDPG_Config::default(),
            };
            let training = args.mode == Mode::Train;
            let env = *UnityEnv::new(UnityConfig::new(
                args.unity_file.clone(),
                args.seed.unwrap_or(0),
                training,
                training,
            ))?;
            run(env, alg_config, &args)
        }

        #[cfg(not(feature = "unity"))]
        Env::Unity => Err(anyhow::anyhow!(
            "This binary was built without the `unity` feature"
        )),
    }
}
