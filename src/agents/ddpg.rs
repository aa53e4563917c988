use {
    super::{
        networks::{
            Actor,
            Critic,
        },
        Algorithm,
        OffPolicyAlgorithm,
        SaveableAlgorithm,
    },
    crate::{
        components::{
            Batch,
            OuNoise,
            ReplayBuffer,
        },
        configs::DDPG_Config,
        error::{
            DdpgError,
            Result,
        },
    },
    candle_core::{
        backprop::GradStore,
        Device,
        Tensor,
        Var,
    },
    candle_nn::{
        loss,
        AdamW,
        Optimizer,
        ParamsAdamW,
    },
    std::path::Path,
    tracing::{
        info,
        warn,
    },
};


/// What happened during one [`DDPG::learn`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LearnReport {
    pub critic_loss: f64,
    pub actor_loss: f64,
    /// False when the critic update was skipped because of a non-finite loss
    /// or gradient.
    pub critic_stepped: bool,
    pub actor_stepped: bool,
}

fn check_finite(
    what: &str,
    value: f64,
) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DdpgError::NumericDivergence(format!("{what} ({value})")))
    }
}

/// Backpropagate `loss` and step `optim`, unless the loss or any gradient of
/// `params` is NaN / infinite. Returns the loss value and whether a step was
/// taken.
fn guarded_step(
    optim: &mut AdamW,
    params: &[(String, Var)],
    loss: &Tensor,
    label: &str,
) -> Result<(f64, bool)> {
    let value = loss.to_scalar::<f64>()?;
    let grads = loss.backward()?;

    let checked = check_finite(&format!("{label} loss"), value)
        .and_then(|_| check_gradients(params, &grads));

    match checked {
        Ok(()) => {
            optim.step(&grads)?;
            Ok((value, true))
        }
        Err(DdpgError::NumericDivergence(what)) => {
            warn!("Skipping the {label} update: non-finite {what}");
            Ok((value, false))
        }
        Err(e) => Err(e),
    }
}

fn check_gradients(
    params: &[(String, Var)],
    grads: &GradStore,
) -> Result<()> {
    for (name, var) in params {
        if let Some(grad) = grads.get(var.as_tensor()) {
            // NaN and inf both survive a sum
            check_finite(
                &format!("gradient of {name}"),
                grad.sum_all()?.to_scalar::<f64>()?,
            )?;
        }
    }
    Ok(())
}

fn vars(params: Vec<(String, Var)>) -> Vec<Var> {
    params.into_iter().map(|(_, var)| var).collect()
}

/// Tensors come in either as a single row `(n)` or as rows `(rows, n)`.
fn as_rows(
    what: &str,
    tensor: &Tensor,
    width: usize,
) -> Result<Tensor> {
    let rows = match tensor.rank() {
        1 => tensor.unsqueeze(0)?,
        2 => tensor.clone(),
        rank => Err(DdpgError::Configuration(format!(
            "{what} must have rank 1 or 2, got rank {rank}"
        )))?,
    };
    let got = rows.dim(1)?;
    if got != width {
        Err(DdpgError::Configuration(format!(
            "{what} has width {got} but the agent was built for {width}"
        )))?
    }
    Ok(rows)
}


/// Deep Deterministic Policy Gradient.
///
/// One actor and one critic, each with a local network that is trained and a
/// target network that softly tracks it. Transitions are stored in a
/// [`ReplayBuffer`], exploration comes from an [`OuNoise`] process.
///
/// Every call to [`DDPG::learn`] performs, in this order:
///
/// 1. A critic step minimizing the mean-squared TD error against
///    $y = r + \gamma Q'(s', \mu'(s')) (1 - d)$.
/// 2. An actor step maximizing $Q(s, \mu(s))$ under the freshly updated critic.
/// 3. Soft updates of the critic target, then the actor target.
#[allow(clippy::upper_case_acronyms)]
pub struct DDPG {
    actor: Actor,
    actor_optim: AdamW,
    critic: Critic,
    critic_optim: AdamW,
    gamma: f64,
    tau: f64,
    weight_decay: f64,
    replay_buffer: ReplayBuffer,
    batch_size: usize,
    ou_noise: OuNoise,

    size_state: usize,
    size_action: usize,
    device: Device,
    config: DDPG_Config,
}

impl DDPG {
    pub fn new(
        device: &Device,
        config: &DDPG_Config,
        size_state: usize,
        size_action: usize,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        if size_state == 0 || size_action == 0 {
            Err(DdpgError::Configuration(format!(
                "state size ({size_state}) and action size ({size_action}) must be positive"
            )))?
        }

        let actor = Actor::new(
            device,
            size_state,
            size_action,
            config.hidden_1_size,
            config.hidden_2_size,
        )?;
        let actor_optim = AdamW::new(
            vars(actor.parameters()?),
            ParamsAdamW {
                lr: config.actor_learning_rate,
                weight_decay: 0.0,
                ..Default::default()
            },
        )?;

        let critic = Critic::new(
            device,
            size_state,
            size_action,
            config.hidden_1_size,
            config.hidden_2_size,
        )?;
        // Plain Adam: the critic's weight decay is an L2 term in its loss
        let critic_optim = AdamW::new(
            vars(critic.parameters()?),
            ParamsAdamW {
                lr: config.critic_learning_rate,
                weight_decay: 0.0,
                ..Default::default()
            },
        )?;

        Ok(Self {
            actor,
            actor_optim,
            critic,
            critic_optim,
            gamma: config.gamma,
            tau: config.tau,
            weight_decay: config.weight_decay,
            replay_buffer: ReplayBuffer::new(config.replay_buffer_capacity, seed.wrapping_add(1)),
            batch_size: config.training_batch_size,
            ou_noise: OuNoise::new(
                config.ou_mu,
                config.ou_theta,
                config.ou_sigma,
                config.sigma_decay(),
                config.agent_instances,
                size_action,
                seed,
                device,
            ),
            size_state,
            size_action,
            device: device.clone(),
            config: config.clone(),
        })
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn critic(&self) -> &Critic {
        &self.critic
    }

    pub fn noise(&self) -> &OuNoise {
        &self.ou_noise
    }

    pub fn size_state(&self) -> usize {
        self.size_state
    }

    pub fn size_action(&self) -> usize {
        self.size_action
    }

    /// $y = r + \gamma Q'(s', \mu'(s')) (1 - d)$, detached from the graph.
    fn td_target(
        &self,
        rewards: &Tensor,
        next_states: &Tensor,
        dones: &Tensor,
    ) -> Result<Tensor> {
        let next_actions = self.actor.target_forward(next_states)?;
        let q_next = self.critic.target_forward(next_states, &next_actions)?;
        let not_done = dones.affine(-1.0, 1.0)?;
        let bootstrap = q_next.mul(&not_done)?.affine(self.gamma, 0.0)?;
        Ok(rewards.add(&bootstrap)?.detach())
    }

    /// `loss` plus $\frac{\lambda}{2} \sum \theta^2$ over the local critic
    /// parameters, whose gradient is the usual L2 term $\lambda \theta$.
    fn with_l2_penalty(
        &self,
        loss: &Tensor,
    ) -> Result<Tensor> {
        if self.weight_decay == 0.0 {
            return Ok(loss.clone());
        }
        let mut total = loss.clone();
        for (_, var) in self.critic.parameters()? {
            let penalty = var.as_tensor().sqr()?.sum_all()?.affine(0.5 * self.weight_decay, 0.0)?;
            total = total.add(&penalty)?;
        }
        Ok(total)
    }

    /// The mean-squared TD error of the local critic on `batch`, without
    /// touching any parameters.
    pub fn critic_loss(
        &self,
        batch: &Batch,
    ) -> Result<f64> {
        let q_target = self.td_target(&batch.rewards, &batch.next_states, &batch.dones)?;
        let q = self.critic.forward(&batch.states, &batch.actions)?;
        Ok(loss::mse(&q, &q_target)?.to_scalar::<f64>()?)
    }
}

impl Algorithm for DDPG {
    type Config = DDPG_Config;

    fn config(&self) -> &DDPG_Config {
        &self.config
    }

    fn from_config(
        device: &Device,
        config: &DDPG_Config,
        size_state: usize,
        size_action: usize,
        seed: u64,
    ) -> Result<Box<Self>> {
        Ok(Box::new(Self::new(device, config, size_state, size_action, seed)?))
    }

    fn act(
        &mut self,
        state: &Tensor,
        explore: bool,
    ) -> Result<Tensor> {
        let single = state.rank() == 1;
        let states = as_rows("state", state, self.size_state)?;

        let rows = states.dim(0)?;
        let (noise_rows, _) = self.ou_noise.shape();
        if rows != noise_rows {
            Err(DdpgError::Configuration(format!(
                "got {rows} state rows but the agent acts for {noise_rows} instances"
            )))?
        }

        let mut actions = self.actor.forward(&states.detach())?.detach();
        if explore {
            actions = actions.add(&self.ou_noise.sample()?)?;
        }
        let actions = actions.clamp(-1.0, 1.0)?;

        Ok(if single { actions.squeeze(0)? } else { actions })
    }

    fn reset(&mut self) {
        self.ou_noise.reset();
    }
}

impl OffPolicyAlgorithm for DDPG {
    fn step(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &[f64],
        next_state: &Tensor,
        done: &[bool],
    ) -> Result<Option<LearnReport>> {
        let states = as_rows("state", state, self.size_state)?;
        let actions = as_rows("action", action, self.size_action)?;
        let next_states = as_rows("next state", next_state, self.size_state)?;

        let rows = states.dim(0)?;
        if actions.dim(0)? != rows
            || next_states.dim(0)? != rows
            || reward.len() != rows
            || done.len() != rows
        {
            Err(DdpgError::Configuration(format!(
                "a step needs {rows} rows everywhere, got {} actions, {} next states, {} rewards, {} dones",
                actions.dim(0)?,
                next_states.dim(0)?,
                reward.len(),
                done.len(),
            )))?
        }

        for row in 0..rows {
            let (state, action, next_state) = (
                states.get(row)?,
                actions.get(row)?,
                next_states.get(row)?,
            );
            info!(
                concat!(
                    "\nPushing to replay buffer:",
                    "\n{state:?}",
                    "\n{action:?}",
                    "\n{reward:?}",
                    "\n{next_state:?}",
                    "\n{done:?}",
                ),
                state = state,
                action = action,
                reward = reward[row],
                next_state = next_state,
                done = done[row],
            );
            self.replay_buffer.add(&state, &action, reward[row], &next_state, done[row])?;
        }

        if self.replay_buffer.len() > self.batch_size {
            let batch = self.replay_buffer.sample(self.batch_size)?;
            Ok(Some(self.learn(&batch)?))
        } else {
            Ok(None)
        }
    }

    fn learn(
        &mut self,
        batch: &Batch,
    ) -> Result<LearnReport> {
        let Batch {
            states,
            actions,
            rewards,
            next_states,
            dones,
        } = batch;

        // Critic: regress Q(s, a) onto the TD target
        let q_target = self.td_target(rewards, next_states, dones)?;
        let q = self.critic.forward(states, actions)?;
        let td_loss = loss::mse(&q, &q_target)?;
        let objective = self.with_l2_penalty(&td_loss)?;
        let (_, critic_stepped) = guarded_step(
            &mut self.critic_optim,
            &self.critic.parameters()?,
            &objective,
            "critic",
        )?;
        let critic_loss = td_loss.to_scalar::<f64>()?;

        // Actor: climb the (already updated) critic. Only the actor optimizer
        // steps, so the critic stays fixed here.
        let actor_loss = self
            .critic
            .forward(states, &self.actor.forward(states)?)?
            .mean_all()?
            .neg()?;
        let (actor_loss, actor_stepped) = guarded_step(
            &mut self.actor_optim,
            &self.actor.parameters()?,
            &actor_loss,
            "actor",
        )?;

        self.critic.track(self.tau)?;
        self.actor.track(self.tau)?;

        info!("Learned with critic loss {critic_loss:.6} and actor loss {actor_loss:.6}");

        Ok(LearnReport {
            critic_loss,
            actor_loss,
            critic_stepped,
            actor_stepped,
        })
    }

    fn replay_buffer(&self) -> &ReplayBuffer {
        &self.replay_buffer
    }
}

impl SaveableAlgorithm for DDPG {
    fn save<P: AsRef<Path> + ?Sized>(
        &self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        let actor_path = path.as_ref().join(format!("{name}_actor.safetensors"));
        let critic_path = path.as_ref().join(format!("{name}_critic.safetensors"));

        self.actor
            .save(&actor_path)
            .map_err(|e| DdpgError::persistence(&actor_path, e))?;
        self.critic
            .save(&critic_path)
            .map_err(|e| DdpgError::persistence(&critic_path, e))?;
        Ok(())
    }

    fn load<P: AsRef<Path> + ?Sized>(
        &mut self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        let actor_path = path.as_ref().join(format!("{name}_actor.safetensors"));
        let critic_path = path.as_ref().join(format!("{name}_critic.safetensors"));

        self.actor
            .load(&actor_path, &self.device)
            .map_err(|e| DdpgError::persistence(&actor_path, e))?;
        self.critic
            .load(&critic_path, &self.device)
            .map_err(|e| DdpgError::persistence(&critic_path, e))?;
        Ok(())
    }
}
