use {
    crate::error::{
        DdpgError,
        Result,
    },
    candle_core::Tensor,
    rand::{
        rngs::StdRng,
        seq::index,
        SeedableRng,
    },
    std::collections::VecDeque,
    unzip_n::unzip_n,
};

unzip_n!(5);

/// A transition in the replay buffer.
///
/// # Fields
///
/// * `state` - The state tensor, shape `(size_state)`.
/// * `action` - The action tensor, shape `(size_action)`.
/// * `reward` - The reward tensor, shape `(1)`.
/// * `next_state` - The next state tensor, shape `(size_state)`.
/// * `done` - `1.0` if the episode ended on this transition, else `0.0`, shape `(1)`.
#[derive(Clone, Debug)]
pub struct Transition {
    state: Tensor,
    action: Tensor,
    reward: Tensor,
    next_state: Tensor,
    done: Tensor,
}
impl Transition {
    pub fn new(
        state: &Tensor,
        action: &Tensor,
        reward: f64,
        next_state: &Tensor,
        done: bool,
    ) -> Result<Self> {
        let device = state.device();
        Ok(Self {
            state: state.detach(),
            action: action.detach(),
            reward: Tensor::new(&[reward], device)?,
            next_state: next_state.detach(),
            done: Tensor::new(&[if done { 1.0 } else { 0.0 }], device)?,
        })
    }

    pub fn state(&self) -> &Tensor {
        &self.state
    }
    pub fn action(&self) -> &Tensor {
        &self.action
    }
    pub fn reward(&self) -> &Tensor {
        &self.reward
    }
    pub fn next_state(&self) -> &Tensor {
        &self.next_state
    }
    pub fn done(&self) -> &Tensor {
        &self.done
    }
}

/// A batch of transitions, grouped by field.
///
/// Row `i` of every tensor belongs to the same transition.
#[derive(Clone, Debug)]
pub struct Batch {
    pub states: Tensor,
    pub actions: Tensor,
    pub rewards: Tensor,
    pub next_states: Tensor,
    pub dones: Tensor,
}
impl Batch {
    pub fn len(&self) -> usize {
        self.states.dims().first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A replay buffer for off-policy algorithms.
///
/// The replay buffer is implemented as a simple ring buffer / VecDeque: once
/// `capacity` is reached, every push evicts the oldest transition.
///
/// # Fields
///
/// * `buffer` - The buffer of transitions.
/// * `capacity` - The capacity of the buffer.
/// * `rng` - The source of randomness for sampling.
#[derive(Clone)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
    rng: StdRng,
}
impl ReplayBuffer {
    /// Create a new replay buffer with the given capacity.
    pub fn new(
        capacity: usize,
        seed: u64,
    ) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    /// Iterate over the stored transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    /// Push a transition into the buffer.
    ///
    /// If the buffer is full, the oldest transition is removed to make room for
    /// the new transition.
    pub fn push(
        &mut self,
        transition: Transition,
    ) {
        if self.capacity == 0 {
            return;
        }
        if self.is_full() {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Build a transition and push it.
    pub fn add(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: f64,
        next_state: &Tensor,
        done: bool,
    ) -> Result<()> {
        self.push(Transition::new(state, action, reward, next_state, done)?);
        Ok(())
    }

    /// Sample a random batch of distinct transitions from the buffer.
    ///
    /// Callers are expected to check [`ReplayBuffer::len`] first: asking for
    /// more transitions than the buffer holds is an
    /// [`DdpgError::InsufficientData`] error, never a short batch.
    pub fn sample(
        &mut self,
        batch_size: usize,
    ) -> Result<Batch> {
        if batch_size == 0 || self.len() < batch_size {
            return Err(DdpgError::InsufficientData {
                requested: batch_size,
                available: self.len(),
            });
        }

        let transition_to_tuple =
            |t: &Transition| -> candle_core::Result<(Tensor, Tensor, Tensor, Tensor, Tensor)> {
                Ok((
                    t.state.unsqueeze(0)?,
                    t.action.unsqueeze(0)?,
                    t.reward.unsqueeze(0)?,
                    t.next_state.unsqueeze(0)?,
                    t.done.unsqueeze(0)?,
                ))
            };

        let (states, actions, rewards, next_states, dones) =
            index::sample(&mut self.rng, self.buffer.len(), batch_size)
            .into_iter()
            .map(|i| transition_to_tuple(&self.buffer[i]))
            .collect::<candle_core::Result<Vec<(Tensor, Tensor, Tensor, Tensor, Tensor)>>>()?
            .into_iter()
            .unzip_n_vec();

        Ok(Batch {
            states: Tensor::cat(&states, 0)?,
            actions: Tensor::cat(&actions, 0)?,
            rewards: Tensor::cat(&rewards, 0)?,
            next_states: Tensor::cat(&next_states, 0)?,
            dones: Tensor::cat(&dones, 0)?,
        })
    }
}
