//! # Components
//!
//! This module contains the components that the [`crate::agents::DDPG`] agent
//! is built from.
//!
//! ## Noise
//!
//! The [`OuNoise`] struct implements the Ornstein-Uhlenbeck process, which is
//! added to the actions of an agent for temporally correlated exploration.
//!
//! ## Replay Buffer
//!
//! The [`ReplayBuffer`] struct implements a fixed-capacity ring buffer of
//! [`Transition`]s with uniform sampling of [`Batch`]es.
//!
//! ## Soft Update
//!
//! The [`soft_update`] module blends local network parameters into their
//! slowly tracking target copies.

mod ou_noise;
mod replay_buffer;

pub mod soft_update;
pub use ou_noise::{
    OuNoise,
    SigmaDecay,
};
pub use replay_buffer::{
    Batch,
    ReplayBuffer,
    Transition,
};
