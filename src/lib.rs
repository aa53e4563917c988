pub mod error;
pub mod logging;
pub mod util;

pub mod components;
pub mod agents;
pub mod configs;
pub mod envs;
pub mod engines;

pub mod cli;
