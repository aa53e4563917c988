mod train;
mod ddpg;

pub use train::TrainConfig;
pub use test::TestConfig;
pub use ddpg::DDPG_Config;
