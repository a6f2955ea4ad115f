pub mod multi_staking;
