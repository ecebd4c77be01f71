pub mod aggregator;
pub mod gateway;
pub mod presenter;
pub mod ranking;
pub mod session;
