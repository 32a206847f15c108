pub mod provider_mock;
pub mod random_mock;

pub use provider_mock::MockWalletProvider;
pub use random_mock::SequenceRandom;
