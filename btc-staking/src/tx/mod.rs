//! Transaction Builder (component C5): produces the staking, unbonding,
//! slashing and withdrawal PSBTs.

mod helpers;
pub mod slashing;
pub mod staking;
pub mod unbonding;
pub mod withdrawal;

pub use slashing::slashing_transaction;
pub use staking::staking_transaction;
pub use unbonding::unbonding_transaction;
pub use withdrawal::{
    withdraw_early_unbonded_transaction, withdraw_timelock_unbonded_transaction,
    withdrawal_transaction,
};
