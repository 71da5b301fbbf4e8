#![deny(missing_docs)]
/*!
# btc-staking: unsigned Bitcoin transaction construction for BTC staking

Builds the Taproot script tree, PSBTs and witness stacks for a BTC staking
protocol with a staker timelock withdrawal path, a covenant-guarded
unbonding path, and a staker + finality-provider + covenant slashing path.

This crate never signs or broadcasts anything: every public function is a
pure, synchronous transform from caller-supplied parameters and UTXOs to an
unsigned [`bitcoin::psbt::PartiallySignedTransaction`] (or, for
[`witness::create_witness`], a finished witness stack once signatures have
been collected elsewhere). Call [`curve::init_btc_curve`] once at process
startup before anything else in this crate.
*/

pub mod constants;
pub mod curve;
pub mod error;
pub mod params;
mod script_num;
pub mod scripts;
pub mod taproot;
pub mod tx;
pub mod types;
pub mod witness;

pub use error::{StakingError, StakingResult};
pub use params::StakingParameters;
pub use scripts::CompiledScripts;
pub use tx::{
    slashing_transaction, staking_transaction, unbonding_transaction,
    withdraw_early_unbonded_transaction, withdraw_timelock_unbonded_transaction,
};
pub use types::Utxo;
pub use witness::{create_witness, CovenantSignature};
