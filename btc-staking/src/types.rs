//! Shared data types that are not specific to any single component.

use bitcoin::{Script, Txid};

/// A funding input available to be spent by a transaction this crate builds.
///
/// The caller is responsible for coin selection; this crate only consumes
/// whatever UTXOs it is given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    /// Transaction id of the UTXO being spent
    pub txid: Txid,
    /// Output index of the UTXO being spent
    pub vout: u32,
    /// scriptPubKey locking the UTXO
    pub script_pubkey: Script,
    /// Value of the UTXO, in satoshis
    pub value: u64,
}
