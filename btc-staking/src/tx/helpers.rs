//! Shared PSBT-assembly helpers used by every transaction builder in this
//! module. None of these are part of the public surface; each public
//! builder function composes them into the shape its own spec section
//! requires.

use bitcoin::{
    psbt::{Input, PartiallySignedTransaction},
    OutPoint, PackedLockTime, Script, Sequence, Transaction, TxIn, TxOut, Witness, XOnlyPublicKey,
};

use crate::types::Utxo;

/// Builds an unsigned, witness-less [`TxIn`] spending `utxo` with the given
/// relative-locktime `sequence`.
pub fn unsigned_input(utxo: &Utxo, sequence: Sequence) -> TxIn {
    TxIn {
        previous_output: OutPoint {
            txid: utxo.txid,
            vout: utxo.vout,
        },
        script_sig: Script::new(),
        sequence,
        witness: Witness::new(),
    }
}

/// Wraps a freshly assembled unsigned `Transaction` (version 2, empty
/// script_sig/witness on every input) into a [`PartiallySignedTransaction`].
pub fn psbt_from_unsigned_tx(tx: Transaction) -> PartiallySignedTransaction {
    PartiallySignedTransaction::from_unsigned_tx(tx)
        .expect("freshly built inputs have empty script_sig and witness")
}

/// Sets the `witness_utxo` field of PSBT input `index`, and `tap_internal_key`
/// if one is supplied.
pub fn set_input_utxo(
    psbt: &mut PartiallySignedTransaction,
    index: usize,
    witness_utxo: TxOut,
    tap_internal_key: Option<XOnlyPublicKey>,
) {
    let input: &mut Input = &mut psbt.inputs[index];
    input.witness_utxo = Some(witness_utxo);
    if let Some(key) = tap_internal_key {
        input.tap_internal_key = Some(key);
    }
}

/// Default transaction version (2), required to activate
/// OP_CHECKSEQUENCEVERIFY per BIP-68.
pub const TX_VERSION: i32 = 2;

/// Bitcoin's all-ones, "no relative timelock" sequence value.
pub fn no_relative_locktime() -> Sequence {
    Sequence::MAX
}

/// Zero locktime, used by every transaction this crate builds (none of
/// them rely on absolute locktime).
pub fn zero_locktime() -> PackedLockTime {
    PackedLockTime::ZERO
}
