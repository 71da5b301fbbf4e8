//! Builds the slashing transaction (§4.5.5): pays the slashed fraction of
//! the source output to the slashing address and returns the remainder to
//! a degenerate one-leaf Taproot change output.

use std::str::FromStr;

use bitcoin::{
    psbt::{Input, PartiallySignedTransaction},
    util::taproot::{LeafVersion, TaprootSpendInfo},
    Address, Network, OutPoint, Script, Sequence, Transaction, TxIn, TxOut, Witness,
};
use tracing::debug;

use crate::{
    constants::UNSPENDABLE_INTERNAL_KEY,
    error::{StakingError, StakingResult},
    taproot,
    tx::helpers::{psbt_from_unsigned_tx, zero_locktime, TX_VERSION},
};

/// Builds the slashing transaction.
///
/// `output_index` selects which input of `source_tx` is spent, but the
/// witness UTXO and the value computation both always read
/// `source_tx.output[0]`, reproducing the documented source behavior
/// verbatim rather than silently using `output_index` for those too (see
/// the crate's design notes).
#[allow(clippy::too_many_arguments)]
pub fn slashing_transaction(
    script_tree: &TaprootSpendInfo,
    redeem_script: &Script,
    source_tx: &Transaction,
    slashing_address: &str,
    slashing_rate: f64,
    change_script: &Script,
    minimum_fee: u64,
    network: Network,
    output_index: u32,
) -> StakingResult<PartiallySignedTransaction> {
    if !(slashing_rate > 0.0) {
        return Err(StakingError::NonPositiveValue("slashing_rate"));
    }
    if minimum_fee == 0 {
        return Err(StakingError::NonPositiveValue("minimum_fee"));
    }

    let slashing_address = Address::from_str(slashing_address)
        .map_err(|err| StakingError::InvalidChangeAddress(err.to_string()))?;
    if slashing_address.network != network {
        return Err(StakingError::InvalidChangeAddress(format!(
            "address is for {:?}, expected {:?}",
            slashing_address.network, network
        )));
    }

    // Per the documented source behavior, the witness UTXO and value
    // computation both read output[0] regardless of `output_index`.
    let source_out = source_tx
        .output
        .first()
        .ok_or(StakingError::InvalidScriptData("source_tx has no outputs"))?;

    let total_value = source_out.value as f64;
    let slashed_value = (total_value * slashing_rate).floor() as u64;
    let user_value_signed = (total_value * (1.0 - slashing_rate)).floor() - minimum_fee as f64;
    if user_value_signed <= 0.0 {
        return Err(StakingError::InsufficientFundsForSlashing);
    }
    let user_value = user_value_signed as u64;

    let control_block = taproot::control_block_for(script_tree, redeem_script)?;

    let change_tree = taproot::slashing_change_output_tree(change_script)?;
    let change_address = taproot::address_for(&change_tree, network);

    debug!(
        output_index,
        total_value = source_out.value,
        slashed_value,
        user_value,
        "assembling slashing transaction"
    );

    let input = TxIn {
        previous_output: OutPoint {
            txid: source_tx.txid(),
            vout: output_index,
        },
        script_sig: Script::new(),
        sequence: Sequence::MAX,
        witness: Witness::new(),
    };

    let outputs = vec![
        TxOut {
            value: slashed_value,
            script_pubkey: slashing_address.script_pubkey(),
        },
        TxOut {
            value: user_value,
            script_pubkey: change_address.script_pubkey(),
        },
    ];

    let tx = Transaction {
        version: TX_VERSION,
        lock_time: zero_locktime(),
        input: vec![input],
        output: outputs,
    };

    let mut psbt = psbt_from_unsigned_tx(tx);

    let psbt_input: &mut Input = &mut psbt.inputs[0];
    psbt_input.tap_internal_key = Some(*UNSPENDABLE_INTERNAL_KEY);
    psbt_input.witness_utxo = Some(source_out.clone());
    psbt_input.tap_scripts.insert(
        control_block,
        (redeem_script.clone(), LeafVersion::TapScript),
    );

    Ok(psbt)
}
