//! Builds the staking transaction (§4.5.1): funds the Taproot staking
//! output, optionally carries a data-embed output, and returns any change.

use std::str::FromStr;

use bitcoin::{psbt::PartiallySignedTransaction, Address, Network, Script, Transaction, TxOut, XOnlyPublicKey};
use tracing::debug;

use crate::{
    error::{StakingError, StakingResult},
    taproot,
    tx::helpers::{no_relative_locktime, psbt_from_unsigned_tx, set_input_utxo, unsigned_input, zero_locktime, TX_VERSION},
    types::Utxo,
};

/// Builds the staking transaction.
///
/// Output ordering is fixed: `[staking, (data_embed?), (change?)]`. Change
/// is omitted entirely when the inputs sum to exactly `amount + fee`.
///
/// If `staker_xonly_pk` is supplied, `tap_internal_key` is attached to
/// every input (the funding wallet is assumed to be Taproot); this has no
/// effect on the staking output itself, which is always tweaked with the
/// fixed unspendable internal key regardless of the caller's wallet type.
#[allow(clippy::too_many_arguments)]
pub fn staking_transaction(
    timelock_script: &Script,
    unbonding_script: &Script,
    slashing_script: &Script,
    amount: u64,
    fee: u64,
    change_address: &str,
    input_utxos: &[Utxo],
    network: Network,
    staker_xonly_pk: Option<XOnlyPublicKey>,
    data_embed_script: Option<&Script>,
) -> StakingResult<PartiallySignedTransaction> {
    if amount == 0 {
        return Err(StakingError::NonPositiveValue("amount"));
    }
    if fee == 0 {
        return Err(StakingError::NonPositiveValue("fee"));
    }

    let change_address = Address::from_str(change_address)
        .map_err(|err| StakingError::InvalidChangeAddress(err.to_string()))?;
    if change_address.network != network {
        return Err(StakingError::InvalidChangeAddress(format!(
            "address is for {:?}, expected {:?}",
            change_address.network, network
        )));
    }

    let sum_inputs: u64 = input_utxos.iter().map(|utxo| utxo.value).sum();
    let need = amount + fee;
    if sum_inputs < need {
        return Err(StakingError::InsufficientFunds {
            have: sum_inputs,
            need,
        });
    }

    let spend_info = taproot::staking_output_tree(slashing_script, unbonding_script, timelock_script)?;
    let p2tr_address = taproot::address_for(&spend_info, network);

    let mut outputs = vec![TxOut {
        value: amount,
        script_pubkey: p2tr_address.script_pubkey(),
    }];

    if let Some(data_embed_script) = data_embed_script {
        outputs.push(TxOut {
            value: 0,
            script_pubkey: data_embed_script.clone(),
        });
    }

    let change_value = sum_inputs - need;
    if change_value > 0 {
        outputs.push(TxOut {
            value: change_value,
            script_pubkey: change_address.script_pubkey(),
        });
    }

    debug!(
        num_inputs = input_utxos.len(),
        num_outputs = outputs.len(),
        amount,
        fee,
        change_value,
        "assembling staking transaction"
    );

    let inputs = input_utxos
        .iter()
        .map(|utxo| unsigned_input(utxo, no_relative_locktime()))
        .collect();

    let tx = Transaction {
        version: TX_VERSION,
        lock_time: zero_locktime(),
        input: inputs,
        output: outputs,
    };

    let mut psbt = psbt_from_unsigned_tx(tx);

    for (index, utxo) in input_utxos.iter().enumerate() {
        set_input_utxo(
            &mut psbt,
            index,
            TxOut {
                value: utxo.value,
                script_pubkey: utxo.script_pubkey.clone(),
            },
            staker_xonly_pk,
        );
    }

    Ok(psbt)
}
