//! Builds the two post-timelock withdrawal transactions (§4.5.2/§4.5.3):
//! a single input spending one Tapscript leaf under a relative timelock,
//! and a single output paying the withdrawal address.

use std::str::FromStr;

use bitcoin::{
    blockdata::script::Instruction,
    psbt::{Input, PartiallySignedTransaction},
    util::taproot::{LeafVersion, TaprootSpendInfo},
    Address, Network, OutPoint, Script, Sequence, Transaction, TxIn, TxOut, Witness,
};
use tracing::debug;

use crate::{
    constants::UNSPENDABLE_INTERNAL_KEY,
    error::{StakingError, StakingResult},
    script_num::read_scriptnum,
    taproot,
    tx::helpers::{psbt_from_unsigned_tx, zero_locktime, TX_VERSION},
};

/// Reads the relative timelock encoded at instruction index 2 of a
/// timelock-shaped script (`<pk> OP_CHECKSIGVERIFY <t> OP_CSV`).
///
/// `OP_1..OP_16` surface as opcodes whose raw byte value is `0x51..=0x60`;
/// the wrap computed here recovers `1..=16` from that range. Any larger
/// value was pushed as a CScriptNum data push instead.
fn decode_timelock(spend_leaf_script: &Script) -> StakingResult<u16> {
    let element = spend_leaf_script
        .instructions()
        .nth(2)
        .ok_or(StakingError::InvalidTimelockScript)?
        .map_err(|_| StakingError::InvalidTimelockScript)?;

    match element {
        Instruction::Op(opcode) => {
            let raw = opcode.to_u8();
            if !(0x51..=0x60).contains(&raw) {
                return Err(StakingError::InvalidTimelockScript);
            }
            let wrap = raw % 16;
            Ok(if wrap == 0 { 16 } else { wrap as u16 })
        }
        Instruction::PushBytes(bytes) => {
            let value = read_scriptnum(bytes).ok_or(StakingError::InvalidTimelockScript)?;
            if !(17..=65535).contains(&value) {
                return Err(StakingError::InvalidTimelockScript);
            }
            Ok(value as u16)
        }
    }
}

/// Generic spend-via-Tapscript-leaf builder shared by the two withdrawal
/// wrappers below.
#[allow(clippy::too_many_arguments)]
pub fn withdrawal_transaction(
    spend_leaf_script: &Script,
    script_tree: &TaprootSpendInfo,
    prev_tx: &Transaction,
    withdrawal_address: &str,
    withdrawal_fee: u64,
    network: Network,
    output_index: u32,
) -> StakingResult<PartiallySignedTransaction> {
    if withdrawal_fee == 0 {
        return Err(StakingError::NonPositiveValue("withdrawal_fee"));
    }

    let withdrawal_address = Address::from_str(withdrawal_address)
        .map_err(|err| StakingError::InvalidChangeAddress(err.to_string()))?;
    if withdrawal_address.network != network {
        return Err(StakingError::InvalidChangeAddress(format!(
            "address is for {:?}, expected {:?}",
            withdrawal_address.network, network
        )));
    }

    let timelock = decode_timelock(spend_leaf_script)?;

    let prev_out = prev_tx
        .output
        .get(output_index as usize)
        .ok_or(StakingError::InvalidScriptData("output_index out of range"))?;

    let control_block = taproot::control_block_for(script_tree, spend_leaf_script)?;

    let input = TxIn {
        previous_output: OutPoint {
            txid: prev_tx.txid(),
            vout: output_index,
        },
        script_sig: Script::new(),
        sequence: Sequence::from_consensus(timelock as u32),
        witness: Witness::new(),
    };

    let output = TxOut {
        value: prev_out.value.saturating_sub(withdrawal_fee),
        script_pubkey: withdrawal_address.script_pubkey(),
    };

    debug!(timelock, output_index, withdrawal_fee, "assembling withdrawal transaction");

    let tx = Transaction {
        version: TX_VERSION,
        lock_time: zero_locktime(),
        input: vec![input],
        output: vec![output],
    };

    let mut psbt = psbt_from_unsigned_tx(tx);

    let psbt_input: &mut Input = &mut psbt.inputs[0];
    psbt_input.tap_internal_key = Some(*UNSPENDABLE_INTERNAL_KEY);
    psbt_input.witness_utxo = Some(prev_out.clone());
    psbt_input.tap_scripts.insert(
        control_block,
        (spend_leaf_script.clone(), LeafVersion::TapScript),
    );

    Ok(psbt)
}

/// Spends the early-unbonded path: unbonding output, tree =
/// `[ slashing_leaf, unbonding_timelock_leaf ]`, spend leaf =
/// `unbonding_timelock_script`.
#[allow(clippy::too_many_arguments)]
pub fn withdraw_early_unbonded_transaction(
    slashing_script: &Script,
    unbonding_timelock_script: &Script,
    prev_tx: &Transaction,
    withdrawal_address: &str,
    withdrawal_fee: u64,
    network: Network,
    output_index: u32,
) -> StakingResult<PartiallySignedTransaction> {
    let script_tree = taproot::unbonding_output_tree(slashing_script, unbonding_timelock_script)?;
    withdrawal_transaction(
        unbonding_timelock_script,
        &script_tree,
        prev_tx,
        withdrawal_address,
        withdrawal_fee,
        network,
        output_index,
    )
}

/// Spends the original staking output once the staking timelock has
/// matured: tree = `[ slashing_leaf, [ unbonding_leaf, timelock_leaf ] ]`,
/// spend leaf = `timelock_script`.
#[allow(clippy::too_many_arguments)]
pub fn withdraw_timelock_unbonded_transaction(
    slashing_script: &Script,
    unbonding_script: &Script,
    timelock_script: &Script,
    prev_tx: &Transaction,
    withdrawal_address: &str,
    withdrawal_fee: u64,
    network: Network,
    output_index: u32,
) -> StakingResult<PartiallySignedTransaction> {
    let script_tree = taproot::staking_output_tree(slashing_script, unbonding_script, timelock_script)?;
    withdrawal_transaction(
        timelock_script,
        &script_tree,
        prev_tx,
        withdrawal_address,
        withdrawal_fee,
        network,
        output_index,
    )
}
