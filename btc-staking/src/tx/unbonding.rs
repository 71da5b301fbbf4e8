//! Builds the unbonding transaction (§4.5.4): spends the staking output via
//! the unbonding Tapscript leaf and moves the full remaining value to the
//! unbonding Taproot output. No change output.

use bitcoin::{
    psbt::{Input, PartiallySignedTransaction},
    util::taproot::LeafVersion,
    Network, OutPoint, Script, Sequence, Transaction, TxIn, TxOut, Witness,
};
use tracing::debug;

use crate::{
    constants::UNSPENDABLE_INTERNAL_KEY,
    error::{StakingError, StakingResult},
    taproot,
    tx::helpers::{psbt_from_unsigned_tx, zero_locktime, TX_VERSION},
};

/// Builds the unbonding transaction.
#[allow(clippy::too_many_arguments)]
pub fn unbonding_transaction(
    unbonding_script: &Script,
    unbonding_timelock_script: &Script,
    timelock_script: &Script,
    slashing_script: &Script,
    staking_tx: &Transaction,
    fee: u64,
    network: Network,
    output_index: u32,
) -> StakingResult<PartiallySignedTransaction> {
    if fee == 0 {
        return Err(StakingError::NonPositiveValue("fee"));
    }

    let staking_out = staking_tx
        .output
        .get(output_index as usize)
        .ok_or(StakingError::InvalidScriptData("output_index out of range"))?;

    let spend_tree = taproot::staking_output_tree(slashing_script, unbonding_script, timelock_script)?;
    let control_block = taproot::control_block_for(&spend_tree, unbonding_script)?;

    let output_tree = taproot::unbonding_output_tree(slashing_script, unbonding_timelock_script)?;
    let unbonding_address = taproot::address_for(&output_tree, network);

    if staking_out.value <= fee {
        return Err(StakingError::InsufficientFunds {
            have: staking_out.value,
            need: fee,
        });
    }
    let output_value = staking_out.value - fee;

    debug!(output_index, fee, output_value, "assembling unbonding transaction");

    let input = TxIn {
        previous_output: OutPoint {
            txid: staking_tx.txid(),
            vout: output_index,
        },
        script_sig: Script::new(),
        sequence: Sequence::MAX,
        witness: Witness::new(),
    };

    let output = TxOut {
        value: output_value,
        script_pubkey: unbonding_address.script_pubkey(),
    };

    let tx = Transaction {
        version: TX_VERSION,
        lock_time: zero_locktime(),
        input: vec![input],
        output: vec![output],
    };

    let mut psbt = psbt_from_unsigned_tx(tx);

    let psbt_input: &mut Input = &mut psbt.inputs[0];
    psbt_input.tap_internal_key = Some(*UNSPENDABLE_INTERNAL_KEY);
    psbt_input.witness_utxo = Some(staking_out.clone());
    psbt_input.tap_scripts.insert(
        control_block,
        (unbonding_script.clone(), LeafVersion::TapScript),
    );

    Ok(psbt)
}

#[cfg(test)]
mod tests {
    use bitcoin::blockdata::{opcodes::all::OP_CHECKSIG, script::Builder};

    use super::*;

    fn dummy_script(byte: u8) -> Script {
        Builder::new()
            .push_slice(&[byte; 32])
            .push_opcode(OP_CHECKSIG)
            .into_script()
    }

    #[test]
    fn moves_full_remaining_value_with_no_change() {
        let slashing = dummy_script(1);
        let unbonding = dummy_script(2);
        let timelock = dummy_script(3);
        let unbonding_timelock = dummy_script(4);

        let staking_tree = taproot::staking_output_tree(&slashing, &unbonding, &timelock).unwrap();
        let staking_address = taproot::address_for(&staking_tree, Network::Regtest);

        let staking_tx = Transaction {
            version: 2,
            lock_time: bitcoin::PackedLockTime::ZERO,
            input: vec![],
            output: vec![TxOut {
                value: 90_000,
                script_pubkey: staking_address.script_pubkey(),
            }],
        };

        let psbt = unbonding_transaction(
            &unbonding,
            &unbonding_timelock,
            &timelock,
            &slashing,
            &staking_tx,
            500,
            Network::Regtest,
            0,
        )
        .unwrap();

        assert_eq!(psbt.unsigned_tx.output.len(), 1);
        assert_eq!(psbt.unsigned_tx.output[0].value, 89_500);
    }

    #[test]
    fn rejects_fee_at_least_output_value() {
        let slashing = dummy_script(1);
        let unbonding = dummy_script(2);
        let timelock = dummy_script(3);
        let unbonding_timelock = dummy_script(4);

        let staking_tree = taproot::staking_output_tree(&slashing, &unbonding, &timelock).unwrap();
        let staking_address = taproot::address_for(&staking_tree, Network::Regtest);

        let staking_tx = Transaction {
            version: 2,
            lock_time: bitcoin::PackedLockTime::ZERO,
            input: vec![],
            output: vec![TxOut {
                value: 500,
                script_pubkey: staking_address.script_pubkey(),
            }],
        };

        let result = unbonding_transaction(
            &unbonding,
            &unbonding_timelock,
            &timelock,
            &slashing,
            &staking_tx,
            500,
            Network::Regtest,
            0,
        );

        assert!(matches!(result, Err(StakingError::InsufficientFunds { .. })));
    }
}
