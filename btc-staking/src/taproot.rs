//! Taproot Assembler (component C4): assembles the three canonical script
//! trees this protocol uses, and derives P2TR addresses and control blocks
//! from them.

use bitcoin::{
    util::taproot::{ControlBlock, LeafVersion, TaprootBuilder, TaprootSpendInfo},
    Address, Network, Script,
};

use crate::{
    constants::UNSPENDABLE_INTERNAL_KEY,
    curve::SECP256K1,
    error::{StakingError, StakingResult},
};

/// Tapscript leaf version fixed by BIP-342, used for every leaf this crate
/// produces.
pub const LEAF_VERSION: LeafVersion = LeafVersion::TapScript;

fn finalize(builder: TaprootBuilder) -> StakingResult<TaprootSpendInfo> {
    builder
        .finalize(&SECP256K1, *UNSPENDABLE_INTERNAL_KEY)
        .map_err(|_builder| StakingError::TaprootFinalizeFailed)
}

/// Builds the 2-level, right-heavy staking-output tree:
/// `[ slashing_leaf, [ unbonding_leaf, timelock_leaf ] ]`.
pub fn staking_output_tree(
    slashing_leaf: &Script,
    unbonding_leaf: &Script,
    timelock_leaf: &Script,
) -> StakingResult<TaprootSpendInfo> {
    let builder = TaprootBuilder::new()
        .add_leaf(1, slashing_leaf.clone())
        .map_err(StakingError::TaprootError)?
        .add_leaf(2, unbonding_leaf.clone())
        .map_err(StakingError::TaprootError)?
        .add_leaf(2, timelock_leaf.clone())
        .map_err(StakingError::TaprootError)?;
    finalize(builder)
}

/// Builds the 1-level unbonding-output tree:
/// `[ slashing_leaf, unbonding_timelock_leaf ]`.
pub fn unbonding_output_tree(
    slashing_leaf: &Script,
    unbonding_timelock_leaf: &Script,
) -> StakingResult<TaprootSpendInfo> {
    let builder = TaprootBuilder::new()
        .add_leaf(1, slashing_leaf.clone())
        .map_err(StakingError::TaprootError)?
        .add_leaf(1, unbonding_timelock_leaf.clone())
        .map_err(StakingError::TaprootError)?;
    finalize(builder)
}

/// Builds the degenerate slashing-change-output tree: a single leaf.
pub fn slashing_change_output_tree(unbonding_timelock_leaf: &Script) -> StakingResult<TaprootSpendInfo> {
    let builder = TaprootBuilder::new()
        .add_leaf(0, unbonding_timelock_leaf.clone())
        .map_err(StakingError::TaprootError)?;
    finalize(builder)
}

/// Derives the P2TR address for a finalized script tree.
pub fn address_for(spend_info: &TaprootSpendInfo, network: Network) -> Address {
    Address::p2tr(
        &SECP256K1,
        spend_info.internal_key(),
        spend_info.merkle_root(),
        network,
    )
}

/// Derives the control block proving `leaf_script` belongs to `spend_info`.
pub fn control_block_for(spend_info: &TaprootSpendInfo, leaf_script: &Script) -> StakingResult<ControlBlock> {
    spend_info
        .control_block(&(leaf_script.clone(), LEAF_VERSION))
        .ok_or(StakingError::MissingControlBlock)
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
    fn staking_tree_and_withdrawal_tree_agree_on_address() {
        let slashing = dummy_script(1);
        let unbonding = dummy_script(2);
        let timelock = dummy_script(3);

        let a = staking_output_tree(&slashing, &unbonding, &timelock).unwrap();
        let b = staking_output_tree(&slashing, &unbonding, &timelock).unwrap();

        assert_eq!(
            address_for(&a, Network::Regtest),
            address_for(&b, Network::Regtest)
        );
    }

    #[test]
    fn control_block_roundtrips_for_member_leaf() {
        let slashing = dummy_script(1);
        let unbonding = dummy_script(2);
        let timelock = dummy_script(3);

        let tree = staking_output_tree(&slashing, &unbonding, &timelock).unwrap();
        assert!(control_block_for(&tree, &timelock).is_ok());
    }

    #[test]
    fn control_block_missing_for_non_member_leaf() {
        let slashing = dummy_script(1);
        let unbonding = dummy_script(2);
        let timelock = dummy_script(3);
        let stranger = dummy_script(9);

        let tree = staking_output_tree(&slashing, &unbonding, &timelock).unwrap();
        assert!(matches!(
            control_block_for(&tree, &stranger),
            Err(StakingError::MissingControlBlock)
        ));
    }
}
