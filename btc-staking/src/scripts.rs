//! Script Builder (component C3): deterministic assembly of the five
//! Tapscripts and the OP_RETURN data-carrier script from a validated
//! [`StakingParameters`] bundle.

use bitcoin::{
    blockdata::{
        opcodes::all::{
            OP_CHECKSIG, OP_CHECKSIGADD, OP_CHECKSIGVERIFY, OP_CSV, OP_NUMEQUAL,
            OP_NUMEQUALVERIFY, OP_RETURN,
        },
        script::Builder,
    },
    Script, XOnlyPublicKey,
};

use crate::{
    error::{StakingError, StakingResult},
    params::StakingParameters,
};

/// Version byte embedded in the data-carrier script. Hardcoded per the
/// current protocol revision; a future revision that needs to vary this
/// will have to add it as a parameter (see DESIGN.md).
const DATA_EMBED_VERSION: u8 = 0x00;

/// The five compiled Tapscripts plus the OP_RETURN data-carrier script.
#[derive(Clone, Debug)]
pub struct CompiledScripts {
    /// Staker-only, post-staking-period withdrawal path
    pub timelock_script: Script,
    /// Staker + covenant-quorum unbonding transition path
    pub unbonding_script: Script,
    /// Staker + finality-provider + covenant-quorum slashing path
    pub slashing_script: Script,
    /// Staker-only, post-unbonding withdrawal path
    pub unbonding_timelock_script: Script,
    /// OP_RETURN data-carrier script
    pub data_embed_script: Script,
}

/// Builds `<pk> OP_CHECKSIGVERIFY <t> OP_CHECKSEQUENCEVERIFY`.
///
/// `t` is emitted with `Builder::push_int`, which already produces the
/// minimal encoding Bitcoin Core accepts: a single `OP_1..OP_16` opcode for
/// `t` in `1..=16`, otherwise the shortest little-endian sign-magnitude
/// CScriptNum.
pub fn build_timelock_script(staker_key: XOnlyPublicKey, t: u16) -> Script {
    Builder::new()
        .push_x_only_key(&staker_key)
        .push_opcode(OP_CHECKSIGVERIFY)
        .push_int(t as i64)
        .push_opcode(OP_CSV)
        .into_script()
}

/// `build_timelock_script(staker_key, params.staking_timelock())`.
pub fn build_staking_timelock_script(params: &StakingParameters) -> Script {
    build_timelock_script(params.staker_key(), params.staking_timelock())
}

/// `build_timelock_script(staker_key, params.unbonding_timelock())`.
pub fn build_unbonding_timelock_script(params: &StakingParameters) -> Script {
    build_timelock_script(params.staker_key(), params.unbonding_timelock())
}

/// `single_key_script(staker, verify=true) || multi_key_script(covenant, threshold, verify=false)`.
pub fn build_unbonding_script(params: &StakingParameters) -> StakingResult<Script> {
    let mut bytes = single_key_script(params.staker_key(), true).to_bytes();
    bytes.extend(
        multi_key_script(params.covenant_keys(), params.covenant_threshold(), false)?.to_bytes(),
    );
    Ok(Script::from(bytes))
}

/// `single_key_script(staker, verify=true) || multi_key_script([fp], 1, verify=true) ||
/// multi_key_script(covenant, threshold, verify=false)`.
pub fn build_slashing_script(params: &StakingParameters) -> StakingResult<Script> {
    let mut bytes = single_key_script(params.staker_key(), true).to_bytes();
    bytes.extend(multi_key_script(&params.finality_provider_keys()[..1], 1, true)?.to_bytes());
    bytes.extend(
        multi_key_script(params.covenant_keys(), params.covenant_threshold(), false)?.to_bytes(),
    );
    Ok(Script::from(bytes))
}

/// `OP_RETURN <magic_bytes || version(0x00) || staker_key || fp_key[0] || staking_timelock(be u16)>`.
pub fn build_data_embed_script(params: &StakingParameters) -> Script {
    let mut payload = Vec::with_capacity(params.magic_bytes().len() + 1 + 32 + 32 + 2);
    payload.extend_from_slice(params.magic_bytes());
    payload.push(DATA_EMBED_VERSION);
    payload.extend_from_slice(&params.staker_key().serialize());
    payload.extend_from_slice(&params.finality_provider_keys()[0].serialize());
    payload.extend_from_slice(&params.staking_timelock().to_be_bytes());

    Builder::new()
        .push_opcode(OP_RETURN)
        .push_slice(&payload)
        .into_script()
}

/// Produces all five scripts for one staking instance.
pub fn build_scripts(params: &StakingParameters) -> StakingResult<CompiledScripts> {
    Ok(CompiledScripts {
        timelock_script: build_staking_timelock_script(params),
        unbonding_script: build_unbonding_script(params)?,
        slashing_script: build_slashing_script(params)?,
        unbonding_timelock_script: build_unbonding_timelock_script(params),
        data_embed_script: build_data_embed_script(params),
    })
}

/// `<pk> (OP_CHECKSIGVERIFY | OP_CHECKSIG)`.
pub fn single_key_script(pk: XOnlyPublicKey, verify: bool) -> Script {
    let builder = Builder::new().push_x_only_key(&pk);
    let builder = if verify {
        builder.push_opcode(OP_CHECKSIGVERIFY)
    } else {
        builder.push_opcode(OP_CHECKSIG)
    };
    builder.into_script()
}

/// Builds a threshold-multisig Tapscript over `pks`:
///
/// ```text
/// <pk[0]> OP_CHECKSIG
/// <pk[1]> OP_CHECKSIGADD
/// ...
/// <pk[n-1]> OP_CHECKSIGADD
/// <threshold> (OP_NUMEQUALVERIFY | OP_NUMEQUAL)
/// ```
///
/// `pks` is sorted ascending internally, so the output is independent of
/// input order; a `DuplicateKeys` error is returned if two entries collide
/// after sorting.
pub fn multi_key_script(pks: &[XOnlyPublicKey], threshold: usize, verify: bool) -> StakingResult<Script> {
    if pks.is_empty() {
        return Err(StakingError::NoKeys);
    }
    if threshold > pks.len() {
        return Err(StakingError::ThresholdTooLarge {
            threshold,
            key_count: pks.len(),
        });
    }
    if pks.len() == 1 {
        return Ok(single_key_script(pks[0], verify));
    }

    let mut sorted: Vec<XOnlyPublicKey> = pks.to_vec();
    sorted.sort_by(|a, b| a.serialize().cmp(&b.serialize()));
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] {
            return Err(StakingError::DuplicateKeys);
        }
    }

    let mut builder = Builder::new()
        .push_x_only_key(&sorted[0])
        .push_opcode(OP_CHECKSIG);

    for pk in &sorted[1..] {
        builder = builder.push_x_only_key(pk).push_opcode(OP_CHECKSIGADD);
    }

    builder = builder.push_int(threshold as i64).push_opcode(if verify {
        OP_NUMEQUALVERIFY
    } else {
        OP_NUMEQUAL
    });

    Ok(builder.into_script())
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    use super::*;

    fn key(seed: u8) -> XOnlyPublicKey {
        let candidates = [
            "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
            "c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5",
            "f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9",
            "e493dbf1c10d80f3581e4904930b1404cc6c13900ee0758474fa94abe8c4cd13",
            "2f8bde4d1a07209355b4a7250a5c5128e88b84bddc619ab7cba8d569b240efe4",
        ];
        let idx = (seed as usize) % candidates.len();
        let bytes = hex::decode(candidates[idx]).unwrap();
        XOnlyPublicKey::from_slice(&bytes).unwrap()
    }

    #[test]
    fn timelock_small_value_uses_single_opcode() {
        let script = build_timelock_script(key(0), 16);
        // pubkey push(33) + OP_CHECKSIGVERIFY(1) + OP_16(1) + OP_CSV(1)
        assert_eq!(script.len(), 33 + 1 + 1 + 1);
    }

    #[test]
    fn timelock_large_value_uses_data_push() {
        let script = build_timelock_script(key(0), 1000);
        // 1000 needs a 2-byte push: push-len(1) + data(2)
        assert_eq!(script.len(), 33 + 1 + 1 + 2 + 1);
    }

    #[test]
    fn multi_key_script_is_order_independent() {
        let keys = [key(0), key(1), key(2)];
        let mut rng = StdRng::seed_from_u64(42);

        let baseline = multi_key_script(&keys, 2, false).unwrap();

        for _ in 0..20 {
            let mut shuffled = keys.to_vec();
            shuffled.shuffle(&mut rng);
            let shuffled_script = multi_key_script(&shuffled, 2, false).unwrap();
            assert_eq!(baseline, shuffled_script);
        }
    }

    #[test]
    fn multi_key_script_rejects_duplicates_regardless_of_order() {
        let keys = [key(0), key(0)];
        assert!(matches!(
            multi_key_script(&keys, 2, false),
            Err(StakingError::DuplicateKeys)
        ));
    }

    #[test]
    fn multi_key_script_rejects_empty() {
        assert!(matches!(multi_key_script(&[], 1, false), Err(StakingError::NoKeys)));
    }

    #[test]
    fn multi_key_script_rejects_oversized_threshold() {
        let keys = [key(0), key(1)];
        assert!(matches!(
            multi_key_script(&keys, 3, false),
            Err(StakingError::ThresholdTooLarge { .. })
        ));
    }

    #[test]
    fn single_key_path_for_one_key() {
        let keys = [key(0)];
        let multi = multi_key_script(&keys, 1, true).unwrap();
        let single = single_key_script(key(0), true);
        assert_eq!(multi, single);
    }

    #[test]
    fn data_embed_script_layout() {
        let params = StakingParameters::new(
            &key(0).serialize(),
            &[&key(1).serialize()],
            &[&key(2).serialize(), &key(3).serialize()],
            1,
            144,
            72,
            b"bbn4".to_vec(),
        )
        .unwrap();

        let script = build_data_embed_script(&params);
        let bytes = script.as_bytes();

        // OP_RETURN, then a push of 4 + 1 + 32 + 32 + 2 = 71 bytes.
        assert_eq!(bytes[0], OP_RETURN.to_u8());
        assert_eq!(bytes[1], 71);
        assert_eq!(&bytes[2..6], b"bbn4");
        assert_eq!(bytes[6], 0x00);
        assert_eq!(&bytes[7..39], &key(0).serialize());
        assert_eq!(&bytes[39..71], &key(1).serialize());
        assert_eq!(&bytes[71..73], &144u16.to_be_bytes());
    }
}
