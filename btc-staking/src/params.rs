//! Validated input bundle for the script builder (component C3).

use bitcoin::XOnlyPublicKey;

use crate::error::{StakingError, StakingResult};

/// Length, in bytes, of a BIP-340 x-only public key.
pub const PK_LENGTH: usize = 32;

/// Parses a raw public key buffer into an [`XOnlyPublicKey`], checking the
/// length invariant the spec requires for every key this crate touches.
pub fn parse_xonly_pubkey(raw: &[u8]) -> StakingResult<XOnlyPublicKey> {
    if raw.len() != PK_LENGTH {
        return Err(StakingError::InvalidKeyLength(raw.len()));
    }
    XOnlyPublicKey::from_slice(raw).map_err(StakingError::InvalidPublicKey)
}

/// Immutable, validated parameters for a single staking instance.
///
/// Construction validates every invariant the script builder and
/// transaction builder rely on; once built, every field is read-only and
/// every operation on `StakingParameters` is a pure function of its
/// contents plus the fixed internal key in [`crate::constants`].
#[derive(Clone, Debug)]
pub struct StakingParameters {
    staker_key: XOnlyPublicKey,
    finality_provider_keys: Vec<XOnlyPublicKey>,
    /// Covenant keys, sorted ascending once at construction time so that
    /// `build_unbonding_script`/`build_slashing_script` never need to
    /// re-sort.
    covenant_keys: Vec<XOnlyPublicKey>,
    covenant_threshold: usize,
    staking_timelock: u16,
    unbonding_timelock: u16,
    magic_bytes: Vec<u8>,
}

impl StakingParameters {
    /// Validates and constructs a new [`StakingParameters`] from raw,
    /// caller-supplied key bytes.
    ///
    /// Every key is parsed through [`parse_xonly_pubkey`], so a key that is
    /// not exactly [`PK_LENGTH`] bytes or does not decode to a valid curve
    /// point is rejected here, once, rather than at each of the script
    /// builder's call sites.
    ///
    /// Exactly one finality provider and the data-embed script use index 0
    /// of `finality_provider_keys`; the list type is preserved for callers
    /// that track more than one provider, but this protocol supports
    /// exactly one per staking instance (no restaking).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        staker_key: &[u8],
        finality_provider_keys: &[&[u8]],
        covenant_keys: &[&[u8]],
        covenant_threshold: usize,
        staking_timelock: u16,
        unbonding_timelock: u16,
        magic_bytes: Vec<u8>,
    ) -> StakingResult<Self> {
        if finality_provider_keys.is_empty() {
            return Err(StakingError::MissingRequiredInput("finality_provider_keys"));
        }
        if covenant_keys.is_empty() {
            return Err(StakingError::MissingRequiredInput("covenant_keys"));
        }
        if covenant_threshold < 1 {
            return Err(StakingError::InvalidScriptData("covenant_threshold must be >= 1"));
        }
        if covenant_threshold > covenant_keys.len() {
            return Err(StakingError::ThresholdTooLarge {
                threshold: covenant_threshold,
                key_count: covenant_keys.len(),
            });
        }
        if staking_timelock < 1 {
            return Err(StakingError::InvalidScriptData("staking_timelock must be >= 1"));
        }
        if unbonding_timelock < 1 {
            return Err(StakingError::InvalidScriptData("unbonding_timelock must be >= 1"));
        }
        if magic_bytes.is_empty() {
            return Err(StakingError::MissingRequiredInput("magic_bytes"));
        }

        let staker_key = parse_xonly_pubkey(staker_key)?;

        let finality_provider_keys = finality_provider_keys
            .iter()
            .map(|raw| parse_xonly_pubkey(raw))
            .collect::<StakingResult<Vec<_>>>()?;

        let mut covenant_keys = covenant_keys
            .iter()
            .map(|raw| parse_xonly_pubkey(raw))
            .collect::<StakingResult<Vec<_>>>()?;

        covenant_keys.sort_by(|a, b| a.serialize().cmp(&b.serialize()));
        for pair in covenant_keys.windows(2) {
            if pair[0] == pair[1] {
                return Err(StakingError::DuplicateKeys);
            }
        }

        Ok(Self {
            staker_key,
            finality_provider_keys,
            covenant_keys,
            covenant_threshold,
            staking_timelock,
            unbonding_timelock,
            magic_bytes,
        })
    }

    /// The staker's public key.
    pub fn staker_key(&self) -> XOnlyPublicKey {
        self.staker_key
    }

    /// All finality-provider public keys (exactly index 0 is used by the
    /// slashing and data-embed scripts).
    pub fn finality_provider_keys(&self) -> &[XOnlyPublicKey] {
        &self.finality_provider_keys
    }

    /// Covenant public keys, already sorted ascending.
    pub fn covenant_keys(&self) -> &[XOnlyPublicKey] {
        &self.covenant_keys
    }

    /// Required number of covenant signatures.
    pub fn covenant_threshold(&self) -> usize {
        self.covenant_threshold
    }

    /// Relative timelock, in blocks, for the staker's post-staking-period
    /// withdrawal path.
    pub fn staking_timelock(&self) -> u16 {
        self.staking_timelock
    }

    /// Relative timelock, in blocks, for the post-unbonding withdrawal
    /// path.
    pub fn unbonding_timelock(&self) -> u16 {
        self.unbonding_timelock
    }

    /// Protocol-identifying magic bytes embedded in the data-carrier
    /// script.
    pub fn magic_bytes(&self) -> &[u8] {
        &self.magic_bytes
    }
}
