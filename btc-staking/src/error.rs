use thiserror::Error;

#[derive(Error, Debug)]
/// Error type for the BTC staking transaction builder
pub enum StakingError {
    #[error("amount, fee or rate must be positive: {0}")]
    /// A value that the protocol requires to be strictly positive was zero or negative
    NonPositiveValue(&'static str),
    #[error("address does not parse for the given network: {0}")]
    /// A caller-supplied address (change, withdrawal, or slashing) failed
    /// to decode, or decoded to a different network than the one requested
    InvalidChangeAddress(String),
    #[error("public key is invalid: {0}")]
    /// A supplied public key could not be parsed as a valid x-only key
    InvalidPublicKey(bitcoin::secp256k1::Error),
    #[error("public key has length {0}, expected 32 bytes")]
    /// A supplied public key buffer was not exactly 32 bytes
    InvalidKeyLength(usize),
    #[error("input sum {have} is less than amount + fee {need}")]
    /// Sum of the funding UTXOs did not cover amount + fee in a staking transaction
    InsufficientFunds {
        /// Sum of the supplied input values
        have: u64,
        /// amount + fee required
        need: u64,
    },
    #[error("slashing leaves no funds for the staker: residual value is not positive")]
    /// The slashing rate and minimum fee left nothing for the staker's change output
    InsufficientFundsForSlashing,
    #[error("timelock script does not have the expected shape")]
    /// A script passed to `withdrawal_transaction` did not decompile into the expected timelock form
    InvalidTimelockScript,
    #[error("key list must not be empty")]
    /// `multi_key_script` was called with zero public keys
    NoKeys,
    #[error("threshold {threshold} exceeds key count {key_count}")]
    /// A covenant/finality-provider threshold exceeded the number of keys it quorums over
    ThresholdTooLarge {
        /// Requested threshold
        threshold: usize,
        /// Number of available keys
        key_count: usize,
    },
    #[error("duplicate public key in key list")]
    /// Two (or more) keys in a multi-key script were identical after sorting
    DuplicateKeys,
    #[error("required staking parameter is missing: {0}")]
    /// A required `StakingParameters` field was absent or empty at construction time
    MissingRequiredInput(&'static str),
    #[error("staking parameter is invalid: {0}")]
    /// A `StakingParameters` field failed post-presence validation (e.g. out-of-range timelock)
    InvalidScriptData(&'static str),
    #[error("leaf could not be added to the taproot tree: {0}")]
    /// Adding a leaf at the given depth violated a `TaprootBuilder` invariant (should not happen for the fixed tree shapes)
    TaprootError(bitcoin::util::taproot::TaprootBuilderError),
    #[error("taproot tree could not be finalized: not a complete binary tree")]
    /// `TaprootBuilder::finalize` rejected the assembled tree; it returns the builder itself on failure, with no structured error to carry
    TaprootFinalizeFailed,
    #[error("no control block available for the requested leaf script")]
    /// Requested a control block for a script that is not a leaf of the finalized tree
    MissingControlBlock,
}

/// A result alias for staking transaction construction
pub type StakingResult<T> = Result<T, StakingError>;
