//! Process-wide secp256k1 context, registered once for every Taproot operation.

use bitcoin::secp256k1::{All, Secp256k1};
use once_cell::sync::Lazy;

/// Shared verification+signing context used by every Taproot tweak and
/// address derivation in this crate.
pub static SECP256K1: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Registers the secp256k1 backend used for Taproot tweaking.
///
/// Idempotent: the underlying context is a lazily-initialized process-wide
/// static, so repeated calls are free after the first. Call this once
/// before using any Taproot-producing operation in this crate, or simply
/// rely on the lazy initialization happening on first use.
pub fn init_btc_curve() {
    Lazy::force(&SECP256K1);
}
