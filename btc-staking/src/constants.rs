//! Fixed, protocol-wide constants.

use bitcoin::XOnlyPublicKey;
use once_cell::sync::Lazy;

/// Leaf version for all Tapscript leaves produced by this crate (BIP-342).
pub const LEAF_VERSION_TAPSCRIPT: u8 = 0xC0;

/// Hex serialization of the BIP-341 nothing-up-my-sleeve point, with the
/// leading parity byte still attached. Stripping that byte and lifting the
/// remaining 32 bytes as an x-only key yields [`UNSPENDABLE_INTERNAL_KEY`].
const UNSPENDABLE_INTERNAL_KEY_COMPRESSED: &str =
    "0250929b74c1a04954b78b4b6035e97a5e078a5a0f28ec96d547bfee9ace803ac0";

/// The fixed, provably unspendable x-only public key used as the Taproot
/// internal key for every output this crate builds. Nobody knows (or can
/// feasibly find) the discrete log of this point, so the key path of every
/// Taproot output here is unspendable and only the script paths matter.
pub static UNSPENDABLE_INTERNAL_KEY: Lazy<XOnlyPublicKey> = Lazy::new(|| {
    let compressed =
        hex::decode(UNSPENDABLE_INTERNAL_KEY_COMPRESSED).expect("constant is valid hex");
    XOnlyPublicKey::from_slice(&compressed[1..]).expect("constant is a valid x-only point")
});
