//! Witness Composer (component C6): merges covenant signatures with an
//! existing witness stack in canonical (descending) covenant-key order.

use bitcoin::XOnlyPublicKey;

/// One covenant signature, keyed by the public key it was produced for.
#[derive(Clone, Debug)]
pub struct CovenantSignature {
    /// Covenant public key the signature belongs to
    pub public_key: XOnlyPublicKey,
    /// Schnorr signature bytes
    pub signature: Vec<u8>,
}

/// Composes a final spend witness by prepending covenant signatures, in
/// descending covenant-key order, to `original_witness`.
///
/// For each key in `covenant_pks` (sorted here in descending order — the
/// opposite of the ascending order `multi_key_script` uses when building
/// the script itself), emits the matching signature from `covenant_sigs`
/// if present, or an empty byte string otherwise. This always yields
/// exactly `covenant_pks.len()` stack items before `original_witness`,
/// matching the `OP_CHECKSIGADD` stack order the unbonding/slashing
/// scripts expect (`OP_CHECKSIGADD` requires an empty-string placeholder
/// for keys with no matching signature). The first matching signature for
/// a given key wins if `covenant_sigs` somehow has duplicates.
pub fn create_witness(
    original_witness: &[Vec<u8>],
    covenant_pks: &[XOnlyPublicKey],
    covenant_sigs: &[CovenantSignature],
) -> Vec<Vec<u8>> {
    let mut sorted_pks: Vec<XOnlyPublicKey> = covenant_pks.to_vec();
    sorted_pks.sort_by(|a, b| b.serialize().cmp(&a.serialize()));

    let mut composed: Vec<Vec<u8>> = Vec::with_capacity(sorted_pks.len() + original_witness.len());
    for pk in &sorted_pks {
        let sig = covenant_sigs
            .iter()
            .find(|entry| entry.public_key == *pk)
            .map(|entry| entry.signature.clone())
            .unwrap_or_default();
        composed.push(sig);
    }

    composed.extend(original_witness.iter().cloned());
    composed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(hex_str: &str) -> XOnlyPublicKey {
        let bytes = hex::decode(hex_str).unwrap();
        XOnlyPublicKey::from_slice(&bytes).unwrap()
    }

    #[test]
    fn prefix_length_matches_covenant_key_count() {
        let p1 = key("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
        let p2 = key("c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5");
        let p3 = key("f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9");

        let original = vec![vec![0xaa], vec![0xbb]];
        let sigs = vec![
            CovenantSignature {
                public_key: p1,
                signature: vec![0x01],
            },
            CovenantSignature {
                public_key: p3,
                signature: vec![0x03],
            },
        ];

        let witness = create_witness(&original, &[p1, p2, p3], &sigs);

        assert_eq!(witness.len(), 3 + original.len());

        // Descending order: p3 > p2 > p1 lexicographically? We don't know
        // which of p1/p2/p3 sorts where without comparing bytes directly,
        // so assert against an explicit descending sort instead.
        let mut expected_order = vec![p1, p2, p3];
        expected_order.sort_by(|a, b| b.serialize().cmp(&a.serialize()));

        for (i, pk) in expected_order.iter().enumerate() {
            let expected = sigs
                .iter()
                .find(|e| e.public_key == *pk)
                .map(|e| e.signature.clone())
                .unwrap_or_default();
            assert_eq!(witness[i], expected);
        }

        assert_eq!(&witness[3..], &original[..]);
    }

    #[test]
    fn missing_signature_is_empty_buffer() {
        let p1 = key("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
        let p2 = key("c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5");

        let witness = create_witness(&[], &[p1, p2], &[]);
        assert_eq!(witness, vec![Vec::<u8>::new(), Vec::<u8>::new()]);
    }
}
