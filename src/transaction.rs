//! Transaction identity: coinbase detection, txid/wtxid and serialized sizes

use crate::crypto::hash256;
use crate::serialization::transaction::{
    serialize_transaction, serialize_transaction_with_witness, serialized_size,
};
use crate::types::*;

/// Check if transaction is coinbase
///
/// A coinbase has exactly one input and that input spends the null outpoint.
#[inline]
pub fn is_coinbase(tx: &Transaction) -> bool {
    tx.inputs.len() == 1 && tx.inputs[0].prevout.is_null()
}

/// True when any input carries a non-empty witness stack
#[inline]
pub fn has_witness(tx: &Transaction) -> bool {
    tx.inputs.iter().any(|input| !input.witness.is_empty())
}

/// Transaction ID: double SHA256 of the witness-stripped serialization
///
/// Returned in internal byte order; use [`hash_to_hex`] for display.
pub fn txid(tx: &Transaction) -> Hash {
    hash256(&serialize_transaction(tx))
}

/// Witness transaction ID: double SHA256 of the full serialization
///
/// Equal to [`txid`] when the transaction has no witness data.
pub fn wtxid(tx: &Transaction) -> Hash {
    hash256(&serialize_transaction_with_witness(tx))
}

/// Size of the witness-stripped serialization
pub fn base_size(tx: &Transaction) -> usize {
    serialized_size(tx, false)
}

/// Size of the full serialization, witness included
pub fn total_size(tx: &Transaction) -> usize {
    serialized_size(tx, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::transaction::deserialize_transaction_no_witness;

    fn decode(hex_str: &str) -> Transaction {
        deserialize_transaction_no_witness(&hex::decode(hex_str).unwrap()).unwrap()
    }

    #[test]
    fn test_is_coinbase() {
        let coinbase = Transaction {
            inputs: vec![TransactionInput::default()],
            ..Default::default()
        };
        assert!(is_coinbase(&coinbase));

        let mut two_inputs = coinbase.clone();
        two_inputs.inputs.push(TransactionInput::default());
        assert!(!is_coinbase(&two_inputs));

        let mut spends_output = coinbase.clone();
        spends_output.inputs[0].prevout.index = 0;
        assert!(!is_coinbase(&spends_output));

        assert!(!is_coinbase(&Transaction::default()));
    }

    #[test]
    fn test_txid_ignores_witness() {
        let mut tx = Transaction {
            inputs: vec![TransactionInput::default()],
            outputs: vec![TransactionOutput {
                value: 1,
                script_pubkey: vec![0x51],
            }],
            ..Default::default()
        };
        assert_eq!(txid(&tx), wtxid(&tx));
        assert_eq!(base_size(&tx), total_size(&tx));

        tx.inputs[0].witness = vec![vec![0u8; 32]];
        let stripped_id = txid(&tx);
        assert!(has_witness(&tx));
        assert_ne!(stripped_id, wtxid(&tx));
        // marker, flag, stack count, item length, item
        assert_eq!(total_size(&tx), base_size(&tx) + 2 + 1 + 1 + 32);

        tx.inputs[0].witness.clear();
        assert_eq!(txid(&tx), stripped_id);
    }

    #[test]
    fn test_64_byte_transaction_is_a_merkle_node() {
        let tx1 = decode("ff204bd0000000000000");
        let tx2 = decode("8ae53c92000000000000");
        let tx3 = decode(
            "cdaf22d00002c6a7f848f8ae4d30054e61dcf3303d6fe01d282163341f06feecc10032b3160fcab87bdfe3ecfb769206ef2d991b92f8a268e423a6ef4d485f06",
        );
        assert_eq!(base_size(&tx3), 64);

        let mut node = [0u8; 64];
        node[..32].copy_from_slice(&txid(&tx1));
        node[32..].copy_from_slice(&txid(&tx2));
        assert_eq!(serialize_transaction(&tx3), node);
        assert_eq!(txid(&tx3), crate::crypto::hash256_pair(&txid(&tx1), &txid(&tx2)));
    }
}
