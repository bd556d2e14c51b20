#![no_main]
use griffion_consensus::block::{check_block_mutation, check_block_mutation_cached};
use griffion_consensus::merkle::block_merkle_root;
use griffion_consensus::serialization::deserialize_transaction;
use griffion_consensus::types::{Block, Hash};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Layout: 32-byte claimed root, then length-prefixed (u16 LE) transactions.
    // A zero claimed root is replaced by the computed one so the witness rules get
    // exercised too.
    if data.len() < 32 {
        return;
    }
    let claimed: Hash = match data[..32].try_into() {
        Ok(hash) => hash,
        Err(_) => return,
    };

    let mut transactions = Vec::new();
    let mut rest = &data[32..];
    while rest.len() >= 2 && transactions.len() < 64 {
        let len = u16::from_le_bytes([rest[0], rest[1]]) as usize;
        rest = &rest[2..];
        if len > rest.len() {
            break;
        }
        if let Ok(tx) = deserialize_transaction(&rest[..len]) {
            transactions.push(tx);
        }
        rest = &rest[len..];
    }

    let computed = block_merkle_root(&transactions);
    let root = if claimed == [0u8; 32] { computed.root } else { claimed };
    let mut block = Block::from_transactions(transactions).with_merkle_root(root);

    let strict = check_block_mutation(&block, true);
    let lenient = check_block_mutation(&block, false);

    // Merkle failures are reported regardless of the witness toggle
    if root != computed.root || computed.mutated {
        assert!(lenient.is_err());
        assert_eq!(strict, lenient);
    }
    // Passing the strict check implies passing the lenient one
    if strict.is_ok() {
        assert!(lenient.is_ok());
    }

    // The cache never changes a verdict
    assert_eq!(check_block_mutation_cached(&mut block, true), strict);
    assert_eq!(check_block_mutation_cached(&mut block, true), strict);
    assert_eq!(check_block_mutation_cached(&mut block, false), lenient);
});
