#![no_main]
use griffion_consensus::serialization::{
    deserialize_transaction, serialize_transaction, serialize_transaction_with_witness,
};
use griffion_consensus::transaction::{base_size, has_witness, total_size, txid};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(tx) = deserialize_transaction(data) else {
        return;
    };

    // Accepted input re-encodes to itself
    assert_eq!(serialize_transaction_with_witness(&tx), data);
    assert_eq!(base_size(&tx), serialize_transaction(&tx).len());
    assert_eq!(total_size(&tx), data.len());
    if !has_witness(&tx) {
        assert_eq!(base_size(&tx), total_size(&tx));
    }
    let _ = txid(&tx);
});
