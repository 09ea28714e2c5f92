#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes must fail cleanly, never panic. Anything that
    // does decode and verify must either restore or be rejected as corrupt.
    if let Ok(snapshot) = pollsys_ledger::LedgerSnapshot::from_bytes(data) {
        let _ = pollsys_store_memory::MemoryStore::from_image(snapshot.image);
    }
});
