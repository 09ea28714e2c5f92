#![no_main]

use libfuzzer_sys::fuzz_target;
use pollsys_types::Identity;

fuzz_target!(|input: &str| {
    if let Ok(identity) = input.parse::<Identity>() {
        // Anything accepted must print back to the same identity.
        assert_eq!(identity.to_string().parse::<Identity>().unwrap(), identity);
    }
});
