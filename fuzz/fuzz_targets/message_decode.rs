#![no_main]

use codec::{decode_message, encode_message, CodecLimits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = CodecLimits::for_testing();
    let wire_limits = wire::Limits::for_testing();

    if let Ok(message) = decode_message(data, &limits, &wire_limits) {
        // Non-canonical varints and ignored color slots may decode, so
        // compare messages rather than bytes.
        // Anything the decoder accepted fits the same limits on the way out.
        let bytes = encode_message(&message, &limits, &wire_limits).expect("re-encode");
        let again = decode_message(&bytes, &limits, &wire_limits).expect("re-decode");
        assert_eq!(again, message);
    }
});
