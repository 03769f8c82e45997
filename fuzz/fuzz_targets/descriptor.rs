#![no_main]

use libfuzzer_sys::fuzz_target;
use sdscope::{
    delegation::{analyze, DelegationInput},
    permissions::dacl_entries,
    DecoderConfig, SecurityDescriptor, WellKnownSids,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(decoded) = SecurityDescriptor::decode_with(data, &DecoderConfig::lenient()) {
        let _ = dacl_entries(&decoded.value, &WellKnownSids);

        // Whatever decodes must encode and decode to the same value
        if let Ok(bytes) = decoded.value.to_bytes() {
            if let Ok(again) = SecurityDescriptor::decode_with(&bytes, &DecoderConfig::lenient()) {
                assert_eq!(again.value, decoded.value);
            }
        }
    }

    let input = DelegationInput::new(0x0100_0000u32).with_resource_based(data);
    let _ = analyze(&input);
});
