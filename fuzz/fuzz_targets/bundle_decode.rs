#![no_main]

use happ_bundle::{Bundle, BundleKind, DecodeLimits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Keep allocations bounded.
    let limits = DecodeLimits {
        max_bundle_bytes: 1024 * 1024,
        max_decode_bytes: 4 * 1024 * 1024,
        ..DecodeLimits::default()
    };

    let Ok(bundle) = Bundle::from_bytes_with_limits(data, None, limits) else {
        return;
    };

    let _ = bundle.manifest_value();
    let _ = bundle.pack();
    match bundle.kind() {
        BundleKind::Dna => {
            let _ = bundle.zomes();
        }
        BundleKind::Happ => {
            let _ = bundle.dnas();
        }
        BundleKind::WebHapp => {
            let _ = bundle.ui();
            let _ = bundle.happ();
        }
    }
});
