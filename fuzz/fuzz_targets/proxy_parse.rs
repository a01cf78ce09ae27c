#![no_main]

use ice_rpc::ProxyRef;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(proxy) = s.parse::<ProxyRef>() {
            // The printed form must parse back to the same proxy
            let printed = proxy.to_string();
            let reparsed: ProxyRef = printed.parse().unwrap();
            assert_eq!(reparsed, proxy);
            let _ = proxy.endpoint();
        }
    }
});
