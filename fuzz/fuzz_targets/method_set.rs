#![no_main]

use ice_rpc::MethodSet;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(methods) = serde_json::from_slice::<MethodSet>(data) {
        let printed = methods.to_json_pretty().unwrap();
        let reparsed = MethodSet::from_json_str(&printed).unwrap();
        assert_eq!(reparsed, methods);

        for name in methods.iter() {
            assert!(methods.contains(name));
        }
    }
});
