#![no_main]

use ice_rpc::{MethodSet, idl};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);
    let file = idl::parse(&source);

    let names = file.method_names();
    let methods = MethodSet::from_idl(&source);
    assert!(methods.len() <= names.len());
    for name in &names {
        assert!(methods.contains(name));
    }

    for interface in &file.interfaces {
        let _ = interface.type_id();
        assert!(file.interface(&interface.name).is_some());
    }
});
