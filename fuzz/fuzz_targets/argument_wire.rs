#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use ice_rpc::{Argument, CallRequest};
use libfuzzer_sys::arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    method: String,
    primary_raw: Vec<u8>,
    secondary: Option<i64>,
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    if let Ok(input) = FuzzInput::arbitrary(&mut u) {
        let argument = serde_json::from_slice::<serde_json::Value>(&input.primary_raw)
            .map(Argument::from)
            .unwrap_or_else(|_| Argument::none());

        let mut request = CallRequest::new(input.method).argument(argument);
        if let Some(secondary) = input.secondary {
            request = request.secondary(secondary);
        }

        let args = request.wire_args();
        assert_eq!(args.len(), if input.secondary.is_some() { 2 } else { 1 });
        assert!(!args[0].is_null());
        assert!(!args[0].is_object() && !args[0].is_array());
    }
});
