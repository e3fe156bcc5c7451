#![no_main]

use debuglog::marker::MarkerRegistry;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Marker files may contain anything; loading must not panic
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(registry) = MarkerRegistry::from_toml_str(input) {
            for key in registry.methods.keys() {
                let (type_name, method) = key.rsplit_once("::").unwrap_or((key.as_str(), ""));
                let _ = registry.config_for(type_name, method);
            }
        }
    }
});
