#![no_main]
use libfuzzer_sys::fuzz_target;
use tesfile::{
    registry::Tes4Registries,
    scanner::{ScanOptions, Tes4Scanner},
};

fuzz_target!(|data: &[u8]| {
    for localized in [false, true] {
        let options = ScanOptions::new().localized(localized);
        let mut registries = Tes4Registries::new();
        let _ = Tes4Scanner::with_options(data, options).scan(&mut registries);

        let mut out = Vec::new();
        let _ = registries.save_all_to_stream(&mut out);
    }
});
