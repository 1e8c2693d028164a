#![no_main]
use libfuzzer_sys::fuzz_target;
use tesfile::{registry::Tes3Registries, scanner::Tes3Scanner};

fuzz_target!(|data: &[u8]| {
    let mut registries = Tes3Registries::new();
    if Tes3Scanner::new(data).scan(&mut registries).is_err() {
        return;
    }

    let mut out = Vec::new();
    let _ = registries.save_all_to_stream(&mut out);
});
