#![no_main]

use fumitok::{TokenError, Tokenizer};
use libfuzzer_sys::fuzz_target;

const KEY: &str = "0000000000000000000000000000000000000000000000000000000000000000";

fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };
    let tk = Tokenizer::new(KEY).unwrap();
    let _ = tk.inspect(token, 0xFFFF);
    // Arbitrary input must never validate as a live token.
    if let Ok(claims) = tk.validate(token, 0xFFFF, &[]) {
        panic!("forged token accepted: {claims:?}");
    }
    if let Err(TokenError::Expired(claims)) = tk.validate(token, 0, &[]) {
        panic!("forged token decrypted: {claims:?}");
    }
});
