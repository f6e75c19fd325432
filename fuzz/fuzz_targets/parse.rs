#![no_main]

use libfuzzer_sys::fuzz_target;
use quipu::frontend::parser;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // The parser drives the lexer, so this covers both
        let _ = parser::parse("fuzz.qp", s);
    }
});
