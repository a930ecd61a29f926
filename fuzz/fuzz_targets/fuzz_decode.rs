#![no_main]
use libfuzzer_sys::fuzz_target;

use std::io::Cursor;

use form_parts::{Config, Decoder};

fuzz_target!(|data: &[u8]| {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::default()
        .buffer_size(64)
        .spill_threshold(256)
        .temp_dir(dir.path());

    let decoder = Decoder::with_config(Cursor::new(data), data.len() as u64, "BOUNDARY", config);
    for part in decoder {
        match part {
            Ok(part) => {
                let _ = part.bytes();
            }
            Err(_) => break,
        }
    }

    // every spilled body is gone with its part
    assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
});
