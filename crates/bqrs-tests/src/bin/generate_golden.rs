//! Golden fixture generator for the BQRS conformance suite.
//!
//! Writes every fixture under `tests/golden/`. Run it after a deliberate
//! change to the encoder or the wire format, then review the diff of the
//! committed `.bqrs` files.
//!
//! ```bash
//! cargo run --bin generate_golden -p bqrs-tests
//! ```
//!
//! | Directory | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | select    | `#select` with string and int columns, two rows           |
//! | elements  | Every column type, elements in all three location styles  |
//! | empty     | Container with no tables                                  |

#![allow(clippy::pedantic)]

use std::path::Path;

use bqrs_tests::{GOLDEN_FIXTURES, golden_encoder, golden_path};

fn main() {
    for fixture in GOLDEN_FIXTURES {
        let bytes = golden_encoder(fixture)
            .encode()
            .unwrap_or_else(|e| panic!("encode {fixture}: {e}"));
        write_file(&golden_path(fixture), &bytes);
    }
    println!("All golden fixtures written");
}

fn write_file(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create_dir_all");
    }
    std::fs::write(path, data).expect("write_file");
    println!("  wrote {} ({} bytes)", path.display(), data.len());
}
