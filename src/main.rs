//! # Voxel Engine Demo Entry Point
//!
//! Runs the library's headless `run()` demo.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

use std::path::PathBuf;

fn main() {
    voxel_engine_core::init_logger();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    if let Err(err) = voxel_engine_core::run(config_path.as_deref()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
