//! # Voxel World Entry Point
//!
//! Runs a headless streaming session through the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- config.json map.json
//! ```

fn main() {
    voxel_world::init_logger();
    if let Err(err) = voxel_world::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
