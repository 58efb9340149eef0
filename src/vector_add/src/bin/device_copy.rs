#![deny(warnings)]

use vector_add::{run_device_copy, Config};

fn main() {
    let mut builder = env_logger::Builder::from_default_env();
    builder.format_timestamp_micros().init();
    let config = Config::from_args(
        "Vector Add (device copy)",
        "Adds two integer vectors on the GPU, staging operands through device memory",
    );
    if let Err(err) = run_device_copy(&config) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
    println!("All checks complete");
}
