#![deny(warnings)]

use vector_add::{run_unified, Config};

fn main() {
    let mut builder = env_logger::Builder::from_default_env();
    builder.format_timestamp_micros().init();
    let config = Config::from_args(
        "Vector Add (unified memory)",
        "Adds two integer vectors on the GPU through pinned host memory, no explicit copies",
    );
    if let Err(err) = run_unified(&config) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
    println!("All checks complete");
}
