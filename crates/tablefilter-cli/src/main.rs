//! # Tablefilter CLI
//!
//! A thin command-line client for the `tablefilter` library. It loads a JSON
//! table, attaches one filter editor per column and prints what survives the
//! filters given on the command line:
//!
//! ```text
//! tablefilter cities.json --where country=France --choices city --complete city=pa
//! ```
//!
//! The binary only invokes `cli::run()` and handles process termination;
//! everything from the coordinator inward lives in the library and knows
//! nothing about terminals.
//!
//! Logging goes to stderr. `TABLEFILTER_LOG` takes an `EnvFilter` directive
//! (e.g. `tablefilter=debug`); `-v` raises the default level to `debug`.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
