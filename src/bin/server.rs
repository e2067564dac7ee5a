//! Sakhi backend HTTP server.
//! Run with: cargo run --bin sakhi-server

use std::process::ExitCode;

use sakhi_backend::start_sakhi_backend;

fn main() -> ExitCode {
    start_sakhi_backend::run()
}
