#![allow(unused)]

pub use clap::{Args, Parser, Subcommand};
pub use log::{info, warn};

pub fn init_logging(verbose: bool) {
    if verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}
