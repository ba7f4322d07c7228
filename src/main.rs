// Allow common clippy pedantic lints
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

//! NYC taxi pipeline CLI
//!
//! Download, transform and upload NYC taxi trip data

use clap::Parser;
use nyc_taxi_pipeline::cli::{describe_failure, Cli, Runner};
use nyc_taxi_pipeline::pipeline::exit_code;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let runner = Runner::new(cli);

    let result = runner.run().await;
    if let Err(e) = &result {
        eprintln!("{}", describe_failure(e));
    }
    std::process::exit(exit_code(&result));
}
