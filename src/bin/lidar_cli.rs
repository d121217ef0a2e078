use std::fs;
use std::io::{self, Read};

use clap::Parser;
use lidar_placement::{solve, SolveRequest};

/// Batch runner for the LiDAR placement solver: reads a request as JSON
/// from a file (or stdin) and prints the response as JSON.
#[derive(Parser, Debug)]
#[command(name = "lidar_cli")]
struct Args {
    /// Path to a SolveRequest JSON file. Omit or pass `-` to read stdin.
    #[arg(short, long)]
    input: Option<String>,

    /// Pretty-print the JSON response.
    #[arg(long)]
    pretty: bool,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let raw = match args.input.as_deref() {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .expect("failed to read request from stdin");
            buf
        }
        Some(path) => fs::read_to_string(path).expect("failed to read request file"),
    };

    let request: SolveRequest =
        serde_json::from_str(&raw).expect("request is not valid JSON for SolveRequest");

    let response = solve(&request);

    let output = if args.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    }
    .expect("failed to serialize response");

    println!("{}", output);
}
