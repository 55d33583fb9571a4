use anyhow::{Context, Result};
use sourcegate::{build_pipeline, config::Config, init_tracing};
use std::io::Read;
use std::process::ExitCode;

/// Runs one extraction over the arguments (or stdin when there are none)
/// and prints the JSON result. Exits non-zero on failure records.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let text = if args.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        input
    } else {
        args.join(" ")
    };

    let config = Config::from_env()?;
    let pipeline = build_pipeline(&config)?;
    let result = pipeline.run(&text).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
