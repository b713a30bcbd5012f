//! Highlight scan binary.

use clap::Parser;
use tracing::{error, info};

use hilite_media::FfmpegTransform;
use hilite_worker::{init_tracing, run_highlight_pass, write_outputs, ScanRequest, WorkerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let request = match ScanRequest::try_parse() {
        Ok(r) => r,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut config = match WorkerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    request.apply_overrides(&mut config.detection);
    info!("Scan config: {:?}", config);

    let output = match run_highlight_pass(&FfmpegTransform::new(), &request, &config.detection).await {
        Ok(o) => o,
        Err(e) => {
            error!("Highlight scan failed: {}", e);
            std::process::exit(1);
        }
    };

    match write_outputs(&config.output_dir, &output).await {
        Ok((highlights, story)) => info!(
            highlights = %highlights.display(),
            story = %story.display(),
            "Wrote scan results"
        ),
        Err(e) => {
            error!("Failed to write results: {}", e);
            std::process::exit(1);
        }
    }

    match serde_json::to_string_pretty(&output.story.segments) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("Failed to serialize story: {}", e);
            std::process::exit(1);
        }
    }
}
