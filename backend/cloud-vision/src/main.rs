//! Cloud Vision - command line demo
//!
//! Sends one image file to the Vision API and logs the detected face
//! rectangles. The full response is printed to stdout as JSON.
//!
//! ```text
//! GOOGLE_VISION_API_KEY=... cloud-vision --image face.png
//! ```

use anyhow::{Context, Result};
use cloud_vision::{Config, GoogleVisionClient};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line options
#[derive(Debug, Clone, PartialEq)]
struct Args {
    image: PathBuf,
}

impl Args {
    fn from_args() -> Result<Self> {
        let args: Vec<String> = env::args().collect();

        // Check for --image argument, falling back to the first positional one
        for i in 0..args.len() {
            if args[i] == "--image" && i + 1 < args.len() {
                return Ok(Args {
                    image: PathBuf::from(&args[i + 1]),
                });
            }
        }

        args.get(1)
            .filter(|a| !a.starts_with("--"))
            .map(|a| Args {
                image: PathBuf::from(a),
            })
            .context("usage: cloud-vision --image <path>")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloud_vision=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::from_args()?;

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let vision_client = Arc::new(
        GoogleVisionClient::from_env_config(&config).context("Failed to create Vision client")?,
    );

    let image = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read image {}", args.image.display()))?;

    info!(
        path = %args.image.display(),
        bytes = image.len(),
        features = vision_client.features().len(),
        "Sending image to Vision API"
    );

    // Dropping the analysis on ctrl-c cancels the request
    let response = tokio::select! {
        result = vision_client.analyze(&image) => result.context("Vision analysis failed")?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Received shutdown signal, abandoning request");
            return Ok(());
        }
    };

    let rects = response.face_rects();
    info!("faces detected : {}", rects.len());
    for (i, rect) in rects.iter().enumerate() {
        info!(
            face = i,
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "Face"
        );
    }

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
