use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lastsnap::common::{apply_overrides, load_config, ConfigOverrides, TransportMode};
use lastsnap::output;
use lastsnap::share::{copy_page_link, share_result_image, ShareLinks, StatusLine};
use lastsnap::transfer::{FileCandidate, HttpTransport, Phase, TransferController};

#[derive(Parser)]
#[command(name = "lastsnap")]
#[command(about = "Grab the last frame of an MP4 as a JPEG")]
struct Cli {
    /// Path to the MP4 video
    video: PathBuf,

    /// Frame-extraction service base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Where to save the extracted frame
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Use the buffered transport (no intermediate progress)
    #[arg(long)]
    buffered: bool,

    /// Copy the page link to the clipboard after extraction
    #[arg(long)]
    copy_link: bool,

    /// Hand the extracted frame to the platform share handler
    #[arg(long)]
    share: bool,

    /// Print third-party share links
    #[arg(long)]
    links: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Fail fast before spinning anything up.
    if !cli.video.exists() {
        eprintln!("Error: File not found: {}", cli.video.display());
        std::process::exit(1);
    }

    let config = load_config()?;
    let overrides = ConfigOverrides {
        endpoint: cli.endpoint.clone(),
        transport: cli.buffered.then_some(TransportMode::Buffered),
        output: cli.output.clone(),
    };
    let config = apply_overrides(config, &overrides);

    let candidate = FileCandidate::from_path(&cli.video)?;
    let transport = Arc::new(HttpTransport::new(&config)?);
    let controller = TransferController::new(transport);

    let pb = output::upload_bar();
    let mut rx = controller.subscribe();
    let bar = pb.clone();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow().clone();
            bar.set_position(state.progress_percent as u64);
            if state.progress_percent >= 100 && !state.is_terminal() {
                bar.set_message("Working on it");
            }
            if state.is_terminal() {
                break;
            }
        }
    });

    let canceller = controller.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    controller.submit(candidate);
    let final_state = controller.wait_terminal().await;

    match final_state.phase {
        Phase::Succeeded => {
            output::finish_success(&pb, "Frame extracted");
            if let Some(frame) = &final_state.result {
                frame
                    .save_to(&config.output)
                    .with_context(|| format!("Failed to write {}", config.output.display()))?;
                println!("Saved {}", config.output.display());

                if cli.copy_link {
                    let outcome = copy_page_link(&config.page_url);
                    let status = StatusLine::new();
                    status.flash(outcome.status_text());
                    println!("{}", status.current());
                    // One-shot flow: hold on until the transient status clears.
                    status.wait_clear().await;
                }
                if cli.share {
                    share_result_image(frame, &config.page_url);
                }
            }
            if cli.links {
                for (label, url) in ShareLinks::for_page(&config.page_url).entries() {
                    println!("{label:>9}  {url}");
                }
            }
        }
        Phase::Failed => {
            let message = final_state.error_message.as_deref().unwrap_or("Failed");
            output::finish_error(&pb, message);
            std::process::exit(1);
        }
        // wait_terminal only returns terminal phases.
        _ => {}
    }

    Ok(())
}
