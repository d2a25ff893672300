use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use segment_chat::core::config::{self, CliOverrides};
use segment_chat::core::pipeline::SendOutcome;
use segment_chat::transport::{HttpTransport, ReplyFormat};
use segment_chat::{headless, tui};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "segment-chat", about = "Terminal chat client for an image segmentation service")]
struct Args {
    /// Service root, e.g. http://127.0.0.1:8000
    #[arg(long)]
    base_url: Option<String>,

    /// Path appended to the base URL
    #[arg(long)]
    endpoint_path: Option<String>,

    /// How the service encodes replies
    #[arg(long, value_enum)]
    reply_format: Option<ReplyFormat>,

    /// Send one message, print the reply and exit instead of opening the UI
    #[arg(long)]
    prompt: Option<String>,

    /// Image to attach to --prompt
    #[arg(long, requires = "prompt")]
    image: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to segment-chat.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("segment-chat.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Ignoring config file: {}", e);
        eprintln!("Warning: {e}; using defaults");
        config::ChatConfig::default()
    });
    let overrides = CliOverrides {
        base_url: args.base_url.as_deref(),
        endpoint_path: args.endpoint_path.as_deref(),
        reply_format: args.reply_format,
    };
    let resolved = config::resolve(&file_config, &overrides);

    log::info!(
        "Segment Chat starting: {}{} ({} replies)",
        resolved.base_url,
        resolved.endpoint_path,
        resolved.reply_format.label()
    );

    let Some(prompt) = args.prompt else {
        return tui::run(resolved);
    };

    let transport = HttpTransport::from_config(&resolved);
    let mut stdout = std::io::stdout();
    let outcome = headless::run(
        &transport,
        &prompt,
        args.image.as_deref(),
        &resolved.download_dir,
        &mut stdout,
    )
    .await?;

    match outcome {
        SendOutcome::Replied => Ok(()),
        SendOutcome::Rejected => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "nothing to send: give a non-empty --prompt or an --image",
        )),
        SendOutcome::Failed => Err(std::io::Error::other(format!(
            "request to {} failed",
            transport.url()
        ))),
    }
}
