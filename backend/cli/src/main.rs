mod config;
mod driver;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use ocrprobe_probes::terminal_output::supports_color;
use tracing::info;

use config::Config;
use driver::{Mode, RunSettings};

#[derive(Parser)]
#[command(name = "ocrprobe")]
#[command(about = "Diagnostic client for the OCR service: status, HTTP and WebSocket probes")]
#[command(version)]
struct Cli {
    /// Server address [env: OCRPROBE_HOST, default: 192.168.1.10]
    #[arg(long)]
    host: Option<String>,

    /// Server port [env: OCRPROBE_PORT, default: 8080]
    #[arg(long)]
    port: Option<u16>,

    /// Image to recognize (required by http, ws and both)
    #[arg(long)]
    image: Option<PathBuf>,

    /// Recognition language hint, forwarded verbatim
    #[arg(long)]
    language: Option<String>,

    /// Which probes to run
    #[arg(long, value_enum, default_value_t = Mode::Status)]
    mode: Mode,

    /// Bearer token for services that require auth [env: OCRPROBE_TOKEN]
    #[arg(long)]
    token: Option<String>,

    /// Give up waiting for a WebSocket result after this many seconds
    /// [env: OCRPROBE_WS_TIMEOUT_SECS]
    #[arg(long, value_name = "SECS")]
    ws_timeout: Option<u64>,
}

impl Cli {
    /// Flags win over the environment.
    fn into_settings(self, config: &Config) -> RunSettings {
        RunSettings {
            mode: self.mode,
            host: self.host.unwrap_or_else(|| config.host.clone()),
            port: self.port.unwrap_or(config.port),
            image: self.image,
            language: self.language,
            token: self.token.or_else(|| config.token.clone()),
            ws_timeout: self.ws_timeout.map(Duration::from_secs).or(config.ws_timeout),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    logging::init_logger(&config.log_level, config.log_dir.as_deref(), config.log_json);

    let settings = cli.into_settings(&config);
    info!(
        mode = settings.mode.as_str(),
        host = %settings.host,
        port = settings.port,
        "Starting ocrprobe"
    );

    let request = driver::prepare(&settings)?;

    let probes = settings.mode.probes(settings.ws_timeout);
    let mut stdout = std::io::stdout();
    driver::run(&request, &probes, &mut stdout, supports_color()).await?;

    Ok(())
}
