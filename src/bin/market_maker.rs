use anyhow::{Context, Result};
use darkpool_mm::bin_common::{parse_args, print_banner, print_shutdown, resolve_config_path};
use darkpool_mm::darkpool::logging::init_tracing;
use darkpool_mm::darkpool::{Config, Runner, ShutdownManager};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config_path = resolve_config_path(&parse_args());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level, config.app.log_file.as_deref())
        .context("failed to initialize logging")?;

    print_banner(
        &config.app.name,
        &[
            ("config", config_path.display().to_string()),
            ("server", config.websocket.server_url.clone()),
            ("pairs", config.pairs.len().to_string()),
            ("domains", config.eip712_domains.len().to_string()),
        ],
    );

    let name = config.app.name.clone();
    let runner = match Runner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            error!("Failed to create runner: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    if let Err(e) = runner.run(&shutdown.token()).await {
        error!("Service error: {}", e);
        std::process::exit(1);
    }

    info!("Shutdown complete");
    print_shutdown(&name, None);
    Ok(())
}
