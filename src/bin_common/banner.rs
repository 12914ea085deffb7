//! Startup and shutdown banners

use tracing::info;

pub fn print_banner(name: &str, details: &[(&str, String)]) {
    info!("");
    info!("========================================");
    info!("Starting {}", name);
    for (label, value) in details {
        info!("  {}: {}", label, value);
    }
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");
}

pub fn print_shutdown(name: &str, stats: Option<&str>) {
    info!("");
    info!("========================================");
    info!("{} stopped gracefully", name);
    if let Some(stats) = stats {
        info!("{}", stats);
    }
    info!("========================================");
}
