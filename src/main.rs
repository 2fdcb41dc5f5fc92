use envoy_meter::config::{EnvoyConfig, Mode};
use envoy_meter::handlers::print_production_summary;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = EnvoyConfig::from_env()?;
    let envoy = config.envoy()?;
    info!(url = envoy.url(), serial = envoy.serial_number(), mode = ?config.mode, "Starting Envoy client");

    match config.mode {
        Mode::Production => {
            let snapshot = envoy.get_production().await?;
            print_production_summary(&snapshot);
        }
        Mode::Stream => {
            // Only returns on failure; reconnecting is up to whoever restarts us
            if let Err(e) = envoy.stream_to_stdout().await {
                error!("Meter stream stopped: {e}");
                return Err(e.into());
            }
        }
    }

    Ok(())
}
