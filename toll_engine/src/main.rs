//! Entry point for the Toll Engine binary.
//!
//! Running this binary starts an HTTP server that exposes the fee
//! engine.  The toll configuration may be given via the `TOLL_CONFIG`
//! environment variable and the vehicle register seed via
//! `TOLL_VEHICLES`; see `settings.rs` for the full list.

use toll_engine::settings::Settings;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();
    if let Err(err) = toll_engine::api::serve(&settings).await {
        error!("Error running server: {:#}", err);
        std::process::exit(1);
    }
}
