use tracing_subscriber::{EnvFilter, fmt};

use webrag::config::AppConfig;
use webrag::server;
use webrag::types::RagError;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), RagError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env();
    server::start_server(config).await
}
