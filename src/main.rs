use std::sync::{Arc, Mutex};

use coursebridge::infrastructure::config::AppConfig;
use coursebridge::interfaces::http;
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let config = AppConfig::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    info!(host = %config.host, port = config.port, "starting coursebridge");

    let logs = Arc::new(Mutex::new(Vec::new()));
    let server = http::start_server(config, logs)?;
    server.await
}
