use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_SETTINGS_FILE.to_string());

    let loaded = config::Config::load_from(&settings_path).map_err(|e| {
        eprintln!("[CONFIG] Invalid configuration: {e}");
        e
    })?;
    let cfg = loaded.config;

    logger::init(&cfg)?;
    logger::log_startup();
    logger::log_settings_file(&settings_path, loaded.settings_found);

    // Build the Tokio runtime, sized by the optional `workers` setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr).map_err(|e| {
        logger::log_error(&format!("Failed to start server on {addr}: {e}"));
        e
    })?;

    // The route table is fixed here and handed to the listener through the state
    let routes = handler::RouteTable::standard();
    logger::log_server_start(&addr, &cfg);
    logger::log_info(&format!("  - Routes: {}", routes.paths().join(", ")));

    let state = Arc::new(config::AppState::new(cfg, routes));
    server::run_server_loop(listener, state, server::shutdown_signal()).await;

    logger::log_server_stopped();
    Ok(())
}
