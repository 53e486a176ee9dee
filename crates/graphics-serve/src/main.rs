use graphics_serve::{
    config::{Args, ServerConfig},
    router, AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let config = ServerConfig::try_from(args)?;

    let app = router(AppState::new(&config));

    log::info!("🚀 Starting the server");
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    log::info!("🔥 Listening on: http://{}", listener.local_addr()?);
    log::info!("🔧 Press Ctrl+C to stop the server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("👋 Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
