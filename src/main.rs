use attendance_backend::{
    build_router,
    config::{get_config, init_config},
    database::pool::create_pool,
    AppState,
};
use chrono::Utc;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    // Housekeeping only: every access point already expires lazily, the
    // sweep just keeps dashboards and listings tidy between reads.
    {
        let state = app_state.clone();
        tokio::spawn(async move {
            loop {
                match state.session_service.sweep_expired(Utc::now()).await {
                    Ok(0) => {}
                    Ok(n) => info!(swept = n, "expired elapsed sessions"),
                    Err(e) => tracing::error!("expiry sweep error: {:?}", e),
                }
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });
    }

    let app = build_router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
