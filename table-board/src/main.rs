use std::net::SocketAddr;
use std::path::PathBuf;
use table_board::{
    AppState, BackgroundTasks, TaskKind, build_app, build_order_service, logger, print_banner,
    setup_environment,
};
use table_engine::Reconciler;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 配置, 日志)
    let config = setup_environment()?;

    print_banner();
    tracing::info!(tables = config.tables.len(), "Table board starting...");

    // 2. 订单服务
    let service = build_order_service(&config)?;

    // 3. 后台任务: reconciler + 日志清理
    let mut tasks = BackgroundTasks::new();
    let (reconciler, dashboard) = Reconciler::new(
        service,
        config.tables.clone(),
        config.engine.clone(),
        tasks.shutdown_token(),
    )?;
    tasks.spawn("reconciler", TaskKind::Worker, reconciler.run());

    if let Some(dir) = &config.log_dir {
        let token = tasks.shutdown_token();
        tasks.spawn(
            "log_cleanup",
            TaskKind::Periodic,
            logger::periodic_cleanup(PathBuf::from(dir), token),
        );
    }
    tasks.log_summary();

    // 4. HTTP 服务
    let app = build_app(AppState::new(dashboard));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Table board listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tasks.shutdown_token()))
        .await?;

    tasks.shutdown().await;
    Ok(())
}

/// Graceful shutdown handler
///
/// Listens for SIGTERM and Ctrl+C, then stops the background tasks before
/// the router (and its dashboard handles) is dropped.
async fn shutdown_signal(shutdown: CancellationToken) {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }

    shutdown.cancel();
}
