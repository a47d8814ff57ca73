//! Table Board - 餐厅桌台看板服务
//!
//! # 架构概述
//!
//! Wires the reconciliation engine to the outside world:
//!
//! - **配置** (`config`): 环境变量 + dotenv
//! - **日志** (`logger`): tracing-subscriber + 按天滚动的 app/audit 文件
//! - **后台任务** (`tasks`): reconciler worker, 日志清理
//! - **HTTP API** (`api`): 看板读取与员工操作
//!
//! # 模块结构
//!
//! ```text
//! table-board/src/
//! ├── api/        # HTTP 路由和处理器
//! ├── config.rs   # BoardConfig
//! ├── error.rs    # AppError → ApiResponse
//! ├── logger.rs   # 日志初始化与清理
//! ├── state.rs    # AppState
//! └── tasks.rs    # BackgroundTasks
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod logger;
pub mod state;
pub mod tasks;

use order_client::{MemoryOrderService, OrderService};
use std::sync::Arc;

pub use api::build_app;
pub use config::BoardConfig;
pub use error::{AppError, AppResult};
pub use state::AppState;
pub use tasks::{BackgroundTasks, TaskKind};

/// 设置环境：加载 .env，读取配置，初始化日志
pub fn setup_environment() -> anyhow::Result<BoardConfig> {
    // .env is optional
    dotenv::dotenv().ok();

    let config = BoardConfig::from_env();
    logger::init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;
    Ok(config)
}

/// Pick the order service named by the configuration
///
/// `memory:` selects the in-process service (offline mode); anything else
/// must be an HTTP base URL.
pub fn build_order_service(config: &BoardConfig) -> anyhow::Result<Arc<dyn OrderService>> {
    let client = config.client_config();
    if client.is_memory() {
        tracing::warn!("Using in-process order service (offline mode)");
        return Ok(Arc::new(MemoryOrderService::new()));
    }

    let service = client.build_http_service()?;
    tracing::info!(url = %service.base_url(), timeout_ms = client.timeout_ms, "Order service configured");
    Ok(Arc::new(service))
}

pub fn print_banner() {
    println!(
        r#"
  _____     _     _        ____                      _
 |_   _|_ _| |__ | | ___  | __ )  ___   __ _ _ __ __| |
   | |/ _` | '_ \| |/ _ \ |  _ \ / _ \ / _` | '__/ _` |
   | | (_| | |_) | |  __/ | |_) | (_) | (_| | | | (_| |
   |_|\__,_|_.__/|_|\___| |____/ \___/ \__,_|_|  \__,_|
    "#
    );
}
