use order_client::ClientConfig;
use shared::TableId;
use std::str::FromStr;
use std::time::Duration;
use table_engine::EngineConfig;

/// 看板配置 - 所有配置项
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | ORDER_SERVICE_URL | http://localhost:8000 | 订单服务地址 (`memory:` 使用内存服务) |
/// | ORDER_SERVICE_TOKEN | - | Bearer token |
/// | REQUEST_TIMEOUT_MS | 10000 | 请求超时(毫秒) |
/// | POLL_INTERVAL_MS | 5000 | 轮询周期(毫秒) |
/// | ESCALATION_DELAY_MS | 900000 | preparing → toPay |
/// | PAID_SETTLE_DELAY_MS | 1500 | paid → empty |
/// | ACTION_ERROR_TTL_MS | 5000 | 操作失败提示保留时长 |
/// | TABLES | T1,...,T10 | 桌台列表，逗号分隔 |
/// | HTTP_PORT | 3100 | HTTP 服务端口 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志格式 |
/// | LOG_DIR | - | 日志目录 (设置后写文件) |
///
/// # 示例
///
/// ```ignore
/// ORDER_SERVICE_URL=memory: TABLES=T1,T2 cargo run -p table-board
/// ```
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub order_service_url: String,
    pub order_service_token: Option<String>,
    pub request_timeout_ms: u64,
    pub engine: EngineConfig,
    pub tables: Vec<TableId>,
    pub http_port: u16,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl BoardConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values fall back to
    /// their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |key: &str, default: u64| {
            Duration::from_millis(parse_value(&lookup, key).unwrap_or(default))
        };

        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            poll_interval: millis("POLL_INTERVAL_MS", 5_000),
            escalation_delay: millis("ESCALATION_DELAY_MS", 900_000),
            settle_delay: millis("PAID_SETTLE_DELAY_MS", 1_500),
            action_error_ttl: millis("ACTION_ERROR_TTL_MS", 5_000),
            ..defaults
        };

        let tables = lookup("TABLES")
            .map(|raw| parse_tables(&raw))
            .filter(|tables| !tables.is_empty())
            .unwrap_or_else(default_tables);

        Self {
            order_service_url: lookup("ORDER_SERVICE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "http://localhost:8000".into()),
            order_service_token: lookup("ORDER_SERVICE_TOKEN").filter(|v| !v.is_empty()),
            request_timeout_ms: parse_value(&lookup, "REQUEST_TIMEOUT_MS").unwrap_or(10_000),
            engine,
            tables,
            http_port: parse_value(&lookup, "HTTP_PORT").unwrap_or(3100),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: parse_flag(lookup("LOG_JSON")),
            log_dir: lookup("LOG_DIR").filter(|v| !v.is_empty()),
        }
    }

    /// 订单服务客户端配置
    pub fn client_config(&self) -> ClientConfig {
        let config =
            ClientConfig::new(&self.order_service_url).with_timeout_ms(self.request_timeout_ms);
        match &self.order_service_token {
            Some(token) => config.with_token(token),
            None => config,
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Parse a comma-separated table list, dropping blanks and repeats
pub fn parse_tables(raw: &str) -> Vec<TableId> {
    let mut tables: Vec<TableId> = Vec::new();
    for id in raw.split(',').filter_map(|part| TableId::from_str(part).ok()) {
        if !tables.contains(&id) {
            tables.push(id);
        }
    }
    tables
}

/// T1 ... T10
pub fn default_tables() -> Vec<TableId> {
    (1..=10)
        .filter_map(|n| TableId::new(format!("T{n}")).ok())
        .collect()
}

fn parse_value<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: Option<String>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}
