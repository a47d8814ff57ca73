//! Engine configuration

use std::time::Duration;

use crate::{EngineError, EngineResult};

/// 协调引擎配置
///
/// | 字段 | 默认值 | 说明 |
/// |------|--------|------|
/// | poll_interval | 5s | 轮询订单服务的周期 |
/// | escalation_delay | 15min | preparing → toPay |
/// | settle_delay | 1.5s | paid → empty |
/// | action_error_ttl | 5s | 失败操作提示保留时长 |
/// | command_buffer | 64 | 员工操作队列长度 |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub poll_interval: Duration,
    pub escalation_delay: Duration,
    pub settle_delay: Duration,
    pub action_error_ttl: Duration,
    pub command_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            escalation_delay: Duration::from_secs(15 * 60),
            settle_delay: Duration::from_millis(1500),
            action_error_ttl: Duration::from_secs(5),
            command_buffer: 64,
        }
    }
}

impl EngineConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_escalation_delay(mut self, delay: Duration) -> Self {
        self.escalation_delay = delay;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_action_error_ttl(mut self, ttl: Duration) -> Self {
        self.action_error_ttl = ttl;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.poll_interval.is_zero() {
            return Err(EngineError::InvalidConfig("poll_interval must be positive".into()));
        }
        if self.escalation_delay.is_zero() {
            return Err(EngineError::InvalidConfig("escalation_delay must be positive".into()));
        }
        if self.settle_delay.is_zero() {
            return Err(EngineError::InvalidConfig("settle_delay must be positive".into()));
        }
        if self.command_buffer == 0 {
            return Err(EngineError::InvalidConfig("command_buffer must be positive".into()));
        }
        Ok(())
    }
}
