// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// 轮询策略配置
///
/// 默认按固定间隔轮询，尝试次数用完即视为超时。
/// 可选开启指数退避和抖动，但对外的语义不变：要么最终就绪，要么耗尽预算。
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// 最大尝试次数
    pub max_attempts: u32,
    /// 初始轮询间隔
    pub interval: Duration,
    /// 最大轮询间隔
    pub max_interval: Duration,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 抖动因子 (0.0-1.0)
    pub jitter_factor: f64,
    /// 是否启用指数退避
    pub exponential_backoff: bool,
    /// 是否启用抖动
    pub enable_jitter: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::fixed(100, Duration::from_secs(1))
    }
}

/// 单次探测的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T, P = ()> {
    /// 已就绪，停止轮询
    Ready(T),
    /// 尚未就绪，携带本次观察到的中间状态
    Pending(P),
}

/// 轮询的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T, P = ()> {
    /// 在第 `attempts` 次探测时就绪
    Ready { value: T, attempts: u32 },
    /// 预算耗尽，`last` 为最后一次观察到的中间状态
    Exhausted { attempts: u32, last: Option<P> },
}

impl PollPolicy {
    /// 创建固定间隔的轮询策略
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            max_interval: interval,
            backoff_multiplier: 1.0,
            jitter_factor: 0.0,
            exponential_backoff: false,
            enable_jitter: false,
        }
    }

    /// 启用指数退避
    pub fn with_backoff(mut self, multiplier: f64, max_interval: Duration) -> Self {
        self.exponential_backoff = true;
        self.backoff_multiplier = multiplier;
        self.max_interval = max_interval.max(self.interval);
        self
    }

    /// 启用抖动
    pub fn with_jitter(mut self, jitter_factor: f64) -> Self {
        self.enable_jitter = jitter_factor > 0.0;
        self.jitter_factor = jitter_factor.clamp(0.0, 1.0);
        self
    }

    /// 计算第 `attempt` 次探测之后的等待时间（从1开始计数）
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if !self.exponential_backoff && !self.enable_jitter {
            return self.interval;
        }

        let base_secs = if self.exponential_backoff {
            let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
            let secs = self.interval.as_secs_f64() * self.backoff_multiplier.powi(exponent);
            secs.min(self.max_interval.as_secs_f64())
        } else {
            self.interval.as_secs_f64()
        };

        let final_secs = if self.enable_jitter && base_secs > 0.0 {
            let jitter_range = base_secs * self.jitter_factor;
            let jitter = rand::random_range(-jitter_range..jitter_range);
            (base_secs + jitter).max(0.0)
        } else {
            base_secs
        };

        Duration::from_secs_f64(final_secs)
    }

    /// 反复调用 `probe` 直到其返回 `Ready` 或尝试次数用完
    ///
    /// 两次探测之间等待一个间隔；最后一次探测之后不再等待，
    /// 所以在第 k 次就绪时恰好经历了 k-1 次等待。
    /// `max_attempts` 为0时仍会探测一次。
    pub async fn poll<T, P, F, Fut>(&self, mut probe: F) -> PollOutcome<T, P>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = PollStep<T, P>>,
    {
        let budget = self.max_attempts.max(1);
        let mut last = None;

        for attempt in 1..=budget {
            match probe(attempt).await {
                PollStep::Ready(value) => {
                    return PollOutcome::Ready {
                        value,
                        attempts: attempt,
                    }
                }
                PollStep::Pending(state) => last = Some(state),
            }

            if attempt < budget {
                sleep(self.calculate_delay(attempt)).await;
            }
        }

        PollOutcome::Exhausted {
            attempts: budget,
            last,
        }
    }
}
