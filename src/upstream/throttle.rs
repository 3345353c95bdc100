use backon::{BackoffBuilder, ExponentialBuilder};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::Value;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::UpstreamReply;
use super::policy::{ActionForReply, Expect, body_preview, classify_reply};
use crate::config::UpstreamConfig;
use crate::error::{IsRetryable, ScoutError};
use crate::utils::logging::with_pretty_json_debug;

/// Pacing and cooldown knobs, resolved from [`UpstreamConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ThrottleSettings {
    pub interval: Duration,
    pub cooldown_min: Duration,
    pub cooldown_max: Duration,
    pub cooldown_steps: usize,
    /// Extra attempts after a transport fault or 5xx before giving up.
    pub network_retries: usize,
}

impl From<&UpstreamConfig> for ThrottleSettings {
    fn from(cfg: &UpstreamConfig) -> Self {
        Self {
            interval: Duration::from_millis(cfg.request_interval_ms),
            cooldown_min: Duration::from_secs(cfg.cooldown_min_secs),
            cooldown_max: Duration::from_secs(cfg.cooldown_max_secs.max(cfg.cooldown_min_secs)),
            cooldown_steps: cfg.cooldown_steps,
            network_retries: cfg.retry_max_times,
        }
    }
}

fn network_retry_policy(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(200))
        .with_max_delay(Duration::from_secs(2))
        .with_max_times(max_times)
        .with_jitter()
}

/// Single gate for every upstream call.
///
/// Shared by all workers: one `governor` quota spaces calls out, and a cooldown deadline set
/// by any caller holds back everyone until it passes. Every attempt, network retries included,
/// takes a permit. Waits end early on cancellation.
pub struct Throttle {
    limiter: DefaultDirectRateLimiter,
    cooldown_policy: ExponentialBuilder,
    network_policy: ExponentialBuilder,
    cooldown_max: Duration,
    resume_at: Mutex<Option<Instant>>,
    cancel: CancellationToken,
}

impl Throttle {
    pub fn new(settings: ThrottleSettings, cancel: CancellationToken) -> Self {
        let quota = Quota::with_period(settings.interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX))
            .allow_burst(NonZeroU32::MIN);
        let cooldown_policy = ExponentialBuilder::default()
            .with_min_delay(settings.cooldown_min)
            .with_max_delay(settings.cooldown_max)
            .with_max_times(settings.cooldown_steps)
            .with_jitter();

        info!(
            interval_ms = settings.interval.as_millis() as u64,
            cooldown_min_secs = settings.cooldown_min.as_secs(),
            cooldown_max_secs = settings.cooldown_max.as_secs(),
            cooldown_steps = settings.cooldown_steps,
            network_retries = settings.network_retries,
            "Upstream throttle configured"
        );

        Self {
            limiter: RateLimiter::direct(quota),
            cooldown_policy,
            network_policy: network_retry_policy(settings.network_retries),
            cooldown_max: settings.cooldown_max,
            resume_at: Mutex::new(None),
            cancel,
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs `call` until its reply has the `expect` shape.
    ///
    /// Rejected replies pause the whole throttle and the same call is retried without limit.
    /// Transport faults and 5xx get a bounded number of retries. Exhausted network retries,
    /// decode errors, permanent statuses and cancellation come back as `Err`.
    pub async fn execute<F, Fut>(
        &self,
        subject: &str,
        expect: Expect,
        mut call: F,
    ) -> Result<Value, ScoutError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<UpstreamReply, ScoutError>>,
    {
        let mut cooldowns = self.cooldown_policy.build();
        let mut network = self.network_policy.build();
        let mut attempt: u32 = 0;

        loop {
            self.ready().await?;
            attempt += 1;
            let reply = match call().await {
                Ok(reply) => reply,
                Err(e) if e.is_retryable() => {
                    let Some(delay) = network.next() else {
                        return Err(e);
                    };
                    debug!(
                        subject,
                        attempt,
                        error = %e,
                        "Upstream transport error (will retry in {:?})",
                        delay
                    );
                    self.sleep(delay).await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match classify_reply(&reply, expect) {
                ActionForReply::Accept => {
                    if attempt > 1 {
                        info!(subject, attempt, "Upstream accepted after cooldown");
                    }
                    return Ok(reply.body);
                }
                ActionForReply::Fail => {
                    return Err(ScoutError::UpstreamStatus {
                        status: reply.status,
                        body: body_preview(&reply.body),
                    });
                }
                ActionForReply::CoolDown(hint) => {
                    let wait = hint
                        .or_else(|| cooldowns.next())
                        .unwrap_or(self.cooldown_max);
                    warn!(
                        subject,
                        attempt,
                        status = %reply.status,
                        ?expect,
                        body = %body_preview(&reply.body),
                        "Upstream rejected request (rate limit or bad shape), cooling down for {:?}",
                        wait
                    );
                    with_pretty_json_debug(&reply.body, |pretty| {
                        debug!(subject, body = %pretty, "Rejected upstream body");
                    });
                    self.pause_for(wait);
                }
            }
        }
    }

    /// Resolves once the shared cooldown is over and a quota permit is available.
    async fn ready(&self) -> Result<(), ScoutError> {
        loop {
            if self.cancel.is_cancelled() {
                return Err(ScoutError::Cancelled);
            }
            let Some(until) = self.resume_at() else {
                break;
            };
            if until <= Instant::now() {
                break;
            }
            tokio::select! {
                () = self.cancel.cancelled() => return Err(ScoutError::Cancelled),
                () = sleep_until(until) => {}
            }
        }

        tokio::select! {
            () = self.cancel.cancelled() => Err(ScoutError::Cancelled),
            () = self.limiter.until_ready() => Ok(()),
        }
    }

    async fn sleep(&self, wait: Duration) -> Result<(), ScoutError> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(ScoutError::Cancelled),
            () = tokio::time::sleep(wait) => Ok(()),
        }
    }

    fn resume_at(&self) -> Option<Instant> {
        *self
            .resume_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn pause_for(&self, wait: Duration) {
        let now = Instant::now();
        // Absurd upstream hints fall back to the longest configured cooldown.
        let candidate = now
            .checked_add(wait)
            .or_else(|| now.checked_add(self.cooldown_max))
            .unwrap_or(now);
        let mut resume_at = self
            .resume_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Never shorten a pause another caller already set.
        if resume_at.is_none_or(|current| current < candidate) {
            *resume_at = Some(candidate);
        }
    }
}
