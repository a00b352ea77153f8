use crate::color::Color;
use crate::error::FireError;
use crate::remote::Remote;
use crate::shutdown::Shutdown;
use crate::trajectory::TrajectoryResult;
use ballista_proto::ShootRequest;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;
use tokio_retry::strategy::{ExponentialBackoff, FixedInterval};

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Status code the game API uses to acknowledge a command. Older versions of the API
/// answer with HTTP-style `200`, newer ones with the enumerated code `20`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SuccessCode(pub i64);

impl SuccessCode {
    pub const HTTP_OK: SuccessCode = SuccessCode(200);
    pub const ENUMERATED: SuccessCode = SuccessCode(20);

    pub fn matches(self, status: i64) -> bool {
        self.0 == status
    }
}

impl Default for SuccessCode {
    fn default() -> Self {
        SuccessCode::HTTP_OK
    }
}

/// How long to keep resending a command the API has not acknowledged.
///
/// The default retries forever every 100ms. Limits are opt-in.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    pub interval: Duration,
    /// Grow the delay by this factor after each failed attempt. `None` keeps it fixed.
    pub backoff: Option<u64>,
    pub max_interval: Duration,
    pub max_attempts: Option<u32>,
    /// Give up once this much time has passed since the first attempt.
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            interval: DEFAULT_RETRY_INTERVAL,
            backoff: None,
            max_interval: Duration::from_secs(10),
            max_attempts: None,
            deadline: None,
        }
    }
}

pub type Schedule = Box<dyn Iterator<Item = Duration> + Send>;

impl RetryPolicy {
    pub fn bounded(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts: Some(max_attempts),
            ..Default::default()
        }
    }

    /// Delays between consecutive attempts. Runs dry once `max_attempts` is reached.
    pub fn schedule(&self) -> Schedule {
        let delays: Schedule = match self.backoff {
            Some(base) if base > 1 => {
                let interval_ms = self.interval.as_millis().min(u64::MAX as u128) as u64;
                let growth = ExponentialBackoff::from_millis(base)
                    .factor(interval_ms)
                    .max_delay(self.max_interval.max(self.interval));
                Box::new(std::iter::once(self.interval).chain(growth))
            }
            _ => Box::new(FixedInterval::new(self.interval)),
        };
        match self.max_attempts {
            Some(max) => Box::new(delays.take(max.saturating_sub(1) as usize)),
            None => delays,
        }
    }

    pub fn past_deadline(&self, elapsed: Duration) -> bool {
        self.deadline.map_or(false, |deadline| elapsed >= deadline)
    }
}

/// One shot: where to aim and how many units of each pigment to load.
#[derive(Clone, Debug, PartialEq)]
pub struct ShotCommand {
    pub trajectory: TrajectoryResult,
    pub colors: BTreeMap<Color, u64>,
}

impl ShotCommand {
    pub fn single(trajectory: TrajectoryResult, color: Color) -> ShotCommand {
        ShotCommand {
            trajectory,
            colors: BTreeMap::from([(color, 1)]),
        }
    }

    pub fn request(&self, power_scale: f64) -> ShootRequest {
        ShootRequest {
            angle_horizontal: self.trajectory.horizontal_angle,
            angle_vertical: self.trajectory.vertical_angle,
            power: self.trajectory.power * power_scale,
            colors: self
                .colors
                .iter()
                .map(|(color, amount)| (color.packed(), *amount))
                .collect(),
        }
    }
}

pub struct Dispatcher<R> {
    remote: R,
    success: SuccessCode,
    retry: RetryPolicy,
    power_scale: f64,
    shutdown: Shutdown,
}

impl<R: Remote> Dispatcher<R> {
    pub fn new(remote: R, success: SuccessCode, retry: RetryPolicy, shutdown: Shutdown) -> Self {
        Dispatcher {
            remote,
            success,
            retry,
            power_scale: 1.0,
            shutdown,
        }
    }

    pub fn with_power_scale(mut self, power_scale: f64) -> Self {
        self.power_scale = power_scale;
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Sends `command` until the API acknowledges it. Returns the command id when the
    /// API queues shots for asynchronous processing.
    ///
    /// Transport errors are returned immediately. Unacknowledged shots are resent
    /// according to the retry policy.
    pub async fn fire(&self, command: &ShotCommand) -> Result<Option<i64>, FireError> {
        let request = command.request(self.power_scale);
        let start = Instant::now();
        let mut delays = self.retry.schedule();
        let mut attempts = 0;
        loop {
            if self.shutdown.is_triggered() {
                return Err(FireError::Cancelled);
            }
            attempts += 1;
            let response = self.remote.shoot(&request).await?;
            if self.success.matches(response.status) {
                log::debug!(
                    "Shot acknowledged after {} attempt(s): {:?}",
                    attempts,
                    request
                );
                return Ok(response.command_id());
            }
            log::warn!(
                "Shot rejected with status {} (attempt {})",
                response.status,
                attempts
            );
            let delay = match delays.next() {
                Some(delay) if !self.retry.past_deadline(start.elapsed()) => delay,
                _ => {
                    return Err(FireError::Exhausted {
                        attempts,
                        last_status: response.status,
                    })
                }
            };
            if !self.shutdown.sleep(delay).await {
                return Err(FireError::Cancelled);
            }
        }
    }

    /// Polls the command queue until `id` shows up and reports whether it succeeded.
    pub async fn wait_for_completion(&self, id: i64) -> Result<bool, FireError> {
        let start = Instant::now();
        let mut delays = self.retry.schedule();
        let mut polls = 0;
        loop {
            if self.shutdown.is_triggered() {
                return Err(FireError::Cancelled);
            }
            polls += 1;
            let entries = self.remote.queue(id).await?;
            if let Some(entry) = entries.iter().find(|entry| entry.id == id) {
                log::debug!("Command {} finished with status {}", id, entry.status);
                return Ok(self.success.matches(entry.status));
            }
            let delay = match delays.next() {
                Some(delay) if !self.retry.past_deadline(start.elapsed()) => delay,
                _ => return Err(FireError::NotQueued { id, polls }),
            };
            if !self.shutdown.sleep(delay).await {
                return Err(FireError::Cancelled);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn first(policy: &RetryPolicy, n: usize) -> Vec<Duration> {
        policy.schedule().take(n).collect()
    }

    #[test]
    fn test_fixed_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(first(&policy, 50), vec![Duration::from_millis(100); 50]);
        assert_eq!(policy.schedule().nth(100_000), Some(Duration::from_millis(100)));
        assert!(!policy.past_deadline(Duration::from_secs(86400)));
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy {
            backoff: Some(2),
            max_interval: Duration::from_millis(500),
            ..Default::default()
        };
        let ms = |n| Duration::from_millis(n);
        assert_eq!(
            first(&policy, 6),
            vec![ms(100), ms(200), ms(400), ms(500), ms(500), ms(500)]
        );
        assert_eq!(policy.schedule().nth(1000), Some(ms(500)));
    }

    #[test]
    fn test_backoff_of_one_is_fixed() {
        let policy = RetryPolicy {
            backoff: Some(1),
            ..Default::default()
        };
        assert_eq!(first(&policy, 3), vec![Duration::from_millis(100); 3]);
    }

    #[test]
    fn test_limits() {
        let policy = RetryPolicy {
            max_attempts: Some(3),
            deadline: Some(Duration::from_secs(1)),
            ..Default::default()
        };
        // Three attempts leave room for two delays.
        assert_eq!(policy.schedule().count(), 2);
        assert!(!policy.past_deadline(Duration::from_millis(999)));
        assert!(policy.past_deadline(Duration::from_secs(1)));
        assert_eq!(RetryPolicy::bounded(1).schedule().count(), 0);
        assert_eq!(RetryPolicy::bounded(0).schedule().count(), 0);
    }

    #[test]
    fn test_request() {
        let red = Color::from_packed(0xff0000).unwrap();
        let command = ShotCommand::single(
            TrajectoryResult {
                horizontal_angle: 1.0,
                vertical_angle: 45.0,
                power: 2.5,
            },
            red,
        );
        let request = command.request(10.0);
        assert_eq!(request.power, 25.0);
        assert_eq!(request.colors, vec![(0xff0000, 1)]);
    }
}
