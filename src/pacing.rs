//! Delay policies for pacing browser interaction.
//!
//! The browser session and scrape loop never sleep directly; they wait on a
//! [`DelayPolicy`], so tests can run with [`NoDelay`].

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

/// Something that can pause the current control flow.
#[async_trait]
pub trait DelayPolicy: Send + Sync {
    /// The duration the next `wait` would sleep for.
    fn next_delay(&self) -> Duration;

    async fn wait(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayPolicy for NoDelay {
    fn next_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Always waits the same duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl DelayPolicy for FixedDelay {
    fn next_delay(&self) -> Duration {
        self.0
    }
}

/// Waits a uniformly random duration in `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct JitterDelay {
    min: Duration,
    max: Duration,
}

impl JitterDelay {
    /// Bounds given in either order are accepted.
    #[must_use]
    pub fn new(a: Duration, b: Duration) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[must_use]
    pub fn from_secs_f64(min: f64, max: f64) -> Self {
        Self::new(Duration::from_secs_f64(min), Duration::from_secs_f64(max))
    }

    #[must_use]
    pub fn bounds(&self) -> (Duration, Duration) {
        (self.min, self.max)
    }

    fn sample(&self, rng: &mut impl Rng) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        Duration::from_secs_f64(rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64()))
    }
}

impl DelayPolicy for JitterDelay {
    fn next_delay(&self) -> Duration {
        self.sample(&mut rand::thread_rng())
    }
}

/// Keystroke timing that resembles a person typing.
///
/// Each key waits `per_key`; with probability `hesitation_chance` an extra
/// `hesitation` pause is added on top.
#[derive(Debug, Clone, Copy)]
pub struct TypingCadence {
    pub per_key: JitterDelay,
    pub hesitation: JitterDelay,
    pub hesitation_chance: f64,
}

impl Default for TypingCadence {
    fn default() -> Self {
        Self {
            per_key: JitterDelay::from_secs_f64(0.1, 0.3),
            hesitation: JitterDelay::from_secs_f64(0.3, 0.7),
            hesitation_chance: 0.1,
        }
    }
}

impl DelayPolicy for TypingCadence {
    fn next_delay(&self) -> Duration {
        let mut rng = rand::thread_rng();
        let mut delay = self.per_key.sample(&mut rng);
        if rng.gen_bool(self.hesitation_chance.clamp(0.0, 1.0)) {
            delay += self.hesitation.sample(&mut rng);
        }
        delay
    }
}

/// Every pause the browser session makes.
pub struct Pacing {
    pub keystroke: Box<dyn DelayPolicy>,
    /// Between hovering the submit button and clicking it.
    pub click: Box<dyn DelayPolicy>,
    /// After submitting the login form.
    pub login_settle: Box<dyn DelayPolicy>,
    /// After each navigation.
    pub navigation_settle: Box<dyn DelayPolicy>,
}

impl Pacing {
    /// Human-like pacing with the given settle times.
    #[must_use]
    pub fn human(login_settle: Duration, navigation_settle: Duration) -> Self {
        Self {
            keystroke: Box::new(TypingCadence::default()),
            click: Box::new(JitterDelay::from_secs_f64(0.2, 0.4)),
            login_settle: Box::new(FixedDelay(login_settle)),
            navigation_settle: Box::new(FixedDelay(navigation_settle)),
        }
    }
}

impl std::fmt::Debug for Pacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacing").finish_non_exhaustive()
    }
}
