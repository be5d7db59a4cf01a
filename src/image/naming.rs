//! Name generation for new images.

use chrono::{DateTime, Utc};

/// Prefix of every generated image name.
pub const IMAGE_NAME_PREFIX: &str = "autoscale-";

/// Source of the current time, injectable for tests.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Builds `autoscale-<unix-seconds>` from the clock.
///
/// Two calls in the same second produce the same name; the provider's own
/// name uniqueness rule decides what happens then.
#[must_use]
pub fn image_name(clock: &impl Clock) -> String {
    format!("{IMAGE_NAME_PREFIX}{}", clock.now().timestamp())
}
