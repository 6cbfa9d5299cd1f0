//! Clock and identifier generation

use fb_model::{OptionId, PageId, QuestionId};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;

/// Source of creation timestamps
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random part of option ids
pub const OPTION_SUFFIX_LEN: usize = 9;

/// Timestamped identifiers
///
/// Timestamps never repeat within one generator: a request in the same
/// millisecond as the previous one gets `previous + 1`.
#[derive(Debug)]
pub struct IdGenerator<C> {
    clock: C,
    last: Mutex<i64>,
}

impl<C: Clock> IdGenerator<C> {
    /// Generator over `clock`
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last: Mutex::new(i64::MIN),
        }
    }

    /// Next strictly increasing timestamp
    pub fn next_millis(&self) -> i64 {
        let mut last = self.last.lock();
        let now = self.clock.now_millis().max(last.saturating_add(1));
        *last = now;
        now
    }

    /// Fresh page id
    pub fn page_id(&self) -> PageId {
        PageId::from_timestamp(self.next_millis())
    }

    /// Fresh question id
    pub fn question_id(&self) -> QuestionId {
        QuestionId::from_timestamp(self.next_millis())
    }

    /// Fresh option id with a random base-36 suffix
    pub fn option_id(&self) -> OptionId {
        let mut rng = rand::rng();
        let suffix: String = (0..OPTION_SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
            .collect();
        OptionId::from_parts(self.next_millis(), &suffix)
    }
}
