use std::time::{Duration, Instant};

use p25_core::StreamId;

/// Upper bound on a single transmission. Armed per call and keyed by the call's stream
/// id, so a cancel or expiry always refers to the call that armed it.
#[derive(Debug)]
pub struct CallHoldTimer {
    limit: Duration,
    armed: Option<(StreamId, Instant)>,
}

impl CallHoldTimer {
    pub fn new(limit: Duration) -> Self {
        Self { limit, armed: None }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn arm(&mut self, stream_id: StreamId, now: Instant) {
        self.armed = Some((stream_id, now + self.limit));
    }

    /// Cancel the timer if it is armed for `stream_id`
    pub fn cancel(&mut self, stream_id: StreamId) {
        if self.armed.is_some_and(|(id, _)| id == stream_id) {
            self.armed = None;
        }
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Returns the stream id once its deadline has passed. Fires once.
    pub fn expired(&mut self, now: Instant) -> Option<StreamId> {
        match self.armed {
            Some((id, deadline)) if now >= deadline => {
                self.armed = None;
                Some(id)
            }
            _ => None,
        }
    }
}
