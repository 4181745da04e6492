use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one request among those issued by a [`RequestSequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Result of a request that may have been overtaken by a newer one.
#[derive(Debug, Clone, PartialEq)]
pub enum Sequenced<T> {
    Current(T),
    Superseded,
}

impl<T> Sequenced<T> {
    pub fn into_current(self) -> Option<T> {
        match self {
            Sequenced::Current(v) => Some(v),
            Sequenced::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Sequenced::Superseded)
    }
}

/// Last-request-wins bookkeeping. Starting a request invalidates every earlier token.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Wraps `value` as current only if `token` is still the latest request.
    pub fn settle<T>(&self, token: RequestToken, value: T) -> Sequenced<T> {
        if self.is_current(token) {
            Sequenced::Current(value)
        } else {
            tracing::debug!(token = token.0, "discarding superseded result");
            Sequenced::Superseded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_request_supersedes_older() {
        let seq = RequestSequencer::new();
        let a = seq.begin();
        assert!(seq.is_current(a));
        let b = seq.begin();
        assert!(b > a);
        assert!(!seq.is_current(a));
        assert!(seq.is_current(b));
        assert!(seq.settle(a, 1).is_superseded());
        assert_eq!(seq.settle(b, 2).into_current(), Some(2));
    }
}
