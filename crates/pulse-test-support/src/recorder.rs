//! Recording listeners for asserting dispatch behaviour.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Result, bail};

/// Records a clone of every payload its listeners receive.
pub struct Recorder<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    /// Create a recorder with no calls.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Callback that appends each payload to this recorder.
    pub fn listener(&self) -> impl Fn(&T) + Send + Sync + use<T> {
        let calls = Arc::clone(&self.calls);
        move |payload: &T| {
            calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(payload.clone());
        }
    }

    /// Payloads received so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<T> {
        self.lock().clone()
    }

    /// Number of payloads received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    /// The only payload received.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly one call was recorded.
    pub fn single(&self) -> Result<T> {
        let calls = self.lock();
        match calls.as_slice() {
            [only] => Ok(only.clone()),
            other => bail!("expected exactly one call, recorded {}", other.len()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + 'static> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

/// Shared log of labels for asserting invocation order across listeners.
#[derive(Clone, Default)]
pub struct Sequence {
    labels: Arc<Mutex<Vec<&'static str>>>,
}

impl Sequence {
    /// Create an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback that appends `label` whenever it is invoked.
    pub fn marker<T>(&self, label: &'static str) -> impl Fn(&T) + Send + Sync + use<T> {
        let labels = Arc::clone(&self.labels);
        move |_: &T| {
            labels
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(label);
        }
    }

    /// Labels recorded so far, in invocation order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.labels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_keeps_call_order() {
        let recorder = Recorder::<u8>::new();
        let listener = recorder.listener();
        listener(&1);
        listener(&2);

        assert_eq!(recorder.calls(), vec![1, 2]);
        assert_eq!(recorder.call_count(), 2);
        assert!(recorder.single().is_err());
    }

    #[test]
    fn single_returns_the_only_call() -> Result<()> {
        let recorder = Recorder::<String>::new();
        assert!(recorder.single().is_err());

        recorder.clone().listener()(&"only".to_string());
        assert_eq!(recorder.single()?, "only");
        Ok(())
    }

    #[test]
    fn sequence_interleaves_markers() {
        let sequence = Sequence::new();
        let first = sequence.marker::<()>("first");
        let second = sequence.marker::<()>("second");
        second(&());
        first(&());

        assert_eq!(sequence.labels(), vec!["second", "first"]);
    }
}
