//! Listener registry and synchronous dispatch.
//!
//! # Design
//! - One map from `(name, payload type)` to a type-erased `Vec<Entry<P>>`;
//!   typed accessors downcast on every access.
//! - A key present in the map always holds at least one entry.
//! - The lock is released before any listener runs, so listeners may call
//!   back into the registry. Dispatch walks a snapshot taken when it starts.
//! - Listener panics are not caught: they unwind out of `emit` and the rest
//!   of that round is skipped.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace, warn};

use crate::config::RegistryConfig;
use crate::error::ConfigResult;
use crate::listener::{Entry, Listener};
use crate::topics::{EventKind, Topic, TopicKey};

type Slot = Box<dyn Any + Send + Sync>;

/// Typed publish/subscribe registry.
pub struct Registry {
    slots: Mutex<HashMap<TopicKey, Slot>>,
    config: RegistryConfig,
}

impl Registry {
    /// Construct an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(RegistryConfig::default())
    }

    /// Construct an empty registry after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError`] if the configuration is invalid.
    pub fn with_config(config: RegistryConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: RegistryConfig) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Configuration the registry was built with.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Append `listener` to the end of `topic`'s sequence.
    ///
    /// Registering the same listener twice yields two entries, both invoked.
    pub fn on<P: 'static>(&self, topic: &Topic<P>, listener: &Listener<P>) {
        self.insert(topic, Entry::persistent(listener.clone()));
    }

    /// Wrap `callback` in a new listener, register it, and return the handle.
    pub fn subscribe<P: 'static>(
        &self,
        topic: &Topic<P>,
        callback: impl Fn(&P) + Send + Sync + 'static,
    ) -> Listener<P> {
        let listener = Listener::new(callback);
        self.on(topic, &listener);
        listener
    }

    /// Register `listener` for the next emit on `topic` only.
    ///
    /// Returns the adapter that is actually stored; pass it to [`Self::off`]
    /// to cancel before it fires. Removing `listener` itself has no effect on
    /// the adapter.
    pub fn once<P: 'static>(&self, topic: &Topic<P>, listener: &Listener<P>) -> Listener<P> {
        let adapter = listener.adapter();
        self.insert(topic, Entry::once(adapter.clone()));
        adapter
    }

    /// Remove every entry for `topic` that is the same listener as `listener`.
    ///
    /// Unknown topics and listeners are ignored.
    pub fn off<P: 'static>(&self, topic: &Topic<P>, listener: &Listener<P>) {
        let removed = self.remove_matching(topic, listener);
        if removed > 0 {
            debug!(
                registry = %self.config.label,
                topic = %topic,
                removed,
                "listener removed"
            );
        }
    }

    /// Remove every listener registered for `topic`.
    pub fn off_all<P: 'static>(&self, topic: &Topic<P>) {
        let removed = self.lock_slots().remove(&topic.key());
        if removed.is_some() {
            debug!(registry = %self.config.label, topic = %topic, "topic cleared");
        }
    }

    /// Remove every listener for every topic.
    pub fn clear(&self) {
        let mut slots = self.lock_slots();
        let topics = slots.len();
        slots.clear();
        drop(slots);
        debug!(registry = %self.config.label, topics, "registry cleared");
    }

    /// Invoke every listener of `topic`, in registration order, with `payload`.
    ///
    /// Every listener present when dispatch starts runs in this round, even if
    /// another listener removes it meanwhile. Listeners added during dispatch
    /// run from the next emit onward. A once-listener is detached before it is
    /// invoked and never fires twice, including under re-entrant emits.
    pub fn emit<P: 'static>(&self, topic: &Topic<P>, payload: &P) {
        let snapshot = {
            let slots = self.lock_slots();
            match entries::<P>(&slots, &topic.key()) {
                Some(entries) => entries.clone(),
                None => {
                    trace!(registry = %self.config.label, topic = %topic, "emit without listeners");
                    return;
                }
            }
        };
        trace!(
            registry = %self.config.label,
            topic = %topic,
            listeners = snapshot.len(),
            "emit"
        );

        for entry in &snapshot {
            if !entry.claim() {
                continue;
            }
            if entry.is_once() {
                self.detach(topic, &entry.listener);
            }
            entry.listener.call(payload);
        }
    }

    /// Emit a tagged event on the channel named by its [`EventKind::kind`].
    pub fn dispatch<E: EventKind>(&self, event: &E) {
        self.emit(&Topic::<E>::new(event.kind()), event);
    }

    /// Number of entries currently registered for `topic`.
    #[must_use]
    pub fn listener_count<P: 'static>(&self, topic: &Topic<P>) -> usize {
        entries::<P>(&self.lock_slots(), &topic.key()).map_or(0, Vec::len)
    }

    /// Whether `topic` has at least one registered entry.
    #[must_use]
    pub fn has_listeners<P: 'static>(&self, topic: &Topic<P>) -> bool {
        self.lock_slots().contains_key(&topic.key())
    }

    /// Number of topics with at least one registered entry.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.lock_slots().len()
    }

    /// Whether no topic has any registered entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_slots().is_empty()
    }

    fn insert<P: 'static>(&self, topic: &Topic<P>, entry: Entry<P>) {
        let once = entry.is_once();
        let mut slots = self.lock_slots();
        let slot = slots
            .entry(topic.key())
            .or_insert_with(|| Box::new(Vec::<Entry<P>>::new()) as Slot);
        // The key carries `TypeId::of::<P>()`, so the slot always holds `Vec<Entry<P>>`.
        debug_assert!(
            slot.is::<Vec<Entry<P>>>(),
            "listener slot holds a different payload type"
        );
        if !slot.is::<Vec<Entry<P>>>() {
            *slot = Box::new(Vec::<Entry<P>>::new());
        }
        let count = slot.downcast_mut::<Vec<Entry<P>>>().map_or(0, |entries| {
            entries.push(entry);
            entries.len()
        });
        drop(slots);

        debug!(
            registry = %self.config.label,
            topic = %topic,
            once,
            listeners = count,
            "listener registered"
        );
        if let Some(max) = self.config.max_listeners
            && count == max.saturating_add(1)
        {
            warn!(
                registry = %self.config.label,
                topic = %topic,
                listeners = count,
                max,
                "possible listener leak: threshold exceeded"
            );
        }
    }

    fn detach<P: 'static>(&self, topic: &Topic<P>, adapter: &Listener<P>) {
        if self.remove_matching(topic, adapter) > 0 {
            debug!(registry = %self.config.label, topic = %topic, "once listener detached");
        }
    }

    fn remove_matching<P: 'static>(&self, topic: &Topic<P>, listener: &Listener<P>) -> usize {
        let key = topic.key();
        let mut slots = self.lock_slots();
        let Some(entries) = slots
            .get_mut(&key)
            .and_then(|slot| slot.downcast_mut::<Vec<Entry<P>>>())
        else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|entry| !entry.listener.same(listener));
        let removed = before - entries.len();
        if entries.is_empty() {
            slots.remove(&key);
        }
        removed
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<TopicKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Registry")
            .field("label", &self.config.label)
            .field("topics", &self.topic_count())
            .finish_non_exhaustive()
    }
}

fn entries<'a, P: 'static>(
    slots: &'a HashMap<TopicKey, Slot>,
    key: &TopicKey,
) -> Option<&'a Vec<Entry<P>>> {
    slots
        .get(key)
        .and_then(|slot| slot.downcast_ref::<Vec<Entry<P>>>())
}
