//! Topic identifiers binding an event name to its payload type.
//!
//! # Design
//! - A `Topic<P>` is the typed accessor for one channel; `P` is fixed at the
//!   call site so listeners and emitters cannot disagree on the payload shape.
//! - Names are open: any string or freshly minted symbol may be used at any time.
//! - The backing map key pairs the name with `TypeId::of::<P>()`.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

/// Name half of a topic: a string or a unique symbol.
#[derive(Clone)]
pub enum TopicName {
    /// Topic addressed by a string; equal strings address the same channel.
    Named(Cow<'static, str>),
    /// Topic addressed by a unique identity minted by [`Topic::symbol`].
    Symbol {
        /// Process-unique symbol identifier.
        id: u64,
        /// Human-readable description, ignored for equality.
        description: Cow<'static, str>,
    },
}

impl PartialEq for TopicName {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Named(left), Self::Named(right)) => left == right,
            (Self::Symbol { id: left, .. }, Self::Symbol { id: right, .. }) => left == right,
            _ => false,
        }
    }
}

impl Eq for TopicName {}

impl Hash for TopicName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Named(name) => {
                state.write_u8(0);
                name.hash(state);
            }
            Self::Symbol { id, .. } => {
                state.write_u8(1);
                id.hash(state);
            }
        }
    }
}

impl Display for TopicName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => formatter.write_str(name),
            Self::Symbol { id, description } => write!(formatter, "symbol({description})#{id}"),
        }
    }
}

impl Debug for TopicName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, formatter)
    }
}

/// Typed event channel carrying payloads of type `P`.
///
/// Multi-argument events use a tuple payload, e.g. `Topic<(String, u32)>`.
pub struct Topic<P> {
    name: TopicName,
    payload: PhantomData<fn(&P)>,
}

impl<P> Topic<P> {
    /// Topic addressed by a static string.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: TopicName::Named(Cow::Borrowed(name)),
            payload: PhantomData,
        }
    }

    /// Topic addressed by a runtime string.
    #[must_use]
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: TopicName::Named(name.into()),
            payload: PhantomData,
        }
    }

    /// Mint a topic with a fresh identity; no other `symbol` call yields an equal topic.
    #[must_use]
    pub fn symbol(description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: TopicName::Symbol {
                id: NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed),
                description: description.into(),
            },
            payload: PhantomData,
        }
    }

    /// Name half of the topic.
    #[must_use]
    pub const fn name(&self) -> &TopicName {
        &self.name
    }
}

impl<P: EventKind> Topic<P> {
    /// Topic for one variant tag of a tagged event type.
    #[must_use]
    pub const fn kind(kind: &'static str) -> Self {
        Self::new(kind)
    }
}

impl<P: 'static> Topic<P> {
    pub(crate) fn key(&self) -> TopicKey {
        TopicKey {
            name: self.name.clone(),
            payload: TypeId::of::<P>(),
        }
    }
}

impl<P> Clone for Topic<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            payload: PhantomData,
        }
    }
}

impl<P> PartialEq for Topic<P> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<P> Eq for Topic<P> {}

impl<P> Hash for Topic<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<P> Display for Topic<P> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.name, formatter)
    }
}

impl<P> Debug for Topic<P> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Topic")
            .field("name", &self.name)
            .field("payload", &std::any::type_name::<P>())
            .finish()
    }
}

/// Key of the registry's backing map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TopicKey {
    name: TopicName,
    payload: TypeId,
}

/// Tagged event types whose variants each form their own channel.
///
/// Implementors return a machine-friendly discriminator per variant; the
/// registry routes [`crate::Registry::dispatch`] on it.
pub trait EventKind: 'static {
    /// Discriminator naming the channel this value is delivered on.
    fn kind(&self) -> &'static str;
}
