//! Listener actions and the per-event listener sequences.

use std::fmt;
use std::sync::Arc;

use crate::api::models::Status;

/// A callable run when a connection event fires.
///
/// Actions are compared by identity: two `Action`s are equal only if one is
/// a clone of the other. Keep a clone of the action you register so it can
/// be passed to the matching `remove_*` method later.
///
/// # Example
///
/// ```rust
/// use connreg::Action;
///
/// struct Client;
///
/// let a: Action<Client> = Action::new(|_client| println!("connected"));
/// let b = a.clone();
/// let c: Action<Client> = Action::new(|_client| println!("connected"));
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
pub struct Action<C> {
    f: Arc<dyn Fn(&Arc<C>) + Send + Sync>,
}

impl<C> Action<C> {
    /// Wraps a closure as an action.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Arc<C>) + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Invokes the action with the client handle.
    pub fn call(&self, client: &Arc<C>) {
        (self.f)(client)
    }
}

impl<C> Clone for Action<C> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<C> PartialEq for Action<C> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl<C> Eq for Action<C> {}

impl<C> fmt::Debug for Action<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("ptr", &Arc::as_ptr(&self.f).cast::<()>())
            .finish()
    }
}

/// The three connection events listeners can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventKind {
    Connect,
    Suspend,
    Failed,
}

impl EventKind {
    /// Status a registry holds right after this event fires.
    pub(crate) fn status(self) -> Status {
        match self {
            Self::Connect => Status::Connected,
            Self::Suspend => Status::Suspended,
            Self::Failed => Status::Failed,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Suspend => write!(f, "suspend"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Ordered listener sequences, one per event kind.
///
/// Insertion order is invocation order. Duplicates are kept.
pub(crate) struct ListenerSet<C> {
    on_connect: Vec<Action<C>>,
    on_suspend: Vec<Action<C>>,
    on_failed: Vec<Action<C>>,
}

impl<C> ListenerSet<C> {
    pub(crate) fn new() -> Self {
        Self {
            on_connect: Vec::new(),
            on_suspend: Vec::new(),
            on_failed: Vec::new(),
        }
    }

    fn sequence(&self, kind: EventKind) -> &Vec<Action<C>> {
        match kind {
            EventKind::Connect => &self.on_connect,
            EventKind::Suspend => &self.on_suspend,
            EventKind::Failed => &self.on_failed,
        }
    }

    fn sequence_mut(&mut self, kind: EventKind) -> &mut Vec<Action<C>> {
        match kind {
            EventKind::Connect => &mut self.on_connect,
            EventKind::Suspend => &mut self.on_suspend,
            EventKind::Failed => &mut self.on_failed,
        }
    }

    pub(crate) fn push(&mut self, kind: EventKind, action: Action<C>) {
        self.sequence_mut(kind).push(action);
    }

    /// Removes the first occurrence of `action`. Returns whether one was found.
    pub(crate) fn remove(&mut self, kind: EventKind, action: &Action<C>) -> bool {
        let seq = self.sequence_mut(kind);
        match seq.iter().position(|a| a == action) {
            Some(idx) => {
                seq.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Clones the sequence so it can be invoked without holding a lock.
    pub(crate) fn snapshot(&self, kind: EventKind) -> Vec<Action<C>> {
        self.sequence(kind).clone()
    }

    pub(crate) fn len(&self, kind: EventKind) -> usize {
        self.sequence(kind).len()
    }
}
