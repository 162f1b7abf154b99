#![forbid(unsafe_code)]

//! Synchronous publish/subscribe channel for rule-set edits.
//!
//! # Design
//!
//! [`SettingsBus`] keeps subscriber callbacks as weak references and hands
//! the strong reference back inside a [`SettingsSubscription`] guard, the same
//! shape as `Observable::subscribe`. Dropping the guard unsubscribes; the
//! dead entry is pruned on the next dispatch. [`SettingsBus::unsubscribe`]
//! removes an entry immediately.
//!
//! Dispatch first persists the rule set through the attached
//! [`StorageBackend`] (if any), then notifies live subscribers in
//! registration order. Subscribers are notified even when the save fails:
//! the in-memory rule set stays the source of truth for the session.

use std::fmt;
use std::rc::{Rc, Weak};

use autoview_core::{RuleSet, SettingsEvent};
use tracing::{debug, warn};

use crate::storage::{StorageBackend, StorageResult};

type CallbackRc = Rc<dyn Fn(&SettingsEvent)>;
type CallbackWeak = Weak<dyn Fn(&SettingsEvent)>;

/// Identifier of one subscription, unique per bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

struct Subscriber {
    id: SubscriptionId,
    callback: CallbackWeak,
}

/// Observer list plus the persistence hook.
pub struct SettingsBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    storage: Option<Box<dyn StorageBackend>>,
}

impl fmt::Debug for SettingsBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsBus")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .field("has_storage", &self.storage.is_some())
            .finish()
    }
}

impl Default for SettingsBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsBus {
    /// Bus without persistence.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
            storage: None,
        }
    }

    /// Bus that saves the rule set on every dispatch.
    #[must_use]
    pub fn with_storage(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            storage: Some(storage),
            ..Self::new()
        }
    }

    /// Register a callback. Keep the returned guard alive for as long as
    /// the callback should fire.
    pub fn subscribe(&mut self, callback: impl Fn(&SettingsEvent) + 'static) -> SettingsSubscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let strong: CallbackRc = Rc::new(callback);
        self.subscribers.push(Subscriber {
            id,
            callback: Rc::downgrade(&strong),
        });
        debug!(subscription = id.get(), "settings subscriber added");
        SettingsSubscription {
            id,
            _guard: strong,
        }
    }

    /// Remove a subscription now. Returns whether it was still registered.
    pub fn unsubscribe(&mut self, subscription: SettingsSubscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != subscription.id);
        let removed = self.subscribers.len() != before;
        debug!(subscription = subscription.id.get(), removed, "settings subscriber removed");
        removed
    }

    /// Number of subscriptions whose guard is still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|s| s.callback.strong_count() > 0)
            .count()
    }

    /// Persist `rules`, then notify live subscribers of `event`.
    ///
    /// Returns the save result; notification happens regardless.
    pub fn dispatch(&mut self, event: &SettingsEvent, rules: &RuleSet) -> StorageResult<()> {
        let saved = match self.storage.as_mut() {
            Some(storage) => storage.save(&rules.snapshot()),
            None => Ok(()),
        };
        if let Err(err) = &saved {
            warn!(error = %err, kind = ?event.kind, "failed to persist rule set; keeping in-memory rules");
        }

        self.subscribers.retain(|s| s.callback.strong_count() > 0);
        let callbacks: Vec<CallbackRc> = self
            .subscribers
            .iter()
            .filter_map(|s| s.callback.upgrade())
            .collect();
        debug!(
            kind = ?event.kind,
            operation = ?event.operation,
            value = %event.value,
            subscribers = callbacks.len(),
            "settings event dispatched"
        );
        for cb in &callbacks {
            cb(event);
        }
        saved
    }
}

/// RAII guard for a settings subscriber.
///
/// Dropping it makes the callback unreachable; the bus prunes the entry on
/// its next dispatch.
pub struct SettingsSubscription {
    id: SubscriptionId,
    _guard: CallbackRc,
}

impl SettingsSubscription {
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl fmt::Debug for SettingsSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsSubscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
