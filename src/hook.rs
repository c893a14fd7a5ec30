//! UI lifecycle binding for `Expo.useUpdatesEvent`.
//!
//! A component renders many times but subscribes once. Each render swaps the
//! latest callback into a shared slot; the single subscription made at mount
//! calls through that slot, so a fresh callback per render never touches the
//! underlying channel.

use crate::bus::{Listener, Subscription};
use crate::emitter::{global, UpdatesEmitter};
use crate::events::UseUpdatesEvent;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Mount and render a hook with `listener` on the process-wide emitter.
pub fn use_update_events<F>(listener: F) -> UpdateEventsHook<'static>
where
    F: Fn(&UseUpdatesEvent) + Send + Sync + 'static,
{
    let mut hook = UpdateEventsHook::new(global());
    hook.render(listener);
    hook.mount();
    hook
}

/// Subscription lifecycle for one mounted component.
///
/// Dropping the hook unmounts it.
pub struct UpdateEventsHook<'e> {
    emitter: &'e UpdatesEmitter,
    latest: Arc<RwLock<Option<Listener>>>,
    subscription: Option<Subscription>,
    mounted: bool,
}

impl fmt::Debug for UpdateEventsHook<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateEventsHook")
            .field("mounted", &self.mounted)
            .field("has_listener", &self.latest.read().is_some())
            .field("subscription", &self.subscription)
            .finish()
    }
}

impl<'e> UpdateEventsHook<'e> {
    pub fn new(emitter: &'e UpdatesEmitter) -> Self {
        Self {
            emitter,
            latest: Arc::new(RwLock::new(None)),
            subscription: None,
            mounted: false,
        }
    }

    /// Record the callback supplied by the current render.
    pub fn render<F>(&mut self, listener: F)
    where
        F: Fn(&UseUpdatesEvent) + Send + Sync + 'static,
    {
        *self.latest.write() = Some(Arc::new(listener));
    }

    /// Render without a callback.
    pub fn render_empty(&mut self) {
        *self.latest.write() = None;
    }

    /// Subscribe if a callback is set. Only the first mount has any effect
    /// until the hook is unmounted.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        if self.latest.read().is_none() {
            return;
        }

        let latest = Arc::clone(&self.latest);
        self.subscription = Some(self.emitter.subscribe_to_use_updates_event(move |event| {
            let current = latest.read().clone();
            if let Some(listener) = current {
                listener(event);
            }
        }));
    }

    /// Release the subscription made at mount, if any.
    pub fn unmount(&mut self) {
        self.mounted = false;
        if let Some(subscription) = self.subscription.take() {
            subscription.remove();
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }
}

impl Drop for UpdateEventsHook<'_> {
    fn drop(&mut self) {
        self.unmount();
    }
}
