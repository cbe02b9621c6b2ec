//! Publication point for the active session's save bridge.
//!
//! The host looks up the bridge here instead of through process-wide state.
//! A bridge is published when its session becomes ready and withdrawn when
//! the returned [`BridgeRegistration`] is dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::save_bridge::SaveBridge;

#[derive(Default)]
struct Slot {
    generation: u64,
    bridge: Option<Arc<SaveBridge>>,
}

/// Shared registry of the active save bridge. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct BridgeRegistry {
    slot: Arc<Mutex<Slot>>,
}

impl BridgeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `bridge`, replacing any bridge published before.
    #[must_use = "dropping the registration withdraws the bridge"]
    pub fn publish(&self, bridge: Arc<SaveBridge>) -> BridgeRegistration {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.bridge = Some(bridge);
        tracing::debug!("Save bridge published (generation {})", slot.generation);
        BridgeRegistration {
            slot: Arc::clone(&self.slot),
            generation: slot.generation,
        }
    }

    /// The currently published bridge, if any.
    pub fn lookup(&self) -> Option<Arc<SaveBridge>> {
        self.lock().bridge.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        lock_slot(&self.slot)
    }
}

fn lock_slot(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|e| {
        tracing::warn!("Bridge registry mutex poisoned; continuing");
        e.into_inner()
    })
}

/// Keeps a bridge published. Dropping it withdraws the bridge unless a newer
/// one has replaced it.
pub struct BridgeRegistration {
    slot: Arc<Mutex<Slot>>,
    generation: u64,
}

impl Drop for BridgeRegistration {
    fn drop(&mut self) {
        let mut slot = lock_slot(&self.slot);
        if slot.generation == self.generation {
            slot.bridge = None;
            tracing::debug!("Save bridge withdrawn (generation {})", self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save_store::DirSaveManager;
    use romdeck_shared::{ConsoleType, ContentFingerprint};

    fn bridge(rom: &[u8]) -> Arc<SaveBridge> {
        Arc::new(SaveBridge::new(
            Arc::new(DirSaveManager::new("unused")),
            None,
            None,
            ConsoleType::Gba,
            ContentFingerprint::compute(rom),
        ))
    }

    #[test]
    fn lookup_is_empty_until_published() {
        let registry = BridgeRegistry::new();
        assert!(registry.lookup().is_none());

        let _registration = registry.publish(bridge(b"a"));
        assert!(registry.lookup().is_some());
    }

    #[test]
    fn dropping_registration_withdraws() {
        let registry = BridgeRegistry::new();
        let registration = registry.publish(bridge(b"a"));
        drop(registration);
        assert!(registry.lookup().is_none());
    }

    #[test]
    fn stale_registration_does_not_withdraw_newer_bridge() {
        let registry = BridgeRegistry::new();
        let first = registry.publish(bridge(b"first"));
        let _second = registry.publish(bridge(b"second"));
        drop(first);

        let current = registry.lookup().unwrap();
        assert_eq!(*current.fingerprint(), ContentFingerprint::compute(b"second"));
    }

    #[test]
    fn clones_share_the_slot() {
        let registry = BridgeRegistry::new();
        let host_view = registry.clone();
        let _registration = registry.publish(bridge(b"a"));
        assert!(host_view.lookup().is_some());
    }
}
