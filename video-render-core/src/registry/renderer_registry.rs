use std::collections::HashMap;

use crate::models::slot::{SlotKey, StreamType};
use crate::models::surface::Surface;
use crate::registry::handle::RendererHandle;

/// Renderer handles of one channel, keyed by slot, in registration order.
pub type SlotMap = HashMap<SlotKey, Vec<RendererHandle>>;

/// Two-level renderer lookup: channel → slot → handles.
///
/// Invariants kept by every mutating method:
/// - no slot maps to an empty list
/// - no channel maps to an empty `SlotMap`
///
/// The registry never calls `bind`/`unbind`; removed handles are returned to
/// the caller, who owns their teardown.
#[derive(Debug, Default)]
pub struct RendererRegistry {
    channels: HashMap<String, SlotMap>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot that frames of `stream_type` from `uid` are delivered to.
    ///
    /// `stream_type` is the raw value stamped by the native engine; unknown
    /// values and device-test frames resolve to nothing.
    pub fn resolve_slot_key(stream_type: u8, uid: u32) -> Option<SlotKey> {
        StreamType::from_raw(stream_type).and_then(|t| SlotKey::resolve(t, uid))
    }

    /// Returns the channel's slot map, creating an empty one on first access.
    ///
    /// Callers must leave at least one slot in a map they create.
    pub(crate) fn get_or_create_channel(&mut self, channel_id: &str) -> &mut SlotMap {
        self.channels.entry(channel_id.to_string()).or_default()
    }

    pub fn lookup(&self, channel_id: &str, slot: SlotKey) -> Option<&[RendererHandle]> {
        self.channels
            .get(channel_id)
            .and_then(|slots| slots.get(&slot))
            .map(Vec::as_slice)
    }

    pub fn lookup_mut(&mut self, channel_id: &str, slot: SlotKey) -> Option<&mut [RendererHandle]> {
        self.channels
            .get_mut(channel_id)
            .and_then(|slots| slots.get_mut(&slot))
            .map(Vec::as_mut_slice)
    }

    /// Whether a handle in the slot is already bound to `surface`.
    pub fn contains_surface(&self, channel_id: &str, slot: SlotKey, surface: &Surface) -> bool {
        self.lookup(channel_id, slot)
            .is_some_and(|handles| handles.iter().any(|h| h.equals_surface(surface)))
    }

    /// Installs `handle` as the slot's only handle.
    ///
    /// Returns the handles it displaced; the caller must unbind them.
    pub fn replace(
        &mut self,
        channel_id: &str,
        slot: SlotKey,
        handle: RendererHandle,
    ) -> Vec<RendererHandle> {
        self.get_or_create_channel(channel_id)
            .insert(slot, vec![handle])
            .unwrap_or_default()
    }

    /// Appends `handle` to the slot, keeping registration order.
    ///
    /// If a handle in the slot is already bound to the same surface, nothing
    /// changes and `handle` is handed back in `Err` for the caller to unbind.
    pub fn append(
        &mut self,
        channel_id: &str,
        slot: SlotKey,
        handle: RendererHandle,
    ) -> Result<(), RendererHandle> {
        if self.contains_surface(channel_id, slot, handle.surface()) {
            log::info!(
                "Renderer for {} already attached to slot {} in channel {:?}",
                handle.surface().id,
                slot,
                channel_id
            );
            return Err(handle);
        }

        self.get_or_create_channel(channel_id)
            .entry(slot)
            .or_default()
            .push(handle);
        Ok(())
    }

    /// Removes every handle of the slot, pruning the channel if it empties.
    pub fn remove_all(&mut self, channel_id: &str, slot: SlotKey) -> Vec<RendererHandle> {
        let Some(slots) = self.channels.get_mut(channel_id) else {
            return Vec::new();
        };
        let removed = slots.remove(&slot).unwrap_or_default();
        self.prune_channel(channel_id);
        removed
    }

    /// Removes only the handle bound to `surface`, pruning slot and channel if
    /// they empty.
    pub fn remove_matching(
        &mut self,
        channel_id: &str,
        slot: SlotKey,
        surface: &Surface,
    ) -> Option<RendererHandle> {
        let slots = self.channels.get_mut(channel_id)?;
        let handles = slots.get_mut(&slot)?;
        let index = handles.iter().position(|h| h.equals_surface(surface))?;
        let removed = handles.remove(index);

        if handles.is_empty() {
            slots.remove(&slot);
        }
        self.prune_channel(channel_id);
        Some(removed)
    }

    /// Removes every handle of every channel.
    pub fn drain(&mut self) -> Vec<(String, SlotKey, RendererHandle)> {
        let mut drained = Vec::new();
        for (channel_id, slots) in self.channels.drain() {
            for (slot, handles) in slots {
                drained.extend(handles.into_iter().map(|h| (channel_id.clone(), slot, h)));
            }
        }
        drained
    }

    pub fn has_channel(&self, channel_id: &str) -> bool {
        self.channels.contains_key(channel_id)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn slot_count(&self, channel_id: &str) -> usize {
        self.channels.get(channel_id).map_or(0, HashMap::len)
    }

    pub fn handle_count(&self) -> usize {
        self.channels
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    fn prune_channel(&mut self, channel_id: &str) {
        if self.channels.get(channel_id).is_some_and(HashMap::is_empty) {
            self.channels.remove(channel_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::render_mode::RenderMode;
    use crate::testing::Recorder;

    fn handle(recorder: &Recorder, surface_id: u64) -> RendererHandle {
        RendererHandle::bind(
            RenderMode::Software,
            recorder.renderer(),
            Surface::new(surface_id, 320, 240),
        )
        .unwrap()
    }

    fn surface_ids(handles: &[RendererHandle]) -> Vec<u64> {
        handles.iter().map(|h| h.surface().id.0).collect()
    }

    #[test]
    fn resolve_slot_key_from_raw() {
        assert_eq!(RendererRegistry::resolve_slot_key(0, 0), Some(SlotKey::Local));
        assert_eq!(RendererRegistry::resolve_slot_key(1, 0), Some(SlotKey::Local));
        assert_eq!(
            RendererRegistry::resolve_slot_key(1, 77),
            Some(SlotKey::Remote(77))
        );
        assert_eq!(
            RendererRegistry::resolve_slot_key(3, 77),
            Some(SlotKey::VideoSource)
        );
        assert_eq!(RendererRegistry::resolve_slot_key(2, 0), None);
        assert_eq!(RendererRegistry::resolve_slot_key(9, 1), None);
    }

    #[test]
    fn lookup_on_empty_registry_creates_nothing() {
        let registry = RendererRegistry::new();
        assert!(registry.lookup("room", SlotKey::Local).is_none());
        assert!(!registry.has_channel("room"));
        assert!(registry.is_empty());
    }

    #[test]
    fn replace_returns_displaced_handles() {
        let recorder = Recorder::new();
        let mut registry = RendererRegistry::new();

        assert!(registry.replace("", SlotKey::Local, handle(&recorder, 1)).is_empty());
        let displaced = registry.replace("", SlotKey::Local, handle(&recorder, 2));

        assert_eq!(surface_ids(&displaced), vec![1]);
        assert_eq!(surface_ids(registry.lookup("", SlotKey::Local).unwrap()), vec![2]);
    }

    #[test]
    fn append_keeps_order_and_rejects_duplicate_surface() {
        let recorder = Recorder::new();
        let mut registry = RendererRegistry::new();
        let slot = SlotKey::Remote(5);

        registry.append("room", slot, handle(&recorder, 1)).unwrap();
        registry.append("room", slot, handle(&recorder, 2)).unwrap();
        let rejected = registry.append("room", slot, handle(&recorder, 1)).unwrap_err();

        assert_eq!(rejected.surface().id.0, 1);
        assert_eq!(surface_ids(registry.lookup("room", slot).unwrap()), vec![1, 2]);
    }

    #[test]
    fn remove_all_prunes_empty_channel() {
        let recorder = Recorder::new();
        let mut registry = RendererRegistry::new();
        registry.replace("room", SlotKey::Remote(1), handle(&recorder, 1));

        let removed = registry.remove_all("room", SlotKey::Remote(1));

        assert_eq!(removed.len(), 1);
        assert!(!registry.has_channel("room"));
    }

    #[test]
    fn remove_all_keeps_channel_with_other_slots() {
        let recorder = Recorder::new();
        let mut registry = RendererRegistry::new();
        registry.replace("room", SlotKey::Remote(1), handle(&recorder, 1));
        registry.replace("room", SlotKey::Remote(2), handle(&recorder, 2));

        registry.remove_all("room", SlotKey::Remote(1));

        assert!(registry.has_channel("room"));
        assert_eq!(registry.slot_count("room"), 1);
        assert!(registry.lookup("room", SlotKey::Remote(1)).is_none());
    }

    #[test]
    fn remove_all_on_unknown_slot_is_empty() {
        let mut registry = RendererRegistry::new();
        assert!(registry.remove_all("nowhere", SlotKey::Local).is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_matching_leaves_siblings() {
        let recorder = Recorder::new();
        let mut registry = RendererRegistry::new();
        let slot = SlotKey::Remote(9);
        for id in 1..=3 {
            registry.append("room", slot, handle(&recorder, id)).unwrap();
        }

        let removed = registry
            .remove_matching("room", slot, &Surface::new(2, 0, 0))
            .unwrap();

        assert_eq!(removed.surface().id.0, 2);
        assert_eq!(surface_ids(registry.lookup("room", slot).unwrap()), vec![1, 3]);
    }

    #[test]
    fn remove_matching_last_handle_prunes_slot_and_channel() {
        let recorder = Recorder::new();
        let mut registry = RendererRegistry::new();
        let slot = SlotKey::Remote(9);
        registry.append("room", slot, handle(&recorder, 1)).unwrap();

        assert!(registry
            .remove_matching("room", slot, &Surface::new(1, 0, 0))
            .is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_matching_unknown_surface_is_none() {
        let recorder = Recorder::new();
        let mut registry = RendererRegistry::new();
        registry.replace("room", SlotKey::Local, handle(&recorder, 1));

        assert!(registry
            .remove_matching("room", SlotKey::Local, &Surface::new(42, 0, 0))
            .is_none());
        assert_eq!(registry.handle_count(), 1);
    }

    #[test]
    fn drain_empties_everything() {
        let recorder = Recorder::new();
        let mut registry = RendererRegistry::new();
        registry.replace("a", SlotKey::Local, handle(&recorder, 1));
        registry.append("b", SlotKey::Remote(3), handle(&recorder, 2)).unwrap();
        registry.append("b", SlotKey::Remote(3), handle(&recorder, 3)).unwrap();

        let drained = registry.drain();

        assert_eq!(drained.len(), 3);
        assert!(registry.is_empty());
        assert_eq!(registry.handle_count(), 0);
    }
}
