use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::host_events::DeviceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Added,
    Changed,
    Removed,
}

/// Receives device presence notifications on its dispatch context.
///
/// Every method is a no-op by default; implement only what you react to.
pub trait DeviceListener: Send + Sync {
    fn on_device_added(&self, _id: DeviceId) {}
    fn on_device_changed(&self, _id: DeviceId) {}
    fn on_device_removed(&self, _id: DeviceId) {}
}

struct Slot {
    kind: NotificationKind,
    device_id: DeviceId,
    listener: Option<Arc<dyn DeviceListener>>,
}

struct PoolState {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

/// Fixed-capacity pool of pending notifications.
///
/// All slots are allocated up front. A slot is drawn on post, travels through a
/// [`DispatchContext`] as an index and goes back on the free list after delivery.
pub(crate) struct NotificationPool {
    state: Mutex<PoolState>,
    capacity: usize,
    dropped: AtomicU64,
}

impl NotificationPool {
    pub(crate) fn with_capacity(capacity: usize) -> Arc<Self> {
        let capacity = capacity.max(1);
        let slots = (0..capacity)
            .map(|_| Slot {
                kind: NotificationKind::Added,
                device_id: DeviceId(0),
                listener: None,
            })
            .collect();
        // Reverse so slot 0 is handed out first.
        let free = (0..capacity).rev().collect();

        Arc::new(Self {
            state: Mutex::new(PoolState { slots, free }),
            capacity,
            dropped: AtomicU64::new(0),
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn available(&self) -> usize {
        self.state.lock().free.len()
    }

    #[inline]
    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn acquire(
        &self,
        kind: NotificationKind,
        device_id: DeviceId,
        listener: &Arc<dyn DeviceListener>,
    ) -> Option<usize> {
        let mut st = self.state.lock();
        let Some(index) = st.free.pop() else {
            drop(st);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return None;
        };
        let slot = &mut st.slots[index];
        slot.kind = kind;
        slot.device_id = device_id;
        slot.listener = Some(Arc::clone(listener));
        Some(index)
    }

    fn read(&self, index: usize) -> Option<(NotificationKind, DeviceId, Arc<dyn DeviceListener>)> {
        let st = self.state.lock();
        let slot = st.slots.get(index)?;
        let listener = slot.listener.clone()?;
        Some((slot.kind, slot.device_id, listener))
    }

    fn release(&self, index: usize) {
        let mut st = self.state.lock();
        if let Some(slot) = st.slots.get_mut(index) {
            slot.listener = None;
            st.free.push(index);
        }
    }
}

/// Where pooled notifications wait until their owner delivers them.
///
/// Cloning yields another handle to the same queue. The queue is bounded by the pool capacity,
/// so a post that got a slot always fits.
#[derive(Clone)]
pub struct DispatchContext {
    pool: Arc<NotificationPool>,
    tx: Sender<usize>,
    rx: Receiver<usize>,
}

impl DispatchContext {
    pub(crate) fn new(pool: &Arc<NotificationPool>) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(pool.capacity());
        Self {
            pool: Arc::clone(pool),
            tx,
            rx,
        }
    }

    /// Returns false when the notification had to be dropped.
    pub(crate) fn post(
        &self,
        kind: NotificationKind,
        device_id: DeviceId,
        listener: &Arc<dyn DeviceListener>,
    ) -> bool {
        let Some(index) = self.pool.acquire(kind, device_id, listener) else {
            log::warn!(
                target: "newengine_bridge::presence",
                "notification pool exhausted, dropping {kind:?} for device {}",
                device_id.0
            );
            return false;
        };

        if self.tx.try_send(index).is_err() {
            self.pool.release(index);
            log::warn!(
                target: "newengine_bridge::presence",
                "dispatch queue full, dropping {kind:?} for device {}",
                device_id.0
            );
            return false;
        }
        true
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Runs every queued notification on the calling thread and returns the slots to the pool.
    pub fn deliver(&self) -> usize {
        let mut n = 0usize;
        while let Ok(index) = self.rx.try_recv() {
            if let Some((kind, id, listener)) = self.pool.read(index) {
                match kind {
                    NotificationKind::Added => listener.on_device_added(id),
                    NotificationKind::Changed => listener.on_device_changed(id),
                    NotificationKind::Removed => listener.on_device_removed(id),
                }
            }
            self.pool.release(index);
            n += 1;
        }
        n
    }

    /// Notifications lost to pool exhaustion since creation.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.pool.dropped()
    }
}

impl std::fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchContext")
            .field("pending", &self.pending())
            .field("capacity", &self.pool.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Mutex<Vec<(NotificationKind, DeviceId)>>);

    impl DeviceListener for Log {
        fn on_device_added(&self, id: DeviceId) {
            self.0.lock().push((NotificationKind::Added, id));
        }
        fn on_device_changed(&self, id: DeviceId) {
            self.0.lock().push((NotificationKind::Changed, id));
        }
        fn on_device_removed(&self, id: DeviceId) {
            self.0.lock().push((NotificationKind::Removed, id));
        }
    }

    #[test]
    fn delivery_returns_slots_in_order() {
        let pool = NotificationPool::with_capacity(4);
        let ctx = DispatchContext::new(&pool);
        let log = Arc::new(Log::default());
        let listener: Arc<dyn DeviceListener> = log.clone();

        assert!(ctx.post(NotificationKind::Added, DeviceId(1), &listener));
        assert!(ctx.post(NotificationKind::Removed, DeviceId(2), &listener));
        assert_eq!(pool.available(), 2);
        assert_eq!(ctx.pending(), 2);

        assert_eq!(ctx.deliver(), 2);
        assert_eq!(pool.available(), 4);
        assert_eq!(
            *log.0.lock(),
            vec![
                (NotificationKind::Added, DeviceId(1)),
                (NotificationKind::Removed, DeviceId(2)),
            ]
        );
    }

    #[test]
    fn exhausted_pool_drops_instead_of_growing() {
        let pool = NotificationPool::with_capacity(2);
        let ctx = DispatchContext::new(&pool);
        let listener: Arc<dyn DeviceListener> = Arc::new(Log::default());

        assert!(ctx.post(NotificationKind::Added, DeviceId(1), &listener));
        assert!(ctx.post(NotificationKind::Added, DeviceId(2), &listener));
        assert!(!ctx.post(NotificationKind::Added, DeviceId(3), &listener));
        assert_eq!(ctx.dropped(), 1);
        assert_eq!(pool.capacity(), 2);

        ctx.deliver();
        assert!(ctx.post(NotificationKind::Changed, DeviceId(3), &listener));
    }

    #[test]
    fn released_slot_drops_listener_reference() {
        let pool = NotificationPool::with_capacity(1);
        let ctx = DispatchContext::new(&pool);
        let listener: Arc<dyn DeviceListener> = Arc::new(Log::default());

        ctx.post(NotificationKind::Added, DeviceId(5), &listener);
        assert_eq!(Arc::strong_count(&listener), 2);
        ctx.deliver();
        assert_eq!(Arc::strong_count(&listener), 1);
    }
}
