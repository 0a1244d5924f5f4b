//! Input-device hot-plug detection.
//!
//! The host input API reports a device id with every event and can enumerate current devices,
//! but has no reliable disconnect callback. Presence is therefore tracked by last contact time:
//! a periodic sweep re-checks devices that have been idle past the staleness threshold and only
//! reports a removal once the platform confirms the device is gone. An idle but present device
//! is never reported as removed.

mod pool;
mod timer;

pub use pool::{DeviceListener, DispatchContext, NotificationKind};
pub use timer::SweepTimer;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::BridgeConfig;
use crate::host_events::DeviceId;
use crate::platform::DeviceProbe;

use pool::NotificationPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Stale devices the platform no longer enumerates.
    pub removed: usize,
    /// Stale devices that are still present; their contact time was reset.
    pub refreshed: usize,
}

struct Registration {
    id: ListenerId,
    listener: Arc<dyn DeviceListener>,
    context: DispatchContext,
}

pub struct DevicePresenceTracker {
    devices: HashMap<DeviceId, Instant>,
    staleness: Duration,
    timer: SweepTimer,

    pool: Arc<NotificationPool>,
    default_context: DispatchContext,
    listeners: Vec<Registration>,
    next_listener: u64,
}

impl DevicePresenceTracker {
    /// Creates the tracker and records every device the platform already knows about.
    pub fn new(config: &BridgeConfig, probe: &dyn DeviceProbe, now: Instant) -> Self {
        let pool = NotificationPool::with_capacity(config.notification_pool_capacity);
        let default_context = DispatchContext::new(&pool);

        let mut tracker = Self {
            devices: HashMap::with_capacity(16),
            staleness: config.staleness_threshold(),
            timer: SweepTimer::new(config.sweep_period()),
            pool,
            default_context,
            listeners: Vec::new(),
            next_listener: 1,
        };
        tracker.enumerate(probe, now);
        tracker
    }

    /// Records every enumerable device not yet known.
    ///
    /// Devices found here were present before anyone asked, so no `Added` is emitted for them.
    pub fn enumerate(&mut self, probe: &dyn DeviceProbe, now: Instant) -> Vec<DeviceId> {
        let ids = probe.device_ids();
        for id in &ids {
            self.devices.entry(*id).or_insert(now);
        }
        log::debug!(
            target: "newengine_bridge::presence",
            "enumerated {} device(s), tracking {}",
            ids.len(),
            self.devices.len()
        );
        ids
    }

    /// Input-event path: refreshes contact time, notifies `Added` only for a new device.
    ///
    /// Returns true when the device was not known before.
    pub fn observe(&mut self, id: DeviceId, now: Instant) -> bool {
        if let Some(last) = self.devices.get_mut(&id) {
            *last = now;
            return false;
        }

        self.devices.insert(id, now);
        log::info!(target: "newengine_bridge::presence", "device {} added", id.0);
        self.notify(NotificationKind::Added, id);
        true
    }

    /// Re-checks every device idle for longer than the staleness threshold.
    pub fn sweep(&mut self, now: Instant, probe: &dyn DeviceProbe) -> SweepReport {
        let staleness = self.staleness;
        let listeners = &self.listeners;
        let mut report = SweepReport::default();

        self.devices.retain(|&id, last| {
            if now.saturating_duration_since(*last) <= staleness {
                return true;
            }
            if probe.device_exists(id) {
                *last = now;
                report.refreshed += 1;
                return true;
            }

            log::info!(target: "newengine_bridge::presence", "device {} removed", id.0);
            for r in listeners {
                r.context.post(NotificationKind::Removed, id, &r.listener);
            }
            report.removed += 1;
            false
        });

        report
    }

    /// Runs a sweep if the timer is armed and due.
    pub fn tick(&mut self, now: Instant, probe: &dyn DeviceProbe) -> Option<SweepReport> {
        if !self.timer.poll(now) {
            return None;
        }
        Some(self.sweep(now, probe))
    }

    /// Platform reported a reconfiguration of a known device.
    pub fn report_changed(&mut self, id: DeviceId) -> bool {
        if !self.devices.contains_key(&id) {
            return false;
        }
        self.notify(NotificationKind::Changed, id);
        true
    }

    fn notify(&self, kind: NotificationKind, id: DeviceId) {
        for r in &self.listeners {
            r.context.post(kind, id, &r.listener);
        }
    }

    /// Registers `listener` on `context`, or on the tracker's default context.
    ///
    /// Registering the same listener again moves it to the new context.
    pub fn register_listener(
        &mut self,
        listener: Arc<dyn DeviceListener>,
        context: Option<&DispatchContext>,
    ) -> ListenerId {
        let key = Arc::as_ptr(&listener) as *const ();
        self.listeners
            .retain(|r| Arc::as_ptr(&r.listener) as *const () != key);

        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(Registration {
            id,
            listener,
            context: context.cloned().unwrap_or_else(|| self.default_context.clone()),
        });
        id
    }

    pub fn unregister_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|r| r.id != id);
        self.listeners.len() != before
    }

    /// A new queue backed by this tracker's notification pool.
    #[inline]
    pub fn new_dispatch_context(&self) -> DispatchContext {
        DispatchContext::new(&self.pool)
    }

    #[inline]
    pub fn default_context(&self) -> &DispatchContext {
        &self.default_context
    }

    #[inline]
    pub fn arm(&mut self) {
        self.timer.arm();
    }

    #[inline]
    pub fn disarm(&mut self) {
        self.timer.disarm();
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }

    #[inline]
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        self.timer.next_deadline(now)
    }

    #[inline]
    pub fn contains(&self, id: DeviceId) -> bool {
        self.devices.contains_key(&id)
    }

    #[inline]
    pub fn last_contact(&self, id: DeviceId) -> Option<Instant> {
        self.devices.get(&id).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    #[inline]
    pub fn pool_available(&self) -> usize {
        self.pool.available()
    }
}
