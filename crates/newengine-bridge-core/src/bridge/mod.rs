//! The lifecycle state machine.
//!
//! Surface callbacks (render thread) and lifecycle/input callbacks (UI thread) all enter through
//! one mutex, so exactly one transition is in flight and each one sees the state left by the
//! other thread. Engine calls are made while holding it, which keeps them totally ordered.
//!
//! Lifecycle signals only record what the host asked for; the bridge then moves the engine toward
//! that as far as the bound surface allows. A start or resume delivered before the surface exists
//! is held and forwarded once it does. A pause is always forwarded. Surface loss leaves the
//! start/pause/resume position alone, so a replacement surface puts the engine straight back
//! where it was.
//!
//! The device sweep is armed on the move to Resumed and disarmed only on pause and teardown. A
//! resumed engine that loses its surface keeps sweeping, since it has not been paused.

mod state;

pub use state::{Delivery, LifecycleState};

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::config::BridgeConfig;
use crate::engine::NativeEngine;
use crate::error::BridgeResult;
use crate::host_events::{Configuration, DeviceId, HostInfo, KeyEvent, Orientation, PointerEvent, SurfaceHandle};
use crate::negotiate::{self, FramebufferCandidate, SurfaceProfile};
use crate::platform::{DeviceProbe, FramebufferSource};
use crate::presence::{DeviceListener, DevicePresenceTracker, DispatchContext, ListenerId, SweepReport};

use state::ActivityPhase;

const TARGET: &str = "newengine_bridge::lifecycle";

struct BoundSurface {
    handle: SurfaceHandle,
    config: FramebufferCandidate,
    size: Option<(u32, u32)>,
}

struct BridgeInner<E: NativeEngine> {
    engine: E,
    source: Box<dyn FramebufferSource>,
    profile: SurfaceProfile,
    tracker: DevicePresenceTracker,

    surface: Option<BoundSurface>,
    had_surface: bool,

    /// Last phase the host signalled.
    requested: Option<ActivityPhase>,
    /// Last phase the engine was told about.
    engine_phase: Option<ActivityPhase>,

    orientation: Orientation,
    destroyed: bool,
}

pub struct LifecycleBridge<E: NativeEngine> {
    inner: Mutex<BridgeInner<E>>,
}

impl<E: NativeEngine> LifecycleBridge<E> {
    /// Creates the engine and takes the initial device inventory.
    pub fn new(
        mut engine: E,
        source: impl FramebufferSource + 'static,
        probe: &dyn DeviceProbe,
        host: HostInfo,
        config: &BridgeConfig,
        now: Instant,
    ) -> Self {
        engine.create(&host);
        let tracker = DevicePresenceTracker::new(config, probe, now);
        log::info!(
            target: TARGET,
            "engine created ({} input device(s) present)",
            tracker.len()
        );

        Self {
            inner: Mutex::new(BridgeInner {
                engine,
                source: Box::new(source),
                profile: config.surface,
                tracker,
                surface: None,
                had_surface: false,
                requested: None,
                engine_phase: None,
                orientation: host.orientation,
                destroyed: false,
            }),
        }
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.inner.lock().state()
    }

    #[inline]
    pub fn surface(&self) -> Option<SurfaceHandle> {
        self.inner.lock().surface.as_ref().map(|s| s.handle)
    }

    /// Configuration negotiated for the bound surface.
    #[inline]
    pub fn active_config(&self) -> Option<FramebufferCandidate> {
        self.inner.lock().surface.as_ref().map(|s| s.config)
    }

    #[inline]
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.inner.lock().surface.as_ref().and_then(|s| s.size)
    }

    // Surface provider

    /// Binds a new surface. Negotiation failure is returned and leaves the state untouched.
    pub fn on_surface_created(&self, handle: SurfaceHandle) -> BridgeResult<()> {
        let mut g = self.inner.lock();
        let inner = &mut *g;

        if inner.destroyed {
            log::debug!(target: TARGET, "surface_created after teardown ignored");
            return Ok(());
        }
        if inner.surface.as_ref().is_some_and(|s| s.handle == handle) {
            log::debug!(target: TARGET, "duplicate surface_created for {handle:?}");
            return Ok(());
        }

        let config = match negotiate::negotiate(inner.source.as_ref(), &inner.profile) {
            Ok(c) => c,
            Err(e) => {
                log::error!(target: TARGET, "surface {handle:?} rejected: {e}");
                return Err(e.into());
            }
        };

        if let Some(old) = inner.surface.take() {
            log::warn!(
                target: TARGET,
                "surface_created for {handle:?} while {:?} is bound; releasing the old surface",
                old.handle
            );
            inner.had_surface = true;
            inner.engine.surface_destroyed();
        }

        let from = inner.state();
        inner.surface = Some(BoundSurface {
            handle,
            config,
            size: None,
        });
        inner.engine.surface_created(handle, &config);
        log::info!(target: TARGET, "{from:?} -> SurfaceReady ({handle:?})");

        inner.reconcile();
        Ok(())
    }

    /// Forwards a size change unless the engine already has this exact (surface, size).
    pub fn on_surface_changed(&self, handle: SurfaceHandle, width: u32, height: u32) -> Delivery {
        self.inner.lock().apply_size(handle, width, height)
    }

    pub fn on_surface_destroyed(&self) -> Delivery {
        let mut g = self.inner.lock();
        let inner = &mut *g;

        if inner.destroyed {
            log::debug!(target: TARGET, "surface_destroyed after teardown ignored");
            return Delivery::Dropped;
        }
        let Some(surface) = inner.surface.take() else {
            log::debug!(target: TARGET, "surface_destroyed with no surface bound");
            return Delivery::Suppressed;
        };

        inner.had_surface = true;
        inner.engine.surface_destroyed();
        log::info!(target: TARGET, "surface {:?} lost", surface.handle);
        Delivery::Forwarded
    }

    // Lifecycle provider

    pub fn on_start(&self) {
        let mut g = self.inner.lock();
        if g.destroyed {
            return;
        }
        if g.requested.is_some() {
            log::debug!(target: TARGET, "start while already {:?}", g.requested);
            return;
        }
        g.requested = Some(ActivityPhase::Started);
        g.reconcile();
    }

    pub fn on_resume(&self) {
        self.request(ActivityPhase::Resumed);
    }

    pub fn on_pause(&self) {
        self.request(ActivityPhase::Paused);
    }

    fn request(&self, phase: ActivityPhase) {
        let mut g = self.inner.lock();
        if g.destroyed {
            return;
        }
        if g.requested == Some(phase) {
            log::debug!(target: TARGET, "duplicate {phase:?} signal");
            return;
        }
        if phase == ActivityPhase::Paused && g.requested.is_none() {
            log::debug!(target: TARGET, "pause before start ignored");
            return;
        }
        g.requested = Some(phase);
        g.reconcile();
    }

    /// Final teardown. Every later callback is ignored.
    pub fn on_destroy(&self) {
        let mut g = self.inner.lock();
        let inner = &mut *g;
        if inner.destroyed {
            log::debug!(target: TARGET, "duplicate destroy");
            return;
        }

        let from = inner.state();
        inner.tracker.disarm();
        inner.destroyed = true;
        inner.surface = None;
        inner.requested = None;
        inner.engine_phase = None;
        inner.engine.teardown();
        log::info!(target: TARGET, "{from:?} -> Destroyed");
    }

    pub fn on_low_memory(&self) {
        let mut g = self.inner.lock();
        if g.destroyed {
            return;
        }
        log::warn!(target: TARGET, "low memory");
        g.engine.low_memory();
    }

    /// Forwards an orientation change once, and routes the new size through the same
    /// suppression as `on_surface_changed`.
    pub fn on_configuration_changed(&self, config: Configuration) -> Delivery {
        let mut g = self.inner.lock();
        let inner = &mut *g;
        if inner.destroyed {
            return Delivery::Dropped;
        }

        if config.orientation != inner.orientation {
            inner.orientation = config.orientation;
            inner.engine.orientation_changed(config.orientation);
            log::info!(target: TARGET, "orientation -> {:?}", config.orientation);
        }

        let Some(handle) = inner.surface.as_ref().map(|s| s.handle) else {
            return Delivery::Dropped;
        };
        inner.apply_size(handle, config.width, config.height)
    }

    /// One frame. Only a resumed engine renders.
    pub fn on_frame(&self) -> Delivery {
        let mut g = self.inner.lock();
        if g.state() != LifecycleState::Resumed {
            return g.drop_call("render_frame");
        }
        g.engine.render_frame();
        Delivery::Forwarded
    }

    // Input provider

    pub fn on_pointer(&self, event: PointerEvent, now: Instant) -> Delivery {
        let mut g = self.inner.lock();
        let inner = &mut *g;
        if inner.destroyed {
            return Delivery::Dropped;
        }

        inner.tracker.observe(event.device_id, now);
        if !inner.state().accepts_input() {
            return inner.drop_call("handle_pointer");
        }
        inner
            .engine
            .handle_pointer(event.device_id, event.x, event.y, event.phase);
        Delivery::Forwarded
    }

    pub fn on_key(&self, event: KeyEvent, now: Instant) -> Delivery {
        let mut g = self.inner.lock();
        let inner = &mut *g;
        if inner.destroyed {
            return Delivery::Dropped;
        }

        inner.tracker.observe(event.device_id, now);
        if !inner.state().accepts_input() {
            return inner.drop_call("handle_key");
        }
        inner.engine.handle_key(event.key_code, event.phase);
        Delivery::Forwarded
    }

    /// Input from a device the engine does not consume directly (gamepads, sensors).
    /// Only refreshes presence; returns true for a newly seen device.
    pub fn on_device_activity(&self, id: DeviceId, now: Instant) -> bool {
        let mut g = self.inner.lock();
        if g.destroyed {
            return false;
        }
        g.tracker.observe(id, now)
    }

    pub fn on_device_changed(&self, id: DeviceId) -> bool {
        let mut g = self.inner.lock();
        if g.destroyed {
            return false;
        }
        g.tracker.report_changed(id)
    }

    // Device presence

    /// Periodic tick: sweeps when due, then delivers default-context notifications with the
    /// bridge unlocked, so listeners may call back in.
    pub fn tick(&self, now: Instant, probe: &dyn DeviceProbe) -> Option<SweepReport> {
        let (report, context) = {
            let mut g = self.inner.lock();
            if g.destroyed {
                return None;
            }
            let report = g.tracker.tick(now, probe);
            (report, g.tracker.default_context().clone())
        };

        if let Some(r) = report {
            if r.removed > 0 || r.refreshed > 0 {
                log::debug!(
                    target: "newengine_bridge::presence",
                    "sweep: removed={} refreshed={}",
                    r.removed,
                    r.refreshed
                );
            }
        }
        context.deliver();
        report
    }

    /// Delivers the default dispatch context outside the bridge lock.
    pub fn deliver_device_events(&self) -> usize {
        let context = self.inner.lock().tracker.default_context().clone();
        context.deliver()
    }

    pub fn enumerate_devices(&self, probe: &dyn DeviceProbe, now: Instant) -> Vec<DeviceId> {
        self.inner.lock().tracker.enumerate(probe, now)
    }

    pub fn register_device_listener(
        &self,
        listener: Arc<dyn DeviceListener>,
        context: Option<&DispatchContext>,
    ) -> ListenerId {
        self.inner.lock().tracker.register_listener(listener, context)
    }

    pub fn unregister_device_listener(&self, id: ListenerId) -> bool {
        self.inner.lock().tracker.unregister_listener(id)
    }

    pub fn new_dispatch_context(&self) -> DispatchContext {
        self.inner.lock().tracker.new_dispatch_context()
    }

    #[inline]
    pub fn is_sweep_armed(&self) -> bool {
        self.inner.lock().tracker.is_armed()
    }

    /// When the host should tick next, if the sweep is armed.
    #[inline]
    pub fn next_sweep_deadline(&self, now: Instant) -> Option<Instant> {
        self.inner.lock().tracker.next_deadline(now)
    }

    #[inline]
    pub fn is_device_tracked(&self, id: DeviceId) -> bool {
        self.inner.lock().tracker.contains(id)
    }

    #[inline]
    pub fn tracked_devices(&self) -> usize {
        self.inner.lock().tracker.len()
    }

    /// Read access to the engine, serialized with every other call.
    pub fn with_engine<R>(&self, f: impl FnOnce(&E) -> R) -> R {
        f(&self.inner.lock().engine)
    }

    pub fn into_engine(self) -> E {
        self.inner.into_inner().engine
    }
}

impl<E: NativeEngine> BridgeInner<E> {
    fn state(&self) -> LifecycleState {
        if self.destroyed {
            return LifecycleState::Destroyed;
        }
        match (&self.surface, self.engine_phase) {
            (None, _) if self.had_surface => LifecycleState::SurfaceLost,
            (None, _) => LifecycleState::Created,
            (Some(_), None) => LifecycleState::SurfaceReady,
            (Some(_), Some(phase)) => phase.as_state(),
        }
    }

    /// Moves the engine toward the requested phase as far as the surface allows.
    fn reconcile(&mut self) {
        if self.destroyed {
            return;
        }
        let Some(target) = self.requested else {
            return;
        };

        if self.engine_phase.is_none() {
            if self.surface.is_none() {
                log::debug!(target: TARGET, "start held until a surface is bound");
                return;
            }
            self.engine.start();
            self.engine_phase = Some(ActivityPhase::Started);
            log::info!(target: TARGET, "SurfaceReady -> Started");
        }

        match (self.engine_phase, target) {
            (Some(from @ (ActivityPhase::Started | ActivityPhase::Paused)), ActivityPhase::Resumed) => {
                if self.surface.is_none() {
                    log::debug!(target: TARGET, "resume held until a surface is bound");
                    return;
                }
                self.engine.resume();
                self.engine_phase = Some(ActivityPhase::Resumed);
                self.tracker.arm();
                log::info!(target: TARGET, "{from:?} -> Resumed");
            }
            (Some(ActivityPhase::Resumed), ActivityPhase::Paused) => {
                self.tracker.disarm();
                self.engine.pause();
                self.engine_phase = Some(ActivityPhase::Paused);
                log::info!(target: TARGET, "Resumed -> Paused");
            }
            _ => {}
        }
    }

    fn apply_size(&mut self, handle: SurfaceHandle, width: u32, height: u32) -> Delivery {
        if self.destroyed {
            return Delivery::Dropped;
        }
        let Some(surface) = self.surface.as_mut() else {
            return self.drop_call("surface_changed");
        };
        if surface.handle != handle {
            log::warn!(
                target: TARGET,
                "surface_changed for {handle:?} but {:?} is bound, dropped",
                surface.handle
            );
            return Delivery::Dropped;
        }
        if surface.size == Some((width, height)) {
            return Delivery::Suppressed;
        }

        surface.size = Some((width, height));
        self.engine.surface_changed(handle, width, height);
        log::debug!(target: TARGET, "surface {handle:?} -> {width}x{height}");
        Delivery::Forwarded
    }

    fn drop_call(&self, call: &'static str) -> Delivery {
        match self.state() {
            state @ (LifecycleState::Created | LifecycleState::SurfaceLost) => {
                log::warn!(target: TARGET, "{call} with no surface bound ({state:?}), dropped");
            }
            state => log::trace!(target: TARGET, "{call} dropped in {state:?}"),
        }
        Delivery::Dropped
    }
}
