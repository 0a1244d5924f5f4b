#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use newengine_bridge::{
    BridgeConfig, ConfigHandle, DeviceId, DeviceProbe, FixedConfigs, FramebufferCandidate,
    HostInfo, KeyCode, KeyPhase, LifecycleBridge, NativeEngine, Orientation, PointerPhase,
    SurfaceHandle,
};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create,
    Start,
    Pause,
    Resume,
    SurfaceCreated(u64),
    SurfaceChanged(u64, u32, u32),
    SurfaceDestroyed,
    Teardown,
    LowMemory,
    Pointer(i32, PointerPhase),
    Key(i32, KeyPhase),
    Frame,
    Orientation(Orientation),
}

/// Records every engine call and flags any call the engine should never have seen.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub calls: Vec<Call>,
    pub violations: Vec<String>,
    surface: Option<u64>,
    started: bool,
    resumed: bool,
    torn_down: bool,
    /// Set by the driver once the host has sent start or resume. Unwatched engines skip the check.
    visible: Option<Arc<AtomicBool>>,
}

impl RecordingEngine {
    /// Flags a `start` that arrives before the host signalled start or resume through `visible`.
    pub fn watching(visible: Arc<AtomicBool>) -> Self {
        Self {
            visible: Some(visible),
            ..Self::default()
        }
    }

    pub fn bound_surface(&self) -> Option<u64> {
        self.surface
    }

    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }

    fn record(&mut self, call: Call) {
        if self.torn_down {
            self.violations.push(format!("{call:?} after teardown"));
        }

        let needs_surface = matches!(
            call,
            Call::SurfaceChanged(..) | Call::Frame | Call::Pointer(..) | Call::Key(..) | Call::Start | Call::Resume
        );
        if needs_surface && self.surface.is_none() {
            self.violations.push(format!("{call:?} with no surface bound"));
        }

        if call == Call::Start
            && self
                .visible
                .as_ref()
                .is_some_and(|v| !v.load(Ordering::SeqCst))
        {
            self.violations.push("start without a start/resume signal".into());
        }

        match &call {
            Call::Start if self.started => self.violations.push("second start".into()),
            Call::Start => self.started = true,
            Call::Resume if self.resumed => self.violations.push("resume while resumed".into()),
            Call::Resume if !self.started => self.violations.push("resume before start".into()),
            Call::Resume => self.resumed = true,
            Call::Pause if !self.resumed => self.violations.push("pause while not resumed".into()),
            Call::Pause => self.resumed = false,
            Call::Frame if !self.resumed => self.violations.push("frame while not resumed".into()),
            Call::SurfaceCreated(h) => self.surface = Some(*h),
            Call::SurfaceChanged(h, ..) if self.surface != Some(*h) => {
                self.violations.push(format!("surface_changed for unbound {h}"))
            }
            Call::SurfaceDestroyed if self.surface.is_none() => {
                self.violations.push("surface_destroyed twice".into())
            }
            Call::SurfaceDestroyed => self.surface = None,
            Call::Teardown => {
                self.torn_down = true;
                self.surface = None;
            }
            _ => {}
        }

        self.calls.push(call);
    }
}

impl NativeEngine for RecordingEngine {
    fn create(&mut self, _host: &HostInfo) {
        self.record(Call::Create);
    }
    fn start(&mut self) {
        self.record(Call::Start);
    }
    fn pause(&mut self) {
        self.record(Call::Pause);
    }
    fn resume(&mut self) {
        self.record(Call::Resume);
    }
    fn surface_created(&mut self, surface: SurfaceHandle, _config: &FramebufferCandidate) {
        self.record(Call::SurfaceCreated(surface.0));
    }
    fn surface_changed(&mut self, surface: SurfaceHandle, width: u32, height: u32) {
        self.record(Call::SurfaceChanged(surface.0, width, height));
    }
    fn surface_destroyed(&mut self) {
        self.record(Call::SurfaceDestroyed);
    }
    fn teardown(&mut self) {
        self.record(Call::Teardown);
    }
    fn low_memory(&mut self) {
        self.record(Call::LowMemory);
    }
    fn handle_pointer(&mut self, device: DeviceId, _x: f32, _y: f32, phase: PointerPhase) {
        self.record(Call::Pointer(device.0, phase));
    }
    fn handle_key(&mut self, key: KeyCode, phase: KeyPhase) {
        self.record(Call::Key(key.0, phase));
    }
    fn render_frame(&mut self) {
        self.record(Call::Frame);
    }
    fn orientation_changed(&mut self, orientation: Orientation) {
        self.record(Call::Orientation(orientation));
    }
}

/// Device set the test can plug and unplug.
#[derive(Default)]
pub struct TestProbe {
    present: Mutex<HashSet<i32>>,
}

impl TestProbe {
    pub fn with(ids: &[i32]) -> Self {
        Self {
            present: Mutex::new(ids.iter().copied().collect()),
        }
    }

    pub fn plug(&self, id: i32) {
        self.present.lock().insert(id);
    }

    pub fn unplug(&self, id: i32) {
        self.present.lock().remove(&id);
    }
}

impl DeviceProbe for TestProbe {
    fn device_ids(&self) -> Vec<DeviceId> {
        let mut ids: Vec<_> = self.present.lock().iter().map(|&i| DeviceId(i)).collect();
        ids.sort();
        ids
    }

    fn device_exists(&self, id: DeviceId) -> bool {
        self.present.lock().contains(&id.0)
    }
}

pub fn rgba8_configs() -> FixedConfigs {
    let base = FramebufferCandidate {
        handle: ConfigHandle(1),
        red_bits: 5,
        green_bits: 6,
        blue_bits: 5,
        alpha_bits: 0,
        depth_bits: 16,
        stencil_bits: 0,
        sample_buffers: 0,
        samples: 0,
    };
    FixedConfigs::new(vec![
        base,
        FramebufferCandidate {
            handle: ConfigHandle(2),
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            ..base
        },
    ])
}

pub fn new_bridge(probe: &TestProbe, now: Instant) -> LifecycleBridge<RecordingEngine> {
    bridge_with(RecordingEngine::default(), probe, now)
}

pub fn bridge_with(
    engine: RecordingEngine,
    probe: &TestProbe,
    now: Instant,
) -> LifecycleBridge<RecordingEngine> {
    LifecycleBridge::new(
        engine,
        rgba8_configs(),
        probe,
        HostInfo::default(),
        &BridgeConfig::default(),
        now,
    )
}
