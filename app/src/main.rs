use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use newengine_bridge::{
    BridgeConfig, DeviceId, DeviceListener, FramebufferCandidate, HostInfo, KeyCode, KeyPhase,
    NativeEngine, Orientation, PointerPhase, SurfaceHandle,
};

const TARGET: &str = "app";

/// Stand-in engine: logs every call it gets and counts frames.
#[derive(Default)]
struct LoggingEngine {
    frames: u64,
}

impl NativeEngine for LoggingEngine {
    fn create(&mut self, host: &HostInfo) {
        log::info!(target: TARGET, "create ({:?})", host.orientation);
    }

    fn start(&mut self) {
        log::info!(target: TARGET, "start");
    }

    fn pause(&mut self) {
        log::info!(target: TARGET, "pause after {} frame(s)", self.frames);
    }

    fn resume(&mut self) {
        log::info!(target: TARGET, "resume");
    }

    fn surface_created(&mut self, surface: SurfaceHandle, config: &FramebufferCandidate) {
        log::info!(target: TARGET, "surface {surface:?} created with {config:?}");
    }

    fn surface_changed(&mut self, surface: SurfaceHandle, width: u32, height: u32) {
        log::info!(target: TARGET, "surface {surface:?} is {width}x{height}");
    }

    fn surface_destroyed(&mut self) {
        log::info!(target: TARGET, "surface destroyed");
    }

    fn teardown(&mut self) {
        log::info!(target: TARGET, "teardown, {} frame(s) total", self.frames);
    }

    fn low_memory(&mut self) {
        log::warn!(target: TARGET, "low memory");
    }

    fn handle_pointer(&mut self, device: DeviceId, x: f32, y: f32, phase: PointerPhase) {
        if phase != PointerPhase::Move {
            log::debug!(target: TARGET, "pointer {phase:?} at ({x:.0}, {y:.0}) from {device:?}");
        }
    }

    fn handle_key(&mut self, key: KeyCode, phase: KeyPhase) {
        log::debug!(target: TARGET, "key {key:?} {phase:?}");
    }

    fn render_frame(&mut self) {
        self.frames += 1;
        if self.frames % 600 == 0 {
            log::trace!(target: TARGET, "frame {}", self.frames);
        }
    }

    fn orientation_changed(&mut self, orientation: Orientation) {
        log::info!(target: TARGET, "orientation {orientation:?}");
    }
}

struct PresenceLog;

impl DeviceListener for PresenceLog {
    fn on_device_added(&self, id: DeviceId) {
        log::info!(target: TARGET, "device {id:?} connected");
    }

    fn on_device_removed(&self, id: DeviceId) {
        log::info!(target: TARGET, "device {id:?} disconnected");
    }
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("bridge.toml"));
    let config = BridgeConfig::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    newengine_modules_logging::init(&config.log);

    let listeners: Vec<Arc<dyn DeviceListener>> = vec![Arc::new(PresenceLog)];
    newengine_platform_winit::run(LoggingEngine::default(), &config, &listeners)?;
    Ok(())
}
