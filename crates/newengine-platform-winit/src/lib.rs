//! Desktop host: drives a [`LifecycleBridge`] from a winit event loop.
//!
//! One window stands in for the mobile surface. Gamepads come from gilrs; mice and keyboards
//! from winit device ids.

mod app;
pub mod devices;
pub mod error;
pub mod events;

use std::sync::Arc;
use std::time::Instant;

use newengine_bridge::{
    BridgeConfig, ConfigHandle, DeviceListener, FixedConfigs, FramebufferCandidate, HostInfo,
    LifecycleBridge, NativeEngine,
};
use winit::event_loop::EventLoop;

pub use devices::{GamepadProbe, HostDevices};
pub use error::{PlatformError, PlatformResult};

const WINDOW_TITLE: &str = "NewEngine";

/// Framebuffer layouts a desktop swapchain typically offers, in preference order.
pub fn desktop_configs() -> Vec<FramebufferCandidate> {
    let rgba8 = |handle: u64, depth_bits: u32, stencil_bits: u32, samples: u32| FramebufferCandidate {
        handle: ConfigHandle(handle),
        red_bits: 8,
        green_bits: 8,
        blue_bits: 8,
        alpha_bits: 8,
        depth_bits,
        stencil_bits,
        sample_buffers: u32::from(samples > 0),
        samples,
    };
    vec![
        FramebufferCandidate {
            handle: ConfigHandle(1),
            red_bits: 10,
            green_bits: 10,
            blue_bits: 10,
            alpha_bits: 2,
            depth_bits: 24,
            stencil_bits: 8,
            sample_buffers: 0,
            samples: 0,
        },
        rgba8(2, 24, 8, 0),
        rgba8(3, 24, 8, 4),
        rgba8(4, 32, 0, 0),
    ]
}

/// Run the winit-based host until the window closes.
///
/// The platform crate owns the loop; every window and device event goes through the bridge.
pub fn run<E: NativeEngine>(
    engine: E,
    config: &BridgeConfig,
    listeners: &[Arc<dyn DeviceListener>],
) -> PlatformResult<()> {
    let event_loop = EventLoop::new()?;
    let devices = HostDevices::new();

    let bridge = LifecycleBridge::new(
        engine,
        FixedConfigs::new(desktop_configs()),
        &devices,
        HostInfo::default(),
        config,
        Instant::now(),
    );
    for l in listeners {
        bridge.register_device_listener(Arc::clone(l), None);
    }

    let mut app = app::App::new(bridge, devices, WINDOW_TITLE);
    event_loop.run_app(&mut app)?;
    app.finish()
}
