use std::time::Instant;

use newengine_bridge::{
    KeyCode, KeyEvent as BridgeKeyEvent, LifecycleBridge, NativeEngine, PointerEvent,
    PointerPhase,
};

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow},
    keyboard::{self, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::devices::HostDevices;
use crate::error::{PlatformError, PlatformResult};
use crate::events::{button_phase, key_phase, surface_handle, touch_phase, Interner};

pub(crate) struct App<E: NativeEngine> {
    bridge: LifecycleBridge<E>,
    devices: HostDevices,
    keys: Interner<PhysicalKey>,
    window: Option<Window>,
    title: String,
    cursor: (f32, f32),
    error: Option<PlatformError>,
}

impl<E: NativeEngine> App<E> {
    #[inline]
    pub(crate) fn new(bridge: LifecycleBridge<E>, devices: HostDevices, title: &str) -> Self {
        Self {
            bridge,
            devices,
            keys: Interner::starting_at(1),
            window: None,
            title: title.to_owned(),
            cursor: (0.0, 0.0),
            error: None,
        }
    }

    #[inline]
    fn request_redraw(&self) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    /// Stops the loop and keeps the first error for `finish`.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: PlatformError) {
        log::error!(target: "newengine_platform_winit", "{err}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }

    /// Tears the engine down if the loop ended without `exiting`, then reports the first error.
    pub(crate) fn finish(self) -> PlatformResult<()> {
        self.bridge.on_destroy();
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn bind_window(&mut self, event_loop: &ActiveEventLoop) -> PlatformResult<()> {
        if self.window.is_none() {
            let attrs = WindowAttributes::default().with_title(self.title.clone());
            self.window = Some(event_loop.create_window(attrs)?);
        }
        let Some(window) = &self.window else {
            return Ok(());
        };

        let handle = surface_handle(window.id());
        let size = window.inner_size();
        self.bridge.on_surface_created(handle)?;
        self.bridge.on_surface_changed(handle, size.width, size.height);
        Ok(())
    }

    fn pointer(&mut self, device_id: winit::event::DeviceId, phase: PointerPhase) {
        let event = PointerEvent {
            device_id: self.devices.pointer_id(device_id),
            x: self.cursor.0,
            y: self.cursor.1,
            phase,
        };
        self.bridge.on_pointer(event, Instant::now());
    }

    fn key(&mut self, device_id: winit::event::DeviceId, event: &KeyEvent) {
        if event.repeat {
            return;
        }
        let event = BridgeKeyEvent {
            device_id: self.devices.pointer_id(device_id),
            key_code: KeyCode(self.keys.intern(event.physical_key)),
            phase: key_phase(event.state),
        };
        self.bridge.on_key(event, Instant::now());
    }
}

impl<E: NativeEngine> ApplicationHandler for App<E> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.bind_window(event_loop) {
            self.fail(event_loop, e);
            return;
        }
        self.bridge.on_start();
        self.bridge.on_resume();

        // Kick first frame.
        self.request_redraw();
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.bridge.on_pause();
        self.bridge.on_surface_destroyed();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(Window::id) != Some(id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.bridge
                    .on_surface_changed(surface_handle(id), size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                self.bridge.on_frame();
                // Simple continuous loop.
                self.request_redraw();
            }
            WindowEvent::CursorMoved {
                device_id,
                position,
            } => {
                self.cursor = (position.x as f32, position.y as f32);
                self.pointer(device_id, PointerPhase::Move);
            }
            WindowEvent::MouseInput {
                device_id, state, ..
            } => self.pointer(device_id, button_phase(state)),
            WindowEvent::Touch(touch) => {
                self.cursor = (touch.location.x as f32, touch.location.y as f32);
                self.pointer(touch.device_id, touch_phase(touch.phase));
            }
            WindowEvent::KeyboardInput {
                device_id, event, ..
            } => {
                let esc_pressed = event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(keyboard::KeyCode::Escape);
                self.key(device_id, &event);
                if esc_pressed {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let bridge = &self.bridge;
        self.devices.pump_gamepads(|id| {
            bridge.on_device_activity(id, now);
        });

        if let Some(report) = self.bridge.tick(now, &self.devices) {
            if report.removed > 0 {
                log::debug!(
                    target: "newengine_platform_winit",
                    "sweep removed {} device(s)",
                    report.removed
                );
            }
        }

        let flow = match self.bridge.next_sweep_deadline(now) {
            Some(at) => ControlFlow::WaitUntil(at),
            None => ControlFlow::Wait,
        };
        event_loop.set_control_flow(flow);
    }

    fn memory_warning(&mut self, _event_loop: &ActiveEventLoop) {
        self.bridge.on_low_memory();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.bridge.on_destroy();
    }
}
