use gilrs::{GamepadId, Gilrs};
use newengine_bridge::{DeviceId, DeviceProbe};

use crate::error::{PlatformError, PlatformResult};
use crate::events::Interner;

/// Gamepad ids are offset so they never collide with interned winit devices.
const GAMEPAD_ID_BASE: i32 = 1 << 16;

#[inline]
fn gamepad_device_id(id: GamepadId) -> DeviceId {
    DeviceId(GAMEPAD_ID_BASE + i32::try_from(usize::from(id)).unwrap_or(0))
}

/// Gamepad enumeration and liveness through gilrs.
pub struct GamepadProbe {
    gilrs: Gilrs,
}

impl GamepadProbe {
    pub fn new() -> PlatformResult<Self> {
        let gilrs = Gilrs::new().map_err(|e| PlatformError::Gamepad(e.to_string()))?;
        Ok(Self { gilrs })
    }

    /// Drains pending gilrs events; `observed` gets the device of each one.
    ///
    /// Connection state inside gilrs is only updated by draining, so call this before probing.
    pub fn pump(&mut self, mut observed: impl FnMut(DeviceId)) {
        while let Some(ev) = self.gilrs.next_event() {
            observed(gamepad_device_id(ev.id));
        }
    }
}

impl DeviceProbe for GamepadProbe {
    fn device_ids(&self) -> Vec<DeviceId> {
        self.gilrs
            .gamepads()
            .map(|(id, _)| gamepad_device_id(id))
            .collect()
    }

    fn device_exists(&self, id: DeviceId) -> bool {
        self.gilrs
            .gamepads()
            .any(|(g, _)| gamepad_device_id(g) == id)
    }
}

/// Every input device the desktop host knows about.
///
/// winit has no device removal signal, so mice and keyboards stay present once seen.
pub struct HostDevices {
    pointers: Interner<winit::event::DeviceId>,
    gamepads: Option<GamepadProbe>,
}

impl HostDevices {
    pub fn new() -> Self {
        let gamepads = match GamepadProbe::new() {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!(target: "newengine_platform_winit", "{e}; gamepads disabled");
                None
            }
        };
        Self {
            pointers: Interner::starting_at(1),
            gamepads,
        }
    }

    #[inline]
    pub fn pointer_id(&mut self, id: winit::event::DeviceId) -> DeviceId {
        DeviceId(self.pointers.intern(id))
    }

    pub fn pump_gamepads(&mut self, observed: impl FnMut(DeviceId)) {
        if let Some(g) = self.gamepads.as_mut() {
            g.pump(observed);
        }
    }
}

impl Default for HostDevices {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceProbe for HostDevices {
    fn device_ids(&self) -> Vec<DeviceId> {
        let mut ids: Vec<DeviceId> = self.pointers.ids().map(DeviceId).collect();
        if let Some(g) = &self.gamepads {
            ids.extend(g.device_ids());
        }
        ids
    }

    fn device_exists(&self, id: DeviceId) -> bool {
        if id.0 >= GAMEPAD_ID_BASE {
            return self.gamepads.as_ref().is_some_and(|g| g.device_exists(id));
        }
        self.pointers.contains_id(id.0)
    }
}
