/// Opaque platform surface (window / backbuffer) handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Platform input-device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub i32);

/// Platform key code. The bridge never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub device_id: DeviceId,
    pub x: f32,
    pub y: f32,
    pub phase: PointerPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub device_id: DeviceId,
    pub key_code: KeyCode,
    pub phase: KeyPhase,
}

/// Screen orientation as reported by the host configuration.
///
/// Anything the host reports that is neither portrait nor landscape is treated as portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Maps the host's raw orientation constant (1 = portrait, 2 = landscape).
    #[inline]
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            2 => Orientation::Landscape,
            _ => Orientation::Portrait,
        }
    }
}

/// Host configuration change (rotation, multi-window resize).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    pub orientation: Orientation,
    pub width: u32,
    pub height: u32,
}

/// What the engine learns about its host at creation time.
#[derive(Debug, Clone, Default)]
pub struct HostInfo {
    pub orientation: Orientation,
}
