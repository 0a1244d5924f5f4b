use crate::host_events::{DeviceId, HostInfo, KeyCode, KeyPhase, Orientation, PointerPhase, SurfaceHandle};
use crate::negotiate::FramebufferCandidate;

/// Native engine entry points.
///
/// The bridge only calls into the engine; the engine never calls back.
/// All calls arrive serialized, one at a time, in lifecycle order:
/// - `create` exactly once, first;
/// - surface-dependent calls (`surface_changed`, `render_frame`, input) only while a surface is bound;
/// - `teardown` exactly once, last.
pub trait NativeEngine: Send {
    fn create(&mut self, host: &HostInfo);

    fn start(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);

    fn surface_created(&mut self, surface: SurfaceHandle, config: &FramebufferCandidate);
    fn surface_changed(&mut self, surface: SurfaceHandle, width: u32, height: u32);
    fn surface_destroyed(&mut self);

    fn teardown(&mut self);
    fn low_memory(&mut self);

    fn handle_pointer(&mut self, device: DeviceId, x: f32, y: f32, phase: PointerPhase);
    fn handle_key(&mut self, key: KeyCode, phase: KeyPhase);

    /// One frame into the bound surface. Only called while resumed.
    fn render_frame(&mut self) {}

    fn orientation_changed(&mut self, _orientation: Orientation) {}
}
