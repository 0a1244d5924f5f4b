//! Lifecycle bridge between a native engine and a callback-driven mobile host.
//!
//! The host delivers surface, lifecycle and input callbacks from two threads in whatever order it
//! likes. [`LifecycleBridge`] serializes them into a strictly ordered sequence of [`NativeEngine`]
//! calls and never hands the engine a surface (or input) it can no longer use.
//!
//! Building blocks:
//! - [`negotiate`]: picks the framebuffer configuration for a new surface.
//! - [`presence`]: input-device hot-plug detection by polling, with pooled notifications.
//! - [`bridge`]: the state machine itself.

pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod host_events;
pub mod negotiate;
pub mod platform;
pub mod presence;

pub use crate::bridge::{Delivery, LifecycleBridge, LifecycleState};
pub use crate::config::{BridgeConfig, LogConfig};
pub use crate::engine::NativeEngine;
pub use crate::error::{BridgeError, BridgeResult, ConfigError, NegotiationError};
pub use crate::host_events::{
    Configuration, DeviceId, HostInfo, KeyCode, KeyEvent, KeyPhase, Orientation, PointerEvent,
    PointerPhase, SurfaceHandle,
};
pub use crate::negotiate::{FramebufferCandidate, SurfaceProfile};
pub use crate::platform::{ConfigAttribute, ConfigHandle, DeviceProbe, FixedConfigs, FramebufferSource};
pub use crate::presence::{
    DeviceListener, DevicePresenceTracker, DispatchContext, ListenerId, NotificationKind,
    SweepReport,
};
