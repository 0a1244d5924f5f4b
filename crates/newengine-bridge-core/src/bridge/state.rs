/// Where the bridge stands, as seen by the native engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Engine created, no surface yet.
    Created,
    /// Surface bound, engine not started.
    SurfaceReady,
    Started,
    Resumed,
    Paused,
    /// Surface gone; waiting for a replacement or teardown.
    SurfaceLost,
    /// Terminal.
    Destroyed,
}

impl LifecycleState {
    /// A surface is bound and surface-dependent calls are allowed.
    #[inline]
    pub fn has_surface(self) -> bool {
        matches!(
            self,
            LifecycleState::SurfaceReady
                | LifecycleState::Started
                | LifecycleState::Resumed
                | LifecycleState::Paused
        )
    }

    /// Raw input is forwarded. The engine decides what to do with input while paused.
    #[inline]
    pub fn accepts_input(self) -> bool {
        matches!(
            self,
            LifecycleState::Started | LifecycleState::Resumed | LifecycleState::Paused
        )
    }
}

/// What happened to a forwarded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Forwarded,
    /// Identical to what the engine already has.
    Suppressed,
    /// Not allowed in the current state.
    Dropped,
}

/// Start/resume/pause position. Kept apart from the surface so a surface swap does not
/// reset it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActivityPhase {
    Started,
    Resumed,
    Paused,
}

impl ActivityPhase {
    #[inline]
    pub(crate) fn as_state(self) -> LifecycleState {
        match self {
            ActivityPhase::Started => LifecycleState::Started,
            ActivityPhase::Resumed => LifecycleState::Resumed,
            ActivityPhase::Paused => LifecycleState::Paused,
        }
    }
}
