//! Capabilities the host platform provides to the bridge.

use crate::host_events::DeviceId;
use crate::negotiate::{FramebufferCandidate, SurfaceProfile};

/// Opaque platform framebuffer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAttribute {
    RedSize,
    GreenSize,
    BlueSize,
    AlphaSize,
    DepthSize,
    StencilSize,
    SampleBuffers,
    Samples,
}

/// Platform framebuffer enumeration.
pub trait FramebufferSource: Send {
    /// Configurations at least as capable as `minimum`, in the platform's preference order.
    fn list_configs(&self, minimum: &SurfaceProfile) -> Vec<ConfigHandle>;

    fn attribute(&self, config: ConfigHandle, attribute: ConfigAttribute) -> i32;
}

/// Framebuffer source over a list known up front.
///
/// Lists every configuration unfiltered; the negotiator applies the minimums.
#[derive(Debug, Clone, Default)]
pub struct FixedConfigs {
    configs: Vec<FramebufferCandidate>,
}

impl FixedConfigs {
    #[inline]
    pub fn new(configs: Vec<FramebufferCandidate>) -> Self {
        Self { configs }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl FramebufferSource for FixedConfigs {
    fn list_configs(&self, _minimum: &SurfaceProfile) -> Vec<ConfigHandle> {
        self.configs.iter().map(|c| c.handle).collect()
    }

    fn attribute(&self, config: ConfigHandle, attribute: ConfigAttribute) -> i32 {
        let Some(c) = self.configs.iter().find(|c| c.handle == config) else {
            return 0;
        };
        let v = match attribute {
            ConfigAttribute::RedSize => c.red_bits,
            ConfigAttribute::GreenSize => c.green_bits,
            ConfigAttribute::BlueSize => c.blue_bits,
            ConfigAttribute::AlphaSize => c.alpha_bits,
            ConfigAttribute::DepthSize => c.depth_bits,
            ConfigAttribute::StencilSize => c.stencil_bits,
            ConfigAttribute::SampleBuffers => c.sample_buffers,
            ConfigAttribute::Samples => c.samples,
        };
        i32::try_from(v).unwrap_or(i32::MAX)
    }
}

/// Platform input-device enumeration and liveness check.
///
/// Passed into the calls that need it instead of being owned, so hosts whose device handles
/// are tied to one thread can keep them there.
pub trait DeviceProbe {
    fn device_ids(&self) -> Vec<DeviceId>;

    fn device_exists(&self, id: DeviceId) -> bool;
}
