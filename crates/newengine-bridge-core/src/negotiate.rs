use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NegotiationError;
use crate::platform::{ConfigAttribute, ConfigHandle, FramebufferSource};

/// Requested surface capabilities.
///
/// Color channels are matched exactly; depth, stencil and multisampling are minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceProfile {
    #[serde(default = "default_color_bits")]
    pub red_bits: u32,
    #[serde(default = "default_color_bits")]
    pub green_bits: u32,
    #[serde(default = "default_color_bits")]
    pub blue_bits: u32,
    #[serde(default = "default_color_bits")]
    pub alpha_bits: u32,

    #[serde(default = "default_min_depth_bits")]
    pub min_depth_bits: u32,
    #[serde(default)]
    pub min_stencil_bits: u32,
    #[serde(default)]
    pub min_sample_buffers: u32,
    #[serde(default)]
    pub min_samples: u32,
}

fn default_color_bits() -> u32 {
    8
}
fn default_min_depth_bits() -> u32 {
    16
}

impl Default for SurfaceProfile {
    fn default() -> Self {
        Self {
            red_bits: default_color_bits(),
            green_bits: default_color_bits(),
            blue_bits: default_color_bits(),
            alpha_bits: default_color_bits(),
            min_depth_bits: default_min_depth_bits(),
            min_stencil_bits: 0,
            min_sample_buffers: 0,
            min_samples: 0,
        }
    }
}

impl fmt::Display for SurfaceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "r{} g{} b{} a{} depth>={} stencil>={} sample_buffers>={} samples>={}",
            self.red_bits,
            self.green_bits,
            self.blue_bits,
            self.alpha_bits,
            self.min_depth_bits,
            self.min_stencil_bits,
            self.min_sample_buffers,
            self.min_samples
        )
    }
}

/// One concrete framebuffer configuration as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferCandidate {
    pub handle: ConfigHandle,
    pub red_bits: u32,
    pub green_bits: u32,
    pub blue_bits: u32,
    pub alpha_bits: u32,
    pub depth_bits: u32,
    pub stencil_bits: u32,
    pub sample_buffers: u32,
    pub samples: u32,
}

impl FramebufferCandidate {
    /// Reads every attribute of `handle` from the platform. Negative values read as zero.
    pub fn read(source: &dyn FramebufferSource, handle: ConfigHandle) -> Self {
        let attr = |a: ConfigAttribute| u32::try_from(source.attribute(handle, a)).unwrap_or(0);
        Self {
            handle,
            red_bits: attr(ConfigAttribute::RedSize),
            green_bits: attr(ConfigAttribute::GreenSize),
            blue_bits: attr(ConfigAttribute::BlueSize),
            alpha_bits: attr(ConfigAttribute::AlphaSize),
            depth_bits: attr(ConfigAttribute::DepthSize),
            stencil_bits: attr(ConfigAttribute::StencilSize),
            sample_buffers: attr(ConfigAttribute::SampleBuffers),
            samples: attr(ConfigAttribute::Samples),
        }
    }

    /// Depth, stencil and multisampling all meet the requested minimums.
    #[inline]
    pub fn is_eligible(&self, requested: &SurfaceProfile) -> bool {
        self.depth_bits >= requested.min_depth_bits
            && self.stencil_bits >= requested.min_stencil_bits
            && self.sample_buffers >= requested.min_sample_buffers
            && self.samples >= requested.min_samples
    }

    /// Red, green, blue and alpha bit counts equal the request.
    #[inline]
    pub fn matches_color(&self, requested: &SurfaceProfile) -> bool {
        self.red_bits == requested.red_bits
            && self.green_bits == requested.green_bits
            && self.blue_bits == requested.blue_bits
            && self.alpha_bits == requested.alpha_bits
    }
}

/// Picks the first candidate that is eligible and matches the color channels exactly.
///
/// Candidate order is the platform's preference order and is never re-sorted.
pub fn select(
    requested: &SurfaceProfile,
    candidates: &[FramebufferCandidate],
) -> Result<FramebufferCandidate, NegotiationError> {
    if candidates.is_empty() {
        return Err(NegotiationError::NoConfigs);
    }

    let mut eligible = 0usize;
    for c in candidates {
        if !c.is_eligible(requested) {
            continue;
        }
        eligible += 1;
        if c.matches_color(requested) {
            return Ok(*c);
        }
    }

    Err(NegotiationError::NoMatchingConfig {
        requested: *requested,
        offered: candidates.len(),
        eligible,
    })
}

/// Lists the platform's configurations for `requested` and selects one.
pub fn negotiate(
    source: &dyn FramebufferSource,
    requested: &SurfaceProfile,
) -> Result<FramebufferCandidate, NegotiationError> {
    let candidates: Vec<FramebufferCandidate> = source
        .list_configs(requested)
        .into_iter()
        .map(|h| FramebufferCandidate::read(source, h))
        .collect();

    let picked = select(requested, &candidates)?;
    log::debug!(
        target: "newengine_bridge::negotiate",
        "picked config {:?} of {} (depth={} stencil={} samples={}/{})",
        picked.handle,
        candidates.len(),
        picked.depth_bits,
        picked.stencil_bits,
        picked.sample_buffers,
        picked.samples
    );
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FixedConfigs;

    fn cand(id: u64, rgba: [u32; 4], depth: u32) -> FramebufferCandidate {
        FramebufferCandidate {
            handle: ConfigHandle(id),
            red_bits: rgba[0],
            green_bits: rgba[1],
            blue_bits: rgba[2],
            alpha_bits: rgba[3],
            depth_bits: depth,
            stencil_bits: 0,
            sample_buffers: 0,
            samples: 0,
        }
    }

    #[test]
    fn rgb565_is_skipped_for_rgba8_request() {
        let req = SurfaceProfile::default();
        let list = [cand(1, [5, 6, 5, 0], 16), cand(2, [8, 8, 8, 8], 24)];
        assert_eq!(select(&req, &list).unwrap().handle, ConfigHandle(2));
    }

    #[test]
    fn color_match_without_enough_depth_is_not_found() {
        let req = SurfaceProfile {
            min_depth_bits: 24,
            ..SurfaceProfile::default()
        };
        let list = [cand(1, [8, 8, 8, 8], 16), cand(2, [8, 8, 8, 0], 24)];
        assert_eq!(
            select(&req, &list),
            Err(NegotiationError::NoMatchingConfig {
                requested: req,
                offered: 2,
                eligible: 1,
            })
        );
    }

    #[test]
    fn wider_color_is_not_an_acceptable_substitute() {
        let req = SurfaceProfile::default();
        let list = [cand(1, [10, 10, 10, 2], 24)];
        assert!(select(&req, &list).is_err());
    }

    #[test]
    fn empty_list_is_no_configs() {
        assert_eq!(
            select(&SurfaceProfile::default(), &[]),
            Err(NegotiationError::NoConfigs)
        );
    }

    #[test]
    fn negotiate_reads_attributes_through_the_source() {
        let source = FixedConfigs::new(vec![
            cand(7, [5, 6, 5, 0], 24),
            FramebufferCandidate {
                stencil_bits: 8,
                ..cand(9, [8, 8, 8, 8], 24)
            },
        ]);
        let req = SurfaceProfile {
            min_stencil_bits: 8,
            ..SurfaceProfile::default()
        };
        let picked = negotiate(&source, &req).unwrap();
        assert_eq!(picked.handle, ConfigHandle(9));
        assert_eq!(picked.stencil_bits, 8);
    }

    #[test]
    fn profile_display_names_every_field() {
        let s = SurfaceProfile::default().to_string();
        assert_eq!(
            s,
            "r8 g8 b8 a8 depth>=16 stencil>=0 sample_buffers>=0 samples>=0"
        );
    }
}
