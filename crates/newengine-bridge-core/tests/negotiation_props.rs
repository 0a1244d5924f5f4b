use newengine_bridge::negotiate::select;
use newengine_bridge::{ConfigHandle, FramebufferCandidate, NegotiationError, SurfaceProfile};
use proptest::prelude::*;

fn bits() -> impl Strategy<Value = u32> {
    prop_oneof![Just(0u32), Just(5), Just(6), Just(8), Just(16), Just(24)]
}

fn candidate() -> impl Strategy<Value = FramebufferCandidate> {
    (
        any::<u64>(),
        (bits(), bits(), bits(), bits()),
        (bits(), bits(), 0u32..2, 0u32..5),
    )
        .prop_map(|(h, (r, g, b, a), (d, s, sb, n))| FramebufferCandidate {
            handle: ConfigHandle(h),
            red_bits: r,
            green_bits: g,
            blue_bits: b,
            alpha_bits: a,
            depth_bits: d,
            stencil_bits: s,
            sample_buffers: sb,
            samples: n,
        })
}

fn profile() -> impl Strategy<Value = SurfaceProfile> {
    (
        (bits(), bits(), bits(), bits()),
        (bits(), bits(), 0u32..2, 0u32..5),
    )
        .prop_map(|((r, g, b, a), (d, s, sb, n))| SurfaceProfile {
            red_bits: r,
            green_bits: g,
            blue_bits: b,
            alpha_bits: a,
            min_depth_bits: d,
            min_stencil_bits: s,
            min_sample_buffers: sb,
            min_samples: n,
        })
}

proptest! {
    #[test]
    fn selection_is_the_first_qualifying_candidate(
        req in profile(),
        list in proptest::collection::vec(candidate(), 0..12),
    ) {
        let first = list
            .iter()
            .position(|c| c.is_eligible(&req) && c.matches_color(&req));

        match (select(&req, &list), first) {
            (Ok(picked), Some(i)) => {
                prop_assert_eq!(picked, list[i]);
                prop_assert!(picked.is_eligible(&req));
                prop_assert!(picked.matches_color(&req));
            }
            (Err(NegotiationError::NoConfigs), None) => {
                prop_assert!(list.is_empty());
            }
            (Err(NegotiationError::NoMatchingConfig { offered, eligible, .. }), None) => {
                prop_assert_eq!(offered, list.len());
                prop_assert_eq!(eligible, list.iter().filter(|c| c.is_eligible(&req)).count());
            }
            (got, want) => {
                prop_assert!(false, "select returned {:?}, expected index {:?}", got, want);
            }
        }
    }
}

#[test]
fn rgba8_request_skips_rgb565() {
    let req = SurfaceProfile {
        min_depth_bits: 16,
        ..SurfaceProfile::default()
    };
    let rgb565 = FramebufferCandidate {
        handle: ConfigHandle(1),
        red_bits: 5,
        green_bits: 6,
        blue_bits: 5,
        alpha_bits: 0,
        depth_bits: 16,
        stencil_bits: 0,
        sample_buffers: 0,
        samples: 0,
    };
    let rgba8 = FramebufferCandidate {
        handle: ConfigHandle(2),
        red_bits: 8,
        green_bits: 8,
        blue_bits: 8,
        alpha_bits: 8,
        depth_bits: 24,
        ..rgb565
    };

    assert_eq!(select(&req, &[rgb565, rgba8]), Ok(rgba8));
}
