// Host-side tests for the damped blend factor and the particle layers built on it.

use proptest::prelude::*;
use tree_core::layout::TreeDims;
use tree_core::seed::layer_rng;
use tree_core::{BlendFactor, DampRates, LayerConfig, ParticleLayer};

#[test]
fn explode_for_one_second_at_rate_three() {
    let mut f = BlendFactor::new(DampRates::default());
    let v = f.step(true, 1.0);
    assert!((v - 0.9502).abs() < 1e-4, "got {v}");
}

#[test]
fn zero_dt_leaves_factor_unchanged() {
    let mut f = BlendFactor::with_value(DampRates::default(), 0.37);
    for target in [true, false] {
        assert_eq!(f.step(target, 0.0), 0.37);
    }
}

#[test]
fn gather_is_faster_than_explode() {
    let mut out = BlendFactor::with_value(DampRates::default(), 0.0);
    let mut back = BlendFactor::with_value(DampRates::default(), 1.0);
    let moved_out = out.step(true, 0.1);
    let moved_back = 1.0 - back.step(false, 0.1);
    assert!(moved_back > moved_out);
}

proptest! {
    #[test]
    fn factor_stays_in_unit_range(
        steps in prop::collection::vec((any::<bool>(), 0.0f32..0.5), 1..200),
        outward in 0.0f32..20.0,
        inward in 0.0f32..20.0,
    ) {
        let rates = DampRates::new(outward, inward).unwrap();
        let mut f = BlendFactor::new(rates);
        for (dispersed, dt) in steps {
            let before = f.value();
            let after = f.step(dispersed, dt);
            prop_assert!((0.0..=1.0).contains(&after));
            // never passes the target it is heading toward
            if dispersed {
                prop_assert!(after >= before - 1e-6);
            } else {
                prop_assert!(after <= before + 1e-6);
            }
        }
    }

    #[test]
    fn positions_move_continuously(flips in prop::collection::vec(any::<bool>(), 1..40)) {
        let mut cfg = LayerConfig::deep();
        cfg.count = 32;
        let mut layer = ParticleLayer::new(cfg, TreeDims::default(), &mut layer_rng(4, 4)).unwrap();
        let dt = 1.0 / 1000.0;
        let mut t = 0.0;
        layer.tick(t, dt, false);
        let mut prev: Vec<_> = layer.transforms().iter().map(|x| x.position()).collect();
        for dispersed in flips {
            t += dt;
            layer.tick(t, dt, dispersed);
            for (p, q) in prev.iter().zip(layer.transforms()) {
                // a 1 ms step moves the factor by under 0.6 %, so no jumps
                prop_assert!((q.position() - *p).length() < 0.25);
            }
            prev = layer.transforms().iter().map(|x| x.position()).collect();
        }
    }
}
