use proptest::prelude::*;
use zonemapper_core::{from_canonical, to_canonical, Axis, Bounds, LengthUnit};

fn any_unit() -> impl Strategy<Value = LengthUnit> {
    prop::sample::select(LengthUnit::ALL.to_vec())
}

proptest! {
    #[test]
    fn unit_round_trip(value in -1.0e9f64..1.0e9, unit in any_unit()) {
        let mm = to_canonical(value, unit).unwrap();
        let back = from_canonical(mm, unit).unwrap();
        let tolerance = 1e-6 * value.abs().max(1.0);
        prop_assert!((back - value).abs() <= tolerance, "{} -> {} -> {}", value, mm, back);
    }

    #[test]
    fn normalized_bounds_are_ordered(
        a in -1.0e6f64..1.0e6,
        b in -1.0e6f64..1.0e6,
        c in -1.0e6f64..1.0e6,
        d in -1.0e6f64..1.0e6,
    ) {
        let bounds = Bounds::new(a, b, c, d);
        prop_assert!(bounds.x_min < bounds.x_max);
        prop_assert!(bounds.y_min < bounds.y_max);
    }

    #[test]
    fn clamp_round_stays_inside(
        value in prop::num::f64::ANY,
        lo in -1.0e5f64..0.0,
        hi in 0.0f64..1.0e5,
    ) {
        let bounds = Bounds::new(lo.round(), hi.round(), lo.round(), hi.round());
        for axis in [Axis::X, Axis::Y] {
            let v = bounds.clamp_round(value, axis);
            prop_assert!(v >= bounds.min(axis) && v <= bounds.max(axis));
            prop_assert_eq!(v, v.round());
        }
    }
}

#[test]
fn non_finite_values_fail_soft() {
    for unit in LengthUnit::ALL {
        assert_eq!(to_canonical(f64::NAN, unit), None);
        assert_eq!(from_canonical(f64::NEG_INFINITY, unit), None);
    }
}
