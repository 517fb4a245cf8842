use netcalculus::configuration::ComputationSettings;
use netcalculus::curve::curve::Curve;
use netcalculus::curve::element::element::Element;
use netcalculus::curve::element::point::Point;
use netcalculus::curve::element::segment::Segment;
use netcalculus::curve::sequence::sequence::Sequence;
use netcalculus::numbers::rational::Rational;
use proptest::prelude::*;

fn r(n: i64) -> Rational {
    Rational::from(n)
}

fn q(num: i64, den: i64) -> Rational {
    Rational::new(num, den).unwrap()
}

fn general() -> ComputationSettings {
    ComputationSettings::default().with_shape_fast_paths(false)
}

/// Ramp up to 3, then a period of length 2 rising by 3.
fn ramp_then_period() -> Curve {
    let base = Sequence::new(vec![
        Element::Point(Point::origin()),
        Element::Segment(Segment::new(r(0), r(3), r(0), r(1)).unwrap()),
        Element::Point(Point::new(r(3), r(3)).unwrap()),
        Element::Segment(Segment::new(r(3), r(4), r(3), r(2)).unwrap()),
        Element::Point(Point::new(r(4), r(5)).unwrap()),
        Element::Segment(Segment::new(r(4), r(5), r(5), r(1)).unwrap())
    ]).unwrap();
    Curve::new(base, r(3), r(2), r(3)).unwrap()
}

#[test]
fn rate_latency_values() {
    let beta = Curve::rate_latency(r(10), r(5)).unwrap();
    assert_eq!(beta.value_at(&r(0)).unwrap(), r(0));
    assert_eq!(beta.value_at(&r(5)).unwrap(), r(0));
    assert_eq!(beta.value_at(&r(6)).unwrap(), r(10));
    assert_eq!(beta.value_at(&r(15)).unwrap(), r(100));
}

#[test]
fn point_closure_values() {
    let closure = Point::new(r(2), r(1)).unwrap().sub_additive_closure().unwrap();
    assert_eq!(closure.value_at(&r(0)).unwrap(), r(0));
    assert_eq!(closure.value_at(&r(2)).unwrap(), r(1));
    assert_eq!(closure.value_at(&r(4)).unwrap(), r(2));
    assert!(closure.value_at(&r(1)).unwrap().is_plus_infinite());
}

#[test]
fn height_mismatch_is_rejected() {
    let base = Sequence::new(vec![
        Element::Point(Point::origin()),
        Element::Segment(Segment::new(r(0), r(4), r(0), r(1)).unwrap())
    ]).unwrap();
    assert!(Curve::new(base, r(1), r(1), r(2)).is_err());
}

#[test]
fn backlog_of_a_token_bucket_through_a_rate_latency_server() {
    let arrival = Curve::sigma_rho(r(5), r(2)).unwrap();
    let service = Curve::rate_latency(r(4), r(3)).unwrap();
    assert_eq!(arrival.vertical_deviation(&service, Some(&general())).unwrap(), r(11));
    assert_eq!(arrival.vertical_deviation(&service, None).unwrap(), r(11));
}

#[test]
fn subtraction_can_clamp_at_zero() {
    let arrival = Curve::affine(r(1), r(1)).unwrap();
    let service = Curve::affine(r(0), r(2)).unwrap();
    let raw = arrival.subtraction(&service, false).unwrap();
    let clamped = arrival.subtraction(&service, true).unwrap();
    assert_eq!(raw.value_at(&r(3)).unwrap(), r(-2));
    assert_eq!(clamped.value_at(&r(3)).unwrap(), r(0));
    assert_eq!(clamped.value_at(&q(1, 2)).unwrap(), q(1, 2));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn periodic_extension_repeats_the_period(num in 0i64..400, den in 1i64..8) {
        let curve = ramp_then_period();
        let t = &r(3) + &q(num, den);
        let next = curve.value_at(&(&t + &r(2))).unwrap();
        prop_assert_eq!(next, &curve.value_at(&t).unwrap() + &r(3));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn concave_convolution_is_the_minimum(s1 in 0i64..6, r1 in 0i64..5, s2 in 0i64..6, r2 in 0i64..5) {
        let a = Curve::sigma_rho(r(s1), r(r1)).unwrap();
        let b = Curve::sigma_rho(r(s2), r(r2)).unwrap();
        let minimum = a.minimum(&b).unwrap();
        prop_assert_eq!(a.convolution(&b, None).unwrap(), minimum.clone());
        prop_assert_eq!(a.convolution(&b, Some(&general())).unwrap(), minimum);
    }

    #[test]
    fn staircase_fast_path_agrees_with_the_general_convolution(
        h1 in 0i64..5, d1 in 1i64..5, h2 in 0i64..5, d2 in 1i64..5, half in prop::bool::ANY
    ) {
        let period = if half { q(d1, 2) } else { r(d1) };
        let a = Curve::staircase(r(h1), period).unwrap();
        let b = Curve::staircase(r(h2), r(d2)).unwrap();
        let fast = a.convolution(&b, None).unwrap();
        let slow = a.convolution(&b, Some(&general())).unwrap();
        for k in 0..60 {
            let t = q(k, 3);
            prop_assert_eq!(fast.value_at(&t).unwrap(), slow.value_at(&t).unwrap());
        }
        prop_assert_eq!(fast, slow);
    }
}
