use netcalculus::configuration::ComputationSettings;
use netcalculus::curve::curve::Curve;
use netcalculus::curve::curveerror::CurveError;
use netcalculus::curve::element::element::Element;
use netcalculus::curve::element::point::Point;
use netcalculus::curve::element::segment::Segment;
use netcalculus::curve::sequence::sequence::Sequence;
use netcalculus::numbers::rational::Rational;
use proptest::prelude::*;

/// Evaluations run on `t = k / 2` up to this many quarters.
const HORIZON: i64 = 48;

/// How far, in quarters, deconvolution looks for its supremum.
const DECONVOLUTION_REACH: i64 = 160;

/// Piecewise-constant curve with breakpoints on the integers: one value per
/// integer and one per open unit interval, `None` for `+∞`. It repeats from
/// `start` every `length` units, rising by `height`.
#[derive(Debug, Clone)]
struct GridCurve {
    points: Vec<Option<i64>>,
    gaps: Vec<Option<i64>>,
    start: i64,
    length: i64,
    height: i64
}

impl GridCurve {
    /// Value at `quarters / 4`.
    fn value(&self, quarters: i64) -> Option<i64> {
        let index = quarters.div_euclid(4);
        let repeats = if index < self.start { 0 } else { (index - self.start) / self.length };
        let folded = (index - repeats * self.length) as usize;
        let value = if quarters % 4 == 0 { self.points[folded] } else { self.gaps[folded] };
        value.map(|v| v + repeats * self.height)
    }

    fn is_ultimately_plus_infinite(&self) -> bool {
        (self.start..self.start + self.length)
            .all(|i| self.points[i as usize].is_none() && self.gaps[i as usize].is_none())
    }

    fn to_curve(&self) -> Curve {
        let value = |v: Option<i64>| v.map_or(Rational::plus_infinity(), Rational::from);
        let mut elements = Vec::new();
        for i in 0..(self.start + self.length) {
            let slot = i as usize;
            elements.push(Element::Point(Point::new(Rational::from(i), value(self.points[slot])).unwrap()));
            elements.push(Element::Segment(
                Segment::new(Rational::from(i), Rational::from(i + 1), value(self.gaps[slot]), Rational::zero()).unwrap()
            ));
        }
        Curve::new(
            Sequence::new(elements).unwrap(),
            Rational::from(self.start),
            Rational::from(self.length),
            Rational::from(self.height)
        ).unwrap()
    }
}

fn value_strategy() -> BoxedStrategy<Option<i64>> {
    prop_oneof![1 => Just(None), 3 => (0i64..6).prop_map(Some)].boxed()
}

fn grid_curve(with_gaps: bool) -> impl Strategy<Value = GridCurve> {
    (0i64..3, 1i64..4, 0i64..4).prop_flat_map(move |(start, length, height)| {
        let span = (start + length) as usize;
        let gap_values = if with_gaps { value_strategy() } else { Just(None::<i64>).boxed() };
        (prop::collection::vec(value_strategy(), span), prop::collection::vec(gap_values, span))
            .prop_map(move |(points, gaps)| GridCurve { points, gaps, start, length, height })
    })
}

/// Service-like operand: zero at the origin.
fn grid_curve_from_origin() -> impl Strategy<Value = GridCurve> {
    grid_curve(true).prop_map(|mut curve| {
        curve.points[0] = Some(0);
        curve
    })
}

fn convolution_at(f: &GridCurve, g: &GridCurve, t: i64) -> Option<i64> {
    (0..=t).filter_map(|s| Some(f.value(s)? + g.value(t - s)?)).min()
}

fn deconvolution_at(f: &GridCurve, g: &GridCurve, t: i64) -> Option<i64> {
    let mut best: Option<i64> = None;
    for u in 0..=DECONVOLUTION_REACH {
        let Some(subtrahend) = g.value(u) else {
            continue;
        };
        let difference = f.value(t + u)? - subtrahend;
        best = Some(best.map_or(difference, |b| b.max(difference)));
    }
    best
}

/// Closure values of a comb on the integers `0..=last`.
fn closure_table(f: &GridCurve, last: i64) -> Vec<Option<i64>> {
    let mut table: Vec<Option<i64>> = vec![Some(0)];
    for n in 1..=last {
        let best = (1..=n)
            .filter_map(|i| Some(f.value(4 * i)? + table[(n - i) as usize]?))
            .min();
        table.push(best);
    }
    table
}

fn expected(value: Option<i64>) -> Rational {
    value.map_or(Rational::plus_infinity(), Rational::from)
}

fn general() -> ComputationSettings {
    ComputationSettings::default().with_shape_fast_paths(false)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn convolution_matches_the_pointwise_infimum(f in grid_curve(true), g in grid_curve(true)) {
        let result = match f.to_curve().convolution(&g.to_curve(), Some(&general())) {
            Err(CurveError::InvalidOperation(_)) => return Ok(()),
            other => other.unwrap()
        };
        for t in (0..=HORIZON).step_by(2) {
            let value = result.value_at(&Rational::new(t, 4).unwrap()).unwrap();
            prop_assert_eq!(value, expected(convolution_at(&f, &g, t)), "t = {}/4", t);
        }
    }

    #[test]
    fn deconvolution_matches_the_pointwise_supremum(f in grid_curve(true), g in grid_curve_from_origin()) {
        prop_assume!(g.is_ultimately_plus_infinite() || f.height * g.length <= g.height * f.length);
        let result = f.to_curve().deconvolution(&g.to_curve(), Some(&general())).unwrap();
        for t in (0..=HORIZON).step_by(2) {
            let value = result.value_at(&Rational::new(t, 4).unwrap()).unwrap();
            prop_assert_eq!(value, expected(deconvolution_at(&f, &g, t)), "t = {}/4", t);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn comb_closure_matches_the_cheapest_decomposition(f in grid_curve(false)) {
        let closure = match f.to_curve().sub_additive_closure(Some(&general())) {
            Err(CurveError::InvalidOperation(_)) => return Ok(()),
            other => other.unwrap()
        };
        let last = HORIZON / 4;
        let table = closure_table(&f, last);
        for n in 0..=last {
            prop_assert_eq!(closure.value_at(&Rational::from(n)).unwrap(), expected(table[n as usize]), "t = {}", n);
            let between = Rational::new(2 * n + 1, 2).unwrap();
            prop_assert!(closure.value_at(&between).unwrap().is_plus_infinite());
        }
    }
}
