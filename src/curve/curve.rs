use std::fmt;

use serde::{
    Deserialize,
    Serialize
};

use crate::curve::curveerror::CurveError;
use crate::curve::curveshape::CurveShape;
use crate::curve::element::element::Element;
use crate::curve::interval::Interval;
use crate::curve::propertycache::{
    CurveProperty,
    PropertyCache
};
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

/// Ultimately pseudo-periodic piecewise-affine function on `[0, +∞)`.
///
/// The base sequence describes `[0, T + d)`. For `t ≥ T` the function repeats
/// with `f(t + k·d) = f(t) + k·c`, where `T` is the pseudo-period start, `d`
/// its length and `c` its height.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CurveRecord", into = "CurveRecord")]
pub struct Curve {
    base_sequence: Sequence,
    pseudo_period_start: Rational,
    pseudo_period_length: Rational,
    pseudo_period_height: Rational,
    shape: CurveShape,
    properties: PropertyCache
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum CurveTag {
    Curve
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurveRecord {
    #[serde(rename = "type")]
    kind: CurveTag,
    base_sequence: Sequence,
    pseudo_period_start: Rational,
    pseudo_period_length: Rational,
    pseudo_period_height: Rational,
    #[serde(default, skip_serializing_if = "CurveShape::is_general")]
    shape: CurveShape
}

impl From<Curve> for CurveRecord {
    fn from(curve: Curve) -> Self {
        CurveRecord {
            kind: CurveTag::Curve,
            base_sequence: curve.base_sequence,
            pseudo_period_start: curve.pseudo_period_start,
            pseudo_period_length: curve.pseudo_period_length,
            pseudo_period_height: curve.pseudo_period_height,
            shape: curve.shape
        }
    }
}

impl TryFrom<CurveRecord> for Curve {
    type Error = CurveError;

    fn try_from(record: CurveRecord) -> Result<Self, Self::Error> {
        let curve = Curve::new(
            record.base_sequence,
            record.pseudo_period_start,
            record.pseudo_period_length,
            record.pseudo_period_height
        )?;
        curve.with_verified_shape(record.shape)
    }
}

impl PartialEq for Curve {
    fn eq(&self, other: &Self) -> bool {
        self.equivalent(other)
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "curve(T={}, d={}, c={}, elements={})",
            self.pseudo_period_start,
            self.pseudo_period_length,
            self.pseudo_period_height,
            self.base_sequence.len()
        )
    }
}

impl Curve {
    /// Validates the pseudo-period and trims the base sequence to `[0, T + d)`.
    ///
    /// A base sequence reaching past `T + d` must agree with the periodic
    /// extension there, otherwise the declared height is rejected.
    pub fn new(base_sequence: Sequence,
               pseudo_period_start: Rational,
               pseudo_period_length: Rational,
               pseudo_period_height: Rational) -> Result<Curve, CurveError> {
        if !pseudo_period_start.is_finite() || pseudo_period_start.is_negative() {
            return Err(CurveError::InvalidCurve(
                format!("pseudo-period start must be finite and non-negative, got {}", pseudo_period_start)
            ));
        }
        if !pseudo_period_length.is_finite() || !pseudo_period_length.is_positive() {
            return Err(CurveError::InvalidCurve(
                format!("pseudo-period length must be finite and positive, got {}", pseudo_period_length)
            ));
        }
        if !pseudo_period_height.is_finite() {
            return Err(CurveError::InvalidCurve("pseudo-period height must be finite".to_owned()));
        }
        if !base_sequence.start_time().is_zero() || !base_sequence.is_left_closed() {
            return Err(CurveError::InvalidCurve("base sequence must start with a point at time 0".to_owned()));
        }
        let period_end = &pseudo_period_start + &pseudo_period_length;
        if base_sequence.end_time() < &period_end {
            return Err(CurveError::InvalidCurve(format!(
                "base sequence ends at {} but must cover [0, {})",
                base_sequence.end_time(), period_end
            )));
        }

        let covers_more = base_sequence.end_time() > &period_end || base_sequence.is_right_closed();
        let trimmed = if covers_more {
            base_sequence.cut(&Rational::zero(), &period_end, true, false)?
        } else {
            base_sequence.clone()
        };
        let curve = Curve::unchecked(trimmed, pseudo_period_start, pseudo_period_length, pseudo_period_height);
        if covers_more {
            let end = base_sequence.end_time();
            let closed = base_sequence.is_right_closed();
            let given = base_sequence.cut(&period_end, end, true, closed)?.optimize()?;
            let extended = curve.cut(&period_end, end, true, closed)?.optimize()?;
            if given != extended {
                return Err(CurveError::InvalidCurve(format!(
                    "pseudo-period height {} does not match the base sequence",
                    curve.pseudo_period_height
                )));
            }
        }
        Ok(curve)
    }

    fn unchecked(base_sequence: Sequence,
                 pseudo_period_start: Rational,
                 pseudo_period_length: Rational,
                 pseudo_period_height: Rational) -> Curve {
        Curve {
            base_sequence,
            pseudo_period_start,
            pseudo_period_length,
            pseudo_period_height,
            shape: CurveShape::General,
            properties: PropertyCache::new()
        }
    }

    /// Caller guarantees that the curve has the tagged shape.
    pub(crate) fn with_shape(mut self, shape: CurveShape) -> Curve {
        if shape.guarantees_concave() {
            self.properties.seed(CurveProperty::Concave, true);
        }
        if shape.guarantees_convex() {
            self.properties.seed(CurveProperty::Convex, true);
        }
        self.shape = shape;
        self
    }

    /// Tags the curve after checking the claim.
    pub(crate) fn with_verified_shape(self, shape: CurveShape) -> Result<Curve, CurveError> {
        let holds = match &shape {
            CurveShape::General => true,
            CurveShape::Concave => self.is_concave(),
            CurveShape::Convex => self.is_convex(),
            parametric => match parametric.canonical_curve()? {
                Some(canonical) => canonical.equivalent(&self),
                None => false
            }
        };
        if !holds {
            return Err(CurveError::InvalidCurve(format!("curve does not have the shape {:?}", shape)));
        }
        Ok(self.with_shape(shape))
    }

    /// `+∞` outside the support of `sequence`, which must not start before 0.
    pub fn from_finite_support(sequence: &Sequence) -> Result<Curve, CurveError> {
        if sequence.start_time().is_negative() {
            return Err(CurveError::InvalidArgument(
                format!("support starts at negative time {}", sequence.start_time())
            ));
        }
        let zero = Rational::zero();
        let infinity = Rational::plus_infinity();
        let start = sequence.start_time();
        let end = sequence.end_time();
        let mut parts = Vec::with_capacity(3);
        if !start.is_zero() || !sequence.is_left_closed() {
            parts.push(Sequence::constant(&zero, start, true, !sequence.is_left_closed(), &infinity)?);
        }
        parts.push(sequence.clone());
        let tail_end = end + &Rational::from(2);
        parts.push(Sequence::constant(end, &tail_end, !sequence.is_right_closed(), false, &infinity)?);
        Curve::new(Sequence::concat(parts)?, end + &Rational::one(), Rational::one(), zero)
    }

    pub fn base_sequence(&self) -> &Sequence {
        &self.base_sequence
    }

    pub fn pseudo_period_start(&self) -> &Rational {
        &self.pseudo_period_start
    }

    pub fn pseudo_period_length(&self) -> &Rational {
        &self.pseudo_period_length
    }

    pub fn pseudo_period_height(&self) -> &Rational {
        &self.pseudo_period_height
    }

    pub fn pseudo_period_end(&self) -> Rational {
        &self.pseudo_period_start + &self.pseudo_period_length
    }

    /// Long-run growth rate `c / d`.
    pub fn pseudo_period_slope(&self) -> Rational {
        &self.pseudo_period_height / &self.pseudo_period_length
    }

    pub fn shape(&self) -> &CurveShape {
        &self.shape
    }

    pub(crate) fn properties(&self) -> &PropertyCache {
        &self.properties
    }

    /// One period `[T, T + d)` of the base sequence.
    pub fn period_sequence(&self) -> Result<Sequence, CurveError> {
        self.base_sequence.cut(&self.pseudo_period_start, &self.pseudo_period_end(), true, false)
    }

    fn check_time(t: &Rational) -> Result<(), CurveError> {
        if !t.is_finite() || t.is_negative() {
            return Err(CurveError::InvalidArgument(format!("curves are defined on [0, +∞), got {}", t)));
        }
        Ok(())
    }

    /// Number of whole periods `k` and the instant `t − k·d` in `[T, T + d)`.
    fn fold_into_period(&self, t: &Rational) -> Result<(Rational, Rational), CurveError> {
        let k = t.checked_sub(&self.pseudo_period_start)?
            .checked_div(&self.pseudo_period_length)?
            .floor();
        let folded = t.checked_sub(&k.checked_mul(&self.pseudo_period_length)?)?;
        Ok((folded, k))
    }

    fn lift(&self, value: Rational, periods: &Rational) -> Result<Rational, CurveError> {
        Ok(value.checked_add(&periods.checked_mul(&self.pseudo_period_height)?)?)
    }

    pub fn value_at(&self, t: &Rational) -> Result<Rational, CurveError> {
        Curve::check_time(t)?;
        if t < &self.pseudo_period_end() {
            return self.base_sequence.value_at(t);
        }
        let (folded, k) = self.fold_into_period(t)?;
        self.lift(self.base_sequence.value_at(&folded)?, &k)
    }

    pub fn right_limit_at(&self, t: &Rational) -> Result<Rational, CurveError> {
        Curve::check_time(t)?;
        if t < &self.pseudo_period_end() {
            return self.base_sequence.right_limit_at(t);
        }
        let (folded, k) = self.fold_into_period(t)?;
        self.lift(self.base_sequence.right_limit_at(&folded)?, &k)
    }

    pub fn left_limit_at(&self, t: &Rational) -> Result<Rational, CurveError> {
        Curve::check_time(t)?;
        if t.is_zero() {
            return Err(CurveError::InvalidArgument("no left limit at the origin".to_owned()));
        }
        if t <= &self.pseudo_period_end() {
            return self.base_sequence.left_limit_at(t);
        }
        let k = t.checked_sub(&self.pseudo_period_start)?
            .checked_div(&self.pseudo_period_length)?
            .ceil() - Rational::one();
        let folded = t.checked_sub(&k.checked_mul(&self.pseudo_period_length)?)?;
        self.lift(self.base_sequence.left_limit_at(&folded)?, &k)
    }

    /// Materializes the curve over the interval from `from` to `to`.
    pub fn cut(&self,
               from: &Rational,
               to: &Rational,
               include_from: bool,
               include_to: bool) -> Result<Sequence, CurveError> {
        Interval::new(from.clone(), to.clone(), include_from, include_to)?;
        Curve::check_time(from)?;
        let period_end = self.pseudo_period_end();
        let mut parts: Vec<Sequence> = Vec::new();

        if from < &period_end {
            let (to_base, include_to_base) = if to < &period_end { (to.clone(), include_to) } else { (period_end.clone(), false) };
            if from < &to_base || (include_from && include_to_base) {
                parts.push(self.base_sequence.cut(from, &to_base, include_from, include_to_base)?);
            }
        }

        if to > &period_end || (to == &period_end && include_to) {
            let period = self.period_sequence()?;
            let (_, first_copy) = self.fold_into_period(from)?;
            let mut k = Rational::max(&first_copy, &Rational::one());
            loop {
                let copy_start = &self.pseudo_period_start + &(&k * &self.pseudo_period_length);
                if &copy_start > to || (&copy_start == to && !include_to) {
                    break;
                }
                let copy_end = &copy_start + &self.pseudo_period_length;
                let (lo, include_lo) = if from >= &copy_start { (from.clone(), include_from) } else { (copy_start.clone(), true) };
                let (hi, include_hi) = if to < &copy_end { (to.clone(), include_to) } else { (copy_end, false) };
                if lo < hi || (lo == hi && include_lo && include_hi) {
                    let shift = &k * &self.pseudo_period_height;
                    let copy = period.translated(&(&k * &self.pseudo_period_length), &shift)?;
                    parts.push(copy.cut(&lo, &hi, include_lo, include_hi)?);
                }
                k = k + Rational::one();
            }
        }
        Sequence::concat(parts)
    }

    /// `true` when both describe the same function on `[0, +∞)`.
    ///
    /// The two are compared over `[0, max(T) + lcm(d))`, which holds a full
    /// common period, and then on their long-run growth.
    pub fn equivalent(&self, other: &Curve) -> bool {
        self.try_equivalent(other).unwrap_or(false)
    }

    fn try_equivalent(&self, other: &Curve) -> Result<bool, CurveError> {
        let start = Rational::max(&self.pseudo_period_start, &other.pseudo_period_start);
        let length = self.pseudo_period_length.lcm(&other.pseudo_period_length)?;
        let horizon = &start + &length;
        let zero = Rational::zero();
        let left = self.cut(&zero, &horizon, true, false)?.optimize()?;
        let right = other.cut(&zero, &horizon, true, false)?.optimize()?;
        if left != right {
            return Ok(false);
        }
        let tail_is_infinite = self.cut(&start, &horizon, true, false)?
            .elements()
            .iter()
            .all(Element::is_plus_infinite);
        Ok(tail_is_infinite || self.pseudo_period_slope() == other.pseudo_period_slope())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::element::point::Point;
    use crate::curve::element::segment::Segment;

    fn r(n: i64) -> Rational {
        Rational::from(n)
    }

    fn q(n: i64, d: i64) -> Rational {
        Rational::new(n, d).unwrap()
    }

    fn seg(a: i64, b: i64, v: i64, s: i64) -> Element {
        Element::Segment(Segment::new(r(a), r(b), r(v), r(s)).unwrap())
    }

    fn pt(t: i64, v: i64) -> Element {
        Element::Point(Point::new(r(t), r(v)).unwrap())
    }

    /// Ramp up to 3, flat on (3, 4), slope 2 on (4, 5); repeats from 3 every 2 with height 3.
    fn periodic() -> Curve {
        let base = Sequence::new(vec![
            pt(0, 0), seg(0, 3, 0, 1), pt(3, 3), seg(3, 4, 3, 0), pt(4, 4), seg(4, 5, 4, 2)
        ]).unwrap();
        Curve::new(base, r(3), r(2), r(3)).unwrap()
    }

    #[test]
    fn periodic_extension_shifts_by_the_height() {
        let curve = periodic();
        for t in [r(3), q(7, 2), r(4), q(9, 2), q(29, 4), r(100)] {
            let later = &t + &r(2);
            assert_eq!(curve.value_at(&later).unwrap(), &curve.value_at(&t).unwrap() + &r(3));
        }
    }

    #[test]
    fn limits_beyond_the_base_sequence() {
        let curve = periodic();
        // jump at 4 + 2k: left limit 3 + 3k, value 4 + 3k
        assert_eq!(curve.left_limit_at(&r(6)).unwrap(), r(6));
        assert_eq!(curve.value_at(&r(6)).unwrap(), r(7));
        assert_eq!(curve.right_limit_at(&r(6)).unwrap(), r(7));
        assert_eq!(curve.left_limit_at(&r(5)).unwrap(), r(6));
        assert_eq!(curve.left_limit_at(&r(7)).unwrap(), r(9));
        assert!(curve.value_at(&r(-1)).is_err());
        assert!(curve.left_limit_at(&r(0)).is_err());
    }

    #[test]
    fn rejects_a_base_sequence_shorter_than_one_period() {
        let base = Sequence::new(vec![pt(0, 0), seg(0, 1, 0, 1)]).unwrap();
        assert!(matches!(Curve::new(base, r(1), r(1), r(1)), Err(CurveError::InvalidCurve(_))));
    }

    #[test]
    fn rejects_a_height_contradicting_the_base_sequence() {
        let base = Sequence::new(vec![pt(0, 0), seg(0, 1, 0, 1), pt(1, 1), seg(1, 2, 1, 1), pt(2, 2)]).unwrap();
        assert!(matches!(Curve::new(base.clone(), r(0), r(1), r(5)), Err(CurveError::InvalidCurve(_))));
        let curve = Curve::new(base, r(0), r(1), r(1)).unwrap();
        assert_eq!(curve.base_sequence().end_time(), &r(1));
        assert_eq!(curve.value_at(&r(10)).unwrap(), r(10));
    }

    #[test]
    fn cut_spans_several_periods() {
        let window = periodic().cut(&r(2), &r(8), false, true).unwrap();
        assert_eq!(window.start_time(), &r(2));
        assert_eq!(window.end_time(), &r(8));
        assert!(!window.is_left_closed());
        assert!(window.is_right_closed());
        for t in [q(5, 2), r(5), q(11, 2), r(7), r(8)] {
            assert_eq!(window.value_at(&t).unwrap(), periodic().value_at(&t).unwrap());
        }
    }

    #[test]
    fn equivalent_despite_different_periods() {
        let base = Sequence::new(vec![pt(0, 0), seg(0, 1, 0, 1)]).unwrap();
        let short = Curve::new(base, r(0), r(1), r(1)).unwrap();
        let long_base = Sequence::new(vec![pt(0, 0), seg(0, 3, 0, 1)]).unwrap();
        let long = Curve::new(long_base, r(1), r(2), r(2)).unwrap();
        assert_eq!(short, long);
        let steeper = Curve::new(Sequence::new(vec![pt(0, 0), seg(0, 1, 0, 2)]).unwrap(), r(0), r(1), r(2)).unwrap();
        assert_ne!(short, steeper);
    }

    #[test]
    fn serialization_round_trip() {
        let curve = periodic();
        let json = serde_json::to_value(&curve).unwrap();
        assert_eq!(json["type"], "curve");
        assert_eq!(json["pseudoPeriodStart"]["num"], 3);
        assert!(json.get("shape").is_none());
        let back: Curve = serde_json::from_value(json).unwrap();
        assert_eq!(back, curve);
        assert_eq!(back.base_sequence(), curve.base_sequence());
    }

    #[test]
    fn finite_support_is_infinite_elsewhere() {
        let support = Sequence::new(vec![pt(2, 1), seg(2, 3, 1, 1)]).unwrap();
        let curve = Curve::from_finite_support(&support).unwrap();
        assert!(curve.value_at(&r(0)).unwrap().is_plus_infinite());
        assert_eq!(curve.value_at(&r(2)).unwrap(), r(1));
        assert!(curve.value_at(&r(3)).unwrap().is_plus_infinite());
        assert!(curve.value_at(&r(50)).unwrap().is_plus_infinite());
    }
}
