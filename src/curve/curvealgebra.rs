use tracing::{
    debug,
    trace
};

use crate::curve::curve::Curve;
use crate::curve::curveerror::CurveError;
use crate::curve::curveshape::CurveShape;
use crate::curve::element::element::Element;
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

/// Pseudo-period `(T, d, c)` shared by the result of a pointwise operator.
struct Periodicity {
    start: Rational,
    length: Rational,
    height: Rational
}

impl Periodicity {
    fn horizon(&self) -> Rational {
        &self.start + &self.length
    }
}

impl Curve {
    pub fn negate(&self) -> Result<Curve, CurveError> {
        Curve::new(
            self.base_sequence().negate(),
            self.pseudo_period_start().clone(),
            self.pseudo_period_length().clone(),
            self.pseudo_period_height().negate()
        )
    }

    /// `f(t) + shift` for a finite `shift`.
    pub fn vertical_shift(&self, shift: &Rational) -> Result<Curve, CurveError> {
        if !shift.is_finite() {
            return Err(CurveError::InvalidArgument("vertical shift must be finite".to_owned()));
        }
        Curve::new(
            self.base_sequence().translated(&Rational::zero(), shift)?,
            self.pseudo_period_start().clone(),
            self.pseudo_period_length().clone(),
            self.pseudo_period_height().clone()
        )
    }

    /// `0` on `[0, delay)`, then `f(t − delay)`.
    pub fn delay_by(&self, delay: &Rational) -> Result<Curve, CurveError> {
        if !delay.is_finite() || delay.is_negative() {
            return Err(CurveError::InvalidArgument(format!("delay must be finite and non-negative, got {}", delay)));
        }
        if delay.is_zero() {
            return Ok(self.clone());
        }
        let zero = Rational::zero();
        let prefix = Sequence::constant(&zero, delay, true, false, &zero)?;
        let shifted = self.base_sequence().translated(delay, &zero)?;
        Curve::new(
            Sequence::concat([prefix, shifted])?,
            self.pseudo_period_start() + delay,
            self.pseudo_period_length().clone(),
            self.pseudo_period_height().clone()
        )
    }

    pub fn addition(&self, other: &Curve) -> Result<Curve, CurveError> {
        debug!(left = %self, right = %other, "curve addition");
        let length = self.pseudo_period_length().lcm(other.pseudo_period_length())?;
        let height = &(self.pseudo_period_height() * &(&length / self.pseudo_period_length()))
            + &(other.pseudo_period_height() * &(&length / other.pseudo_period_length()));
        let periodicity = Periodicity {
            start: self.pseudo_period_start().max(other.pseudo_period_start()),
            length,
            height
        };
        let (left, right) = self.aligned_windows(other, &periodicity)?;
        let sum = Curve::new(left.addition(&right)?, periodicity.start, periodicity.length, periodicity.height)?
            .optimize()?;
        Ok(if self.shape().guarantees_concave() && other.shape().guarantees_concave() {
            sum.with_shape(CurveShape::Concave)
        } else if self.shape().guarantees_convex() && other.shape().guarantees_convex() {
            sum.with_shape(CurveShape::Convex)
        } else {
            sum
        })
    }

    /// `self − other`. With `non_negative` the result is `max(self − other, 0)`.
    pub fn subtraction(&self, other: &Curve, non_negative: bool) -> Result<Curve, CurveError> {
        debug!(left = %self, right = %other, non_negative, "curve subtraction");
        let difference = self.addition(&other.negate()?)?;
        if non_negative {
            difference.maximum(&Curve::zero()?)
        } else {
            Ok(difference)
        }
    }

    pub fn minimum(&self, other: &Curve) -> Result<Curve, CurveError> {
        debug!(left = %self, right = %other, "curve minimum");
        let periodicity = self.minimum_periodicity(other)?;
        trace!(start = %periodicity.start, length = %periodicity.length, "minimum window");
        let (left, right) = self.aligned_windows(other, &periodicity)?;
        let min = Curve::new(left.minimum(&right)?, periodicity.start, periodicity.length, periodicity.height)?
            .optimize()?;
        let both_concave = self.shape().guarantees_concave() && other.shape().guarantees_concave();
        Ok(if both_concave { min.with_shape(CurveShape::Concave) } else { min })
    }

    pub fn maximum(&self, other: &Curve) -> Result<Curve, CurveError> {
        debug!(left = %self, right = %other, "curve maximum");
        let max = self.negate()?.minimum(&other.negate()?)?.negate()?;
        let both_convex = self.shape().guarantees_convex() && other.shape().guarantees_convex();
        Ok(if both_convex { max.with_shape(CurveShape::Convex) } else { max })
    }

    fn aligned_windows(&self, other: &Curve, periodicity: &Periodicity) -> Result<(Sequence, Sequence), CurveError> {
        let zero = Rational::zero();
        let horizon = periodicity.horizon();
        Ok((self.cut(&zero, &horizon, true, false)?, other.cut(&zero, &horizon, true, false)?))
    }

    /// Once both curves are periodic, the one with the lower rate stays below
    /// for good after the instant where its highest excursion above its trend
    /// line meets the lowest excursion of the other.
    fn minimum_periodicity(&self, other: &Curve) -> Result<Periodicity, CurveError> {
        let start = self.pseudo_period_start().max(other.pseudo_period_start());
        let keep = |curve: &Curve, start: Rational| Periodicity {
            start,
            length: curve.pseudo_period_length().clone(),
            height: curve.pseudo_period_height().clone()
        };
        if self.is_ultimately_plus_infinite() {
            return Ok(keep(other, start));
        }
        if other.is_ultimately_plus_infinite() || self.is_ultimately_minus_infinite() {
            return Ok(keep(self, start));
        }
        if other.is_ultimately_minus_infinite() {
            return Ok(keep(other, start));
        }

        let self_rate = self.pseudo_period_slope();
        let other_rate = other.pseudo_period_slope();
        if self_rate == other_rate {
            let length = self.pseudo_period_length().lcm(other.pseudo_period_length())?;
            let height = &self_rate * &length;
            return Ok(Periodicity { start, length, height });
        }

        let (low, high) = if self_rate < other_rate { (self, other) } else { (other, self) };
        let low_rate = low.pseudo_period_slope();
        let high_rate = high.pseudo_period_slope();
        let common = low.pseudo_period_length().lcm(high.pseudo_period_length())?;
        if !low.covers_support_of(high, &common)? {
            return Err(CurveError::InvalidOperation(
                "minimum is not ultimately pseudo-periodic: the steeper curve is finite where the flatter one is +∞".to_owned()
            ));
        }
        let crossing = match (low.period_deviation(&low_rate, true)?, high.period_deviation(&high_rate, false)?) {
            (Some(highest), Some(lowest)) => Rational::max(&start, &((&highest - &lowest) / (&high_rate - &low_rate))),
            _ => start
        };
        if high.period_contains(Element::is_minus_infinite)? {
            let height = &low_rate * &common;
            return Ok(Periodicity { start: crossing, length: common, height });
        }
        Ok(keep(low, crossing))
    }

    fn period_contains(&self, predicate: impl Fn(&Element) -> bool) -> Result<bool, CurveError> {
        Ok(self.period_sequence()?.elements().iter().any(predicate))
    }

    /// Whether, once both curves repeat, `other` is infinite wherever `self`
    /// is `+∞`.
    /// Both patterns of infinities repeat every `length`, so one window of
    /// that length after both pseudo-period starts decides it.
    fn covers_support_of(&self, other: &Curve, length: &Rational) -> Result<bool, CurveError> {
        let start = self.pseudo_period_start().max(other.pseudo_period_start());
        let end = &start + length;
        let own = self.cut(&start, &end, true, false)?;
        let others = other.cut(&start, &end, true, false)?;
        let mut times = own.breakpoints();
        times.extend(others.breakpoints());
        times.sort();
        times.dedup();
        let two = Rational::from(2);
        let midpoints: Vec<Rational> = times.windows(2).map(|pair| &(&pair[0] + &pair[1]) / &two).collect();
        for t in times.iter().chain(midpoints.iter()).filter(|t| **t < end) {
            if own.value_at(t)?.is_plus_infinite() && others.value_at(t)?.is_finite() {
                trace!(at = %t, "finite value under a +∞ gap");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Extreme of `f(t) − rate·t` over one closed period, skipping infinite values.
    pub(crate) fn period_deviation(&self, rate: &Rational, highest: bool) -> Result<Option<Rational>, CurveError> {
        let period = self.cut(self.pseudo_period_start(), &self.pseudo_period_end(), true, true)?;
        let mut extreme: Option<Rational> = None;
        for element in period.elements() {
            let samples = match element {
                Element::Point(p) => vec![(p.time().clone(), p.value().clone())],
                Element::Segment(s) => vec![
                    (s.start_time().clone(), s.right_limit_at_start_time().clone()),
                    (s.end_time().clone(), s.left_limit_at_end_time()?)
                ]
            };
            for (t, value) in samples {
                if !value.is_finite() {
                    continue;
                }
                let deviation = &value - &(rate * &t);
                extreme = Some(match extreme {
                    None => deviation,
                    Some(current) if highest => Rational::max(&current, &deviation),
                    Some(current) => Rational::min(&current, &deviation)
                });
            }
        }
        Ok(extreme)
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

    fn seg(a: i64, b: i64, v: i64, s: i64) -> Element {
        Element::Segment(Segment::new(r(a), r(b), r(v), r(s)).unwrap())
    }

    fn pt(t: i64, v: i64) -> Element {
        Element::Point(Point::new(r(t), r(v)).unwrap())
    }

    fn affine(offset: i64, slope: i64) -> Curve {
        Curve::new(Sequence::new(vec![pt(0, offset), seg(0, 1, offset, slope)]).unwrap(), r(0), r(1), r(slope)).unwrap()
    }

    #[test]
    fn addition_of_periodic_curves_uses_the_common_period() {
        let staircase = Curve::new(Sequence::new(vec![pt(0, 0), seg(0, 2, 1, 0)]).unwrap(), r(0), r(2), r(1)).unwrap();
        let comb = Curve::new(Sequence::new(vec![pt(0, 0), seg(0, 3, 2, 0)]).unwrap(), r(0), r(3), r(2)).unwrap();
        let sum = staircase.addition(&comb).unwrap();
        for t in [0, 1, 2, 3, 5, 6, 7, 13] {
            let expected = staircase.value_at(&r(t)).unwrap() + comb.value_at(&r(t)).unwrap();
            assert_eq!(sum.value_at(&r(t)).unwrap(), expected);
        }
        assert_eq!(sum.pseudo_period_slope(), Rational::new(7, 6).unwrap());
    }

    #[test]
    fn minimum_with_a_late_crossing() {
        // 10 + t against 3t: they cross at t = 5
        let slow = affine(10, 1);
        let fast = affine(0, 3);
        let min = slow.minimum(&fast).unwrap();
        assert_eq!(min.value_at(&r(2)).unwrap(), r(6));
        assert_eq!(min.value_at(&r(5)).unwrap(), r(15));
        assert_eq!(min.value_at(&r(100)).unwrap(), r(110));
        assert_eq!(min.pseudo_period_slope(), r(1));
    }

    #[test]
    fn maximum_is_the_mirror_of_minimum() {
        let max = affine(10, 1).maximum(&affine(0, 3)).unwrap();
        assert_eq!(max.value_at(&r(2)).unwrap(), r(12));
        assert_eq!(max.value_at(&r(10)).unwrap(), r(30));
    }

    #[test]
    fn non_negative_subtraction() {
        let diff = affine(0, 1).subtraction(&affine(4, 0), true).unwrap();
        assert_eq!(diff.value_at(&r(2)).unwrap(), r(0));
        assert_eq!(diff.value_at(&r(6)).unwrap(), r(2));
        let raw = affine(0, 1).subtraction(&affine(4, 0), false).unwrap();
        assert_eq!(raw.value_at(&r(2)).unwrap(), r(-2));
    }

    #[test]
    fn delay_and_shift() {
        let delayed = affine(0, 2).delay_by(&r(3)).unwrap();
        assert_eq!(delayed.value_at(&r(2)).unwrap(), r(0));
        assert_eq!(delayed.value_at(&r(5)).unwrap(), r(4));
        let shifted = affine(0, 2).vertical_shift(&r(-1)).unwrap();
        assert_eq!(shifted.value_at(&r(1)).unwrap(), r(1));
        assert!(affine(0, 1).vertical_shift(&Rational::plus_infinity()).is_err());
    }

    #[test]
    fn minimum_with_an_infinite_tail_keeps_the_other_period() {
        let inf = Rational::plus_infinity();
        let truncated = Curve::new(
            Sequence::new(vec![
                pt(0, 0), seg(0, 2, 0, 0), Element::Point(Point::new(r(2), inf.clone()).unwrap()),
                Element::Segment(Segment::new(r(2), r(3), inf, r(0)).unwrap())
            ]).unwrap(),
            r(2), r(1), r(0)
        ).unwrap();
        let min = truncated.minimum(&affine(1, 1)).unwrap();
        assert_eq!(min.value_at(&r(1)).unwrap(), r(0));
        assert_eq!(min.value_at(&r(7)).unwrap(), r(8));
    }

    #[test]
    fn minimum_of_combs_with_nested_supports() {
        // integers at rate 1 against even integers at rate 3/2
        let dense = Point::new(r(1), r(1)).unwrap().sub_additive_closure().unwrap();
        let sparse = Point::new(r(2), r(3)).unwrap().sub_additive_closure().unwrap();
        let min = dense.minimum(&sparse).unwrap();
        assert_eq!(min, dense);
        assert_eq!(min.value_at(&r(6)).unwrap(), r(6));
        assert!(min.value_at(&Rational::new(1, 2).unwrap()).unwrap().is_plus_infinite());
        assert_eq!(sparse.minimum(&dense).unwrap(), dense);
    }

    #[test]
    fn minimum_filling_gaps_of_a_flatter_comb_is_rejected() {
        let comb = Point::new(r(1), r(1)).unwrap().sub_additive_closure().unwrap();
        let result = comb.minimum(&affine(0, 2));
        assert!(matches!(result, Err(CurveError::InvalidOperation(_))));
    }
}
