use tracing::trace;

use crate::curve::curve::Curve;
use crate::curve::curveerror::CurveError;
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

impl Curve {
    /// Same function with the shortest pseudo-period and the earliest
    /// pseudo-period start that can be found from the representation.
    ///
    /// The period is first divided by the largest `k` for which one period
    /// is made of `k` identical, vertically shifted copies. The start is then
    /// moved back past every breakpoint where the prefix already repeats.
    pub fn optimize(&self) -> Result<Curve, CurveError> {
        let mut curve = self.reduce_period()?;
        curve = curve.reduce_start()?;
        let base = curve.base_sequence().optimize()?;
        let optimized = Curve::new(
            base,
            curve.pseudo_period_start().clone(),
            curve.pseudo_period_length().clone(),
            curve.pseudo_period_height().clone()
        )?;
        trace!(before = %self, after = %optimized, "optimized pseudo-period");
        Ok(optimized.with_shape(self.shape().clone()))
    }

    fn reduce_period(&self) -> Result<Curve, CurveError> {
        let period = self.period_sequence()?.optimize()?;
        let points = period.elements().iter().filter(|e| e.is_point()).count();
        let start = self.pseudo_period_start();
        let end = self.pseudo_period_end();
        for k in (2..=points).rev() {
            if points % k != 0 {
                continue;
            }
            let divisor = Rational::from(k as u64);
            let length = self.pseudo_period_length() / &divisor;
            let height = self.pseudo_period_height() / &divisor;
            let shifted = self.cut(start, &(&end - &length), true, false)?
                .translated(&length, &height)?
                .optimize()?;
            let reference = self.cut(&(start + &length), &end, true, false)?.optimize()?;
            if shifted == reference {
                let base = self.cut(&Rational::zero(), &(start + &length), true, false)?;
                return Curve::new(base, start.clone(), length, height);
            }
        }
        Ok(self.clone())
    }

    fn reduce_start(&self) -> Result<Curve, CurveError> {
        let start = self.pseudo_period_start();
        if start.is_zero() {
            return Ok(self.clone());
        }
        let zero = Rational::zero();
        let length = self.pseudo_period_length();
        let prefix = self.cut(&zero, start, true, false)?;
        let next_period = self.cut(length, &(start + length), true, false)?
            .translated(&length.negate(), &self.pseudo_period_height().negate())?;

        let mut breakpoints = prefix.breakpoints();
        breakpoints.extend(next_period.breakpoints());
        breakpoints.retain(|t| t < start);
        breakpoints.sort();
        breakpoints.dedup();

        let mut new_start = start.clone();
        for t in breakpoints.iter().rev() {
            if !agree_after(&prefix, &next_period, t)? || prefix.value_at(t)? != next_period.value_at(t)? {
                break;
            }
            new_start = t.clone();
        }
        if &new_start == start {
            return Ok(self.clone());
        }
        let base = self.cut(&zero, &(&new_start + length), true, false)?;
        Curve::new(base, new_start, length.clone(), self.pseudo_period_height().clone())
    }
}

/// `true` when both sequences follow the same line just after `t`.
fn agree_after(a: &Sequence, b: &Sequence, t: &Rational) -> Result<bool, CurveError> {
    match (a.segment_after(t), b.segment_after(t)) {
        (Some(x), Some(y)) => Ok(x.line_value_at(t)? == y.line_value_at(t)? && x.slope() == y.slope()),
        _ => Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::element::element::Element;
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

    #[test]
    fn period_made_of_repeated_steps_is_divided() {
        // staircase of step 1 described with a period of 3
        let base = Sequence::new(vec![
            pt(0, 0), seg(0, 1, 1, 0), pt(1, 1), seg(1, 2, 2, 0), pt(2, 2), seg(2, 3, 3, 0)
        ]).unwrap();
        let curve = Curve::new(base, r(0), r(3), r(3)).unwrap();
        let optimized = curve.optimize().unwrap();
        assert_eq!(optimized.pseudo_period_length(), &r(1));
        assert_eq!(optimized.pseudo_period_height(), &r(1));
        assert_eq!(optimized, curve);
    }

    #[test]
    fn start_moves_back_over_a_repeating_prefix() {
        let base = Sequence::new(vec![pt(0, 0), seg(0, 5, 0, 2)]).unwrap();
        let curve = Curve::new(base, r(4), r(1), r(2)).unwrap();
        let optimized = curve.optimize().unwrap();
        assert_eq!(optimized.pseudo_period_start(), &r(0));
        assert_eq!(optimized.base_sequence().elements(), &[pt(0, 0), seg(0, 1, 0, 2)]);
    }

    #[test]
    fn latency_prefix_is_kept() {
        let base = Sequence::new(vec![pt(0, 0), seg(0, 3, 0, 0), pt(3, 0), seg(3, 6, 0, 1)]).unwrap();
        let curve = Curve::new(base, r(5), r(1), r(1)).unwrap();
        let optimized = curve.optimize().unwrap();
        assert_eq!(optimized.pseudo_period_start(), &r(3));
        assert_eq!(optimized.value_at(&r(10)).unwrap(), r(7));
    }
}
