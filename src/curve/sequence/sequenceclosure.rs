use crate::configuration::ComputationSettings;
use crate::curve::curveerror::CurveError;
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

impl Sequence {
    /// Sub-additive closure restricted to the sequence's own window `[0, end]`.
    ///
    /// Iterates `g ← g ∧ (g ⊗ g)` from `g = δ0 ∧ self` until two consecutive
    /// iterates are equal. Instants before the sequence start count as `+∞`.
    pub fn sub_additive_closure(&self, settings: &ComputationSettings) -> Result<Sequence, CurveError> {
        if self.start_time().is_negative() {
            return Err(CurveError::InvalidArgument(
                format!("closure of a sequence starting at negative time {}", self.start_time())
            ));
        }
        let zero = Rational::zero();
        if self.start_time().is_zero() && self.is_left_closed() && self.value_at(&zero)?.is_negative() {
            return Err(CurveError::NotImplemented(
                "sub-additive closure of a sequence negative at the origin".to_owned()
            ));
        }
        let end = self.end_time().clone();
        let include_end = self.is_right_closed();
        let mut closure = self.padded_from_origin()?.minimum(&Sequence::delta_zero(&end, include_end)?)?;

        for iteration in 0..settings.max_closure_iterations() {
            let square = closure
                .convolution(&closure, settings)?
                .cut(&zero, &end, true, include_end)?;
            let next = closure.minimum(&square)?;
            if next == closure {
                tracing::debug!(iterations = iteration + 1, "sequence closure reached its fixed point");
                return Ok(closure);
            }
            closure = next;
        }
        Err(CurveError::ClosureDidNotConverge { iterations: settings.max_closure_iterations() })
    }

    /// Dual of `sub_additive_closure`, through negation.
    pub fn super_additive_closure(&self, settings: &ComputationSettings) -> Result<Sequence, CurveError> {
        Ok(self.negate().sub_additive_closure(settings)?.negate())
    }

    /// `0` at the origin, `+∞` elsewhere on `[0, end]`.
    fn delta_zero(end: &Rational, include_end: bool) -> Result<Sequence, CurveError> {
        let zero = Rational::zero();
        if end.is_zero() {
            return Sequence::constant(&zero, &zero, true, true, &zero);
        }
        let origin = Sequence::constant(&zero, &zero, true, true, &zero)?;
        let rest = Sequence::constant(&zero, end, false, include_end, &Rational::plus_infinity())?;
        Sequence::concat([origin, rest])
    }

    /// Same sequence, extended with `+∞` down to time `0`.
    fn padded_from_origin(&self) -> Result<Sequence, CurveError> {
        let zero = Rational::zero();
        if self.start_time().is_zero() && self.is_left_closed() {
            return Ok(self.clone());
        }
        let prefix = Sequence::constant(&zero, self.start_time(), true, !self.is_left_closed(), &Rational::plus_infinity())?;
        Sequence::concat([prefix, self.clone()])
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

    fn pt(t: i64, v: Rational) -> Element {
        Element::Point(Point::new(r(t), v).unwrap())
    }

    fn seg(a: i64, b: i64, v: Rational, s: i64) -> Element {
        Element::Segment(Segment::new(r(a), r(b), v, r(s)).unwrap())
    }

    #[test]
    fn isolated_point_repeats_inside_the_window() {
        let inf = Rational::plus_infinity();
        let s = Sequence::new(vec![
            pt(0, inf.clone()), seg(0, 2, inf.clone(), 0), pt(2, r(1)), seg(2, 5, inf.clone(), 0), pt(5, inf.clone())
        ]).unwrap();
        let closure = s.sub_additive_closure(&ComputationSettings::default()).unwrap();
        assert_eq!(closure.value_at(&r(0)).unwrap(), r(0));
        assert_eq!(closure.value_at(&r(2)).unwrap(), r(1));
        assert_eq!(closure.value_at(&r(4)).unwrap(), r(2));
        assert!(closure.value_at(&r(3)).unwrap().is_plus_infinite());
        assert!(closure.value_at(&r(5)).unwrap().is_plus_infinite());
    }

    #[test]
    fn sub_additive_input_only_gains_the_origin() {
        let s = Sequence::new(vec![pt(0, r(4)), seg(0, 3, r(1), 1)]).unwrap();
        let closure = s.sub_additive_closure(&ComputationSettings::default()).unwrap();
        assert_eq!(closure.elements(), &[pt(0, r(0)), seg(0, 3, r(1), 1)]);
    }

    #[test]
    fn negative_origin_is_not_implemented() {
        let s = Sequence::new(vec![pt(0, r(-1)), seg(0, 1, r(0), 0)]).unwrap();
        assert!(matches!(
            s.sub_additive_closure(&ComputationSettings::default()),
            Err(CurveError::NotImplemented(_))
        ));
    }

    #[test]
    fn iteration_cap_is_reported() {
        let inf = Rational::plus_infinity();
        let s = Sequence::new(vec![pt(0, inf.clone()), seg(0, 1, inf.clone(), 0), pt(1, r(1)), seg(1, 9, inf, 0)]).unwrap();
        let settings = ComputationSettings::default().with_max_closure_iterations(1);
        assert!(matches!(
            s.sub_additive_closure(&settings),
            Err(CurveError::ClosureDidNotConverge { iterations: 1 })
        ));
    }

    #[test]
    fn super_additive_closure_is_the_mirror_image() {
        let s = Sequence::new(vec![pt(0, r(-4)), seg(0, 3, r(-1), -1)]).unwrap();
        let closure = s.super_additive_closure(&ComputationSettings::default()).unwrap();
        assert_eq!(closure.elements(), &[pt(0, r(0)), seg(0, 3, r(-1), -1)]);
    }
}
