use tracing::{
    debug,
    trace
};

use crate::configuration::ComputationSettings;
use crate::curve::curve::Curve;
use crate::curve::curveerror::CurveError;
use crate::curve::element::element::Element;
use crate::curve::element::point::Point;
use crate::curve::element::segment::Segment;
use crate::curve::sequence::envelope::lower_envelope;
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

impl Point {
    /// Closure of the function that is `value` at `time` and `+∞` elsewhere:
    /// `k · value` at every `k · time`, `+∞` in between.
    pub fn sub_additive_closure(&self) -> Result<Curve, CurveError> {
        if self.is_minus_infinite() || (self.time().is_zero() && self.value().is_negative()) {
            return Err(CurveError::NotImplemented(format!(
                "sub-additive closure of the point ({}, {})", self.time(), self.value()
            )));
        }
        if self.is_plus_infinite() || self.time().is_zero() {
            return Curve::delta_zero();
        }
        let base = Sequence::new(vec![
            Element::Point(Point::origin()),
            Element::Segment(Segment::constant(Rational::zero(), self.time().clone(), Rational::plus_infinity())?)
        ])?;
        Curve::new(base, Rational::zero(), self.time().clone(), self.value().clone())
    }
}

impl Segment {
    /// Closure of the function that follows this segment on its open
    /// interval and is `+∞` elsewhere.
    ///
    /// The `n`-fold self-convolution is the same line over `(n·a, n·b)`.
    /// From `n0 = ⌊a / (b − a)⌋ + 1` on, consecutive copies overlap, and the
    /// cheapest copy at a given instant is either the first one reaching it or
    /// the last one started, depending on the sign of `r − s·a`.
    pub fn sub_additive_closure(&self) -> Result<Curve, CurveError> {
        if self.is_minus_infinite() {
            return Err(CurveError::NotImplemented("sub-additive closure of a segment at −∞".to_owned()));
        }
        if self.is_plus_infinite() {
            return Curve::delta_zero();
        }
        let zero = Rational::zero();
        let (a, b) = (self.start_time(), self.end_time());
        let (r, s) = (self.right_limit_at_start_time(), self.slope());

        if a.is_zero() && r.is_negative() {
            let base = Sequence::concat([
                Sequence::constant(&zero, &zero, true, true, &zero)?,
                Sequence::constant(&zero, &Rational::from(2), false, false, &Rational::minus_infinity())?
            ])?;
            return Curve::new(base, Rational::one(), Rational::one(), zero);
        }

        let overlap_from = (a / &(b - a)).floor() + Rational::one();
        let offset = r - &(s * a);
        let (start, length, height) = if !offset.is_negative() {
            (&overlap_from * b, b.clone(), r + &(s * &(b - a)))
        } else {
            (&(&overlap_from + &Rational::one()) * a, a.clone(), r.clone())
        };
        let horizon = &start + &length;
        trace!(overlap_from = %overlap_from, start = %start, length = %length, "segment closure");

        let last_copy = &overlap_from + &Rational::from(2);
        let mut elements = vec![Element::Point(Point::origin())];
        let mut n = Rational::one();
        while n <= last_copy {
            let copy = Segment::new(&n * a, &n * b, &n * r, s.clone())?;
            if copy.start_time() >= &horizon {
                break;
            }
            elements.push(Element::Segment(copy));
            n = n + Rational::one();
        }
        let envelope = Sequence::new(lower_envelope(&elements)?)?;
        let end = envelope.end_time().clone();
        let base = if end < horizon {
            let gap = Sequence::constant(&end, &horizon, !envelope.is_right_closed(), false, &Rational::plus_infinity())?;
            Sequence::concat([envelope, gap])?
        } else {
            envelope.cut(&zero, &horizon, true, false)?
        };
        Curve::new(base, start, length, height)?.optimize()
    }
}

impl Element {
    pub fn sub_additive_closure(&self) -> Result<Curve, CurveError> {
        match self {
            Element::Point(p) => p.sub_additive_closure(),
            Element::Segment(s) => s.sub_additive_closure()
        }
    }
}

impl Curve {
    /// Smallest sub-additive curve below `f` and zero at the origin,
    /// `δ0 ∧ f ∧ f⊗f ∧ …`.
    ///
    /// A curve is the minimum of its transient elements and of its first
    /// period `p` repeated by `(d, c)`. The closure of a minimum is the
    /// convolution of the closures, and the repeated period closes to
    /// `δ0 ∧ p ⊗ p* ⊗ (d, c)*`.
    pub fn sub_additive_closure(&self, settings: Option<&ComputationSettings>) -> Result<Curve, CurveError> {
        debug!(curve = %self, "curve sub-additive closure");
        let settings = settings.cloned().unwrap_or_default();
        let zero = Rational::zero();
        if self.value_at(&zero)?.is_negative() {
            return Err(CurveError::NotImplemented("sub-additive closure of a curve negative at the origin".to_owned()));
        }
        let delta = Curve::delta_zero()?;
        if settings.use_shape_fast_paths() && self.is_sub_additive() {
            trace!("curve is already sub-additive");
            return self.minimum(&delta);
        }

        let mut closure = delta.clone();
        if self.pseudo_period_start().is_positive() {
            let transient = self.cut(&zero, self.pseudo_period_start(), true, false)?;
            // the origin point closes to δ0
            for element in transient.elements().iter().skip(1) {
                closure = closure.convolution_with(&element.sub_additive_closure()?, &settings)?;
            }
        }

        let period = self.cut(self.pseudo_period_start(), &self.pseudo_period_end(), true, false)?;
        let mut period_closure = delta.clone();
        for element in period.elements() {
            period_closure = period_closure.convolution_with(&element.sub_additive_closure()?, &settings)?;
        }
        let step = Point::new(self.pseudo_period_length().clone(), self.pseudo_period_height().clone())?
            .sub_additive_closure()?;
        let repeated = Curve::from_finite_support(&period)?
            .convolution_with(&period_closure, &settings)?
            .convolution_with(&step, &settings)?;
        let tail = delta.minimum(&repeated)?;
        closure.convolution_with(&tail, &settings)?.optimize()
    }

    /// Largest super-additive curve above `f` and zero at the origin, through
    /// negation.
    pub fn super_additive_closure(&self, settings: Option<&ComputationSettings>) -> Result<Curve, CurveError> {
        debug!(curve = %self, "curve super-additive closure");
        self.negate()?.sub_additive_closure(settings)?.negate()
    }
}
