use crate::curve::curve::Curve;
use crate::curve::curveerror::CurveError;
use crate::curve::curveshape::CurveShape;
use crate::curve::element::element::Element;
use crate::curve::element::point::Point;
use crate::curve::element::segment::Segment;
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

impl Curve {
    /// Rate-latency service curve `β(t) = rate · max(t − latency, 0)`.
    pub fn rate_latency(rate: Rational, latency: Rational) -> Result<Curve, CurveError> {
        if !rate.is_finite() || rate.is_negative() {
            return Err(CurveError::InvalidArgument(format!("rate must be finite and non-negative, got {}", rate)));
        }
        if !latency.is_finite() || latency.is_negative() {
            return Err(CurveError::InvalidArgument(format!("latency must be finite and non-negative, got {}", latency)));
        }
        let zero = Rational::zero();
        let mut elements = vec![Element::Point(Point::origin())];
        if latency.is_positive() {
            elements.push(Element::Segment(Segment::constant(zero.clone(), latency.clone(), zero.clone())?));
            elements.push(Element::Point(Point::new(latency.clone(), zero.clone())?));
        }
        let end = &latency + &Rational::one();
        elements.push(Element::Segment(Segment::new(latency.clone(), end, zero, rate.clone())?));

        let shape = CurveShape::RateLatency { rate: rate.clone(), latency: latency.clone() };
        Ok(Curve::new(Sequence::new(elements)?, latency, Rational::one(), rate)?.with_shape(shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64) -> Rational {
        Rational::from(n)
    }

    #[test]
    fn waits_for_the_latency_then_serves_at_rate() {
        let beta = Curve::rate_latency(r(10), r(5)).unwrap();
        assert_eq!(beta.value_at(&r(0)).unwrap(), r(0));
        assert_eq!(beta.value_at(&r(5)).unwrap(), r(0));
        assert_eq!(beta.value_at(&r(6)).unwrap(), r(10));
        assert_eq!(beta.value_at(&r(15)).unwrap(), r(100));
        assert!(beta.is_convex());
        assert!(beta.is_continuous());
    }

    #[test]
    fn zero_latency_is_a_line_through_the_origin() {
        let beta = Curve::rate_latency(r(3), r(0)).unwrap();
        assert_eq!(beta.value_at(&Rational::new(7, 3).unwrap()).unwrap(), r(7));
        assert_eq!(beta.pseudo_period_start(), &r(0));
    }

    #[test]
    fn negative_rate_is_rejected() {
        assert!(matches!(Curve::rate_latency(r(-1), r(2)), Err(CurveError::InvalidArgument(_))));
    }
}
