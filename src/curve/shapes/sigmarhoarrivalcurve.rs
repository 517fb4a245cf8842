use crate::curve::curve::Curve;
use crate::curve::curveerror::CurveError;
use crate::curve::curveshape::CurveShape;
use crate::curve::element::element::Element;
use crate::curve::element::point::Point;
use crate::curve::element::segment::Segment;
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

impl Curve {
    /// Token-bucket arrival curve: `0` at the origin, `sigma + rho · t` after.
    pub fn sigma_rho(sigma: Rational, rho: Rational) -> Result<Curve, CurveError> {
        if !sigma.is_finite() || sigma.is_negative() {
            return Err(CurveError::InvalidArgument(format!("burst must be finite and non-negative, got {}", sigma)));
        }
        if !rho.is_finite() || rho.is_negative() {
            return Err(CurveError::InvalidArgument(format!("rate must be finite and non-negative, got {}", rho)));
        }
        // the jump at the origin does not repeat, so the period starts at 1
        let one = Rational::one();
        let two = Rational::from(2);
        let elements = vec![
            Element::Point(Point::origin()),
            Element::Segment(Segment::new(Rational::zero(), two, sigma.clone(), rho.clone())?)
        ];
        let shape = CurveShape::SigmaRho { sigma: sigma.clone(), rho: rho.clone() };
        Ok(Curve::new(Sequence::new(elements)?, one.clone(), one, rho)?.with_shape(shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64) -> Rational {
        Rational::from(n)
    }

    #[test]
    fn bursts_after_the_origin() {
        let alpha = Curve::sigma_rho(r(4), r(2)).unwrap();
        assert_eq!(alpha.value_at(&r(0)).unwrap(), r(0));
        assert_eq!(alpha.right_limit_at(&r(0)).unwrap(), r(4));
        assert_eq!(alpha.value_at(&r(10)).unwrap(), r(24));
        assert!(!alpha.is_continuous());
        assert!(alpha.is_concave());
        assert!(alpha.is_sub_additive());
    }
}
