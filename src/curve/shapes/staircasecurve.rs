use crate::curve::curve::Curve;
use crate::curve::curveerror::CurveError;
use crate::curve::curveshape::CurveShape;
use crate::curve::element::element::Element;
use crate::curve::element::point::Point;
use crate::curve::element::segment::Segment;
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

impl Curve {
    /// `height · ⌈t / period⌉`, one step at the start of every period.
    pub fn staircase(height: Rational, period: Rational) -> Result<Curve, CurveError> {
        if !height.is_finite() || height.is_negative() {
            return Err(CurveError::InvalidArgument(format!("step height must be finite and non-negative, got {}", height)));
        }
        if !period.is_finite() || !period.is_positive() {
            return Err(CurveError::InvalidArgument(format!("step period must be finite and positive, got {}", period)));
        }
        let elements = vec![
            Element::Point(Point::origin()),
            Element::Segment(Segment::constant(Rational::zero(), period.clone(), height.clone())?)
        ];
        let shape = CurveShape::Staircase { height: height.clone(), period: period.clone() };
        Ok(Curve::new(Sequence::new(elements)?, Rational::zero(), period, height)?.with_shape(shape))
    }
}
