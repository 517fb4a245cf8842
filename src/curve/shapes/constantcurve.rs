use crate::curve::curve::Curve;
use crate::curve::curveerror::CurveError;
use crate::curve::curveshape::CurveShape;
use crate::curve::element::element::Element;
use crate::curve::element::point::Point;
use crate::curve::element::segment::Segment;
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

impl Curve {
    /// `f(t) = value` everywhere, including the origin.
    pub fn constant(value: Rational) -> Result<Curve, CurveError> {
        if !value.is_finite() {
            return Err(CurveError::InvalidArgument("constant curve must be finite".to_owned()));
        }
        let shape = CurveShape::Constant { value: value.clone() };
        Ok(Curve::flat(value)?.with_shape(shape))
    }

    pub fn zero() -> Result<Curve, CurveError> {
        Curve::constant(Rational::zero())
    }

    pub fn plus_infinite() -> Result<Curve, CurveError> {
        Curve::flat(Rational::plus_infinity())
    }

    pub fn minus_infinite() -> Result<Curve, CurveError> {
        Curve::flat(Rational::minus_infinity())
    }

    /// `f(t) = value + slope · t`, continuous at the origin.
    pub fn affine(value: Rational, slope: Rational) -> Result<Curve, CurveError> {
        let elements = vec![
            Element::Point(Point::new(Rational::zero(), value.clone())?),
            Element::Segment(Segment::new(Rational::zero(), Rational::one(), value, slope.clone())?)
        ];
        Curve::new(Sequence::new(elements)?, Rational::zero(), Rational::one(), slope)
    }

    fn flat(value: Rational) -> Result<Curve, CurveError> {
        let base = Sequence::constant(&Rational::zero(), &Rational::one(), true, false, &value)?;
        Curve::new(base, Rational::zero(), Rational::one(), Rational::zero())
    }

    /// Tags a curve that is checked to be concave, enabling the concave fast paths.
    pub fn as_concave(self) -> Result<Curve, CurveError> {
        self.with_verified_shape(CurveShape::Concave)
    }

    /// Tags a curve that is checked to be convex.
    pub fn as_convex(self) -> Result<Curve, CurveError> {
        self.with_verified_shape(CurveShape::Convex)
    }
}
