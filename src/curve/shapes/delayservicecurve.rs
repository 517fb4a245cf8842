use crate::curve::curve::Curve;
use crate::curve::curveerror::CurveError;
use crate::curve::curveshape::CurveShape;
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

impl Curve {
    /// Pure delay `δ_T`: `0` up to and including `delay`, `+∞` after.
    pub fn delay(delay: Rational) -> Result<Curve, CurveError> {
        if !delay.is_finite() || delay.is_negative() {
            return Err(CurveError::InvalidArgument(format!("delay must be finite and non-negative, got {}", delay)));
        }
        let zero = Rational::zero();
        let start = &delay + &Rational::one();
        let horizon = &delay + &Rational::from(2);
        let base = Sequence::concat([
            Sequence::constant(&zero, &delay, true, true, &zero)?,
            Sequence::constant(&delay, &horizon, false, false, &Rational::plus_infinity())?
        ])?;
        let shape = CurveShape::Delay { delay };
        Ok(Curve::new(base, start, Rational::one(), zero)?.with_shape(shape))
    }

    /// `δ_0`, the neutral element of min-plus convolution.
    pub fn delta_zero() -> Result<Curve, CurveError> {
        Curve::delay(Rational::zero())
    }
}
