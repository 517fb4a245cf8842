use serde::{
    Deserialize,
    Serialize
};

use crate::curve::curveerror::CurveError;
use crate::numbers::rational::Rational;

/// Affine piece on the open interval `(start_time, end_time)`.
///
/// The value at `t` is `right_limit_at_start_time + slope · (t − start_time)`.
/// A segment whose right limit is `±∞` is constant at that infinity, so its
/// slope is stored as `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SegmentRecord")]
pub struct Segment {
    start_time: Rational,
    end_time: Rational,
    right_limit_at_start_time: Rational,
    slope: Rational
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentRecord {
    start_time: Rational,
    end_time: Rational,
    right_limit_at_start_time: Rational,
    slope: Rational
}

impl TryFrom<SegmentRecord> for Segment {
    type Error = CurveError;

    fn try_from(record: SegmentRecord) -> Result<Self, Self::Error> {
        Segment::new(record.start_time, record.end_time, record.right_limit_at_start_time, record.slope)
    }
}

impl Segment {
    pub fn new(start_time: Rational,
               end_time: Rational,
               right_limit_at_start_time: Rational,
               slope: Rational) -> Result<Segment, CurveError> {
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(CurveError::InvalidElement("segment bounds must be finite".to_owned()));
        }
        if start_time >= end_time {
            return Err(CurveError::InvalidElement(
                format!("segment start {} is not before its end {}", start_time, end_time)
            ));
        }
        if !slope.is_finite() {
            return Err(CurveError::InvalidElement("segment slope must be finite".to_owned()));
        }
        Ok(Segment::unchecked(start_time, end_time, right_limit_at_start_time, slope))
    }

    /// Caller guarantees finite bounds with `start_time < end_time` and a finite slope.
    pub(crate) fn unchecked(start_time: Rational,
                            end_time: Rational,
                            right_limit_at_start_time: Rational,
                            slope: Rational) -> Segment {
        let slope = if right_limit_at_start_time.is_infinite() { Rational::zero() } else { slope };
        Segment { start_time, end_time, right_limit_at_start_time, slope }
    }

    pub fn constant(start_time: Rational, end_time: Rational, value: Rational) -> Result<Segment, CurveError> {
        Segment::new(start_time, end_time, value, Rational::zero())
    }

    pub fn start_time(&self) -> &Rational {
        &self.start_time
    }

    pub fn end_time(&self) -> &Rational {
        &self.end_time
    }

    pub fn right_limit_at_start_time(&self) -> &Rational {
        &self.right_limit_at_start_time
    }

    pub fn slope(&self) -> &Rational {
        &self.slope
    }

    pub fn length(&self) -> Rational {
        &self.end_time - &self.start_time
    }

    pub fn is_finite(&self) -> bool {
        self.right_limit_at_start_time.is_finite()
    }

    pub fn is_plus_infinite(&self) -> bool {
        self.right_limit_at_start_time.is_plus_infinite()
    }

    pub fn is_minus_infinite(&self) -> bool {
        self.right_limit_at_start_time.is_minus_infinite()
    }

    pub fn is_constant(&self) -> bool {
        self.slope.is_zero()
    }

    pub fn contains(&self, t: &Rational) -> bool {
        t > &self.start_time && t < &self.end_time
    }

    /// Value of the supporting line at `t`; also valid at the two endpoints,
    /// where it gives the one-sided limits.
    pub fn line_value_at(&self, t: &Rational) -> Result<Rational, CurveError> {
        if self.right_limit_at_start_time.is_infinite() {
            return Ok(self.right_limit_at_start_time.clone());
        }
        let elapsed = t.checked_sub(&self.start_time)?;
        Ok(self.right_limit_at_start_time.checked_add(&self.slope.checked_mul(&elapsed)?)?)
    }

    pub fn value_at(&self, t: &Rational) -> Result<Rational, CurveError> {
        if !self.contains(t) {
            return Err(CurveError::InvalidArgument(
                format!("time {} outside segment ({}, {})", t, self.start_time, self.end_time)
            ));
        }
        self.line_value_at(t)
    }

    pub fn left_limit_at_end_time(&self) -> Result<Rational, CurveError> {
        self.line_value_at(&self.end_time)
    }

    pub fn translated(&self, time_shift: &Rational, value_shift: &Rational) -> Result<Segment, CurveError> {
        Segment::new(
            self.start_time.checked_add(time_shift)?,
            self.end_time.checked_add(time_shift)?,
            self.right_limit_at_start_time.checked_add(value_shift)?,
            self.slope.clone()
        )
    }

    pub fn negate(&self) -> Segment {
        Segment::unchecked(
            self.start_time.clone(),
            self.end_time.clone(),
            self.right_limit_at_start_time.negate(),
            self.slope.negate()
        )
    }

    /// Restriction to `(from, to)`, which must lie within the segment's closure.
    pub fn restricted(&self, from: &Rational, to: &Rational) -> Result<Segment, CurveError> {
        if from < &self.start_time || to > &self.end_time {
            return Err(CurveError::InvalidArgument(
                format!("({}, {}) is not inside ({}, {})", from, to, self.start_time, self.end_time)
            ));
        }
        Segment::new(from.clone(), to.clone(), self.line_value_at(from)?, self.slope.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64) -> Rational {
        Rational::from(n)
    }

    #[test]
    fn evaluates_inside_and_at_limits() {
        let s = Segment::new(r(2), r(6), r(1), Rational::new(1, 2).unwrap()).unwrap();
        assert_eq!(s.value_at(&r(4)).unwrap(), r(2));
        assert_eq!(s.left_limit_at_end_time().unwrap(), r(3));
        assert!(s.value_at(&r(2)).is_err());
        assert!(s.value_at(&r(6)).is_err());
    }

    #[test]
    fn infinite_segments_are_flat() {
        let s = Segment::new(r(0), r(1), Rational::plus_infinity(), r(7)).unwrap();
        assert!(s.slope().is_zero());
        assert!(s.left_limit_at_end_time().unwrap().is_plus_infinite());
    }

    #[test]
    fn rejects_empty_or_reversed_bounds() {
        assert!(Segment::new(r(1), r(1), r(0), r(0)).is_err());
        assert!(Segment::new(r(2), r(1), r(0), r(0)).is_err());
    }

    #[test]
    fn restriction_recomputes_the_right_limit() {
        let s = Segment::new(r(0), r(10), r(0), r(2)).unwrap();
        let t = s.restricted(&r(3), &r(5)).unwrap();
        assert_eq!(t.right_limit_at_start_time(), &r(6));
        assert_eq!(t.length(), r(2));
    }
}
