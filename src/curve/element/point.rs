use serde::{
    Deserialize,
    Serialize
};

use crate::curve::curveerror::CurveError;
use crate::numbers::rational::Rational;

/// A single sample `(time, value)` of a piecewise-affine function.
///
/// `time` is always finite; `value` may be `±∞`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PointRecord")]
pub struct Point {
    time: Rational,
    value: Rational
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointRecord {
    time: Rational,
    value: Rational
}

impl TryFrom<PointRecord> for Point {
    type Error = CurveError;

    fn try_from(record: PointRecord) -> Result<Self, Self::Error> {
        Point::new(record.time, record.value)
    }
}

impl Point {
    pub fn new(time: Rational, value: Rational) -> Result<Point, CurveError> {
        if !time.is_finite() {
            return Err(CurveError::InvalidElement(format!("point time must be finite, got {}", time)));
        }
        Ok(Point { time, value })
    }

    /// Caller guarantees a finite `time`.
    pub(crate) fn unchecked(time: Rational, value: Rational) -> Point {
        Point { time, value }
    }

    pub fn origin() -> Point {
        Point::unchecked(Rational::zero(), Rational::zero())
    }

    pub fn time(&self) -> &Rational {
        &self.time
    }

    pub fn value(&self) -> &Rational {
        &self.value
    }

    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }

    pub fn is_plus_infinite(&self) -> bool {
        self.value.is_plus_infinite()
    }

    pub fn is_minus_infinite(&self) -> bool {
        self.value.is_minus_infinite()
    }

    pub fn translated(&self, time_shift: &Rational, value_shift: &Rational) -> Result<Point, CurveError> {
        Point::new(self.time.checked_add(time_shift)?, self.value.checked_add(value_shift)?)
    }

    pub fn negate(&self) -> Point {
        Point::unchecked(self.time.clone(), self.value.negate())
    }

    pub fn with_value(&self, value: Rational) -> Point {
        Point::unchecked(self.time.clone(), value)
    }
}
