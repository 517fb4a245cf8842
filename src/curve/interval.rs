use crate::curve::curveerror::CurveError;
use crate::numbers::rational::Rational;

/// Time range with independently open or closed ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    start: Rational,
    end: Rational,
    start_included: bool,
    end_included: bool
}

impl Interval {
    pub fn new(start: Rational,
               end: Rational,
               start_included: bool,
               end_included: bool) -> Result<Interval, CurveError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(CurveError::InvalidArgument("interval bounds must be finite".to_owned()));
        }
        if start > end || (start == end && !(start_included && end_included)) {
            return Err(CurveError::InvalidArgument(format!("empty interval between {} and {}", start, end)));
        }
        Ok(Interval { start, end, start_included, end_included })
    }

    pub fn point(t: Rational) -> Result<Interval, CurveError> {
        Interval::new(t.clone(), t, true, true)
    }

    pub fn start(&self) -> &Rational {
        &self.start
    }

    pub fn end(&self) -> &Rational {
        &self.end
    }

    pub fn start_included(&self) -> bool {
        self.start_included
    }

    pub fn end_included(&self) -> bool {
        self.end_included
    }

    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    pub fn length(&self) -> Rational {
        &self.end - &self.start
    }

    pub fn contains(&self, t: &Rational) -> bool {
        let after_start = t > &self.start || (t == &self.start && self.start_included);
        let before_end = t < &self.end || (t == &self.end && self.end_included);
        after_start && before_end
    }

    /// `None` when the two ranges share no instant.
    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        let (start, start_included) = if self.start > other.start {
            (self.start.clone(), self.start_included)
        } else if self.start < other.start {
            (other.start.clone(), other.start_included)
        } else {
            (self.start.clone(), self.start_included && other.start_included)
        };
        let (end, end_included) = if self.end < other.end {
            (self.end.clone(), self.end_included)
        } else if self.end > other.end {
            (other.end.clone(), other.end_included)
        } else {
            (self.end.clone(), self.end_included && other.end_included)
        };
        Interval::new(start, end, start_included, end_included).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64) -> Rational {
        Rational::from(n)
    }

    #[test]
    fn intersection_keeps_the_tighter_bounds() {
        let a = Interval::new(r(0), r(5), true, false).unwrap();
        let b = Interval::new(r(3), r(8), false, true).unwrap();
        let i = a.intersection(&b).unwrap();
        assert_eq!(i, Interval::new(r(3), r(5), false, false).unwrap());
        assert!(!i.contains(&r(3)));
        assert!(i.contains(&r(4)));
    }

    #[test]
    fn touching_open_ends_do_not_intersect() {
        let a = Interval::new(r(0), r(2), true, false).unwrap();
        let b = Interval::new(r(2), r(4), true, true).unwrap();
        assert!(a.intersection(&b).is_none());
        let c = Interval::new(r(0), r(2), true, true).unwrap();
        assert!(c.intersection(&b).unwrap().is_point());
    }
}
