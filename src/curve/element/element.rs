use serde::{
    Deserialize,
    Serialize
};

use crate::curve::curveerror::CurveError;
use crate::curve::element::point::Point;
use crate::curve::element::segment::Segment;
use crate::numbers::rational::Rational;

/// Building block of a `Sequence`: either a single sample or an open affine piece.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Element {
    Point(Point),
    Segment(Segment)
}

impl From<Point> for Element {
    fn from(point: Point) -> Self {
        Element::Point(point)
    }
}

impl From<Segment> for Element {
    fn from(segment: Segment) -> Self {
        Element::Segment(segment)
    }
}

impl Element {
    pub fn start_time(&self) -> &Rational {
        match self {
            Element::Point(p) => p.time(),
            Element::Segment(s) => s.start_time()
        }
    }

    pub fn end_time(&self) -> &Rational {
        match self {
            Element::Point(p) => p.time(),
            Element::Segment(s) => s.end_time()
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Element::Point(_))
    }

    pub fn is_segment(&self) -> bool {
        matches!(self, Element::Segment(_))
    }

    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Element::Point(p) => Some(p),
            Element::Segment(_) => None
        }
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Element::Point(_) => None,
            Element::Segment(s) => Some(s)
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Element::Point(p) => p.is_finite(),
            Element::Segment(s) => s.is_finite()
        }
    }

    pub fn is_plus_infinite(&self) -> bool {
        match self {
            Element::Point(p) => p.is_plus_infinite(),
            Element::Segment(s) => s.is_plus_infinite()
        }
    }

    pub fn is_minus_infinite(&self) -> bool {
        match self {
            Element::Point(p) => p.is_minus_infinite(),
            Element::Segment(s) => s.is_minus_infinite()
        }
    }

    pub fn contains(&self, t: &Rational) -> bool {
        match self {
            Element::Point(p) => p.time() == t,
            Element::Segment(s) => s.contains(t)
        }
    }

    pub fn value_at(&self, t: &Rational) -> Result<Rational, CurveError> {
        match self {
            Element::Point(p) if p.time() == t => Ok(p.value().clone()),
            Element::Point(p) => Err(CurveError::InvalidArgument(
                format!("time {} differs from point time {}", t, p.time())
            )),
            Element::Segment(s) => s.value_at(t)
        }
    }

    pub fn translated(&self, time_shift: &Rational, value_shift: &Rational) -> Result<Element, CurveError> {
        Ok(match self {
            Element::Point(p) => Element::Point(p.translated(time_shift, value_shift)?),
            Element::Segment(s) => Element::Segment(s.translated(time_shift, value_shift)?)
        })
    }

    pub fn negate(&self) -> Element {
        match self {
            Element::Point(p) => Element::Point(p.negate()),
            Element::Segment(s) => Element::Segment(s.negate())
        }
    }

    /// Part of the element inside the interval `[from, to]`, with each end
    /// closed or open as requested. A segment cut at an interior instant that
    /// is included yields the sample at that instant as a separate point.
    pub fn cut(&self,
               from: &Rational,
               to: &Rational,
               include_from: bool,
               include_to: bool) -> Result<Vec<Element>, CurveError> {
        match self {
            Element::Point(p) => {
                let t = p.time();
                let after = t > from || (t == from && include_from);
                let before = t < to || (t == to && include_to);
                Ok(if after && before { vec![self.clone()] } else { vec![] })
            },
            Element::Segment(s) => {
                let mut result = Vec::new();
                if from == to {
                    if s.contains(from) && include_from && include_to {
                        result.push(Element::Point(Point::unchecked(from.clone(), s.value_at(from)?)));
                    }
                    return Ok(result);
                }
                if s.contains(from) && include_from {
                    result.push(Element::Point(Point::unchecked(from.clone(), s.value_at(from)?)));
                }
                let start = from.max(s.start_time());
                let end = to.min(s.end_time());
                if start < end {
                    result.push(Element::Segment(s.restricted(&start, &end)?));
                }
                if s.contains(to) && include_to {
                    result.push(Element::Point(Point::unchecked(to.clone(), s.value_at(to)?)));
                }
                Ok(result)
            }
        }
    }

    /// Pointwise sum over the common domain. Disjoint elements are rejected.
    pub fn addition(&self, other: &Element) -> Result<Vec<Element>, CurveError> {
        self.combine(other, |a, b| Ok(a.checked_add(b)?), |a, b| Ok(a.checked_add(b)?))
    }

    /// Pointwise minimum over the common domain.
    pub fn minimum(&self, other: &Element) -> Result<Vec<Element>, CurveError> {
        let (from, to) = self.common_domain(other).ok_or_else(|| disjoint(self, other))?;
        let mut parts = self.cut(&from, &to, true, true)?;
        parts.extend(other.cut(&from, &to, true, true)?);
        crate::curve::sequence::envelope::lower_envelope(&parts)
    }

    /// Pointwise maximum over the common domain.
    pub fn maximum(&self, other: &Element) -> Result<Vec<Element>, CurveError> {
        let negated: Vec<Element> = self.negate().minimum(&other.negate())?;
        Ok(negated.iter().map(Element::negate).collect())
    }

    fn common_domain(&self, other: &Element) -> Option<(Rational, Rational)> {
        let from = self.start_time().max(other.start_time());
        let to = self.end_time().min(other.end_time());
        if from > to {
            return None;
        }
        if from == to && !(self.covers_closed(&from) && other.covers_closed(&from)) {
            return None;
        }
        Some((from, to))
    }

    fn covers_closed(&self, t: &Rational) -> bool {
        self.contains(t)
    }

    fn combine<P, S>(&self, other: &Element, on_values: P, on_slopes: S) -> Result<Vec<Element>, CurveError>
        where P: Fn(&Rational, &Rational) -> Result<Rational, CurveError>,
              S: Fn(&Rational, &Rational) -> Result<Rational, CurveError> {
        match (self, other) {
            (Element::Point(a), Element::Point(b)) => {
                if a.time() != b.time() {
                    return Err(disjoint(self, other));
                }
                Ok(vec![Element::Point(Point::unchecked(a.time().clone(), on_values(a.value(), b.value())?))])
            },
            (Element::Point(p), Element::Segment(s)) | (Element::Segment(s), Element::Point(p)) => {
                if !s.contains(p.time()) {
                    return Err(disjoint(self, other));
                }
                let sample = s.value_at(p.time())?;
                let value = if self.is_point() { on_values(p.value(), &sample)? } else { on_values(&sample, p.value())? };
                Ok(vec![Element::Point(Point::unchecked(p.time().clone(), value))])
            },
            (Element::Segment(a), Element::Segment(b)) => {
                let start = a.start_time().max(b.start_time());
                let end = a.end_time().min(b.end_time());
                if start >= end {
                    return Err(disjoint(self, other));
                }
                let value = on_values(&a.line_value_at(&start)?, &b.line_value_at(&start)?)?;
                let slope = on_slopes(a.slope(), b.slope())?;
                Ok(vec![Element::Segment(Segment::new(start, end, value, slope)?)])
            }
        }
    }
}

fn disjoint(a: &Element, b: &Element) -> CurveError {
    CurveError::InvalidArgument(format!(
        "elements over [{}, {}] and [{}, {}] share no instant",
        a.start_time(), a.end_time(), b.start_time(), b.end_time()
    ))
}
