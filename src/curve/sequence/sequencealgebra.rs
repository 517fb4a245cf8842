use crate::curve::curveerror::CurveError;
use crate::curve::element::element::Element;
use crate::curve::element::point::Point;
use crate::curve::element::segment::Segment;
use crate::curve::sequence::envelope::{
    lower_envelope,
    merge_collinear,
    upper_envelope
};
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

impl Sequence {
    /// Both operands restricted to the part of time they share.
    fn aligned_with(&self, other: &Sequence) -> Result<(Sequence, Sequence), CurveError> {
        let common = self.domain()?
            .intersection(&other.domain()?)
            .ok_or_else(|| CurveError::InvalidArgument(format!(
                "sequences over [{}, {}] and [{}, {}] do not overlap",
                self.start_time(), self.end_time(), other.start_time(), other.end_time()
            )))?;
        let cut = |s: &Sequence| s.cut(common.start(), common.end(), common.start_included(), common.end_included());
        Ok((cut(self)?, cut(other)?))
    }

    /// Pointwise sum over the common domain, split at the breakpoints of both operands.
    pub fn addition(&self, other: &Sequence) -> Result<Sequence, CurveError> {
        let (a, b) = self.aligned_with(other)?;
        let domain = a.domain()?;
        let mut times = a.breakpoints();
        times.extend(b.breakpoints());
        times.sort();
        times.dedup();

        let mut elements = Vec::with_capacity(2 * times.len());
        for (i, t) in times.iter().enumerate() {
            if domain.contains(t) {
                let value = a.value_at(t)?.checked_add(&b.value_at(t)?)?;
                elements.push(Element::Point(Point::new(t.clone(), value)?));
            }
            if let Some(next) = times.get(i + 1) {
                let (left, right) = match (a.segment_after(t), b.segment_after(t)) {
                    (Some(left), Some(right)) => (left, right),
                    _ => return Err(CurveError::InvalidSequence(format!("no segment after {}", t)))
                };
                let value = left.line_value_at(t)?.checked_add(&right.line_value_at(t)?)?;
                let slope = left.slope() + right.slope();
                elements.push(Element::Segment(Segment::new(t.clone(), next.clone(), value, slope)?));
            }
        }
        Sequence::new(merge_collinear(elements)?)
    }

    /// `self − other`; with `non_negative` the result is clamped at zero.
    pub fn subtraction(&self, other: &Sequence, non_negative: bool) -> Result<Sequence, CurveError> {
        let difference = self.addition(&other.negate())?;
        if !non_negative {
            return Ok(difference);
        }
        let domain = difference.domain()?;
        let zero = Sequence::constant(
            domain.start(), domain.end(), domain.start_included(), domain.end_included(), &Rational::zero()
        )?;
        difference.maximum(&zero)
    }

    pub fn minimum(&self, other: &Sequence) -> Result<Sequence, CurveError> {
        let (a, b) = self.aligned_with(other)?;
        let mut elements = a.into_elements();
        elements.extend(b.into_elements());
        Sequence::new(lower_envelope(&elements)?)
    }

    pub fn maximum(&self, other: &Sequence) -> Result<Sequence, CurveError> {
        let (a, b) = self.aligned_with(other)?;
        let mut elements = a.into_elements();
        elements.extend(b.into_elements());
        Sequence::new(upper_envelope(&elements)?)
    }
}
