use std::cmp::Ordering;

use rayon::slice::ParallelSliceMut;
use serde::{
    Deserialize,
    Serialize
};

use crate::configuration::ComputationSettings;
use crate::curve::curveerror::CurveError;
use crate::curve::element::element::Element;
use crate::curve::element::point::Point;
use crate::curve::element::segment::Segment;
use crate::curve::interval::Interval;
use crate::curve::sequence::envelope::merge_collinear;
use crate::numbers::rational::Rational;

/// Contiguous run of alternating points and segments.
///
/// A sequence is never empty. It starts closed when its first element is a
/// point and open otherwise, and likewise at its end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SequenceRecord", into = "SequenceRecord")]
pub struct Sequence {
    elements: Vec<Element>
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum SequenceTag {
    Sequence
}

#[derive(Serialize, Deserialize)]
struct SequenceRecord {
    #[serde(rename = "type")]
    kind: SequenceTag,
    elements: Vec<Element>
}

impl From<Sequence> for SequenceRecord {
    fn from(sequence: Sequence) -> Self {
        SequenceRecord { kind: SequenceTag::Sequence, elements: sequence.elements }
    }
}

impl TryFrom<SequenceRecord> for Sequence {
    type Error = CurveError;

    fn try_from(record: SequenceRecord) -> Result<Self, Self::Error> {
        Sequence::new(record.elements)
    }
}

impl Sequence {
    pub fn new(elements: Vec<Element>) -> Result<Sequence, CurveError> {
        if elements.is_empty() {
            return Err(CurveError::InvalidSequence("a sequence needs at least one element".to_owned()));
        }
        if !Sequence::are_in_time_order(&elements) {
            return Err(CurveError::InvalidSequence(
                "elements must alternate between points and segments without gaps".to_owned()
            ));
        }
        Ok(Sequence { elements })
    }

    /// Sorts the elements first. Adjacency must still hold after sorting.
    pub fn from_unordered(mut elements: Vec<Element>, settings: &ComputationSettings) -> Result<Sequence, CurveError> {
        Sequence::sort_elements(&mut elements, settings);
        Sequence::new(elements)
    }

    /// Stable sort by start time, a point before a segment starting at the same instant.
    pub fn sort_elements(elements: &mut [Element], settings: &ComputationSettings) {
        if elements.len() >= settings.parallel_sort_threshold() {
            tracing::trace!(len = elements.len(), "parallel element sort");
            elements.par_sort_by(compare_elements);
        } else {
            elements.sort_by(compare_elements);
        }
    }

    pub fn are_in_time_order(elements: &[Element]) -> bool {
        elements.windows(2).all(|pair| match (&pair[0], &pair[1]) {
            (Element::Point(p), Element::Segment(s)) => p.time() == s.start_time(),
            (Element::Segment(s), Element::Point(p)) => s.end_time() == p.time(),
            _ => false
        })
    }

    /// Single point, or `[from, to]` with the chosen ends, at a constant value.
    pub fn constant(from: &Rational,
                    to: &Rational,
                    include_from: bool,
                    include_to: bool,
                    value: &Rational) -> Result<Sequence, CurveError> {
        let interval = Interval::new(from.clone(), to.clone(), include_from, include_to)?;
        let mut elements = Vec::with_capacity(3);
        if interval.start_included() {
            elements.push(Element::Point(Point::new(from.clone(), value.clone())?));
        }
        if !interval.is_point() {
            elements.push(Element::Segment(Segment::constant(from.clone(), to.clone(), value.clone())?));
            if interval.end_included() {
                elements.push(Element::Point(Point::new(to.clone(), value.clone())?));
            }
        }
        Sequence::new(elements)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn start_time(&self) -> &Rational {
        self.elements[0].start_time()
    }

    pub fn end_time(&self) -> &Rational {
        self.elements[self.elements.len() - 1].end_time()
    }

    pub fn is_left_closed(&self) -> bool {
        self.elements[0].is_point()
    }

    pub fn is_right_closed(&self) -> bool {
        self.elements[self.elements.len() - 1].is_point()
    }

    pub fn domain(&self) -> Result<Interval, CurveError> {
        Interval::new(self.start_time().clone(), self.end_time().clone(), self.is_left_closed(), self.is_right_closed())
    }

    pub fn is_finite(&self) -> bool {
        self.elements.iter().all(Element::is_finite)
    }

    /// Distinct instants where an element starts or ends, ascending.
    pub fn breakpoints(&self) -> Vec<Rational> {
        let mut times: Vec<Rational> = Vec::with_capacity(self.elements.len() / 2 + 2);
        for element in &self.elements {
            for t in [element.start_time(), element.end_time()] {
                if times.last() != Some(t) {
                    times.push(t.clone());
                }
            }
        }
        times
    }

    fn element_index_at(&self, t: &Rational) -> Option<usize> {
        let first = self.elements.partition_point(|e| e.end_time() < t);
        let last = (first + 2).min(self.elements.len());
        (first..last).find(|&i| self.elements[i].contains(t))
    }

    pub fn element_at(&self, t: &Rational) -> Option<&Element> {
        self.element_index_at(t).map(|i| &self.elements[i])
    }

    /// Segment covering `(t, t + ε)` for some `ε > 0`.
    pub fn segment_after(&self, t: &Rational) -> Option<&Segment> {
        if let Element::Segment(first) = &self.elements[0] {
            if first.start_time() == t {
                return Some(first);
            }
        }
        let i = self.element_index_at(t)?;
        match &self.elements[i] {
            Element::Segment(s) => Some(s),
            Element::Point(_) => self.elements.get(i + 1).and_then(Element::as_segment)
        }
    }

    /// Segment covering `(t − ε, t)` for some `ε > 0`.
    pub fn segment_before(&self, t: &Rational) -> Option<&Segment> {
        if let Element::Segment(last) = &self.elements[self.elements.len() - 1] {
            if last.end_time() == t {
                return Some(last);
            }
        }
        let i = self.element_index_at(t)?;
        match &self.elements[i] {
            Element::Segment(s) => Some(s),
            Element::Point(_) if i > 0 => self.elements[i - 1].as_segment(),
            Element::Point(_) => None
        }
    }

    pub fn value_at(&self, t: &Rational) -> Result<Rational, CurveError> {
        self.element_at(t)
            .ok_or_else(|| self.outside_domain(t))?
            .value_at(t)
    }

    pub fn right_limit_at(&self, t: &Rational) -> Result<Rational, CurveError> {
        self.segment_after(t)
            .ok_or_else(|| self.outside_domain(t))?
            .line_value_at(t)
    }

    pub fn left_limit_at(&self, t: &Rational) -> Result<Rational, CurveError> {
        self.segment_before(t)
            .ok_or_else(|| self.outside_domain(t))?
            .line_value_at(t)
    }

    fn outside_domain(&self, t: &Rational) -> CurveError {
        CurveError::InvalidArgument(format!(
            "time {} is outside the sequence domain [{}, {}]",
            t, self.start_time(), self.end_time()
        ))
    }

    /// Restriction to the interval from `from` to `to`, which must lie inside
    /// the domain.
    pub fn cut(&self,
               from: &Rational,
               to: &Rational,
               include_from: bool,
               include_to: bool) -> Result<Sequence, CurveError> {
        let window = Interval::new(from.clone(), to.clone(), include_from, include_to)?;
        let lower_ok = from > self.start_time() || (from == self.start_time() && (!include_from || self.is_left_closed()));
        let upper_ok = to < self.end_time() || (to == self.end_time() && (!include_to || self.is_right_closed()));
        if !lower_ok || !upper_ok {
            return Err(CurveError::InvalidArgument(format!(
                "cannot cut [{}, {}] from a sequence over [{}, {}]",
                window.start(), window.end(), self.start_time(), self.end_time()
            )));
        }
        let first = self.elements.partition_point(|e| e.end_time() < from);
        let mut elements = Vec::new();
        for element in self.elements[first..].iter().take_while(|e| e.start_time() <= to) {
            elements.extend(element.cut(from, to, include_from, include_to)?);
        }
        Sequence::new(elements)
    }

    pub fn translated(&self, time_shift: &Rational, value_shift: &Rational) -> Result<Sequence, CurveError> {
        let elements = self.elements
            .iter()
            .map(|e| e.translated(time_shift, value_shift))
            .collect::<Result<Vec<Element>, CurveError>>()?;
        Sequence::new(elements)
    }

    pub fn negate(&self) -> Sequence {
        Sequence { elements: self.elements.iter().map(Element::negate).collect() }
    }

    /// Canonical form: collinear `Segment, Point, Segment` runs are merged, so
    /// two optimized sequences describing the same function are equal.
    pub fn optimize(&self) -> Result<Sequence, CurveError> {
        Sequence::new(merge_collinear(self.elements.clone())?)
    }

    /// Concatenates contiguous sequences in order.
    pub fn concat<I>(parts: I) -> Result<Sequence, CurveError>
        where I: IntoIterator<Item = Sequence> {
        let elements: Vec<Element> = parts.into_iter().flat_map(Sequence::into_elements).collect();
        Sequence::new(elements)
    }
}

fn compare_elements(a: &Element, b: &Element) -> Ordering {
    a.start_time()
        .cmp(b.start_time())
        .then_with(|| b.is_point().cmp(&a.is_point()))
}
