use rayon::prelude::*;

use crate::configuration::ComputationSettings;
use crate::curve::curveerror::CurveError;
use crate::curve::element::element::Element;
use crate::curve::sequence::envelope::{
    lower_envelope,
    upper_envelope
};
use crate::curve::sequence::sequence::Sequence;

impl Sequence {
    /// Min-plus convolution over the finite domains of both operands.
    pub fn convolution(&self, other: &Sequence, settings: &ComputationSettings) -> Result<Sequence, CurveError> {
        let elements = pairwise_envelope(self, other, settings, Element::convolution, lower_envelope)?;
        Sequence::new(elements)
    }

    /// `sup_u self(t + u) − other(u)` over the pairs of instants both domains cover.
    pub fn deconvolution(&self, other: &Sequence, settings: &ComputationSettings) -> Result<Sequence, CurveError> {
        let elements = pairwise_envelope(self, other, settings, Element::deconvolution, upper_envelope)?;
        if elements.is_empty() {
            return Err(CurveError::InvalidOperation("deconvolution by a sequence that is +∞ everywhere".to_owned()));
        }
        Sequence::new(elements)
    }

    pub fn max_plus_convolution(&self, other: &Sequence, settings: &ComputationSettings) -> Result<Sequence, CurveError> {
        let elements = pairwise_envelope(self, other, settings, Element::max_plus_convolution, upper_envelope)?;
        Sequence::new(elements)
    }
}

/// Envelope of `pair(a, b)` over the Cartesian product of the two sequences.
///
/// Large products are split into chunks of outer elements. Each chunk is
/// reduced on its own and the partial results are merged by one last envelope,
/// whose output does not depend on how the work was split.
fn pairwise_envelope<P, E>(left: &Sequence,
                           right: &Sequence,
                           settings: &ComputationSettings,
                           pair: P,
                           envelope: E) -> Result<Vec<Element>, CurveError>
    where P: Fn(&Element, &Element) -> Result<Vec<Element>, CurveError> + Sync,
          E: Fn(&[Element]) -> Result<Vec<Element>, CurveError> + Sync {
    let pairs = left.len() * right.len();
    let chunk_product = |chunk: &[Element]| -> Result<Vec<Element>, CurveError> {
        let mut partial = Vec::with_capacity(3 * chunk.len() * right.len());
        for a in chunk {
            for b in right.elements() {
                partial.extend(pair(a, b)?);
            }
        }
        if partial.len() > settings.simplification_threshold() {
            envelope(&partial)
        } else {
            Ok(partial)
        }
    };

    let candidates: Vec<Element> = if pairs > settings.parallelization_threshold() {
        let chunk_len = (settings.parallelization_threshold() / right.len()).max(1);
        tracing::trace!(pairs, chunk_len, "splitting element pairs across the thread pool");
        let partials = left.elements()
            .par_chunks(chunk_len)
            .map(chunk_product)
            .collect::<Result<Vec<Vec<Element>>, CurveError>>()?;
        partials.into_iter().flatten().collect()
    } else {
        chunk_product(left.elements())?
    };
    envelope(&candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::element::point::Point;
    use crate::curve::element::segment::Segment;
    use crate::numbers::rational::Rational;

    fn r(n: i64) -> Rational {
        Rational::from(n)
    }

    fn seg(a: i64, b: i64, v: i64, s: i64) -> Element {
        Element::Segment(Segment::new(r(a), r(b), r(v), r(s)).unwrap())
    }

    fn pt(t: i64, v: i64) -> Element {
        Element::Point(Point::new(r(t), r(v)).unwrap())
    }

    fn staircase_window() -> Sequence {
        Sequence::new(vec![
            pt(0, 0), seg(0, 1, 1, 0), pt(1, 1), seg(1, 2, 2, 0), pt(2, 2), seg(2, 3, 3, 0)
        ]).unwrap()
    }

    #[test]
    fn convolution_with_the_origin_point_is_identity() {
        let identity = Sequence::new(vec![pt(0, 0)]).unwrap();
        let s = staircase_window();
        let conv = s.convolution(&identity, &ComputationSettings::default()).unwrap();
        assert_eq!(conv, s.optimize().unwrap());
    }

    #[test]
    fn rate_convolution_takes_the_lower_slope_first() {
        let fast = Sequence::new(vec![pt(0, 0), seg(0, 2, 0, 3), pt(2, 6)]).unwrap();
        let slow = Sequence::new(vec![pt(0, 0), seg(0, 2, 0, 1), pt(2, 2)]).unwrap();
        let conv = fast.convolution(&slow, &ComputationSettings::default()).unwrap();
        assert_eq!(conv.elements(), &[pt(0, 0), seg(0, 2, 0, 1), pt(2, 2), seg(2, 4, 2, 3), pt(4, 8)]);
    }

    #[test]
    fn parallel_and_sequential_products_agree() {
        let s = staircase_window();
        let sequential = s.convolution(&s, &ComputationSettings::default()).unwrap();
        let parallel_settings = ComputationSettings::default()
            .with_parallelization_threshold(2)
            .with_simplification_threshold(1);
        let parallel = s.convolution(&s, &parallel_settings).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn deconvolution_of_a_ramp_by_itself() {
        let ramp = Sequence::new(vec![pt(0, 0), seg(0, 2, 0, 1), pt(2, 2)]).unwrap();
        let deconv = ramp.deconvolution(&ramp, &ComputationSettings::default()).unwrap();
        assert_eq!(deconv.value_at(&r(0)).unwrap(), r(0));
        assert_eq!(deconv.value_at(&r(1)).unwrap(), r(1));
        assert_eq!(deconv.value_at(&r(-2)).unwrap(), r(-2));
    }
}
