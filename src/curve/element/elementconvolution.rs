use crate::curve::curveerror::CurveError;
use crate::curve::element::element::Element;
use crate::curve::element::point::Point;
use crate::curve::element::segment::Segment;
use crate::numbers::rational::Rational;

impl Element {
    /// Min-plus convolution of two elements, defined on the Minkowski sum of
    /// their domains. The result is one element, or `Segment, Point, Segment`
    /// when two segments of different slopes meet.
    pub fn convolution(&self, other: &Element) -> Result<Vec<Element>, CurveError> {
        match (self, other) {
            (Element::Point(a), Element::Point(b)) => {
                Ok(vec![Element::Point(Point::new(
                    a.time().checked_add(b.time())?,
                    a.value().checked_add(b.value())?
                )?)])
            },
            (Element::Point(p), Element::Segment(s)) | (Element::Segment(s), Element::Point(p)) => {
                Ok(vec![Element::Segment(s.translated(p.time(), p.value())?)])
            },
            (Element::Segment(a), Element::Segment(b)) => segment_convolution(a, b)
        }
    }

    /// Min-plus deconvolution `sup_u self(t + u) − other(u)` restricted to the
    /// pairs where `other` is not `+∞`. Such pairs contribute nothing.
    pub fn deconvolution(&self, other: &Element) -> Result<Vec<Element>, CurveError> {
        if other.is_plus_infinite() {
            return Ok(vec![]);
        }
        match (self, other) {
            (Element::Point(f), Element::Point(g)) => {
                Ok(vec![Element::Point(Point::new(
                    f.time().checked_sub(g.time())?,
                    f.value().checked_sub(g.value())?
                )?)])
            },
            (Element::Point(f), Element::Segment(g)) => {
                let start = f.time().checked_sub(g.end_time())?;
                let end = f.time().checked_sub(g.start_time())?;
                let segment = if !f.is_finite() || !g.is_finite() {
                    Segment::new(start, end, f.value().checked_sub(g.right_limit_at_start_time())?, Rational::zero())?
                } else {
                    Segment::new(start, end, f.value() - &g.left_limit_at_end_time()?, g.slope().clone())?
                };
                Ok(vec![Element::Segment(segment)])
            },
            (Element::Segment(f), Element::Point(g)) => {
                Ok(vec![Element::Segment(Segment::new(
                    f.start_time().checked_sub(g.time())?,
                    f.end_time().checked_sub(g.time())?,
                    f.right_limit_at_start_time().checked_sub(g.value())?,
                    f.slope().clone()
                )?)])
            },
            (Element::Segment(f), Element::Segment(g)) => segment_deconvolution(f, g)
        }
    }

    /// Max-plus convolution `sup_{0≤s≤t} self(s) + other(t − s)`.
    pub fn max_plus_convolution(&self, other: &Element) -> Result<Vec<Element>, CurveError> {
        let negated = self.negate().convolution(&other.negate())?;
        Ok(negated.iter().map(Element::negate).collect())
    }
}

fn segment_convolution(a: &Segment, b: &Segment) -> Result<Vec<Element>, CurveError> {
    let start = a.start_time() + b.start_time();
    let end = a.end_time() + b.end_time();
    let value = a.right_limit_at_start_time().checked_add(b.right_limit_at_start_time())?;
    if !a.is_finite() || !b.is_finite() || a.slope() == b.slope() {
        let slope = if value.is_infinite() { Rational::zero() } else { a.slope().clone() };
        return Ok(vec![Element::Segment(Segment::new(start, end, value, slope)?)]);
    }
    let (first, second) = if a.slope() < b.slope() { (a, b) } else { (b, a) };
    let junction = &start + &first.length();
    let junction_value = &value + &(first.slope() * &first.length());
    Ok(vec![
        Element::Segment(Segment::new(start, junction.clone(), value, first.slope().clone())?),
        Element::Point(Point::new(junction.clone(), junction_value.clone())?),
        Element::Segment(Segment::new(junction, end, junction_value, second.slope().clone())?)
    ])
}

fn segment_deconvolution(f: &Segment, g: &Segment) -> Result<Vec<Element>, CurveError> {
    let start = f.start_time() - g.end_time();
    let end = f.end_time() - g.start_time();
    if !f.is_finite() || !g.is_finite() {
        let value = f.right_limit_at_start_time().checked_sub(g.right_limit_at_start_time())?;
        return Ok(vec![Element::Segment(Segment::new(start, end, value, Rational::zero())?)]);
    }
    let g_end_limit = g.left_limit_at_end_time()?;
    let f_start = f.right_limit_at_start_time();
    if f.slope() >= g.slope() {
        let junction = f.end_time() - g.end_time();
        let first_value = f_start - &g_end_limit;
        let junction_value = &f.left_limit_at_end_time()? - &g_end_limit;
        Ok(vec![
            Element::Segment(Segment::new(start, junction.clone(), first_value, f.slope().clone())?),
            Element::Point(Point::new(junction.clone(), junction_value.clone())?),
            Element::Segment(Segment::new(junction, end, junction_value, g.slope().clone())?)
        ])
    } else {
        let junction = f.start_time() - g.start_time();
        let first_value = f_start - &g_end_limit;
        let junction_value = f_start - g.right_limit_at_start_time();
        Ok(vec![
            Element::Segment(Segment::new(start, junction.clone(), first_value, g.slope().clone())?),
            Element::Point(Point::new(junction.clone(), junction_value.clone())?),
            Element::Segment(Segment::new(junction, end, junction_value, f.slope().clone())?)
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64) -> Rational {
        Rational::from(n)
    }

    fn seg(a: i64, b: i64, v: i64, s: i64) -> Element {
        Element::Segment(Segment::new(r(a), r(b), r(v), r(s)).unwrap())
    }

    fn pt(t: i64, v: i64) -> Element {
        Element::Point(Point::new(r(t), r(v)).unwrap())
    }

    #[test]
    fn point_shifts_a_segment() {
        let conv = pt(2, 3).convolution(&seg(0, 1, 0, 5)).unwrap();
        assert_eq!(conv, vec![seg(2, 3, 3, 5)]);
    }

    #[test]
    fn segments_start_with_the_smaller_slope() {
        let conv = seg(0, 2, 0, 3).convolution(&seg(1, 4, 1, 1)).unwrap();
        assert_eq!(conv, vec![seg(1, 4, 1, 1), pt(4, 4), seg(4, 6, 4, 3)]);
    }

    #[test]
    fn equal_slopes_give_one_segment() {
        let conv = seg(0, 2, 0, 1).convolution(&seg(0, 3, 1, 1)).unwrap();
        assert_eq!(conv, vec![seg(0, 5, 1, 1)]);
    }

    #[test]
    fn infinite_operand_dominates() {
        let infinite = Element::Segment(Segment::new(r(0), r(1), Rational::plus_infinity(), r(0)).unwrap());
        let conv = infinite.convolution(&seg(0, 1, 0, 1)).unwrap();
        assert_eq!(conv.len(), 1);
        assert!(conv[0].is_plus_infinite());
    }

    #[test]
    fn point_deconvolution_subtracts() {
        assert_eq!(pt(5, 7).deconvolution(&pt(2, 3)).unwrap(), vec![pt(3, 4)]);
    }

    #[test]
    fn steeper_numerator_deconvolution() {
        // f = 2t on (0, 2), g = t on (0, 1)
        let deconv = seg(0, 2, 0, 2).deconvolution(&seg(0, 1, 0, 1)).unwrap();
        assert_eq!(deconv, vec![seg(-1, 1, -1, 2), pt(1, 3), seg(1, 2, 3, 1)]);
    }

    #[test]
    fn flatter_numerator_deconvolution() {
        // f = t on (0, 2), g = 2t on (0, 1)
        let deconv = seg(0, 2, 0, 1).deconvolution(&seg(0, 1, 0, 2)).unwrap();
        assert_eq!(deconv, vec![seg(-1, 0, -2, 2), pt(0, 0), seg(0, 2, 0, 1)]);
    }

    #[test]
    fn plus_infinite_denominator_is_skipped() {
        let infinite = Element::Point(Point::new(r(0), Rational::plus_infinity()).unwrap());
        assert!(seg(0, 1, 0, 1).deconvolution(&infinite).unwrap().is_empty());
    }
}
