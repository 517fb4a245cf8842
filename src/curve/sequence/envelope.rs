//! Lower and upper envelopes of arbitrary element collections.
//!
//! The sweep visits every distinct breakpoint once. At a breakpoint the result
//! is the extreme of the points sitting there and of the segments spanning it;
//! between two breakpoints the active segments are plain lines, and the
//! envelope of lines is walked crossing by crossing. Instants covered by no
//! element take the neutral value of the envelope (`+∞` for the lower one).

use crate::curve::curveerror::CurveError;
use crate::curve::element::element::Element;
use crate::curve::element::point::Point;
use crate::curve::element::segment::Segment;
use crate::numbers::rational::Rational;

pub fn lower_envelope(elements: &[Element]) -> Result<Vec<Element>, CurveError> {
    let envelope = sweep(elements, &Rational::plus_infinity())?;
    merge_collinear(envelope)
}

pub fn upper_envelope(elements: &[Element]) -> Result<Vec<Element>, CurveError> {
    let negated: Vec<Element> = elements.iter().map(Element::negate).collect();
    let envelope = lower_envelope(&negated)?;
    Ok(envelope.iter().map(Element::negate).collect())
}

/// Merges every `Segment, Point, Segment` run that lies on a single line.
pub fn merge_collinear(elements: Vec<Element>) -> Result<Vec<Element>, CurveError> {
    let mut merged: Vec<Element> = Vec::with_capacity(elements.len());
    for element in elements {
        if let Element::Segment(next) = &element {
            if let Some(joined) = join_with_tail(&merged, next)? {
                merged.truncate(merged.len() - 2);
                merged.push(Element::Segment(joined));
                continue;
            }
        }
        merged.push(element);
    }
    Ok(merged)
}

fn join_with_tail(merged: &[Element], next: &Segment) -> Result<Option<Segment>, CurveError> {
    let n = merged.len();
    if n < 2 {
        return Ok(None);
    }
    let (Element::Segment(previous), Element::Point(middle)) = (&merged[n - 2], &merged[n - 1]) else {
        return Ok(None);
    };
    let aligned = previous.end_time() == middle.time()
        && next.start_time() == middle.time()
        && previous.slope() == next.slope()
        && next.right_limit_at_start_time() == middle.value()
        && &previous.left_limit_at_end_time()? == middle.value();
    if !aligned {
        return Ok(None);
    }
    Ok(Some(Segment::unchecked(
        previous.start_time().clone(),
        next.end_time().clone(),
        previous.right_limit_at_start_time().clone(),
        previous.slope().clone()
    )))
}

fn sweep(elements: &[Element], neutral: &Rational) -> Result<Vec<Element>, CurveError> {
    if elements.is_empty() {
        return Ok(vec![]);
    }
    let mut points: Vec<&Point> = elements.iter().filter_map(Element::as_point).collect();
    let mut segments: Vec<&Segment> = elements.iter().filter_map(Element::as_segment).collect();
    points.sort_by(|a, b| a.time().cmp(b.time()));
    segments.sort_by(|a, b| a.start_time().cmp(b.start_time()));

    let mut times: Vec<&Rational> = Vec::with_capacity(points.len() + 2 * segments.len());
    times.extend(points.iter().map(|p| p.time()));
    times.extend(segments.iter().flat_map(|s| [s.start_time(), s.end_time()]));
    times.sort();
    times.dedup();

    let mut result: Vec<Element> = Vec::with_capacity(2 * times.len());
    let mut active: Vec<&Segment> = Vec::new();
    let mut point_index = 0;
    let mut segment_index = 0;
    let last = times.len() - 1;

    for (i, &t) in times.iter().enumerate() {
        active.retain(|s| s.end_time() > t);

        let mut sample: Option<Rational> = None;
        while point_index < points.len() && points[point_index].time() == t {
            sample = Some(lowest(sample, points[point_index].value()));
            point_index += 1;
        }
        for s in &active {
            sample = Some(lowest(sample, &s.value_at(t)?));
        }
        match sample {
            Some(value) => result.push(Element::Point(Point::unchecked(t.clone(), value))),
            None if i > 0 && i < last => result.push(Element::Point(Point::unchecked(t.clone(), neutral.clone()))),
            None => {}
        }

        while segment_index < segments.len() && segments[segment_index].start_time() == t {
            active.push(segments[segment_index]);
            segment_index += 1;
        }
        if i < last {
            lines_envelope(&active, t, times[i + 1], neutral, &mut result)?;
        }
    }
    Ok(result)
}

fn lowest(current: Option<Rational>, candidate: &Rational) -> Rational {
    match current {
        Some(value) if &value <= candidate => value,
        _ => candidate.clone()
    }
}

/// Envelope over `(from, to)` of segments that all span the whole interval.
fn lines_envelope(active: &[&Segment],
                  from: &Rational,
                  to: &Rational,
                  neutral: &Rational,
                  result: &mut Vec<Element>) -> Result<(), CurveError> {
    let mut lines: Vec<(Rational, &Rational)> = Vec::with_capacity(active.len());
    for s in active {
        let value = s.line_value_at(from)?;
        if value.is_minus_infinite() {
            result.push(Element::Segment(Segment::unchecked(from.clone(), to.clone(), value, Rational::zero())));
            return Ok(());
        }
        if value.is_finite() {
            lines.push((value, s.slope()));
        }
    }
    if lines.is_empty() {
        let value = if active.is_empty() { neutral.clone() } else { Rational::plus_infinity() };
        result.push(Element::Segment(Segment::unchecked(from.clone(), to.clone(), value, Rational::zero())));
        return Ok(());
    }

    let mut current = 0;
    for (i, (value, slope)) in lines.iter().enumerate() {
        let (best_value, best_slope) = &lines[current];
        if value < best_value || (value == best_value && slope < best_slope) {
            current = i;
        }
    }

    let mut position = from.clone();
    loop {
        let (origin_value, slope) = &lines[current];
        let value_here = origin_value + &(*slope * &(&position - from));
        let mut crossing: Option<(Rational, usize)> = None;
        for (j, (other_value, other_slope)) in lines.iter().enumerate() {
            if other_slope >= slope {
                continue;
            }
            let other_here = other_value + &(*other_slope * &(&position - from));
            let x = &position + &((other_here - &value_here) / (*slope - *other_slope));
            if &x >= to {
                continue;
            }
            let better = match &crossing {
                None => true,
                Some((best_x, best_j)) => &x < best_x || (&x == best_x && *other_slope < lines[*best_j].1)
            };
            if better {
                crossing = Some((x, j));
            }
        }
        match crossing {
            None => {
                result.push(Element::Segment(Segment::unchecked(position, to.clone(), value_here, (*slope).clone())));
                return Ok(());
            },
            Some((x, j)) => {
                let value_at_x = origin_value + &(*slope * &(&x - from));
                result.push(Element::Segment(Segment::unchecked(position, x.clone(), value_here, (*slope).clone())));
                result.push(Element::Point(Point::unchecked(x.clone(), value_at_x)));
                position = x;
                current = j;
            }
        }
    }
}
