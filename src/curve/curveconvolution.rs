use num_traits::ToPrimitive;
use tracing::{
    debug,
    trace
};

use crate::configuration::ComputationSettings;
use crate::curve::curve::Curve;
use crate::curve::curveerror::CurveError;
use crate::curve::curveshape::CurveShape;
use crate::curve::element::element::Element;
use crate::curve::element::point::Point;
use crate::curve::element::segment::Segment;
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

impl Curve {
    /// Min-plus convolution `inf_{0≤s≤t} f(s) + g(t − s)`.
    ///
    /// Each operand splits into a transient part on `[0, T)` and a periodic
    /// part on `[T, +∞)`. The four partial convolutions each become periodic
    /// after a known instant, so each is computed on one finite window and the
    /// result is their minimum.
    pub fn convolution(&self, other: &Curve, settings: Option<&ComputationSettings>) -> Result<Curve, CurveError> {
        let settings = settings.cloned().unwrap_or_default();
        self.convolution_with(other, &settings)
    }

    pub(crate) fn convolution_with(&self, other: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
        debug!(left = %self, right = %other, "curve convolution");
        if settings.use_shape_fast_paths() {
            if let Some(result) = self.convolution_fast_path(other)? {
                return Ok(result);
            }
        }

        let mut terms = vec![periodic_convolution(self, other, settings)?];
        let f_transient = self.transient_sequence()?;
        let g_transient = other.transient_sequence()?;
        if let Some(transient) = &f_transient {
            terms.push(transient_periodic_convolution(transient, self, other, settings)?);
        }
        if let Some(transient) = &g_transient {
            terms.push(transient_periodic_convolution(transient, other, self, settings)?);
        }
        if let (Some(f_part), Some(g_part)) = (&f_transient, &g_transient) {
            terms.push(Curve::from_finite_support(&f_part.convolution(g_part, settings)?)?);
        }

        let result = merge_terms(terms)?.optimize()?;
        Ok(if self.shape().guarantees_convex() && other.shape().guarantees_convex() {
            result.with_shape(CurveShape::Convex)
        } else {
            result
        })
    }

    /// Min-plus deconvolution `sup_{u≥0} f(t + u) − g(u)`.
    pub fn deconvolution(&self, other: &Curve, settings: Option<&ComputationSettings>) -> Result<Curve, CurveError> {
        let settings = settings.cloned().unwrap_or_default();
        debug!(left = %self, right = %other, "curve deconvolution");
        if settings.use_shape_fast_paths() {
            if let Some(result) = self.deconvolution_fast_path(other)? {
                return Ok(result);
            }
        }
        if !other.is_ultimately_plus_infinite()
            && (self.is_ultimately_plus_infinite() || self.pseudo_period_slope() > other.pseudo_period_slope()) {
            trace!("numerator outgrows denominator, deconvolution is +∞");
            return Curve::plus_infinite();
        }

        let zero = Rational::zero();
        let length = self.pseudo_period_length().lcm(other.pseudo_period_length())?;
        let reach = &self.pseudo_period_start().max(other.pseudo_period_start()) + &length;
        let horizon = self.pseudo_period_end();
        trace!(reach = %reach, horizon = %horizon, "deconvolution windows");
        let numerator = self.cut(&zero, &(&horizon + &reach), true, false)?;
        let denominator = other.cut(&zero, &reach, true, false)?;
        let base = numerator
            .deconvolution(&denominator, &settings)?
            .cut(&zero, &horizon, true, false)?;
        Curve::new(
            base,
            self.pseudo_period_start().clone(),
            self.pseudo_period_length().clone(),
            self.pseudo_period_height().clone()
        )?.optimize()
    }

    /// Max-plus convolution `sup_{0≤s≤t} f(s) + g(t − s)`.
    pub fn max_plus_convolution(&self, other: &Curve, settings: Option<&ComputationSettings>) -> Result<Curve, CurveError> {
        debug!(left = %self, right = %other, "curve max-plus convolution");
        self.negate()?.convolution(&other.negate()?, settings)?.negate()
    }

    /// `sup_t f(t) − g(t)`, the backlog bound when `f` is an arrival curve and
    /// `g` a service curve.
    pub fn vertical_deviation(&self, other: &Curve, settings: Option<&ComputationSettings>) -> Result<Rational, CurveError> {
        self.deconvolution(other, settings)?.value_at(&Rational::zero())
    }

    fn transient_sequence(&self) -> Result<Option<Sequence>, CurveError> {
        if self.pseudo_period_start().is_zero() {
            return Ok(None);
        }
        Ok(Some(self.cut(&Rational::zero(), self.pseudo_period_start(), true, false)?))
    }

    fn convolution_fast_path(&self, other: &Curve) -> Result<Option<Curve>, CurveError> {
        let result = match (self.shape(), other.shape()) {
            (CurveShape::RateLatency { rate: r1, latency: t1 }, CurveShape::RateLatency { rate: r2, latency: t2 }) => {
                trace!("rate-latency convolution fast path");
                Some(Curve::rate_latency(r1.min(r2), t1 + t2)?)
            },
            (CurveShape::Delay { delay }, _) if other.is_non_decreasing() && other.is_zero_at_zero() => {
                trace!("delay convolution fast path");
                Some(other.delay_by(delay)?)
            },
            (_, CurveShape::Delay { delay }) if self.is_non_decreasing() && self.is_zero_at_zero() => {
                trace!("delay convolution fast path");
                Some(self.delay_by(delay)?)
            },
            (CurveShape::Staircase { height: h1, period: d1 }, CurveShape::Staircase { height: h2, period: d2 }) => {
                trace!("staircase convolution fast path");
                Some(staircase_convolution(h1, d1, h2, d2)?)
            },
            (a, b) if a.guarantees_concave() && b.guarantees_concave()
                && self.is_zero_at_zero() && other.is_zero_at_zero() => {
                trace!("concave convolution fast path");
                Some(self.minimum(other)?)
            },
            _ => None
        };
        Ok(result)
    }

    fn deconvolution_fast_path(&self, other: &Curve) -> Result<Option<Curve>, CurveError> {
        let (CurveShape::SigmaRho { sigma, rho }, CurveShape::RateLatency { rate, latency }) = (self.shape(), other.shape()) else {
            return Ok(None);
        };
        trace!("token-bucket over rate-latency deconvolution fast path");
        if rho > rate {
            return Ok(Some(Curve::plus_infinite()?));
        }
        let burst = sigma + &(rho * latency);
        Ok(Some(Curve::affine(burst, rho.clone())?.with_shape(CurveShape::Concave)))
    }
}

/// Minimum of the partial convolutions, flattest first.
///
/// Terms of the lowest rate are merged before any steeper one. A steeper term
/// then only fails to merge when it is finite inside a gap that no flatter
/// term fills, and the minimum itself is not pseudo-periodic.
fn merge_terms(mut terms: Vec<Curve>) -> Result<Curve, CurveError> {
    terms.sort_by(|a, b| {
        a.is_ultimately_plus_infinite()
            .cmp(&b.is_ultimately_plus_infinite())
            .then_with(|| a.pseudo_period_slope().cmp(&b.pseudo_period_slope()))
    });
    let mut terms = terms.into_iter();
    let Some(mut result) = terms.next() else {
        return Curve::plus_infinite();
    };
    for term in terms {
        result = result.minimum(&term)?;
    }
    Ok(result)
}

/// Periodic part of `f` against periodic part of `g`.
///
/// With `p` the operand of lower rate and `L = lcm(d_p, d_q)`, only the first
/// `L` of `q`'s periodic part matters, and the result repeats with `p`'s
/// period from `T_p + T_q + L`.
fn periodic_convolution(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    let (p, q) = if f.pseudo_period_slope() <= g.pseudo_period_slope() { (f, g) } else { (g, f) };
    let length = p.pseudo_period_length().lcm(q.pseudo_period_length())?;
    let from = p.pseudo_period_start() + q.pseudo_period_start();
    let start = &from + &length;
    let horizon = &start + p.pseudo_period_length();
    trace!(start = %start, horizon = %horizon, "periodic convolution window");

    let p_window = p.cut(p.pseudo_period_start(), &(&horizon - q.pseudo_period_start()), true, false)?;
    let q_end = Rational::min(&(q.pseudo_period_start() + &length), &(&horizon - p.pseudo_period_start()));
    let q_window = q.cut(q.pseudo_period_start(), &q_end, true, false)?;
    let window = p_window.convolution(&q_window, settings)?.cut(&from, &horizon, true, false)?;
    padded_curve(window, start, p.pseudo_period_length().clone(), p.pseudo_period_height().clone())
}

/// Transient part `transient` of `f` against periodic part of `g`; repeats
/// with `g`'s period from `T_f + T_g`.
fn transient_periodic_convolution(transient: &Sequence,
                                  f: &Curve,
                                  g: &Curve,
                                  settings: &ComputationSettings) -> Result<Curve, CurveError> {
    let start = f.pseudo_period_start() + g.pseudo_period_start();
    let horizon = &start + g.pseudo_period_length();
    let g_window = g.cut(g.pseudo_period_start(), &horizon, true, false)?;
    let window = transient
        .convolution(&g_window, settings)?
        .cut(g.pseudo_period_start(), &horizon, true, false)?;
    padded_curve(window, start, g.pseudo_period_length().clone(), g.pseudo_period_height().clone())
}

/// Curve equal to `window` on its domain and `+∞` before it.
fn padded_curve(window: Sequence,
                start: Rational,
                length: Rational,
                height: Rational) -> Result<Curve, CurveError> {
    let zero = Rational::zero();
    let base = if window.start_time().is_zero() && window.is_left_closed() {
        window
    } else {
        let prefix = Sequence::constant(&zero, window.start_time(), true, !window.is_left_closed(), &Rational::plus_infinity())?;
        Sequence::concat([prefix, window])?
    };
    Curve::new(base, start, length, height)
}

/// `h1·⌈t/d1⌉ ⊗ h2·⌈t/d2⌉`: the cheapest combination of whole steps of
/// either staircase that reaches `t`. It repeats with the flatter
/// staircase's step from `lcm(d1, d2)`.
fn staircase_convolution(h1: &Rational, d1: &Rational, h2: &Rational, d2: &Rational) -> Result<Curve, CurveError> {
    let (length, height) = if h1 / d1 <= h2 / d2 { (d1.clone(), h1.clone()) } else { (d2.clone(), h2.clone()) };
    let start = d1.lcm(d2)?;
    let horizon = &start + &length;

    let steps = |period: &Rational| -> Result<usize, CurveError> {
        (&horizon / period)
            .ceil()
            .finite_value("staircase step count")?
            .to_integer()
            .to_usize()
            .ok_or_else(|| CurveError::NotImplemented("staircase step count exceeds the address space".to_owned()))
    };
    let mut combinations: Vec<(Rational, Rational)> = Vec::new();
    for i in 0..=steps(d1)? {
        for j in 0..=steps(d2)? {
            if i == 0 && j == 0 {
                continue;
            }
            let (i, j) = (Rational::from(i as u64), Rational::from(j as u64));
            combinations.push((&(&i * d1) + &(&j * d2), &(&i * h1) + &(&j * h2)));
        }
    }
    combinations.sort();

    // cheapest cost among the combinations reaching at least as far
    let mut cheapest: Vec<(Rational, Rational)> = Vec::with_capacity(combinations.len());
    for (reach, cost) in combinations.into_iter().rev() {
        let best = match cheapest.last() {
            Some((_, last_cost)) => Rational::min(last_cost, &cost),
            None => cost
        };
        if cheapest.last().is_some_and(|(last_reach, _)| *last_reach == reach) {
            cheapest.pop();
        }
        cheapest.push((reach, best));
    }
    cheapest.reverse();

    let mut elements = vec![Element::Point(Point::origin())];
    let mut previous = Rational::zero();
    for (reach, cost) in cheapest {
        if previous >= horizon {
            break;
        }
        let end = Rational::min(&reach, &horizon);
        elements.push(Element::Segment(Segment::constant(previous, end.clone(), cost.clone())?));
        if end < horizon {
            elements.push(Element::Point(Point::new(end.clone(), cost)?));
        }
        previous = end;
    }
    Curve::new(Sequence::new(elements)?, start, length, height)?.optimize()
}
