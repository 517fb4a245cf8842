use crate::curve::curve::Curve;
use crate::curve::curveerror::CurveError;
use crate::curve::element::element::Element;
use crate::curve::propertycache::CurveProperty;
use crate::curve::sequence::sequence::Sequence;
use crate::numbers::rational::Rational;

impl Curve {
    /// `[0, T + d]` closed at both ends: every value, limit and slope the
    /// curve ever takes appears here up to a multiple of the period height.
    fn closed_window(&self) -> Result<Sequence, CurveError> {
        self.cut(&Rational::zero(), &self.pseudo_period_end(), true, true)?.optimize()
    }

    pub fn is_continuous(&self) -> bool {
        self.properties().get_or_compute(CurveProperty::Continuous, || {
            self.closed_window()
                .map(|window| has_no_jumps(&window, false))
                .unwrap_or(false)
        })
    }

    /// `true` when no value, including the pseudo-periodic tail, is infinite.
    pub fn is_finite(&self) -> bool {
        self.properties().get_or_compute(CurveProperty::Finite, || {
            self.base_sequence().is_finite()
        })
    }

    pub fn is_ultimately_plus_infinite(&self) -> bool {
        self.period_sequence()
            .map(|period| period.elements().iter().all(Element::is_plus_infinite))
            .unwrap_or(false)
    }

    pub fn is_ultimately_minus_infinite(&self) -> bool {
        self.period_sequence()
            .map(|period| period.elements().iter().all(Element::is_minus_infinite))
            .unwrap_or(false)
    }

    pub fn is_ultimately_infinite(&self) -> bool {
        self.properties().get_or_compute(CurveProperty::UltimatelyInfinite, || {
            self.is_ultimately_plus_infinite() || self.is_ultimately_minus_infinite()
        })
    }

    /// `true` when the pseudo-periodic part is a single finite line.
    pub fn is_ultimately_affine(&self) -> bool {
        self.properties().get_or_compute(CurveProperty::UltimatelyAffine, || {
            self.try_is_ultimately_affine().unwrap_or(false)
        })
    }

    fn try_is_ultimately_affine(&self) -> Result<bool, CurveError> {
        let period = self.cut(self.pseudo_period_start(), &self.pseudo_period_end(), true, true)?.optimize()?;
        let [Element::Point(first), Element::Segment(line), Element::Point(last)] = period.elements() else {
            return Ok(false);
        };
        Ok(line.is_finite()
            && first.value() == line.right_limit_at_start_time()
            && &line.left_limit_at_end_time()? == last.value())
    }

    pub fn is_non_decreasing(&self) -> bool {
        self.properties().get_or_compute(CurveProperty::NonDecreasing, || {
            self.try_is_non_decreasing().unwrap_or(false)
        })
    }

    fn try_is_non_decreasing(&self) -> Result<bool, CurveError> {
        let window = self.closed_window()?;
        let elements = window.elements();
        for (i, element) in elements.iter().enumerate() {
            match element {
                Element::Segment(s) => {
                    if s.slope().is_negative() {
                        return Ok(false);
                    }
                },
                Element::Point(p) => {
                    if let Some(Element::Segment(before)) = i.checked_sub(1).map(|j| &elements[j]) {
                        if &before.left_limit_at_end_time()? > p.value() {
                            return Ok(false);
                        }
                    }
                    if let Some(Element::Segment(after)) = elements.get(i + 1) {
                        if p.value() > after.right_limit_at_start_time() {
                            return Ok(false);
                        }
                    }
                }
            }
        }
        Ok(true)
    }

    /// Finite, ultimately affine, continuous on `(0, +∞)` with non-increasing
    /// slopes, and `f(0) ≤ f(0+)`.
    pub fn is_concave(&self) -> bool {
        if self.shape().guarantees_concave() {
            return true;
        }
        self.properties().get_or_compute(CurveProperty::Concave, || {
            self.try_is_concave().unwrap_or(false)
        })
    }

    fn try_is_concave(&self) -> Result<bool, CurveError> {
        if !self.is_finite() || !self.is_ultimately_affine() {
            return Ok(false);
        }
        let window = self.closed_window()?;
        let elements = window.elements();
        if !has_no_jumps(&window, true) {
            return Ok(false);
        }
        if let [Element::Point(origin), Element::Segment(first), ..] = elements {
            if origin.value() > first.right_limit_at_start_time() {
                return Ok(false);
            }
        }
        let slopes: Vec<&Rational> = elements.iter().filter_map(Element::as_segment).map(|s| s.slope()).collect();
        Ok(slopes.windows(2).all(|pair| pair[0] >= pair[1]))
    }

    /// Continuous on `(0, +∞)` with non-decreasing slopes and `f(0) ≥ f(0+)`,
    /// possibly jumping to `+∞` for good after some instant.
    pub fn is_convex(&self) -> bool {
        if self.shape().guarantees_convex() {
            return true;
        }
        self.properties().get_or_compute(CurveProperty::Convex, || {
            self.try_is_convex().unwrap_or(false)
        })
    }

    fn try_is_convex(&self) -> Result<bool, CurveError> {
        let window = self.closed_window()?;
        let elements = window.elements();
        let finite_len = elements.iter().position(Element::is_plus_infinite).unwrap_or(elements.len());
        let (finite, infinite) = elements.split_at(finite_len);
        if !infinite.iter().all(Element::is_plus_infinite) || finite.iter().any(Element::is_minus_infinite) {
            return Ok(false);
        }
        if infinite.is_empty() && !self.is_ultimately_affine() {
            return Ok(false);
        }
        if finite.is_empty() {
            return Ok(true);
        }
        let prefix = Sequence::new(finite.to_vec())?;
        if !has_no_jumps(&prefix, true) {
            return Ok(false);
        }
        if let [Element::Point(origin), Element::Segment(first), ..] = finite {
            if origin.value() < first.right_limit_at_start_time() {
                return Ok(false);
            }
        }
        let slopes: Vec<&Rational> = finite.iter().filter_map(Element::as_segment).map(|s| s.slope()).collect();
        Ok(slopes.windows(2).all(|pair| pair[0] <= pair[1]))
    }

    /// `f(s + t) ≤ f(s) + f(t)` for all `s, t ≥ 0`.
    pub fn is_sub_additive(&self) -> bool {
        self.properties().get_or_compute(CurveProperty::SubAdditive, || {
            self.try_is_sub_additive().unwrap_or(false)
        })
    }

    fn try_is_sub_additive(&self) -> Result<bool, CurveError> {
        if self.value_at(&Rational::zero())?.is_negative() {
            return Ok(false);
        }
        if self.is_concave() {
            return Ok(true);
        }
        let square = self.convolution(self, None)?;
        Ok(self.minimum(&square)?.equivalent(self))
    }

    /// `f(s + t) ≥ f(s) + f(t)` for all `s, t ≥ 0`.
    pub fn is_super_additive(&self) -> bool {
        self.properties().get_or_compute(CurveProperty::SuperAdditive, || {
            self.try_is_super_additive().unwrap_or(false)
        })
    }

    fn try_is_super_additive(&self) -> Result<bool, CurveError> {
        if self.value_at(&Rational::zero())?.is_positive() {
            return Ok(false);
        }
        if self.is_convex() {
            return Ok(true);
        }
        let square = self.max_plus_convolution(self, None)?;
        Ok(self.maximum(&square)?.equivalent(self))
    }

    pub fn is_zero_at_zero(&self) -> bool {
        self.base_sequence()
            .value_at(&Rational::zero())
            .map(|value| value.is_zero())
            .unwrap_or(false)
    }

    /// Infimum of the instants where the curve is not zero; `+∞` for the zero curve.
    pub fn first_non_zero_time(&self) -> Result<Rational, CurveError> {
        let window = self.closed_window()?;
        for element in window.elements() {
            let non_zero = match element {
                Element::Point(p) => !p.value().is_zero(),
                Element::Segment(s) => !s.right_limit_at_start_time().is_zero() || !s.slope().is_zero()
            };
            if non_zero {
                return Ok(element.start_time().clone());
            }
        }
        Ok(Rational::plus_infinity())
    }
}

/// `true` when every point matches the limits of its neighbouring segments.
/// With `skip_origin` the right limit at time 0 is not compared.
fn has_no_jumps(window: &Sequence, skip_origin: bool) -> bool {
    let elements = window.elements();
    elements.iter().enumerate().all(|(i, element)| {
        let Element::Point(p) = element else {
            return true;
        };
        let left_ok = match i.checked_sub(1).map(|j| &elements[j]) {
            Some(Element::Segment(before)) => before.left_limit_at_end_time().is_ok_and(|limit| &limit == p.value()),
            _ => true
        };
        let right_ok = match elements.get(i + 1) {
            Some(Element::Segment(after)) => {
                (skip_origin && p.time().is_zero()) || after.right_limit_at_start_time() == p.value()
            },
            _ => true
        };
        left_ok && right_ok
    })
}
