use serde::{
    Deserialize,
    Serialize
};

use crate::curve::curve::Curve;
use crate::curve::curveerror::CurveError;
use crate::numbers::rational::Rational;

/// Algebraic property a curve is known to have, used to select fast paths.
///
/// Parametric variants pin down the whole curve; `Concave` and `Convex` only
/// certify the property.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CurveShape {
    #[default]
    General,
    RateLatency { rate: Rational, latency: Rational },
    SigmaRho { sigma: Rational, rho: Rational },
    Staircase { height: Rational, period: Rational },
    Delay { delay: Rational },
    Constant { value: Rational },
    Concave,
    Convex
}

impl CurveShape {
    pub fn is_general(&self) -> bool {
        matches!(self, CurveShape::General)
    }

    pub fn guarantees_concave(&self) -> bool {
        matches!(self, CurveShape::SigmaRho { .. } | CurveShape::Constant { .. } | CurveShape::Concave)
    }

    pub fn guarantees_convex(&self) -> bool {
        matches!(
            self,
            CurveShape::RateLatency { .. } | CurveShape::Delay { .. } | CurveShape::Constant { .. } | CurveShape::Convex
        )
    }

    /// The curve a parametric shape stands for; `None` for property-only tags.
    pub fn canonical_curve(&self) -> Result<Option<Curve>, CurveError> {
        Ok(match self {
            CurveShape::General | CurveShape::Concave | CurveShape::Convex => None,
            CurveShape::RateLatency { rate, latency } => Some(Curve::rate_latency(rate.clone(), latency.clone())?),
            CurveShape::SigmaRho { sigma, rho } => Some(Curve::sigma_rho(sigma.clone(), rho.clone())?),
            CurveShape::Staircase { height, period } => Some(Curve::staircase(height.clone(), period.clone())?),
            CurveShape::Delay { delay } => Some(Curve::delay(delay.clone())?),
            CurveShape::Constant { value } => Some(Curve::constant(value.clone())?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_tags_serialize_by_kind() {
        let shape = CurveShape::RateLatency { rate: Rational::from(10), latency: Rational::from(5) };
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["kind"], "rateLatency");
        let back: CurveShape = serde_json::from_value(json).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn property_guarantees() {
        assert!(CurveShape::Concave.guarantees_concave());
        assert!(!CurveShape::Concave.guarantees_convex());
        assert!(CurveShape::Delay { delay: Rational::one() }.guarantees_convex());
        assert!(CurveShape::General.canonical_curve().unwrap().is_none());
    }
}
