use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{
    Signed,
    ToPrimitive,
    Zero
};
use serde::{
    Deserialize,
    Serialize
};

use super::arithmeticerror::ArithmeticError;
use super::rational::Rational;

/// Integer field of the structural encoding: a JSON number while it fits in
/// `i64`, a decimal string beyond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntegerText {
    Small(i64),
    Large(String)
}

impl IntegerText {
    pub fn from_big(n: &BigInt) -> IntegerText {
        n.to_i64()
            .map(IntegerText::Small)
            .unwrap_or_else(|| IntegerText::Large(n.to_string()))
    }

    pub fn to_big(&self) -> Result<BigInt, ArithmeticError> {
        match self {
            IntegerText::Small(n) => Ok(BigInt::from(*n)),
            IntegerText::Large(text) => BigInt::from_str(text.trim())
                .map_err(|_| ArithmeticError::Parse(text.to_owned()))
        }
    }
}

/// `{num, den}`; `den = 0` encodes `±∞` through the sign of `num`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RationalRecord {
    num: IntegerText,
    den: IntegerText
}

impl RationalRecord {
    pub fn new(num: IntegerText, den: IntegerText) -> RationalRecord {
        RationalRecord { num, den }
    }
}

impl From<Rational> for RationalRecord {
    fn from(value: Rational) -> Self {
        let (num, den) = value.parts();
        RationalRecord {
            num: IntegerText::from_big(&num),
            den: IntegerText::from_big(&den)
        }
    }
}

impl TryFrom<RationalRecord> for Rational {
    type Error = ArithmeticError;

    fn try_from(record: RationalRecord) -> Result<Self, Self::Error> {
        let num = record.num.to_big()?;
        let den = record.den.to_big()?;
        if den.is_zero() {
            if num.is_positive() {
                Ok(Rational::PlusInfinity)
            } else if num.is_negative() {
                Ok(Rational::MinusInfinity)
            } else {
                Err(ArithmeticError::undetermined("0/0"))
            }
        } else {
            Rational::from_big(num, den)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_infinities_with_zero_denominator() {
        let json = serde_json::to_value(Rational::MinusInfinity).unwrap();
        assert_eq!(json, serde_json::json!({"num": -1, "den": 0}));
        let back: Rational = serde_json::from_value(serde_json::json!({"num": 7, "den": 0})).unwrap();
        assert_eq!(back, Rational::PlusInfinity);
    }

    #[test]
    fn large_values_travel_as_strings() {
        let big = Rational::from_str("123456789012345678901234567890/11").unwrap();
        let json = serde_json::to_string(&big).unwrap();
        assert!(json.contains("\"123456789012345678901234567890\""));
        assert!(json.contains("\"den\":11"));
        let back: Rational = serde_json::from_str(&json).unwrap();
        assert_eq!(back, big);
    }

    #[test]
    fn large_values_are_reduced_before_encoding() {
        let big = Rational::from_str("123456789012345678901234567890/7").unwrap();
        let json = serde_json::to_string(&big).unwrap();
        assert!(json.contains("\"17636684144620811271604938270\""));
        assert!(json.ends_with("\"den\":1}"));
    }

    #[test]
    fn rejects_zero_over_zero() {
        let decoded: Result<Rational, _> = serde_json::from_value(serde_json::json!({"num": 0, "den": 0}));
        assert!(decoded.is_err());
    }
}
