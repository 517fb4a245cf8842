use std::fmt;
use std::ops::{
    Add,
    Div,
    Mul,
    Neg,
    Sub
};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{
    One,
    Signed,
    ToPrimitive,
    Zero
};
use rust_decimal::Decimal;
use serde::{
    Deserialize,
    Serialize
};

use super::arithmeticerror::ArithmeticError;
use super::rationalrecord::RationalRecord;

// ─────────────────────────────────────────────────────────────────────────────
// Rational
// ─────────────────────────────────────────────────────────────────────────────

/// Exact rational number extended with `+∞` and `−∞`.
///
/// Finite values are kept in lowest terms with a positive denominator by
/// `BigRational`, so structural equality is numeric equality. The variant
/// order gives the total order `−∞ < finite < +∞` through the derived `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RationalRecord", into = "RationalRecord")]
pub enum Rational {
    MinusInfinity,
    Finite(BigRational),
    PlusInfinity
}

impl Rational {
    /// `num/den`, reduced. `den == 0` is rejected rather than mapped to an infinity.
    pub fn new(num: i64, den: i64) -> Result<Rational, ArithmeticError> {
        Rational::from_big(BigInt::from(num), BigInt::from(den))
    }

    pub fn from_big(num: BigInt, den: BigInt) -> Result<Rational, ArithmeticError> {
        if den.is_zero() {
            if num.is_zero() {
                Err(ArithmeticError::undetermined("0/0"))
            } else {
                Err(ArithmeticError::DivideByZero)
            }
        } else {
            Ok(Rational::Finite(BigRational::new(num, den)))
        }
    }

    pub fn from_integer(n: i64) -> Rational {
        Rational::Finite(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn zero() -> Rational {
        Rational::Finite(BigRational::zero())
    }

    pub fn one() -> Rational {
        Rational::Finite(BigRational::one())
    }

    pub fn plus_infinity() -> Rational {
        Rational::PlusInfinity
    }

    pub fn minus_infinity() -> Rational {
        Rational::MinusInfinity
    }

    /// Exact conversion: a decimal is always a terminating fraction.
    pub fn from_decimal(d: Decimal) -> Rational {
        let num = BigInt::from(d.mantissa());
        let den = num_traits::pow(BigInt::from(10), d.scale() as usize);
        Rational::Finite(BigRational::new(num, den))
    }

    /// Builds a rational from the binary expansion of `x`.
    ///
    /// Lossy with respect to the decimal literal the caller had in mind:
    /// `0.1` becomes `3602879701896397/36028797018963968`. Do not rely on it
    /// for exact comparisons; use [`Rational::new`] or [`Rational::from_decimal`].
    pub fn from_f64_lossy(x: f64) -> Result<Rational, ArithmeticError> {
        tracing::warn!(value = x, "rational built from f64, exact comparisons are unreliable");
        if x.is_nan() {
            Err(ArithmeticError::undetermined("NaN conversion"))
        } else if x == f64::INFINITY {
            Ok(Rational::PlusInfinity)
        } else if x == f64::NEG_INFINITY {
            Ok(Rational::MinusInfinity)
        } else {
            BigRational::from_float(x)
                .map(Rational::Finite)
                .ok_or(ArithmeticError::undetermined("f64 conversion"))
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Rational::MinusInfinity => f64::NEG_INFINITY,
            Rational::PlusInfinity => f64::INFINITY,
            Rational::Finite(r) => r.to_f64().unwrap_or_else(|| {
                if r.is_negative() { f64::NEG_INFINITY } else { f64::INFINITY }
            }),
        }
    }

    /// Exact decimal, when the reduced denominator only has factors 2 and 5.
    pub fn to_decimal(&self) -> Result<Decimal, ArithmeticError> {
        let r = self.finite_value("decimal conversion")?;
        let mut den = r.denom().clone();
        let two = BigInt::from(2);
        let five = BigInt::from(5);
        let mut twos = 0u32;
        let mut fives = 0u32;
        while den.is_multiple_of(&two) {
            den /= &two;
            twos += 1;
        }
        while den.is_multiple_of(&five) {
            den /= &five;
            fives += 1;
        }
        if !den.is_one() {
            return Err(ArithmeticError::NotRepresentable(self.to_string()));
        }
        let scale = twos.max(fives);
        let scaled = r.numer() * num_traits::pow(BigInt::from(10), scale as usize) / r.denom();
        let mantissa = scaled
            .to_i128()
            .ok_or_else(|| ArithmeticError::NotRepresentable(self.to_string()))?;
        Decimal::try_from_i128_with_scale(mantissa, scale)
            .map_err(|_| ArithmeticError::NotRepresentable(self.to_string()))
    }

    // ── predicates ──────────────────────────────────────────────────────────

    pub fn is_finite(&self) -> bool {
        matches!(self, Rational::Finite(_))
    }

    pub fn is_infinite(&self) -> bool {
        !self.is_finite()
    }

    pub fn is_plus_infinite(&self) -> bool {
        matches!(self, Rational::PlusInfinity)
    }

    pub fn is_minus_infinite(&self) -> bool {
        matches!(self, Rational::MinusInfinity)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Rational::Finite(r) if r.is_zero())
    }

    pub fn is_positive(&self) -> bool {
        match self {
            Rational::PlusInfinity => true,
            Rational::MinusInfinity => false,
            Rational::Finite(r) => r.is_positive(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Rational::PlusInfinity => false,
            Rational::MinusInfinity => true,
            Rational::Finite(r) => r.is_negative(),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Rational::Finite(r) if r.is_integer())
    }

    /// Numerator and denominator of the structural encoding; infinities
    /// use `den = 0` and carry their sign on `num`.
    pub fn parts(&self) -> (BigInt, BigInt) {
        match self {
            Rational::MinusInfinity => (-BigInt::one(), BigInt::zero()),
            Rational::PlusInfinity => (BigInt::one(), BigInt::zero()),
            Rational::Finite(r) => (r.numer().clone(), r.denom().clone()),
        }
    }

    pub fn finite_value(&self, operation: &'static str) -> Result<&BigRational, ArithmeticError> {
        match self {
            Rational::Finite(r) => Ok(r),
            _ => Err(ArithmeticError::not_finite(operation)),
        }
    }

    // ── checked arithmetic ──────────────────────────────────────────────────

    pub fn checked_add(&self, other: &Rational) -> Result<Rational, ArithmeticError> {
        match (self, other) {
            (Rational::Finite(a), Rational::Finite(b)) => Ok(Rational::Finite(a + b)),
            (Rational::PlusInfinity, Rational::MinusInfinity) |
            (Rational::MinusInfinity, Rational::PlusInfinity) => {
                Err(ArithmeticError::undetermined("+∞ + −∞"))
            }
            (Rational::PlusInfinity, _) | (_, Rational::PlusInfinity) => Ok(Rational::PlusInfinity),
            _ => Ok(Rational::MinusInfinity),
        }
    }

    pub fn checked_sub(&self, other: &Rational) -> Result<Rational, ArithmeticError> {
        match (self, other) {
            (Rational::PlusInfinity, Rational::PlusInfinity) |
            (Rational::MinusInfinity, Rational::MinusInfinity) => {
                Err(ArithmeticError::undetermined("∞ − ∞"))
            }
            _ => self.checked_add(&other.negate()),
        }
    }

    /// `±∞ · 0` is defined as `0`.
    pub fn checked_mul(&self, other: &Rational) -> Result<Rational, ArithmeticError> {
        match (self, other) {
            (Rational::Finite(a), Rational::Finite(b)) => Ok(Rational::Finite(a * b)),
            _ => {
                if self.is_zero() || other.is_zero() {
                    Ok(Rational::zero())
                } else if self.is_positive() == other.is_positive() {
                    Ok(Rational::PlusInfinity)
                } else {
                    Ok(Rational::MinusInfinity)
                }
            }
        }
    }

    pub fn checked_div(&self, other: &Rational) -> Result<Rational, ArithmeticError> {
        if other.is_zero() {
            return if self.is_zero() {
                Err(ArithmeticError::undetermined("0 / 0"))
            } else {
                Err(ArithmeticError::DivideByZero)
            };
        }
        match (self, other) {
            (Rational::Finite(a), Rational::Finite(b)) => Ok(Rational::Finite(a / b)),
            (Rational::Finite(_), _) => Ok(Rational::zero()),
            (_, Rational::Finite(_)) => {
                if self.is_positive() == other.is_positive() {
                    Ok(Rational::PlusInfinity)
                } else {
                    Ok(Rational::MinusInfinity)
                }
            }
            _ => Err(ArithmeticError::undetermined("∞ / ∞")),
        }
    }

    pub fn negate(&self) -> Rational {
        match self {
            Rational::MinusInfinity => Rational::PlusInfinity,
            Rational::PlusInfinity => Rational::MinusInfinity,
            Rational::Finite(r) => Rational::Finite(-r),
        }
    }

    pub fn invert(&self) -> Result<Rational, ArithmeticError> {
        Rational::one().checked_div(self)
    }

    pub fn abs(&self) -> Rational {
        if self.is_negative() { self.negate() } else { self.clone() }
    }

    pub fn min(&self, other: &Rational) -> Rational {
        if self <= other { self.clone() } else { other.clone() }
    }

    pub fn max(&self, other: &Rational) -> Rational {
        if self >= other { self.clone() } else { other.clone() }
    }

    /// Largest rational dividing both arguments an integer number of times.
    pub fn gcd(&self, other: &Rational) -> Result<Rational, ArithmeticError> {
        let a = self.finite_value("gcd")?;
        let b = other.finite_value("gcd")?;
        let den = a.denom() * b.denom();
        let num = (a.numer() * b.denom()).gcd(&(b.numer() * a.denom()));
        Rational::from_big(num, den)
    }

    /// Smallest positive rational that both arguments divide an integer number of times.
    pub fn lcm(&self, other: &Rational) -> Result<Rational, ArithmeticError> {
        let a = self.finite_value("lcm")?;
        let b = other.finite_value("lcm")?;
        let den = a.denom() * b.denom();
        let num = (a.numer() * b.denom()).lcm(&(b.numer() * a.denom()));
        Rational::from_big(num, den)
    }

    /// Infinities floor to themselves.
    pub fn floor(&self) -> Rational {
        match self {
            Rational::Finite(r) => Rational::Finite(r.floor()),
            other => other.clone(),
        }
    }

    pub fn ceil(&self) -> Rational {
        match self {
            Rational::Finite(r) => Rational::Finite(r.ceil()),
            other => other.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Rational::from_integer(n)
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Rational::from_integer(n as i64)
    }
}

impl From<u64> for Rational {
    fn from(n: u64) -> Self {
        Rational::Finite(BigRational::from_integer(BigInt::from(n)))
    }
}

impl From<BigInt> for Rational {
    fn from(n: BigInt) -> Self {
        Rational::Finite(BigRational::from_integer(n))
    }
}

impl From<BigRational> for Rational {
    fn from(r: BigRational) -> Self {
        Rational::Finite(r)
    }
}

impl From<Decimal> for Rational {
    fn from(d: Decimal) -> Self {
        Rational::from_decimal(d)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rational::MinusInfinity => write!(f, "-Infinity"),
            Rational::PlusInfinity => write!(f, "+Infinity"),
            Rational::Finite(r) => write!(f, "{}", r),
        }
    }
}

/// Accepts `a/b`, integers, decimals (`1.25`) and `±Infinity`/`±inf`.
impl FromStr for Rational {
    type Err = ArithmeticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let parse_error = || ArithmeticError::Parse(s.to_owned());
        match text.to_ascii_lowercase().as_str() {
            "+infinity" | "infinity" | "+inf" | "inf" | "∞" | "+∞" => return Ok(Rational::PlusInfinity),
            "-infinity" | "-inf" | "-∞" => return Ok(Rational::MinusInfinity),
            _ => {}
        }
        if let Some((num, den)) = text.split_once('/') {
            let num = BigInt::from_str(num.trim()).map_err(|_| parse_error())?;
            let den = BigInt::from_str(den.trim()).map_err(|_| parse_error())?;
            Rational::from_big(num, den)
        } else if text.contains('.') {
            Decimal::from_str(text)
                .map(Rational::from_decimal)
                .map_err(|_| parse_error())
        } else {
            BigInt::from_str(text)
                .map(Rational::from)
                .map_err(|_| parse_error())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────────────
//
// The std operators panic on the undetermined forms, the same way integer
// division by zero does. Algorithms that may meet infinities use `checked_*`.

macro_rules! rational_binary_operator {
    ($trait:ident, $method:ident, $checked:ident) => {
        impl $trait<&Rational> for &Rational {
            type Output = Rational;

            fn $method(self, other: &Rational) -> Rational {
                self.$checked(other).unwrap_or_else(|error| panic!("{}", error))
            }
        }

        impl $trait<Rational> for Rational {
            type Output = Rational;

            fn $method(self, other: Rational) -> Rational {
                (&self).$method(&other)
            }
        }

        impl $trait<&Rational> for Rational {
            type Output = Rational;

            fn $method(self, other: &Rational) -> Rational {
                (&self).$method(other)
            }
        }
    };
}

rational_binary_operator!(Add, add, checked_add);
rational_binary_operator!(Sub, sub, checked_sub);
rational_binary_operator!(Mul, mul, checked_mul);
rational_binary_operator!(Div, div, checked_div);

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        self.negate()
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        self.negate()
    }
}
