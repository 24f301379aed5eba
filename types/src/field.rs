//! Prime field elements.
//!
//! Elements live in the BLS12-377 scalar field:
//! `p = 8444461749428370424248824938781546531375899335154063827935233455917409239041`.
//!
//! Stored as four little-endian u64 limbs, always fully reduced (`< p`).
//! Textual form is the decimal value with an optional `field` suffix.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use crate::error::TypesError;

/// The field modulus, little-endian limbs.
pub const MODULUS: [u64; 4] = [
    0x0a11_8000_0000_0001,
    0x59aa_76fe_d000_0001,
    0x60b4_4d1e_5c37_b001,
    0x12ab_655e_9a2c_a556,
];

/// Literal suffix accepted (and printed) for field values.
const SUFFIX: &str = "field";

fn cmp_limbs(a: &[u64; 4], b: &[u64; 4]) -> Ordering {
    for i in (0..4).rev() {
        match a[i].cmp(&b[i]) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// `a + b`, returning the carry out of the top limb.
fn add_limbs(a: &[u64; 4], b: &[u64; 4]) -> ([u64; 4], bool) {
    let mut out = [0u64; 4];
    let mut carry = false;
    for i in 0..4 {
        let (s1, c1) = a[i].overflowing_add(b[i]);
        let (s2, c2) = s1.overflowing_add(carry as u64);
        out[i] = s2;
        carry = c1 || c2;
    }
    (out, carry)
}

/// `a - b`, returning the borrow out of the top limb.
fn sub_limbs(a: &[u64; 4], b: &[u64; 4]) -> ([u64; 4], bool) {
    let mut out = [0u64; 4];
    let mut borrow = false;
    for i in 0..4 {
        let (d1, b1) = a[i].overflowing_sub(b[i]);
        let (d2, b2) = d1.overflowing_sub(borrow as u64);
        out[i] = d2;
        borrow = b1 || b2;
    }
    (out, borrow)
}

/// An element of the scalar field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Field([u64; 4]);

impl Field {
    pub const ZERO: Self = Self([0; 4]);
    pub const ONE: Self = Self([1, 0, 0, 0]);

    pub fn from_u64(value: u64) -> Self {
        Self([value, 0, 0, 0])
    }

    /// Build an element from little-endian limbs, rejecting values `>= p`.
    pub fn from_limbs(limbs: [u64; 4]) -> Option<Self> {
        if cmp_limbs(&limbs, &MODULUS) == Ordering::Less {
            Some(Self(limbs))
        } else {
            None
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }

    pub fn double(self) -> Self {
        self + self
    }

    /// Parse a decimal literal, with or without the `field` suffix.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let digits = raw.strip_suffix(SUFFIX).unwrap_or(raw);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypesError::InvalidField(raw.to_string()));
        }
        let mut acc = [0u64; 4];
        for b in digits.bytes() {
            let mut carry = (b - b'0') as u128;
            for limb in acc.iter_mut() {
                let wide = (*limb as u128) * 10 + carry;
                *limb = wide as u64;
                carry = wide >> 64;
            }
            if carry != 0 {
                return Err(TypesError::FieldOutOfRange(raw.to_string()));
            }
        }
        Self::from_limbs(acc).ok_or_else(|| TypesError::FieldOutOfRange(raw.to_string()))
    }

    fn to_decimal(self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let mut limbs = self.0;
        let mut digits = Vec::new();
        while limbs != [0; 4] {
            let mut rem: u128 = 0;
            for limb in limbs.iter_mut().rev() {
                let cur = (rem << 64) | *limb as u128;
                *limb = (cur / 10) as u64;
                rem = cur % 10;
            }
            digits.push(b'0' + rem as u8);
        }
        digits.iter().rev().map(|&d| d as char).collect()
    }
}

impl Add for Field {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let (sum, carry) = add_limbs(&self.0, &rhs.0);
        if carry || cmp_limbs(&sum, &MODULUS) != Ordering::Less {
            Self(sub_limbs(&sum, &MODULUS).0)
        } else {
            Self(sum)
        }
    }
}

impl Sub for Field {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        let (diff, borrow) = sub_limbs(&self.0, &rhs.0);
        if borrow {
            Self(add_limbs(&diff, &MODULUS).0)
        } else {
            Self(diff)
        }
    }
}

impl Neg for Field {
    type Output = Self;
    fn neg(self) -> Self {
        Self::ZERO - self
    }
}

impl Mul for Field {
    type Output = Self;

    // Double-and-add over the bits of `rhs`, most significant first.
    fn mul(self, rhs: Self) -> Self {
        let mut acc = Self::ZERO;
        for limb in rhs.0.iter().rev() {
            for bit in (0..64).rev() {
                acc = acc.double();
                if (limb >> bit) & 1 == 1 {
                    acc = acc + self;
                }
            }
        }
        acc
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.to_decimal(), SUFFIX)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({})", self)
    }
}

impl FromStr for Field {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Field {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Field> for String {
    fn from(value: Field) -> Self {
        value.to_string()
    }
}
