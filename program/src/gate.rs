//! The standalone `main` transition: a two-point membership gate over the field.

use veil_types::Field;

use crate::error::ProgramError;

/// Assert `(a - 10) * (a - 13) == 0`, i.e. `a` is 10 or 13, and return `a + b`.
pub fn main(a: Field, b: Field) -> Result<Field, ProgramError> {
    let gate = (a - Field::from_u64(10)) * (a - Field::from_u64(13));
    if !gate.is_zero() {
        return Err(ProgramError::AssertionFailed(format!(
            "(a - 10) * (a - 13) == 0 does not hold for a = {a}"
        )));
    }
    Ok(a + b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn f(v: u64) -> Field {
        Field::from_u64(v)
    }

    #[test]
    fn accepts_both_roots() {
        assert_eq!(main(f(10), f(5)).unwrap(), f(15));
        assert_eq!(main(f(13), f(5)).unwrap(), f(18));
    }

    #[test]
    fn rejects_other_values() {
        for a in [0, 9, 11, 12, 14, 100] {
            let err = main(f(a), f(5)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::AssertionFailure, "a = {a}");
        }
    }

    #[test]
    fn sum_wraps_modulo_the_prime() {
        // b = p - 1, so a + b = 9 (mod p).
        let b = Field::ZERO - Field::ONE;
        assert_eq!(main(f(10), b).unwrap(), f(9));
    }

    #[test]
    fn parsed_inputs() {
        let a: Field = "13field".parse().unwrap();
        let b: Field = "7".parse().unwrap();
        assert_eq!(main(a, b).unwrap().to_string(), "20field");
    }
}
