//! 512-bit helpers; products of three `u128` factors cannot overflow

use crate::AmmError;
use primitive_types::U512;

pub(crate) fn wide(value: u128) -> U512 {
    U512::from(value)
}

pub(crate) fn narrow(value: U512) -> Result<u128, AmmError> {
    if value > U512::from(u128::MAX) {
        return Err(AmmError::Overflow);
    }
    Ok(value.low_u128())
}

/// Saturating conversion for values that only feed a float ratio
pub(crate) fn narrow_saturating(value: U512) -> u128 {
    narrow(value).unwrap_or(u128::MAX)
}
