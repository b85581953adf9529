use std::{
    fmt::Display,
    ops::{Add, AddAssign, Sub},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const INR_CURRENCY_CODE: &str = "INR";
const PAISE_PER_RUPEE: i64 = 100;

//--------------------------------------        Paise        ---------------------------------------------------------
/// An amount of Indian rupees, held in paise (the smallest subunit) so that arithmetic is exact.
///
/// On the JSON API amounts are exchanged in major units (rupees), e.g. `199.5`. The conversion rounds to the nearest
/// paisa.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[sqlx(transparent)]
pub struct Paise(i64);

op!(binary Paise, Add, add);
op!(binary Paise, Sub, sub);
op!(inplace Paise, AddAssign, add_assign);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in paise: {0}")]
pub struct PaiseConversionError(String);

impl From<i64> for Paise {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<f64> for Paise {
    type Error = PaiseConversionError;

    /// Converts an amount in rupees into paise.
    fn try_from(rupees: f64) -> Result<Self, Self::Error> {
        if !rupees.is_finite() {
            return Err(PaiseConversionError(format!("{rupees} is not a finite amount")));
        }
        let paise = (rupees * PAISE_PER_RUPEE as f64).round();
        if paise.abs() > i64::MAX as f64 {
            return Err(PaiseConversionError(format!("{rupees} is too large")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(paise as i64))
    }
}

impl Display for Paise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}₹{}.{:02}", abs / 100, abs % 100)
    }
}

impl Paise {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_rupees(rupees: i64) -> Self {
        Self(rupees * PAISE_PER_RUPEE)
    }

    pub fn as_rupees(&self) -> f64 {
        self.0 as f64 / PAISE_PER_RUPEE as f64
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Paise) -> Option<Paise> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: i64) -> Option<Paise> {
        self.0.checked_mul(rhs).map(Self)
    }

    /// Adds up `amounts`, or returns `None` if the total does not fit.
    pub fn checked_sum<I: IntoIterator<Item = Paise>>(amounts: I) -> Option<Paise> {
        amounts.into_iter().try_fold(Self::default(), Self::checked_add)
    }
}

impl Serialize for Paise {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_rupees())
    }
}

impl<'de> Deserialize<'de> for Paise {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rupees = f64::deserialize(deserializer)?;
        Paise::try_from(rupees).map_err(serde::de::Error::custom)
    }
}
