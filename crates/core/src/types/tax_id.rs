//! Brazilian tax identifier (CPF/CNPJ) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Weights for the first CNPJ check digit.
const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Weights for the second CNPJ check digit.
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Formatting characters accepted (and discarded) in a raw identifier.
const FORMATTING_CHARS: [char; 3] = ['.', '-', '/'];

/// Errors that can occur when parsing a [`TaxId`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdError {
    /// The identifier is neither 11 (CPF) nor 14 (CNPJ) digits long.
    #[error("invalid CPF/CNPJ length")]
    InvalidLength,
    /// The identifier has 11 digits but fails the CPF checksum.
    #[error("invalid CPF")]
    InvalidCpf,
    /// The identifier has 14 digits but fails the CNPJ checksum.
    #[error("invalid CNPJ")]
    InvalidCnpj,
}

/// Which kind of taxpayer a [`TaxId`] identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxIdKind {
    /// Individual taxpayer (Cadastro de Pessoas Físicas), 11 digits.
    Cpf,
    /// Legal entity (Cadastro Nacional da Pessoa Jurídica), 14 digits.
    Cnpj,
}

/// A validated, digits-only Brazilian tax identifier.
///
/// ## Normalization
///
/// Surrounding whitespace is trimmed and the usual formatting punctuation
/// (`.`, `-`, `/`) is dropped, so `111.444.777-35` and `11144477735` parse to
/// the same value. Any other non-digit character makes the input invalid.
///
/// ## Validation
///
/// - 11 digits: CPF, validated with the two mod-11 check digits
/// - 14 digits: CNPJ, validated with the two mod-11 check digits
/// - Any other length: [`TaxIdError::InvalidLength`]
/// - Sequences of a single repeated digit are never valid
///
/// ## Examples
///
/// ```
/// use client_registry_core::{TaxId, TaxIdError, TaxIdKind};
///
/// let cpf = TaxId::parse("111.444.777-35").unwrap();
/// assert_eq!(cpf.as_str(), "11144477735");
/// assert_eq!(cpf.kind(), TaxIdKind::Cpf);
///
/// assert_eq!(TaxId::parse("11111111111"), Err(TaxIdError::InvalidCpf));
/// assert_eq!(TaxId::parse("123"), Err(TaxIdError::InvalidLength));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TaxId(String);

impl TaxId {
    /// Number of digits in a CPF.
    pub const CPF_LENGTH: usize = 11;

    /// Number of digits in a CNPJ.
    pub const CNPJ_LENGTH: usize = 14;

    /// Parse and validate a `TaxId` from a raw string.
    ///
    /// The length is checked before the checksum: a value of the right length
    /// with bad check digits reports [`TaxIdError::InvalidCpf`] or
    /// [`TaxIdError::InvalidCnpj`], never [`TaxIdError::InvalidLength`].
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Contains characters other than digits and `.`, `-`, `/`
    /// - Does not have 11 or 14 digits
    /// - Fails the CPF or CNPJ check-digit algorithm
    pub fn parse(s: &str) -> Result<Self, TaxIdError> {
        let digits = normalize(s)?;

        match digits.len() {
            Self::CPF_LENGTH => {
                if !is_valid_cpf(&digits) {
                    return Err(TaxIdError::InvalidCpf);
                }
            }
            Self::CNPJ_LENGTH => {
                if !is_valid_cnpj(&digits) {
                    return Err(TaxIdError::InvalidCnpj);
                }
            }
            _ => return Err(TaxIdError::InvalidLength),
        }

        Ok(Self(digits_to_string(&digits)))
    }

    /// Complete a CPF from its 9-digit base by appending both check digits.
    ///
    /// # Errors
    ///
    /// Returns [`TaxIdError::InvalidLength`] if `base` is not 9 digits, or
    /// [`TaxIdError::InvalidCpf`] if the result is a repeated-digit sequence.
    pub fn cpf_from_base(base: &str) -> Result<Self, TaxIdError> {
        let mut digits = normalize(base)?;
        if digits.len() != Self::CPF_LENGTH - 2 {
            return Err(TaxIdError::InvalidLength);
        }
        digits.push(mod11_check_digit(&digits, cpf_weights(9)));
        digits.push(mod11_check_digit(&digits, cpf_weights(10)));
        Self::parse(&digits_to_string(&digits))
    }

    /// Complete a CNPJ from its 12-digit base by appending both check digits.
    ///
    /// # Errors
    ///
    /// Returns [`TaxIdError::InvalidLength`] if `base` is not 12 digits, or
    /// [`TaxIdError::InvalidCnpj`] if the result is a repeated-digit sequence.
    pub fn cnpj_from_base(base: &str) -> Result<Self, TaxIdError> {
        let mut digits = normalize(base)?;
        if digits.len() != Self::CNPJ_LENGTH - 2 {
            return Err(TaxIdError::InvalidLength);
        }
        digits.push(mod11_check_digit(&digits, CNPJ_FIRST_WEIGHTS));
        digits.push(mod11_check_digit(&digits, CNPJ_SECOND_WEIGHTS));
        Self::parse(&digits_to_string(&digits))
    }

    /// Returns whether this identifier is a CPF or a CNPJ.
    #[must_use]
    pub const fn kind(&self) -> TaxIdKind {
        if self.0.len() == Self::CPF_LENGTH {
            TaxIdKind::Cpf
        } else {
            TaxIdKind::Cnpj
        }
    }

    /// Returns the digits-only identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `TaxId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaxId {
    type Err = TaxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for TaxId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strip whitespace and formatting punctuation, returning digit values.
fn normalize(s: &str) -> Result<Vec<u8>, TaxIdError> {
    s.trim()
        .chars()
        .filter(|c| !FORMATTING_CHARS.contains(c))
        .map(|c| {
            c.to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .ok_or(TaxIdError::InvalidLength)
        })
        .collect()
}

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

/// Descending CPF weights for a prefix of `len` digits (`len + 1` down to 2).
fn cpf_weights(len: u32) -> impl Iterator<Item = u32> {
    (2..=len + 1).rev()
}

/// Compute one mod-11 check digit over `digits` with the given weights.
fn mod11_check_digit(digits: &[u8], weights: impl IntoIterator<Item = u32>) -> u8 {
    let sum: u32 = digits
        .iter()
        .zip(weights)
        .map(|(&d, w)| u32::from(d) * w)
        .sum();

    match sum % 11 {
        0 | 1 => 0,
        // remainder is 2..=10, so the digit is 1..=9
        r => u8::try_from(11 - r).unwrap_or(0),
    }
}

fn is_repeated_digit(digits: &[u8]) -> bool {
    digits.windows(2).all(|w| w.first() == w.last())
}

fn is_valid_cpf(digits: &[u8]) -> bool {
    if is_repeated_digit(digits) {
        return false;
    }
    let (base, check) = digits.split_at(9);
    let first = mod11_check_digit(base, cpf_weights(9));
    let (prefix, _) = digits.split_at(10);
    let second = mod11_check_digit(prefix, cpf_weights(10));
    check == [first, second]
}

fn is_valid_cnpj(digits: &[u8]) -> bool {
    if is_repeated_digit(digits) {
        return false;
    }
    let (base, check) = digits.split_at(12);
    let first = mod11_check_digit(base, CNPJ_FIRST_WEIGHTS);
    let (prefix, _) = digits.split_at(13);
    let second = mod11_check_digit(prefix, CNPJ_SECOND_WEIGHTS);
    check == [first, second]
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for TaxId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TaxId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Only normalized identifiers are ever written
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for TaxId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
