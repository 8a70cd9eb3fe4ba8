//! Pet domain model.
//!
//! # Responsibility
//! - Define the stored pet record and the write-path candidates for it.
//! - Enforce field rules before any value reaches storage.
//!
//! # Invariants
//! - A stored record has a positive `id`, a non-blank `name`, a `gender`
//!   drawn from the fixed enum and a non-negative `weight`.
//! - `id` is assigned by storage and never changes afterwards.
//! - `breed` may be absent; absence is a display concern only.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned row identifier.
pub type PetId = i64;

const UNKNOWN_BREED_LABEL: &str = "Unknown breed";

/// Gender code persisted in the `gender` column.
///
/// Serialized as its integer code to match the stored representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Gender {
    Unknown,
    Male,
    Female,
}

impl Gender {
    pub const UNKNOWN_CODE: i64 = 0;
    pub const MALE_CODE: i64 = 1;
    pub const FEMALE_CODE: i64 = 2;

    /// Returns the persisted integer code.
    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => Self::UNKNOWN_CODE,
            Self::Male => Self::MALE_CODE,
            Self::Female => Self::FEMALE_CODE,
        }
    }

    /// Maps a persisted code back to the enum, `None` for anything else.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            Self::UNKNOWN_CODE => Some(Self::Unknown),
            Self::MALE_CODE => Some(Self::Male),
            Self::FEMALE_CODE => Some(Self::Female),
            _ => None,
        }
    }

    /// Human-readable label for list/detail displays.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Returns whether `code` is one of the three accepted gender codes.
pub fn is_valid_gender(code: i64) -> bool {
    Gender::from_code(code).is_some()
}

impl From<Gender> for i64 {
    fn from(value: Gender) -> Self {
        value.code()
    }
}

impl TryFrom<i64> for Gender {
    type Error = PetValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or(PetValidationError::InvalidGender(value))
    }
}

/// Field-level rule violations detected before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetValidationError {
    /// Candidate has no `name` at all.
    MissingName,
    /// `name` is present but blank after trimming.
    EmptyName,
    /// Candidate has no `gender`.
    MissingGender,
    /// `gender` is outside `{0, 1, 2}`.
    InvalidGender(i64),
    /// `weight` is below zero.
    NegativeWeight(i64),
    /// Persisted or supplied `id` is not a positive integer.
    InvalidId(i64),
    /// Table name is not a plain SQL identifier.
    InvalidTableName(String),
}

impl Display for PetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "pet requires a name"),
            Self::EmptyName => write!(f, "pet name must not be empty"),
            Self::MissingGender => write!(f, "pet requires a gender"),
            Self::InvalidGender(code) => {
                write!(f, "pet requires a valid gender (0, 1 or 2), got {code}")
            }
            Self::NegativeWeight(weight) => {
                write!(f, "pet weight must be >= 0, got {weight}")
            }
            Self::InvalidId(id) => write!(f, "pet id must be positive, got {id}"),
            Self::InvalidTableName(name) => {
                write!(f, "table name `{name}` is not a plain SQL identifier")
            }
        }
    }
}

impl Error for PetValidationError {}

/// Stored pet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PetRecordWire")]
pub struct PetRecord {
    pub id: PetId,
    pub name: String,
    pub breed: Option<String>,
    pub gender: Gender,
    pub weight: i64,
}

impl PetRecord {
    /// Checks the stored-record invariants.
    pub fn validate(&self) -> Result<(), PetValidationError> {
        if self.id <= 0 {
            return Err(PetValidationError::InvalidId(self.id));
        }
        validate_name(&self.name)?;
        validate_weight(self.weight)
    }

    /// Breed text for display, falling back to a fixed label when blank.
    pub fn breed_label(&self) -> &str {
        match self.breed.as_deref() {
            Some(breed) if !breed.trim().is_empty() => breed,
            _ => UNKNOWN_BREED_LABEL,
        }
    }
}

#[derive(Deserialize)]
struct PetRecordWire {
    id: PetId,
    name: String,
    breed: Option<String>,
    gender: Gender,
    weight: i64,
}

impl TryFrom<PetRecordWire> for PetRecord {
    type Error = PetValidationError;

    fn try_from(value: PetRecordWire) -> Result<Self, Self::Error> {
        let record = Self {
            id: value.id,
            name: value.name,
            breed: value.breed,
            gender: value.gender,
            weight: value.weight,
        };
        record.validate()?;
        Ok(record)
    }
}

/// Insert candidate.
///
/// `gender` stays a raw code so that both a missing value and an out-of-range
/// value can reach validation and be reported distinctly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPet {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub gender: Option<i64>,
    /// Defaults to 0 when not supplied.
    pub weight: Option<i64>,
}

impl NewPet {
    /// Builds a complete candidate from typed values.
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: Some(name.into()),
            breed: None,
            gender: Some(gender.code()),
            weight: None,
        }
    }

    pub fn with_breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(breed.into());
        self
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Validates the candidate and resolves defaults.
    ///
    /// # Errors
    /// - `MissingName`/`EmptyName` when the name is absent or blank.
    /// - `MissingGender`/`InvalidGender` when gender is absent or out of range.
    /// - `NegativeWeight` when a supplied weight is below zero.
    pub fn validate(&self) -> Result<ValidPet<'_>, PetValidationError> {
        let name = self.name.as_deref().ok_or(PetValidationError::MissingName)?;
        validate_name(name)?;

        let gender = match self.gender {
            Some(code) => Gender::try_from(code)?,
            None => return Err(PetValidationError::MissingGender),
        };

        let weight = self.weight.unwrap_or(0);
        validate_weight(weight)?;

        Ok(ValidPet {
            name,
            breed: self.breed.as_deref(),
            gender,
            weight,
        })
    }
}

/// Borrowed view of a candidate that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidPet<'a> {
    pub name: &'a str,
    pub breed: Option<&'a str>,
    pub gender: Gender,
    pub weight: i64,
}

/// Partial update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the stored breed.
    pub breed: Option<Option<String>>,
    pub gender: Option<i64>,
    pub weight: Option<i64>,
}

impl PetChanges {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn breed(mut self, breed: Option<String>) -> Self {
        self.breed = Some(breed);
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender.code());
        self
    }

    pub fn weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.breed.is_none()
            && self.gender.is_none()
            && self.weight.is_none()
    }

    /// Validates only the fields that are present.
    pub fn validate(&self) -> Result<(), PetValidationError> {
        if let Some(name) = self.name.as_deref() {
            validate_name(name)?;
        }
        if let Some(code) = self.gender {
            Gender::try_from(code)?;
        }
        if let Some(weight) = self.weight {
            validate_weight(weight)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), PetValidationError> {
    if name.trim().is_empty() {
        return Err(PetValidationError::EmptyName);
    }
    Ok(())
}

fn validate_weight(weight: i64) -> Result<(), PetValidationError> {
    if weight < 0 {
        return Err(PetValidationError::NegativeWeight(weight));
    }
    Ok(())
}
