//! Shared data models for pedigree resolution
//!
//! These types describe birds exactly as the lookup service hands them out. They are
//! read-only to the resolver: the engine never mutates a [`BirdRef`] it received, it only
//! copies one into a [`TreeNode`](crate::pedigree::TreeNode) with the raw parent links
//! stripped.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "identifier": "NL-2021-1234567",
//!   "name": "Blue Lightning",
//!   "gender": "male",
//!   "color": "blue bar",
//!   "birth_date": "2021-03-14",
//!   "father": { "identifier": "NL-2018-7654321", "gender": "male" },
//!   "mother": "BE-2019-1112223"
//! }
//! ```
//!
//! A parent given as an object is an embedded record; a parent given as a string is a
//! bare identifier that has to be looked up. Missing or `null` means no parent is known.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Sex of a bird as recorded by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Cock
    Male,
    /// Hen
    Female,
    /// Not recorded, or recorded with a value we do not recognise
    #[default]
    Unknown,
}

impl Gender {
    /// Interpret a free-form gender code. Unrecognised codes map to [`Gender::Unknown`].
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "male" | "m" | "cock" => Self::Male,
            "female" | "f" | "hen" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::from_code).unwrap_or_default())
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Which parent slot of a bird is being talked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentSlot {
    /// Sire
    Father,
    /// Dam
    Mother,
}

impl fmt::Display for ParentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Father => write!(f, "father"),
            Self::Mother => write!(f, "mother"),
        }
    }
}

/// Raw, unresolved representation of one parent relationship.
///
/// An absent parent is modelled as `Option::<ParentLink>::None` on the owning
/// [`BirdRef`], so this enum only has the two present forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParentLink {
    /// The full parent record is already embedded; no lookup needed.
    Embedded(Box<BirdRef>),
    /// Only the parent's identifier is known; it must be looked up.
    Identifier(String),
}

impl ParentLink {
    /// Bare identifier link.
    pub fn code(identifier: impl Into<String>) -> Self {
        Self::Identifier(identifier.into())
    }

    /// Embedded record link.
    #[must_use]
    pub fn embedded(bird: BirdRef) -> Self {
        Self::Embedded(Box::new(bird))
    }
}

impl From<BirdRef> for ParentLink {
    fn from(bird: BirdRef) -> Self {
        Self::embedded(bird)
    }
}

impl From<&str> for ParentLink {
    fn from(code: &str) -> Self {
        Self::code(code)
    }
}

/// A bird record with its core descriptive attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdRef {
    /// Ring number, stored with its original casing.
    #[serde(alias = "ring_number")]
    pub identifier: String,

    /// Optional display name given by the owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub gender: Gender,

    /// Plumage color, e.g. "blue bar" or "red checker".
    #[serde(default, alias = "colour", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<ParentLink>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother: Option<ParentLink>,
}

impl BirdRef {
    /// Create a bird with only an identifier; every other attribute is unknown.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: None,
            gender: Gender::Unknown,
            color: None,
            birth_date: None,
            father: None,
            mother: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_birth_date(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_father(mut self, link: impl Into<ParentLink>) -> Self {
        self.father = Some(link.into());
        self
    }

    #[must_use]
    pub fn with_mother(mut self, link: impl Into<ParentLink>) -> Self {
        self.mother = Some(link.into());
        self
    }

    /// The raw link stored in the given parent slot.
    #[must_use]
    pub fn parent(&self, slot: ParentSlot) -> Option<&ParentLink> {
        match slot {
            ParentSlot::Father => self.father.as_ref(),
            ParentSlot::Mother => self.mother.as_ref(),
        }
    }

    /// Shallow copy of this record with both parent links removed.
    #[must_use]
    pub fn without_parents(&self) -> Self {
        Self {
            father: None,
            mother: None,
            ..self.clone()
        }
    }

    /// Label used by text renderers: `identifier "name"` or just the identifier.
    #[must_use]
    pub fn label(&self) -> String {
        match self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(name) => format!("{} \"{}\"", self.identifier, name),
            None => self.identifier.clone(),
        }
    }
}

/// One race result in a bird's competition history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionResult {
    /// Race or event name.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Race distance in kilometres.
    #[serde(default, alias = "distance", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,

    /// Finishing position, 1-based.
    #[serde(default, alias = "place", skip_serializing_if = "Option::is_none")]
    pub placement: Option<u32>,
}

impl CompetitionResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: None,
            distance_km: None,
            placement: None,
        }
    }

    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn with_distance_km(mut self, distance_km: f64) -> Self {
        self.distance_km = Some(distance_km);
        self
    }

    #[must_use]
    pub fn with_placement(mut self, placement: u32) -> Self {
        self.placement = Some(placement);
        self
    }
}
