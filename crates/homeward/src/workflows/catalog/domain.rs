use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::identity::{UserId, UserSummary};
use crate::workflows::paging::PageRequest;

/// Identifier wrapper for pet records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PetId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Other,
}

impl Species {
    pub const fn label(self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Bird => "bird",
            Species::Rabbit => "rabbit",
            Species::Other => "other",
        }
    }

    /// Case-insensitive parse used for query-string filters.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dog" => Some(Self::Dog),
            "cat" => Some(Self::Cat),
            "bird" => Some(Self::Bird),
            "rabbit" => Some(Self::Rabbit),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Adopted,
}

impl PetStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PetStatus::Available => "available",
            PetStatus::Pending => "pending",
            PetStatus::Adopted => "adopted",
        }
    }
}

/// Persisted pet record; `added_by` is a reference, resolved at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub species: Species,
    pub breed: String,
    pub age: u8,
    pub gender: Gender,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub status: PetStatus,
    pub added_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Admin-supplied fields for a new listing. Status always starts available.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPet {
    pub name: String,
    pub species: Species,
    pub breed: String,
    pub age: u8,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Partial administrative edit. Setting `status` here is the administrative
/// override; applicants never change pet status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetUpdate {
    pub name: Option<String>,
    pub species: Option<Species>,
    pub breed: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub status: Option<PetStatus>,
}

impl PetUpdate {
    /// Folds the edit into an existing record.
    pub fn apply_to(self, pet: &mut Pet) {
        if let Some(name) = self.name {
            pet.name = name;
        }
        if let Some(species) = self.species {
            pet.species = species;
        }
        if let Some(breed) = self.breed {
            pet.breed = breed;
        }
        if let Some(age) = self.age {
            pet.age = age;
        }
        if let Some(gender) = self.gender {
            pet.gender = gender;
        }
        if let Some(description) = self.description {
            pet.description = Some(description);
        }
        if let Some(photo) = self.photo {
            pet.photo = Some(photo);
        }
        if let Some(status) = self.status {
            pet.status = status;
        }
    }
}

/// Validated caller-facing catalog query.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub species: Option<Species>,
    pub breed: Option<String>,
    pub age: Option<u8>,
    pub search: Option<String>,
    pub page: PageRequest,
}

/// Repository-level filter: the caller query plus the visibility rule the
/// service decided on. Implementations may evaluate it natively (SQL) or via
/// [`CatalogFilter::matches`].
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub species: Option<Species>,
    pub breed: Option<String>,
    pub age: Option<u8>,
    pub search: Option<String>,
    pub only_available: bool,
}

impl CatalogFilter {
    pub fn matches(&self, pet: &Pet) -> bool {
        if self.only_available && pet.status != PetStatus::Available {
            return false;
        }
        if let Some(species) = self.species {
            if pet.species != species {
                return false;
            }
        }
        if let Some(breed) = &self.breed {
            if !contains_ignore_case(&pet.breed, breed) {
                return false;
            }
        }
        if let Some(age) = self.age {
            if pet.age != age {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !contains_ignore_case(&pet.name, search) && !contains_ignore_case(&pet.breed, search)
            {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Read-time view with the owning admin resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetView {
    pub id: PetId,
    pub name: String,
    pub species: Species,
    pub breed: String,
    pub age: u8,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub status: PetStatus,
    pub added_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}

impl PetView {
    pub fn from_record(pet: Pet, added_by: Option<UserSummary>) -> Self {
        Self {
            id: pet.id,
            name: pet.name,
            species: pet.species,
            breed: pet.breed,
            age: pet.age,
            gender: pet.gender,
            description: pet.description,
            photo: pet.photo,
            status: pet.status,
            added_by,
            created_at: pet.created_at,
        }
    }
}
