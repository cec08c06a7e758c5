use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// A dog as returned by `POST /dogs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DogRecord {
    pub id: String,
    #[serde(default)]
    pub img: String,
    pub name: String,
    pub age: u32,
    pub zip_code: String,
    pub breed: String,
}

/// One page of search results as returned by `GET /dogs/search`
///
/// Only identifiers come back here; full records are resolved separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultPage {
    #[serde(rename = "resultIds")]
    pub result_ids: Vec<String>,
    pub total: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

impl SearchResultPage {
    /// Cursor URL for the requested direction, if the service returned one
    pub fn cursor(&self, direction: PageDirection) -> Option<&str> {
        match direction {
            PageDirection::Next => self.next.as_deref(),
            PageDirection::Prev => self.prev.as_deref(),
        }
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.prev.is_some()
    }

    /// Check the page against the size it was requested with
    pub fn check(&self, page_size: u32) -> Result<(), String> {
        if self.result_ids.len() > page_size as usize {
            return Err(format!(
                "page holds {} ids, more than the requested size {}",
                self.result_ids.len(),
                page_size
            ));
        }
        if self.total < self.result_ids.len() as u64 {
            return Err(format!(
                "total {} is smaller than the {} ids on the page",
                self.total,
                self.result_ids.len()
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Next,
    Prev,
}

impl FromStr for PageDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(PageDirection::Next),
            "prev" => Ok(PageDirection::Prev),
            _ => Err(AppError::NoSuchPage),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Breed,
    Name,
    Age,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort order encoded on the wire as `field:direction`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Every sort the search view offers, with its label
    pub const OPTIONS: [(SortSpec, &'static str); 6] = [
        (SortSpec::new(SortField::Breed, SortDirection::Asc), "Breed (A-Z)"),
        (SortSpec::new(SortField::Breed, SortDirection::Desc), "Breed (Z-A)"),
        (SortSpec::new(SortField::Name, SortDirection::Asc), "Name (A-Z)"),
        (SortSpec::new(SortField::Name, SortDirection::Desc), "Name (Z-A)"),
        (SortSpec::new(SortField::Age, SortDirection::Asc), "Age (Youngest First)"),
        (SortSpec::new(SortField::Age, SortDirection::Desc), "Age (Oldest First)"),
    ];

    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortField::Breed, SortDirection::Asc)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.field {
            SortField::Breed => "breed",
            SortField::Name => "name",
            SortField::Age => "age",
        };
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{}", field, direction)
    }
}

impl FromStr for SortSpec {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = s
            .split_once(':')
            .ok_or_else(|| AppError::InvalidFilter(format!("sort must be field:direction, got {:?}", s)))?;

        let field = match field {
            "breed" => SortField::Breed,
            "name" => SortField::Name,
            "age" => SortField::Age,
            other => return Err(AppError::InvalidFilter(format!("unknown sort field {:?}", other))),
        };
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => return Err(AppError::InvalidFilter(format!("unknown sort direction {:?}", other))),
        };

        Ok(Self::new(field, direction))
    }
}

/// Everything the user can filter and sort the catalog by
///
/// Fields are private so the age bounds and zip format stay valid; use the
/// setters, which reject invalid input and leave the state untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    breeds: BTreeSet<String>,
    age_min: Option<u32>,
    age_max: Option<u32>,
    zip_codes: BTreeSet<String>,
    sort: SortSpec,
}

impl FilterState {
    pub fn with_sort(sort: SortSpec) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    pub fn breeds(&self) -> &BTreeSet<String> {
        &self.breeds
    }

    pub fn age_min(&self) -> Option<u32> {
        self.age_min
    }

    pub fn age_max(&self) -> Option<u32> {
        self.age_max
    }

    pub fn zip_codes(&self) -> &BTreeSet<String> {
        &self.zip_codes
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn set_breeds<I, S>(&mut self, breeds: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.breeds = breeds
            .into_iter()
            .map(Into::into)
            .filter(|b: &String| !b.trim().is_empty())
            .collect();
    }

    pub fn set_age_range(&mut self, min: Option<u32>, max: Option<u32>) -> Result<(), AppError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(AppError::InvalidFilter(format!(
                    "minimum age {} is greater than maximum age {}",
                    min, max
                )));
            }
        }
        self.age_min = min;
        self.age_max = max;
        Ok(())
    }

    pub fn set_zip_codes<I, S>(&mut self, zip_codes: I) -> Result<(), AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut codes = BTreeSet::new();
        for zip in zip_codes {
            let zip = zip.as_ref().trim();
            if zip.is_empty() {
                continue;
            }
            if !is_zip_code(zip) {
                return Err(AppError::InvalidFilter(format!("{:?} is not a 5-digit ZIP code", zip)));
            }
            codes.insert(zip.to_string());
        }
        self.zip_codes = codes;
        Ok(())
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    /// Build a filter from submitted form pairs
    ///
    /// Repeated `breeds` and `zipCodes` keys are collected; blank `ageMin`,
    /// `ageMax` mean "no bound". `zipCodes` values may also be comma separated.
    pub fn from_pairs(pairs: &[(String, String)], fallback_sort: SortSpec) -> Result<Self, AppError> {
        let mut breeds = Vec::new();
        let mut zip_codes = Vec::new();
        let mut age_min = None;
        let mut age_max = None;
        let mut sort = fallback_sort;

        for (key, value) in pairs {
            match key.as_str() {
                "breeds" => breeds.push(value.clone()),
                "zipCodes" => zip_codes.extend(value.split(',').map(|z| z.trim().to_string())),
                "ageMin" => age_min = parse_age(value)?,
                "ageMax" => age_max = parse_age(value)?,
                "sort" if !value.is_empty() => sort = value.parse()?,
                _ => {}
            }
        }

        let mut filters = Self::with_sort(sort);
        filters.set_breeds(breeds);
        filters.set_age_range(age_min, age_max)?;
        filters.set_zip_codes(zip_codes)?;
        Ok(filters)
    }
}

fn parse_age(value: &str) -> Result<Option<u32>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| AppError::InvalidFilter(format!("age must be a non-negative whole number, got {:?}", value)))
}

fn is_zip_code(value: &str) -> bool {
    value.len() == 5 && value.bytes().all(|b| b.is_ascii_digit())
}

/// The signed-in user, persisted under the `userInfo` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Session {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            created_at: Some(chrono::Utc::now()),
        }
    }
}

/// Body of `POST /dogs/match`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(rename = "match")]
    pub matched_id: String,
}
