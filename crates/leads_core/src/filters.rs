use std::collections::BTreeMap;
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

pub const DEFAULT_LIMIT: u32 = 1000;
pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 5000;

/// Location is not user-editable; every run searches the same city.
pub const LOCATION: &str = "Ottawa, ON";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompanySize {
    Micro,
    Small,
    Medium,
    Large,
    Enterprise,
}

impl CompanySize {
    pub const ALL: [CompanySize; 5] = [
        CompanySize::Micro,
        CompanySize::Small,
        CompanySize::Medium,
        CompanySize::Large,
        CompanySize::Enterprise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CompanySize::Micro => "1-10",
            CompanySize::Small => "11-50",
            CompanySize::Medium => "51-200",
            CompanySize::Large => "201-500",
            CompanySize::Enterprise => "500+",
        }
    }
}

impl fmt::Display for CompanySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompanySize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CompanySize::ALL
            .into_iter()
            .find(|size| size.as_str() == trimmed)
            .ok_or_else(|| ValidationError::UnknownSize(trimmed.to_string()))
    }
}

/// Validated search criteria. Built only through [`validate_filters`] or
/// [`Filters::default`], so every instance satisfies the limit bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    keywords: Vec<String>,
    size: Option<CompanySize>,
    has_instagram: bool,
    has_linkedin: bool,
    has_phone: bool,
    limit: u32,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            size: None,
            has_instagram: false,
            has_linkedin: false,
            has_phone: false,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Filters {
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn size(&self) -> Option<CompanySize> {
        self.size
    }

    pub fn has_instagram(&self) -> bool {
        self.has_instagram
    }

    pub fn has_linkedin(&self) -> bool {
        self.has_linkedin
    }

    pub fn has_phone(&self) -> bool {
        self.has_phone
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

/// Form input exactly as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawFilters {
    pub keywords: Vec<String>,
    pub size: Option<String>,
    pub has_instagram: bool,
    pub has_linkedin: bool,
    pub has_phone: bool,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    Keywords,
    Size,
    Limit,
}

impl FilterField {
    pub fn label(self) -> &'static str {
        match self {
            FilterField::Keywords => "keywords",
            FilterField::Size => "size",
            FilterField::Limit => "limit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("limit must be a whole number, got {0:?}")]
    LimitNotInteger(String),
    #[error("limit must be between {min} and {max}, got {value}", min = MIN_LIMIT, max = MAX_LIMIT)]
    LimitOutOfRange { value: String },
    #[error("keyword #{} is empty", .index + 1)]
    EmptyKeyword { index: usize },
    #[error("unknown company size {0:?}")]
    UnknownSize(String),
}

/// Field-level validation failures, at most one per field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterErrors {
    errors: BTreeMap<FilterField, ValidationError>,
}

impl FilterErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: FilterField) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &ValidationError)> {
        self.errors.iter().map(|(field, err)| (*field, err))
    }

    fn insert(&mut self, field: FilterField, error: ValidationError) {
        self.errors.entry(field).or_insert(error);
    }
}

/// Turn raw form input into a [`Filters`] value or a per-field error map.
pub fn validate_filters(raw: &RawFilters) -> Result<Filters, FilterErrors> {
    let mut errors = FilterErrors::default();

    let mut keywords = Vec::with_capacity(raw.keywords.len());
    for (index, keyword) in raw.keywords.iter().enumerate() {
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            errors.insert(FilterField::Keywords, ValidationError::EmptyKeyword { index });
        } else {
            keywords.push(trimmed.to_string());
        }
    }

    let size = match raw.size.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(text) => match text.parse::<CompanySize>() {
            Ok(size) => Some(size),
            Err(err) => {
                errors.insert(FilterField::Size, err);
                None
            }
        },
    };

    let limit = match parse_limit(raw.limit.as_deref()) {
        Ok(limit) => limit,
        Err(err) => {
            errors.insert(FilterField::Limit, err);
            DEFAULT_LIMIT
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Filters {
        keywords,
        size,
        has_instagram: raw.has_instagram,
        has_linkedin: raw.has_linkedin,
        has_phone: raw.has_phone,
        limit,
    })
}

/// Split a comma separated tag string into keyword entries. Blank pieces are
/// dropped here, the way the tag input ignores an empty tag.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_limit(raw: Option<&str>) -> Result<u32, ValidationError> {
    let text = match raw.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_LIMIT),
        Some(text) => text,
    };
    let value = match text.parse::<i64>() {
        Ok(value) => value,
        Err(err) => {
            return Err(match err.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    ValidationError::LimitOutOfRange {
                        value: text.to_string(),
                    }
                }
                _ => ValidationError::LimitNotInteger(text.to_string()),
            })
        }
    };
    if value < i64::from(MIN_LIMIT) || value > i64::from(MAX_LIMIT) {
        return Err(ValidationError::LimitOutOfRange {
            value: text.to_string(),
        });
    }
    // Bounds checked above.
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_accepts_whitespace() {
        assert_eq!(parse_limit(Some(" 250 ")), Ok(250));
    }

    #[test]
    fn limit_rejects_fractions() {
        assert_eq!(
            parse_limit(Some("12.5")),
            Err(ValidationError::LimitNotInteger("12.5".to_string()))
        );
    }

    #[test]
    fn oversized_whole_numbers_are_out_of_range() {
        for text in ["99999999999999999999", "-99999999999999999999"] {
            assert_eq!(
                parse_limit(Some(text)),
                Err(ValidationError::LimitOutOfRange {
                    value: text.to_string()
                })
            );
        }
    }

    #[test]
    fn size_round_trips_through_label() {
        for size in CompanySize::ALL {
            assert_eq!(size.as_str().parse::<CompanySize>(), Ok(size));
        }
    }

    #[test]
    fn keyword_tags_split_on_commas() {
        assert_eq!(parse_keywords("tech, saas,, ai "), vec!["tech", "saas", "ai"]);
    }
}
