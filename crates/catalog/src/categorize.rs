//! Keyword-based rail categorization.
//!
//! The API has no salon/cleaning/appliance taxonomy; the home page
//! derives one by substring matching over the text the service carries.
//! This is a heuristic, kept as a pure function so the keyword tables
//! can be tuned against fixtures.

use crate::service::Service;

/// Cap per categorized rail.
pub const BUCKET_LIMIT: usize = 6;

pub const SALON_KEYWORDS: &[&str] = &[
    "salon", "beauty", "makeup", "facial", "waxing", "manicure", "pedicure", "haircut", "hair",
    "spa",
];

pub const CLEANING_KEYWORDS: &[&str] = &[
    "cleaning",
    "clean",
    "housekeeping",
    "sanitize",
    "deep clean",
    "kitchen",
    "bathroom",
];

pub const APPLIANCE_KEYWORDS: &[&str] = &[
    "appliance",
    "repair",
    "ac",
    "washing machine",
    "refrigerator",
    "microwave",
    "geyser",
    "tv",
];

pub const HOME_REPAIR_KEYWORDS: &[&str] = &[
    "plumbing",
    "electrical",
    "carpenter",
    "painting",
    "repair",
    "fix",
    "install",
];

/// Case-insensitive: does `text` contain any of `keywords` as a substring?
pub fn matches_keywords(text: &str, keywords: &[&str]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|kw| text.contains(&kw.to_lowercase()))
}

fn searchable_text(service: &Service) -> String {
    format!(
        "{} {} {}",
        service.name,
        service.description.as_deref().unwrap_or(""),
        service.category.as_deref().unwrap_or("")
    )
}

/// The four keyword-derived home-page rails, each capped at
/// [`BUCKET_LIMIT`]. A service can appear in more than one bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBuckets {
    pub salon: Vec<Service>,
    pub cleaning: Vec<Service>,
    pub appliance: Vec<Service>,
    pub home_repair: Vec<Service>,
}

pub fn bucketize(services: &[Service]) -> CategoryBuckets {
    let collect = |keywords: &[&str]| {
        services
            .iter()
            .filter(|s| matches_keywords(&searchable_text(s), keywords))
            .take(BUCKET_LIMIT)
            .cloned()
            .collect()
    };

    CategoryBuckets {
        salon: collect(SALON_KEYWORDS),
        cleaning: collect(CLEANING_KEYWORDS),
        appliance: collect(APPLIANCE_KEYWORDS),
        home_repair: collect(HOME_REPAIR_KEYWORDS),
    }
}

/// The "more services" rail: everything not already flagged popular or
/// premium, capped at [`BUCKET_LIMIT`].
pub fn others(services: &[Service]) -> Vec<Service> {
    services
        .iter()
        .filter(|s| !s.is_popular && !s.is_premium)
        .take(BUCKET_LIMIT)
        .cloned()
        .collect()
}
