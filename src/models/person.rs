use crate::clients::record::RawRecord;
use crate::domain::RecordId;
use crate::models::Listable;
use crate::models::schema::{self, TableSchema, person};
use crate::normalizer::{self as n, EntityKind, FromRecord};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name shown for a performer reference that could not be resolved.
pub const PLACEHOLDER_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub description: String,
    pub birth_date: Option<NaiveDate>,
    pub height: Option<f64>,
    pub cup_size: Option<String>,
    pub measurements: Option<String>,
    pub origin: Option<String>,
    pub categories: BTreeSet<String>,
    pub genres: BTreeSet<String>,
    pub profile_url: Option<String>,
    pub views: u64,
    pub revenue: Option<f64>,
    pub content_ids: Vec<RecordId>,
    pub published: bool,
}

impl Person {
    /// Stand-in for a reference whose target could not be fetched.
    #[must_use]
    pub fn placeholder(id: RecordId) -> Self {
        Self {
            slug: id.short(),
            id,
            name: PLACEHOLDER_NAME.to_string(),
            image: None,
            description: String::new(),
            birth_date: None,
            height: None,
            cup_size: None,
            measurements: None,
            origin: None,
            categories: BTreeSet::new(),
            genres: BTreeSet::new(),
            profile_url: None,
            views: 0,
            revenue: None,
            content_ids: Vec::new(),
            published: false,
        }
    }

    /// Age in completed years on `today`.
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        let mut age = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }
}

impl FromRecord for Person {
    const KIND: EntityKind = EntityKind::Person;

    fn from_record(record: &RawRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: n::text(record, person::NAME),
            slug: record.id.short(),
            image: n::image(record, person::IMAGE),
            description: n::text(record, person::DESCRIPTION),
            birth_date: n::date(record, person::BIRTH_DATE),
            height: n::number(record, person::HEIGHT).filter(|h| *h > 0.0),
            cup_size: n::opt_text(record, person::CUP_SIZE),
            measurements: n::opt_text(record, person::MEASUREMENTS),
            origin: n::opt_text(record, person::ORIGIN),
            categories: n::tag_set(record, person::CATEGORIES),
            genres: n::tag_set(record, person::GENRES),
            profile_url: n::url(record, person::PROFILE_LINK),
            views: n::count(record, person::VIEWS),
            revenue: n::number(record, person::REVENUE),
            content_ids: n::relation_ids(record, person::CONTENTS),
            published: n::checkbox(record, person::PUBLISHED),
        }
    }

    fn is_published(&self) -> bool {
        self.published
    }
}

impl Listable for Person {
    const SCHEMA: TableSchema = schema::PERSON;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    fn genres(&self) -> &BTreeSet<String> {
        &self.genres
    }

    fn views(&self) -> u64 {
        self.views
    }

    fn revenue(&self) -> Option<f64> {
        self.revenue
    }

    fn recency(&self) -> Option<NaiveDate> {
        None
    }
}
