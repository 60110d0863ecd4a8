pub mod affiliate;
pub mod content;
pub mod genre;
pub mod person;
pub mod ranking;
pub mod review;
pub mod schema;
pub mod uniform;

pub use affiliate::AffiliateWidget;
pub use content::Content;
pub use genre::Genre;
pub use person::Person;
pub use ranking::{RankingArticle, RankingDetail};
pub use review::{Review, ReviewSubject};
pub use uniform::UniformCategory;

use crate::domain::RecordId;
use crate::normalizer::FromRecord;
use chrono::NaiveDate;
use schema::TableSchema;
use std::collections::BTreeSet;

/// Entities that the catalog listing can filter, search and sort generically.
pub trait Listable: FromRecord + Clone + Send + Sync + 'static {
    const SCHEMA: TableSchema;

    fn id(&self) -> &RecordId;

    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    fn categories(&self) -> &BTreeSet<String>;

    fn genres(&self) -> &BTreeSet<String>;

    fn views(&self) -> u64;

    fn revenue(&self) -> Option<f64>;

    fn recency(&self) -> Option<NaiveDate>;
}
