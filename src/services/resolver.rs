//! Relation resolver: replaces foreign ids with the records they point to.
//!
//! Each id is one independent retrieve; lookups run concurrently up to a
//! bound and results are recombined by id, never by completion order.

use crate::clients::transport::UpstreamClient;
use crate::domain::RecordId;
use crate::models::Person;
use crate::normalizer::FromRecord;
use futures::{StreamExt, stream};
use std::collections::HashMap;
use tracing::warn;

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Joined<T> {
    Resolved(T),
    /// The target failed to load or is not published.
    Placeholder(RecordId),
}

impl<T> Joined<T> {
    #[must_use]
    pub const fn resolved(&self) -> Option<&T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Placeholder(_) => None,
        }
    }

    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

impl Joined<Person> {
    /// The person, or a stand-in named "Unknown".
    #[must_use]
    pub fn into_person(self) -> Person {
        match self {
            Self::Resolved(person) => person,
            Self::Placeholder(id) => Person::placeholder(id),
        }
    }
}

#[derive(Clone)]
pub struct RelationResolver {
    client: UpstreamClient,
    max_concurrent: usize,
}

impl RelationResolver {
    #[must_use]
    pub fn new(client: UpstreamClient, max_concurrent: usize) -> Self {
        Self {
            client,
            max_concurrent: max_concurrent.max(1),
        }
    }

    async fn fetch<T>(&self, ids: &[RecordId]) -> HashMap<RecordId, T>
    where
        T: FromRecord + Send + 'static,
    {
        let mut unique: Vec<RecordId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !id.is_empty() && !unique.contains(id) {
                unique.push(id.clone());
            }
        }

        stream::iter(unique)
            .map(|id| {
                let client = self.client.clone();
                async move {
                    let result = client.retrieve(&id).await;
                    (id, result)
                }
            })
            .buffer_unordered(self.max_concurrent)
            .filter_map(|(id, result)| async move {
                match result {
                    Ok(record) => {
                        let value = T::from_record(&record);
                        if value.is_published() {
                            Some((id, value))
                        } else {
                            warn!(kind = %T::KIND, id = %id, "Related record is not published");
                            None
                        }
                    }
                    Err(err) => {
                        warn!(kind = %T::KIND, id = %id, error = %err, "Failed to resolve related record");
                        None
                    }
                }
            })
            .collect()
            .await
    }

    /// Resolves `ids` in their given order. Never fails: every id that cannot
    /// be shown becomes a [`Joined::Placeholder`].
    pub async fn resolve<T>(&self, ids: &[RecordId]) -> Vec<Joined<T>>
    where
        T: FromRecord + Clone + Send + 'static,
    {
        let fetched = self.fetch::<T>(ids).await;
        ids.iter()
            .map(|id| match fetched.get(id) {
                Some(value) => Joined::Resolved(value.clone()),
                None => {
                    metrics::counter!("relation_placeholders_total").increment(1);
                    Joined::Placeholder(id.clone())
                }
            })
            .collect()
    }

    /// Same as [`RelationResolver::resolve`], keyed by id.
    pub async fn lookup_map<T>(&self, ids: &[RecordId]) -> HashMap<RecordId, Joined<T>>
    where
        T: FromRecord + Clone + Send + 'static,
    {
        ids.iter()
            .cloned()
            .zip(self.resolve::<T>(ids).await)
            .collect()
    }
}
