//! Testimonial list query

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Testimonial, TestimonialId};
use super::kind::TestimonialKind;
use crate::domain::cache::PayloadKey;
use crate::domain::listing::{order_and_page, prefix_matches, within, SortOrder};

/// Filters, ordering and paging for testimonial listings
///
/// `author` must match exactly, `bio` and `content` match by prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialListQuery {
    /// Drop the cached result before reading
    #[serde(default, skip_serializing)]
    pub revalidate: Option<bool>,
    pub id: Option<TestimonialId>,
    pub created_at_from: Option<DateTime<Utc>>,
    pub created_at_to: Option<DateTime<Utc>>,
    pub updated_at_from: Option<DateTime<Utc>>,
    pub updated_at_to: Option<DateTime<Utc>>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
    pub order: Option<SortOrder>,
    pub author: Option<String>,
    pub bio: Option<String>,
    pub content: Option<String>,
}

impl TestimonialListQuery {
    pub fn revalidate(&self) -> bool {
        self.revalidate.unwrap_or(false)
    }

    /// Cache key for this query within `kind`'s namespace, ignoring `revalidate`
    pub fn cache_key(&self, kind: TestimonialKind) -> String {
        PayloadKey::new(kind.cache_namespace())
            .component(&self.created_at_from)
            .component(&self.created_at_to)
            .component(&self.updated_at_from)
            .component(&self.updated_at_to)
            .component(&self.skip)
            .component(&self.take)
            .component(&self.order)
            .component(&self.id)
            .component(&self.author)
            .component(&self.bio)
            .component(&self.content)
            .build()
    }

    pub fn matches(&self, testimonial: &Testimonial) -> bool {
        if self.id.is_some_and(|id| &id != testimonial.id()) {
            return false;
        }

        if !within(testimonial.created_at(), self.created_at_from, self.created_at_to)
            || !within(testimonial.updated_at(), self.updated_at_from, self.updated_at_to)
        {
            return false;
        }

        if self.author.as_deref().is_some_and(|author| author != testimonial.author()) {
            return false;
        }

        prefix_matches(self.bio.as_deref(), testimonial.bio())
            && prefix_matches(self.content.as_deref(), Some(testimonial.content()))
    }

    /// Filter, order by `createdAt`, then page
    pub fn apply(&self, testimonials: Vec<Testimonial>) -> Vec<Testimonial> {
        let matching: Vec<Testimonial> =
            testimonials.into_iter().filter(|t| self.matches(t)).collect();

        order_and_page(matching, Testimonial::created_at, self.order, self.skip, self.take)
    }
}
