//! Testimonial domain - endorsements submitted with a one-time key
//!
//! Testimonials and testaments share one shape and one lifecycle; the
//! [`TestimonialKind`] picks the table, cache namespaces and messages.

mod entity;
mod kind;
mod query;

pub use entity::{Testimonial, TestimonialId};
pub use kind::TestimonialKind;
pub use query::TestimonialListQuery;
