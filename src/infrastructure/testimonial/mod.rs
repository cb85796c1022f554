//! Testimonial infrastructure - key-gated submissions with cached listings

mod service;

pub use service::{
    CreateTestimonialRequest, TestimonialService, DEFAULT_KEY_TTL, DEFAULT_LIST_TTL,
    SUBMISSION_KEY_LENGTH,
};
