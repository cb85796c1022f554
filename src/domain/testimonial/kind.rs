use std::fmt;

/// Which collection a testimonial belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestimonialKind {
    Testimonial,
    Testament,
}

impl TestimonialKind {
    /// Collection name, used for the storage table and the route prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Testimonial => "testimonials",
            Self::Testament => "testaments",
        }
    }

    /// Namespace of memoized listings
    pub fn cache_namespace(&self) -> &'static str {
        match self {
            Self::Testimonial => "Testimonials",
            Self::Testament => "Testaments",
        }
    }

    /// Namespace of one-time submission keys
    pub fn key_namespace(&self) -> &'static str {
        match self {
            Self::Testimonial => "TestimonialKey",
            Self::Testament => "TestamentKey",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Testimonial => "Testimonial",
            Self::Testament => "Testament",
        }
    }
}

impl fmt::Display for TestimonialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
