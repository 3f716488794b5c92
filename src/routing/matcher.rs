//! Route predicates.
//!
//! # Responsibilities
//! - Match the Accept header against a route's declared media type
//! - Match the request method
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - A missing Accept header accepts every media type
//! - Media ranges with `q=0` are explicit rejections
//! - Media type comparison is case-insensitive

use axum::http::{header, request::Parts, Method};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Parts) -> bool;
}

/// Matches when the client accepts the route's media type.
#[derive(Debug, Clone)]
pub struct AcceptMatcher {
    offer: String,
}

impl AcceptMatcher {
    /// Create a new accept matcher. The media type is normalized to lowercase.
    pub fn new(offer: impl Into<String>) -> Self {
        Self {
            offer: offer.into().trim().to_lowercase(),
        }
    }

    pub fn offer(&self) -> &str {
        &self.offer
    }

    /// Returns true if the Accept header value admits the offer.
    pub fn accepts(&self, accept: &str) -> bool {
        let (offer_type, offer_subtype) = split_media_type(&self.offer);

        let mut best: Option<(u8, f32)> = None;
        for range in accept.split(',') {
            let mut params = range.split(';');
            let media = params.next().unwrap_or("").trim().to_lowercase();
            if media.is_empty() {
                continue;
            }
            let quality = params
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);

            let (range_type, range_subtype) = split_media_type(&media);
            let specificity = match (range_type, range_subtype) {
                ("*", "*") => 0,
                (t, "*") if t == offer_type => 1,
                (t, s) if t == offer_type && s == offer_subtype => 2,
                _ => continue,
            };

            // The most specific matching range decides.
            if best.map_or(true, |(current, _)| specificity > current) {
                best = Some((specificity, quality));
            }
        }

        best.map_or(false, |(_, quality)| quality > 0.0)
    }
}

impl Matcher for AcceptMatcher {
    fn matches(&self, req: &Parts) -> bool {
        match req.headers.get(header::ACCEPT) {
            None => true,
            Some(value) => value
                .to_str()
                .map(|accept| self.accepts(accept))
                .unwrap_or(false),
        }
    }
}

fn split_media_type(media: &str) -> (&str, &str) {
    media.split_once('/').unwrap_or((media, ""))
}

/// Returns true if `value` looks like a `type/subtype` media type.
pub fn is_media_type(value: &str) -> bool {
    match value.trim().split_once('/') {
        Some((t, s)) => {
            !t.is_empty() && !s.is_empty() && !t.contains(char::is_whitespace) && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Matches the request method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Parts) -> bool {
        // HEAD is served by GET views.
        req.method == self.method || (self.method == Method::GET && req.method == Method::HEAD)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Default)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Parts) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}
