//! Route name derivation.

use crate::view::Target;

/// Route name for a target: its declared name, plus `.attr` for a method.
pub fn route_name_for(target: &Target, attr: Option<&str>) -> String {
    match attr {
        Some(attr) => format!("{}.{}", target.name(), attr),
        None => target.name().to_string(),
    }
}

/// First free name among `candidate`, `candidate_0`, `candidate_1`, …
///
/// `is_taken` must see every name committed so far, so repeated
/// registrations of one target are numbered in registration order.
pub fn unique_route_name(candidate: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let mut name = candidate.to_string();
    let mut count = 0usize;
    while is_taken(&name) {
        name = format!("{}_{}", candidate, count);
        count += 1;
    }
    name
}
