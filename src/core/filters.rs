use crate::models::{CandidateQuery, ListingStatus, Property};

impl CandidateQuery {
    /// Build the candidate pool query for a target property
    ///
    /// The pool holds active listings of the same listing type (sale or
    /// rent), never the target itself, bounded by `pool_size`.
    pub fn for_target(target: &Property, pool_size: usize) -> Self {
        Self {
            exclude_id: target.id.clone(),
            listing_type: target.listing_type.clone(),
            status: ListingStatus::Active,
            limit: pool_size,
        }
    }
}

/// Check if a fetched property satisfies the candidate pool constraints
///
/// The store applies the same constraints server-side; this re-check keeps
/// the pool correct when a backend returns loosely filtered rows.
#[inline]
pub fn matches_query_constraints(property: &Property, query: &CandidateQuery) -> bool {
    if property.id == query.exclude_id {
        return false;
    }

    if property.status.as_ref() != Some(&query.status) {
        return false;
    }

    if let Some(listing_type) = &query.listing_type {
        if property.listing_type.as_ref() != Some(listing_type) {
            return false;
        }
    }

    true
}
