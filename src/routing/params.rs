//! Parameter extraction.
//!
//! Query parameters and path captures are merged into one flat, sanitized
//! [`ParamBag`]. When a key appears in both sources the path capture wins.

use std::collections::{BTreeMap, HashMap};

use crate::http::request::RouteRequest;
use crate::security::sanitize;

/// Flat mapping of sanitized request parameters.
pub type ParamBag = BTreeMap<String, String>;

/// Build the parameter bag for `req`, taking capture names from `req.route_keys`.
pub fn get_params(req: &RouteRequest) -> ParamBag {
    extract(&req.query, &req.route_keys, &req.params)
}

/// Merge `query` with the entries of `bound` named by `keys`.
///
/// Bound params that are not listed in `keys` are framework state, not
/// captures, and are skipped.
pub fn extract(
    query: &BTreeMap<String, String>,
    keys: &[String],
    bound: &HashMap<String, String>,
) -> ParamBag {
    let mut bag: ParamBag = query
        .iter()
        .map(|(k, v)| (k.clone(), sanitize(v)))
        .collect();

    for key in keys {
        if let Some(value) = bound.get(key) {
            bag.insert(key.clone(), sanitize(value));
        }
    }

    bag
}
