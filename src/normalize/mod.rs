// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Response Normalizer
//!
//! Every upstream response passes through [`Normalizer`] before it reaches a
//! tool caller. Normalization never fails:
//!
//! - keys on the [`SanitizationPolicy`] denylist are removed at any depth
//! - horizontal speed fields are replaced, at the same position, by `m:ss`
//!   pace fields (vertical rates are left alone)
//! - activities can additionally be reconciled to the canonical
//!   [`ActivityRecord`] field set, whichever upstream shape they came in
//!
//! ```rust
//! use garmin_mcp_server::normalize::{Normalizer, SanitizationPolicy};
//! use serde_json::json;
//!
//! let policy = SanitizationPolicy::personal_data();
//! let normalized = Normalizer::new(&policy).normalize(json!({
//!     "startLatitude": 37.5,
//!     "distance": 1000,
//!     "averageSpeed": 2.5
//! }));
//! assert_eq!(normalized, json!({"distance": 1000, "avg_pace": "6:40"}));
//! ```

pub mod activity;
pub mod climbs;
pub mod policy;
pub mod splits;
pub mod summary;
pub mod velocity;

use serde_json::{Map, Value};

pub use activity::{is_running, reconcile_activity, ActivityRecord, ActivityShape, FieldAlias, ACTIVITY_FIELDS};
pub use climbs::summarize_climb_splits;
pub use policy::{SanitizationPolicy, PERSONAL_FIELDS, WEATHER_LOCATION_FIELDS};
pub use summary::{activity_date, RunningSummary};
pub use velocity::{pace_field_for, speed_to_pace, VELOCITY_FIELDS, VERTICAL_RATE_FIELDS};

/// Applies a borrowed, immutable policy to upstream responses
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'p> {
    policy: &'p SanitizationPolicy,
}

impl<'p> Normalizer<'p> {
    pub fn new(policy: &'p SanitizationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &'p SanitizationPolicy {
        self.policy
    }

    /// Strip denied keys and convert velocity fields to paces
    pub fn normalize(&self, raw: Value) -> Value {
        self.walk(raw, true)
    }

    /// Strip denied keys only
    pub fn strip(&self, raw: Value) -> Value {
        self.walk(raw, false)
    }

    /// Strip an activity of either shape and reconcile it to the canonical
    /// field set. Speeds are converted by the alias table, so the raw speed
    /// fields must survive stripping.
    pub fn normalize_activity(&self, raw: Value) -> ActivityRecord {
        reconcile_activity(&self.strip(raw))
    }

    fn walk(&self, value: Value, convert_velocity: bool) -> Value {
        match value {
            Value::Object(entries) => {
                // An upstream pace field wins; its speed twin is left as is
                let occupied: Vec<&str> = VELOCITY_FIELDS
                    .iter()
                    .map(|(_, pace)| *pace)
                    .filter(|pace| entries.contains_key(*pace))
                    .collect();

                let mut kept = Map::with_capacity(entries.len());
                for (key, child) in entries {
                    if self.policy.denies(&key) {
                        continue;
                    }
                    if convert_velocity {
                        if let Some(pace_key) = pace_field_for(&key).filter(|pace| !occupied.contains(pace)) {
                            kept.insert(pace_key.to_string(), speed_to_pace(&child));
                            continue;
                        }
                    }
                    kept.insert(key, self.walk(child, convert_velocity));
                }
                Value::Object(kept)
            }
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.walk(item, convert_velocity))
                    .collect(),
            ),
            scalar => scalar,
        }
    }
}

/// Normalize with a one-off policy borrow
pub fn normalize(raw: Value, policy: &SanitizationPolicy) -> Value {
    Normalizer::new(policy).normalize(raw)
}
