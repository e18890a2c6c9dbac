// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Field denylist applied to every upstream response

use std::collections::BTreeSet;

/// Owner identity, profile identifiers and GPS endpoints.
///
/// Matching is exact and case-sensitive, so every spelling Garmin uses is
/// listed (`userProfilePK` and `userProfilePk` both occur).
pub const PERSONAL_FIELDS: &[&str] = &[
    "ownerId",
    "ownerFullName",
    "ownerDisplayName",
    "ownerProfileImageUrlLarge",
    "ownerProfileImageUrlMedium",
    "ownerProfileImageUrlSmall",
    "userId",
    "userProfilePK",
    "userProfilePk",
    "userProfileId",
    "profileId",
    "profileNumber",
    "userPro",
    "userRoles",
    "displayName",
    "fullName",
    "profileImgNameLarge",
    "profileImgNameMedium",
    "profileImgNameSmall",
    "startLatitude",
    "startLongitude",
    "endLatitude",
    "endLongitude",
];

/// Weather station coordinates approximate where the athlete was
pub const WEATHER_LOCATION_FIELDS: &[&str] = &["latitude", "longitude"];

/// Immutable set of field names removed during normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizationPolicy {
    denied: BTreeSet<String>,
}

impl SanitizationPolicy {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            denied: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The default denylist for Garmin responses
    pub fn personal_data() -> Self {
        Self::new(PERSONAL_FIELDS.iter().copied())
    }

    /// Default denylist plus weather station coordinates
    pub fn weather() -> Self {
        Self::personal_data().extended(WEATHER_LOCATION_FIELDS.iter().copied())
    }

    /// A new policy denying everything this one does plus `fields`
    pub fn extended<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut denied = self.denied.clone();
        denied.extend(fields.into_iter().map(Into::into));
        Self { denied }
    }

    pub fn denies(&self, field: &str) -> bool {
        self.denied.contains(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.denied.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.denied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.denied.is_empty()
    }
}

impl Default for SanitizationPolicy {
    fn default() -> Self {
        Self::personal_data()
    }
}
