use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Declares a lower-case categorical label that tolerates unknown values.
///
/// Known labels map onto named variants; anything else is kept verbatim
/// (trimmed and lower-cased) in `Other`, so a record with a new category
/// still parses instead of failing the whole document.
macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Other(label) => label,
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                let normalized = value.trim().to_lowercase();
                match normalized.as_str() {
                    $($label => Self::$variant,)+
                    _ => Self::Other(normalized),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

label_enum! {
    /// Category of a listed property
    PropertyType {
        House => "house",
        Apartment => "apartment",
        Villa => "villa",
        Townhouse => "townhouse",
        Condo => "condo",
        Commercial => "commercial",
        Land => "land",
        Office => "office",
    }
}

label_enum! {
    /// Whether a listing is offered for sale or for rent
    ListingType {
        Sale => "sale",
        Rent => "rent",
    }
}

label_enum! {
    /// Publication status of a listing
    ListingStatus {
        Active => "active",
        Pending => "pending",
        Sold => "sold",
        Rented => "rented",
        Inactive => "inactive",
    }
}

/// Property listing as read from the data store
///
/// Every scored field is optional: the store hands back loosely-filled
/// records and the scorer treats an absent field as contributing nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Property {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "propertyType")]
    pub property_type: Option<PropertyType>,
    #[serde(default, alias = "listingType")]
    pub listing_type: Option<ListingType>,
    #[serde(default)]
    pub status: Option<ListingStatus>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub price: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub bedrooms: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub bathrooms: Option<u32>,
    /// Floor or land area in square metres
    #[serde(default, alias = "area_sqm", alias = "areaSqm", deserialize_with = "deserialize_amount")]
    pub area: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_features")]
    pub features: BTreeMap<String, bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Property {
    /// Price usable for proximity comparison (positive and finite)
    pub fn price_value(&self) -> Option<f64> {
        positive(self.price)
    }

    /// Area usable for proximity comparison (positive and finite)
    pub fn area_value(&self) -> Option<f64> {
        positive(self.area)
    }

    pub fn city_name(&self) -> Option<&str> {
        non_blank(self.city.as_deref())
    }

    pub fn state_name(&self) -> Option<&str> {
        non_blank(self.state.as_deref())
    }

    /// Feature keys asserted as `true`, in key order
    pub fn enabled_features(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(key, _)| key.as_str())
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, Some(ListingStatus::Active))
    }
}

#[inline]
fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

#[inline]
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Accept string or numeric identifiers (bigint primary keys come back as numbers)
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Room counts: whole non-negative numbers (or numeric strings); anything
/// else reads as unknown so only that factor goes unscored
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(count_from_value))
}

fn count_from_value(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(u32::MAX))
                    .map(|v| v as u64)
            })
            .and_then(|v| u32::try_from(v).ok()),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Prices and areas: any finite number (or numeric string), otherwise unknown
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(amount_from_value))
}

fn amount_from_value(value: &serde_json::Value) -> Option<f64> {
    let amount = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    amount.filter(|v| v.is_finite())
}

/// Keep only boolean-valued flags; `null` reads as an empty map
fn deserialize_features<'de, D>(deserializer: D) -> Result<BTreeMap<String, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.map(features_from_value).unwrap_or_default())
}

/// Read an amenity map out of loosely typed JSON
///
/// Anything other than an object yields an empty map; entries whose value
/// is not a boolean are skipped.
pub fn features_from_value(value: serde_json::Value) -> BTreeMap<String, bool> {
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, value)| value.as_bool().map(|flag| (key, flag)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Candidate with its similarity score and match reasons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub property: Property,
    pub score: f64,
    #[serde(rename = "matchPercentage")]
    pub match_percentage: u8,
    pub reasons: Vec<String>,
}

/// Candidate pool query parameters
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub exclude_id: String,
    pub listing_type: Option<ListingType>,
    pub status: ListingStatus,
    pub limit: usize,
}

/// Maximum points awarded by each scoring factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub property_type: f64,
    pub same_city: f64,
    pub same_state: f64,
    pub price: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub area: f64,
    pub features: f64,
}

impl ScoringWeights {
    /// Highest score a candidate can reach with these weights
    pub fn max_total(&self) -> f64 {
        self.property_type
            + self.same_city.max(self.same_state)
            + self.price
            + self.bedrooms
            + self.bathrooms
            + self.area
            + self.features
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            property_type: 25.0,
            same_city: 20.0,
            same_state: 10.0,
            price: 20.0,
            bedrooms: 10.0,
            bathrooms: 5.0,
            area: 10.0,
            features: 10.0,
        }
    }
}
