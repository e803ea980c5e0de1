pub const SAME_TYPE: &str = "Same type";
pub const SAME_CITY: &str = "Same area";
pub const SAME_STATE: &str = "Same region";
pub const SIMILAR_PRICE: &str = "Similar price";
pub const SAME_BEDROOMS: &str = "Same bedrooms";
pub const SIMILAR_BEDROOMS: &str = "Similar bedrooms";
pub const SAME_BATHROOMS: &str = "Same bathrooms";
pub const SIMILAR_SIZE: &str = "Similar size";

/// Display labels for the amenity keys used by listings
const FEATURE_LABELS: &[(&str, &str)] = &[
    ("pool", "Pool"),
    ("swimming_pool", "Pool"),
    ("garage", "Garage"),
    ("parking", "Parking"),
    ("security", "Security"),
    ("furnished", "Furnished"),
    ("garden", "Garden"),
    ("gym", "Gym"),
    ("balcony", "Balcony"),
    ("terrace", "Terrace"),
    ("elevator", "Elevator"),
    ("air_conditioning", "Air conditioning"),
    ("heating", "Heating"),
    ("fireplace", "Fireplace"),
    ("internet", "Internet"),
    ("generator", "Backup power"),
    ("borehole", "Borehole"),
    ("pet_friendly", "Pet friendly"),
    ("sea_view", "Sea view"),
    ("bq", "Boys' quarters"),
];

/// Human-readable label for a feature key, falling back to the raw key
pub fn feature_label(key: &str) -> &str {
    FEATURE_LABELS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
        .map_or(key, |&(_, label)| label)
}
