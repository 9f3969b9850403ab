//! Fixed reference tables for location resolution and category assignment.
//!
//! Both tables are plain data handed to the resolver/classifier at
//! construction time, so tests can substitute smaller fixtures.

/// One venue keyword entry. Several keywords (sub-rooms, nicknames) may map
/// to the same canonical venue and share its coordinates.
#[derive(Debug, Clone)]
pub struct LocationBucket {
    pub keyword: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationBucket {
    pub fn new(keyword: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            keyword: keyword.to_string(),
            name: name.to_string(),
            latitude,
            longitude,
        }
    }
}

/// A topical category and its hand-authored bag of representative keywords.
#[derive(Debug, Clone)]
pub struct CategoryPrototype {
    pub label: String,
    pub description: String,
}

impl CategoryPrototype {
    pub fn new(label: &str, description: &str) -> Self {
        Self {
            label: label.to_string(),
            description: description.to_string(),
        }
    }
}

/// The campus venue table. Order is significant: more specific keywords come
/// before generic ones that could also match, and the first match wins.
pub fn default_location_buckets() -> Vec<LocationBucket> {
    vec![
        LocationBucket::new("Keefe", "Keefe Campus Center", 42.37141504481807, -72.51479991450528),
        LocationBucket::new("Queer", "Keefe Campus Center", 42.37141504481807, -72.51479991450528),
        LocationBucket::new("Multicultural", "Keefe Campus Center", 42.37141504481807, -72.51479991450528),
        LocationBucket::new("Friedmann", "Keefe Campus Center", 42.37141504481807, -72.51479991450528),
        LocationBucket::new("Ford", "Ford Hall", 42.36923506234738, -72.51529130962976),
        LocationBucket::new("SCCE", "Science Center", 42.37105378715133, -72.51334790776447),
        LocationBucket::new("Science Center", "Science Center", 42.37105378715133, -72.51334790776447),
        LocationBucket::new("Chapin", "Chapin Hall", 42.371771820543486, -72.51572746604714),
        LocationBucket::new("Gym", "Alumni Gymnasium", 42.368819594097864, -72.5188658145099),
        LocationBucket::new("Cage", "Alumni Gymnasium", 42.368819594097864, -72.5188658145099),
        LocationBucket::new("Lefrak", "Alumni Gymnasium", 42.368819594097864, -72.5188658145099),
        LocationBucket::new("Middleton Gym", "Alumni Gym", 42.368819594097864, -72.5188658145099),
        LocationBucket::new("Frost", "Frost Library", 42.37183195277655, -72.51699336789369),
        LocationBucket::new("Paino", "Beneski Museum of Natural History", 42.37209277500926, -72.51422459549485),
        LocationBucket::new("Powerhouse", "Powerhouse", 42.372109655195466, -72.51309270030836),
        LocationBucket::new("Converse", "Converse Hall", 42.37243680844771, -72.518433147017),
        LocationBucket::new("Assembly Room", "Converse Hall", 42.37243680844771, -72.518433147017),
        LocationBucket::new("Red Room", "Converse Hall", 42.37243680844771, -72.518433147017),
    ]
}

/// The topical category prototypes compared against event text.
pub fn default_category_prototypes() -> Vec<CategoryPrototype> {
    vec![
        CategoryPrototype::new(
            "Social",
            "social gathering party meetup networking friendship community hangout celebration",
        ),
        CategoryPrototype::new(
            "Group Business",
            "business meeting organization planning committee board administrative professional",
        ),
        CategoryPrototype::new(
            "Athletics",
            "sports game match competition athletic fitness exercise tournament physical team",
        ),
        CategoryPrototype::new(
            "Meeting",
            "meeting discussion forum gathering assembly conference consultation",
        ),
        CategoryPrototype::new(
            "Community Service",
            "volunteer service community help charity outreach support donation drive",
        ),
        CategoryPrototype::new(
            "Arts",
            "art exhibition gallery creative visual performance theater theatre display",
        ),
        CategoryPrototype::new(
            "Concert",
            "music concert performance band orchestra choir singing musical live",
        ),
        CategoryPrototype::new(
            "Arts and Craft",
            "crafts making creating DIY hands-on artistic craft project workshop art supplies",
        ),
        CategoryPrototype::new(
            "Workshop",
            "workshop training seminar learning skills development hands-on practical education",
        ),
        CategoryPrototype::new(
            "Cultural",
            "cultural diversity international multicultural heritage tradition celebration ethnic",
        ),
        CategoryPrototype::new(
            "Thoughtful Learning",
            "lecture academic learning educational intellectual discussion research scholarly",
        ),
        CategoryPrototype::new(
            "Spirituality",
            "spiritual religious meditation faith worship prayer mindfulness wellness",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_keywords_precede_generic_ones() {
        let buckets = default_location_buckets();
        let position = |kw: &str| buckets.iter().position(|b| b.keyword == kw).unwrap();
        // "SCCE" and "Science Center" both resolve to the Science Center;
        // sub-room keywords for Converse come after the building itself.
        assert!(position("SCCE") < position("Science Center"));
        assert!(position("Converse") < position("Red Room"));
    }

    #[test]
    fn test_category_labels_are_unique() {
        let prototypes = default_category_prototypes();
        let mut labels: Vec<&str> = prototypes.iter().map(|p| p.label.as_str()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), prototypes.len());
    }
}
