use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;

use crate::models::Shoe;

/// Errors raised while loading or validating the catalogue
#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    #[error("failed to read catalogue at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalogue: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalogue record has an empty shoeId")]
    EmptyId,

    #[error("duplicate shoeId {0}")]
    DuplicateId(String),

    #[error("shoe {shoe_id}: {field} rating {value} is outside 1-5")]
    RatingOutOfRange {
        shoe_id: String,
        field: &'static str,
        value: u8,
    },

    #[error("shoe {shoe_id}: {field} must be a non-negative number")]
    InvalidMeasurement { shoe_id: String, field: &'static str },
}

/// Read-only shoe catalogue, loaded once at startup and shared by reference
#[derive(Debug)]
pub struct Catalogue {
    shoes: Vec<Shoe>,
    index: HashMap<String, usize>,
    loaded_at: DateTime<Utc>,
}

impl Catalogue {
    /// Validates records and builds the id index
    pub fn from_shoes(shoes: Vec<Shoe>) -> Result<Self, CatalogueError> {
        let mut index = HashMap::with_capacity(shoes.len());

        for (position, shoe) in shoes.iter().enumerate() {
            validate_record(shoe)?;
            if index.insert(shoe.shoe_id.clone(), position).is_some() {
                return Err(CatalogueError::DuplicateId(shoe.shoe_id.clone()));
            }
        }

        Ok(Self {
            shoes,
            index,
            loaded_at: Utc::now(),
        })
    }

    /// Parses a JSON array of catalogue records
    pub fn from_json(json: &str) -> Result<Self, CatalogueError> {
        let shoes: Vec<Shoe> = serde_json::from_str(json)?;
        Self::from_shoes(shoes)
    }

    /// Loads the catalogue file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let catalogue = Self::from_json(&json)?;

        tracing::info!(
            path = %path.display(),
            shoe_count = catalogue.len(),
            "Catalogue loaded"
        );

        Ok(catalogue)
    }

    /// Catalogue with no records; every analysis against it fails with a resource error
    pub fn empty() -> Self {
        Self {
            shoes: Vec::new(),
            index: HashMap::new(),
            loaded_at: Utc::now(),
        }
    }

    pub fn get(&self, shoe_id: &str) -> Option<&Shoe> {
        self.index.get(shoe_id).map(|&i| &self.shoes[i])
    }

    pub fn shoes(&self) -> &[Shoe] {
        &self.shoes
    }

    pub fn len(&self) -> usize {
        self.shoes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shoes.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn validate_record(shoe: &Shoe) -> Result<(), CatalogueError> {
    if shoe.shoe_id.trim().is_empty() {
        return Err(CatalogueError::EmptyId);
    }

    let ratings = [
        ("cushionSoftness", shoe.cushion_softness),
        ("bounce", shoe.bounce),
        ("stability", shoe.stability),
        ("rocker", shoe.rocker),
        ("groundFeel", shoe.ground_feel),
        ("weightFeel", shoe.weight_feel),
    ];
    for (field, rating) in ratings {
        if let Some(value) = rating {
            if !(1..=5).contains(&value) {
                return Err(CatalogueError::RatingOutOfRange {
                    shoe_id: shoe.shoe_id.clone(),
                    field,
                    value,
                });
            }
        }
    }

    let measurements = [
        ("heelDropMm", shoe.heel_drop_mm),
        ("weightG", shoe.weight_g),
        ("retailPriceUsd", shoe.retail_price_usd),
    ];
    for (field, measurement) in measurements {
        if let Some(value) = measurement {
            if !value.is_finite() || value < 0.0 {
                return Err(CatalogueError::InvalidMeasurement {
                    shoe_id: shoe.shoe_id.clone(),
                    field,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SHOES: &str = r#"[
        { "shoeId": "a", "brand": "Brand", "model": "Alpha", "isDailyTrainer": true, "cushionSoftness": 3 },
        { "shoeId": "b", "brand": "Brand", "model": "Beta", "isRaceShoe": true, "heelDropMm": 8 }
    ]"#;

    #[test]
    fn test_from_json_builds_index() {
        let catalogue = Catalogue::from_json(TWO_SHOES).unwrap();
        assert_eq!(catalogue.len(), 2);
        assert_eq!(catalogue.get("b").unwrap().model, "Beta");
        assert!(catalogue.get("missing").is_none());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"[
            { "shoeId": "a", "brand": "Brand", "model": "Alpha" },
            { "shoeId": "a", "brand": "Brand", "model": "Alpha Again" }
        ]"#;
        let err = Catalogue::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogueError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_rejects_rating_out_of_range() {
        let json = r#"[{ "shoeId": "a", "brand": "Brand", "model": "Alpha", "bounce": 6 }]"#;
        let err = Catalogue::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            CatalogueError::RatingOutOfRange { field: "bounce", value: 6, .. }
        ));
    }

    #[test]
    fn test_rejects_negative_drop() {
        let json = r#"[{ "shoeId": "a", "brand": "Brand", "model": "Alpha", "heelDropMm": -1 }]"#;
        let err = Catalogue::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            CatalogueError::InvalidMeasurement { field: "heelDropMm", .. }
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Catalogue::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogueError::Io { .. }));
    }

    #[test]
    fn test_bundled_catalogue_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/catalogue.json");
        let catalogue = Catalogue::load(path).unwrap();
        assert!(catalogue.len() >= 20);
    }

    #[test]
    fn test_empty_catalogue() {
        let catalogue = Catalogue::empty();
        assert!(catalogue.is_empty());
        assert!(catalogue.shoes().is_empty());
    }
}
