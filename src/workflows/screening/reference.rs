use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;

/// Expected market price band for a normalized category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub lower: f64,
    pub upper: f64,
    pub midpoint: f64,
}

impl PriceRange {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            midpoint: (lower + upper) / 2.0,
        }
    }

    pub fn with_midpoint(lower: f64, upper: f64, midpoint: f64) -> Self {
        Self {
            lower,
            upper,
            midpoint,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    category: String,
    lower: f64,
    upper: f64,
    #[serde(default)]
    midpoint: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum IndexLoadError {
    #[error("failed to read price table: {0}")]
    Csv(#[from] csv::Error),
    #[error("category `{category}` has invalid bounds (lower {lower}, upper {upper})")]
    InvalidBounds {
        category: String,
        lower: f64,
        upper: f64,
    },
}

/// Maps a normalized category to its expected market price range.
/// Consulted, never mutated, by the criterion scorers.
#[derive(Debug, Clone, Default)]
pub struct ReferencePriceIndex {
    ranges: HashMap<String, PriceRange>,
}

impl ReferencePriceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-unit price bands for common IT-equipment categories, derived from
    /// public market surveys. Deployments with their own table should prefer
    /// [`ReferencePriceIndex::from_csv_reader`].
    pub fn builtin() -> Self {
        let mut index = Self::new();
        index.insert("notebook", PriceRange::new(2_240.0, 3_360.0));
        index.insert("desktop", PriceRange::new(2_800.0, 4_200.0));
        index.insert("tablet", PriceRange::new(1_200.0, 1_800.0));
        index.insert("smartphone", PriceRange::new(1_280.0, 1_920.0));
        index.insert("monitor", PriceRange::new(960.0, 1_440.0));
        index.insert("printer", PriceRange::new(2_000.0, 3_000.0));
        index.insert("server", PriceRange::new(144_000.0, 216_000.0));
        index.insert("network switch", PriceRange::new(16_000.0, 24_000.0));
        index.insert("projector", PriceRange::new(2_800.0, 4_200.0));
        index.insert("ip camera", PriceRange::new(3_200.0, 4_800.0));
        index
    }

    /// Load a table from CSV rows of `category,lower,upper[,midpoint]`.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, IndexLoadError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut index = Self::new();
        for row in csv_reader.deserialize::<PriceRow>() {
            let row = row?;
            if !(row.lower.is_finite() && row.upper.is_finite())
                || row.lower <= 0.0
                || row.upper < row.lower
            {
                return Err(IndexLoadError::InvalidBounds {
                    category: row.category,
                    lower: row.lower,
                    upper: row.upper,
                });
            }
            let range = match row.midpoint {
                Some(midpoint) => PriceRange::with_midpoint(row.lower, row.upper, midpoint),
                None => PriceRange::new(row.lower, row.upper),
            };
            index.insert(&row.category, range);
        }
        Ok(index)
    }

    pub fn insert(&mut self, category: &str, range: PriceRange) {
        self.ranges.insert(Self::key(category), range);
    }

    pub fn lookup(&self, category: &str) -> Option<&PriceRange> {
        self.ranges.get(&Self::key(category))
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    fn key(category: &str) -> String {
        category.trim().to_lowercase()
    }
}
