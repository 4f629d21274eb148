//! Domain entities: gardens and the trees planted in their cells

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// Store-assigned garden identifier.
pub type GardenId = i64;

/// Label used for trees without a recorded status.
///
/// Only ever produced by read-side views; it is never written to a store.
pub const UNKNOWN_STATUS: &str = "Không xác định";

/// A named rectangular grid of cells.
///
/// The name is the key every operation uses; `id` is opaque and owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Garden {
    pub id: GardenId,
    pub name: String,
    pub rows: u32,
    pub cols: u32,
    pub created_at: DateTime<Utc>,
    /// Planted cells only; empty cells are absent.
    #[serde(default)]
    pub trees: Vec<Tree>,
}

impl Garden {
    /// Look up the tree planted at a cell, if any.
    pub fn tree_at(&self, cell: Cell) -> Option<&Tree> {
        self.trees.iter().find(|t| t.cell() == cell)
    }
}

/// Validated input for creating a garden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGarden {
    pub name: String,
    pub rows: u32,
    pub cols: u32,
}

impl NewGarden {
    /// Validate raw client input.
    ///
    /// The name is kept verbatim and must not be blank; rows and cols must
    /// be positive and fit in `u32`.
    pub fn try_new(name: &str, rows: i64, cols: i64) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::EmptyGardenName);
        }
        let dims = u32::try_from(rows)
            .ok()
            .zip(u32::try_from(cols).ok())
            .filter(|(r, c)| *r > 0 && *c > 0);
        let Some((rows_u, cols_u)) = dims else {
            return Err(DomainError::InvalidDimensions { rows, cols });
        };

        Ok(Self {
            name: name.to_string(),
            rows: rows_u,
            cols: cols_u,
        })
    }
}

/// Coordinates of a cell inside a garden.
///
/// Not range-checked against the garden's dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: i64,
    pub col: i64,
}

impl Cell {
    pub fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Planting record attached to one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tree {
    pub row: i64,
    pub col: i64,
    #[serde(default)]
    pub variety: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: String,
    /// Public paths of uploaded photos, oldest first.
    #[serde(default)]
    pub images: Vec<String>,
    /// Opaque client records, stored verbatim.
    #[serde(default)]
    pub harvest_info: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tree {
    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }

    /// Status as displayed: the stored value, or [`UNKNOWN_STATUS`] when blank.
    pub fn status_label(&self) -> &str {
        if self.status.trim().is_empty() {
            UNKNOWN_STATUS
        } else {
            &self.status
        }
    }
}
