//! Sample garden created on first boot against an empty store

use crate::domain::{Cell, NewGarden, TreeFields};

pub const SAMPLE_GARDEN_NAME: &str = "Vườn Mẫu";
pub const SAMPLE_GARDEN_SIZE: u32 = 5;

/// One pre-planted cell of the sample garden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleTree {
    pub row: i64,
    pub col: i64,
    pub status: &'static str,
    pub variety: &'static str,
}

pub const SAMPLE_TREES: [SampleTree; 3] = [
    SampleTree {
        row: 1,
        col: 1,
        status: "Khỏe mạnh",
        variety: "Ri6",
    },
    SampleTree {
        row: 2,
        col: 2,
        status: "Sâu bệnh",
        variety: "Ri6",
    },
    SampleTree {
        row: 3,
        col: 3,
        status: "Mới trồng",
        variety: "Chín Thơm",
    },
];

pub fn sample_garden() -> NewGarden {
    NewGarden {
        name: SAMPLE_GARDEN_NAME.to_string(),
        rows: SAMPLE_GARDEN_SIZE,
        cols: SAMPLE_GARDEN_SIZE,
    }
}

impl SampleTree {
    pub fn cell(&self) -> Cell {
        Cell::new(self.row, self.col)
    }

    pub fn fields(&self) -> TreeFields {
        TreeFields {
            variety: Some(self.variety.to_string()),
            status: Some(self.status.to_string()),
            ..Default::default()
        }
    }
}
