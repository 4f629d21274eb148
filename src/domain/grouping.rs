//! Status grouping view over a garden's trees

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::domain::Tree;

/// Trees sharing one status label.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusGroup {
    pub status: String,
    pub trees: Vec<Tree>,
}

/// Status label → trees, in order of each label's first appearance.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusGroups {
    groups: Vec<StatusGroup>,
}

impl StatusGroups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, status: &str) -> Option<&[Tree]> {
        self.groups
            .iter()
            .find(|g| g.status == status)
            .map(|g| g.trees.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.status.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusGroup> {
        self.groups.iter()
    }
}

impl Serialize for StatusGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.status, &group.trees)?;
        }
        map.end()
    }
}

/// Partition trees by status label.
///
/// Blank statuses fall under [`crate::domain::UNKNOWN_STATUS`]; the trees
/// themselves are returned unchanged.
pub fn group_by_status(trees: impl IntoIterator<Item = Tree>) -> StatusGroups {
    let mut groups: Vec<StatusGroup> = Vec::new();
    for tree in trees {
        let label = tree.status_label().to_string();
        match groups.iter_mut().find(|g| g.status == label) {
            Some(group) => group.trees.push(tree),
            None => groups.push(StatusGroup {
                status: label,
                trees: vec![tree],
            }),
        }
    }
    StatusGroups { groups }
}
