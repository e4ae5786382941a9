//! Copy/paste of unit positions between graphs
//!
//! Only positions travel; pasted units always receive fresh ids.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::graph::UnitGraph;
use crate::error::{RecoilError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitClipboard {
    pub positions: Vec<Vec2>,
}

impl UnitClipboard {
    /// Copy the positions of `ids`, in graph (shot) order
    pub fn copy(graph: &UnitGraph, ids: &[u32]) -> Self {
        let positions = graph
            .units()
            .iter()
            .filter(|u| ids.contains(&u.id))
            .map(|u| u.position)
            .collect();
        Self { positions }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn export(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn import(text: &str) -> Result<Self> {
        let clipboard: Self = serde_json::from_str(text.trim())?;
        if clipboard.is_empty() {
            return Err(RecoilError::EmptyClipboard);
        }
        Ok(clipboard)
    }

    /// Append every position shifted by `offset`, returning the new ids
    pub fn paste(&self, graph: &mut UnitGraph, offset: Vec2) -> Vec<u32> {
        self.positions
            .iter()
            .map(|&pos| graph.add_unit(pos + offset))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_follows_graph_order() {
        let graph = UnitGraph::from_positions([Vec2::new(0.0, 1.0), Vec2::new(0.0, 2.0), Vec2::new(0.0, 3.0)]);
        let clip = UnitClipboard::copy(&graph, &[2, 0, 99]);
        assert_eq!(clip.positions, vec![Vec2::new(0.0, 1.0), Vec2::new(0.0, 3.0)]);
    }

    #[test]
    fn test_export_import_paste() {
        let source = UnitGraph::from_positions([Vec2::new(1.0, 1.0), Vec2::new(2.0, 4.0)]);
        let text = UnitClipboard::copy(&source, &[0, 1]).export().unwrap();

        let mut target = UnitGraph::from_positions([Vec2::ZERO]);
        let clip = UnitClipboard::import(&text).unwrap();
        let new_ids = clip.paste(&mut target, Vec2::new(10.0, 0.0));

        assert_eq!(new_ids, vec![1, 2]);
        assert_eq!(target.position_at(1), Some(Vec2::new(11.0, 1.0)));
        assert_eq!(target.position_at(2), Some(Vec2::new(12.0, 4.0)));
    }

    #[test]
    fn test_import_rejects_bad_text() {
        assert!(matches!(
            UnitClipboard::import(r#"{"positions": []}"#),
            Err(RecoilError::EmptyClipboard)
        ));
        assert!(matches!(UnitClipboard::import("not json"), Err(RecoilError::Json(_))));
    }
}
