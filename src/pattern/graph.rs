//! Ordered list of recoil units that defines a pattern
//!
//! Insertion order is shot order: index 0 is the first shot. Every unit
//! carries a stable id that the authoring side uses for selection; ids are
//! unique within a graph and `next_id` is always above the largest one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{RecoilError, Result};

/// One authored point on the pattern graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoilUnit {
    /// Stable identifier (unique within its graph)
    pub id: u32,
    /// Graph-space position; x = horizontal (yaw), y = vertical (pitch)
    pub position: Vec2,
}

impl RecoilUnit {
    pub fn new(id: u32, position: Vec2) -> Self {
        Self { id, position }
    }
}

/// Sort order used by [`UnitGraph::rearrange_units`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RearrangePolicy {
    /// Bottom to top (standard vertical climb)
    #[default]
    AscendByY,
    /// Top to bottom
    DescendByY,
    /// Left to right (horizontal sweeps)
    AscendByX,
    /// Right to left
    DescendByX,
}

/// Ordered, id-stable collection of recoil units
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitGraph {
    units: Vec<RecoilUnit>,
    #[serde(default)]
    next_id: u32,
}

impl UnitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from positions, assigning ids 0..n in order
    pub fn from_positions(positions: impl IntoIterator<Item = Vec2>) -> Self {
        let mut graph = Self::new();
        for pos in positions {
            graph.add_unit(pos);
        }
        graph
    }

    // === Read path (used by the runtime) ===

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Position of the unit at `index`, or `None` past the end
    pub fn position_at(&self, index: usize) -> Option<Vec2> {
        self.units.get(index).map(|u| u.position)
    }

    pub fn unit_at(&self, index: usize) -> Option<&RecoilUnit> {
        self.units.get(index)
    }

    pub fn units(&self) -> &[RecoilUnit] {
        &self.units
    }

    /// The id the next created unit will receive
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn unit_by_id(&self, id: u32) -> Option<&RecoilUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_by_id_mut(&mut self, id: u32) -> Option<&mut RecoilUnit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// Index of the unit with `id` in shot order
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.units.iter().position(|u| u.id == id)
    }

    // === Authoring path ===

    /// Create a unit with a fresh id without inserting it
    ///
    /// If the id space is used up, existing units are renumbered first.
    pub fn create_unit(&mut self, position: Vec2) -> RecoilUnit {
        if self.next_id == u32::MAX {
            self.compact_ids();
        }
        let unit = RecoilUnit::new(self.next_id, position);
        self.next_id = self.next_id.saturating_add(1);
        unit
    }

    /// Append a unit at `position`, returning its id
    pub fn add_unit(&mut self, position: Vec2) -> u32 {
        let unit = self.create_unit(position);
        self.units.push(unit);
        unit.id
    }

    /// Insert an existing unit at `index` (clamped to the end)
    ///
    /// The unit keeps its id; `next_id` is raised past it if needed.
    /// Inserting an id that already exists leaves a duplicate for
    /// [`UnitGraph::repair_duplicate_ids`] to resolve. An id of `u32::MAX`
    /// cannot be followed, so the graph is renumbered instead.
    pub fn insert_unit(&mut self, unit: RecoilUnit, index: usize) {
        let index = index.min(self.units.len());
        self.units.insert(index, unit);
        match unit.id.checked_add(1) {
            Some(next) => self.next_id = self.next_id.max(next),
            None => self.compact_ids(),
        }
    }

    /// Remove the unit at `index`
    pub fn remove_at(&mut self, index: usize) -> Option<RecoilUnit> {
        if index >= self.units.len() {
            return None;
        }
        let removed = self.units.remove(index);
        self.reset_if_empty();
        Some(removed)
    }

    /// Remove every unit with `id`, returning how many were removed
    pub fn remove_by_id(&mut self, id: u32) -> usize {
        let before = self.units.len();
        self.units.retain(|u| u.id != id);
        self.reset_if_empty();
        before - self.units.len()
    }

    pub fn clear(&mut self) {
        self.units.clear();
        self.next_id = 0;
    }

    fn reset_if_empty(&mut self) {
        if self.units.is_empty() {
            self.next_id = 0;
        }
    }

    fn compact_ids(&mut self) {
        log::warn!("Unit ids exhausted, renumbering {} units", self.units.len());
        self.rearrange_ids();
    }

    /// Renumber all units 0..n in their current order
    pub fn rearrange_ids(&mut self) {
        self.next_id = 0;
        for unit in &mut self.units {
            unit.id = self.next_id;
            self.next_id += 1;
        }
    }

    /// Sort units geometrically; equal coordinates fall back to ascending id
    pub fn rearrange_units(&mut self, policy: RearrangePolicy) {
        let by_y = matches!(policy, RearrangePolicy::AscendByY | RearrangePolicy::DescendByY);
        let ascend = matches!(policy, RearrangePolicy::AscendByY | RearrangePolicy::AscendByX);

        self.units.sort_by(|a, b| {
            let (va, vb) = if by_y {
                (a.position.y, b.position.y)
            } else {
                (a.position.x, b.position.x)
            };
            let ord = if ascend { va.total_cmp(&vb) } else { vb.total_cmp(&va) };
            ord.then(a.id.cmp(&b.id))
        });
    }

    /// Reassign ids that appear earlier in the list, then lift `next_id`
    ///
    /// Walks from the back so the first occurrence keeps its id:
    /// `[0, 1, 2, 3, 3]` becomes `[0, 1, 2, 3, 4]`. Fails when no id is
    /// left above the largest one (asset ids near `u32::MAX`).
    pub fn repair_duplicate_ids(&mut self) -> Result<()> {
        if self.units.is_empty() {
            self.next_id = 0;
            return Ok(());
        }

        // Fresh ids must not collide with anything already present
        let max_id = self.units.iter().map(|u| u.id).max().unwrap_or(0);
        let floor = max_id.checked_add(1).ok_or(RecoilError::IdOverflow(max_id))?;
        self.next_id = self.next_id.max(floor);

        for i in (0..self.units.len()).rev() {
            let id = self.units[i].id;
            if self.units[..i].iter().any(|u| u.id == id) {
                let fresh = self.next_id;
                self.next_id = fresh.checked_add(1).ok_or(RecoilError::IdOverflow(fresh))?;
                self.units[i].id = fresh;
            }
        }
        Ok(())
    }

    /// Scale the chosen units about their centroid
    ///
    /// Unknown ids are ignored. Returns the number of units moved.
    pub fn scale_units(&mut self, ids: &[u32], factor: f32) -> usize {
        let selected: Vec<usize> = self
            .units
            .iter()
            .enumerate()
            .filter(|(_, u)| ids.contains(&u.id))
            .map(|(i, _)| i)
            .collect();
        if selected.is_empty() {
            return 0;
        }

        let centroid = selected
            .iter()
            .map(|&i| self.units[i].position)
            .fold(Vec2::ZERO, |acc, p| acc + p)
            / selected.len() as f32;

        for &i in &selected {
            let unit = &mut self.units[i];
            unit.position = centroid + (unit.position - centroid) * factor;
        }
        selected.len()
    }
}
