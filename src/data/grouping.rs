//! Groups, series-to-group assignment and group-scoped references.

use std::collections::HashMap;

use egui::ecolor::Hsva;
use egui::Color32;

use crate::data::series::SeriesId;
use crate::error::{AlignError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub color: Color32,
}

/// Group metadata and the total series → group mapping.
///
/// Invariants: at least one group exists; every assigned series points at an
/// existing group; the upload and reference groups always exist.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingModel {
    groups: Vec<Group>,
    assignment: HashMap<SeriesId, String>,
    upload_group: String,
    reference_group: String,
    colors_used: usize,
}

impl Default for GroupingModel {
    fn default() -> Self {
        Self::new(&["Normal", "Abnormal"])
    }
}

const PALETTE: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
    Color32::from_rgb(227, 119, 194),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(188, 189, 34),
    Color32::from_rgb(23, 190, 207),
];

/// Fixed palette color for `index`, then a generated color once the palette is exhausted.
pub fn palette_color(index: usize) -> Color32 {
    if let Some(c) = PALETTE.get(index) {
        return *c;
    }
    // golden-ratio hue walk
    let hue = ((index - PALETTE.len()) as f32 * 0.618_034).fract();
    Hsva::new(hue, 0.65, 0.85, 1.0).into()
}

impl GroupingModel {
    /// Build a model with the given initial groups; an empty list yields a single "Default" group.
    pub fn new(names: &[&str]) -> Self {
        let mut model = Self {
            groups: Vec::new(),
            assignment: HashMap::new(),
            upload_group: String::new(),
            reference_group: String::new(),
            colors_used: 0,
        };
        let names: &[&str] = if names.is_empty() { &["Default"] } else { names };
        for name in names {
            // duplicates in the seed list are skipped
            let _ = model.add_group(name);
        }
        if model.groups.is_empty() {
            let _ = model.add_group("Default");
        }
        model.upload_group = model.groups[0].name.clone();
        model.reference_group = model.groups[0].name.clone();
        model
    }

    fn next_color(&mut self) -> Color32 {
        let i = self.colors_used;
        self.colors_used += 1;
        palette_color(i)
    }

    pub fn add_group(&mut self, name: &str) -> Result<&Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AlignError::EmptyGroupName);
        }
        if self.contains(name) {
            return Err(AlignError::GroupExists(name.to_string()));
        }
        let color = self.next_color();
        self.groups.push(Group {
            name: name.to_string(),
            color,
        });
        Ok(&self.groups[self.groups.len() - 1])
    }

    /// Delete a group, moving its members and any reference to it onto the
    /// first remaining group. Returns the fallback group name.
    pub fn delete_group(&mut self, name: &str) -> Result<String> {
        let index = self
            .groups
            .iter()
            .position(|g| g.name == name)
            .ok_or_else(|| AlignError::UnknownGroup(name.to_string()))?;
        if self.groups.len() == 1 {
            return Err(AlignError::LastGroup);
        }
        self.groups.remove(index);
        let fallback = self.groups[0].name.clone();
        for group in self.assignment.values_mut() {
            if group == name {
                *group = fallback.clone();
            }
        }
        if self.upload_group == name {
            self.upload_group = fallback.clone();
        }
        if self.reference_group == name {
            self.reference_group = fallback.clone();
        }
        Ok(fallback)
    }

    pub fn move_series(&mut self, id: &str, group: &str) -> Result<()> {
        if !self.contains(group) {
            return Err(AlignError::UnknownGroup(group.to_string()));
        }
        self.assignment.insert(id.to_string(), group.to_string());
        Ok(())
    }

    /// Group of `id`, assigning the upload group on first sight.
    pub fn assign_default(&mut self, id: &str) -> &str {
        let default = if self.contains(&self.upload_group) {
            self.upload_group.clone()
        } else {
            self.groups[0].name.clone()
        };
        self.assignment
            .entry(id.to_string())
            .or_insert(default)
            .as_str()
    }

    /// Forget the assignment of a series that is no longer loaded.
    pub fn unassign(&mut self, id: &str) -> Option<String> {
        self.assignment.remove(id)
    }

    pub fn group_of(&self, id: &str) -> Option<&str> {
        self.assignment.get(id).map(String::as_str)
    }

    /// Members of `group`, in the order given by `ids`.
    pub fn members<'a>(&self, group: &str, ids: &'a [SeriesId]) -> Vec<&'a SeriesId> {
        ids.iter()
            .filter(|id| self.group_of(id) == Some(group))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn color_of(&self, group: &str) -> Color32 {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .map(|g| g.color)
            .unwrap_or(Color32::GRAY)
    }

    pub fn upload_group(&self) -> &str {
        &self.upload_group
    }

    pub fn set_upload_group(&mut self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(AlignError::UnknownGroup(name.to_string()));
        }
        self.upload_group = name.to_string();
        Ok(())
    }

    pub fn reference_group(&self) -> &str {
        &self.reference_group
    }

    pub fn set_reference_group(&mut self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(AlignError::UnknownGroup(name.to_string()));
        }
        self.reference_group = name.to_string();
        Ok(())
    }

    /// Drop every assignment; groups and their colors stay.
    pub fn clear_assignments(&mut self) {
        self.assignment.clear();
    }
}
