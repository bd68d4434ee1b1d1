use crate::{core::geo::LatLng, prelude::HashMap, MapError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a dropped marker, unique for the life of its layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(u64);

impl MarkerId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker-{}", self.0)
    }
}

/// A spotted point. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    id: MarkerId,
    position: LatLng,
    created_at: DateTime<Utc>,
}

impl Marker {
    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Append-only list of markers plus the single selected one.
///
/// Ids come from a counter rather than the creation time, so two markers
/// dropped within one clock tick stay distinct.
#[derive(Debug, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    index: HashMap<MarkerId, usize>,
    next_id: u64,
    selected: Option<MarkerId>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a marker stamped with the current time
    pub fn add(&mut self, position: LatLng) -> MarkerId {
        self.add_at(position, Utc::now())
    }

    /// Appends a marker with an explicit creation time
    pub fn add_at(&mut self, position: LatLng, created_at: DateTime<Utc>) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.index.insert(id, self.markers.len());
        self.markers.push(Marker {
            id,
            position,
            created_at,
        });
        log::debug!("added {id} at {position}");
        id
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.index.get(&id).map(|&i| &self.markers[i])
    }

    /// Markers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Selects `id`, replacing any previous selection
    pub fn select(&mut self, id: MarkerId) -> Result<()> {
        if !self.index.contains_key(&id) {
            return Err(MapError::UnknownMarker(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<MarkerId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Marker> {
        self.selected.and_then(|id| self.get(id))
    }
}
