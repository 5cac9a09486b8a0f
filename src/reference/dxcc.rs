// DXCC Entity Table
// Populated from the entity header lines of cty.dat
//
// Fields:
// - id: sequential id assigned in file order, starting at 1
// - name: entity name as written in cty.dat
// - wae_only: DARC WAE entity, not valid for ARRL DXCC
// - cq_zone / itu_zone: zone numbers
// - continent: two-letter continent code
// - latitude / longitude: degrees, + is North / + is West
// - utc_offset: seconds (cty.dat stores fractional hours)
// - primary_prefix: canonical prefix with the WAE '*' marker removed

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::continent::Continent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub name: String,
    pub wae_only: bool,
    pub cq_zone: i32,
    pub itu_zone: i32,
    pub continent: Continent,
    pub latitude: f64,
    pub longitude: f64,
    pub utc_offset: i32,
    pub primary_prefix: String,
}

/// Entities stored once, indexed by id and by primary prefix
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    entities: Vec<Entity>,
    by_id: HashMap<u32, usize>,
    by_prefix: HashMap<String, usize>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity. Returns the entity back if its id or primary prefix is already present.
    pub fn insert(&mut self, entity: Entity) -> Result<(), Entity> {
        if self.by_id.contains_key(&entity.id) || self.by_prefix.contains_key(&entity.primary_prefix) {
            return Err(entity);
        }
        let index = self.entities.len();
        self.by_id.insert(entity.id, index);
        self.by_prefix.insert(entity.primary_prefix.clone(), index);
        self.entities.push(entity);
        Ok(())
    }

    /// O(1) lookup by id
    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.by_id.get(&id).map(|&i| &self.entities[i])
    }

    pub fn by_primary_prefix(&self, prefix: &str) -> Option<&Entity> {
        self.by_prefix.get(prefix).map(|&i| &self.entities[i])
    }

    /// Entities in load order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
