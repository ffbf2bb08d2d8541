//! # Doodad Module
//!
//! Decorative, non-voxel objects (trees, cacti, animals) placed by the terrain
//! generator, and the registry that gives each live instance a stable id.
//!
//! ## Registry
//!
//! `DoodadRegistry` is a generational slot arena. Removing a doodad frees its
//! slot for reuse and bumps the slot's generation, so an id held past removal
//! resolves to `None` instead of aliasing the slot's next occupant.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::core::SpatialKey;

/// The kinds of decorative object the generators place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoodadKind {
    Cactus,
    Tree,
    Tree2,
    Pumpkin,
    Grass2,
    Fox,
    Ocelot,
}

/// An axis-aligned box collider, relative to the doodad origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collider {
    pub offset: [f32; 3],
    pub size: [f32; 3],
}

/// Static data about a doodad kind handed to render/physics collaborators.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ObjectInfo {
    pub name: &'static str,
    /// Model to instance; kinds may share a model.
    pub model_name: &'static str,
    /// Empty for doodads that do not collide.
    pub colliders: &'static [Collider],
}

static TALL_COLLIDER: [Collider; 1] = [Collider {
    offset: [0.0, 1.0, 0.0],
    size: [0.5, 1.0, 0.5],
}];
static SHORT_COLLIDER: [Collider; 1] = [Collider {
    offset: [0.0, 0.5, 0.0],
    size: [0.5, 0.5, 0.5],
}];

impl DoodadKind {
    pub fn info(self) -> ObjectInfo {
        match self {
            DoodadKind::Cactus => ObjectInfo {
                name: "cactus",
                model_name: "cactus",
                colliders: &TALL_COLLIDER,
            },
            DoodadKind::Tree => ObjectInfo {
                name: "tree",
                model_name: "tree2",
                colliders: &TALL_COLLIDER,
            },
            DoodadKind::Tree2 => ObjectInfo {
                name: "tree2",
                model_name: "tree2",
                colliders: &TALL_COLLIDER,
            },
            DoodadKind::Pumpkin => ObjectInfo {
                name: "pumpkin",
                model_name: "pumpkin",
                colliders: &SHORT_COLLIDER,
            },
            DoodadKind::Grass2 => ObjectInfo {
                name: "grass2",
                model_name: "grass2",
                colliders: &[],
            },
            DoodadKind::Fox => ObjectInfo {
                name: "fox",
                model_name: "fox",
                colliders: &[],
            },
            DoodadKind::Ocelot => ObjectInfo {
                name: "ocelot",
                model_name: "ocelot",
                colliders: &[],
            },
        }
    }
}

/// A generation-checked handle into the `DoodadRegistry`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoodadId {
    index: u32,
    generation: u32,
}

/// A live decorative object instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Doodad {
    pub kind: DoodadKind,
    /// Spatial key of the chunk that placed this doodad.
    pub chunk: SpatialKey,
    /// World-space position (block units).
    pub position: Point3<f32>,
    /// Rotation around the vertical axis, in degrees.
    pub rotation: f32,
}

struct Slot {
    generation: u32,
    doodad: Option<Doodad>,
}

/// Owns every registered doodad and hands out stable ids.
#[derive(Default)]
pub struct DoodadRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl DoodadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a doodad, reusing a free slot when one exists.
    pub fn insert(&mut self, doodad: Doodad) -> DoodadId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.doodad = Some(doodad);
            return DoodadId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            doodad: Some(doodad),
        });
        DoodadId {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, id: DoodadId) -> Option<&Doodad> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.doodad.as_ref())
    }

    pub fn get_mut(&mut self, id: DoodadId) -> Option<&mut Doodad> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.doodad.as_mut())
    }

    /// Removes a doodad. Returns `None` for stale or already removed ids.
    pub fn remove(&mut self, id: DoodadId) -> Option<Doodad> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let doodad = slot.doodad.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(doodad)
    }

    /// Number of live doodads.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over every live doodad with its id.
    pub fn iter(&self) -> impl Iterator<Item = (DoodadId, &Doodad)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.doodad.as_ref().map(|doodad| {
                (
                    DoodadId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    doodad,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(chunk: SpatialKey) -> Doodad {
        Doodad {
            kind: DoodadKind::Tree2,
            chunk,
            position: Point3::new(1.0, 2.0, 3.0),
            rotation: 90.0,
        }
    }

    #[test]
    fn inserted_doodads_are_retrievable() {
        let mut registry = DoodadRegistry::new();
        let a = registry.insert(tree(1));
        let b = registry.insert(tree(2));
        assert_ne!(a, b);
        assert_eq!(registry.get(a).map(|d| d.chunk), Some(1));
        assert_eq!(registry.get(b).map(|d| d.chunk), Some(2));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn stale_ids_do_not_alias_reused_slots() {
        let mut registry = DoodadRegistry::new();
        let old = registry.insert(tree(1));
        assert!(registry.remove(old).is_some());
        let new = registry.insert(tree(2));

        assert_eq!(registry.get(old), None);
        assert_eq!(registry.remove(old), None);
        assert_eq!(registry.get(new).map(|d| d.chunk), Some(2));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn live_positions_can_be_mutated() {
        let mut registry = DoodadRegistry::new();
        let id = registry.insert(tree(1));
        if let Some(doodad) = registry.get_mut(id) {
            doodad.rotation = 180.0;
        }
        assert_eq!(registry.get(id).map(|d| d.rotation), Some(180.0));
    }

    #[test]
    fn iteration_skips_removed_slots() {
        let mut registry = DoodadRegistry::new();
        let a = registry.insert(tree(1));
        let _b = registry.insert(tree(2));
        registry.remove(a);
        let chunks: Vec<_> = registry.iter().map(|(_, d)| d.chunk).collect();
        assert_eq!(chunks, vec![2]);
    }

    #[test]
    fn colliding_and_decorative_kinds() {
        assert_eq!(DoodadKind::Cactus.info().colliders.len(), 1);
        assert!(DoodadKind::Grass2.info().colliders.is_empty());
        assert_eq!(DoodadKind::Tree.info().model_name, "tree2");
    }
}
