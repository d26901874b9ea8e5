//! # EntityStore: identity, groups, and paint order
//!
//! Entities live in three views that are always mutated together:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │ EntityStore                                            │
//! │                                                        │
//! │  entities: HashMap<EntityId, Entity>    point lookup   │
//! │  groups:   HashMap<String, HashSet>     bulk lookup    │
//! │  paint_order: SortedList<PaintEntry>    z traversal    │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! `create` and `destroy` are atomic over all three: an id present in one
//! view is present in the others. The paint order sorts on the z value an
//! entity was created with; mutating `z` afterwards does not re-sort.
//!
//! [`Commands`] queues structural changes issued while a traversal is
//! borrowing the store; the engine applies them once the traversal finishes.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::entity::{Behavior, ClassConfig, Entity, EntityClass, EntityId, SpriteBehavior};
use crate::error::EngineError;
use crate::sorted::SortedList;

/// One slot in the paint order: the id plus the z it was inserted with.
#[derive(Debug, Clone, Copy)]
struct PaintEntry {
    z: f32,
    id: EntityId,
}

fn by_z(a: &PaintEntry, b: &PaintEntry) -> Ordering {
    a.z.total_cmp(&b.z)
}

/// Identity match for removal: any entry with the probe's id, whatever its z.
fn by_id(a: &PaintEntry, b: &PaintEntry) -> Ordering {
    if a.id == b.id { Ordering::Equal } else { Ordering::Less }
}

/// Owns every live entity and the class templates they are cloned from.
pub struct EntityStore {
    classes: HashMap<String, EntityClass>,
    entities: HashMap<EntityId, Entity>,
    groups: HashMap<String, HashSet<EntityId>>,
    paint_order: SortedList<PaintEntry>,
    next_id: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
            entities: HashMap::new(),
            groups: HashMap::new(),
            paint_order: SortedList::new(by_z),
            next_id: 0,
        }
    }

    // ── Classes ──────────────────────────────────────────────────────

    /// Register a class template with the default sprite behavior.
    pub fn register_class(&mut self, name: &str, config: ClassConfig) {
        self.register_class_with(name, config, Box::new(SpriteBehavior));
    }

    /// Register a class template with a custom behavior. Re-registering a
    /// name replaces the template; existing entities keep the old one.
    pub fn register_class_with(&mut self, name: &str, config: ClassConfig, behavior: Box<dyn Behavior>) {
        let class = EntityClass::from_config(name, config, behavior);
        // The group bucket exists from registration on, even while empty.
        self.groups.entry(class.group.clone()).or_default();
        self.classes.insert(name.to_string(), class);
    }

    pub fn class(&self, name: &str) -> Option<&EntityClass> {
        self.classes.get(name)
    }

    // ── Create / destroy ─────────────────────────────────────────────

    /// Clone the named template into a live entity with a store-allocated id.
    pub fn create(&mut self, class: &str) -> Result<EntityId, EngineError> {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.spawn(class, id)
    }

    /// Clone the named template under a caller-chosen id. Reusing a live id
    /// is the caller's responsibility; the store's own counter is unaffected.
    pub fn create_with_id(&mut self, class: &str, id: EntityId) -> Result<EntityId, EngineError> {
        self.spawn(class, id)
    }

    fn spawn(&mut self, class: &str, id: EntityId) -> Result<EntityId, EngineError> {
        let Some(template) = self.classes.get(class) else {
            return Err(EngineError::UnknownClass(class.to_string()));
        };
        let entity = template.instantiate(id);

        self.groups.entry(entity.data.group.clone()).or_default().insert(id);
        self.paint_order.insert(PaintEntry {
            z: entity.data.z,
            id,
        });
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Remove the entity from every view, then run its destroy hook. Returns
    /// `false` (and does nothing else) when the id is not present, so a
    /// double destroy is harmless.
    ///
    /// The hook runs last, once the entity is fully unregistered.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(mut entity) = self.entities.remove(&id) else {
            return false;
        };
        if let Some(bucket) = self.groups.get_mut(&entity.data.group) {
            bucket.remove(&id);
        }
        self.paint_order.remove_matching(&PaintEntry { z: 0.0, id }, Some(by_id));
        entity.behavior.on_destroy(&entity.data);
        true
    }

    // ── Lookup ───────────────────────────────────────────────────────

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Every live id, in unspecified order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Ids in a group, in unspecified order. Empty for unknown groups.
    pub fn group(&self, name: &str) -> Vec<EntityId> {
        self.groups
            .get(name)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every group that has a bucket, including empty ones.
    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    /// Snapshot of the paint order, ascending by creation z.
    pub fn paint_ids(&self) -> Vec<EntityId> {
        self.paint_order.iter().map(|entry| entry.id).collect()
    }

    // ── Traversal support ────────────────────────────────────────────

    /// Pull an entity out of the id index so its behavior can borrow both
    /// the entity and the store. Group and paint views keep the id; the
    /// caller must `attach` the entity back before the traversal moves on.
    pub(crate) fn detach(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub(crate) fn attach(&mut self, entity: Entity) {
        self.entities.insert(entity.data.id, entity);
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Deferred commands ────────────────────────────────────────────────────

enum Command {
    Spawn {
        class: String,
        id: Option<EntityId>,
        init: Option<Box<dyn FnOnce(&mut Entity)>>,
    },
    Destroy(EntityId),
}

/// Structural changes queued during a traversal and applied after it.
///
/// Spawning an unknown class here cannot fail synchronously; the error is
/// logged and the command dropped when the queue is applied.
#[derive(Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a spawn from the named class.
    pub fn spawn(&mut self, class: &str) {
        self.queue.push(Command::Spawn {
            class: class.to_string(),
            id: None,
            init: None,
        });
    }

    /// Queue a spawn and run `init` on the new entity once it exists.
    pub fn spawn_with(&mut self, class: &str, init: impl FnOnce(&mut Entity) + 'static) {
        self.queue.push(Command::Spawn {
            class: class.to_string(),
            id: None,
            init: Some(Box::new(init)),
        });
    }

    /// Queue a spawn under a caller-chosen id.
    pub fn spawn_as(&mut self, class: &str, id: EntityId) {
        self.queue.push(Command::Spawn {
            class: class.to_string(),
            id: Some(id),
            init: None,
        });
    }

    /// Queue a destroy. Destroying an id that is already gone by apply time
    /// is a no-op.
    pub fn destroy(&mut self, id: EntityId) {
        self.queue.push(Command::Destroy(id));
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Drain the queue into the store, in issue order.
    pub(crate) fn apply(&mut self, store: &mut EntityStore) {
        for command in self.queue.drain(..) {
            match command {
                Command::Spawn { class, id, init } => {
                    let created = match id {
                        Some(id) => store.create_with_id(&class, id),
                        None => store.create(&class),
                    };
                    match created {
                        Ok(id) => {
                            if let (Some(init), Some(entity)) = (init, store.get_mut(id)) {
                                init(entity);
                            }
                        }
                        Err(err) => log::warn!("dropping deferred spawn: {err}"),
                    }
                }
                Command::Destroy(id) => {
                    store.destroy(id);
                }
            }
        }
    }
}
