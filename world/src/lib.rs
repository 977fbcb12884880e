#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative scene state for the placement sandbox.
//!
//! The [`Scene`] owns the prototype catalog, every placed object and the
//! ground plane. It is the scene collaborator the placement and edit
//! sessions talk to: it projects pointer rays, answers obstacle queries and
//! instantiates or destroys objects. Adapters may also drive it through
//! [`apply`] with explicit [`Command`] values.

mod registry;

use std::collections::BTreeMap;

use placement_sandbox_core::{
    Command, Event, Footprint, ObjectFactory, ObjectId, ObjectTransforms, Obstacle,
    ObstacleQuery, ObstacleSet, Point3, Prototype, PrototypeId, Ray, RejectionReason,
    ScenePlane, SessionError, Transform2D,
};
use placement_sandbox_system_validation::{footprint_contains, footprints_overlap};
use tracing::debug;

use crate::registry::{ObjectRegistry, PlacedObject};

const PARALLEL_EPSILON: f32 = 1e-6;

/// Horizontal plane objects are placed on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundPlane {
    height: f32,
}

impl GroundPlane {
    /// Creates a plane at the provided height.
    #[must_use]
    pub const fn new(height: f32) -> Self {
        Self { height }
    }

    /// Height of the plane.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ScenePlane for GroundPlane {
    fn project(&self, ray: &Ray) -> Option<Point3> {
        let vertical = ray.direction.y;
        if vertical.abs() < PARALLEL_EPSILON {
            return None;
        }
        let distance = (self.height - ray.origin.y) / vertical;
        if !distance.is_finite() || distance < 0.0 {
            return None;
        }
        let mut hit = ray.point_at(distance);
        hit.y = self.height;
        Some(hit)
    }
}

/// Represents the authoritative sandbox scene.
#[derive(Debug)]
pub struct Scene {
    catalog: BTreeMap<PrototypeId, Prototype>,
    objects: ObjectRegistry,
    ground: GroundPlane,
    journal: Vec<Event>,
}

impl Scene {
    /// Creates an empty scene with the provided prototype catalog on a plane at height zero.
    #[must_use]
    pub fn new(prototypes: impl IntoIterator<Item = Prototype>) -> Self {
        Self {
            catalog: prototypes
                .into_iter()
                .map(|prototype| (prototype.id.clone(), prototype))
                .collect(),
            objects: ObjectRegistry::new(),
            ground: GroundPlane::default(),
            journal: Vec::new(),
        }
    }

    /// Returns the scene placed on a different ground plane.
    #[must_use]
    pub fn with_ground(mut self, ground: GroundPlane) -> Self {
        self.ground = ground;
        self
    }

    fn place(
        &mut self,
        prototype: &PrototypeId,
        transform: Transform2D,
    ) -> Result<ObjectId, RejectionReason> {
        let entry = self
            .catalog
            .get(prototype)
            .ok_or_else(|| RejectionReason::UnknownPrototype(prototype.clone()))?;
        let footprint = entry
            .require_footprint()
            .map_err(|_| RejectionReason::MissingFootprint(prototype.clone()))?;
        let object = self
            .objects
            .insert(prototype.clone(), transform, footprint)
            .ok_or(RejectionReason::IdentifiersExhausted)?;
        debug!(
            %object,
            %prototype,
            x = transform.position.x,
            z = transform.position.z,
            "object placed"
        );
        self.journal.push(Event::ObjectPlaced {
            object,
            prototype: prototype.clone(),
            transform,
        });
        Ok(object)
    }

    fn remove(&mut self, object: ObjectId) -> Result<(), RejectionReason> {
        let _ = self
            .objects
            .remove(object)
            .ok_or(RejectionReason::UnknownObject(object))?;
        debug!(%object, "object removed");
        self.journal.push(Event::ObjectRemoved { object });
        Ok(())
    }

    fn relocate(
        &mut self,
        object: ObjectId,
        transform: Transform2D,
    ) -> Result<(), RejectionReason> {
        let entry = self
            .objects
            .get_mut(object)
            .ok_or(RejectionReason::UnknownObject(object))?;
        let from = entry.transform;
        entry.transform = transform;
        self.journal.push(Event::ObjectMoved {
            object,
            from,
            to: transform,
        });
        Ok(())
    }
}

/// Applies the provided command to the scene, reporting the resulting events.
pub fn apply(scene: &mut Scene, command: Command, out_events: &mut Vec<Event>) {
    let result = match command {
        Command::PlaceObject {
            prototype,
            transform,
        } => scene.place(&prototype, transform).map(|_| ()),
        Command::MoveObject { object, transform } => scene.relocate(object, transform),
        Command::RemoveObject { object } => scene.remove(object),
    };
    if let Err(reason) = result {
        debug!(?reason, "command rejected");
        scene.journal.push(Event::CommandRejected { reason });
    }
    out_events.append(&mut scene.journal);
}

/// Moves every event recorded since the last drain into `out_events`.
///
/// Objects created or destroyed through the collaborator interfaces are
/// journaled the same way as commands passed to [`apply`].
pub fn drain_events(scene: &mut Scene, out_events: &mut Vec<Event>) {
    out_events.append(&mut scene.journal);
}

impl ScenePlane for Scene {
    fn project(&self, ray: &Ray) -> Option<Point3> {
        self.ground.project(ray)
    }
}

impl ObstacleQuery for Scene {
    fn obstacles_excluding(&self, excluding: Option<ObjectId>) -> ObstacleSet {
        ObstacleSet::from_obstacles(
            self.objects
                .iter()
                .filter(|object| Some(object.id) != excluding)
                .map(obstacle_of)
                .collect(),
        )
    }

    fn overlapping(
        &self,
        transform: &Transform2D,
        footprint: &Footprint,
        excluding: Option<ObjectId>,
    ) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|object| Some(object.id) != excluding)
            .filter(|object| {
                footprints_overlap(transform, footprint, &object.transform, &object.footprint)
            })
            .map(|object| object.id)
            .collect()
    }

    fn pick(&self, x: f32, z: f32) -> Option<ObjectId> {
        // Later objects are drawn on top, so search newest first.
        self.objects
            .iter()
            .rev()
            .find(|object| footprint_contains(&object.transform, &object.footprint, x, z))
            .map(|object| object.id)
    }
}

impl ObjectFactory for Scene {
    fn instantiate(
        &mut self,
        prototype: &PrototypeId,
        transform: Transform2D,
    ) -> Result<ObjectId, SessionError> {
        self.place(prototype, transform).map_err(|reason| match reason {
            RejectionReason::MissingFootprint(prototype) => {
                SessionError::MissingFootprint { prototype }
            }
            RejectionReason::UnknownPrototype(prototype) => {
                SessionError::UnknownPrototype { prototype }
            }
            RejectionReason::UnknownObject(object) => SessionError::UnknownObject { object },
            RejectionReason::IdentifiersExhausted => SessionError::IdentifiersExhausted,
        })
    }

    fn destroy(&mut self, object: ObjectId) -> bool {
        self.remove(object).is_ok()
    }
}

impl ObjectTransforms for Scene {
    fn transform(&self, object: ObjectId) -> Option<Transform2D> {
        self.objects.get(object).map(|entry| entry.transform)
    }

    fn footprint(&self, object: ObjectId) -> Option<Footprint> {
        self.objects.get(object).map(|entry| entry.footprint)
    }

    fn set_transform(&mut self, object: ObjectId, transform: Transform2D) -> bool {
        match self.objects.get_mut(object) {
            Some(entry) => {
                entry.transform = transform;
                true
            }
            None => false,
        }
    }
}

fn obstacle_of(object: &PlacedObject) -> Obstacle {
    Obstacle {
        id: object.id,
        transform: object.transform,
        footprint: object.footprint,
    }
}

/// Query functions that provide read-only access to the scene state.
pub mod query {
    use placement_sandbox_core::{ObjectId, Prototype, PrototypeId, Transform2D};

    use super::{GroundPlane, Scene};

    /// Immutable representation of a placed object used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct ObjectSnapshot {
        /// Identifier assigned to the object.
        pub id: ObjectId,
        /// Prototype the object was created from.
        pub prototype: PrototypeId,
        /// Current transform of the object.
        pub transform: Transform2D,
    }

    /// Captures the placed objects in identifier order.
    #[must_use]
    pub fn objects(scene: &Scene) -> Vec<ObjectSnapshot> {
        scene
            .objects
            .iter()
            .map(|object| ObjectSnapshot {
                id: object.id,
                prototype: object.prototype.clone(),
                transform: object.transform,
            })
            .collect()
    }

    /// Number of placed objects.
    #[must_use]
    pub fn object_count(scene: &Scene) -> usize {
        scene.objects.len()
    }

    /// Looks up a catalog entry.
    #[must_use]
    pub fn prototype<'scene>(scene: &'scene Scene, id: &PrototypeId) -> Option<&'scene Prototype> {
        scene.catalog.get(id)
    }

    /// Catalog entries in name order.
    pub fn prototypes(scene: &Scene) -> impl Iterator<Item = &Prototype> {
        scene.catalog.values()
    }

    /// Ground plane of the scene.
    #[must_use]
    pub fn ground(scene: &Scene) -> GroundPlane {
        scene.ground
    }
}
