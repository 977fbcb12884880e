#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the placement sandbox.
//!
//! This crate defines the data model used by every other crate: object
//! footprints, transforms, placement bounds and validity results. It also
//! names the collaborator interfaces the placement and editing sessions
//! depend on (ground projection, obstacle queries, object instantiation,
//! render feedback and input) so that the sessions never talk to a host
//! engine directly. Adapters submit [`Command`] values to the world, and the
//! world answers with [`Event`] values describing what changed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Screen-space position reported by an input source, measured in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    /// Horizontal pixel coordinate growing to the right.
    pub x: f32,
    /// Vertical pixel coordinate growing downwards.
    pub y: f32,
}

impl Point2 {
    /// Creates a new screen-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// World-space position. The `y` axis is height; placement happens on the x/z plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// Horizontal world coordinate.
    pub x: f32,
    /// Height above the placement plane.
    pub y: f32,
    /// Depth world coordinate.
    pub z: f32,
}

impl Point3 {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Half-line cast from the pointer into the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Point the ray starts from.
    pub origin: Point3,
    /// Direction of travel. Does not need to be normalised.
    pub direction: Point3,
}

impl Ray {
    /// Creates a new ray from an origin and a direction.
    #[must_use]
    pub const fn new(origin: Point3, direction: Point3) -> Self {
        Self { origin, direction }
    }

    /// Ray pointing straight down onto the placement plane above `(x, z)`.
    #[must_use]
    pub const fn downward(x: f32, z: f32) -> Self {
        Self {
            origin: Point3::new(x, 100.0, z),
            direction: Point3::new(0.0, -1.0, 0.0),
        }
    }

    /// Point reached after travelling `distance` multiples of the direction.
    #[must_use]
    pub fn point_at(&self, distance: f32) -> Point3 {
        Point3::new(
            self.origin.x + self.direction.x * distance,
            self.origin.y + self.direction.y * distance,
            self.origin.z + self.direction.z * distance,
        )
    }
}

/// Unique identifier assigned to a placed object by the scene.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates a new object identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name of an object prototype in the placement catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrototypeId(String);

impl PrototypeId {
    /// Creates a prototype identifier from its catalog name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Catalog name of the prototype.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrototypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Horizontal collision envelope of an object, rotated together with its yaw.
///
/// The envelope is a rectangle of `2 * half_x` by `2 * half_z` world units
/// whose centre sits at the object position shifted by the local offset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Half of the envelope width along the local x axis.
    pub half_x: f32,
    /// Half of the envelope depth along the local z axis.
    pub half_z: f32,
    /// Reference height of the object above its base.
    #[serde(default = "default_height")]
    pub height: f32,
    /// Local x offset of the envelope centre from the object position.
    #[serde(default)]
    pub offset_x: f32,
    /// Local z offset of the envelope centre from the object position.
    #[serde(default)]
    pub offset_z: f32,
}

fn default_height() -> f32 {
    1.0
}

impl Footprint {
    /// Creates a centred footprint from half extents with unit height.
    #[must_use]
    pub const fn new(half_x: f32, half_z: f32) -> Self {
        Self {
            half_x,
            half_z,
            height: 1.0,
            offset_x: 0.0,
            offset_z: 0.0,
        }
    }

    /// Creates a centred footprint from full width and depth.
    #[must_use]
    pub fn from_size(width: f32, depth: f32) -> Self {
        Self::new(width * 0.5, depth * 0.5)
    }

    /// Returns the footprint with the provided local centre offset.
    #[must_use]
    pub const fn with_offset(mut self, offset_x: f32, offset_z: f32) -> Self {
        self.offset_x = offset_x;
        self.offset_z = offset_z;
        self
    }

    /// Returns the footprint with the provided reference height.
    #[must_use]
    pub const fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Scales extents, offset and height uniformly.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            half_x: self.half_x * factor,
            half_z: self.half_z * factor,
            height: self.height * factor,
            offset_x: self.offset_x * factor,
            offset_z: self.offset_z * factor,
        }
    }

    /// Reports whether the envelope has a positive, finite area.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.half_x.is_finite() && self.half_z.is_finite() && self.half_x > 0.0 && self.half_z > 0.0
    }
}

/// Placement of an object in the world: position plus a single yaw angle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// World position of the object's base.
    pub position: Point3,
    /// Rotation around the vertical axis, in degrees.
    pub yaw_degrees: f32,
}

impl Transform2D {
    /// Creates a transform from explicit coordinates and yaw.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, yaw_degrees: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            yaw_degrees,
        }
    }

    /// Creates an unrotated transform resting on the plane at `(x, z)`.
    #[must_use]
    pub const fn on_plane(x: f32, z: f32) -> Self {
        Self::new(x, 0.0, z, 0.0)
    }

    /// Returns the transform moved to the provided position.
    #[must_use]
    pub const fn with_position(mut self, position: Point3) -> Self {
        self.position = position;
        self
    }

    /// Returns the transform with the provided yaw.
    #[must_use]
    pub const fn with_yaw(mut self, yaw_degrees: f32) -> Self {
        self.yaw_degrees = yaw_degrees;
        self
    }

    /// Compares two transforms within `epsilon` on every component.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.position.x - other.position.x).abs() <= epsilon
            && (self.position.y - other.position.y).abs() <= epsilon
            && (self.position.z - other.position.z).abs() <= epsilon
            && (self.yaw_degrees - other.yaw_degrees).abs() <= epsilon
    }
}

/// Rectangle on the x/z plane delimiting a legal region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest legal x coordinate.
    pub min_x: f32,
    /// Largest legal x coordinate.
    pub max_x: f32,
    /// Smallest legal z coordinate.
    pub min_z: f32,
    /// Largest legal z coordinate.
    pub max_z: f32,
}

impl Bounds {
    /// Creates bounds from explicit limits.
    #[must_use]
    pub const fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    /// Creates bounds spanning `[-half_extent, half_extent]` on both axes.
    #[must_use]
    pub const fn symmetric(half_extent: f32) -> Self {
        Self::new(-half_extent, half_extent, -half_extent, half_extent)
    }

    /// Returns a copy grown outward by `margin` on every side.
    #[must_use]
    pub fn widened(self, margin: f32) -> Self {
        Self {
            min_x: self.min_x - margin,
            max_x: self.max_x + margin,
            min_z: self.min_z - margin,
            max_z: self.max_z + margin,
        }
    }

    /// Clamps a point on the x/z plane into the bounds.
    #[must_use]
    pub fn clamp(&self, x: f32, z: f32) -> (f32, f32) {
        (x.clamp(self.min_x, self.max_x), z.clamp(self.min_z, self.max_z))
    }

    /// Reports whether the limits are finite and ordered.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        [self.min_x, self.max_x, self.min_z, self.max_z]
            .iter()
            .all(|value| value.is_finite())
            && self.min_x <= self.max_x
            && self.min_z <= self.max_z
    }
}

/// How a position lying exactly on a bounds edge is classified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// A position on the edge is inside; only strictly beyond the edge is out.
    #[default]
    Inclusive,
    /// A position on the edge is already out of bounds.
    Exclusive,
}

/// Single reason a candidate placement was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidReason {
    /// The candidate position lies outside the placement bounds.
    OutOfBounds,
    /// The candidate footprint intersects an already placed object.
    Overlapping,
    /// The pointer ray missed the placement plane, so the candidate was not moved.
    OffPlane,
}

/// Set of [`InvalidReason`] values collected by a validation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct InvalidReasons {
    out_of_bounds: bool,
    overlapping: bool,
    off_plane: bool,
}

impl InvalidReasons {
    /// Empty reason set.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            out_of_bounds: false,
            overlapping: false,
            off_plane: false,
        }
    }

    /// Adds a reason to the set.
    pub fn insert(&mut self, reason: InvalidReason) {
        match reason {
            InvalidReason::OutOfBounds => self.out_of_bounds = true,
            InvalidReason::Overlapping => self.overlapping = true,
            InvalidReason::OffPlane => self.off_plane = true,
        }
    }

    /// Returns the set extended with a reason.
    #[must_use]
    pub fn with(mut self, reason: InvalidReason) -> Self {
        self.insert(reason);
        self
    }

    /// Reports whether the reason is present.
    #[must_use]
    pub const fn contains(&self, reason: InvalidReason) -> bool {
        match reason {
            InvalidReason::OutOfBounds => self.out_of_bounds,
            InvalidReason::Overlapping => self.overlapping,
            InvalidReason::OffPlane => self.off_plane,
        }
    }

    /// Reports whether no reason was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.out_of_bounds && !self.overlapping && !self.off_plane
    }

    /// Iterates the recorded reasons in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = InvalidReason> {
        [
            (self.out_of_bounds, InvalidReason::OutOfBounds),
            (self.overlapping, InvalidReason::Overlapping),
            (self.off_plane, InvalidReason::OffPlane),
        ]
        .into_iter()
        .filter_map(|(present, reason)| present.then_some(reason))
    }
}

/// Outcome of validating a candidate placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Validity {
    /// The candidate may be committed.
    Valid,
    /// The candidate violates at least one rule.
    Invalid(InvalidReasons),
}

impl Validity {
    /// Builds a validity value from collected reasons; an empty set is valid.
    #[must_use]
    pub const fn from_reasons(reasons: InvalidReasons) -> Self {
        if reasons.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(reasons)
        }
    }

    /// Invalid result for a tick whose pointer ray missed the placement plane.
    #[must_use]
    pub fn off_plane() -> Self {
        Self::Invalid(InvalidReasons::none().with(InvalidReason::OffPlane))
    }

    /// Reports whether the candidate may be committed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Reasons attached to an invalid result; empty for a valid one.
    #[must_use]
    pub const fn reasons(&self) -> InvalidReasons {
        match self {
            Self::Valid => InvalidReasons::none(),
            Self::Invalid(reasons) => *reasons,
        }
    }

    /// Reports whether the result carries the provided reason.
    #[must_use]
    pub const fn has(&self, reason: InvalidReason) -> bool {
        self.reasons().contains(reason)
    }
}

/// Already placed object considered during overlap testing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    /// Identifier of the placed object.
    pub id: ObjectId,
    /// Current placement of the object.
    pub transform: Transform2D,
    /// Collision envelope of the object.
    pub footprint: Footprint,
}

/// Read-only snapshot of the obstacles relevant to one validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObstacleSet {
    obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
    /// Creates a set from the provided obstacles in deterministic id order.
    #[must_use]
    pub fn from_obstacles(mut obstacles: Vec<Obstacle>) -> Self {
        obstacles.sort_by_key(|obstacle| obstacle.id);
        Self { obstacles }
    }

    /// Iterator over the captured obstacles.
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    /// Number of obstacles in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Reports whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Reports whether an obstacle with the provided id is present.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.obstacles.iter().any(|obstacle| obstacle.id == id)
    }
}

/// Catalog entry describing something that can be placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prototype {
    /// Catalog name of the prototype.
    pub id: PrototypeId,
    /// Collision envelope of instances, if the prototype defines one.
    pub footprint: Option<Footprint>,
}

impl Prototype {
    /// Creates a prototype that carries a footprint.
    #[must_use]
    pub fn new(id: PrototypeId, footprint: Footprint) -> Self {
        Self {
            id,
            footprint: Some(footprint),
        }
    }

    /// Resolves the footprint or reports it missing.
    pub fn require_footprint(&self) -> Result<Footprint, SessionError> {
        self.footprint
            .filter(Footprint::is_well_formed)
            .ok_or_else(|| SessionError::MissingFootprint {
                prototype: self.id.clone(),
            })
    }
}

/// What a validity indicator is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndicatorTarget {
    /// The floating preview of an in-progress drag-to-place gesture.
    Preview,
    /// A placed object currently being edited.
    Object(ObjectId),
}

/// Pointer state sampled once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// Screen position of the pointer.
    pub position: Point2,
    /// Ray cast from the camera through the pointer.
    pub ray: Ray,
    /// Whether the pointer is captured by a UI element.
    pub over_ui: bool,
}

impl PointerSample {
    /// Creates a sample from explicit values.
    #[must_use]
    pub const fn new(position: Point2, ray: Ray, over_ui: bool) -> Self {
        Self {
            position,
            ray,
            over_ui,
        }
    }

    /// Samples the pointer through an input source and a camera.
    #[must_use]
    pub fn capture(input: &impl InputSource, raycaster: &impl ScreenRaycaster) -> Self {
        let position = input.pointer_position();
        Self {
            position,
            ray: raycaster.screen_ray(position),
            over_ui: input.is_pointer_over_ui(),
        }
    }
}

/// Commands that express all permissible scene mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Instantiates a prototype at the provided transform.
    PlaceObject {
        /// Prototype to instantiate.
        prototype: PrototypeId,
        /// Placement of the new object.
        transform: Transform2D,
    },
    /// Overwrites the transform of a placed object.
    MoveObject {
        /// Object to move.
        object: ObjectId,
        /// New placement of the object.
        transform: Transform2D,
    },
    /// Removes a placed object from the scene.
    RemoveObject {
        /// Object to remove.
        object: ObjectId,
    },
}

/// Events broadcast by the scene after it changed.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A new object was instantiated and tagged as placed.
    ObjectPlaced {
        /// Identifier assigned to the object.
        object: ObjectId,
        /// Prototype the object was created from.
        prototype: PrototypeId,
        /// Placement of the new object.
        transform: Transform2D,
    },
    /// A placed object changed its transform.
    ObjectMoved {
        /// Object that moved.
        object: ObjectId,
        /// Transform before the move.
        from: Transform2D,
        /// Transform after the move.
        to: Transform2D,
    },
    /// A placed object was destroyed.
    ObjectRemoved {
        /// Object that was removed.
        object: ObjectId,
    },
    /// A command could not be executed.
    CommandRejected {
        /// Why the command was rejected.
        reason: RejectionReason,
    },
}

/// Reasons the scene may reject a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectionReason {
    /// The prototype is not in the catalog.
    UnknownPrototype(PrototypeId),
    /// The prototype has no usable footprint.
    MissingFootprint(PrototypeId),
    /// No placed object has the provided identifier.
    UnknownObject(ObjectId),
    /// Every object identifier has already been handed out.
    IdentifiersExhausted,
}

/// Errors surfaced by placement and edit sessions.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SessionError {
    /// A session method was called out of order.
    #[error("cannot {operation} while the session is {state}")]
    InvalidState {
        /// Operation that was attempted.
        operation: &'static str,
        /// Phase the session was in.
        state: &'static str,
    },
    /// The pointer ray never reaches the placement plane.
    #[error("pointer ray does not intersect the placement plane")]
    NoPlaneIntersection,
    /// The prototype has no collider or size to validate with.
    #[error("prototype `{prototype}` has no footprint")]
    MissingFootprint {
        /// Prototype lacking a footprint.
        prototype: PrototypeId,
    },
    /// The prototype is not in the catalog.
    #[error("prototype `{prototype}` is not in the catalog")]
    UnknownPrototype {
        /// Prototype that could not be found.
        prototype: PrototypeId,
    },
    /// Another object is already being edited.
    #[error("object {current} is already being edited")]
    EditorBusy {
        /// Object owning the active edit session.
        current: ObjectId,
    },
    /// The scene does not know the object.
    #[error("object {object} does not exist")]
    UnknownObject {
        /// Object that could not be found.
        object: ObjectId,
    },
    /// The scene cannot allocate another object identifier.
    #[error("the scene has run out of object identifiers")]
    IdentifiersExhausted,
}

/// Projects pointer rays onto the placement plane.
pub trait ScenePlane {
    /// Intersection of the ray with the plane, or `None` when the ray never reaches it.
    fn project(&self, ray: &Ray) -> Option<Point3>;
}

/// Spatial queries over the placed objects.
pub trait ObstacleQuery {
    /// Snapshot of every placed object except `excluding`.
    fn obstacles_excluding(&self, excluding: Option<ObjectId>) -> ObstacleSet;

    /// Placed objects whose footprints intersect the provided region.
    fn overlapping(
        &self,
        transform: &Transform2D,
        footprint: &Footprint,
        excluding: Option<ObjectId>,
    ) -> Vec<ObjectId>;

    /// Topmost placed object whose footprint contains the ground point `(x, z)`.
    fn pick(&self, x: f32, z: f32) -> Option<ObjectId>;
}

/// Creates and destroys placed objects.
pub trait ObjectFactory {
    /// Instantiates a prototype at `transform` and tags it as placed.
    fn instantiate(
        &mut self,
        prototype: &PrototypeId,
        transform: Transform2D,
    ) -> Result<ObjectId, SessionError>;

    /// Destroys a placed object, returning whether it existed.
    fn destroy(&mut self, object: ObjectId) -> bool;
}

/// Read and write access to the live transforms of placed objects.
pub trait ObjectTransforms {
    /// Current transform of the object.
    fn transform(&self, object: ObjectId) -> Option<Transform2D>;

    /// Collision envelope of the object.
    fn footprint(&self, object: ObjectId) -> Option<Footprint>;

    /// Overwrites the transform, returning whether the object exists.
    fn set_transform(&mut self, object: ObjectId, transform: Transform2D) -> bool;
}

/// Full scene surface needed by the sessions.
pub trait SceneCollaborator: ScenePlane + ObstacleQuery + ObjectFactory + ObjectTransforms {}

impl<T> SceneCollaborator for T where
    T: ScenePlane + ObstacleQuery + ObjectFactory + ObjectTransforms
{
}

/// Cosmetic validity display.
pub trait RenderFeedback {
    /// Shows whether the target currently sits at a valid placement.
    fn set_validity_indicator(&mut self, target: IndicatorTarget, valid: bool);

    /// Removes any validity display from the target.
    fn clear_indicator(&mut self, target: IndicatorTarget);
}

/// Raw pointer input.
pub trait InputSource {
    /// Screen position of the pointer.
    fn pointer_position(&self) -> Point2;

    /// Whether the pointer is over a UI element that captures input.
    fn is_pointer_over_ui(&self) -> bool;
}

/// Converts screen positions into world rays.
pub trait ScreenRaycaster {
    /// Ray from the camera through the screen position.
    fn screen_ray(&self, position: Point2) -> Ray;
}

/// Explicit pointer gesture interface invoked by the input dispatcher.
pub trait PointerHandler {
    /// Pointer button went down.
    fn on_pointer_down<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
    ) -> Result<(), SessionError>;

    /// Pointer moved while the button is held.
    fn on_pointer_drag<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
    ) -> Result<(), SessionError>;

    /// Pointer button was released.
    fn on_pointer_up<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
    ) -> Result<(), SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reasons_produce_valid_result() {
        assert_eq!(Validity::from_reasons(InvalidReasons::none()), Validity::Valid);
    }

    #[test]
    fn reasons_accumulate_without_duplicates() {
        let mut reasons = InvalidReasons::none();
        reasons.insert(InvalidReason::Overlapping);
        reasons.insert(InvalidReason::Overlapping);
        reasons.insert(InvalidReason::OutOfBounds);

        let collected: Vec<_> = reasons.iter().collect();
        assert_eq!(
            collected,
            vec![InvalidReason::OutOfBounds, InvalidReason::Overlapping]
        );
        let validity = Validity::from_reasons(reasons);
        assert!(!validity.is_valid());
        assert!(validity.has(InvalidReason::OutOfBounds));
    }

    #[test]
    fn off_plane_result_is_invalid_with_only_that_reason() {
        let validity = Validity::off_plane();
        assert!(!validity.is_valid());
        assert_eq!(
            validity.reasons().iter().collect::<Vec<_>>(),
            vec![InvalidReason::OffPlane]
        );
    }

    #[test]
    fn widened_bounds_grow_on_every_side() {
        let bounds = Bounds::symmetric(7.5).widened(1.0);
        assert_eq!(bounds, Bounds::new(-8.5, 8.5, -8.5, 8.5));
        assert_eq!(bounds.clamp(10.0, -9.0), (8.5, -8.5));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert!(!Bounds::new(1.0, -1.0, 0.0, 1.0).is_well_formed());
        assert!(!Bounds::new(0.0, f32::NAN, 0.0, 1.0).is_well_formed());
        assert!(Bounds::symmetric(13.0).is_well_formed());
    }

    #[test]
    fn prototype_without_footprint_reports_missing() {
        let prototype = Prototype {
            id: PrototypeId::new("ghost"),
            footprint: None,
        };
        assert_eq!(
            prototype.require_footprint(),
            Err(SessionError::MissingFootprint {
                prototype: PrototypeId::new("ghost"),
            })
        );
    }

    #[test]
    fn degenerate_footprint_counts_as_missing() {
        let prototype = Prototype::new(PrototypeId::new("flat"), Footprint::new(0.0, 1.0));
        assert!(prototype.require_footprint().is_err());
    }

    #[test]
    fn obstacle_set_orders_by_identifier() {
        let make = |id| Obstacle {
            id: ObjectId::new(id),
            transform: Transform2D::default(),
            footprint: Footprint::new(1.0, 1.0),
        };
        let set = ObstacleSet::from_obstacles(vec![make(3), make(1), make(2)]);
        let ids: Vec<_> = set.iter().map(|obstacle| obstacle.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(set.contains(ObjectId::new(2)));
        assert!(!set.contains(ObjectId::new(9)));
    }

    #[test]
    fn footprint_scaling_scales_offset() {
        let footprint = Footprint::new(1.0, 2.0).with_offset(0.5, 0.0).scaled(2.0);
        assert_eq!(footprint.half_x, 2.0);
        assert_eq!(footprint.half_z, 4.0);
        assert_eq!(footprint.offset_x, 1.0);
    }

    #[test]
    fn ray_point_at_follows_direction() {
        let ray = Ray::downward(2.0, -3.0);
        assert_eq!(ray.point_at(100.0), Point3::new(2.0, 0.0, -3.0));
    }
}
