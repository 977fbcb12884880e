#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Drag-to-place session.
//!
//! A [`PlacementSession`] lives for exactly one drag gesture started from a
//! palette entry. Each pointer update projects onto the placement plane and
//! re-validates the candidate; releasing the pointer validates one final time
//! at the release point and either instantiates the prototype or discards the
//! gesture. A session is single-use.

use placement_sandbox_core::{
    Footprint, IndicatorTarget, ObjectId, ObstacleQuery, PointerHandler, PointerSample,
    Prototype, Ray, RenderFeedback, SceneCollaborator, ScenePlane, SessionError, Transform2D,
    Validity,
};
use placement_sandbox_system_validation::SpatialValidator;
use tracing::{debug, info, warn};

/// Lifecycle phase of a drag-to-place gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementPhase {
    /// Created but the gesture has not started.
    Idle,
    /// Gesture started; the pointer has not moved yet.
    Armed,
    /// Pointer moved at least once; the candidate follows it.
    Tracking,
    /// The candidate was instantiated as the provided object.
    Committed(ObjectId),
    /// The gesture ended without creating anything.
    Discarded,
}

impl PlacementPhase {
    const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Armed => "armed",
            Self::Tracking => "tracking",
            Self::Committed(_) => "committed",
            Self::Discarded => "discarded",
        }
    }

    /// Reports whether the gesture is still in progress.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Armed | Self::Tracking)
    }
}

/// Result of releasing a drag-to-place gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlacementOutcome {
    /// The prototype was instantiated.
    Committed {
        /// Object created by the scene.
        object: ObjectId,
        /// Transform the object was created with.
        transform: Transform2D,
    },
    /// Nothing was created.
    Discarded {
        /// Validity at the release point, or `None` if the release missed the plane.
        validity: Option<Validity>,
    },
}

/// Transient state of one drag-to-place gesture.
#[derive(Clone, Debug)]
pub struct PlacementSession {
    prototype: Prototype,
    validator: SpatialValidator,
    phase: PlacementPhase,
    footprint: Option<Footprint>,
    candidate: Transform2D,
    validity: Option<Validity>,
    degenerate: bool,
}

impl PlacementSession {
    /// Creates an idle session for the provided prototype.
    #[must_use]
    pub fn new(prototype: Prototype, validator: SpatialValidator) -> Self {
        Self {
            prototype,
            validator,
            phase: PlacementPhase::Idle,
            footprint: None,
            candidate: Transform2D::default(),
            validity: None,
            degenerate: false,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> PlacementPhase {
        self.phase
    }

    /// Prototype being placed.
    #[must_use]
    pub const fn prototype(&self) -> &Prototype {
        &self.prototype
    }

    /// Footprint resolved when the gesture started.
    #[must_use]
    pub const fn footprint(&self) -> Option<Footprint> {
        self.footprint
    }

    /// Candidate transform under evaluation.
    #[must_use]
    pub const fn candidate(&self) -> Transform2D {
        self.candidate
    }

    /// Validity computed for the current candidate, if any.
    #[must_use]
    pub const fn validity(&self) -> Option<Validity> {
        self.validity
    }

    /// Whether the last pointer ray missed the placement plane.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Whether releasing now at the candidate would be expected to commit.
    #[must_use]
    pub fn can_place(&self) -> bool {
        self.phase.is_active()
            && !self.degenerate
            && self.validity.map_or(false, |validity| validity.is_valid())
    }

    /// Starts the gesture and places the candidate under the pointer.
    ///
    /// Fails with [`SessionError::MissingFootprint`] when the prototype has
    /// nothing to validate with; the session then stays idle.
    pub fn begin<S>(
        &mut self,
        ray: &Ray,
        scene: &S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<(), SessionError>
    where
        S: ScenePlane + ObstacleQuery,
    {
        self.expect_phase("begin", matches!(self.phase, PlacementPhase::Idle))?;
        let footprint = self.prototype.require_footprint()?;
        self.footprint = Some(footprint);
        self.phase = PlacementPhase::Armed;
        debug!(prototype = %self.prototype.id, "placement armed");

        match scene.project(ray) {
            Some(hit) => {
                self.candidate = Transform2D::default().with_position(hit);
                let _ = self.revalidate(footprint, scene, feedback);
            }
            None => self.mark_degenerate(feedback),
        }
        Ok(())
    }

    /// Moves the candidate to the pointer's plane intersection and re-validates.
    ///
    /// A ray that misses the plane leaves the candidate where it was, marks the
    /// tick invalid and reports [`SessionError::NoPlaneIntersection`].
    pub fn update<S>(
        &mut self,
        ray: &Ray,
        scene: &S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Validity, SessionError>
    where
        S: ScenePlane + ObstacleQuery,
    {
        let footprint = self.active_footprint("update")?;
        self.phase = PlacementPhase::Tracking;

        let Some(hit) = scene.project(ray) else {
            self.mark_degenerate(feedback);
            return Err(SessionError::NoPlaneIntersection);
        };
        self.candidate = self.candidate.with_position(hit);
        Ok(self.revalidate(footprint, scene, feedback))
    }

    /// Ends the gesture at the release point.
    ///
    /// The candidate is always validated again at the release coordinates;
    /// validity from earlier ticks is never trusted.
    pub fn release<S>(
        &mut self,
        ray: &Ray,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<PlacementOutcome, SessionError>
    where
        S: SceneCollaborator,
    {
        let footprint = self.active_footprint("release")?;
        feedback.clear_indicator(IndicatorTarget::Preview);

        let Some(hit) = scene.project(ray) else {
            warn!(prototype = %self.prototype.id, "release missed the placement plane");
            self.phase = PlacementPhase::Discarded;
            self.degenerate = true;
            self.validity = Some(Validity::off_plane());
            return Ok(PlacementOutcome::Discarded { validity: None });
        };
        self.candidate = self.candidate.with_position(hit);
        self.degenerate = false;

        let validity = self.evaluate(footprint, scene);
        self.validity = Some(validity);
        if !validity.is_valid() {
            info!(
                prototype = %self.prototype.id,
                x = hit.x,
                z = hit.z,
                reasons = ?validity.reasons(),
                "placement discarded"
            );
            self.phase = PlacementPhase::Discarded;
            return Ok(PlacementOutcome::Discarded {
                validity: Some(validity),
            });
        }

        match scene.instantiate(&self.prototype.id, self.candidate) {
            Ok(object) => {
                info!(
                    %object,
                    prototype = %self.prototype.id,
                    x = hit.x,
                    z = hit.z,
                    "placement committed"
                );
                self.phase = PlacementPhase::Committed(object);
                Ok(PlacementOutcome::Committed {
                    object,
                    transform: self.candidate,
                })
            }
            Err(error) => {
                self.phase = PlacementPhase::Discarded;
                Err(error)
            }
        }
    }

    /// Abandons an active gesture without creating anything.
    pub fn abort(&mut self, feedback: &mut dyn RenderFeedback) -> Result<(), SessionError> {
        self.expect_phase("abort", self.phase.is_active())?;
        feedback.clear_indicator(IndicatorTarget::Preview);
        self.phase = PlacementPhase::Discarded;
        debug!(prototype = %self.prototype.id, "placement aborted");
        Ok(())
    }

    fn expect_phase(&self, operation: &'static str, allowed: bool) -> Result<(), SessionError> {
        if allowed {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.phase.name(),
            })
        }
    }

    fn active_footprint(&self, operation: &'static str) -> Result<Footprint, SessionError> {
        self.expect_phase(operation, self.phase.is_active())?;
        self.footprint.ok_or_else(|| SessionError::MissingFootprint {
            prototype: self.prototype.id.clone(),
        })
    }

    fn evaluate<S>(&self, footprint: Footprint, scene: &S) -> Validity
    where
        S: ObstacleQuery,
    {
        self.validator
            .validate(&self.candidate, &footprint, &scene.obstacles_excluding(None))
    }

    fn revalidate<S>(
        &mut self,
        footprint: Footprint,
        scene: &S,
        feedback: &mut dyn RenderFeedback,
    ) -> Validity
    where
        S: ObstacleQuery,
    {
        let validity = self.evaluate(footprint, scene);
        self.degenerate = false;
        if self.validity != Some(validity) {
            debug!(
                prototype = %self.prototype.id,
                valid = validity.is_valid(),
                "placement validity changed"
            );
        }
        self.validity = Some(validity);
        feedback.set_validity_indicator(IndicatorTarget::Preview, validity.is_valid());
        validity
    }

    fn mark_degenerate(&mut self, feedback: &mut dyn RenderFeedback) {
        warn!(prototype = %self.prototype.id, "pointer ray missed the placement plane");
        self.degenerate = true;
        self.validity = Some(Validity::off_plane());
        feedback.set_validity_indicator(IndicatorTarget::Preview, false);
    }
}

impl PointerHandler for PlacementSession {
    fn on_pointer_down<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
    ) -> Result<(), SessionError> {
        self.begin(&pointer.ray, scene, feedback)
    }

    fn on_pointer_drag<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
    ) -> Result<(), SessionError> {
        self.update(&pointer.ray, scene, feedback).map(|_| ())
    }

    fn on_pointer_up<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
    ) -> Result<(), SessionError> {
        self.release(&pointer.ray, scene, feedback).map(|_| ())
    }
}
