use placement_sandbox_core::{
    Footprint, IndicatorTarget, ObjectId, ObjectTransforms, ObstacleQuery, Point3, Ray,
    RenderFeedback, ScenePlane, SessionError, Transform2D, Validity,
};
use placement_sandbox_system_validation::SpatialValidator;
use tracing::{debug, info, warn};

use crate::RotationDial;

/// Lifecycle phase of an edit gesture on a placed object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditPhase {
    /// Object is selected; nothing may move yet.
    Selected,
    /// Edit mode is active and no gesture is in progress.
    Editing,
    /// The object follows the pointer.
    Dragging,
    /// The rotation dial is being adjusted.
    Rotating,
    /// The live transform was made permanent.
    Committed,
    /// The object was restored to its pre-select transform.
    Cancelled,
}

impl EditPhase {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Selected => "selected",
            Self::Editing => "editing",
            Self::Dragging => "dragging",
            Self::Rotating => "rotating",
            Self::Committed => "committed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Reports whether edit mode is active, including its gesture sub-phases.
    #[must_use]
    pub const fn is_editing(self) -> bool {
        matches!(self, Self::Editing | Self::Dragging | Self::Rotating)
    }

    /// Reports whether the session has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Cancelled)
    }
}

/// Transient state of one select, edit, confirm-or-cancel gesture.
///
/// Drags and rotations write straight to the live object through
/// [`ObjectTransforms`], so the object on screen is always the candidate.
/// The transform captured at selection is kept for [`EditSession::cancel`].
#[derive(Clone, Debug)]
pub struct EditSession {
    object: ObjectId,
    footprint: Footprint,
    initial: Transform2D,
    candidate: Transform2D,
    phase: EditPhase,
    validity: Validity,
    validator: SpatialValidator,
    dial: RotationDial,
    dial_value: f32,
    drag_offset: (f32, f32),
    degenerate: bool,
}

impl EditSession {
    /// Selects a placed object, snapshotting its current transform.
    pub fn select<S>(
        object: ObjectId,
        scene: &S,
        validator: SpatialValidator,
        dial: RotationDial,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Self, SessionError>
    where
        S: ObjectTransforms + ObstacleQuery,
    {
        let initial = scene
            .transform(object)
            .ok_or(SessionError::UnknownObject { object })?;
        let footprint = scene
            .footprint(object)
            .ok_or(SessionError::UnknownObject { object })?;

        let mut session = Self {
            object,
            footprint,
            initial,
            candidate: initial,
            phase: EditPhase::Selected,
            validity: Validity::Valid,
            validator,
            dial,
            dial_value: RotationDial::NEUTRAL,
            drag_offset: (0.0, 0.0),
            degenerate: false,
        };
        let _ = session.revalidate(scene, feedback);
        debug!(%object, "object selected");
        Ok(session)
    }

    /// Object being edited.
    #[must_use]
    pub const fn object(&self) -> ObjectId {
        self.object
    }

    /// Transform captured when the object was selected.
    #[must_use]
    pub const fn initial(&self) -> Transform2D {
        self.initial
    }

    /// Live transform of the object.
    #[must_use]
    pub const fn candidate(&self) -> Transform2D {
        self.candidate
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> EditPhase {
        self.phase
    }

    /// Validity of the live transform.
    #[must_use]
    pub const fn validity(&self) -> Validity {
        self.validity
    }

    /// Last value applied to the rotation dial.
    #[must_use]
    pub const fn dial_value(&self) -> f32 {
        self.dial_value
    }

    /// Yaw offset from the initial transform selected by the dial.
    #[must_use]
    pub fn rotation_offset(&self) -> f32 {
        self.dial.offset_for(self.dial_value)
    }

    /// Ground-plane offset from the pointer hit to the object centre.
    #[must_use]
    pub const fn drag_offset(&self) -> (f32, f32) {
        self.drag_offset
    }

    /// Whether the last drag ray missed the placement plane.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Whether a confirm action should be offered to the user.
    ///
    /// [`EditSession::confirm`] itself does not consult this.
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        self.phase.is_editing() && !self.degenerate && self.validity.is_valid()
    }

    /// Switches from selection into edit mode and refreshes feedback.
    pub fn enter_editing<S>(
        &mut self,
        scene: &S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Validity, SessionError>
    where
        S: ObstacleQuery,
    {
        self.expect_phase("enter editing", self.phase == EditPhase::Selected)?;
        self.phase = EditPhase::Editing;
        info!(object = %self.object, "edit mode entered");
        Ok(self.revalidate(scene, feedback))
    }

    /// Starts a drag gesture at the pointer's plane hit.
    ///
    /// The offset between the hit and the object centre is kept for the rest
    /// of the gesture so the object does not jump under the pointer.
    pub fn begin_drag<S>(&mut self, ray: &Ray, scene: &S) -> Result<(), SessionError>
    where
        S: ScenePlane,
    {
        self.expect_phase("begin drag", self.phase == EditPhase::Editing)?;
        let hit = scene.project(ray).ok_or(SessionError::NoPlaneIntersection)?;
        self.drag_offset = (
            self.candidate.position.x - hit.x,
            self.candidate.position.z - hit.z,
        );
        self.phase = EditPhase::Dragging;
        debug!(object = %self.object, "drag started");
        Ok(())
    }

    /// Moves the live object under the pointer and re-validates it.
    ///
    /// Called in plain edit mode the drag gesture starts implicitly. Height
    /// stays pinned to its pre-edit value.
    pub fn drag<S>(
        &mut self,
        ray: &Ray,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Validity, SessionError>
    where
        S: ScenePlane + ObstacleQuery + ObjectTransforms,
    {
        self.expect_phase(
            "drag",
            matches!(self.phase, EditPhase::Editing | EditPhase::Dragging),
        )?;
        let Some(hit) = scene.project(ray) else {
            self.mark_degenerate(feedback);
            return Err(SessionError::NoPlaneIntersection);
        };
        if self.phase == EditPhase::Editing {
            self.begin_drag(ray, scene)?;
        }

        let position = Point3::new(
            hit.x + self.drag_offset.0,
            self.initial.position.y,
            hit.z + self.drag_offset.1,
        );
        self.write_live(scene, self.candidate.with_position(position))?;
        Ok(self.revalidate(scene, feedback))
    }

    /// Ends the active drag or rotation gesture, returning to edit mode.
    pub fn end_gesture(&mut self) -> Result<(), SessionError> {
        self.expect_phase(
            "end gesture",
            matches!(self.phase, EditPhase::Dragging | EditPhase::Rotating),
        )?;
        self.phase = EditPhase::Editing;
        Ok(())
    }

    /// Rotates the live object to the yaw selected by the dial value.
    ///
    /// The offset is always relative to the initial yaw. Rejected while a
    /// drag is in progress.
    pub fn set_rotation<S>(
        &mut self,
        value: f32,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Validity, SessionError>
    where
        S: ObstacleQuery + ObjectTransforms,
    {
        self.expect_phase(
            "rotate",
            matches!(self.phase, EditPhase::Editing | EditPhase::Rotating),
        )?;
        self.phase = EditPhase::Rotating;
        self.dial_value = value;

        let yaw = self.dial.yaw_for(self.initial.yaw_degrees, value);
        self.write_live(scene, self.candidate.with_yaw(yaw))?;
        debug!(object = %self.object, yaw, "rotation changed");
        Ok(self.revalidate(scene, feedback))
    }

    /// Makes the live transform permanent, regardless of its validity.
    pub fn confirm(
        &mut self,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Transform2D, SessionError> {
        self.expect_phase("confirm", self.phase.is_editing())?;
        if !self.validity.is_valid() {
            warn!(
                object = %self.object,
                reasons = ?self.validity.reasons(),
                "confirming an invalid edit"
            );
        }
        self.phase = EditPhase::Committed;
        feedback.clear_indicator(IndicatorTarget::Object(self.object));
        info!(
            object = %self.object,
            x = self.candidate.position.x,
            z = self.candidate.position.z,
            yaw = self.candidate.yaw_degrees,
            "edit committed"
        );
        Ok(self.candidate)
    }

    /// Restores the object to its pre-select transform and ends the session.
    ///
    /// Restoration is unconditional. A scene that no longer knows the object
    /// still ends the session.
    pub fn cancel<S>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Transform2D, SessionError>
    where
        S: ObjectTransforms,
    {
        self.expect_phase("cancel", !self.phase.is_terminal())?;
        if !scene.set_transform(self.object, self.initial) {
            warn!(object = %self.object, "cancelled edit of an object the scene no longer has");
        }
        self.candidate = self.initial;
        self.phase = EditPhase::Cancelled;
        feedback.clear_indicator(IndicatorTarget::Object(self.object));
        info!(object = %self.object, "edit cancelled");
        Ok(self.initial)
    }

    /// Outside-click deselection. Behaves exactly like [`EditSession::cancel`].
    pub fn deselect<S>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Transform2D, SessionError>
    where
        S: ObjectTransforms,
    {
        self.cancel(scene, feedback)
    }

    pub(crate) fn abandon(&mut self, feedback: &mut dyn RenderFeedback) {
        self.phase = EditPhase::Cancelled;
        feedback.clear_indicator(IndicatorTarget::Object(self.object));
    }

    fn write_live<S>(
        &mut self,
        scene: &mut S,
        transform: Transform2D,
    ) -> Result<(), SessionError>
    where
        S: ObjectTransforms,
    {
        if !scene.set_transform(self.object, transform) {
            return Err(SessionError::UnknownObject {
                object: self.object,
            });
        }
        self.candidate = transform;
        Ok(())
    }

    fn revalidate<S>(&mut self, scene: &S, feedback: &mut dyn RenderFeedback) -> Validity
    where
        S: ObstacleQuery,
    {
        let obstacles = scene.obstacles_excluding(Some(self.object));
        let validity = self.validator.validate_excluding(
            &self.candidate,
            &self.footprint,
            &obstacles,
            Some(self.object),
        );
        self.validity = validity;
        self.degenerate = false;
        feedback.set_validity_indicator(
            IndicatorTarget::Object(self.object),
            validity.is_valid(),
        );
        validity
    }

    fn mark_degenerate(&mut self, feedback: &mut dyn RenderFeedback) {
        warn!(object = %self.object, "drag ray missed the placement plane");
        self.degenerate = true;
        self.validity = Validity::off_plane();
        feedback.set_validity_indicator(IndicatorTarget::Object(self.object), false);
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
}
