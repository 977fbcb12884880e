#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Editing of objects that were already placed.
//!
//! [`EditSession`] tracks one select, move, rotate and confirm-or-cancel
//! gesture. [`EditorContext`] owns the single active session and the UI
//! capture flag, rejecting a second editor while one object is in edit mode.

mod dial;
mod session;

pub use dial::RotationDial;
pub use session::{EditPhase, EditSession};

use placement_sandbox_core::{
    ObjectId, ObjectTransforms, ObstacleQuery, PointerHandler, PointerSample, Ray,
    RenderFeedback, SceneCollaborator, ScenePlane, SessionError, Transform2D, Validity,
};
use placement_sandbox_system_validation::SpatialValidator;
use tracing::{debug, warn};

/// Result of asking the editor to select an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The object was already selected; nothing changed.
    Unchanged,
    /// A new session was opened.
    Selected {
        /// Object whose selection was dropped to make room, if any.
        replaced: Option<ObjectId>,
    },
}

/// Committed edit reported when a session is confirmed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditCommit {
    /// Edited object.
    pub object: ObjectId,
    /// Transform before the edit started.
    pub from: Transform2D,
    /// Transform made permanent.
    pub to: Transform2D,
}

/// Owner of the one active edit session and the UI capture flag.
#[derive(Clone, Debug)]
pub struct EditorContext {
    validator: SpatialValidator,
    dial: RotationDial,
    current: Option<EditSession>,
    pointer_over_ui: bool,
}

impl EditorContext {
    /// Creates an editor with no active session.
    #[must_use]
    pub fn new(validator: SpatialValidator, dial: RotationDial) -> Self {
        Self {
            validator,
            dial,
            current: None,
            pointer_over_ui: false,
        }
    }

    /// Active edit session, if any.
    #[must_use]
    pub fn current(&self) -> Option<&EditSession> {
        self.current.as_ref()
    }

    /// Object owning the active edit session.
    #[must_use]
    pub fn current_object(&self) -> Option<ObjectId> {
        self.current.as_ref().map(EditSession::object)
    }

    /// Rotation dial shared by every session.
    #[must_use]
    pub const fn dial(&self) -> RotationDial {
        self.dial
    }

    /// Whether the pointer is currently captured by a UI element.
    #[must_use]
    pub const fn pointer_over_ui(&self) -> bool {
        self.pointer_over_ui
    }

    /// Records whether the pointer is captured by a UI element.
    pub fn set_pointer_over_ui(&mut self, over_ui: bool) {
        self.pointer_over_ui = over_ui;
    }

    /// Whether a placed object is currently following the pointer.
    #[must_use]
    pub fn is_dragging_object(&self) -> bool {
        self.current
            .as_ref()
            .map_or(false, |session| session.phase() == EditPhase::Dragging)
    }

    /// Selects `object` for editing.
    ///
    /// Selecting the current object changes nothing. Another object that is
    /// only selected is cancelled first; another object in edit mode makes
    /// the request fail with [`SessionError::EditorBusy`] and stays untouched.
    pub fn select<S>(
        &mut self,
        object: ObjectId,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Selection, SessionError>
    where
        S: ObjectTransforms + ObstacleQuery,
    {
        let mut replaced = None;
        if let Some(current) = self.current.as_mut() {
            if current.object() == object {
                return Ok(Selection::Unchanged);
            }
            if current.phase().is_editing() {
                warn!(
                    requested = %object,
                    current = %current.object(),
                    "selection rejected while editing"
                );
                return Err(SessionError::EditorBusy {
                    current: current.object(),
                });
            }
            let _ = current.deselect(scene, feedback)?;
            replaced = Some(current.object());
            self.current = None;
        }

        let session = EditSession::select(object, scene, self.validator, self.dial, feedback)?;
        self.current = Some(session);
        Ok(Selection::Selected { replaced })
    }

    /// Enters edit mode on the selected object.
    pub fn enter_editing<S>(
        &mut self,
        scene: &S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Validity, SessionError>
    where
        S: ObstacleQuery,
    {
        self.session_mut("enter editing")?
            .enter_editing(scene, feedback)
    }

    /// Starts dragging the edited object from the pointer's plane hit.
    pub fn begin_drag<S>(&mut self, ray: &Ray, scene: &S) -> Result<(), SessionError>
    where
        S: ScenePlane,
    {
        self.session_mut("begin drag")?.begin_drag(ray, scene)
    }

    /// Moves the edited object under the pointer.
    pub fn drag<S>(
        &mut self,
        ray: &Ray,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Validity, SessionError>
    where
        S: ScenePlane + ObstacleQuery + ObjectTransforms,
    {
        self.session_mut("drag")?.drag(ray, scene, feedback)
    }

    /// Ends the active drag or rotation gesture.
    pub fn end_gesture(&mut self) -> Result<(), SessionError> {
        self.session_mut("end gesture")?.end_gesture()
    }

    /// Applies a rotation dial value to the edited object.
    pub fn set_rotation<S>(
        &mut self,
        value: f32,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Validity, SessionError>
    where
        S: ObstacleQuery + ObjectTransforms,
    {
        self.session_mut("rotate")?
            .set_rotation(value, scene, feedback)
    }

    /// Confirms the active edit and releases the editor.
    pub fn confirm(
        &mut self,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<EditCommit, SessionError> {
        let session = self.session_mut("confirm")?;
        let to = session.confirm(feedback)?;
        let commit = EditCommit {
            object: session.object(),
            from: session.initial(),
            to,
        };
        self.current = None;
        Ok(commit)
    }

    /// Cancels the active edit, restoring the object, and releases the editor.
    pub fn cancel<S>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<(ObjectId, Transform2D), SessionError>
    where
        S: ObjectTransforms,
    {
        let session = self.session_mut("cancel")?;
        let restored = session.cancel(scene, feedback)?;
        let object = session.object();
        self.current = None;
        Ok((object, restored))
    }

    /// Drops the session for an object that was removed from the scene.
    ///
    /// Returns whether a session was dropped. Nothing is restored since the
    /// object no longer exists.
    pub fn forget(&mut self, object: ObjectId, feedback: &mut dyn RenderFeedback) -> bool {
        match self.current.as_mut() {
            Some(session) if session.object() == object => {
                session.abandon(feedback);
                self.current = None;
                debug!(%object, "edit session dropped with its object");
                true
            }
            _ => false,
        }
    }

    fn session_mut(&mut self, operation: &'static str) -> Result<&mut EditSession, SessionError> {
        self.current.as_mut().ok_or(SessionError::InvalidState {
            operation,
            state: "idle",
        })
    }
}

impl PointerHandler for EditorContext {
    /// Routes a press: on the edited object it starts a drag, on another
    /// object it selects, and on empty ground it deselects.
    fn on_pointer_down<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
    ) -> Result<(), SessionError> {
        self.pointer_over_ui = pointer.over_ui;
        if pointer.over_ui {
            return Ok(());
        }
        let hit = scene
            .project(&pointer.ray)
            .ok_or(SessionError::NoPlaneIntersection)?;
        let picked = scene.pick(hit.x, hit.z);
        let in_edit_mode = self
            .current
            .as_ref()
            .filter(|session| session.phase() == EditPhase::Editing)
            .map(EditSession::object);

        match picked {
            Some(object) if in_edit_mode == Some(object) => self.begin_drag(&pointer.ray, scene),
            Some(object) => self.select(object, scene, feedback).map(|_| ()),
            None if self.current.is_some() => self.cancel(scene, feedback).map(|_| ()),
            None => Ok(()),
        }
    }

    fn on_pointer_drag<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
    ) -> Result<(), SessionError> {
        if !self.is_dragging_object() {
            return Ok(());
        }
        self.drag(&pointer.ray, scene, feedback).map(|_| ())
    }

    fn on_pointer_up<S: SceneCollaborator>(
        &mut self,
        _scene: &mut S,
        _feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
    ) -> Result<(), SessionError> {
        self.pointer_over_ui = pointer.over_ui;
        if self.is_dragging_object() {
            self.end_gesture()?;
        }
        Ok(())
    }
}
