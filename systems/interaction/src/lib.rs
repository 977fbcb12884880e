#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input dispatch for the placement sandbox.
//!
//! [`InputRouter`] receives pointer samples and UI actions once per tick and
//! decides which component owns them: a drag-to-place gesture started from
//! the palette, the editor, or the camera rig. Everything that happened is
//! reported through [`Interaction`] values pushed to a caller-provided buffer.

mod camera;

pub use camera::{CameraConfig, TopDownCamera, Viewport};

use std::time::Duration;

use placement_sandbox_core::{
    ObjectFactory, ObjectId, ObjectTransforms, ObstacleQuery, PointerHandler, PointerSample,
    Prototype, PrototypeId, RenderFeedback, SceneCollaborator, ScenePlane, SessionError,
    Transform2D, Validity,
};
use placement_sandbox_system_animation::{
    AnimationEvent, CycleConfig, DropConfig, Scheduler, TaskId,
};
use placement_sandbox_system_editing::{EditCommit, EditPhase, EditorContext, RotationDial};
use placement_sandbox_system_placement::{PlacementPhase, PlacementSession};
use placement_sandbox_system_validation::SpatialValidator;
use tracing::{debug, info};

/// Everything the router needs to be constructed.
#[derive(Clone, Copy, Debug)]
pub struct RouterConfig {
    /// Validator shared by placement and edit sessions.
    pub validator: SpatialValidator,
    /// Rotation dial handed to edit sessions.
    pub dial: RotationDial,
    /// Animation played after a successful placement.
    pub drop: DropConfig,
    /// Camera rig tunables.
    pub camera: CameraConfig,
}

/// Observable result of routing input.
#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
    /// A drag-to-place gesture created an object.
    Placed {
        /// New object.
        object: ObjectId,
        /// Prototype it was created from.
        prototype: PrototypeId,
        /// Resting transform of the object.
        transform: Transform2D,
    },
    /// A drag-to-place gesture ended without creating anything.
    PlacementDiscarded {
        /// Prototype that was being placed.
        prototype: PrototypeId,
        /// Validity at the release point, `None` if the release missed the plane.
        validity: Option<Validity>,
    },
    /// An object was selected for editing.
    Selected {
        /// Selected object.
        object: ObjectId,
    },
    /// An edit was made permanent.
    EditCommitted(EditCommit),
    /// An edit was abandoned and the object restored.
    EditCancelled {
        /// Restored object.
        object: ObjectId,
        /// Transform the object was restored to.
        restored: Transform2D,
    },
    /// An object was removed from the scene.
    Removed {
        /// Removed object.
        object: ObjectId,
    },
    /// A scheduled task reported progress.
    Animation(AnimationEvent),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gesture {
    Idle,
    Placing,
    MovingObject,
    Panning,
}

/// Routes pointer input and UI actions to the sessions, the camera and the scheduler.
#[derive(Debug)]
pub struct InputRouter {
    validator: SpatialValidator,
    drop: DropConfig,
    editor: EditorContext,
    placement: Option<PlacementSession>,
    camera: TopDownCamera,
    scheduler: Scheduler,
    gesture: Gesture,
}

impl InputRouter {
    /// Creates a router with no active gesture.
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        Self {
            validator: config.validator,
            drop: config.drop,
            editor: EditorContext::new(config.validator, config.dial),
            placement: None,
            camera: TopDownCamera::new(&config.camera),
            scheduler: Scheduler::new(),
            gesture: Gesture::Idle,
        }
    }

    /// Editor owning the active edit session.
    #[must_use]
    pub const fn editor(&self) -> &EditorContext {
        &self.editor
    }

    /// Drag-to-place gesture in progress, if any.
    #[must_use]
    pub const fn placement(&self) -> Option<&PlacementSession> {
        self.placement.as_ref()
    }

    /// Camera rig used to turn screen positions into rays.
    #[must_use]
    pub const fn camera(&self) -> &TopDownCamera {
        &self.camera
    }

    /// Scheduler holding drop animations and periodic events.
    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Starts a periodic event cycle on the scheduler.
    pub fn start_event_cycle(&mut self, config: CycleConfig) -> TaskId {
        self.scheduler.schedule_cycle(config)
    }

    /// A palette entry was pressed: starts a drag-to-place gesture for `prototype`.
    pub fn palette_pressed<S: SceneCollaborator>(
        &mut self,
        prototype: Prototype,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
    ) -> Result<(), SessionError> {
        if self.gesture != Gesture::Idle {
            return Err(SessionError::InvalidState {
                operation: "start placement",
                state: self.gesture_name(),
            });
        }
        let mut session = PlacementSession::new(prototype, self.validator);
        session.on_pointer_down(scene, feedback, pointer)?;
        self.placement = Some(session);
        self.gesture = Gesture::Placing;
        Ok(())
    }

    /// Pointer button pressed over the scene or the UI.
    ///
    /// The editor decides between grabbing, selecting and deselecting. A
    /// press that leaves nothing selected pans the camera.
    pub fn pointer_down<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
        out: &mut Vec<Interaction>,
    ) -> Result<(), SessionError> {
        if self.gesture != Gesture::Idle {
            self.editor.set_pointer_over_ui(pointer.over_ui);
            return Ok(());
        }
        if !pointer.over_ui {
            self.settle_drop_under(pointer, scene, out);
        }

        let before = self.editor.current_object();
        self.editor.on_pointer_down(scene, feedback, pointer)?;
        if pointer.over_ui {
            return Ok(());
        }
        if self.editor.is_dragging_object() {
            self.gesture = Gesture::MovingObject;
            return Ok(());
        }

        let after = self.editor.current_object();
        if after == before && after.is_some() {
            return Ok(());
        }
        if let Some(previous) = before {
            if let Some(restored) = scene.transform(previous) {
                out.push(Interaction::EditCancelled {
                    object: previous,
                    restored,
                });
            }
        }
        match after {
            Some(object) => out.push(Interaction::Selected { object }),
            None => {
                self.camera.begin_pan(pointer.position);
                self.gesture = Gesture::Panning;
            }
        }
        Ok(())
    }

    /// Pointer moved while the button is held.
    pub fn pointer_drag<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
    ) -> Result<(), SessionError> {
        match self.gesture {
            Gesture::Placing => match self.placement.as_mut() {
                Some(session) => session.on_pointer_drag(scene, feedback, pointer),
                None => Ok(()),
            },
            Gesture::MovingObject => self.editor.on_pointer_drag(scene, feedback, pointer),
            Gesture::Panning => {
                self.camera.pan_to(pointer.position);
                Ok(())
            }
            Gesture::Idle => Ok(()),
        }
    }

    /// Pointer button released.
    pub fn pointer_up<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        pointer: &PointerSample,
        out: &mut Vec<Interaction>,
    ) -> Result<(), SessionError> {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        self.editor.set_pointer_over_ui(pointer.over_ui);
        match gesture {
            Gesture::Placing => {
                let Some(mut session) = self.placement.take() else {
                    return Ok(());
                };
                session.on_pointer_up(scene, feedback, pointer)?;
                let prototype = session.prototype().id.clone();
                if let PlacementPhase::Committed(object) = session.phase() {
                    let _ = self.scheduler.schedule_drop(object, &self.drop, scene);
                    out.push(Interaction::Placed {
                        object,
                        prototype,
                        transform: session.candidate(),
                    });
                } else {
                    let validity = if session.is_degenerate() {
                        None
                    } else {
                        session.validity()
                    };
                    out.push(Interaction::PlacementDiscarded {
                        prototype,
                        validity,
                    });
                }
                Ok(())
            }
            Gesture::MovingObject => self.editor.on_pointer_up(scene, feedback, pointer),
            Gesture::Panning => {
                self.camera.end_pan();
                Ok(())
            }
            Gesture::Idle => Ok(()),
        }
    }

    /// UI action: switch the selected object into edit mode.
    pub fn enter_editing<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Validity, SessionError> {
        self.editor.enter_editing(scene, feedback)
    }

    /// UI action: the rotation dial moved.
    pub fn set_rotation<S: SceneCollaborator>(
        &mut self,
        value: f32,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
    ) -> Result<Validity, SessionError> {
        self.editor.set_rotation(value, scene, feedback)
    }

    /// UI action: the rotation dial was released.
    pub fn end_rotation(&mut self) -> Result<(), SessionError> {
        match self.editor.current().map(|session| session.phase()) {
            Some(EditPhase::Rotating) => self.editor.end_gesture(),
            Some(phase) if phase.is_editing() => Ok(()),
            _ => Err(SessionError::InvalidState {
                operation: "end rotation",
                state: "idle",
            }),
        }
    }

    /// UI action: confirm the active edit.
    pub fn confirm(
        &mut self,
        feedback: &mut dyn RenderFeedback,
        out: &mut Vec<Interaction>,
    ) -> Result<(), SessionError> {
        let commit = self.editor.confirm(feedback)?;
        if self.gesture == Gesture::MovingObject {
            self.gesture = Gesture::Idle;
        }
        out.push(Interaction::EditCommitted(commit));
        Ok(())
    }

    /// UI action: cancel whatever is in progress.
    ///
    /// A drag-to-place gesture is aborted; otherwise the active edit is
    /// cancelled and its object restored.
    pub fn cancel<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        out: &mut Vec<Interaction>,
    ) -> Result<(), SessionError> {
        if let Some(mut session) = self.placement.take() {
            self.gesture = Gesture::Idle;
            session.abort(feedback)?;
            out.push(Interaction::PlacementDiscarded {
                prototype: session.prototype().id.clone(),
                validity: None,
            });
            return Ok(());
        }
        self.cancel_edit(scene, feedback, out)
    }

    /// Removes a placed object along with its tasks and any edit session on it.
    pub fn remove_object<S: SceneCollaborator>(
        &mut self,
        object: ObjectId,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        out: &mut Vec<Interaction>,
    ) -> Result<(), SessionError> {
        let _ = self.scheduler.cancel_owned_by(object);
        if self.editor.forget(object, feedback) && self.gesture == Gesture::MovingObject {
            self.gesture = Gesture::Idle;
        }
        if !scene.destroy(object) {
            return Err(SessionError::UnknownObject { object });
        }
        info!(%object, "object removed");
        out.push(Interaction::Removed { object });
        Ok(())
    }

    /// Advances the camera drift and every scheduled task by `dt`.
    pub fn advance<S: SceneCollaborator>(
        &mut self,
        dt: Duration,
        scene: &mut S,
        out: &mut Vec<Interaction>,
    ) {
        self.camera.advance(dt);
        let mut events = Vec::new();
        self.scheduler.advance(dt, scene, &mut events);
        out.extend(events.into_iter().map(Interaction::Animation));
    }

    /// Lands a falling object under the pointer so its selection snapshots the resting height.
    fn settle_drop_under<S: SceneCollaborator>(
        &mut self,
        pointer: &PointerSample,
        scene: &mut S,
        out: &mut Vec<Interaction>,
    ) {
        let Some(object) = scene
            .project(&pointer.ray)
            .and_then(|hit| scene.pick(hit.x, hit.z))
        else {
            return;
        };
        let mut landed = Vec::new();
        if self.scheduler.settle(object, scene, &mut landed) {
            debug!(%object, "drop settled before selection");
        }
        out.extend(landed.into_iter().map(Interaction::Animation));
    }

    fn cancel_edit<S: SceneCollaborator>(
        &mut self,
        scene: &mut S,
        feedback: &mut dyn RenderFeedback,
        out: &mut Vec<Interaction>,
    ) -> Result<(), SessionError> {
        let (object, restored) = self.editor.cancel(scene, feedback)?;
        out.push(Interaction::EditCancelled { object, restored });
        Ok(())
    }

    const fn gesture_name(&self) -> &'static str {
        match self.gesture {
            Gesture::Idle => "idle",
            Gesture::Placing => "placing",
            Gesture::MovingObject => "moving an object",
            Gesture::Panning => "panning",
        }
    }
}
