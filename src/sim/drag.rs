//! Gesture interpretation: dragging handles vs. drawing new segments
//!
//! A [`DragSession`] turns one pointer-down..up sequence into edits of a
//! [`DragScene`]. Pressing on a handle (an endpoint or the emitter) drags it
//! by pure translation. Pressing on empty space arms a candidate; once the
//! pointer has travelled past [`DRAG_THRESHOLD`] onto free space, a new
//! segment is drawn from the press point and its far end follows the pointer.

use glam::Vec2;

use super::segment::EndpointId;
use crate::consts::DRAG_THRESHOLD;

/// Pointer input in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { pos: Vec2 },
    Move { pos: Vec2, prev: Vec2 },
    Up { pos: Vec2 },
    Cancel { pos: Vec2 },
}

impl PointerEvent {
    pub fn pos(&self) -> Vec2 {
        match *self {
            PointerEvent::Down { pos }
            | PointerEvent::Move { pos, .. }
            | PointerEvent::Up { pos }
            | PointerEvent::Cancel { pos } => pos,
        }
    }
}

/// Things a pointer can pick up and move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draggable {
    Emitter,
    Endpoint(EndpointId),
}

/// What a drag session needs from the scene it edits
pub trait DragScene {
    /// Topmost draggable under `pos`
    fn draggable_at(&self, pos: Vec2) -> Option<Draggable>;
    /// Whether any object at all occupies `pos`
    fn is_occupied(&self, pos: Vec2) -> bool;
    /// Move a draggable by `delta`, keeping dependent geometry in sync
    fn translate(&mut self, target: Draggable, delta: Vec2);
    /// Draw a segment; returns the endpoint sitting at `end`
    fn create_segment(&mut self, start: Vec2, end: Vec2) -> EndpointId;
    /// Place an endpoint, keeping its segment in sync
    fn move_endpoint_to(&mut self, endpoint: EndpointId, pos: Vec2);
    /// Recompute whatever depends on `target`
    fn refresh(&mut self, target: Draggable);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    Idle,
    /// Pressed on empty space, not yet far enough to draw
    Candidate { start: Vec2 },
    /// Drawing: `endpoint` is the free end following the pointer
    NewSegment { endpoint: EndpointId },
    /// Dragging something that already existed
    Existing { target: Draggable },
}

#[derive(Debug, Clone)]
pub struct DragSession {
    phase: DragPhase,
    /// Pointer position as of the last event
    last_pos: Vec2,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DragSession {
    pub fn new() -> Self {
        Self {
            phase: DragPhase::Idle,
            last_pos: Vec2::ZERO,
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != DragPhase::Idle
    }

    pub fn handle<S: DragScene + ?Sized>(&mut self, event: PointerEvent, scene: &mut S) {
        match event {
            PointerEvent::Down { pos } => self.pointer_down(pos, scene),
            PointerEvent::Move { pos, prev } => self.pointer_move(pos, prev, scene),
            PointerEvent::Up { pos } | PointerEvent::Cancel { pos } => self.finish(pos, scene),
        }
    }

    pub fn pointer_down<S: DragScene + ?Sized>(&mut self, pos: Vec2, scene: &mut S) {
        if self.is_active() {
            // A second press without a release: close out the first gesture
            let last = self.last_pos;
            self.finish(last, scene);
        }

        self.last_pos = pos;
        self.phase = match scene.draggable_at(pos) {
            Some(target) => DragPhase::Existing { target },
            None => DragPhase::Candidate { start: pos },
        };
    }

    pub fn pointer_move<S: DragScene + ?Sized>(&mut self, pos: Vec2, prev: Vec2, scene: &mut S) {
        match self.phase {
            DragPhase::Idle => {}
            DragPhase::Existing { target } => scene.translate(target, pos - prev),
            DragPhase::NewSegment { endpoint } => scene.move_endpoint_to(endpoint, pos),
            DragPhase::Candidate { start } => {
                if start.distance(pos) > DRAG_THRESHOLD && !scene.is_occupied(pos) {
                    let endpoint = scene.create_segment(start, pos);
                    self.phase = DragPhase::NewSegment { endpoint };
                }
            }
        }
        self.last_pos = pos;
    }

    /// Pointer released or cancelled: final geometry update, then idle
    pub fn finish<S: DragScene + ?Sized>(&mut self, pos: Vec2, scene: &mut S) {
        match self.phase {
            DragPhase::Idle | DragPhase::Candidate { .. } => {}
            DragPhase::Existing { target } => {
                let delta = pos - self.last_pos;
                if delta != Vec2::ZERO {
                    scene.translate(target, delta);
                }
                scene.refresh(target);
            }
            DragPhase::NewSegment { endpoint } => {
                scene.move_endpoint_to(endpoint, pos);
                scene.refresh(Draggable::Endpoint(endpoint));
            }
        }
        self.phase = DragPhase::Idle;
        self.last_pos = pos;
    }
}
