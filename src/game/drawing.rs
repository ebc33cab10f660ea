//! Drawing history: committed strokes, an undo/redo stack, and the
//! in-progress temp stroke the drawer is currently laying down.

use std::sync::Mutex;

use crate::protocol::Line;

#[derive(Debug, Default)]
struct TempStroke {
    points: Vec<crate::protocol::Point>,
    colour_idx: u32,
    thickness_idx: u32,
}

#[derive(Debug, Default)]
struct DrawingState {
    lines: Vec<Line>,
    redo_stack: Vec<Line>,
    temp: TempStroke,
}

/// Thread-safe drawing log for one room. Mutated only by the event loop and
/// cleared by the turn driver at turn end.
#[derive(Debug, Default)]
pub struct DrawingLog {
    state: Mutex<DrawingState>,
}

impl DrawingLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut DrawingState) -> R) -> R {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut state)
    }

    /// Append a committed line. Invalidates the redo stack.
    pub fn commit_line(&self, line: Line) -> bool {
        self.with_state(|state| {
            state.lines.push(line);
            state.redo_stack.clear();
            true
        })
    }

    /// Merge incoming in-progress points into the temp buffer, adopting the
    /// stroke's colour and thickness.
    pub fn append_temp(&self, line: &Line) {
        self.with_state(|state| {
            state.temp.points.extend_from_slice(&line.points);
            state.temp.colour_idx = line.colour_idx;
            state.temp.thickness_idx = line.thickness_idx;
        });
    }

    /// Materialize the temp buffer as a committed line and clear it.
    /// Returns false when there is nothing to promote.
    pub fn promote_temp(&self) -> bool {
        self.with_state(|state| {
            if state.temp.points.is_empty() {
                return false;
            }
            let temp = std::mem::take(&mut state.temp);
            state.lines.push(Line {
                points: temp.points,
                colour_idx: temp.colour_idx,
                thickness_idx: temp.thickness_idx,
            });
            state.redo_stack.clear();
            true
        })
    }

    pub fn set_temp_colour(&self, colour_idx: u32) {
        self.with_state(|state| state.temp.colour_idx = colour_idx);
    }

    pub fn set_temp_thickness(&self, thickness_idx: u32) {
        self.with_state(|state| state.temp.thickness_idx = thickness_idx);
    }

    /// Pop the latest committed line onto the redo stack. False when empty.
    pub fn undo(&self) -> bool {
        self.with_state(|state| match state.lines.pop() {
            Some(line) => {
                state.redo_stack.push(line);
                true
            }
            None => false,
        })
    }

    /// Pop the latest undone line back into the history. False when empty.
    pub fn redo(&self) -> bool {
        self.with_state(|state| match state.redo_stack.pop() {
            Some(line) => {
                state.lines.push(line);
                true
            }
            None => false,
        })
    }

    /// Empty committed lines, the redo stack, and the temp buffer.
    pub fn clear(&self) -> bool {
        self.with_state(|state| {
            state.lines.clear();
            state.redo_stack.clear();
            state.temp = TempStroke::default();
            true
        })
    }

    /// Snapshot copy of the committed lines, for rehydration.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Line> {
        self.with_state(|state| state.lines.clone())
    }
}
