use crate::roi::geometry::{Point, Rectangle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectorState {
    Idle {
        committed: Option<Rectangle>,
    },
    Dragging {
        anchor: Point,
        live: Rectangle,
        /// Selection that was committed before this drag began. Restored if the
        /// drag ends without covering any area.
        previous: Option<Rectangle>,
    },
}

impl Default for SelectorState {
    fn default() -> Self {
        SelectorState::Idle { committed: None }
    }
}

/// Drag-to-select rectangle editor working in native pixel space.
///
/// A committed selection always has a positive width and height. A drag that
/// ends on its anchor (a plain click) leaves the earlier selection in place;
/// [`RoiSelector::clear`] is the only way to drop one.
#[derive(Debug, Clone, Default)]
pub struct RoiSelector {
    state: SelectorState,
}

impl RoiSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SelectorState::Dragging { .. })
    }

    /// Start a drag at `point`. Ignored (returns `false`) while a drag is
    /// already in progress.
    pub fn begin_drag(&mut self, point: Point) -> bool {
        match self.state {
            SelectorState::Idle { committed } => {
                self.state = SelectorState::Dragging {
                    anchor: point,
                    live: Rectangle::at(point),
                    previous: committed,
                };
                true
            }
            SelectorState::Dragging { .. } => false,
        }
    }

    pub fn update_drag(&mut self, point: Point) {
        if let SelectorState::Dragging { anchor, live, .. } = &mut self.state {
            *live = Rectangle::from_corners(*anchor, point);
        }
    }

    /// Finish the drag and return the selection now in effect.
    pub fn end_drag(&mut self) -> Option<Rectangle> {
        if let SelectorState::Dragging { live, previous, .. } = self.state {
            let committed = if live.is_degenerate() {
                previous
            } else {
                Some(live)
            };
            self.state = SelectorState::Idle { committed };
        }
        self.committed()
    }

    /// Pointer left the tracking surface mid-drag. The rectangle up to the last
    /// known point is kept rather than thrown away.
    pub fn cancel_drag(&mut self, last_point: Option<Point>) -> Option<Rectangle> {
        if let Some(point) = last_point {
            self.update_drag(point);
        }
        self.end_drag()
    }

    pub fn clear(&mut self) {
        self.state = SelectorState::Idle { committed: None };
    }

    pub fn committed(&self) -> Option<Rectangle> {
        match self.state {
            SelectorState::Idle { committed } => committed,
            SelectorState::Dragging { .. } => None,
        }
    }

    /// Rectangle to paint: the live drag box while dragging, otherwise the
    /// committed selection.
    pub fn visible(&self) -> Option<Rectangle> {
        match self.state {
            SelectorState::Idle { committed } => committed,
            SelectorState::Dragging { live, .. } => Some(live),
        }
    }
}
