//! Drag-and-drop interaction state for the layer tree.
//!
//! Nothing here touches the element tree. The drop position is recomputed from
//! the pointer and the hovered row's box on every move, so the state can be
//! dropped and rebuilt at any time.

use crate::mutations::Mutation;
use serde::{Deserialize, Serialize};

/// Where a dragged node lands relative to the drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    Inside,
}

/// Top band of a row that means "before"
const BEFORE_BAND: f64 = 0.3;
/// Rows below this fraction of the height mean "after"
const AFTER_BAND: f64 = 0.7;

/// Map a pointer to a drop position: top 30% of the row is `Before`, bottom
/// 30% is `After`, the middle 40% is `Inside`. Pointers outside the row clamp
/// to the nearest band.
pub fn drop_position(pointer_y: f64, row_top: f64, row_height: f64) -> DropPosition {
    if row_height <= 0.0 || !row_height.is_finite() {
        return DropPosition::Inside;
    }
    let ratio = (pointer_y - row_top) / row_height;
    if ratio < BEFORE_BAND {
        DropPosition::Before
    } else if ratio > AFTER_BAND {
        DropPosition::After
    } else {
        DropPosition::Inside
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragState {
    pub dragging: Option<String>,
    pub drop_target: Option<String>,
    pub position: Option<DropPosition>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, node_id: impl Into<String>) {
        self.dragging = Some(node_id.into());
        self.drop_target = None;
        self.position = None;
    }

    /// Pointer moved over the row of `target_id`
    pub fn hover(&mut self, target_id: impl Into<String>, pointer_y: f64, row_top: f64, row_height: f64) {
        if self.dragging.is_none() {
            return;
        }
        self.drop_target = Some(target_id.into());
        self.position = Some(drop_position(pointer_y, row_top, row_height));
    }

    /// Pointer left every row
    pub fn leave(&mut self) {
        self.drop_target = None;
        self.position = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// End the drag. Returns the move to apply, if the pointer was over a row.
    pub fn finish(&mut self) -> Option<Mutation> {
        let state = std::mem::take(self);
        Some(Mutation::MoveElement {
            source_id: state.dragging?,
            target_id: state.drop_target?,
            position: state.position?,
        })
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_bands() {
        assert_eq!(drop_position(100.0, 100.0, 40.0), DropPosition::Before);
        assert_eq!(drop_position(111.0, 100.0, 40.0), DropPosition::Before);
        assert_eq!(drop_position(112.0, 100.0, 40.0), DropPosition::Inside);
        assert_eq!(drop_position(120.0, 100.0, 40.0), DropPosition::Inside);
        assert_eq!(drop_position(128.0, 100.0, 40.0), DropPosition::Inside);
        assert_eq!(drop_position(129.0, 100.0, 40.0), DropPosition::After);
        assert_eq!(drop_position(140.0, 100.0, 40.0), DropPosition::After);
    }

    #[test]
    fn test_outside_row_clamps() {
        assert_eq!(drop_position(50.0, 100.0, 40.0), DropPosition::Before);
        assert_eq!(drop_position(500.0, 100.0, 40.0), DropPosition::After);
        assert_eq!(drop_position(0.0, 0.0, 0.0), DropPosition::Inside);
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut drag = DragState::new();
        drag.hover("a", 0.0, 0.0, 10.0);
        assert_eq!(drag.drop_target, None);

        drag.start("card");
        drag.hover("list", 15.0, 10.0, 20.0);
        assert_eq!(drag.position, Some(DropPosition::Before));
        drag.hover("list", 20.0, 10.0, 20.0);

        let mutation = drag.finish().unwrap();
        assert_eq!(
            mutation,
            Mutation::MoveElement {
                source_id: "card".to_string(),
                target_id: "list".to_string(),
                position: DropPosition::Inside,
            }
        );
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_finish_without_target() {
        let mut drag = DragState::new();
        drag.start("card");
        drag.hover("list", 0.0, 0.0, 10.0);
        drag.leave();
        assert_eq!(drag.finish(), None);
        assert_eq!(drag, DragState::default());
    }
}
