//! Table context menu state.
//!
//! `Closed` -> right-click on a cell -> `Open { position, target }` ->
//! document click or action -> `Closed`. A right-click while open replaces
//! position and target.

use crate::editor::table::locate_cell;
use crate::surface::{NodeId, Surface};

/// Viewport coordinates of the click that opened the menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContextMenu {
    #[default]
    Closed,
    Open {
        position: MenuPosition,
        /// Cell under the right-click.
        target: NodeId,
    },
}

impl ContextMenu {
    /// Handles a right-click on `clicked`.
    ///
    /// Opens (or re-targets) the menu when the click lands inside a table
    /// cell and returns `true`; otherwise leaves the state as is.
    pub fn on_context_click(&mut self, surface: &Surface, clicked: NodeId, position: MenuPosition) -> bool {
        let Some(location) = locate_cell(surface.tree(), clicked, surface.root()) else {
            return false;
        };
        *self = Self::Open {
            position,
            target: location.cell,
        };
        true
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    /// Closes the menu and hands out the captured target.
    pub fn take_target(&mut self) -> Option<NodeId> {
        let target = self.target();
        self.close();
        target
    }

    pub fn target(&self) -> Option<NodeId> {
        match self {
            Self::Open { target, .. } => Some(*target),
            Self::Closed => None,
        }
    }

    pub fn position(&self) -> Option<MenuPosition> {
        match self {
            Self::Open { position, .. } => Some(*position),
            Self::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{ContextMenu, MenuPosition};
    use crate::surface::Surface;

    #[test]
    fn opens_on_cells_and_retargets_while_open() {
        let surface = Surface::with_content("<table><tr><td>a</td><td>b</td></tr></table><p>x</p>");
        let mut menu = ContextMenu::default();
        let a = surface.find_text("a").unwrap().container;
        let b = surface.find_text("b").unwrap().container;
        let x = surface.find_text("x").unwrap().container;

        assert!(!menu.on_context_click(&surface, x, MenuPosition { x: 1, y: 1 }));
        assert!(!menu.is_open());

        assert!(menu.on_context_click(&surface, a, MenuPosition { x: 10, y: 20 }));
        let first = menu.target().unwrap();
        assert!(menu.on_context_click(&surface, b, MenuPosition { x: 30, y: 40 }));
        assert_ne!(menu.target().unwrap(), first);
        assert_eq!(menu.position(), Some(MenuPosition { x: 30, y: 40 }));

        assert!(!menu.on_context_click(&surface, x, MenuPosition::default()));
        assert!(menu.is_open());

        assert!(menu.take_target().is_some());
        assert!(!menu.is_open());
        assert!(menu.take_target().is_none());
    }
}
