//! Structural table editing addressed by a context-clicked cell.
//!
//! # Responsibility
//! - Locate the cell, row and table enclosing a clicked node.
//! - Insert/delete rows and columns relative to that cell.
//!
//! # Invariants
//! - A table always keeps at least one row and one column; requests that
//!   would remove the last one are refused without touching the markup.
//! - New cells carry a fixed style and a non-breaking placeholder so they
//!   stay visible and clickable.

use crate::surface::{Element, MarkupTree, NodeId, Surface, SurfaceError, SurfaceResult, TreeQuery};
use log::info;

const NEW_CELL_STYLE: &str = "padding: 8px; border: 1px solid #ccc;";
const CELL_PLACEHOLDER: &str = "\u{a0}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAction {
    InsertRowAbove,
    InsertRowBelow,
    DeleteRow,
    InsertColumnLeft,
    InsertColumnRight,
    DeleteColumn,
}

impl TableAction {
    pub fn name(self) -> &'static str {
        match self {
            Self::InsertRowAbove => "insert_row_above",
            Self::InsertRowBelow => "insert_row_below",
            Self::DeleteRow => "delete_row",
            Self::InsertColumnLeft => "insert_column_left",
            Self::InsertColumnRight => "insert_column_right",
            Self::DeleteColumn => "delete_column",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEditOutcome {
    Applied,
    /// Would remove the table's only row or only column.
    Refused,
    /// Target is no longer inside a table cell on the surface.
    TargetMissing,
}

/// Position of a cell inside its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLocation {
    pub cell: NodeId,
    pub row: NodeId,
    pub table: NodeId,
    pub row_index: usize,
    pub column_index: usize,
}

pub fn is_cell_tag(tag: &str) -> bool {
    matches!(tag, "td" | "th")
}

/// Finds the nearest enclosing cell of `from`, searching up to `boundary`.
pub fn locate_cell<T: TreeQuery>(tree: &T, from: NodeId, boundary: NodeId) -> Option<CellLocation> {
    let cell = tree.closest_ancestor(from, boundary, is_cell_tag)?;
    let row = tree.parent_of(cell).filter(|row| tree.tag_of(*row) == Some("tr"))?;
    let table = tree.closest_ancestor(row, boundary, |tag| tag == "table")?;
    let row_index = table_rows(tree, table).iter().position(|candidate| *candidate == row)?;
    let column_index = tree.index_among_siblings(cell, is_cell_tag)?;
    Some(CellLocation {
        cell,
        row,
        table,
        row_index,
        column_index,
    })
}

/// Rows of `table` in order: direct `tr` children plus rows of its
/// `thead`/`tbody`/`tfoot` sections. Rows of nested tables are excluded.
pub fn table_rows<T: TreeQuery>(tree: &T, table: NodeId) -> Vec<NodeId> {
    let mut rows = Vec::new();
    for child in tree.children_of(table) {
        match tree.tag_of(*child) {
            Some("tr") => rows.push(*child),
            Some("thead" | "tbody" | "tfoot") => rows.extend(
                tree.children_of(*child)
                    .iter()
                    .filter(|row| tree.tag_of(**row) == Some("tr"))
                    .copied(),
            ),
            _ => {}
        }
    }
    rows
}

pub fn row_cells<T: TreeQuery>(tree: &T, row: NodeId) -> Vec<NodeId> {
    tree.children_of(row)
        .iter()
        .filter(|node| tree.tag_of(**node).is_some_and(is_cell_tag))
        .copied()
        .collect()
}

/// Applies `action` relative to the cell enclosing `target`.
pub fn apply_action(
    surface: &mut Surface,
    target: NodeId,
    action: TableAction,
) -> SurfaceResult<TableEditOutcome> {
    let Some(location) = locate_cell(surface.tree(), target, surface.root()) else {
        return Ok(TableEditOutcome::TargetMissing);
    };
    let rows = table_rows(surface.tree(), location.table);
    let width = row_cells(surface.tree(), location.row).len();

    let refused = match action {
        TableAction::DeleteRow => rows.len() <= 1,
        TableAction::DeleteColumn => width <= 1,
        _ => false,
    };
    if refused {
        info!(
            "event=table_edit module=editor status=refused action={} rows={} columns={width}",
            action.name(),
            rows.len()
        );
        return Ok(TableEditOutcome::Refused);
    }

    surface.checkpoint();
    let tree = surface.tree_mut();
    match action {
        TableAction::InsertRowAbove => insert_row(tree, location.row, width, 0)?,
        TableAction::InsertRowBelow => insert_row(tree, location.row, width, 1)?,
        TableAction::DeleteRow => tree.remove(location.row),
        TableAction::InsertColumnLeft => {
            insert_column(tree, &rows, location.column_index)?;
        }
        TableAction::InsertColumnRight => {
            insert_column(tree, &rows, location.column_index + 1)?;
        }
        TableAction::DeleteColumn => {
            for row in &rows {
                if let Some(cell) = row_cells(&*tree, *row).get(location.column_index) {
                    tree.remove(*cell);
                }
            }
        }
    }
    Ok(TableEditOutcome::Applied)
}

fn new_cell(tree: &mut MarkupTree) -> SurfaceResult<NodeId> {
    let cell = tree.create_element(Element::new("td").with_attr("style", NEW_CELL_STYLE));
    let placeholder = tree.create_text(CELL_PLACEHOLDER);
    tree.append_child(cell, placeholder)?;
    Ok(cell)
}

fn insert_row(tree: &mut MarkupTree, anchor: NodeId, width: usize, after: usize) -> SurfaceResult<()> {
    let parent = tree
        .parent_of(anchor)
        .ok_or(SurfaceError::DetachedNode(anchor))?;
    let index = tree.index_in_parent(anchor).unwrap_or(0) + after;
    let row = tree.create_element(Element::new("tr"));
    for _ in 0..width {
        let cell = new_cell(tree)?;
        tree.append_child(row, cell)?;
    }
    tree.insert_child(parent, index, row)
}

/// Inserts one cell per row before the cell at `column` (appends when the
/// row is shorter).
fn insert_column(tree: &mut MarkupTree, rows: &[NodeId], column: usize) -> SurfaceResult<()> {
    for row in rows {
        let child_index = row_cells(&*tree, *row)
            .get(column)
            .and_then(|cell| tree.index_in_parent(*cell))
            .unwrap_or_else(|| tree.children_of(*row).len());
        let cell = new_cell(tree)?;
        tree.insert_child(*row, child_index, cell)?;
    }
    Ok(())
}
