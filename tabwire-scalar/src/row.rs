use crate::Cell;

/// A keyed row of a table: the row key followed by one cell per column, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    key: String,
    cells: Vec<Cell>,
}

impl Row {
    /// Create a row from its key and cells.
    pub fn new(key: impl Into<String>, cells: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            key: key.into(),
            cells: cells.into_iter().collect(),
        }
    }

    /// The row key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// All cells, in column order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cell of column `idx`.
    pub fn cell(&self, idx: usize) -> Option<&Cell> {
        self.cells.get(idx)
    }

    /// The number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Split the row into its key and cells.
    pub fn into_parts(self) -> (String, Vec<Cell>) {
        (self.key, self.cells)
    }
}
