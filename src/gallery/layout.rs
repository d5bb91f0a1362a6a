//! Three-column gallery layout.

use serde::Serialize;

/// Number of gallery columns.
pub const COLUMNS: usize = 3;

/// One placed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell<T> {
    /// Position in the input sequence.
    pub index: usize,
    pub row: usize,
    pub column: usize,
    pub item: T,
}

/// Items distributed over [`COLUMNS`] columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridLayout<T> {
    pub columns: Vec<Vec<Cell<T>>>,
}

impl<T> GridLayout<T> {
    /// Total number of placed items.
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rows, counting a partly filled last row.
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    /// Cells row by row, left to right.
    pub fn rows(&self) -> Vec<Vec<&Cell<T>>> {
        (0..self.row_count())
            .map(|row| {
                self.columns
                    .iter()
                    .filter_map(|column| column.get(row))
                    .collect()
            })
            .collect()
    }

    /// Cells in input order.
    pub fn cells(&self) -> Vec<&Cell<T>> {
        let mut cells: Vec<&Cell<T>> = self.columns.iter().flatten().collect();
        cells.sort_by_key(|cell| cell.index);
        cells
    }
}

/// Place item `i` in column `i % 3`, row `i / 3`.
///
/// Order within a column follows input order. Empty input gives three empty
/// columns.
pub fn layout<T, I>(items: I) -> GridLayout<T>
where
    I: IntoIterator<Item = T>,
{
    let mut columns: Vec<Vec<Cell<T>>> = (0..COLUMNS).map(|_| Vec::new()).collect();

    for (index, item) in items.into_iter().enumerate() {
        let column = index % COLUMNS;
        columns[column].push(Cell {
            index,
            row: index / COLUMNS,
            column,
            item,
        });
    }

    GridLayout { columns }
}
