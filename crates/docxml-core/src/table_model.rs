//! Table layout model
//!
//! Rows and cells only record local span intent. The model places every
//! cell on a coordinate grid: rows top to bottom, cells left to right,
//! each cell taking the first column its row has free. A cell spanning
//! several rows therefore pushes the cells of later rows to the right
//! without those rows declaring a placeholder.

use std::collections::HashMap;

use crate::components::Table;
use crate::error::{DocxError, Result};

/// Widest span Word accepts for one cell or skipped run of columns
pub const MAX_GRID_SPAN: usize = 63;

/// Placement of one literal cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellInfo {
    /// Index of the owning row in the table
    pub row_index: usize,
    /// Index of the cell within its row
    pub cell_index: usize,
    /// Grid column of the cell origin
    pub column: usize,
    /// Grid row of the cell origin
    pub row: usize,
    /// Columns covered
    pub col_span: usize,
    /// Rows covered, never past the last row
    pub row_span: usize,
}

impl CellInfo {
    /// Whether the cell footprint covers the grid position
    pub fn covers(&self, column: usize, row: usize) -> bool {
        (self.column..self.column.saturating_add(self.col_span)).contains(&column)
            && (self.row..self.row.saturating_add(self.row_span)).contains(&row)
    }
}

/// Span intent of one row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowLayout {
    /// Empty grid columns before the first cell (`w:gridBefore`)
    pub grid_before: usize,
    /// `(col_span, row_span)` of each cell
    pub cells: Vec<(usize, usize)>,
    /// Empty grid columns after the last cell (`w:gridAfter`)
    pub grid_after: usize,
}

/// Occupied columns `start..end` of one grid row; `None` for skipped columns
#[derive(Debug, Clone, Copy)]
struct Run {
    start: usize,
    end: usize,
    cell: Option<usize>,
}

/// Grid placement of every cell of a table
#[derive(Debug, Clone, Default)]
pub struct TableGridModel {
    cells: Vec<CellInfo>,
    // runs per grid row, sorted by start and never overlapping
    runs: Vec<Vec<Run>>,
    by_literal: HashMap<(usize, usize), usize>,
    // (cell, declared row span) of cells that reach below the last row
    overhanging: Vec<(usize, usize)>,
    width: usize,
}

impl TableGridModel {
    /// Model of a table component
    pub fn from_table(table: &Table) -> Self {
        let rows: Vec<RowLayout> = table
            .rows
            .iter()
            .map(|row| RowLayout {
                grid_before: row.props.grid_before,
                cells: row
                    .cells
                    .iter()
                    .map(|cell| (cell.col_span(), cell.row_span()))
                    .collect(),
                grid_after: row.props.grid_after,
            })
            .collect();
        Self::from_rows(&rows)
    }

    /// Model from `(col_span, row_span)` pairs per row
    pub fn from_spans(rows: &[Vec<(usize, usize)>]) -> Self {
        let rows: Vec<RowLayout> = rows
            .iter()
            .map(|cells| RowLayout {
                cells: cells.clone(),
                ..RowLayout::default()
            })
            .collect();
        Self::from_rows(&rows)
    }

    /// Model from full row layouts
    pub fn from_rows(rows: &[RowLayout]) -> Self {
        let mut model = TableGridModel {
            runs: vec![Vec::new(); rows.len()],
            ..Self::default()
        };

        for (y, layout) in rows.iter().enumerate() {
            if layout.grid_before > 0 {
                model.occupy(y, 0, layout.grid_before, None);
            }

            for (x, &(col_span, declared)) in layout.cells.iter().enumerate() {
                let col_span = col_span.max(1);
                let declared = declared.max(1);
                let row_span = declared.min(rows.len() - y);

                let column = model.first_free(y);
                let index = model.cells.len();
                model.cells.push(CellInfo {
                    row_index: y,
                    cell_index: x,
                    column,
                    row: y,
                    col_span,
                    row_span,
                });
                model.by_literal.insert((y, x), index);
                if declared > row_span {
                    model.overhanging.push((index, declared));
                }
                for dy in 0..row_span {
                    model.occupy(y + dy, column, col_span, Some(index));
                }
            }

            if layout.grid_after > 0 {
                let column = model.runs[y].last().map_or(0, |run| run.end);
                model.occupy(y, column, layout.grid_after, None);
            }
        }

        model
    }

    fn first_free(&self, row: usize) -> usize {
        let mut column = 0;
        for run in &self.runs[row] {
            if run.start > column {
                break;
            }
            column = column.max(run.end);
        }
        column
    }

    fn occupy(&mut self, row: usize, start: usize, span: usize, cell: Option<usize>) {
        let end = start.saturating_add(span);
        let runs = &mut self.runs[row];
        let at = runs.partition_point(|run| run.start < start);
        runs.insert(at, Run { start, end, cell });
        self.width = self.width.max(end);
    }

    /// Every placed cell, in document order
    pub fn cells(&self) -> &[CellInfo] {
        &self.cells
    }

    /// Placement of the literal cell `cell_index` of row `row_index`
    pub fn cell_info(&self, row_index: usize, cell_index: usize) -> Option<&CellInfo> {
        self.by_literal
            .get(&(row_index, cell_index))
            .map(|&index| &self.cells[index])
    }

    /// Cell whose footprint covers the grid position
    pub fn cell_at(&self, column: usize, row: usize) -> Option<&CellInfo> {
        let runs = self.runs.get(row)?;
        let at = runs.partition_point(|run| run.start <= column);
        let run = runs[..at].last()?;
        if column >= run.end {
            return None;
        }
        run.cell.map(|index| &self.cells[index])
    }

    /// Whether a grid position is covered by a cell that starts elsewhere
    pub fn is_merged_away(&self, column: usize, row: usize) -> bool {
        self.cell_at(column, row)
            .map(|info| info.column != column || info.row != row)
            .unwrap_or(false)
    }

    /// Number of grid columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of literal rows
    pub fn height(&self) -> usize {
        self.runs.len()
    }

    /// Columns covered in a row, counting each covering cell once and
    /// `w:gridBefore`/`w:gridAfter` columns as taken
    pub fn row_columns(&self, row: usize) -> usize {
        self.runs
            .get(row)
            .map_or(0, |runs| runs.iter().map(|run| run.end - run.start).sum())
    }

    /// Fail with the first row whose column count differs from the first row
    pub fn check_rectangular(&self) -> Result<()> {
        if self.runs.is_empty() {
            return Ok(());
        }
        let expected = self.row_columns(0);
        for row in 1..self.runs.len() {
            let actual = self.row_columns(row);
            if actual != expected {
                return Err(DocxError::NonRectangularTable {
                    row,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Whether every row covers the same number of columns
    pub fn is_rectangular(&self) -> bool {
        self.check_rectangular().is_ok()
    }

    /// Fail with the first cell whose row span reaches below the last row
    pub fn check_row_spans(&self) -> Result<()> {
        match self.overhanging.first() {
            Some(&(index, row_span)) => {
                let info = &self.cells[index];
                Err(DocxError::RowSpanOverflow {
                    row: info.row_index,
                    cell: info.cell_index,
                    row_span,
                    available: info.row_span,
                })
            }
            None => Ok(()),
        }
    }

    /// Both layout checks that rendering requires
    pub fn validate(&self) -> Result<()> {
        self.check_row_spans()?;
        self.check_rectangular()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_column_span_placement() {
        let model = TableGridModel::from_spans(&[
            vec![(1, 1), (1, 1), (1, 1)],
            vec![(2, 1), (1, 1)],
        ]);

        let first = model.cell_info(1, 0).unwrap();
        assert_eq!((first.column, first.col_span), (0, 2));
        let second = model.cell_info(1, 1).unwrap();
        assert_eq!((second.column, second.col_span), (2, 1));
        assert_eq!(model.width(), 3);
        assert!(model.is_rectangular());
        assert!(!model.is_merged_away(0, 1));
        assert!(model.is_merged_away(1, 1));
    }

    #[test]
    fn test_row_span_pushes_later_cells() {
        let model = TableGridModel::from_spans(&[vec![(1, 2), (1, 1)], vec![(1, 1)]]);

        let pushed = model.cell_info(1, 0).unwrap();
        assert_eq!(pushed.column, 1);
        assert!(model.is_merged_away(0, 1));
        assert_eq!(model.cell_at(0, 1).unwrap().row, 0);
        assert!(model.is_rectangular());
    }

    #[test]
    fn test_non_rectangular_names_row() {
        let model = TableGridModel::from_spans(&[vec![(1, 1), (1, 1)], vec![(1, 1)]]);
        match model.check_rectangular() {
            Err(DocxError::NonRectangularTable {
                row,
                expected,
                actual,
            }) => {
                assert_eq!((row, expected, actual), (1, 2, 1));
            }
            other => panic!("expected NonRectangularTable, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_span_counts_as_one() {
        let model = TableGridModel::from_spans(&[vec![(0, 0)]]);
        assert_eq!(model.cell_info(0, 0).unwrap().col_span, 1);
        assert_eq!(model.width(), 1);
    }

    #[test]
    fn test_grid_before_columns_are_taken() {
        let model = TableGridModel::from_rows(&[
            RowLayout {
                cells: vec![(1, 1), (1, 1)],
                ..RowLayout::default()
            },
            RowLayout {
                grid_before: 1,
                cells: vec![(1, 1)],
                ..RowLayout::default()
            },
        ]);

        assert_eq!(model.cell_info(1, 0).unwrap().column, 1);
        assert!(model.cell_at(0, 1).is_none());
        assert_eq!(model.row_columns(1), 2);
        assert!(model.is_rectangular());
    }

    #[test]
    fn test_grid_after_follows_last_cell() {
        let model = TableGridModel::from_rows(&[
            RowLayout {
                cells: vec![(3, 1)],
                ..RowLayout::default()
            },
            RowLayout {
                grid_before: 1,
                cells: vec![(1, 1)],
                grid_after: 1,
            },
        ]);

        assert!(model.cell_at(2, 1).is_none());
        assert_eq!(model.width(), 3);
        assert!(model.is_rectangular());
    }

    #[test]
    fn test_row_span_stops_at_last_row() {
        let model = TableGridModel::from_spans(&[vec![(1, 5), (1, 1)], vec![(1, 1)]]);

        assert_eq!(model.cell_info(0, 0).unwrap().row_span, 2);
        assert!(model.is_rectangular());
        match model.validate() {
            Err(DocxError::RowSpanOverflow {
                row,
                cell,
                row_span,
                available,
            }) => assert_eq!((row, cell, row_span, available), (0, 0, 5, 2)),
            other => panic!("expected RowSpanOverflow, got {other:?}"),
        }
    }

    #[test]
    fn test_huge_spans_do_not_fill_the_grid() {
        let model = TableGridModel::from_spans(&[
            vec![(30_000_000, 1), (usize::MAX, 1)],
            vec![(1, usize::MAX)],
        ]);

        assert_eq!(model.width(), usize::MAX);
        assert_eq!(model.cell_at(29_999_999, 0).unwrap().cell_index, 0);
        assert_eq!(model.cell_info(0, 1).unwrap().column, 30_000_000);
        assert!(model.cell_info(0, 1).unwrap().covers(usize::MAX - 1, 0));
        assert_eq!(model.cell_info(1, 0).unwrap().row_span, 1);
        assert!(model.check_row_spans().is_err());
    }

    #[test]
    fn test_empty_table_is_rectangular() {
        assert!(TableGridModel::from_spans(&[]).is_rectangular());
    }

    proptest! {
        #[test]
        fn prop_equal_row_sums_are_rectangular(
            rows in proptest::collection::vec(
                proptest::collection::vec(1usize..4, 1..5),
                1..6,
            ),
        ) {
            // Pad every row with single cells up to a common width
            let width = rows.iter().map(|r| r.iter().sum::<usize>()).max().unwrap_or(0);
            let spans: Vec<Vec<(usize, usize)>> = rows
                .iter()
                .map(|row| {
                    let mut cells: Vec<(usize, usize)> = row.iter().map(|&c| (c, 1)).collect();
                    let used: usize = row.iter().sum();
                    cells.extend(std::iter::repeat((1, 1)).take(width - used));
                    cells
                })
                .collect();

            prop_assert!(TableGridModel::from_spans(&spans).is_rectangular());
        }

        #[test]
        fn prop_one_short_row_is_detected(
            width in 2usize..6,
            rows in 2usize..5,
            short in 0usize..5,
        ) {
            let short = short % rows;
            let spans: Vec<Vec<(usize, usize)>> = (0..rows)
                .map(|y| {
                    let count = if y == short { width - 1 } else { width };
                    vec![(1, 1); count]
                })
                .collect();

            let model = TableGridModel::from_spans(&spans);
            prop_assert!(!model.is_rectangular());
        }
    }
}
