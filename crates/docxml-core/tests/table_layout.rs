//! Table grid layout tests
//!
//! Spanning cells are placed on the grid, rendered with `w:gridSpan` and
//! `w:vMerge`, and folded back into spans when read.

use docxml_core::properties::RowProperties;
use docxml_core::{
    Cell, Compression, Docx, DocxError, Node, PackageConfig, Row, Table, TableGridModel,
};
use proptest::prelude::*;

fn config() -> PackageConfig {
    PackageConfig {
        compression: Compression::Stored,
        id_seed: Some(5),
        ..PackageConfig::default()
    }
}

fn first_table(docx: &Docx) -> Table {
    docx.document()
        .unwrap()
        .blocks()
        .find_map(|block| match block {
            Node::Table(table) => Some(table.clone()),
            _ => None,
        })
        .unwrap()
}

/// ```text
/// +---+---+---+
/// | A     | B |
/// +---+---+   +
/// | C | D |   |
/// +---+---+---+
/// ```
fn spanning_table() -> Table {
    Table::new(vec![
        Row::new(vec![
            Cell::with_text("A").with_col_span(2),
            Cell::with_text("B").with_row_span(2),
        ]),
        Row::new(vec![Cell::with_text("C"), Cell::with_text("D")]),
    ])
}

// =============================================================================
// PART 1: GRID PLACEMENT
// =============================================================================

mod placement {
    use super::*;

    #[test]
    fn test_spans_are_placed_on_the_grid() {
        let model = spanning_table().model();

        assert_eq!(model.width(), 3);
        assert_eq!(model.height(), 2);
        assert!(model.is_rectangular());

        let b = model.cell_info(0, 1).unwrap();
        assert_eq!((b.column, b.row, b.row_span), (2, 0, 2));
        assert!(model.is_merged_away(2, 1));
        assert!(model.is_merged_away(1, 0));
        assert!(!model.is_merged_away(0, 1));

        let d = model.cell_info(1, 1).unwrap();
        assert_eq!(d.column, 1);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let table = Table::new(vec![
            Row::new(vec![Cell::with_text("a"), Cell::with_text("b")]),
            Row::new(vec![Cell::with_text("c")]),
        ]);
        assert!(matches!(
            table.model().check_rectangular(),
            Err(DocxError::NonRectangularTable {
                row: 1,
                expected: 2,
                actual: 1
            })
        ));

        let mut docx = Docx::with_config(config());
        docx.document_mut().unwrap().push(table);
        assert!(docx.to_archive().is_err());
    }
}

// =============================================================================
// PART 2: PACKAGE ROUND TRIP
// =============================================================================

mod round_trip {
    use super::*;

    #[test]
    fn test_row_span_renders_as_vertical_merge() {
        let mut docx = Docx::with_config(config());
        docx.document_mut().unwrap().push(spanning_table());
        let archive = docx.to_archive().unwrap();
        let xml = archive.get_string("word/document.xml").unwrap().unwrap();

        assert!(xml.contains(r#"<w:gridSpan w:val="2"/>"#));
        assert!(xml.contains(r#"<w:vMerge w:val="restart"/>"#));
        assert!(xml.contains(r#"<w:vMerge w:val="continue"/>"#));
        assert_eq!(xml.matches("<w:gridCol").count(), 3);
    }

    #[test]
    fn test_spans_survive_a_round_trip() {
        let mut docx = Docx::with_config(config());
        docx.document_mut().unwrap().push(spanning_table());
        let bytes = docx.to_bytes().unwrap();

        let parsed = Docx::from_bytes_with(&bytes, config()).unwrap();
        let table = first_table(&parsed);
        assert_eq!(table.rows[0].cells.len(), 2);
        assert_eq!(table.rows[1].cells.len(), 2);
        assert_eq!(table.rows[0].cells[0].col_span(), 2);
        assert_eq!(table.rows[0].cells[1].row_span(), 2);
        assert_eq!(table.rows[1].cells[1].children[0].text(), "D");
    }
}

// =============================================================================
// PART 3: SKIPPED COLUMNS AND SPAN LIMITS
// =============================================================================

mod skipped_columns {
    use super::*;

    /// ```text
    /// +---+---+
    /// | A | B |
    /// +---+---+
    ///     | C |
    ///     +---+
    /// ```
    fn indented_table() -> Table {
        Table::new(vec![
            Row::new(vec![Cell::with_text("A"), Cell::with_text("B")]),
            Row::new(vec![Cell::with_text("C")]).with_props(RowProperties {
                grid_before: 1,
                ..RowProperties::default()
            }),
        ])
    }

    #[test]
    fn test_grid_before_survives_a_package_round_trip() {
        let mut docx = Docx::with_config(config());
        docx.document_mut().unwrap().push(indented_table());
        let bytes = docx.to_bytes().unwrap();

        let mut parsed = Docx::from_bytes_with(&bytes, config()).unwrap();
        let table = first_table(&parsed);
        assert_eq!(table.rows[1].props.grid_before, 1);
        assert_eq!(table.model().cell_info(1, 0).unwrap().column, 1);

        let again = parsed.to_archive().unwrap();
        let xml = again.get_string("word/document.xml").unwrap().unwrap();
        assert!(xml.contains(r#"<w:gridBefore w:val="1"/>"#));
    }

    #[test]
    fn test_overlong_row_span_is_rejected() {
        let table = Table::new(vec![
            Row::new(vec![Cell::with_text("A").with_row_span(5), Cell::with_text("B")]),
            Row::new(vec![Cell::with_text("C")]),
        ]);
        let mut docx = Docx::with_config(config());
        docx.document_mut().unwrap().push(table);
        assert!(matches!(
            docx.to_archive(),
            Err(DocxError::RowSpanOverflow { row_span: 5, available: 2, .. })
        ));
    }
}

// =============================================================================
// PART 4: PROPERTIES
// =============================================================================

/// Rows of single cells spanning `widths` columns each
fn row_of(widths: &[usize]) -> Vec<(usize, usize)> {
    widths.iter().map(|&w| (w, 1)).collect()
}

proptest! {
    #[test]
    fn prop_rows_with_equal_totals_are_rectangular(
        widths in prop::collection::vec(1usize..4, 1..5),
        height in 1usize..5,
    ) {
        let rows: Vec<_> = (0..height).map(|_| row_of(&widths)).collect();
        let model = TableGridModel::from_spans(&rows);

        let total: usize = widths.iter().sum();
        prop_assert!(model.is_rectangular());
        prop_assert_eq!(model.width(), total);
        for row in 0..height {
            prop_assert_eq!(model.row_columns(row), total);
        }
    }

    #[test]
    fn prop_every_position_has_one_owner(
        widths in prop::collection::vec(1usize..4, 1..5),
        height in 1usize..5,
    ) {
        let rows: Vec<_> = (0..height).map(|_| row_of(&widths)).collect();
        let model = TableGridModel::from_spans(&rows);

        for row in 0..height {
            for column in 0..model.width() {
                let owner = model.cell_at(column, row).unwrap();
                prop_assert!(owner.covers(column, row));
            }
        }
    }

    #[test]
    fn prop_short_row_is_reported(
        widths in prop::collection::vec(1usize..4, 2..5),
    ) {
        let rows = vec![row_of(&widths), row_of(&widths[1..])];
        let model = TableGridModel::from_spans(&rows);
        prop_assert!(!model.is_rectangular());
    }
}
