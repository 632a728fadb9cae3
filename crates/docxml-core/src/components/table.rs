//! Tables (`w:tbl`, `w:tr`, `w:tc`)
//!
//! Cells carry their span intent as counts. WordprocessingML instead
//! expresses a vertical merge as one `w:tc` per covered row, marked
//! `w:vMerge="restart"` on the first and `w:vMerge="continue"` below, so
//! rendering consults the table's [`TableGridModel`] to emit continuation
//! cells and parsing folds them back into a row span.

use std::any::Any;
use std::collections::HashMap;
use std::ptr;

use crate::component::{
    check_children, link_children, render_children, Ancestry, Component, ComponentType,
    LinkContext, ParseContext, RenderContext,
};
use crate::components::{Node, Paragraph};
use crate::error::{DocxError, Result};
use crate::length::Length;
use crate::properties::{
    CellProperties, RowProperties, TableProperties, TableWidth, VerticalMerge,
};
use crate::styles::StyleType;
use crate::table_model::{CellInfo, TableGridModel};
use crate::xml::{XmlElement, XmlNode};

/// A table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Table formatting and grid columns
    pub props: TableProperties,
    /// Rows, top to bottom
    pub rows: Vec<Row>,
}

impl Table {
    /// Table from rows
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            props: TableProperties::default(),
            rows,
        }
    }

    /// Builder: set the formatting
    pub fn with_props(mut self, props: TableProperties) -> Self {
        self.props = props;
        self
    }

    /// Builder: append a row
    pub fn with_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Layout model of the current rows
    pub fn model(&self) -> TableGridModel {
        TableGridModel::from_table(self)
    }

    /// Combined width of `span` grid columns starting at `column`, when the
    /// grid defines all of them
    pub fn column_width(&self, column: usize, span: usize) -> Option<Length> {
        let columns = self.props.columns.get(column..column.checked_add(span)?)?;
        Some(columns.iter().copied().sum())
    }

    fn row_index(&self, row: &Row) -> Option<usize> {
        self.rows.iter().position(|r| ptr::eq(r, row))
    }
}

impl Component for Table {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, cx: &mut RenderContext, ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        let model = cx.enter_table(self);
        let rendered = self.render_rows(cx, ancestry, &model);
        cx.leave_table(self);
        rendered
    }

    fn ensure_relationships(&mut self, cx: &mut LinkContext<'_>) -> Result<()> {
        for row in &mut self.rows {
            row.ensure_relationships(cx)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Table {
    fn render_rows(
        &self,
        cx: &mut RenderContext,
        ancestry: &Ancestry<'_>,
        model: &TableGridModel,
    ) -> Result<Vec<XmlNode>> {
        model.validate()?;
        if let Some(style) = &self.props.style {
            cx.reference_style(style, StyleType::Table);
        }

        let grid_columns: Vec<XmlNode> = if self.props.columns.is_empty() {
            (0..model.width())
                .map(|_| XmlElement::new("w:gridCol").into())
                .collect()
        } else {
            self.props
                .columns
                .iter()
                .map(|w| XmlElement::new("w:gridCol").with_attr("w:w", w.as_twip()).into())
                .collect()
        };

        let mut table = XmlElement::new("w:tbl")
            .with_child(
                self.props
                    .to_node()
                    .unwrap_or_else(|| XmlElement::new("w:tblPr")),
            )
            .with_child(XmlElement::new("w:tblGrid").with_children(grid_columns));

        let me = ancestry.push(self);
        for row in &self.rows {
            table.children.extend(row.to_nodes(cx, &me)?);
        }
        Ok(vec![table.into()])
    }
}

impl ComponentType for Table {
    const NAME: &'static str = "Table";
    const ELEMENT: Option<&'static str> = Some("w:tbl");
    const CHILDREN: &'static [&'static str] = &["Row"];

    fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self> {
        let props = TableProperties::from_node(element.child("w:tblPr"), element.child("w:tblGrid"));

        let mut rows = Vec::new();
        let mut row_elements = Vec::new();
        for child in element.elements() {
            if let Some(Node::Row(row)) = cx.parse_element(child, Self::CHILDREN)? {
                rows.push(row);
                row_elements.push(child);
            }
        }
        fold_vertical_merges(&mut rows, &row_elements);

        Ok(Self { props, rows })
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

/// Turn `w:vMerge` continuation cells into row spans of the cell that
/// restarted the merge, and drop them
fn fold_vertical_merges(rows: &mut [Row], row_elements: &[&XmlElement]) {
    // grid column -> (row, cell) of the restart above it
    let mut open: HashMap<usize, (usize, usize)> = HashMap::new();
    let mut covered = Vec::new();

    for (y, tr) in row_elements.iter().enumerate() {
        let mut column = rows[y].props.grid_before;
        for (x, tc) in tr.children_named("w:tc").enumerate() {
            let Some(span) = rows[y].cells.get(x).map(Cell::col_span) else {
                break;
            };
            match tc.child("w:tcPr").and_then(CellProperties::merge_of) {
                Some(VerticalMerge::Restart) => {
                    open.insert(column, (y, x));
                }
                Some(VerticalMerge::Continue) => match open.get(&column) {
                    Some(&(oy, ox)) => {
                        rows[oy].cells[ox].props.row_span += 1;
                        covered.push((y, x));
                    }
                    None => log::debug!("vMerge continue without restart at row {y}, column {column}"),
                },
                None => {
                    open.remove(&column);
                }
            }
            column += span;
        }
    }

    for &(y, x) in covered.iter().rev() {
        rows[y].cells.remove(x);
    }
}

/// A table row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Row formatting
    pub props: RowProperties,
    /// Cells that start in this row
    pub cells: Vec<Cell>,
}

impl Row {
    /// Row from cells
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            props: RowProperties::default(),
            cells,
        }
    }

    /// Builder: set the formatting
    pub fn with_props(mut self, props: RowProperties) -> Self {
        self.props = props;
        self
    }

    fn cell_index(&self, cell: &Cell) -> Option<usize> {
        self.cells.iter().position(|c| ptr::eq(c, cell))
    }
}

impl Component for Row {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, cx: &mut RenderContext, ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        let missing = || DocxError::MissingAncestor {
            component: Self::NAME,
            ancestor: Table::NAME,
        };
        let table = ancestry.find::<Table>().ok_or_else(missing)?;
        let y = table.row_index(self).ok_or_else(missing)?;
        let model = cx.table_model(table);

        let mut tr = XmlElement::new("w:tr").with_opt_child(self.props.to_node());
        let me = ancestry.push(self);
        let mut x = 0;
        while x < model.width() {
            let Some(info) = model.cell_at(x, y).copied() else {
                x += 1;
                continue;
            };
            if info.column != x {
                x += 1;
                continue;
            }
            if info.row == y {
                let cell = &self.cells[info.cell_index];
                tr.children.extend(cell.to_nodes(cx, &me)?);
            } else {
                let origin = &table.rows[info.row].cells[info.cell_index];
                tr.push(origin.continuation(table, &info));
            }
            x = x.saturating_add(info.col_span);
        }
        Ok(vec![tr.into()])
    }

    fn ensure_relationships(&mut self, cx: &mut LinkContext<'_>) -> Result<()> {
        for cell in &mut self.cells {
            cell.ensure_relationships(cx)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for Row {
    const NAME: &'static str = "Row";
    const ELEMENT: Option<&'static str> = Some("w:tr");
    const CHILDREN: &'static [&'static str] = &["Cell"];

    fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self> {
        let mut cells = Vec::new();
        for child in element.children_named("w:tc") {
            if let Some(Node::Cell(cell)) = cx.parse_element(child, Self::CHILDREN)? {
                cells.push(cell);
            }
        }
        Ok(Self {
            props: element
                .child("w:trPr")
                .map(RowProperties::from_node)
                .unwrap_or_default(),
            cells,
        })
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

/// A table cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// Cell formatting and spans
    pub props: CellProperties,
    /// Block content; an empty paragraph is added on render when the
    /// content does not end with one
    pub children: Vec<Node>,
}

impl Cell {
    /// An empty cell
    pub fn new() -> Self {
        Self::default()
    }

    /// A cell holding one paragraph of plain text
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new().with_child(Paragraph::with_text(text))
    }

    /// Builder: append a child
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder: span `columns` grid columns
    pub fn with_col_span(mut self, columns: usize) -> Self {
        self.props.col_span = columns;
        self
    }

    /// Builder: span `rows` rows
    pub fn with_row_span(mut self, rows: usize) -> Self {
        self.props.row_span = rows;
        self
    }

    /// Grid columns covered, at least one
    pub fn col_span(&self) -> usize {
        self.props.col_span.max(1)
    }

    /// Rows covered, at least one
    pub fn row_span(&self) -> usize {
        self.props.row_span.max(1)
    }

    fn width(&self, table: &Table, info: &CellInfo) -> Option<TableWidth> {
        table
            .column_width(info.column, info.col_span)
            .map(TableWidth::length)
    }

    /// The placeholder `w:tc` that continues this cell's vertical merge
    fn continuation(&self, table: &Table, info: &CellInfo) -> XmlElement {
        let props = self.props.to_node(
            self.width(table, info),
            info.col_span,
            Some(VerticalMerge::Continue),
        );
        XmlElement::new("w:tc")
            .with_opt_child(props)
            .with_child(XmlElement::new("w:p"))
    }
}

impl Component for Cell {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn to_nodes(&self, cx: &mut RenderContext, ancestry: &Ancestry<'_>) -> Result<Vec<XmlNode>> {
        check_children(Self::NAME, Self::CHILDREN, Self::MIXED, &self.children)?;
        let table = ancestry.find::<Table>().ok_or(DocxError::MissingAncestor {
            component: Self::NAME,
            ancestor: Table::NAME,
        })?;
        let row = ancestry.find::<Row>().ok_or(DocxError::MissingAncestor {
            component: Self::NAME,
            ancestor: Row::NAME,
        })?;
        let located = table
            .row_index(row)
            .zip(row.cell_index(self))
            .ok_or(DocxError::MissingAncestor {
                component: Self::NAME,
                ancestor: Row::NAME,
            })?;

        let model = cx.table_model(table);
        let info = model
            .cell_info(located.0, located.1)
            .copied()
            .ok_or_else(|| DocxError::InvalidStructure("cell missing from its table layout".into()))?;

        let merge = (info.row_span > 1).then_some(VerticalMerge::Restart);
        let props = self
            .props
            .to_node(self.width(table, &info), info.col_span, merge);

        let me = ancestry.push(self);
        let mut tc = XmlElement::new("w:tc")
            .with_opt_child(props)
            .with_children(render_children(&self.children, cx, &me)?);
        if !matches!(self.children.last(), Some(Node::Paragraph(_))) {
            tc.push(XmlElement::new("w:p"));
        }
        Ok(vec![tc.into()])
    }

    fn ensure_relationships(&mut self, cx: &mut LinkContext<'_>) -> Result<()> {
        link_children(&mut self.children, cx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComponentType for Cell {
    const NAME: &'static str = "Cell";
    const ELEMENT: Option<&'static str> = Some("w:tc");
    const CHILDREN: &'static [&'static str] = &["Paragraph", "Table"];

    fn from_node(element: &XmlElement, cx: &mut ParseContext<'_>) -> Result<Self> {
        Ok(Self {
            props: element
                .child("w:tcPr")
                .map(CellProperties::from_node)
                .unwrap_or_default(),
            children: cx.parse_children(element, Self::CHILDREN)?,
        })
    }

    fn into_node(self) -> Node {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{parse_fragment, render_one};

    fn cell_rows(table: &XmlElement) -> Vec<Vec<&XmlElement>> {
        table
            .children_named("w:tr")
            .map(|tr| tr.children_named("w:tc").collect())
            .collect()
    }

    fn grid_span(tc: &XmlElement) -> Option<&str> {
        tc.descendant("w:gridSpan").and_then(|g| g.attr("w:val"))
    }

    fn v_merge(tc: &XmlElement) -> Option<&str> {
        tc.child("w:tcPr")
            .and_then(|p| p.child("w:vMerge"))
            .and_then(|m| m.attr("w:val"))
    }

    #[test]
    fn test_column_span() {
        let table = Table::new(vec![
            Row::new(vec![Cell::with_text("wide").with_col_span(2)]),
            Row::new(vec![Cell::with_text("a"), Cell::with_text("b")]),
        ]);
        let el = render_one(&table, &Ancestry::root());
        let rows = cell_rows(&el);

        assert_eq!(el.child("w:tblGrid").unwrap().elements().count(), 2);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(grid_span(rows[0][0]), Some("2"));
        assert_eq!(rows[1].len(), 2);
        assert_eq!(grid_span(rows[1][0]), None);
    }

    #[test]
    fn test_vertical_merge() {
        let table = Table::new(vec![
            Row::new(vec![Cell::with_text("tall").with_row_span(2), Cell::with_text("b")]),
            Row::new(vec![Cell::with_text("d")]),
        ]);
        let el = render_one(&table, &Ancestry::root());
        let rows = cell_rows(&el);

        assert_eq!(rows[0].len(), 2);
        assert_eq!(v_merge(rows[0][0]), Some("restart"));
        assert_eq!(rows[1].len(), 2);
        assert_eq!(v_merge(rows[1][0]), Some("continue"));
        assert_eq!(rows[1][0].descendant("w:t"), None);
        assert_eq!(rows[1][1].descendant("w:t").unwrap().text(), "d");
    }

    #[test]
    fn test_merge_round_trip() {
        let table = Table::new(vec![
            Row::new(vec![
                Cell::with_text("a"),
                Cell::with_text("tall").with_row_span(3),
            ]),
            Row::new(vec![Cell::with_text("c")]),
            Row::new(vec![Cell::with_text("e")]),
        ]);
        let xml = render_one(&table, &Ancestry::root())
            .to_xml_string()
            .unwrap();
        let parsed: Table = parse_fragment(&xml);
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_combined_spans_round_trip() {
        let table = Table::new(vec![
            Row::new(vec![
                Cell::with_text("block").with_col_span(2).with_row_span(2),
                Cell::with_text("c"),
            ]),
            Row::new(vec![Cell::with_text("f")]),
            Row::new(vec![
                Cell::with_text("g"),
                Cell::with_text("h"),
                Cell::with_text("i"),
            ]),
        ]);
        let el = render_one(&table, &Ancestry::root());
        let rows = cell_rows(&el);
        assert_eq!(grid_span(rows[1][0]), Some("2"));
        assert_eq!(v_merge(rows[1][0]), Some("continue"));

        let parsed: Table = parse_fragment(&el.to_xml_string().unwrap());
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_non_rectangular_table_fails() {
        let table = Table::new(vec![
            Row::new(vec![Cell::new(), Cell::new()]),
            Row::new(vec![Cell::new()]),
        ]);
        let mut cx = RenderContext::new();
        let err = table.to_nodes(&mut cx, &Ancestry::root()).unwrap_err();
        assert!(matches!(
            err,
            DocxError::NonRectangularTable {
                row: 1,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_grid_before_row_round_trip() {
        let xml = concat!(
            "<w:tbl><w:tblGrid><w:gridCol/><w:gridCol/></w:tblGrid>",
            "<w:tr><w:tc><w:p/></w:tc><w:tc><w:p/></w:tc></w:tr>",
            r#"<w:tr><w:trPr><w:gridBefore w:val="1"/></w:trPr><w:tc><w:p/></w:tc></w:tr>"#,
            "</w:tbl>",
        );
        let table: Table = parse_fragment(xml);
        assert_eq!(table.rows[1].props.grid_before, 1);
        assert!(table.model().is_rectangular());

        let el = render_one(&table, &Ancestry::root());
        let tr = el.children_named("w:tr").nth(1).unwrap();
        let before = tr.child("w:trPr").and_then(|p| p.child("w:gridBefore")).unwrap();
        assert_eq!(before.attr("w:val"), Some("1"));
        assert_eq!(tr.children_named("w:tc").count(), 1);

        let parsed: Table = parse_fragment(&el.to_xml_string().unwrap());
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_merge_under_grid_before_lines_up() {
        let table = Table::new(vec![
            Row::new(vec![Cell::with_text("a"), Cell::with_text("tall").with_row_span(2)]),
            Row::new(vec![]).with_props(RowProperties {
                grid_before: 1,
                ..Default::default()
            }),
        ]);
        let el = render_one(&table, &Ancestry::root());
        let rows = cell_rows(&el);
        assert_eq!(rows[1].len(), 1);
        assert_eq!(v_merge(rows[1][0]), Some("continue"));

        let parsed: Table = parse_fragment(&el.to_xml_string().unwrap());
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_row_span_past_last_row_fails() {
        let table = Table::new(vec![
            Row::new(vec![Cell::with_text("tall").with_row_span(5), Cell::new()]),
            Row::new(vec![Cell::new()]),
        ]);
        let mut cx = RenderContext::new();
        let err = table.to_nodes(&mut cx, &Ancestry::root()).unwrap_err();
        assert!(matches!(
            err,
            DocxError::RowSpanOverflow {
                row: 0,
                cell: 0,
                row_span: 5,
                available: 2
            }
        ));
    }

    #[test]
    fn test_reused_context_sees_edited_table() {
        let mut table = Table::new(vec![Row::new(vec![Cell::new(), Cell::new()])]);
        let mut cx = RenderContext::new();
        table.to_nodes(&mut cx, &Ancestry::root()).unwrap();

        table.rows[0].cells[0].props.col_span = 2;
        let nodes = table.to_nodes(&mut cx, &Ancestry::root()).unwrap();
        let XmlNode::Element(el) = &nodes[0] else {
            panic!("expected w:tbl");
        };
        assert_eq!(el.child("w:tblGrid").unwrap().elements().count(), 3);
        assert_eq!(grid_span(cell_rows(el)[0][0]), Some("2"));
    }

    #[test]
    fn test_cell_outside_table_fails() {
        let mut cx = RenderContext::new();
        let err = Cell::new().to_nodes(&mut cx, &Ancestry::root()).unwrap_err();
        assert!(matches!(
            err,
            DocxError::MissingAncestor {
                component: "Cell",
                ancestor: "Table"
            }
        ));
    }

    #[test]
    fn test_cell_ends_with_paragraph() {
        let table = Table::new(vec![Row::new(vec![Cell::new()])]);
        let el = render_one(&table, &Ancestry::root());
        let tc = el.descendant("w:tc").unwrap();
        assert_eq!(tc.elements().last().map(|e| e.name.as_str()), Some("w:p"));
    }

    #[test]
    fn test_grid_widths_flow_into_cells() {
        let table = Table::new(vec![Row::new(vec![Cell::new().with_col_span(2)])]).with_props(
            TableProperties {
                columns: vec![Length::twip(1000), Length::twip(2000)],
                ..Default::default()
            },
        );
        let el = render_one(&table, &Ancestry::root());
        let width = el.descendant("w:tcW").unwrap();
        assert_eq!(width.attr("w:w"), Some("3000"));
        assert_eq!(width.attr("w:type"), Some("dxa"));
    }

    #[test]
    fn test_nested_table() {
        let inner = Table::new(vec![Row::new(vec![Cell::with_text("inner")])]);
        let outer = Table::new(vec![Row::new(vec![Cell::new()
            .with_child(inner)
            .with_child(Paragraph::new())])]);
        let xml = render_one(&outer, &Ancestry::root())
            .to_xml_string()
            .unwrap();
        let parsed: Table = parse_fragment(&xml);
        assert_eq!(parsed, outer);
    }
}
