use stackfall::{CellType, Grid, RenderState};

#[derive(Clone, PartialEq)]
pub enum TermCell {
    FieldCell(CellType),
    BorderVertical,
    BorderHorizontal,
    BorderTopLeft,
    BorderTopRight,
    BorderBottomLeft,
    BorderBottomRight,
    Space,
    Message(String),
}

pub trait TermStyle {
    fn display<'a>(&self, cell: &'a TermCell) -> &'a str;
    fn width(&self, cell: &TermCell) -> usize;
}

pub trait TermRender {
    fn output(&self, style: &impl TermStyle) -> Vec<Vec<TermCell>>;
    fn render(&self, style: &impl TermStyle) -> Vec<String> {
        self.output(style)
            .iter()
            .map(|row| row.iter().map(|cell| style.display(cell)).collect())
            .collect()
    }
}

// Make all lines in block the same width by padding with TermCell::Space
pub fn pad_block_right(block: &mut [Vec<TermCell>], style: &impl TermStyle) {
    assert_eq!(style.width(&TermCell::Space), 1);
    let line_width = |row: &Vec<TermCell>| row.iter().map(|cell| style.width(cell)).sum::<usize>();
    let width = block.iter().map(line_width).max().unwrap_or(0);
    for row in block.iter_mut() {
        let padding = width - line_width(&*row);
        row.extend(std::iter::repeat_n(TermCell::Space, padding));
    }
}

fn border_width(style: &impl TermStyle) -> usize {
    style.width(&TermCell::BorderVertical)
}

pub struct PlainTermStyle;

impl TermStyle for PlainTermStyle {
    fn display<'a>(&self, cell: &'a TermCell) -> &'a str {
        match cell {
            TermCell::FieldCell(CellType::Empty) => " .",
            TermCell::FieldCell(_) => "[]",
            TermCell::BorderVertical => "|",
            TermCell::BorderTopLeft
            | TermCell::BorderTopRight
            | TermCell::BorderBottomLeft
            | TermCell::BorderBottomRight => "+",
            TermCell::BorderHorizontal => "--",
            TermCell::Space => " ",
            TermCell::Message(s) => s.as_str(),
        }
    }
    fn width(&self, cell: &TermCell) -> usize {
        match cell {
            TermCell::FieldCell(_) | TermCell::BorderHorizontal => 2,
            TermCell::Message(s) => s.chars().count(),
            _ => 1,
        }
    }
}

/// 24-bit colors: pastel piece palette on a grey cell grid
pub struct AnsiTermStyle;

impl TermStyle for AnsiTermStyle {
    fn display<'a>(&self, cell: &'a TermCell) -> &'a str {
        match cell {
            TermCell::FieldCell(CellType::Empty) => "\x1b[38;2;155;155;155m .\x1b[0m",
            TermCell::FieldCell(CellType::O) => "\x1b[38;2;255;100;100m██\x1b[0m",
            TermCell::FieldCell(CellType::T) => "\x1b[38;2;100;225;225m██\x1b[0m",
            TermCell::FieldCell(CellType::Z) => "\x1b[38;2;255;100;255m██\x1b[0m",
            TermCell::FieldCell(CellType::S) => "\x1b[38;2;255;255;150m██\x1b[0m",
            TermCell::FieldCell(CellType::I) => "\x1b[38;2;100;255;100m██\x1b[0m",
            TermCell::FieldCell(CellType::L) => "\x1b[38;2;100;100;255m██\x1b[0m",
            TermCell::FieldCell(CellType::J) => "\x1b[38;2;255;180;100m██\x1b[0m",
            TermCell::BorderVertical => "\x1b[0m│",
            TermCell::BorderTopLeft => "\x1b[0m┌",
            TermCell::BorderTopRight => "\x1b[0m┐",
            TermCell::BorderBottomLeft => "\x1b[0m└",
            TermCell::BorderHorizontal => "\x1b[0m──",
            TermCell::BorderBottomRight => "\x1b[0m┘",
            TermCell::Space => " ",
            TermCell::Message(s) => s.as_str(),
        }
    }
    fn width(&self, cell: &TermCell) -> usize {
        match cell {
            TermCell::FieldCell(_) | TermCell::BorderHorizontal => 2,
            TermCell::Message(s) => s.chars().count(),
            _ => 1,
        }
    }
}

impl TermRender for Grid {
    fn output(&self, _style: &impl TermStyle) -> Vec<Vec<TermCell>> {
        self.rows()
            .map(|row| row.iter().map(|&cell| TermCell::FieldCell(cell)).collect())
            .collect()
    }
}

/// Bordered grid with the falling piece drawn in, a title above and
/// free-form lines below
pub struct Playfield {
    grid: Grid,
    title: String,
    footer: Vec<String>,
}

impl Playfield {
    pub fn new(state: &RenderState, title: impl Into<String>) -> Self {
        Self {
            grid: state.composed(),
            title: title.into(),
            footer: Vec::new(),
        }
    }

    pub fn with_footer(mut self, footer: Vec<String>) -> Self {
        self.footer = footer;
        self
    }
}

impl TermRender for Playfield {
    fn output(&self, style: &impl TermStyle) -> Vec<Vec<TermCell>> {
        let mut lines = Vec::new();

        // Title centered over the well
        let well_width = self.grid.width() * style.width(&TermCell::BorderHorizontal) + 2 * border_width(style);
        let title_width = style.width(&TermCell::Message(self.title.clone()));
        let indent = well_width.saturating_sub(title_width) / 2;
        let mut title = vec![TermCell::Space; indent];
        title.push(TermCell::Message(self.title.clone()));
        lines.push(title);

        let mut top = vec![TermCell::BorderTopLeft];
        top.extend(std::iter::repeat_n(TermCell::BorderHorizontal, self.grid.width()));
        top.push(TermCell::BorderTopRight);
        lines.push(top);

        for mut row in self.grid.output(style) {
            row.insert(0, TermCell::BorderVertical);
            row.push(TermCell::BorderVertical);
            lines.push(row);
        }

        let mut bottom = vec![TermCell::BorderBottomLeft];
        bottom.extend(std::iter::repeat_n(TermCell::BorderHorizontal, self.grid.width()));
        bottom.push(TermCell::BorderBottomRight);
        lines.push(bottom);

        for message in &self.footer {
            lines.push(vec![TermCell::Message(message.clone())]);
        }

        pad_block_right(&mut lines, style);
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackfall::{Piece, PieceKind, PieceView, Position};

    fn state_with_piece() -> RenderState {
        let mut grid = Grid::new(4, 3);
        grid.place(0, 2, CellType::L);
        let piece = Piece::new(PieceKind::O, Position::new(2, 0.4));
        RenderState {
            grid,
            piece: Some(PieceView::from(&piece)),
        }
    }

    #[test]
    fn test_grid_plain_render() {
        let lines = state_with_piece().composed().render(&PlainTermStyle);
        assert_eq!(lines, vec![" . .[][]", " . .[][]", "[] . . ."]);
    }

    #[test]
    fn test_playfield_plain_render() {
        let field = Playfield::new(&state_with_piece(), "Tetris").with_footer(vec!["q: quit".to_string()]);
        let lines = field.render(&PlainTermStyle);
        assert_eq!(
            lines,
            vec![
                "  Tetris  ",
                "+--------+",
                "| . .[][]|",
                "| . .[][]|",
                "|[] . . .|",
                "+--------+",
                "q: quit   ",
            ]
        );
    }

    #[test]
    fn test_ansi_lines_have_equal_width() {
        let field = Playfield::new(&state_with_piece(), "Tetris");
        let style = AnsiTermStyle;
        for line in field.output(&style) {
            let width: usize = line.iter().map(|cell| style.width(cell)).sum();
            assert_eq!(width, 10);
        }
    }
}
