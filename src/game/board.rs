use super::{MoveError, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Occupied(Player),
}

/// Fixed-size grid, stored row-major. Row 0 is the top, row `height - 1` the
/// bottom where pieces land first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    height: usize,
    width: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(height: usize, width: usize) -> Self {
        Board {
            height,
            width,
            cells: vec![Cell::Empty; height * width],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the cell at a specific position
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[self.index(row, col)]
    }

    /// Cells of one row, left to right
    pub fn row_cells(&self, row: usize) -> impl Iterator<Item = Cell> + '_ {
        let start = row * self.width;
        self.cells[start..start + self.width].iter().copied()
    }

    /// Find the row a piece dropped into `col` would land on.
    ///
    /// Walks the column from the bottom row up and returns the first empty
    /// row. `None` means either that the column is full or that `col` is
    /// outside the board; use [`Board::drop_piece`] to tell the two apart.
    pub fn lowest_open_row(&self, col: usize) -> Option<usize> {
        if col >= self.width {
            return None;
        }
        (0..self.height)
            .rev()
            .find(|&row| self.get(row, col) == Cell::Empty)
    }

    /// Write a piece into `(row, col)`.
    ///
    /// The cell must be empty: `row` has to come from `lowest_open_row` on the
    /// same board state.
    pub fn place(&mut self, row: usize, col: usize, player: Player) {
        let idx = self.index(row, col);
        debug_assert_eq!(
            self.cells[idx],
            Cell::Empty,
            "place called on occupied cell ({row}, {col})"
        );
        self.cells[idx] = player.to_cell();
    }

    /// Drop a piece in a column, returns the row where it landed.
    ///
    /// An out-of-range or full column is reported as an error and leaves the
    /// board untouched.
    pub fn drop_piece(&mut self, col: usize, player: Player) -> Result<usize, MoveError> {
        if col >= self.width {
            return Err(MoveError::InvalidColumn {
                column: col as i64,
                width: self.width,
            });
        }

        let row = self
            .lowest_open_row(col)
            .ok_or(MoveError::ColumnFull(col))?;
        self.place(row, col, player);
        Ok(row)
    }

    /// Number of empty cells left on the whole board
    pub fn empty_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Empty).count()
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.empty_cells() == 0
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.height && col < self.width,
            "cell ({row}, {col}) outside {}x{} board",
            self.height,
            self.width
        );
        row * self.width + col
    }
}
