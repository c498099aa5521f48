//! Grid partitioning of a sprite sheet into equally sized frames.
//!
//! A [`GridLayout`] is produced either by [`detect_layout`], which infers a
//! column/row split from the sheet dimensions and a frame count, or by
//! [`apply_manual_grid`], which validates explicit user-supplied geometry.
//! Layouts are plain values; replacing one is a single assignment, so a
//! lookup can never see a half-updated layout.

use crate::{SheetError, SheetResult};

/// Aspect ratios strictly inside this range earn [`ASPECT_BONUS`].
const ASPECT_BONUS_RANGE: (f64, f64) = (0.1, 3.0);
const ASPECT_BONUS: f64 = 10.0;
const COLUMN_WEIGHT: f64 = 2.0;
/// Penalty per doubling of distance from a square frame.
const SQUARENESS_WEIGHT: f64 = 6.0;

/// Pixel rectangle inside a sprite sheet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Returns `true` when the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        (self.x as u64) < other.right()
            && (other.x as u64) < self.right()
            && (self.y as u64) < other.bottom()
            && (other.y as u64) < self.bottom()
    }

    /// Returns `true` when the rectangle lies inside a `width` x `height` area.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }
}

/// How a sprite sheet is partitioned into frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub spacing_x: u32,
    pub spacing_y: u32,
    pub total_frames: u32,
}

/// The part of a layout shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutSummary {
    pub columns: u32,
    pub rows: u32,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl GridLayout {
    /// Source rectangle of a frame.
    ///
    /// Frames are numbered row-major: `row = index / columns`,
    /// `col = index % columns`.
    ///
    /// ```rust
    /// use sprite_core_view::{apply_manual_grid, ManualGrid, Rect};
    ///
    /// let layout = apply_manual_grid(&ManualGrid::new(6, 3, 100, 100)).unwrap();
    /// assert_eq!(layout.rows, 2);
    /// assert_eq!(layout.frame_rect(5), Rect::new(200, 100, 100, 100));
    /// ```
    pub fn frame_rect(&self, frame_index: usize) -> Rect {
        let columns = self.columns.max(1) as usize;
        let row = (frame_index / columns) as u32;
        let col = (frame_index % columns) as u32;
        let step_x = self.frame_width.saturating_add(self.spacing_x);
        let step_y = self.frame_height.saturating_add(self.spacing_y);
        Rect {
            x: self.offset_x.saturating_add(col.saturating_mul(step_x)),
            y: self.offset_y.saturating_add(row.saturating_mul(step_y)),
            width: self.frame_width,
            height: self.frame_height,
        }
    }

    /// Check that every frame rectangle lies inside the sheet.
    ///
    /// This checks the extent of the frame rectangles themselves: only the
    /// columns actually occupied are considered, and spacing is counted
    /// between frames, not after the last one.
    pub fn check_bounds(&self, sheet_width: u32, sheet_height: u32) -> SheetResult<()> {
        let used_columns = self.columns.min(self.total_frames).max(1) as u64;
        let rows = self.rows.max(1) as u64;

        let right = self.offset_x as u64
            + used_columns * self.frame_width as u64
            + (used_columns - 1) * self.spacing_x as u64;
        let bottom = self.offset_y as u64
            + rows * self.frame_height as u64
            + (rows - 1) * self.spacing_y as u64;

        if right > sheet_width as u64 || bottom > sheet_height as u64 {
            return Err(SheetError::out_of_bounds(format!(
                "grid needs {}x{} pixels but the sheet is {}x{}",
                right, bottom, sheet_width, sheet_height
            )));
        }
        Ok(())
    }

    pub fn summary(&self) -> LayoutSummary {
        LayoutSummary {
            columns: self.columns,
            rows: self.rows,
            frame_width: self.frame_width,
            frame_height: self.frame_height,
        }
    }
}

/// User-supplied grid geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManualGrid {
    pub total_frames: u32,
    pub columns: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset_x: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset_y: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spacing_x: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spacing_y: u32,
}

impl ManualGrid {
    /// Grid without offset or spacing.
    pub fn new(total_frames: u32, columns: u32, frame_width: u32, frame_height: u32) -> Self {
        Self {
            total_frames,
            columns,
            frame_width,
            frame_height,
            offset_x: 0,
            offset_y: 0,
            spacing_x: 0,
            spacing_y: 0,
        }
    }

    pub fn with_offset(mut self, x: u32, y: u32) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    pub fn with_spacing(mut self, x: u32, y: u32) -> Self {
        self.spacing_x = x;
        self.spacing_y = y;
        self
    }
}

/// Build a layout from explicit grid geometry.
///
/// `rows` is `ceil(total_frames / columns)`, so the last row may be partial.
/// Sheet bounds are not checked here; see [`GridLayout::check_bounds`].
pub fn apply_manual_grid(grid: &ManualGrid) -> SheetResult<GridLayout> {
    let fields = [
        ("total frames", grid.total_frames),
        ("columns", grid.columns),
        ("frame width", grid.frame_width),
        ("frame height", grid.frame_height),
    ];
    if let Some((name, value)) = fields.iter().find(|(_, v)| *v < 1) {
        return Err(SheetError::invalid_grid(format!(
            "{} must be at least 1, got {}",
            name, value
        )));
    }

    Ok(GridLayout {
        columns: grid.columns,
        rows: grid.total_frames.div_ceil(grid.columns),
        frame_width: grid.frame_width,
        frame_height: grid.frame_height,
        offset_x: grid.offset_x,
        offset_y: grid.offset_y,
        spacing_x: grid.spacing_x,
        spacing_y: grid.spacing_y,
        total_frames: grid.total_frames,
    })
}

/// Infer a grid from the sheet size and the number of frames it holds.
///
/// Every divisor pair `columns * rows == total_frames` is scored: two points
/// per column, a bonus when the frame aspect ratio lies in `(0.1, 3)`, minus
/// a penalty that grows with the distance from a square frame. The highest
/// score wins; on a tie the candidate with fewer columns is kept.
///
/// ```rust
/// use sprite_core_view::detect_layout;
///
/// let layout = detect_layout(1024, 512, 8).unwrap();
/// assert_eq!((layout.columns, layout.rows), (4, 2));
/// assert_eq!((layout.frame_width, layout.frame_height), (256, 256));
/// ```
pub fn detect_layout(
    sheet_width: u32,
    sheet_height: u32,
    total_frames: u32,
) -> SheetResult<GridLayout> {
    if total_frames < 1 {
        return Err(SheetError::InvalidFrameCount(total_frames));
    }

    let mut best: Option<(f64, GridLayout)> = None;
    for columns in divisors(total_frames) {
        let rows = total_frames / columns;
        let frame_width = sheet_width / columns;
        let frame_height = sheet_height / rows;
        if frame_width == 0 || frame_height == 0 {
            continue;
        }

        let score = layout_score(columns, frame_width, frame_height);
        if best.as_ref().is_some_and(|(best_score, _)| score <= *best_score) {
            continue;
        }
        best = Some((
            score,
            GridLayout {
                columns,
                rows,
                frame_width,
                frame_height,
                offset_x: 0,
                offset_y: 0,
                spacing_x: 0,
                spacing_y: 0,
                total_frames,
            },
        ));
    }

    best.map(|(_, layout)| layout).ok_or_else(|| {
        SheetError::out_of_bounds(format!(
            "a {}x{} sheet cannot hold {} frames of at least 1x1 pixel",
            sheet_width, sheet_height, total_frames
        ))
    })
}

/// Divisors of `n` in ascending order, found in `O(sqrt(n))`.
fn divisors(n: u32) -> Vec<u32> {
    let mut low = Vec::new();
    let mut high = Vec::new();
    let mut c = 1u32;
    while (c as u64) * (c as u64) <= n as u64 {
        if n % c == 0 {
            low.push(c);
            if c != n / c {
                high.push(n / c);
            }
        }
        c += 1;
    }
    low.extend(high.into_iter().rev());
    low
}

fn layout_score(columns: u32, frame_width: u32, frame_height: u32) -> f64 {
    let aspect = frame_width as f64 / frame_height as f64;
    let (low, high) = ASPECT_BONUS_RANGE;
    let bonus = if aspect > low && aspect < high {
        ASPECT_BONUS
    } else {
        0.0
    };
    COLUMN_WEIGHT * columns as f64 + bonus - SQUARENESS_WEIGHT * aspect.log2().abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_default_sheet() {
        let layout = detect_layout(1024, 512, 8).unwrap();
        assert_eq!(layout.columns, 4);
        assert_eq!(layout.rows, 2);
        assert_eq!(layout.frame_width, 256);
        assert_eq!(layout.frame_height, 256);
        assert_eq!(layout.total_frames, 8);
    }

    #[test]
    fn test_detect_strips() {
        // Horizontal strip of square frames
        let layout = detect_layout(800, 100, 8).unwrap();
        assert_eq!((layout.columns, layout.rows), (8, 1));

        // Vertical strip of square frames
        let layout = detect_layout(100, 800, 8).unwrap();
        assert_eq!((layout.columns, layout.rows), (1, 8));

        // Prime frame count
        let layout = detect_layout(700, 100, 7).unwrap();
        assert_eq!((layout.columns, layout.rows), (7, 1));
    }

    #[test]
    fn test_detect_square_grids() {
        let layout = detect_layout(300, 200, 6).unwrap();
        assert_eq!((layout.columns, layout.rows), (3, 2));

        let layout = detect_layout(400, 300, 12).unwrap();
        assert_eq!((layout.columns, layout.rows), (4, 3));
    }

    #[test]
    fn test_detect_properties() {
        for total in 1..=36 {
            let layout = detect_layout(1200, 900, total).unwrap();
            assert_eq!(layout.columns * layout.rows, total);
            assert_eq!(layout.frame_width, 1200 / layout.columns);
            assert!(layout.frame_width >= 1);
            assert!(layout.check_bounds(1200, 900).is_ok());
        }
    }

    #[test]
    fn test_detect_single_frame() {
        let layout = detect_layout(64, 32, 1).unwrap();
        assert_eq!((layout.columns, layout.rows), (1, 1));
        assert_eq!(layout.frame_rect(0), Rect::new(0, 0, 64, 32));
    }

    #[test]
    fn test_detect_tie_keeps_fewer_columns() {
        // 6x2 of 60x60 and 12x1 of 30x120 score the same
        assert_eq!(layout_score(6, 60, 60), layout_score(12, 30, 120));
        let layout = detect_layout(360, 120, 12).unwrap();
        assert_eq!((layout.columns, layout.rows), (6, 2));
        assert_eq!((layout.frame_width, layout.frame_height), (60, 60));
    }

    #[test]
    fn test_detect_large_prime_count() {
        assert!(matches!(
            detect_layout(1024, 512, 1_000_000_007),
            Err(SheetError::LayoutOutOfBounds(_))
        ));
        let layout = detect_layout(u32::MAX, 1, 4_294_967_291).unwrap();
        assert_eq!((layout.columns, layout.rows), (4_294_967_291, 1));
    }

    #[test]
    fn test_divisors_ascending() {
        assert_eq!(divisors(1), vec![1]);
        assert_eq!(divisors(12), vec![1, 2, 3, 4, 6, 12]);
        assert_eq!(divisors(36), vec![1, 2, 3, 4, 6, 9, 12, 18, 36]);
        assert_eq!(divisors(13), vec![1, 13]);
    }

    #[test]
    fn test_detect_invalid_frame_count() {
        assert_eq!(detect_layout(100, 100, 0), Err(SheetError::InvalidFrameCount(0)));
    }

    #[test]
    fn test_detect_sheet_too_small() {
        assert!(matches!(
            detect_layout(0, 10, 4),
            Err(SheetError::LayoutOutOfBounds(_))
        ));
        // Narrow sheet skips candidates with zero-width frames
        let layout = detect_layout(4, 100, 8).unwrap();
        assert!(layout.frame_width >= 1);
    }

    #[test]
    fn test_manual_grid_rows() {
        let layout = apply_manual_grid(&ManualGrid::new(6, 3, 100, 100)).unwrap();
        assert_eq!(layout.rows, 2);
        assert_eq!(layout.frame_rect(5), Rect::new(200, 100, 100, 100));

        // Partial last row
        let layout = apply_manual_grid(&ManualGrid::new(5, 2, 10, 10)).unwrap();
        assert_eq!(layout.rows, 3);
        assert_eq!(layout.frame_rect(4), Rect::new(0, 20, 10, 10));
    }

    #[test]
    fn test_manual_grid_first_frame_matches_input() {
        let grid = ManualGrid::new(4, 2, 32, 48)
            .with_offset(7, 9)
            .with_spacing(3, 5);
        let layout = apply_manual_grid(&grid).unwrap();
        assert_eq!(layout.frame_rect(0), Rect::new(7, 9, 32, 48));
        assert_eq!(layout.frame_rect(1), Rect::new(42, 9, 32, 48));
        assert_eq!(layout.frame_rect(2), Rect::new(7, 62, 32, 48));
    }

    #[test]
    fn test_manual_grid_rejects_zero_fields() {
        for grid in [
            ManualGrid::new(0, 1, 10, 10),
            ManualGrid::new(4, 0, 10, 10),
            ManualGrid::new(4, 2, 0, 10),
            ManualGrid::new(4, 2, 10, 0),
        ] {
            assert!(matches!(
                apply_manual_grid(&grid),
                Err(SheetError::InvalidGridParameters(_))
            ));
        }
    }

    #[test]
    fn test_frame_rects_do_not_overlap() {
        let grid = ManualGrid::new(7, 3, 20, 10).with_spacing(2, 0);
        let layout = apply_manual_grid(&grid).unwrap();
        let rects: Vec<Rect> = (0..7).map(|i| layout.frame_rect(i)).collect();
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert_ne!(a, b);
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn test_check_bounds() {
        // 3 columns of 100 with 2px gaps: 304 wide
        let grid = ManualGrid::new(6, 3, 100, 100).with_spacing(2, 2);
        let layout = apply_manual_grid(&grid).unwrap();
        assert!(layout.check_bounds(304, 202).is_ok());
        assert!(matches!(
            layout.check_bounds(303, 202),
            Err(SheetError::LayoutOutOfBounds(_))
        ));
        assert!(layout.check_bounds(304, 201).is_err());

        // Offset pushes the grid out
        let layout = apply_manual_grid(&ManualGrid::new(2, 2, 50, 50).with_offset(1, 0)).unwrap();
        assert!(layout.check_bounds(100, 50).is_err());

        // Fewer frames than columns only occupies the used columns
        let layout = apply_manual_grid(&ManualGrid::new(2, 4, 50, 50)).unwrap();
        assert!(layout.check_bounds(100, 50).is_ok());
    }

    #[test]
    fn test_summary() {
        let layout = detect_layout(1024, 512, 8).unwrap();
        let summary = layout.summary();
        assert_eq!(summary.columns, 4);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.frame_width, 256);
        assert_eq!(summary.frame_height, 256);
    }

    #[test]
    fn test_rect_helpers() {
        let rect = Rect::new(10, 20, 30, 40);
        assert_eq!(rect.right(), 40);
        assert_eq!(rect.bottom(), 60);
        assert!(rect.fits_within(40, 60));
        assert!(!rect.fits_within(39, 60));
        assert!(!rect.intersects(&Rect::new(40, 20, 5, 5)));
        assert!(rect.intersects(&Rect::new(39, 59, 5, 5)));
    }
}
