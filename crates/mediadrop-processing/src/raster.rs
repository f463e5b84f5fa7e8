//! Line rasterization
//!
//! Integer Bresenham line drawing onto any addressable pixel buffer. This is the
//! one piece of pixel work the service implements itself; everything else
//! (rectangle fill, JPEG encoding) is delegated to `image`/`imageproc`.
//!
//! The stepping is reproduced exactly so that the set of cells a line touches is
//! stable across releases:
//!
//! 1. endpoints are rounded to the nearest integer (ties toward +∞);
//! 2. `dx = |x1-x0|`, `dy = -|y1-y0|`, `err = dx + dy`;
//! 3. each step plots the current cell if it lies inside the buffer, stops once
//!    the current cell equals the end point, and otherwise advances x when
//!    `2*err >= dy` and y when `2*err <= dx`.
//!
//! Cells outside `[0, width) × [0, height)` are skipped but still stepped
//! through, so a line that enters the buffer from outside is drawn exactly as if
//! the buffer were unbounded and then cropped.

use thiserror::Error;

/// Largest accepted coordinate magnitude.
///
/// Bounds the number of steps a single line can take and keeps the error term
/// far away from integer overflow.
pub const COORDINATE_LIMIT: f64 = 1_048_576.0;

/// Rejected coordinate values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RasterError {
    #[error("Coordinate {axis} is not a finite number")]
    NonFinite { axis: &'static str },

    #[error("Coordinate {axis}={value} is outside the supported range ±{limit}")]
    OutOfRange {
        axis: &'static str,
        value: f64,
        limit: f64,
    },
}

/// A 2D surface the rasterizer can write to.
///
/// Implementations need not bounds-check `set_pixel`; [`draw_line`] only calls
/// it with `x < width()` and `y < height()`.
pub trait PixelBuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set_pixel(&mut self, x: u32, y: u32, color: u32);
}

/// A real-valued point, validated to be finite and within [`COORDINATE_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Result<Self, RasterError> {
        check_axis("x", x)?;
        check_axis("y", y)?;
        Ok(Self { x, y })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    fn rounded(&self) -> (i64, i64) {
        (round_half_up(self.x), round_half_up(self.y))
    }
}

fn check_axis(axis: &'static str, value: f64) -> Result<(), RasterError> {
    if !value.is_finite() {
        return Err(RasterError::NonFinite { axis });
    }
    if value.abs() > COORDINATE_LIMIT {
        return Err(RasterError::OutOfRange {
            axis,
            value,
            limit: COORDINATE_LIMIT,
        });
    }
    Ok(())
}

/// Round to the nearest integer, ties toward positive infinity (`-2.5 -> -2`).
fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

/// Plot the line from `from` to `to` (both endpoints included) in `color`.
///
/// Never writes outside the buffer and never fails.
pub fn draw_line<B>(buffer: &mut B, from: Point, to: Point, color: u32)
where
    B: PixelBuffer + ?Sized,
{
    let (mut x, mut y) = from.rounded();
    let (x1, y1) = to.rounded();
    let width = i64::from(buffer.width());
    let height = i64::from(buffer.height());

    let dx = (x1 - x).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let dy = -(y1 - y).abs();
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if (0..width).contains(&x) && (0..height).contains(&y) {
            buffer.set_pixel(x as u32, y as u32, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Row-major grid of `u32` colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    cells: Vec<u32>,
}

impl PixelGrid {
    pub fn new(width: u32, height: u32, fill: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[self.index(x, y)])
    }

    /// Coordinates of every cell whose color differs from `background`, row-major.
    pub fn cells_not(&self, background: u32) -> Vec<(u32, u32)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c != background)
            .map(|(i, _)| ((i % self.width as usize) as u32, (i / self.width as usize) as u32))
            .collect()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl PixelBuffer for PixelGrid {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        let i = self.index(x, y);
        self.cells[i] = color;
    }
}

/// Colors are `0xRRGGBBAA`.
#[cfg(feature = "image")]
impl PixelBuffer for ::image::RgbaImage {
    fn width(&self) -> u32 {
        ::image::RgbaImage::width(self)
    }

    fn height(&self) -> u32 {
        ::image::RgbaImage::height(self)
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        self.put_pixel(x, y, ::image::Rgba(color.to_be_bytes()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: u32 = 0;
    const INK: u32 = 0xff00_00ff;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y).unwrap()
    }

    fn draw(width: u32, height: u32, from: Point, to: Point) -> Vec<(u32, u32)> {
        let mut grid = PixelGrid::new(width, height, BG);
        draw_line(&mut grid, from, to, INK);
        grid.cells_not(BG)
    }

    #[test]
    fn test_single_point_writes_one_cell() {
        assert_eq!(draw(10, 10, p(3.0, 7.0), p(3.0, 7.0)), vec![(3, 7)]);
    }

    #[test]
    fn test_single_point_out_of_bounds_writes_nothing() {
        assert!(draw(10, 10, p(10.0, 2.0), p(10.0, 2.0)).is_empty());
        assert!(draw(10, 10, p(-1.0, -1.0), p(-1.0, -1.0)).is_empty());
    }

    #[test]
    fn test_horizontal_line_covers_span_only() {
        let cells = draw(10, 10, p(2.0, 4.0), p(8.0, 4.0));
        let expected: Vec<(u32, u32)> = (2..=8).map(|x| (x, 4)).collect();
        assert_eq!(cells, expected);

        // Direction does not change the covered set.
        assert_eq!(draw(10, 10, p(8.0, 4.0), p(2.0, 4.0)), expected);
    }

    #[test]
    fn test_vertical_line_covers_span_only() {
        let mut cells = draw(10, 10, p(6.0, 9.0), p(6.0, 1.0));
        cells.sort_by_key(|&(x, y)| (y, x));
        let expected: Vec<(u32, u32)> = (1..=9).map(|y| (6, y)).collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_diagonal_line() {
        assert_eq!(
            draw(10, 10, p(0.0, 0.0), p(4.0, 4.0)),
            vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]
        );
    }

    #[test]
    fn test_partial_clipping_keeps_in_bounds_part() {
        let cells = draw(10, 10, p(-5.0, 5.0), p(5.0, 5.0));
        let expected: Vec<(u32, u32)> = (0..=5).map(|x| (x, 5)).collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_line_entirely_outside_writes_nothing() {
        assert!(draw(10, 10, p(-20.0, -3.0), p(-2.0, -9.0)).is_empty());
        assert!(draw(10, 10, p(12.0, 0.0), p(30.0, 9.0)).is_empty());
        assert!(draw(10, 10, p(0.0, 10.0), p(9.0, 40.0)).is_empty());
    }

    #[test]
    fn test_line_crossing_whole_buffer_matches_unbounded_stepping() {
        // Same line drawn on a large grid then cropped must match the small grid.
        let from = p(-7.0, -3.0);
        let to = p(18.0, 14.0);

        let mut big = PixelGrid::new(64, 64, BG);
        let shift = 16.0;
        draw_line(
            &mut big,
            p(from.x() + shift, from.y() + shift),
            p(to.x() + shift, to.y() + shift),
            INK,
        );
        let cropped: Vec<(u32, u32)> = big
            .cells_not(BG)
            .into_iter()
            .filter(|&(x, y)| (16..26).contains(&x) && (16..26).contains(&y))
            .map(|(x, y)| (x - 16, y - 16))
            .collect();

        assert!(!cropped.is_empty());
        assert_eq!(draw(10, 10, from, to), cropped);
    }

    #[test]
    fn test_shallow_line_exact_cells() {
        // dx=6, dy=2: the classic Bresenham staircase.
        assert_eq!(
            draw(10, 10, p(0.0, 0.0), p(6.0, 2.0)),
            vec![(0, 0), (1, 0), (2, 1), (3, 1), (4, 1), (5, 2), (6, 2)]
        );
    }

    #[test]
    fn test_fractional_endpoints_are_rounded() {
        assert_eq!(
            draw(10, 10, p(0.4, 0.5), p(2.6, 0.6)),
            vec![(0, 1), (1, 1), (2, 1), (3, 1)]
        );
    }

    #[test]
    fn test_half_values_round_toward_positive_infinity() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(0.49999999999999994), 0);
    }

    #[test]
    fn test_drawing_twice_is_idempotent() {
        let mut once = PixelGrid::new(12, 8, BG);
        draw_line(&mut once, p(-3.0, 7.0), p(11.0, 1.0), INK);

        let mut twice = once.clone();
        draw_line(&mut twice, p(-3.0, 7.0), p(11.0, 1.0), INK);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_color_is_written_verbatim() {
        let mut grid = PixelGrid::new(4, 4, 0x1111_1111);
        draw_line(&mut grid, p(0.0, 0.0), p(0.0, 0.0), 0x1234_5678);
        assert_eq!(grid.get(0, 0), Some(0x1234_5678));
        assert_eq!(grid.get(1, 0), Some(0x1111_1111));
    }

    #[test]
    fn test_zero_sized_buffer_never_written() {
        let mut grid = PixelGrid::new(0, 0, BG);
        draw_line(&mut grid, p(0.0, 0.0), p(3.0, 3.0), INK);
        assert!(grid.cells_not(BG).is_empty());
    }

    #[test]
    fn test_point_rejects_non_finite_and_huge_values() {
        assert_eq!(
            Point::new(f64::NAN, 0.0),
            Err(RasterError::NonFinite { axis: "x" })
        );
        assert_eq!(
            Point::new(0.0, f64::INFINITY),
            Err(RasterError::NonFinite { axis: "y" })
        );
        assert!(matches!(
            Point::new(0.0, -2.0e7),
            Err(RasterError::OutOfRange { axis: "y", .. })
        ));
        assert!(Point::new(COORDINATE_LIMIT, -COORDINATE_LIMIT).is_ok());
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_rgba_image_receives_rgba_bytes() {
        let mut img = ::image::RgbaImage::new(5, 5);
        draw_line(&mut img, p(0.0, 2.0), p(4.0, 2.0), 0x10_20_30_40);
        assert_eq!(img.get_pixel(3, 2).0, [0x10, 0x20, 0x30, 0x40]);
        assert_eq!(img.get_pixel(3, 3).0, [0, 0, 0, 0]);
    }
}
