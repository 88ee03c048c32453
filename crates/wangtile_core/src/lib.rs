//! Core grid data structures for wangtile
//!
//! This crate provides the coordinate-space types every autotile query is
//! built on:
//! - `Rect` - A half-open integer rectangle
//! - `Pointwise` - Strided traversal of a rectangle with an out-of-bounds policy
//! - `Grid` - A sparse occupancy field over a fixed rectangle
//! - `Occupancy` - The "is this cell on" probe consumed by Wang id derivation

mod grid;
mod pointwise;
mod rect;

pub use grid::{Grid, Overflow};
pub use pointwise::{clamp_interval, contains_interval, modulo, Adjustment, Points, Pointwise};
pub use rect::Rect;

use thiserror::Error;

/// Errors raised when constructing grid-space types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("rectangle must have positive dimensions, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("stride must be positive, got ({x}, {y})")]
    InvalidStride { x: i32, y: i32 },
    #[error("rectangle {0:?} reaches past the i32 coordinate range")]
    OutOfRange(Rect),
}

/// Answers whether the cell at `(x, y)` is "on".
///
/// Implementations must be side-effect free; derivation code may call this
/// up to nine times per cell.
pub trait Occupancy {
    fn is_set(&self, x: i32, y: i32) -> bool;
}

impl<F> Occupancy for F
where
    F: Fn(i32, i32) -> bool,
{
    fn is_set(&self, x: i32, y: i32) -> bool {
        self(x, y)
    }
}
