use thiserror::Error;

use crate::TILE;

/// An error type for views that break the addressing contract of a buffer.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// The shape and stride vectors have different lengths.
    #[error("Rank mismatch: shape has {shape} dimensions but strides has {strides}")]
    RankMismatch {
        /// Number of entries in the shape.
        shape: usize,
        /// Number of entries in the strides.
        strides: usize,
    },

    /// Some multi-index addresses a position before the start of the buffer.
    #[error("View addresses position {0} which is before the start of the buffer")]
    NegativePosition(isize),

    /// Some multi-index addresses a position past the end of the buffer.
    #[error("View addresses position {position} but the buffer holds {len} elements")]
    OutOfBounds {
        /// The largest addressed position.
        position: usize,
        /// The number of elements in the buffer.
        len: usize,
    },

    /// The element count or an addressed position does not fit in the address space.
    #[error("View extent overflows the address space")]
    Overflow,

    /// A matrix dimension is not a multiple of the tile size.
    #[error("Matrix of {rows}x{cols} cannot be split into {tile}x{tile} tiles")]
    NotTileMultiple {
        /// Rows of the matrix.
        rows: usize,
        /// Columns of the matrix.
        cols: usize,
        /// The tile size.
        tile: usize,
    },
}

/// Computes the row-major strides of a compact array with the given shape.
///
/// Strides that do not fit in `isize` saturate; [`StridedLayout::validate`] rejects any
/// view built from them.
///
/// # Example
///
/// ```rust
/// use ndtile_array::layout::compact_strides;
///
/// assert_eq!(compact_strides(&[2, 3, 4]), vec![12, 4, 1]);
/// assert!(compact_strides(&[]).is_empty());
/// ```
pub fn compact_strides(shape: &[usize]) -> Vec<isize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1isize;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        let dim = isize::try_from(shape[i]).unwrap_or(isize::MAX);
        stride = stride.saturating_mul(dim);
    }
    strides
}

/// The logical view of a buffer: shape, strides and offset, all in elements.
///
/// A view never owns memory. It maps every multi-index `idx` with `idx[i] < shape[i]`
/// to the buffer position `offset + Σ idx[i] * strides[i]`. Strides may be zero
/// (broadcasting) or negative (reversed axes).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StridedLayout {
    /// The extent of each dimension.
    pub shape: Vec<usize>,
    /// The step in elements to advance one unit along each dimension.
    pub strides: Vec<isize>,
    /// The position of the element with multi-index zero.
    pub offset: usize,
}

impl StridedLayout {
    /// Creates a view from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::RankMismatch`] if `shape` and `strides` differ in length.
    pub fn new(shape: Vec<usize>, strides: Vec<isize>, offset: usize) -> Result<Self, LayoutError> {
        if shape.len() != strides.len() {
            return Err(LayoutError::RankMismatch {
                shape: shape.len(),
                strides: strides.len(),
            });
        }
        Ok(Self {
            shape,
            strides,
            offset,
        })
    }

    /// Creates the compact, zero-offset view of the given shape.
    pub fn compact(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            strides: compact_strides(shape),
            offset: 0,
        }
    }

    /// Describes a compact `rows x cols` matrix as a `(rows/T) x (cols/T) x T x T`
    /// array of tile blocks.
    ///
    /// Compacting a matrix through this view yields the tiled layout consumed by
    /// the tiled matrix multiplication.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NotTileMultiple`] if either dimension is not a multiple of [`TILE`].
    pub fn tiled(rows: usize, cols: usize) -> Result<Self, LayoutError> {
        if rows % TILE != 0 || cols % TILE != 0 {
            return Err(LayoutError::NotTileMultiple {
                rows,
                cols,
                tile: TILE,
            });
        }
        let (t, c) = (TILE as isize, cols as isize);
        Ok(Self {
            shape: vec![rows / TILE, cols / TILE, TILE, TILE],
            strides: vec![t * c, t, c, 1],
            offset: 0,
        })
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the number of addressed elements, the product of the shape.
    ///
    /// A rank-0 view addresses exactly one element. A product that overflows saturates to
    /// `usize::MAX`; such a view never passes [`validate`](Self::validate).
    #[inline]
    pub fn numel(&self) -> usize {
        self.checked_numel().unwrap_or(usize::MAX)
    }

    /// Returns the number of addressed elements, or `None` if the product overflows.
    pub fn checked_numel(&self) -> Option<usize> {
        if self.shape.contains(&0) {
            return Some(0);
        }
        self.shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
    }

    /// Returns true if the view has row-major strides and zero offset.
    ///
    /// Strides of dimensions with extent one never move the position and are ignored.
    pub fn is_compact(&self) -> bool {
        self.offset == 0
            && self
                .shape
                .iter()
                .zip(self.strides.iter())
                .zip(compact_strides(&self.shape))
                .all(|((&dim, &stride), expected)| dim == 1 || stride == expected)
    }

    /// Returns the buffer position addressed by a multi-index, without bounds checks.
    pub fn position(&self, index: &[usize]) -> isize {
        index
            .iter()
            .zip(self.strides.iter())
            .fold(self.offset as isize, |acc, (&i, &s)| acc + i as isize * s)
    }

    /// Returns the smallest and largest addressed positions, or `None` for an empty view.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Overflow`] if the element count or a position does not fit
    /// in `isize`.
    pub fn extent(&self) -> Result<Option<(isize, isize)>, LayoutError> {
        if self.checked_numel().ok_or(LayoutError::Overflow)? == 0 {
            return Ok(None);
        }
        let base = isize::try_from(self.offset).map_err(|_| LayoutError::Overflow)?;
        let (mut lo, mut hi) = (base, base);
        for (&dim, &stride) in self.shape.iter().zip(self.strides.iter()) {
            // dim >= 1 since the view is not empty
            let last = isize::try_from(dim - 1).map_err(|_| LayoutError::Overflow)?;
            let span = last.checked_mul(stride).ok_or(LayoutError::Overflow)?;
            if span < 0 {
                lo = lo.checked_add(span).ok_or(LayoutError::Overflow)?;
            } else {
                hi = hi.checked_add(span).ok_or(LayoutError::Overflow)?;
            }
        }
        Ok(Some((lo, hi)))
    }

    /// Checks that every addressed position lies inside a buffer of `len` elements.
    ///
    /// The check costs O(rank), independent of the number of addressed elements.
    ///
    /// # Errors
    ///
    /// Returns an error if the ranks disagree, the extent overflows, or an addressed position
    /// falls outside `[0, len)`.
    pub fn validate(&self, len: usize) -> Result<(), LayoutError> {
        if self.shape.len() != self.strides.len() {
            return Err(LayoutError::RankMismatch {
                shape: self.shape.len(),
                strides: self.strides.len(),
            });
        }
        let Some((lo, hi)) = self.extent()? else {
            return Ok(());
        };
        if lo < 0 {
            return Err(LayoutError::NegativePosition(lo));
        }
        if hi as usize >= len {
            return Err(LayoutError::OutOfBounds {
                position: hi as usize,
                len,
            });
        }
        Ok(())
    }

    /// Enumerates the addressed buffer positions in canonical order.
    ///
    /// The enumeration is a digit counter over the multi-index with the last
    /// dimension moving fastest.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ndtile_array::StridedLayout;
    ///
    /// let transposed = StridedLayout::new(vec![2, 3], vec![1, 2], 0).unwrap();
    /// let order: Vec<usize> = transposed.positions().collect();
    /// assert_eq!(order, vec![0, 2, 4, 1, 3, 5]);
    /// ```
    pub fn positions(&self) -> StridedPositions<'_> {
        StridedPositions {
            layout: self,
            index: vec![0; self.rank()],
            position: self.offset as isize,
            remaining: self.numel(),
        }
    }
}

/// Iterator over the buffer positions of a [`StridedLayout`] in canonical order.
///
/// Created by [`StridedLayout::positions`]. Positions are only meaningful for views
/// that passed [`StridedLayout::validate`].
#[derive(Debug, Clone)]
pub struct StridedPositions<'a> {
    layout: &'a StridedLayout,
    index: Vec<usize>,
    position: isize,
    remaining: usize,
}

impl Iterator for StridedPositions<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.position;
        self.remaining -= 1;

        if self.remaining > 0 {
            let shape = &self.layout.shape;
            let strides = &self.layout.strides;
            for dim in (0..shape.len()).rev() {
                if self.index[dim] + 1 < shape[dim] {
                    self.index[dim] += 1;
                    self.position += strides[dim];
                    break;
                }
                // carry into the next dimension to the left
                self.position -= strides[dim] * self.index[dim] as isize;
                self.index[dim] = 0;
            }
        }

        Some(current as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for StridedPositions<'_> {}
