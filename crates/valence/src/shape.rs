//! Dimensionality overlay: matrices and arrays
//!
//! Any value may carry a [`Dimensions`] descriptor listing two or more axis
//! extents whose product equals the element count. Elements are stored in
//! column-major order: the first axis varies fastest.

use smallvec::SmallVec;

use crate::error::{type_name, Result, ValueError};
use crate::token::Token;
use crate::value::{Value, ValueData, ValueKind};

/// Axis extents of a matrix (two axes) or array (more than two).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimensions {
    extents: SmallVec<[usize; 4]>,
}

impl Dimensions {
    /// Validate `extents` against an element count.
    pub fn new(extents: &[usize], count: usize, token: Option<Token>) -> Result<Self> {
        if extents.len() < 2 {
            return Err(ValueError::Dimensions {
                operation: "set_dimensions",
                message: format!(
                    "a shaped value needs at least 2 axes, got {}",
                    extents.len()
                ),
                token,
            });
        }

        let product = extents
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n));
        if product != Some(count) {
            return Err(ValueError::Dimensions {
                operation: "set_dimensions",
                message: format!(
                    "extents {:?} do not multiply to the element count {}",
                    extents, count
                ),
                token,
            });
        }

        Ok(Self {
            extents: SmallVec::from_slice(extents),
        })
    }

    /// Number of axes, always at least 2.
    pub fn axis_count(&self) -> usize {
        self.extents.len()
    }

    /// Per-axis extents.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Whether there are exactly two axes.
    pub fn is_matrix(&self) -> bool {
        self.axis_count() == 2
    }

    /// Product of the extents.
    pub fn element_count(&self) -> usize {
        self.extents.iter().product()
    }
}

/// Which operand of an element-wise binary operation supplies the result shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeOwner {
    /// The result is a plain vector
    Neither,
    /// The left operand's shape is used
    Left,
    /// The right operand's shape is used
    Right,
}

impl ShapeOwner {
    /// The chosen shape, borrowed from its operand.
    pub fn dimensions<'a>(self, left: &'a ValueData, right: &'a ValueData) -> Option<&'a Dimensions> {
        match self {
            ShapeOwner::Neither => None,
            ShapeOwner::Left => left.dimensions(),
            ShapeOwner::Right => right.dimensions(),
        }
    }
}

/// Pick the result shape for an element-wise binary operation.
///
/// Unshaped operands give an unshaped result. A single shaped operand
/// supplies the shape unless it holds one element and the other operand
/// holds some other number, since one matrix element does not make a
/// longer plain vector into a matrix. Two shaped operands must have equal
/// extents.
pub fn resolve_binary_shape(
    left: &ValueData,
    right: &ValueData,
    operation: &'static str,
    token: Option<Token>,
) -> Result<ShapeOwner> {
    match (left.dimensions(), right.dimensions()) {
        (None, None) => Ok(ShapeOwner::Neither),
        (Some(_), None) => {
            if left.count() == 1 && right.count() != 1 {
                Ok(ShapeOwner::Neither)
            } else {
                Ok(ShapeOwner::Left)
            }
        }
        (None, Some(_)) => {
            if right.count() == 1 && left.count() != 1 {
                Ok(ShapeOwner::Neither)
            } else {
                Ok(ShapeOwner::Right)
            }
        }
        (Some(l), Some(r)) => {
            if l == r {
                Ok(ShapeOwner::Left)
            } else {
                Err(ValueError::NonConformable {
                    operation,
                    message: format!(
                        "shaped operands are not conformable: {:?} vs {:?}",
                        l.extents(),
                        r.extents()
                    ),
                    token,
                })
            }
        }
    }
}

/// Selection along one axis of a shaped value.
#[derive(Debug, Clone, Copy)]
pub enum AxisSelector<'a> {
    /// Every position on the axis
    All,
    /// A NULL (every position), a logical mask, or 0-based indices
    Values(&'a ValueData),
}

impl AxisSelector<'_> {
    fn positions(&self, axis: usize, extent: usize, token: Option<Token>) -> Result<Vec<usize>> {
        let selector = match self {
            AxisSelector::All => return Ok((0..extent).collect()),
            AxisSelector::Values(v) => *v,
        };

        match selector.kind() {
            ValueKind::Null => Ok((0..extent).collect()),
            ValueKind::Logical => {
                if selector.count() != extent {
                    return Err(ValueError::Dimensions {
                        operation: "subset_dimensions",
                        message: format!(
                            "logical selector for axis {} has length {}, expected {}",
                            axis,
                            selector.count(),
                            extent
                        ),
                        token,
                    });
                }
                let mut positions = Vec::new();
                for i in 0..extent {
                    if selector.logical_at(i, token)? {
                        positions.push(i);
                    }
                }
                Ok(positions)
            }
            ValueKind::Int | ValueKind::Float => (0..selector.count())
                .map(|i| {
                    let index = selector.int_at(i, token)?;
                    usize::try_from(index)
                        .ok()
                        .filter(|&p| p < extent)
                        .ok_or_else(|| ValueError::Dimensions {
                            operation: "subset_dimensions",
                            message: format!(
                                "index {} out of range for axis {} of extent {}",
                                index, axis, extent
                            ),
                            token,
                        })
                })
                .collect(),
            _ => Err(ValueError::TypeMismatch {
                operation: "subset_dimensions",
                expected: "NULL, logical, integer, or float".to_string(),
                got: type_name(selector),
                token,
            }),
        }
    }
}

impl ValueData {
    /// The shape, if this is a matrix or array.
    pub fn dimensions(&self) -> Option<&Dimensions> {
        self.dims.as_ref()
    }

    /// Whether the value carries a shape.
    pub fn is_shaped(&self) -> bool {
        self.dims.is_some()
    }

    /// Attach a shape.
    ///
    /// `axis_count` 0 with no extents removes the shape. Otherwise there must
    /// be at least two axes, one extent per axis, and the extents must
    /// multiply to the element count.
    pub fn set_dimensions(&mut self, axis_count: usize, extents: &[usize], token: Option<Token>) -> Result<()> {
        if axis_count == 0 && extents.is_empty() {
            self.dims = None;
            return Ok(());
        }
        if axis_count != extents.len() {
            return Err(ValueError::Dimensions {
                operation: "set_dimensions",
                message: format!(
                    "axis count {} does not match {} extents",
                    axis_count,
                    extents.len()
                ),
                token,
            });
        }
        self.dims = Some(Dimensions::new(extents, self.count(), token)?);
        Ok(())
    }

    /// Remove the shape, leaving a plain vector.
    pub fn clear_dimensions(&mut self) {
        self.dims = None;
    }

    /// Take the shape of `other`.
    ///
    /// Does nothing when neither value is shaped. Fails if `other`'s shape
    /// does not fit this value's element count.
    pub fn copy_dimensions_from(&mut self, other: &ValueData, token: Option<Token>) -> Result<()> {
        match (&self.dims, &other.dims) {
            (None, None) => Ok(()),
            (_, None) => {
                self.dims = None;
                Ok(())
            }
            (_, Some(dims)) => {
                self.dims = Some(Dimensions::new(dims.extents(), self.count(), token)?);
                Ok(())
            }
        }
    }

    /// Select a sub-block of a shaped value.
    ///
    /// One selector per axis. With `drop`, axes reduced to a single position
    /// are removed, and a result with fewer than two axes left is a plain
    /// vector.
    pub fn subset_dimensions(
        &self,
        selectors: &[AxisSelector<'_>],
        drop: bool,
        token: Option<Token>,
    ) -> Result<Value> {
        let dims = self.dims.as_ref().ok_or_else(|| ValueError::Dimensions {
            operation: "subset_dimensions",
            message: "value is not a matrix or array".to_string(),
            token,
        })?;
        if selectors.len() != dims.axis_count() {
            return Err(ValueError::Dimensions {
                operation: "subset_dimensions",
                message: format!(
                    "{} selectors supplied for {} axes",
                    selectors.len(),
                    dims.axis_count()
                ),
                token,
            });
        }

        let positions = selectors
            .iter()
            .zip(dims.extents())
            .enumerate()
            .map(|(axis, (selector, &extent))| selector.positions(axis, extent, token))
            .collect::<Result<Vec<_>>>()?;

        let mut strides = Vec::with_capacity(positions.len());
        let mut stride = 1;
        for &extent in dims.extents() {
            strides.push(stride);
            stride *= extent;
        }

        let result_extents: SmallVec<[usize; 4]> = positions.iter().map(Vec::len).collect();
        let total: usize = result_extents.iter().product();
        let mut result = self.matching_vector(total);

        if total > 0 {
            // Odometer over the selected positions, first axis fastest
            let mut cursor = vec![0usize; positions.len()];
            'gather: loop {
                let offset: usize = cursor
                    .iter()
                    .zip(&positions)
                    .zip(&strides)
                    .map(|((&c, axis), &s)| axis[c] * s)
                    .sum();
                result.push_from_index(offset, self, token)?;

                for (axis, c) in cursor.iter_mut().enumerate() {
                    *c += 1;
                    if *c < positions[axis].len() {
                        continue 'gather;
                    }
                    *c = 0;
                }
                break;
            }
        }

        let kept: SmallVec<[usize; 4]> = if drop {
            result_extents.iter().copied().filter(|&n| n != 1).collect()
        } else {
            result_extents
        };
        if kept.len() >= 2 {
            result.dims = Some(Dimensions::new(&kept, total, token)?);
        }

        Ok(Value::new(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matrix(values: &[i64], extents: &[usize]) -> Value {
        let mut v = Value::int_vec(values.iter().copied());
        v.get_mut(None)
            .unwrap()
            .set_dimensions(extents.len(), extents, None)
            .unwrap();
        v
    }

    #[test]
    fn test_dimensions_validation() {
        assert!(Dimensions::new(&[2, 3], 6, None).is_ok());
        assert!(Dimensions::new(&[1, 2, 3], 6, None).is_ok());
        assert!(Dimensions::new(&[2, 2], 6, None).is_err());
        assert!(Dimensions::new(&[6], 6, None).is_err());
    }

    #[test]
    fn test_set_dimensions_axis_count_mismatch() {
        let mut v = Value::int_vec([1, 2, 3, 4]);
        let data = v.get_mut(None).unwrap();
        assert!(data.set_dimensions(3, &[2, 2], None).is_err());
        data.set_dimensions(2, &[2, 2], None).unwrap();
        assert!(data.is_shaped());
        data.set_dimensions(0, &[], None).unwrap();
        assert!(!data.is_shaped());
    }

    #[test]
    fn test_copy_dimensions_noop_for_plain_values() {
        let mut a = Value::int_vec([1, 2]);
        let b = Value::int_vec([3, 4]);
        a.get_mut(None).unwrap().copy_dimensions_from(&b, None).unwrap();
        assert!(!a.is_shaped());
    }

    #[test]
    fn test_copy_dimensions_checks_count() {
        let m = matrix(&[1, 2, 3, 4], &[2, 2]);
        let mut short = Value::int_vec([1, 2, 3]);
        assert!(short.get_mut(None).unwrap().copy_dimensions_from(&m, None).is_err());
        let mut fits = Value::int_vec([5, 6, 7, 8]);
        fits.get_mut(None).unwrap().copy_dimensions_from(&m, None).unwrap();
        assert_eq!(fits.dimensions().map(Dimensions::extents), Some(&[2, 2][..]));
    }

    #[test]
    fn test_shaped_singleton_yields_to_plain_vector() {
        let one = matrix(&[1], &[1, 1]);
        let five = Value::int_vec([1, 2, 3, 4, 5]);
        assert_eq!(resolve_binary_shape(&one, &five, "+", None).unwrap(), ShapeOwner::Neither);
        assert_eq!(resolve_binary_shape(&five, &one, "+", None).unwrap(), ShapeOwner::Neither);
        let single = Value::int(2);
        assert_eq!(resolve_binary_shape(&one, &single, "+", None).unwrap(), ShapeOwner::Left);
    }

    #[test]
    fn test_both_shaped_must_match() {
        let a = matrix(&[1, 2, 3, 4, 5, 6], &[2, 3]);
        let b = matrix(&[1, 2, 3, 4, 5, 6], &[3, 2]);
        assert!(resolve_binary_shape(&a, &b, "+", None).is_err());
        assert_eq!(resolve_binary_shape(&a, &a, "+", None).unwrap(), ShapeOwner::Left);
    }

    #[test]
    fn test_subset_row() {
        // [[1, 3, 5], [2, 4, 6]] in column-major order
        let m = matrix(&[1, 2, 3, 4, 5, 6], &[2, 3]);
        let row = Value::int(1);
        let kept = m
            .subset_dimensions(&[AxisSelector::Values(&row), AxisSelector::All], false, None)
            .unwrap();
        assert_eq!(kept.as_ints(), Some(&[2, 4, 6][..]));
        assert_eq!(kept.dimensions().map(Dimensions::extents), Some(&[1, 3][..]));

        let dropped = m
            .subset_dimensions(&[AxisSelector::Values(&row), AxisSelector::All], true, None)
            .unwrap();
        assert_eq!(dropped.as_ints(), Some(&[2, 4, 6][..]));
        assert!(!dropped.is_shaped());
    }

    #[test]
    fn test_subset_with_logical_mask() {
        let m = matrix(&[1, 2, 3, 4, 5, 6], &[2, 3]);
        let mask = Value::logical_vec([true, false, true]);
        let cols = m
            .subset_dimensions(&[AxisSelector::All, AxisSelector::Values(&mask)], true, None)
            .unwrap();
        assert_eq!(cols.as_ints(), Some(&[1, 2, 5, 6][..]));
        assert_eq!(cols.dimensions().map(Dimensions::extents), Some(&[2, 2][..]));

        let short = Value::logical_vec([true]);
        assert!(m
            .subset_dimensions(&[AxisSelector::All, AxisSelector::Values(&short)], true, None)
            .is_err());
    }

    #[test]
    fn test_subset_index_out_of_range() {
        let m = matrix(&[1, 2, 3, 4], &[2, 2]);
        let bad = Value::int(2);
        assert!(m
            .subset_dimensions(&[AxisSelector::Values(&bad), AxisSelector::All], true, None)
            .is_err());
        let null = Value::null();
        let all = m
            .subset_dimensions(&[AxisSelector::Values(&null), AxisSelector::All], true, None)
            .unwrap();
        assert_eq!(all, m);
    }
}
