//! Database entity (C2): a single actuarial parameter, scalar or varying
//! along up to seven axes.
//!
//! Grounded on `TDBValue` in the original database-entity header: axes are
//! fixed in order (gender, class, smoking, issue_age, uw_basis, state,
//! duration), duration is last so that a pointer calculated from the
//! preceding axes addresses contiguous durational elements, and every axis
//! length is either 1 (invariant along that axis) or the axis's maximum
//! cardinality.

use serde::{Deserialize, Serialize};

use crate::database::keys::DatabaseKey;
use crate::enums::AxisTuple;
use crate::error::CoreError;

/// Maximum cardinality of each axis, in fixed axis order.
pub const MAX_AXIS_LENGTHS: [usize; 7] = [3, 4, 3, 100, 5, 53, 100];
pub const NUMBER_OF_AXES: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseEntity {
    key: DatabaseKey,
    axis_lengths: [usize; NUMBER_OF_AXES],
    data: Vec<f64>,
}

impl DatabaseEntity {
    /// Build an entity, validating that every axis length is either 1 or
    /// the axis maximum, and that `data.len()` equals their product.
    pub fn new(
        key: DatabaseKey,
        axis_lengths: [usize; NUMBER_OF_AXES],
        data: Vec<f64>,
    ) -> Result<Self, CoreError> {
        for (axis, &len) in axis_lengths.iter().enumerate() {
            if len != 1 && len != MAX_AXIS_LENGTHS[axis] {
                return Err(CoreError::domain(format!(
                    "axis {axis} length {len} is neither 1 nor the maximum {}",
                    MAX_AXIS_LENGTHS[axis]
                )));
            }
        }
        let expected: usize = axis_lengths.iter().product();
        if data.len() != expected {
            return Err(CoreError::domain(format!(
                "data length {} does not match axis product {expected}",
                data.len()
            )));
        }
        Ok(Self {
            key,
            axis_lengths,
            data,
        })
    }

    /// Build a scalar entity (all axes length 1).
    pub fn scalar(key: DatabaseKey, value: f64) -> Self {
        Self {
            key,
            axis_lengths: [1; NUMBER_OF_AXES],
            data: vec![value],
        }
    }

    /// Build an entity that varies only along duration.
    pub fn duration_vector(key: DatabaseKey, values: Vec<f64>) -> Result<Self, CoreError> {
        let len = values.len();
        if len != 1 && len != MAX_AXIS_LENGTHS[6] {
            return Err(CoreError::domain(format!(
                "duration vector length {len} is neither 1 nor the maximum {}",
                MAX_AXIS_LENGTHS[6]
            )));
        }
        let mut axis_lengths = [1; NUMBER_OF_AXES];
        axis_lengths[6] = len;
        Ok(Self {
            key,
            axis_lengths,
            data: values,
        })
    }

    pub fn key(&self) -> DatabaseKey {
        self.key
    }

    pub fn length(&self) -> usize {
        self.data.len()
    }

    pub fn axis_length(&self, axis: usize) -> usize {
        self.axis_lengths[axis]
    }

    pub fn axis_lengths(&self) -> &[usize; NUMBER_OF_AXES] {
        &self.axis_lengths
    }

    fn axis_component(&self, axis: usize, index: &AxisTuple) -> Result<usize, CoreError> {
        if self.axis_lengths[axis] == 1 {
            return Ok(0);
        }
        let raw = match axis {
            0 => index.gender as usize,
            1 => index.class as usize,
            2 => index.smoking as usize,
            3 => index.issue_age as usize,
            4 => index.uw_basis as usize,
            5 => index.state.0 as usize,
            6 => index
                .duration
                .ok_or_else(|| CoreError::config("duration-varying entity queried without a duration"))?
                as usize,
            _ => unreachable!(),
        };
        if raw >= self.axis_lengths[axis] {
            return Err(CoreError::domain(format!(
                "axis {axis} component {raw} out of range [0, {})",
                self.axis_lengths[axis]
            )));
        }
        Ok(raw)
    }

    /// Flat data offset corresponding to all axes but duration, with
    /// duration component fixed at 0 (used as the start of a durational
    /// slice).
    fn base_offset(&self, index: &AxisTuple) -> Result<usize, CoreError> {
        let mut offset = 0usize;
        for axis in 0..6 {
            let component = self.axis_component(axis, index)?;
            offset = offset * self.axis_lengths[axis] + component;
        }
        Ok(offset * self.axis_lengths[6])
    }

    /// Look up a single value, resolving every axis (including duration if
    /// this entity varies by it) from `index`.
    pub fn lookup(&self, index: &AxisTuple) -> Result<f64, CoreError> {
        let base = self.base_offset(index)?;
        if self.axis_lengths[6] == 1 {
            return Ok(self.data[base]);
        }
        let duration = self.axis_component(6, index)?;
        Ok(self.data[base + duration])
    }

    /// Return the durational slice of length `length`, starting at
    /// `index`'s non-duration axes. If this entity varies by duration and
    /// its raw duration length is shorter than `length`, the last raw
    /// value is replicated; if longer, the result is truncated. If the
    /// entity is scalar along duration, a constant vector is produced.
    pub fn lookup_vector(&self, index: &AxisTuple, length: usize) -> Result<Vec<f64>, CoreError> {
        let base = self.base_offset(index)?;
        let raw_len = self.axis_lengths[6];
        let mut out = Vec::with_capacity(length);
        for j in 0..length {
            let src = if j < raw_len { j } else { raw_len - 1 };
            out.push(self.data[base + src]);
        }
        Ok(out)
    }

    /// Rebuild this entity with new axis lengths. Each new length must be
    /// 1 or the axis maximum. Expanding an axis from 1 broadcasts the
    /// existing single value across the new axis; contracting an axis to 1
    /// keeps only the slice at component 0 along that axis. Composing two
    /// reshapes is equivalent to reshaping directly to the final shape,
    /// because both broadcast and projection always key off component 0 of
    /// a length-1 axis.
    pub fn reshape(&self, new_axis_lengths: [usize; NUMBER_OF_AXES]) -> Result<Self, CoreError> {
        for (axis, &len) in new_axis_lengths.iter().enumerate() {
            if len != 1 && len != MAX_AXIS_LENGTHS[axis] {
                return Err(CoreError::domain(format!(
                    "axis {axis} length {len} is neither 1 nor the maximum {}",
                    MAX_AXIS_LENGTHS[axis]
                )));
            }
        }
        if new_axis_lengths == self.axis_lengths {
            return Ok(self.clone());
        }

        let new_total: usize = new_axis_lengths.iter().product();
        let mut new_data = Vec::with_capacity(new_total);
        let mut coords = [0usize; NUMBER_OF_AXES];
        for flat in 0..new_total {
            let mut rem = flat;
            for axis in (0..NUMBER_OF_AXES).rev() {
                coords[axis] = rem % new_axis_lengths[axis];
                rem /= new_axis_lengths[axis];
            }
            // Any axis whose old length was 1 reads component 0 regardless
            // of the new coordinate; this is what makes broadcast and
            // projection a single rule.
            let mut old_offset = 0usize;
            for axis in 0..NUMBER_OF_AXES {
                let old_len = self.axis_lengths[axis];
                let component = if old_len == 1 { 0 } else { coords[axis] };
                old_offset = old_offset * old_len + component;
            }
            new_data.push(self.data[old_offset]);
        }

        Ok(Self {
            key: self.key,
            axis_lengths: new_axis_lengths,
            data: new_data,
        })
    }

    /// True iff both entities have identical axis shape and data.
    pub fn equivalent(a: &Self, b: &Self) -> bool {
        a.axis_lengths == b.axis_lengths && a.data == b.data
    }

    /// True iff the state axis (index 5) has length greater than 1.
    pub fn varies_by_state(&self) -> bool {
        self.axis_lengths[5] > 1
    }

    pub fn maximum_dimensions() -> [usize; NUMBER_OF_AXES] {
        MAX_AXIS_LENGTHS
    }
}
