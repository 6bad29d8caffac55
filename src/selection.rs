use std::num::{NonZeroU64, ParseIntError};
use std::str::FromStr;

use crate::error::{Error, Result};

/// A selection of atoms to write out.
///
/// Selecting atoms only affects the output. Every atom is always read and unwrapped.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum AtomSelection {
    /// Include all atoms.
    #[default]
    All,
    /// A mask of the atoms to include in the selection.
    ///
    /// If the value of the mask at an index `n` is `true`, the atom at that same index `n` is
    /// included in the selection. Atoms beyond the end of the mask are excluded.
    Mask(Vec<bool>),
    /// Include all atoms of the listed species.
    Species(Vec<String>),
}

impl AtomSelection {
    /// Create a boolean mask from a list of 0-based atom indices.
    pub fn from_index_list(indices: &[u32]) -> Self {
        let max = match indices.iter().max() {
            Some(&max) => max as usize + 1,
            None => return Self::Mask(Vec::new()),
        };
        let mut mask = vec![false; max];
        for &idx in indices {
            mask[idx as usize] = true;
        }

        Self::Mask(mask)
    }

    /// Resolve this selection against the per-atom `labels` of a trajectory into a mask with
    /// exactly one entry per atom.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSpecies`] if a selected species does not occur in `labels`.
    pub fn resolve(&self, labels: &[String]) -> Result<Vec<bool>> {
        match self {
            AtomSelection::All => Ok(vec![true; labels.len()]),
            AtomSelection::Mask(mask) => Ok((0..labels.len())
                .map(|idx| mask.get(idx).copied().unwrap_or_default())
                .collect()),
            AtomSelection::Species(species) => {
                if let Some(missing) = species.iter().find(|s| !labels.contains(*s)) {
                    return Err(Error::UnknownSpecies(missing.clone()));
                }
                Ok(labels.iter().map(|label| species.contains(label)).collect())
            }
        }
    }
}

/// A selection of frames to write out, by their 0-based position in the trajectory.
///
/// Unselected frames are still unwrapped, since every frame depends on the one before it.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum FrameSelection {
    /// Include all frames that are in a trajectory.
    #[default]
    All,
    /// Include frames that lie within a certain [`Range`].
    Range(Range),
    /// Include frames that match the indices in this list.
    ///
    /// The indices must be unique and sorted, otherwise frames after the first out-of-order index
    /// are silently dropped. Use [`FrameSelection::from_frame_list`] for indices in any order.
    FrameList(Vec<usize>),
}

impl FrameSelection {
    /// Select the frames at `indices`, which may be given in any order and may repeat.
    pub fn from_frame_list(mut indices: Vec<usize>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Self::FrameList(indices)
    }

    /// Determine whether some index `idx` is included in this [`FrameSelection`].
    ///
    /// Will return [`None`] once the index is beyond the scope of this `FrameSelection`.
    pub fn is_included(&self, idx: usize) -> Option<bool> {
        match self {
            FrameSelection::All => Some(true),
            FrameSelection::Range(range) => range.is_included(idx as u64),
            FrameSelection::FrameList(indices) => {
                if *indices.last()? < idx {
                    None
                } else {
                    Some(indices.binary_search(&idx).is_ok())
                }
            }
        }
    }
}

impl FromStr for FrameSelection {
    type Err = ParseIntError;

    /// Parse a selection in the format `start:stop:step`, where each value is optional.
    ///
    /// - `:100` selects the first 100 frames.
    /// - `3:14` selects the 4th up to and including the 14th frame, 11 frames in total.
    /// - `:100:2` selects every second frame from the first 100 frames, 50 in total.
    fn from_str(selection: &str) -> std::result::Result<Self, Self::Err> {
        let mut components = selection.split(':');
        let mut next = || components.next().filter(|s| !s.trim().is_empty());
        let start = next().map(|s| s.trim().parse()).transpose()?;
        let end = next().map(|s| s.trim().parse()).transpose()?;
        let step = next().map(|s| NonZeroU64::from_str(s.trim())).transpose()?;
        Ok(FrameSelection::Range(Range::new(start, end, step)))
    }
}

/// A range of frames.
///
/// The `start` of a [`Range`] is always bounded, and is zero by default.
/// The `end` may be bounded or unbounded. In case the end is unbounded ([`None`]), the range
/// extends up to and including the last frame.
/// The `step` describes the number of frames that passed in each stride.
/// For instance, given a `step` of four, one frame is included and the following three are
/// skipped.
///
/// # Note
///
/// An instance where `start` > `end` is a valid `Range`, but it will not make much sense,
/// since the `Range` will be understood to include zero frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// The `start` of a [`Range`] is always bounded, and is zero by default.
    pub start: u64,
    /// The exclusive `end` of the range, if it is bounded.
    pub end: Option<u64>,
    /// The `step` describes the number of frames that passed in each stride.
    pub step: NonZeroU64,
}

impl Range {
    pub fn new(start: Option<u64>, end: Option<u64>, step: Option<NonZeroU64>) -> Self {
        let mut sel = Self {
            end,
            ..Self::default()
        };
        if let Some(start) = start {
            sel.start = start;
        }
        if let Some(step) = step {
            sel.step = step;
        }
        sel
    }

    fn is_included(&self, idx: u64) -> Option<bool> {
        if let Some(end) = self.end {
            // Determine whether `idx` is already beyond the defined range.
            if end <= idx {
                return None;
            }
        }
        if idx < self.start {
            return Some(false);
        }
        Some((idx - self.start) % self.step == 0)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self {
            start: 0,
            end: None,
            step: NonZeroU64::MIN,
        }
    }
}
