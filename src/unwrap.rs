use glam::DVec3;

/// How to round a fractional displacement of exactly one half to an integer.
///
/// This only matters when an atom moves exactly half a lattice vector between two frames, which
/// practically never happens in a real trajectory.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round ties towards positive infinity.
    ///
    /// This is the only rule for which every corrected displacement lies in `[-0.5, 0.5)`.
    #[default]
    HalfUp,
    /// Round ties to the nearest even integer, like numpy's `around`.
    HalfEven,
    /// Round ties away from zero, like [`f64::round`].
    HalfAway,
}

impl Rounding {
    #[inline]
    pub fn round(self, v: f64) -> f64 {
        match self {
            Rounding::HalfUp => {
                let n = v.round();
                // `round` sends -k.5 to -(k + 1), which leaves a remainder of exactly 0.5.
                if v - n == 0.5 {
                    n + 1.0
                } else {
                    n
                }
            }
            Rounding::HalfEven => v.round_ties_even(),
            Rounding::HalfAway => v.round(),
        }
    }

    /// Round each component of `v` to an integer.
    #[inline]
    pub fn round_vec(self, v: DVec3) -> DVec3 {
        DVec3::new(self.round(v.x), self.round(v.y), self.round(v.z))
    }
}

/// Removes periodic wraparound from a trajectory, one frame at a time.
///
/// The unwrapper remembers the previous frame's unwrapped fractional coordinates. Every new frame
/// is shifted by whole lattice vectors such that each atom lands on the periodic image closest to
/// where it was in the previous frame. Because every step depends on the result of the step
/// before it, frames must be passed in the order in which they were recorded.
#[derive(Debug, Default, Clone)]
pub struct Unwrapper {
    previous: Option<Vec<DVec3>>,
    rounding: Rounding,
}

impl Unwrapper {
    pub fn new(rounding: Rounding) -> Self {
        Self {
            previous: None,
            rounding,
        }
    }

    /// Unwrap the fractional `positions` of the next frame in place.
    ///
    /// The first frame passed to an [`Unwrapper`] is left untouched and serves as the reference
    /// for the rest of the trajectory.
    ///
    /// # Panics
    ///
    /// Panics if the number of positions differs from that of the previous frame.
    pub fn unwrap(&mut self, positions: &mut [DVec3]) {
        let Some(previous) = &mut self.previous else {
            self.previous = Some(positions.to_vec());
            return;
        };

        assert_eq!(
            previous.len(),
            positions.len(),
            "the number of atoms must be the same in every frame"
        );
        for (current, prev) in positions.iter_mut().zip(previous.iter_mut()) {
            let delta = *current - *prev;
            *current -= self.rounding.round_vec(delta);
            *prev = *current;
        }
    }

    /// Forget the previous frame, such that the next frame starts a new trajectory.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// The unwrapped fractional coordinates of the most recent frame.
    pub fn previous(&self) -> Option<&[DVec3]> {
        self.previous.as_deref()
    }
}
