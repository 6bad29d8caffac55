use glam::{DMat3, DVec3};

/// The simulation cell, spanned by the three lattice vectors `a1`, `a2` and `a3`.
///
/// The vectors are stored as the columns of a matrix, such that multiplying the matrix with a
/// fractional coordinate yields its Cartesian position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    matrix: DMat3,
}

impl Lattice {
    pub fn new(a1: DVec3, a2: DVec3, a3: DVec3) -> Self {
        Self {
            matrix: DMat3::from_cols(a1, a2, a3),
        }
    }

    /// Returns the lattice vectors `[a1, a2, a3]`.
    pub fn vectors(&self) -> [DVec3; 3] {
        [self.matrix.x_axis, self.matrix.y_axis, self.matrix.z_axis]
    }

    /// The volume of the cell in cubic Ångström.
    pub fn volume(&self) -> f64 {
        self.matrix.determinant().abs()
    }

    /// Returns a lattice with every vector multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            matrix: self.matrix * factor,
        }
    }

    /// Returns a lattice with the Cartesian x, y and z components of every vector multiplied by
    /// the respective component of `factors`.
    pub fn scaled_per_axis(&self, factors: DVec3) -> Self {
        let [a1, a2, a3] = self.vectors();
        Self::new(a1 * factors, a2 * factors, a3 * factors)
    }

    /// Project a fractional coordinate onto the lattice: `x * a1 + y * a2 + z * a3`.
    #[inline]
    pub fn to_cartesian(&self, frac: DVec3) -> DVec3 {
        self.matrix * frac
    }

    /// Project every fractional coordinate in `fracs` onto the lattice.
    pub fn project(&self, fracs: &[DVec3]) -> Vec<DVec3> {
        fracs.iter().map(|&frac| self.to_cartesian(frac)).collect()
    }

    /// The `Lattice="..."` annotation that goes on the comment line of every xyz frame.
    pub fn annotation(&self) -> String {
        let components = self
            .vectors()
            .iter()
            .flat_map(|v| v.to_array())
            .map(|c| format!("{c:.8}"))
            .collect::<Vec<_>>();
        format!("Lattice=\"{}\"", components.join(" "))
    }
}
