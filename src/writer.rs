use std::fmt::Write as _;
use std::io::{self, Write};

use glam::DVec3;

use crate::lattice::Lattice;

/// Writes unwrapped frames as an xyz trajectory.
///
/// Every frame record consists of the number of atoms, the lattice annotation, and one
/// `label x y z` line per atom. Records are only ever appended.
#[derive(Debug)]
pub struct XyzWriter<W> {
    writer: W,
    annotation: String,
    labels: Vec<String>,
    /// Which atoms to write. Has exactly one entry per label.
    mask: Vec<bool>,
    /// Scratch space in which a full record is formatted before it is written.
    record: String,
}

impl<W: Write> XyzWriter<W> {
    /// Number of digits after the decimal point for the Cartesian coordinates.
    pub const PRECISION: usize = 8;

    /// Create a writer for atoms carrying `labels`, all of which will be written.
    pub fn new(writer: W, lattice: &Lattice, labels: Vec<String>) -> Self {
        let mask = vec![true; labels.len()];
        Self::with_mask(writer, lattice, labels, mask)
    }

    /// Create a writer that only writes the atoms for which `mask` is `true`.
    ///
    /// # Panics
    ///
    /// Panics if `mask` and `labels` differ in length.
    pub fn with_mask(writer: W, lattice: &Lattice, labels: Vec<String>, mask: Vec<bool>) -> Self {
        assert_eq!(
            labels.len(),
            mask.len(),
            "the mask must have exactly one entry per atom"
        );
        Self {
            writer,
            annotation: lattice.annotation(),
            labels,
            mask,
            record: String::new(),
        }
    }

    /// The number of atoms that are written per frame.
    pub fn natoms_selected(&self) -> usize {
        self.mask.iter().filter(|&&include| include).count()
    }

    /// Append one frame of Cartesian `positions` to the output.
    ///
    /// # Panics
    ///
    /// Panics if the number of positions does not match the number of labels.
    pub fn write_frame(&mut self, positions: &[DVec3]) -> io::Result<()> {
        assert_eq!(
            positions.len(),
            self.labels.len(),
            "expected one position per atom"
        );
        let natoms = self.natoms_selected();
        let record = &mut self.record;
        record.clear();
        // Writing into a String cannot fail.
        let _ = writeln!(record, "{natoms}");
        let _ = writeln!(record, "{}", self.annotation);
        let p = Self::PRECISION;
        for ((label, pos), _) in self
            .labels
            .iter()
            .zip(positions)
            .zip(&self.mask)
            .filter(|&(_, &include)| include)
        {
            let _ = writeln!(record, "{label} {:.p$} {:.p$} {:.p$}", pos.x, pos.y, pos.z);
        }
        self.writer.write_all(record.as_bytes())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Unwraps this `XyzWriter<W>`, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
