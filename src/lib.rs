//! Unwrap VASP XDATCAR trajectories.
//!
//! Molecular dynamics codes keep every atom inside the periodic simulation cell. An atom that
//! leaves the cell on one side re-enters it on the other, which shows up in the trajectory as a
//! jump of a full lattice vector. This crate reads an XDATCAR, removes those jumps by applying the
//! minimum-image convention from one frame to the next, and writes the continuous trajectory in
//! Cartesian coordinates as an xyz file with a `Lattice="..."` comment line.
//!
//! ```no_run
//! use xdatunwrap::{Options, unwrap_trajectory};
//!
//! let input = std::io::BufReader::new(std::fs::File::open("XDATCAR")?);
//! let output = std::io::BufWriter::new(std::fs::File::create("XDATCAR.xyz")?);
//! let summary = unwrap_trajectory(input, output, &Options::default())?;
//! println!("wrote {} frames", summary.frames_written);
//! # Ok::<(), xdatunwrap::Error>(())
//! ```
use std::io::{BufRead, Write};
use std::path::Path;

use glam::DVec3;
use tracing::{debug, info, warn};

pub use crate::error::{Error, FrameFault, HeaderFault, Result};
pub use crate::lattice::Lattice;
pub use crate::reader::Header;
pub use crate::selection::{AtomSelection, FrameSelection, Range};
pub use crate::unwrap::{Rounding, Unwrapper};
pub use crate::writer::XyzWriter;

use crate::reader::{
    configuration_step, is_configuration_line, parse_coordinates, read_header, Lines,
};

pub mod error;
pub mod lattice;
pub mod reader;
pub mod selection;
pub mod unwrap;
pub mod writer;

/// Whether the header is written once, or repeated in front of every configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// The header appears once at the top of the file.
    #[default]
    Once,
    /// The header is repeated before every configuration after the first.
    PerFrame,
}

/// One snapshot of the trajectory in fractional coordinates.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Frame {
    /// The 1-based position of this frame in the trajectory.
    pub configuration: usize,
    /// The step number from the configuration line, if it carried one.
    pub step: Option<u64>,
    pub positions: Vec<DVec3>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingFrame,
    Done,
    Failed,
}

/// Reads the frames of an XDATCAR, one at a time.
///
/// The header is read when the reader is created. Frames are then read in a single forward pass.
#[derive(Debug)]
pub struct XdatcarReader<R> {
    lines: Lines<R>,
    header: Header,
    mode: HeaderMode,
    /// The number of frames that have been read so far.
    nframes: usize,
    state: State,
}

impl XdatcarReader<std::io::BufReader<std::fs::File>> {
    pub fn open<P: AsRef<Path>>(path: P, mode: HeaderMode) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::new(std::io::BufReader::new(file), mode)
    }
}

impl<R: BufRead> XdatcarReader<R> {
    /// Create a reader and parse the header.
    pub fn new(reader: R, mode: HeaderMode) -> Result<Self> {
        let mut lines = Lines::new(reader);
        let header = read_header(&mut lines)?;
        info!(
            title = header.title.as_str(),
            natoms = header.natoms(),
            "read header with species {}",
            header
                .species
                .iter()
                .zip(&header.counts)
                .map(|(s, n)| format!("{s}{n}"))
                .collect::<Vec<_>>()
                .join(" ")
        );
        Ok(Self {
            lines,
            header,
            mode,
            nframes: 0,
            state: State::AwaitingFrame,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The number of frames that have been read so far.
    pub fn nframes(&self) -> usize {
        self.nframes
    }

    /// Reads the next [`Frame`] into `frame`.
    ///
    /// Returns `Ok(false)` once the end of the trajectory has been reached. After an error or the
    /// end of the trajectory, no more frames are read.
    ///
    /// If an error is returned, the contents of `frame` are unspecified.
    pub fn read_frame(&mut self, frame: &mut Frame) -> Result<bool> {
        if self.state != State::AwaitingFrame {
            return Ok(false);
        }
        match self.read_frame_inner(frame) {
            Ok(true) => {
                self.nframes += 1;
                Ok(true)
            }
            Ok(false) => {
                self.state = State::Done;
                Ok(false)
            }
            Err(err) => {
                self.state = State::Failed;
                Err(err)
            }
        }
    }

    fn read_frame_inner(&mut self, frame: &mut Frame) -> Result<bool> {
        let configuration = self.nframes + 1;

        self.lines.skip_blank()?;
        if self.lines.peek()?.is_none() {
            return Ok(false);
        }

        if self.mode == HeaderMode::PerFrame && self.nframes > 0 {
            self.read_repeated_header(configuration)?;
        }

        let delimiter = match self.lines.next_line()? {
            Some(line) if is_configuration_line(&line) => line,
            content => {
                return Err(Error::MalformedFrame {
                    configuration,
                    atom: None,
                    line: self.lines.line_number(),
                    fault: match content {
                        Some(_) => FrameFault::MissingDelimiter,
                        None => FrameFault::UnexpectedEof,
                    },
                    content,
                })
            }
        };
        debug!(configuration, "{}", delimiter.trim());

        let natoms = self.header.natoms();
        frame.configuration = configuration;
        frame.step = configuration_step(&delimiter);
        frame.positions.clear();
        frame.positions.reserve(natoms);
        for atom in 1..=natoms {
            let Some(line) = self.lines.next_line()? else {
                return Err(Error::MalformedFrame {
                    configuration,
                    atom: Some(atom),
                    line: self.lines.next_line_number(),
                    content: None,
                    fault: FrameFault::UnexpectedEof,
                });
            };
            match parse_coordinates(&line) {
                Ok(position) => frame.positions.push(position),
                Err(fault) => {
                    return Err(Error::MalformedFrame {
                        configuration,
                        atom: Some(atom),
                        line: self.lines.line_number(),
                        content: Some(line),
                        fault,
                    })
                }
            }
        }

        Ok(true)
    }

    fn read_repeated_header(&mut self, configuration: usize) -> Result<()> {
        let line = self.lines.next_line_number();
        let repeated = read_header(&mut self.lines).map_err(|err| match err {
            Error::MalformedHeader {
                line,
                content,
                fault,
                ..
            } => Error::MalformedHeader {
                line,
                configuration: Some(configuration),
                content,
                fault,
            },
            err => err,
        })?;
        if !self.header.same_species(&repeated) {
            return Err(Error::MalformedHeader {
                line,
                configuration: Some(configuration),
                content: None,
                fault: HeaderFault::SpeciesChanged,
            });
        }
        if repeated.lattice != self.header.lattice {
            warn!(
                configuration,
                "lattice changed, the lattice of the first header is kept"
            );
        }
        self.lines.skip_blank()?;
        Ok(())
    }

    /// Returns an iterator over the remaining frames.
    ///
    /// The iterator ends after the last frame or after the first error.
    pub fn frames(&mut self) -> Frames<'_, R> {
        Frames { reader: self }
    }
}

/// An iterator over the frames of an [`XdatcarReader`].
pub struct Frames<'r, R> {
    reader: &'r mut XdatcarReader<R>,
}

impl<R: BufRead> Iterator for Frames<'_, R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut frame = Frame::default();
        match self.reader.read_frame(&mut frame) {
            Ok(true) => Some(Ok(frame)),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Settings for [`unwrap_trajectory`].
#[derive(Debug, Default, Clone)]
pub struct Options {
    pub header_mode: HeaderMode,
    pub rounding: Rounding,
    /// The frames to write. All frames are unwrapped regardless.
    pub frame_selection: FrameSelection,
    /// The atoms to write. All atoms are unwrapped regardless.
    pub atom_selection: AtomSelection,
}

/// What [`unwrap_trajectory`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub natoms: usize,
    pub frames_read: usize,
    pub frames_written: usize,
}

/// Read an XDATCAR from `input`, unwrap it, and write it as an xyz trajectory to `output`.
///
/// Frames are processed strictly in order. Reading stops at the end of the input, or as soon as
/// the frame selection cannot include any further frames. On error, the frames that were written
/// before it stay written.
pub fn unwrap_trajectory<R: BufRead, W: Write>(
    input: R,
    output: W,
    options: &Options,
) -> Result<Summary> {
    let mut reader = XdatcarReader::new(input, options.header_mode)?;
    let header = reader.header();
    let mask = options.atom_selection.resolve(&header.labels)?;
    let lattice = header.lattice;
    let mut writer = XyzWriter::with_mask(output, &lattice, header.labels.clone(), mask);
    let mut unwrapper = Unwrapper::new(options.rounding);

    let mut summary = Summary {
        natoms: reader.header().natoms(),
        ..Summary::default()
    };
    let mut frame = Frame::default();
    loop {
        // No need to read any further once the selection is exhausted.
        let Some(included) = options.frame_selection.is_included(summary.frames_read) else {
            break;
        };
        if !reader.read_frame(&mut frame)? {
            break;
        }
        summary.frames_read += 1;
        // Every frame is unwrapped, also the ones that are not written.
        unwrapper.unwrap(&mut frame.positions);
        if included {
            writer.write_frame(&lattice.project(&frame.positions))?;
            summary.frames_written += 1;
        }
    }
    writer.flush()?;

    info!(
        frames_read = summary.frames_read,
        frames_written = summary.frames_written,
        atoms_written = writer.natoms_selected(),
        "unwrapped trajectory"
    );
    Ok(summary)
}
