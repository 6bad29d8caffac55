use std::io::{self, BufRead};

use glam::DVec3;

use crate::error::{Error, FrameFault, HeaderFault, Result};
use crate::lattice::Lattice;

/// A line-oriented cursor over a [`BufRead`] with a lookahead of one line.
///
/// Peeking lets the parsers decide what a line is before committing to it, so the underlying
/// reader never has to seek. This means stdin and pipes are read just like files.
#[derive(Debug)]
pub struct Lines<R> {
    inner: R,
    peeked: Option<String>,
    /// The number of lines that have been consumed so far.
    consumed: usize,
}

impl<R: BufRead> Lines<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            peeked: None,
            consumed: 0,
        }
    }

    /// Look at the next line without consuming it. Line endings are stripped.
    ///
    /// Returns [`None`] at the end of the input.
    pub fn peek(&mut self) -> io::Result<Option<&str>> {
        if self.peeked.is_none() {
            let mut buf = String::new();
            if self.inner.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            let len = buf.trim_end_matches(['\n', '\r']).len();
            buf.truncate(len);
            self.peeked = Some(buf);
        }
        Ok(self.peeked.as_deref())
    }

    /// Consume and return the next line. Line endings are stripped.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        self.peek()?;
        let line = self.peeked.take();
        if line.is_some() {
            self.consumed += 1;
        }
        Ok(line)
    }

    /// Skip over any lines that contain only whitespace.
    pub fn skip_blank(&mut self) -> io::Result<()> {
        while let Some(line) = self.peek()? {
            if !line.trim().is_empty() {
                break;
            }
            self.next_line()?;
        }
        Ok(())
    }

    /// The 1-based number of the line that was consumed last.
    pub fn line_number(&self) -> usize {
        self.consumed
    }

    /// The 1-based number of the line that will be consumed next.
    pub fn next_line_number(&self) -> usize {
        self.consumed + 1
    }
}

/// The preamble of an XDATCAR.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub title: String,
    /// The scale factor(s) exactly as they were written.
    pub scale: Vec<f64>,
    /// The lattice with the scale factor already applied.
    pub lattice: Lattice,
    pub species: Vec<String>,
    pub counts: Vec<usize>,
    /// One element symbol per atom, in the order the atoms appear in every frame.
    pub labels: Vec<String>,
}

impl Header {
    /// The number of atoms in every frame.
    pub fn natoms(&self) -> usize {
        self.labels.len()
    }

    /// Whether `other` describes the same atoms, in the same order, as `self`.
    pub fn same_species(&self, other: &Header) -> bool {
        self.species == other.species && self.counts == other.counts
    }
}

fn header_error(line: usize, content: Option<String>, fault: HeaderFault) -> Error {
    Error::MalformedHeader {
        line,
        configuration: None,
        content,
        fault,
    }
}

fn expect_header_line<R: BufRead>(lines: &mut Lines<R>, what: &'static str) -> Result<String> {
    match lines.next_line()? {
        Some(line) => Ok(line),
        None => Err(header_error(
            lines.next_line_number(),
            None,
            HeaderFault::UnexpectedEof(what),
        )),
    }
}

fn parse_reals(line: &str) -> Option<Vec<f64>> {
    line.split_whitespace()
        .map(|token| token.parse::<f64>().ok())
        .collect()
}

/// Parse the preamble: title, scale, three lattice vectors, species symbols and species counts.
pub fn read_header<R: BufRead>(lines: &mut Lines<R>) -> Result<Header> {
    let title = expect_header_line(lines, "title line")?.trim().to_string();

    let scale_line = expect_header_line(lines, "scale factor")?;
    let scale = match parse_reals(&scale_line) {
        Some(scale) if scale.len() == 1 && scale[0] != 0.0 => scale,
        Some(scale) if scale.len() == 3 && scale.iter().all(|&s| s > 0.0) => scale,
        _ => {
            return Err(header_error(
                lines.line_number(),
                Some(scale_line),
                HeaderFault::Scale,
            ))
        }
    };

    let mut vectors = [DVec3::ZERO; 3];
    for (i, vector) in vectors.iter_mut().enumerate() {
        let line = expect_header_line(lines, "lattice vectors")?;
        match parse_reals(&line).as_deref() {
            Some(&[x, y, z]) => *vector = DVec3::new(x, y, z),
            _ => {
                return Err(header_error(
                    lines.line_number(),
                    Some(line),
                    HeaderFault::LatticeVector(i + 1),
                ))
            }
        }
    }
    let unscaled = Lattice::new(vectors[0], vectors[1], vectors[2]);
    let lattice = match scale[..] {
        [x, y, z] => unscaled.scaled_per_axis(DVec3::new(x, y, z)),
        // A negative scale factor is the volume of the cell.
        [volume] if volume < 0.0 => {
            let unscaled_volume = unscaled.volume();
            if unscaled_volume == 0.0 {
                return Err(header_error(
                    lines.line_number(),
                    None,
                    HeaderFault::DegenerateLattice,
                ));
            }
            unscaled.scaled((-volume / unscaled_volume).cbrt())
        }
        [factor] => unscaled.scaled(factor),
        _ => unreachable!("the scale was validated to hold one or three values"),
    };

    let species_line = expect_header_line(lines, "species symbols")?;
    let species: Vec<String> = species_line
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let counts_line = expect_header_line(lines, "species counts")?;
    let counts = counts_line
        .split_whitespace()
        .map(|token| token.parse::<usize>().ok())
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| {
            header_error(
                lines.line_number(),
                Some(counts_line.clone()),
                HeaderFault::SpeciesCount,
            )
        })?;
    if species.len() != counts.len() {
        return Err(header_error(
            lines.line_number(),
            Some(counts_line),
            HeaderFault::SpeciesMismatch {
                symbols: species.len(),
                counts: counts.len(),
            },
        ));
    }

    let labels = species
        .iter()
        .zip(&counts)
        .flat_map(|(symbol, &count)| std::iter::repeat(symbol.clone()).take(count))
        .collect();

    Ok(Header {
        title,
        scale,
        lattice,
        species,
        counts,
        labels,
    })
}

/// Whether `line` marks the start of a configuration block, e.g. `Direct configuration=     1`.
pub fn is_configuration_line(line: &str) -> bool {
    line.to_lowercase().contains("configuration")
}

/// Read the step number from a configuration line, if it has one.
pub fn configuration_step(line: &str) -> Option<u64> {
    let (_, step) = line.split_once('=')?;
    step.split_whitespace().next()?.parse().ok()
}

/// Parse one line of three fractional coordinates.
///
/// The error that is returned is only the [`FrameFault`]. The caller knows where in the frame
/// the line was found.
pub fn parse_coordinates(line: &str) -> std::result::Result<DVec3, FrameFault> {
    let mut tokens = [""; 3];
    let mut ntokens = 0;
    for token in line.split_whitespace() {
        if ntokens < 3 {
            tokens[ntokens] = token;
        }
        ntokens += 1;
    }
    if ntokens != 3 {
        return Err(FrameFault::TokenCount(ntokens));
    }

    let mut coords = [0.0; 3];
    for (coord, token) in coords.iter_mut().zip(tokens) {
        *coord = token
            .parse()
            .map_err(|_| FrameFault::Number(token.to_string()))?;
    }
    Ok(DVec3::from_array(coords))
}
