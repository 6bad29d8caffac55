use thiserror::Error;

/// Everything that can go wrong while turning an XDATCAR into an xyz trajectory.
///
/// Line numbers, configuration indices and atom indices are all 1-based, such that they can be
/// looked up directly in the input file.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The preamble (title, scale, lattice, species) does not have the expected shape.
    ///
    /// `configuration` is set for a header that is repeated in front of that configuration.
    #[error(
        "malformed header{} at line {line}: {fault}{}",
        configuration_suffix(.configuration),
        quoted(.content)
    )]
    MalformedHeader {
        line: usize,
        configuration: Option<usize>,
        content: Option<String>,
        fault: HeaderFault,
    },

    /// A configuration block could not be read.
    #[error(
        "malformed frame in configuration {configuration}{} at line {line}: {fault}{}",
        atom_suffix(.atom),
        quoted(.content)
    )]
    MalformedFrame {
        configuration: usize,
        atom: Option<usize>,
        line: usize,
        content: Option<String>,
        fault: FrameFault,
    },

    /// An atom selection names a species that does not occur in the trajectory.
    #[error("species '{0}' does not occur in the trajectory")]
    UnknownSpecies(String),
}

fn configuration_suffix(configuration: &Option<usize>) -> String {
    match configuration {
        Some(configuration) => format!(" before configuration {configuration}"),
        None => String::new(),
    }
}

fn atom_suffix(atom: &Option<usize>) -> String {
    match atom {
        Some(atom) => format!(", atom {atom}"),
        None => String::new(),
    }
}

fn quoted(content: &Option<String>) -> String {
    match content {
        Some(content) => format!(" ({content:?})"),
        None => String::new(),
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeaderFault {
    #[error("unexpected end of input, expected the {0}")]
    UnexpectedEof(&'static str),
    #[error("the scale factor must be one real number or three positive real numbers")]
    Scale,
    #[error("lattice vector {0} must consist of exactly three real numbers")]
    LatticeVector(usize),
    #[error("the lattice vectors span no volume")]
    DegenerateLattice,
    #[error("{symbols} species symbols but {counts} species counts")]
    SpeciesMismatch { symbols: usize, counts: usize },
    #[error("species counts must be non-negative integers")]
    SpeciesCount,
    #[error("the repeated header lists different species than the first header")]
    SpeciesChanged,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameFault {
    #[error("expected a configuration line")]
    MissingDelimiter,
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("expected 3 coordinates, found {0}")]
    TokenCount(usize),
    #[error("could not parse {0:?} as a real number")]
    Number(String),
}

pub type Result<T> = std::result::Result<T, Error>;
