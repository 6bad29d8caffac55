//! Unwrap an XDATCAR trajectory into a continuous xyz trajectory.
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::{error, info, Level};
use xdatunwrap::{unwrap_trajectory, AtomSelection, FrameSelection, HeaderMode, Options, Rounding};

fn atom_selection_parser(selection: &str) -> Result<AtomSelection, ParseIntError> {
    let indices = selection
        .split(',')
        .map(|s| s.trim().parse())
        .collect::<Result<Vec<u32>, _>>()?;
    Ok(AtomSelection::from_index_list(&indices))
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeaderModeArg {
    /// The header appears once at the top of the file.
    Once,
    /// The header is repeated before every configuration.
    PerFrame,
}

impl From<HeaderModeArg> for HeaderMode {
    fn from(mode: HeaderModeArg) -> Self {
        match mode {
            HeaderModeArg::Once => HeaderMode::Once,
            HeaderModeArg::PerFrame => HeaderMode::PerFrame,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoundingArg {
    /// Ties towards positive infinity.
    HalfUp,
    /// Ties to even, like numpy.
    HalfEven,
    /// Ties away from zero.
    HalfAway,
}

impl From<RoundingArg> for Rounding {
    fn from(rounding: RoundingArg) -> Self {
        match rounding {
            RoundingArg::HalfUp => Rounding::HalfUp,
            RoundingArg::HalfEven => Rounding::HalfEven,
            RoundingArg::HalfAway => Rounding::HalfAway,
        }
    }
}

/// Unwrap a VASP XDATCAR trajectory across the periodic boundaries and write it as xyz.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Input path (XDATCAR). Use `-` to read from standard input.
    #[arg(default_value = "XDATCAR")]
    input: PathBuf,

    /// Output path (xyz). Use `-` to write to standard output.
    ///
    /// Defaults to the input path with `.xyz` appended, or standard output when reading from
    /// standard input.
    output: Option<PathBuf>,

    /// Whether the header appears once, or is repeated before every configuration.
    #[arg(long, value_enum, default_value_t = HeaderModeArg::Once)]
    header_mode: HeaderModeArg,

    /// How to round displacements of exactly half a lattice vector.
    #[arg(long, value_enum, default_value_t = RoundingArg::HalfUp)]
    rounding: RoundingArg,

    /// Frame selection in the format `start:stop:step`. Each of these values optional.
    ///
    /// All frames are unwrapped, but only the selected frames are written.
    ///
    /// - `:100` will select the first 100 frames.
    ///
    /// - `3:14` will select the 4th up to and including the 14th frames, 11 frames in total.
    ///
    /// - `:100:2` will select every second frame from the the first 100 frames, 50 in total.
    #[arg(short, long)]
    frame_selection: Option<FrameSelection>,

    /// Comma-separated list of 0-based atom indices to write.
    #[arg(short, long, value_parser = atom_selection_parser, conflicts_with = "species")]
    atoms: Option<AtomSelection>,

    /// Comma-separated list of species to write, e.g. `Li,Cl`.
    #[arg(short, long, value_delimiter = ',')]
    species: Vec<String>,

    /// Log more. Can be repeated.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn options(&self) -> Options {
        let atom_selection = match &self.atoms {
            Some(atoms) => atoms.clone(),
            None if !self.species.is_empty() => AtomSelection::Species(self.species.clone()),
            None => AtomSelection::All,
        };
        Options {
            header_mode: self.header_mode.into(),
            rounding: self.rounding.into(),
            frame_selection: self.frame_selection.clone().unwrap_or_default(),
            atom_selection,
        }
    }

    fn log_level(&self) -> Level {
        match (self.quiet, self.verbose) {
            (true, _) => Level::ERROR,
            (false, 0) => Level::INFO,
            (false, 1) => Level::DEBUG,
            (false, _) => Level::TRACE,
        }
    }

    fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(output) => output.clone(),
            None if is_stdio(&self.input) => PathBuf::from("-"),
            None => {
                let mut output = self.input.clone().into_os_string();
                output.push(".xyz");
                output.into()
            }
        }
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Log to stderr, since the trajectory itself may go to stdout.
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> xdatunwrap::Result<()> {
    let output_path = args.output_path();
    let input: Box<dyn BufRead> = if is_stdio(&args.input) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(&args.input)?))
    };
    let output: Box<dyn Write> = if is_stdio(&output_path) {
        Box::new(BufWriter::new(std::io::stdout().lock()))
    } else {
        Box::new(BufWriter::new(File::create(&output_path)?))
    };

    info!(
        "unwrapping {} into {}",
        args.input.display(),
        output_path.display()
    );
    let summary = unwrap_trajectory(input, output, &args.options())?;
    info!(
        "wrote {} of {} configurations ({} atoms each)",
        summary.frames_written, summary.frames_read, summary.natoms
    );

    Ok(())
}
