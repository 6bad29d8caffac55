use glam::DVec3;
use xdatunwrap::{Error, HeaderFault, HeaderMode, XdatcarReader};

mod common;
use common::trajectories;

fn open(path: impl AsRef<std::path::Path>, mode: HeaderMode) -> xdatunwrap::Result<()> {
    let reader = XdatcarReader::open(&path, mode)?;
    let header = reader.header();
    assert_eq!(header.title, "LiCl test cell");
    assert_eq!(header.species, ["Li", "Cl"]);
    assert_eq!(header.counts, [2, 2]);
    assert_eq!(header.labels, ["Li", "Li", "Cl", "Cl"]);
    assert_eq!(header.natoms(), 4);
    assert_eq!(
        header.lattice.vectors(),
        [
            DVec3::new(10.0, 0.0, 0.0),
            DVec3::new(0.0, 10.0, 0.0),
            DVec3::new(0.0, 0.0, 10.0)
        ]
    );
    Ok(())
}

#[test]
fn open_once() -> xdatunwrap::Result<()> {
    open(trajectories::ONCE, HeaderMode::Once)
}

#[test]
fn open_per_frame() -> xdatunwrap::Result<()> {
    open(trajectories::PER_FRAME, HeaderMode::PerFrame)
}

#[test]
fn open_missing_file() {
    let err = XdatcarReader::open("tests/trajectories/does_not_exist", HeaderMode::Once)
        .expect_err("opening a missing file should fail");
    assert!(matches!(err, Error::Io(_)), "{err:?}");
}

fn header_fault(text: &str) -> (usize, HeaderFault) {
    match XdatcarReader::new(text.as_bytes(), HeaderMode::Once) {
        Err(Error::MalformedHeader {
            line,
            configuration,
            fault,
            ..
        }) => {
            // The first header does not belong to any configuration.
            assert_eq!(configuration, None);
            (line, fault)
        }
        Err(err) => panic!("expected a malformed header, found {err:?}"),
        Ok(_) => panic!("expected a malformed header, but the header was read"),
    }
}

const HEADER: &str = "\
title
1.0
3.0 0.0 0.0
0.0 3.0 0.0
0.0 0.0 3.0
Na Cl
1 1
";

#[test]
fn empty_input() {
    assert_eq!(header_fault(""), (1, HeaderFault::UnexpectedEof("title line")));
}

#[test]
fn bad_scale() {
    assert_eq!(
        header_fault(&HEADER.replace("\n1.0\n", "\none\n")),
        (2, HeaderFault::Scale)
    );
    assert_eq!(
        header_fault(&HEADER.replace("\n1.0\n", "\n0\n")),
        (2, HeaderFault::Scale)
    );
    // Two values, and three values of which one is not positive.
    assert_eq!(
        header_fault(&HEADER.replace("\n1.0\n", "\n1.0 2.0\n")),
        (2, HeaderFault::Scale)
    );
    assert_eq!(
        header_fault(&HEADER.replace("\n1.0\n", "\n2 -1 3\n")),
        (2, HeaderFault::Scale)
    );
}

fn read_lattice(text: &str) -> xdatunwrap::Result<[DVec3; 3]> {
    let reader = XdatcarReader::new(text.as_bytes(), HeaderMode::Once)?;
    Ok(reader.header().lattice.vectors())
}

#[test]
fn scale_factor() -> xdatunwrap::Result<()> {
    let vectors = read_lattice(&HEADER.replace("\n1.0\n", "\n2.0\n"))?;
    assert_eq!(vectors[1], DVec3::new(0.0, 6.0, 0.0));
    Ok(())
}

#[test]
fn scale_per_axis() -> xdatunwrap::Result<()> {
    let text = HEADER.replace("\n1.0\n", "\n2.0 3.0 4.0\n");
    let reader = XdatcarReader::new(text.as_bytes(), HeaderMode::Once)?;
    assert_eq!(reader.header().scale, [2.0, 3.0, 4.0]);
    assert_eq!(
        reader.header().lattice.vectors(),
        [
            DVec3::new(6.0, 0.0, 0.0),
            DVec3::new(0.0, 9.0, 0.0),
            DVec3::new(0.0, 0.0, 12.0)
        ]
    );
    Ok(())
}

#[test]
fn scale_as_volume() -> xdatunwrap::Result<()> {
    // The unscaled cell holds 27 cubic Ångström, so a volume of 216 doubles every vector.
    let vectors = read_lattice(&HEADER.replace("\n1.0\n", "\n-216.0\n"))?;
    for (v, expected) in vectors.iter().zip([DVec3::X, DVec3::Y, DVec3::Z]) {
        assert!(v.abs_diff_eq(expected * 6.0, 1e-9), "{v}");
    }
    Ok(())
}

#[test]
fn bad_lattice_vectors() {
    assert_eq!(
        header_fault(&HEADER.replace("3.0 0.0 0.0", "3.0 0.0")),
        (3, HeaderFault::LatticeVector(1))
    );
    assert_eq!(
        header_fault(&HEADER.replace("0.0 0.0 3.0", "0.0 0.0 3.0 1.0")),
        (5, HeaderFault::LatticeVector(3))
    );
    assert_eq!(
        header_fault(&HEADER.replace("0.0 3.0 0.0", "0.0 x 0.0")),
        (4, HeaderFault::LatticeVector(2))
    );
}

#[test]
fn degenerate_lattice_with_volume() {
    let text = HEADER
        .replace("\n1.0\n", "\n-27.0\n")
        .replace("0.0 0.0 3.0", "0.0 0.0 0.0");
    assert_eq!(header_fault(&text), (5, HeaderFault::DegenerateLattice));
}

#[test]
fn species_mismatch() {
    assert_eq!(
        header_fault(&HEADER.replace("1 1", "1 1 1")),
        (
            7,
            HeaderFault::SpeciesMismatch {
                symbols: 2,
                counts: 3
            }
        )
    );
}

#[test]
fn bad_species_count() {
    assert_eq!(
        header_fault(&HEADER.replace("1 1", "1 -1")),
        (7, HeaderFault::SpeciesCount)
    );
}

#[test]
fn truncated_header() {
    let text = HEADER.replace("1 1\n", "");
    assert_eq!(header_fault(&text), (7, HeaderFault::UnexpectedEof("species counts")));
}

#[test]
fn header_without_frames() -> xdatunwrap::Result<()> {
    let mut reader = XdatcarReader::new(HEADER.as_bytes(), HeaderMode::Once)?;
    assert_eq!(reader.header().natoms(), 2);
    assert_eq!(reader.frames().count(), 0);
    Ok(())
}
