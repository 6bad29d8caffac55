#![allow(dead_code)]

use glam::DVec3;

pub mod trajectories {
    pub const ONCE: &str = "tests/trajectories/LiCl_once.XDATCAR";
    pub const PER_FRAME: &str = "tests/trajectories/LiCl_per_frame.XDATCAR";
}

/// The unwrapped Cartesian positions of both LiCl test trajectories.
///
/// The first Li crosses the a1 boundary backwards, the second Li crosses a1 forwards and a2
/// backwards.
pub fn licl_expected() -> Vec<Vec<DVec3>> {
    vec![
        vec![
            DVec3::new(1.0, 5.0, 5.0),
            DVec3::new(9.8, 0.2, 5.0),
            DVec3::new(2.5, 2.5, 2.5),
            DVec3::new(7.5, 7.5, 7.5),
        ],
        vec![
            DVec3::new(-0.5, 5.0, 5.0),
            DVec3::new(10.3, -0.3, 5.0),
            DVec3::new(2.6, 2.5, 2.5),
            DVec3::new(7.4, 7.5, 7.6),
        ],
        vec![
            DVec3::new(-1.5, 5.0, 5.0),
            DVec3::new(10.8, -1.0, 5.0),
            DVec3::new(2.7, 2.5, 2.5),
            DVec3::new(7.3, 7.5, 7.7),
        ],
    ]
}

/// One frame of a parsed xyz trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct XyzFrame {
    pub natoms: usize,
    pub comment: String,
    pub labels: Vec<String>,
    pub positions: Vec<DVec3>,
}

/// Parse the xyz output back into frames.
pub fn parse_xyz(text: &str) -> Vec<XyzFrame> {
    let mut lines = text.lines();
    let mut frames = Vec::new();
    while let Some(count) = lines.next() {
        let natoms: usize = count.trim().parse().expect("atom count line");
        let comment = lines.next().expect("comment line").to_string();
        let mut labels = Vec::with_capacity(natoms);
        let mut positions = Vec::with_capacity(natoms);
        for _ in 0..natoms {
            let line = lines.next().expect("atom line");
            let mut tokens = line.split_whitespace();
            labels.push(tokens.next().expect("label").to_string());
            let coords: Vec<f64> = tokens.map(|t| t.parse().expect("coordinate")).collect();
            assert_eq!(coords.len(), 3, "atom line {line:?}");
            positions.push(DVec3::new(coords[0], coords[1], coords[2]));
        }
        frames.push(XyzFrame {
            natoms,
            comment,
            labels,
            positions,
        });
    }
    frames
}

pub fn assert_positions_eq(found: &[DVec3], expected: &[DVec3], tolerance: f64) {
    assert_eq!(found.len(), expected.len(), "number of positions");
    for (i, (f, e)) in found.iter().zip(expected).enumerate() {
        assert!(
            f.abs_diff_eq(*e, tolerance),
            "position {i} is {f}, expected {e}"
        );
    }
}

/// Write an XDATCAR with the given lattice, species and fractional frames.
///
/// When `repeat_header` is set, the header is written again before every configuration after
/// the first, as VASP does for variable-cell runs.
pub fn xdatcar(
    lattice: [DVec3; 3],
    species: &[(&str, usize)],
    frames: &[Vec<DVec3>],
    repeat_header: bool,
) -> String {
    let mut header = String::from("synthetic\n   1.00000000000000\n");
    for v in lattice {
        header.push_str(&format!("  {:14.8} {:14.8} {:14.8}\n", v.x, v.y, v.z));
    }
    let (symbols, counts): (Vec<&str>, Vec<String>) =
        species.iter().map(|&(s, n)| (s, n.to_string())).unzip();
    header.push_str(&format!("   {}\n   {}\n", symbols.join("   "), counts.join("   ")));

    let mut text = header.clone();
    for (i, frame) in frames.iter().enumerate() {
        if repeat_header && i > 0 {
            text.push_str(&header);
        }
        text.push_str(&format!("Direct configuration= {:>5}\n", i + 1));
        for p in frame {
            // Full precision, such that a round trip through the text is exact.
            text.push_str(&format!("  {:?}  {:?}  {:?}\n", p.x, p.y, p.z));
        }
    }
    text
}

/// A small deterministic generator, so the tests need no extra dependencies.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// A value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Continuous fractional paths for `natoms` atoms over `nframes` frames, with per-frame steps of
/// at most `max_step` along each axis. The paths wander freely beyond the unit cell.
pub fn random_walk(seed: u64, natoms: usize, nframes: usize, max_step: f64) -> Vec<Vec<DVec3>> {
    let mut rng = Lcg::new(seed);
    let mut current: Vec<DVec3> = (0..natoms)
        .map(|_| DVec3::new(rng.next_f64(), rng.next_f64(), rng.next_f64()))
        .collect();
    let mut frames = vec![current.clone()];
    for _ in 1..nframes {
        for p in &mut current {
            let step = DVec3::new(rng.next_f64(), rng.next_f64(), rng.next_f64()) * 2.0 - 1.0;
            *p += step * max_step;
        }
        frames.push(current.clone());
    }
    frames
}

/// Wrap every fractional coordinate into [0, 1).
pub fn wrap(frames: &[Vec<DVec3>]) -> Vec<Vec<DVec3>> {
    frames
        .iter()
        .map(|frame| {
            frame
                .iter()
                .map(|p| {
                    let w = p.rem_euclid(DVec3::ONE);
                    // rem_euclid can round up to exactly 1.0 for tiny negative values.
                    DVec3::select(w.cmpge(DVec3::ONE), DVec3::ZERO, w)
                })
                .collect()
        })
        .collect()
}
