//! ASME B36.10 pipe sizes, Schedule 40 and 80.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Schedule {
    #[default]
    Sch40,
    Sch80,
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Sch40 => f.write_str("40"),
            Schedule::Sch80 => f.write_str("80"),
        }
    }
}

impl FromStr for Schedule {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.trim_start_matches("sch").trim_start_matches("edule").trim() {
            "40" | "std" => Ok(Schedule::Sch40),
            "80" | "xs" => Ok(Schedule::Sch80),
            _ => Err("unknown pipe schedule"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipeSize {
    /// Nominal pipe size in inches.
    pub nominal_in: f64,
    pub schedule: Schedule,
    pub internal_mm: f64,
}

const SCH40: &[(f64, f64)] = &[
    (0.5, 15.80),
    (0.75, 20.93),
    (1.0, 26.64),
    (1.25, 35.05),
    (1.5, 40.89),
    (2.0, 52.50),
    (2.5, 62.71),
    (3.0, 77.93),
    (4.0, 102.26),
    (5.0, 128.19),
    (6.0, 154.05),
    (8.0, 202.72),
    (10.0, 254.51),
    (12.0, 303.23),
    (14.0, 333.35),
    (16.0, 381.00),
    (18.0, 428.65),
    (20.0, 477.82),
    (24.0, 574.65),
];

const SCH80: &[(f64, f64)] = &[
    (0.5, 13.87),
    (0.75, 18.85),
    (1.0, 24.31),
    (1.25, 32.46),
    (1.5, 38.10),
    (2.0, 49.25),
    (2.5, 59.00),
    (3.0, 73.66),
    (4.0, 97.18),
    (5.0, 122.25),
    (6.0, 146.33),
    (8.0, 193.68),
    (10.0, 242.87),
    (12.0, 288.90),
    (14.0, 317.50),
    (16.0, 363.52),
    (18.0, 409.60),
    (20.0, 455.62),
    (24.0, 547.68),
];

/// Sizes for a schedule, ascending by internal diameter.
pub fn pipe_sizes(schedule: Schedule) -> impl Iterator<Item = PipeSize> {
    let table = match schedule {
        Schedule::Sch40 => SCH40,
        Schedule::Sch80 => SCH80,
    };
    table.iter().map(move |&(nominal_in, internal_mm)| PipeSize {
        nominal_in,
        schedule,
        internal_mm,
    })
}
