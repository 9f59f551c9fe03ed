use std::{convert::TryFrom, path::PathBuf};

use clap::{App, Arg, ArgMatches};
use life_common::{Dimensions, SimulationConfig, Speed};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("--{name} expects an integer, got {value:?}")]
    NotANumber { name: &'static str, value: String },
    #[error("--{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },
    #[error(transparent)]
    Simulation(#[from] life_common::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    pub simulation: SimulationConfig,
    /// JSON setup to load before starting.
    pub file: Option<PathBuf>,
    /// Pause after this many generations.
    pub generations: Option<u32>,
    /// Where to write the final grid as JSON.
    pub output: Option<PathBuf>,
}

pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("life_runner")
        .about("runs a Game of Life simulation in the terminal")
        .arg(
            Arg::with_name("rows")
                .long("rows")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("10")
                .help("number of rows, clamped into 1..=1024"),
        )
        .arg(
            Arg::with_name("cols")
                .long("cols")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("10")
                .help("number of columns, clamped into 1..=1024"),
        )
        .arg(
            Arg::with_name("speed")
                .long("speed")
                .takes_value(true)
                .default_value("1x")
                .help("tick interval: 0.5x, 1x, 2x, 4x or 2000, 1000, 500, 250 (ms)"),
        )
        .arg(
            Arg::with_name("file")
                .long("file")
                .takes_value(true)
                .help("load the starting grid from a JSON array of 0/1 rows"),
        )
        .arg(
            Arg::with_name("generations")
                .long("generations")
                .takes_value(true)
                .help("stop after this many generations"),
        )
        .arg(
            Arg::with_name("pause-on-cycle")
                .long("pause-on-cycle")
                .help("stop once a generation repeats a recent one"),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .takes_value(true)
                .help("write the final grid to this file as JSON"),
        )
}

impl RunnerConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let dimensions = Dimensions::clamped(
            integer(matches, "rows")?.unwrap_or(10),
            integer(matches, "cols")?.unwrap_or(10),
        );
        let speed = matches
            .value_of("speed")
            .map(str::parse::<Speed>)
            .transpose()?
            .unwrap_or_default();
        let generations = integer(matches, "generations")?
            .map(|n| {
                u32::try_from(n).map_err(|_| Error::OutOfRange {
                    name: "generations",
                    value: n,
                    min: 0,
                    max: u32::MAX,
                })
            })
            .transpose()?;

        Ok(Self {
            simulation: SimulationConfig {
                rows: dimensions.rows,
                cols: dimensions.cols,
                speed,
                pause_on_cycle: matches.is_present("pause-on-cycle"),
            },
            file: matches.value_of("file").map(PathBuf::from),
            generations,
            output: matches.value_of("output").map(PathBuf::from),
        })
    }
}

fn integer(matches: &ArgMatches, name: &'static str) -> Result<Option<i64>> {
    matches
        .value_of(name)
        .map(|value| {
            value.trim().parse::<i64>().map_err(|_| Error::NotANumber {
                name,
                value: value.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<RunnerConfig> {
        let mut argv = vec!["life_runner"];
        argv.extend_from_slice(args);
        let matches = app().get_matches_from_safe(argv).unwrap();
        RunnerConfig::from_matches(&matches)
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.file, None);
        assert_eq!(config.generations, None);
        assert_eq!(config.output, None);
    }

    #[test]
    fn reads_every_flag() {
        let config = parse(&[
            "--rows",
            "30",
            "--cols",
            "40",
            "--speed",
            "4x",
            "--file",
            "glider.json",
            "--generations",
            "12",
            "--pause-on-cycle",
            "--output",
            "out.json",
        ])
        .unwrap();
        assert_eq!(config.simulation.rows, 30);
        assert_eq!(config.simulation.cols, 40);
        assert_eq!(config.simulation.speed, Speed::Quadruple);
        assert!(config.simulation.pause_on_cycle);
        assert_eq!(config.file, Some(PathBuf::from("glider.json")));
        assert_eq!(config.generations, Some(12));
        assert_eq!(
            parse(&["--generations", "4294967295"]).unwrap().generations,
            Some(u32::MAX)
        );
        assert_eq!(config.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn clamps_dimensions() {
        let config = parse(&["--rows", "0", "--cols", "-4"]).unwrap();
        assert_eq!(config.simulation.rows, 1);
        assert_eq!(config.simulation.cols, 1);
    }

    #[test]
    fn speed_accepts_millis() {
        let config = parse(&["--speed", "2000"]).unwrap();
        assert_eq!(config.simulation.speed, Speed::Half);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse(&["--rows", "many"]),
            Err(Error::NotANumber { name: "rows", .. })
        ));
        assert!(matches!(
            parse(&["--generations", "4294967296"]),
            Err(Error::OutOfRange {
                name: "generations",
                value: 4294967296,
                ..
            })
        ));
        assert!(matches!(
            parse(&["--generations", "-1"]),
            Err(Error::OutOfRange { value: -1, .. })
        ));
        assert!(matches!(
            parse(&["--speed", "3x"]),
            Err(Error::Simulation(life_common::Error::InvalidSpeed(_)))
        ));
    }
}
