// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate crossbeam;
extern crate env_logger;
extern crate juliaset;
extern crate log;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use juliaset::driver::{self, LogPresenter, Presenter, PreviewFile};
use juliaset::{ColorScheme, Command, Config};
use log::error;
use num::Complex;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const SIZE: &str = "size";
const THREADS: &str = "threads";
const PARTS: &str = "parts";
const CONSTANT: &str = "constant";
const ITERATIONS: &str = "iterations";
const SCHEME: &str = "scheme";
const OUTPUT: &str = "output";
const PREVIEW: &str = "preview";
const INPUT: &str = "input";
const ONCE: &str = "once";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get().max(64);

    App::new("julia")
        .version("0.1.0")
        .about("Interactive Julia set renderer")
        .after_help(
            "Commands are read one per token from stdin (or --input):\n\
             left right up down    pan\n\
             a e                   zoom in, zoom out\n\
             f r                   more, fewer iterations\n\
             d q / z s             real part up, down / imaginary part up, down\n\
             p o                   hue offset up, down\n\
             c                     next color scheme\n\
             w                     save the current frame\n\
             x esc                 quit",
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1024x1024")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse image size"))
                .help("Size of the image"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads"),
        )
        .arg(
            Arg::with_name(PARTS)
                .long(PARTS)
                .short("p")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        4096,
                        "Could not parse part count",
                        "Parts per thread must be between 1 and 4096",
                    )
                })
                .help("Number of chunks each thread's share of the image is cut into"),
        )
        .arg(
            Arg::with_name(CONSTANT)
                .long(CONSTANT)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-1.41702285618,0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse the constant"))
                .help("The constant c, as re,im"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("300")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Starting iteration cap"),
        )
        .arg(
            Arg::with_name(SCHEME)
                .long(SCHEME)
                .takes_value(true)
                .default_value("hue")
                .possible_values(&["gray", "hue", "fire", "ocean", "twilight"])
                .help("Starting color scheme"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value(".")
                .help("Directory saved frames are written to"),
        )
        .arg(
            Arg::with_name(PREVIEW)
                .long(PREVIEW)
                .takes_value(true)
                .help("Image file rewritten with every frame"),
        )
        .arg(
            Arg::with_name(INPUT)
                .long(INPUT)
                .takes_value(true)
                .conflicts_with(ONCE)
                .help("Read commands from this file instead of stdin"),
        )
        .arg(
            Arg::with_name(ONCE)
                .long(ONCE)
                .help("Render and save a single frame, then exit"),
        )
        .get_matches()
}

// Validators have already run, so the parses below cannot fail.
fn config(matches: &ArgMatches) -> Option<Config> {
    let size = parse_pair::<usize>(matches.value_of(SIZE)?, 'x')?;
    Some(Config {
        workers: usize::from_str(matches.value_of(THREADS)?).ok()?,
        parts_per_worker: usize::from_str(matches.value_of(PARTS)?).ok()?,
        width: size.0,
        height: size.1,
        constant: parse_complex(matches.value_of(CONSTANT)?)?,
        max_iterations: u32::from_str(matches.value_of(ITERATIONS)?).ok()?,
        scheme: ColorScheme::from_str(matches.value_of(SCHEME)?).ok()?,
        output_dir: PathBuf::from(matches.value_of(OUTPUT)?),
        ..Config::default()
    })
}

fn run(matches: &ArgMatches, config: &Config) -> juliaset::Result<()> {
    let commands = if matches.is_present(ONCE) {
        let (tx, rx) = crossbeam::channel::unbounded();
        for command in &[Command::Save, Command::Quit] {
            let _ = tx.send(*command);
        }
        rx
    } else if let Some(path) = matches.value_of(INPUT) {
        driver::spawn_input(BufReader::new(File::open(path)?))
    } else {
        driver::spawn_input(BufReader::new(io::stdin()))
    };

    let mut presenter: Box<dyn Presenter> = match matches.value_of(PREVIEW) {
        Some(path) => Box::new(PreviewFile::new(path)),
        None => Box::new(LogPresenter::new()),
    };

    let summary = driver::run(config, commands, presenter.as_mut())?;
    println!("{} frames rendered", summary.frames);
    for path in summary.saved {
        println!("saved {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    let config = match config(&matches) {
        Some(config) => config,
        None => {
            eprintln!("Could not parse arguments");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&matches, &config) {
        error!("{}", e);
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
