// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Times full-frame renders across a grid of worker counts, chunk
//! counts and constants, and prints one CSV line per render:
//! `workers,parts,re,im,seconds`.

extern crate clap;
extern crate env_logger;
extern crate itertools;
extern crate juliaset;
extern crate num;

use clap::{App, Arg};
use itertools::iproduct;
use juliaset::{Config, IntegralPlane, RenderParams, WorkerPool};
use num::Complex;
use std::str::FromStr;
use std::time::Instant;

const SIZE: &str = "size";
const MAX_THREADS: &str = "max-threads";
const MAX_PARTS: &str = "max-parts";
const ITERATIONS: &str = "iterations";

fn validate<T: FromStr>(s: String) -> Result<(), String> {
    T::from_str(&s)
        .map(|_| ())
        .map_err(|_| format!("Could not parse {:?}", s))
}

fn powers_of_two(limit: usize) -> Vec<usize> {
    (0..).map(|e| 1 << e).take_while(|n| *n <= limit).collect()
}

// -1.0, -0.8, ..., 1.0, computed from integers so the grid is exact.
fn constants() -> Vec<Complex<f64>> {
    iproduct!((-5..=5), (-5..=5))
        .map(|(re, im)| Complex::new(f64::from(re) / 5.0, f64::from(im) / 5.0))
        .collect()
}

fn bench(config: &Config, workers: usize, parts: usize) -> juliaset::Result<()> {
    let pool = WorkerPool::new(workers, parts, config.plane())?;
    let base = config.session()?.params();
    for c in constants() {
        let started = Instant::now();
        pool.render(RenderParams { constant: c, ..base })?;
        println!(
            "{},{},{:.1},{:.1},{:.6}",
            workers,
            parts,
            c.re,
            c.im,
            started.elapsed().as_secs_f64()
        );
    }
    pool.shutdown()
}

fn main() {
    env_logger::init();
    let matches = App::new("julia-bench")
        .version("0.1.0")
        .about("Julia set renderer timing sweep")
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .takes_value(true)
                .default_value("1024")
                .validator(validate::<usize>)
                .help("Side of the square image"),
        )
        .arg(
            Arg::with_name(MAX_THREADS)
                .long(MAX_THREADS)
                .takes_value(true)
                .default_value("16")
                .validator(validate::<usize>)
                .help("Largest worker count; counts are powers of two"),
        )
        .arg(
            Arg::with_name(MAX_PARTS)
                .long(MAX_PARTS)
                .takes_value(true)
                .default_value("512")
                .validator(validate::<usize>)
                .help("Largest parts-per-worker count; counts are powers of two"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .takes_value(true)
                .default_value("300")
                .validator(validate::<u32>)
                .help("Iteration cap"),
        )
        .get_matches();

    let number = |name: &str| usize::from_str(matches.value_of(name).unwrap_or("0")).unwrap_or(0);
    let side = number(SIZE);
    let config = Config {
        width: side,
        height: side,
        max_iterations: number(ITERATIONS) as u32,
        ..Config::default()
    };
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let plane: IntegralPlane = config.plane();
    eprintln!("# {}x{} pixels", plane.0, plane.1);
    println!("workers,parts,re,im,seconds");
    for (workers, parts) in iproduct!(
        powers_of_two(number(MAX_THREADS)),
        powers_of_two(number(MAX_PARTS))
    ) {
        if let Err(e) = bench(&config, workers, parts) {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
    }
}
