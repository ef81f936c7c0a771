//! Replays recorded Vu8 frames through the beam calibration filter.
//!
//! Usage: `replay [CALIBRATION_TOML] [FRAMES]`
//!
//! Without a calibration file the built-in reference capture is used. Frames are read
//! from `FRAMES` or stdin, one per line, either as a JSON array of distances, a JSON array
//! of echo records, or plain comma/whitespace separated distances. Each calibrated frame
//! is written to stdout as a JSON array.

use std::{
    env,
    fs::File,
    io::{self, prelude::*, BufReader},
};

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};

use leddar_vu8::{raw_frame, BeamCalibrationFilter, CalibrationFile, Echo};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();

    let calibration = match args.first() {
        Some(path) => CalibrationFile::load(path)?,
        None => {
            info!("no calibration file given, using the reference capture");
            CalibrationFile::reference()
        }
    };
    let mut filter = calibration.build_filter()?;
    debug!("offsets: {:?}", filter.offsets());

    let input: Box<dyn BufRead> = match args.get(1) {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("cannot open frames file {}", path))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let (processed, dropped) = replay(&mut filter, input, stdout.lock())?;

    info!("{} frames processed, {} dropped", processed, dropped);
    Ok(())
}

/// Feeds every frame of `input` through `filter`, writing one JSON array per frame.
///
/// Returns the number of processed and dropped frames. Undecodable or mis-shaped lines are
/// dropped with a warning, only I/O errors abort.
fn replay<R: BufRead, W: Write>(
    filter: &mut BeamCalibrationFilter,
    input: R,
    mut out: W,
) -> Result<(usize, usize)> {
    let (mut processed, mut dropped) = (0usize, 0usize);

    for (line_no, bytes) in input.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line.trim(),
            Err(error) => {
                warn!("line {}: {}. Frame dropped.", line_no + 1, error);
                dropped += 1;
                continue;
            }
        };
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let frame = match parse_frame(line, filter.beam_count()) {
            Ok(frame) => frame,
            Err(error) => {
                warn!("line {}: {}. Frame dropped.", line_no + 1, error);
                dropped += 1;
                continue;
            }
        };

        match filter.process(&frame) {
            Ok(calibrated) => {
                writeln!(out, "{}", serde_json::to_string(&calibrated)?)?;
                processed += 1;
            }
            Err(error) => {
                warn!("line {}: {}. Frame dropped.", line_no + 1, error);
                dropped += 1;
            }
        }
    }

    Ok((processed, dropped))
}

fn parse_frame(line: &str, beam_count: usize) -> Result<Vec<f64>> {
    if line.starts_with('[') {
        if let Ok(distances) = serde_json::from_str::<Vec<f64>>(line) {
            return Ok(distances);
        }
        let echoes: Vec<Echo> =
            serde_json::from_str(line).context("neither a distance array nor echo records")?;
        return Ok(raw_frame(&echoes, beam_count)?);
    }

    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| anyhow!("invalid distance {:?}", token))
        })
        .collect()
}
