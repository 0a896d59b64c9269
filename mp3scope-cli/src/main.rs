// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;
use std::process;

use clap::{App, Arg, ArgMatches};
use log::info;

use mp3scope_core::options::AnalyzerOptions;
use mp3scope_core::util::stats::Categorical;
use mp3scope_mpa::{analyze, build_report, rebuild, Analysis, Report};

fn main() {
    pretty_env_logger::init();

    let matches = App::new("mp3scope")
        .version("1.0")
        .about("Extracts a structural description of an MP3 file, or rebuilds the file from one")
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .value_name("PATH")
                .help("The MP3 file to analyze, or the JSON artifact to reconstruct from")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("PATH")
                .help("Write the JSON artifact, or the reconstructed MP3, to this path")
                .takes_value(true),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .short('d')
                .help("Include the raw bytes of every frame and tag in the artifact"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .short('f')
                .help("Allow overwriting of an existing output path"),
        )
        .arg(
            Arg::new("reconstruct")
                .long("reconstruct")
                .short('r')
                .help("Rebuild an MP3 file from a JSON artifact generated with --data"),
        )
        .arg(Arg::new("hex").long("hex").help("Encode raw bytes as lowercase hexadecimal"))
        .arg(
            Arg::new("legacy-side-info")
                .long("legacy-side-info")
                .help("Place side information at the offsets used by historical analyzers"),
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("ERROR: {}", err);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    let input = Path::new(matches.value_of("input").unwrap());
    let output = matches.value_of("output").map(Path::new);

    if !input.exists() {
        return Err(format!("could not find input file '{}'", input.display()));
    }

    if let Some(output) = output {
        if output.exists() && !matches.is_present("force") {
            return Err(format!(
                "output file '{}' does already exist, pass --force to overwrite",
                output.display()
            ));
        }
    }

    if matches.is_present("reconstruct") {
        reconstruct(input, output)
    }
    else {
        let opts = AnalyzerOptions {
            capture_raw: matches.is_present("data"),
            hex_raw: matches.is_present("hex"),
            legacy_side_info_offset: matches.is_present("legacy-side-info"),
        };

        parse(input, output, &opts)
    }
}

/// Analysis mode: parse the file, print the structural report, optionally write the artifact.
fn parse(input: &Path, output: Option<&Path>, opts: &AnalyzerOptions) -> Result<(), String> {
    let buf = fs::read(input).map_err(|err| format!("could not read '{}': {}", input.display(), err))?;

    let mut parsed_bytes = 0usize;

    let analysis =
        analyze(&buf, opts, &mut |delta| parsed_bytes += delta).map_err(|err| err.to_string())?;

    info!("parsed {} of {} bytes", parsed_bytes, buf.len());
    info!("{} mpeg frames parsed", analysis.n_frames());

    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let report = build_report(&file_name, &analysis, opts);

    pretty_print_report(&report, &analysis);

    if let Some(output) = output {
        println!("Saving JSON output to '{}'...", output.display());

        let json = serde_json::to_string_pretty(&report)
            .map_err(|err| format!("could not serialize the artifact: {}", err))?;

        fs::write(output, json)
            .map_err(|err| format!("could not write '{}': {}", output.display(), err))?;
    }

    Ok(())
}

/// Reconstruction mode: rebuild the MP3 byte stream from a JSON artifact.
fn reconstruct(input: &Path, output: Option<&Path>) -> Result<(), String> {
    let json = fs::read_to_string(input)
        .map_err(|err| format!("could not read '{}': {}", input.display(), err))?;

    let stream = rebuild(&json).map_err(|err| err.to_string())?;

    info!("reconstructed {} bytes", stream.len());

    if let Some(output) = output {
        println!("Saving MP3 output stream to '{}'...", output.display());

        fs::write(output, &stream)
            .map_err(|err| format!("could not write '{}': {}", output.display(), err))?;
    }

    Ok(())
}

fn pretty_print_report(report: &Report, analysis: &Analysis) {
    println!("+ {}", report.file);
    println!("|     Size:     {} bytes", report.size);
    println!("|     Frames:   {}", report.frames);
    println!("|     Encoder:  {}", report.encoder.unwrap_or("Unknown"));

    pretty_print_structure(report, analysis);
    pretty_print_header_info(report);

    println!("-");
}

fn pretty_print_structure(report: &Report, analysis: &Analysis) {
    println!("|");
    println!("| // File Structure //");
    println!("|     Identifier        Position      Length   Percentage");

    let size = report.size as f64;
    let frames_start = analysis.id3v2.as_ref().map_or(0, |id3v2| id3v2.offset);
    let frames_end =
        analysis.records.last().map_or(frames_start, |r| r.position() + r.length());

    if let Some(id3v2) = &analysis.id3v2 {
        pretty_print_region(&format!("ID3v{}", id3v2.version()), 0, id3v2.offset, size);
    }

    pretty_print_region("MPEG frames", frames_start, frames_end - frames_start, size);

    if let Some(position) = analysis.id3v1_position {
        pretty_print_region("ID3v1.1", position, 128, size);
    }
}

fn pretty_print_region(identifier: &str, position: usize, length: usize, size: f64) {
    println!(
        "|     {:<14} {:>10}  {:>10}   {:>9.3}%",
        identifier,
        position,
        length,
        length as f64 / size * 100.0
    );
}

fn pretty_print_header_info(report: &Report) {
    let info = &report.global_header_info;
    let frames = report.frames;

    println!("|");
    println!("| // Global Frame Header Info //");

    println!(
        "|     Frame Length:     {}/{:.3}/{} bytes",
        info.length.min, info.length.avg, info.length.max
    );
    println!("|     Samples:          {:.3} per frame", info.samples.avg);
    println!("|     MPEG Version:     {}", pretty_dominant(&info.version, frames));
    println!("|     MPEG Layer:       {}", pretty_dominant(&info.layer, frames));
    println!("|     CRC:              {}", pretty_dominant_bit(&info.crc, frames, "0"));

    let rate_kind =
        if info.bitrate.min == info.bitrate.max { "CBR" } else { "VBR" };
    println!(
        "|     Bit Rate:         {}/{:.3}/{} kbps ({})",
        info.bitrate.min, info.bitrate.avg, info.bitrate.max, rate_kind
    );
    println!(
        "|     Sample Rate:      {}/{:.3}/{} Hz",
        info.samplerate.min, info.samplerate.avg, info.samplerate.max
    );

    println!("|     Padding:          {}", pretty_dominant_bit(&info.padding, frames, "1"));
    println!("|     Private:          {}", pretty_dominant_bit(&info.private, frames, "1"));
    println!("|     Channel Mode:     {}", pretty_dominant(&info.mode, frames));
    println!("|     Mode Extension:   {}", pretty_dominant(&info.mode_ext, frames));
    println!("|     Copyright:        {}", pretty_dominant_bit(&info.copyright, frames, "1"));
    println!("|     Original:         {}", pretty_dominant_bit(&info.original, frames, "1"));
    println!("|     Emphasis:         {}", pretty_dominant(&info.emphasis, frames));
}

/// The dominant category with its share of all frames, e.g. `JointStereo (99.7%)`.
fn pretty_dominant(categorical: &Categorical, frames: usize) -> String {
    match categorical.dominant() {
        Some((category, count)) => {
            format!("{} ({:.3}%)", category, count as f64 / frames as f64 * 100.0)
        }
        None => "-".to_string(),
    }
}

/// The dominant state of a bit-valued category, rendered as yes/no, e.g. `No (100.0%)`.
fn pretty_dominant_bit(categorical: &Categorical, frames: usize, yes: &str) -> String {
    match categorical.dominant() {
        Some((category, count)) => {
            let state = if category == yes { "Yes" } else { "No" };
            format!("{} ({:.3}%)", state, count as f64 / frames as f64 * 100.0)
        }
        None => "-".to_string(),
    }
}
