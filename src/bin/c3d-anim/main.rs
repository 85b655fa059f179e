//! c3d-anim CLI - inspect recordings, import them into a scene, export back.

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use c3d_anim::core::{Diagnostics, RecordingSource};
use c3d_anim::dict::ParameterDictionary;
use c3d_anim::partition::Partitioner;
use c3d_anim::pipeline::{export_scene, import_batch, BatchReport};
use c3d_anim::prelude::{ExportOptions, ExportScope, ImportOptions, JsonRecordingWriter, MemoryRecording, Scene};
use tracing::{debug, error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const BUILD_STAMP: &str = env!("C3D_ANIM_BUILD_STAMP");

fn env_filter(verbosity: u8) -> EnvFilter {
    let level = match verbosity {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flags;
/// `C3D_ANIM_TRACE=1` adds a chrome trace layer writing `trace.json`.
#[cfg(feature = "chrome-trace")]
fn init_logging(verbosity: u8) -> Option<tracing_chrome::FlushGuard> {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(env_filter(verbosity)).with(fmt_layer);
    if env::var("C3D_ANIM_TRACE").ok().as_deref() != Some("1") {
        let _ = registry.try_init();
        return None;
    }
    let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
        .file("trace.json")
        .build();
    registry.with(chrome_layer).try_init().is_ok().then_some(guard)
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flags.
#[cfg(not(feature = "chrome-trace"))]
fn init_logging(verbosity: u8) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let _ = tracing_subscriber::registry()
        .with(env_filter(verbosity))
        .with(fmt_layer)
        .try_init();
}

/// Parsed command line.
struct Args {
    positional: Vec<String>,
    output: Option<PathBuf>,
    options: Option<PathBuf>,
    scene: Option<PathBuf>,
    selected: Vec<String>,
    start: Option<i64>,
    end: Option<i64>,
}

/// Value of a frame flag such as `--start`.
fn frame_value(flag: &str, value: Option<&String>) -> Result<i64, String> {
    let value = value.ok_or_else(|| format!("{} requires a frame number", flag))?;
    value
        .parse()
        .map_err(|_| format!("{} expects a frame number, got '{}'", flag, value))
}

fn parse_args(raw: &[String]) -> Result<(u8, Args), String> {
    let mut verbosity = 1u8;
    let mut args = Args {
        positional: Vec::new(),
        output: None,
        options: None,
        scene: None,
        selected: Vec::new(),
        start: None,
        end: None,
    };
    let mut it = raw.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-v" | "--verbose" => verbosity = 2,
            "-vv" | "--trace" => verbosity = 3,
            "-q" | "--quiet" => verbosity = 0,
            "-o" | "--output" => args.output = it.next().map(PathBuf::from),
            "--options" => args.options = it.next().map(PathBuf::from),
            "--scene" => args.scene = it.next().map(PathBuf::from),
            "--start" => args.start = Some(frame_value(arg, it.next())?),
            "--end" => args.end = Some(frame_value(arg, it.next())?),
            "--select" => {
                if let Some(name) = it.next() {
                    args.selected.push(name.clone());
                }
            }
            _ => args.positional.push(arg.clone()),
        }
    }
    Ok((verbosity, args))
}

fn main() {
    let raw: Vec<String> = env::args().skip(1).collect();
    let (verbosity, args) = match parse_args(&raw) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            process::exit(1);
        }
    };
    let guard = init_logging(verbosity);

    let Some(command) = args.positional.first().cloned() else {
        print_help();
        return;
    };
    let rest = &args.positional[1..];

    let code = match command.as_str() {
        "info" | "i" => match rest.first() {
            Some(path) => cmd_info(Path::new(path)),
            None => usage("c3d-anim info <recording.json>"),
        },
        "import" | "im" => {
            if rest.is_empty() {
                usage("c3d-anim import <recording.json>... [-o scene.json] [--scene base.json] [--options import.json]")
            } else {
                cmd_import(rest, &args)
            }
        }
        "export" | "ex" => match (rest.first(), output_path(&args, rest)) {
            (Some(scene), Some(out)) => cmd_export(Path::new(scene), &out, &args),
            _ => usage(
                "c3d-anim export <scene.json> <out.json> [--select <action>]... [--start N] [--end N] [--options export.json]",
            ),
        },
        "roundtrip" | "rt" => match (rest.first(), output_path(&args, rest)) {
            (Some(input), Some(out)) => cmd_roundtrip(Path::new(input), &out),
            _ => usage("c3d-anim roundtrip <recording.json> <out.json>"),
        },
        "version" | "-V" | "--version" => {
            println!("c3d-anim {} ({})", env!("CARGO_PKG_VERSION"), BUILD_STAMP);
            0
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            0
        }
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_help();
            1
        }
    };
    // exit() skips destructors; flush the trace first.
    drop(guard);
    process::exit(code);
}

/// Second positional argument, or `-o`.
fn output_path(args: &Args, rest: &[String]) -> Option<PathBuf> {
    rest.get(1).map(PathBuf::from).or_else(|| args.output.clone())
}

fn usage(text: &str) -> i32 {
    eprintln!("Error: missing arguments");
    eprintln!("Usage: {}", text);
    1
}

fn print_help() {
    println!("c3d-anim - motion-capture recording to animation channels");
    println!();
    println!("USAGE:");
    println!("    c3d-anim [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info      <rec>              Show recording header, units, axes and entities");
    println!("    im, import   <rec>...           Import recordings into a scene (JSON)");
    println!("    ex, export   <scene> <out>      Export scene actions to a recording");
    println!("    rt, roundtrip <rec> <out>       Import with defaults and export again");
    println!("    version                         Show version and build stamp");
    println!("    h, help                         Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -o, --output <file>    Output file (import default: scene.json)");
    println!("    --scene <file>         Existing scene to import into");
    println!("    --options <file>       Import/export options as JSON");
    println!("    --select <action>      Export only the named action (repeatable)");
    println!("    --start <frame>        First exported frame (default: scene start)");
    println!("    --end <frame>          Last exported frame (default: scene end)");
    println!("    -v, --verbose          Show debug output");
    println!("    -vv, --trace           Show trace output (very verbose)");
    println!("    -q, --quiet            Errors only");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG               Overrides the verbosity flags");
    println!("    C3D_ANIM_TRACE=1       Write trace.json (chrome-trace feature)");
}

fn load_recording(path: &Path) -> c3d_anim::Result<MemoryRecording> {
    debug!("Loading {}", path.display());
    MemoryRecording::load(path)
}

fn cmd_info(path: &Path) -> i32 {
    let rec = match load_recording(path) {
        Ok(r) => r,
        Err(e) => {
            error!("{}: {}", path.display(), e);
            return 1;
        }
    };
    let info = rec.info();
    let dict = ParameterDictionary::new(rec.parameters(), info);

    println!("Recording: {}", path.display());
    println!("  Frames:     {}..={} ({} frames)", info.first_frame, info.last_frame, info.frame_count());
    println!("  Rate:       {} fps", info.frame_rate);
    println!("  Points:     {}", info.point_count);
    println!("  Software:   {}", dict.software().unwrap_or("unknown"));
    match dict.section_unit("POINT") {
        Ok(unit) => println!("  Unit:       {}", unit),
        Err(e) => println!("  Unit:       unknown ({})", e),
    }
    match dict.screen_axes("POINT") {
        Some((x, y)) => println!("  Screen:     X_SCREEN={} Y_SCREEN={}", x.screen_str(), y.screen_str()),
        None => println!("  Screen:     not parsed"),
    }

    let labels = ParameterDictionary::make_labels_unique(&dict.point_labels());
    let entities = Partitioner::default().partition(&labels);
    println!("  Entities:   {}", entities.len());
    for (key, mask) in &entities {
        println!("    {:<20} {} labels", key.name(), mask.count());
    }
    let events = dict.events();
    let bad = events.iter().filter(|e| e.is_err()).count();
    println!("  Events:     {} ({} malformed)", events.len(), bad);
    0
}

fn import_options(args: &Args) -> c3d_anim::Result<ImportOptions> {
    match &args.options {
        Some(p) => ImportOptions::from_json_file(p),
        None => Ok(ImportOptions::default()),
    }
}

fn export_options(args: &Args) -> c3d_anim::Result<ExportOptions> {
    match &args.options {
        Some(p) => ExportOptions::from_json_file(p),
        None => Ok(ExportOptions::default()),
    }
}

fn print_batch(report: &BatchReport) {
    for r in &report.imported {
        info!(
            "{}: {} entities, {} keyframes, {} markers",
            r.name,
            r.entities.len(),
            r.total_keyframes(),
            r.markers
        );
    }
    for (name, w) in report.warnings() {
        warn!("{}: {}", name, w);
    }
    for f in &report.failed {
        error!("{}: {}", f.path.display(), f.error);
    }
}

fn cmd_import(files: &[String], args: &Args) -> i32 {
    let options = match import_options(args) {
        Ok(o) => o,
        Err(e) => {
            error!("options: {}", e);
            return 1;
        }
    };
    let mut scene = match &args.scene {
        Some(p) => match Scene::load(p) {
            Ok(s) => s,
            Err(e) => {
                error!("{}: {}", p.display(), e);
                return 1;
            }
        },
        None => Scene::new(),
    };

    let report = import_batch(files, load_recording, &options, &mut scene);
    for r in &report.imported {
        r.apply_to(&mut scene);
    }
    print_batch(&report);

    let out = args.output.clone().unwrap_or_else(|| PathBuf::from("scene.json"));
    if let Err(e) = scene.save(&out) {
        error!("{}: {}", out.display(), e);
        return 1;
    }
    info!("Saved scene to {}", out.display());
    if report.is_complete() {
        0
    } else {
        1
    }
}

fn cmd_export(scene_path: &Path, out: &Path, args: &Args) -> i32 {
    let mut options = match export_options(args) {
        Ok(o) => o,
        Err(e) => {
            error!("options: {}", e);
            return 1;
        }
    };
    let mut scene = match Scene::load(scene_path) {
        Ok(s) => s,
        Err(e) => {
            error!("{}: {}", scene_path.display(), e);
            return 1;
        }
    };
    if !args.selected.is_empty() {
        let names: Vec<&str> = args.selected.iter().map(String::as_str).collect();
        let hits = scene.select(&names);
        debug!("Selected {} of {} actions", hits, scene.actions.len());
        options.scope = ExportScope::Selected;
    }
    if args.start.is_some() {
        options.frame_start = args.start;
    }
    if args.end.is_some() {
        options.frame_end = args.end;
    }
    export_to(&scene, &options, out)
}

fn export_to(scene: &Scene, options: &ExportOptions, out: &Path) -> i32 {
    let mut writer = JsonRecordingWriter::new(out);
    let mut diag = Diagnostics::new();
    match export_scene(scene, options, &mut writer, &mut diag) {
        Ok(Some(summary)) => {
            println!(
                "Wrote {} labels, frames {}..={} to {}",
                summary.labels,
                summary.first_frame,
                summary.last_frame,
                out.display()
            );
            0
        }
        Ok(None) => {
            eprintln!("Nothing to export");
            1
        }
        Err(e) => {
            error!("{}: {}", out.display(), e);
            1
        }
    }
}

fn cmd_roundtrip(input: &Path, out: &Path) -> i32 {
    let mut scene = Scene::new();
    let report = import_batch(&[input], load_recording, &ImportOptions::default(), &mut scene);
    print_batch(&report);
    let Some(imported) = report.imported.first() else {
        return 1;
    };
    imported.apply_to(&mut scene);
    scene.settings.frame_start = imported.info.first_frame;
    export_to(&scene, &ExportOptions::default(), out)
}
