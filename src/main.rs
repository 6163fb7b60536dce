use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use subtitle_forge::{
    BatchRenderer, CaptionEmitter, Config, SubtitleFormat, TimingPolicy, TranscriptionResult,
    TxtSource,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("subtitle-forge")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Generate TXT, SRT and WebVTT captions from speech-to-text results")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("PATH")
                .help("Transcription JSON file, directory of JSON files, or - for stdin")
                .default_value("-")
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory for caption files")
        )
        .arg(
            Arg::new("stem")
                .long("stem")
                .value_name("NAME")
                .help("File name stem for a single input (default: transcript)")
        )
        .arg(
            Arg::new("formats")
                .short('f')
                .long("formats")
                .value_name("LIST")
                .help("Comma-separated output formats: txt, srt, vtt")
        )
        .arg(
            Arg::new("max-chars")
                .long("max-chars")
                .value_name("NUM")
                .help("Maximum characters per caption line")
        )
        .arg(
            Arg::new("min-line-duration")
                .long("min-line-duration")
                .value_name("SECONDS")
                .help("Minimum display time per line under proportional timing")
        )
        .arg(
            Arg::new("timing")
                .long("timing")
                .value_name("POLICY")
                .help("How a segment's time is divided among its lines")
                .value_parser(["proportional", "flat"])
        )
        .arg(
            Arg::new("txt-source")
                .long("txt-source")
                .value_name("SOURCE")
                .help("Plain text from the raw transcript or from the segments")
                .value_parser(["raw", "segments"])
        )
        .arg(
            Arg::new("strip-fillers")
                .long("strip-fillers")
                .help("Remove um, uh, er, ah and like before wrapping")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("lead-in")
                .long("lead-in")
                .help("Add a cue covering silence before the first segment")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("lead-in-label")
                .long("lead-in-label")
                .value_name("TEXT")
                .help("Text of the lead-in cue")
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print {txt, srt, vtt} as JSON to stdout instead of writing files")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_name("NUM")
                .help("Number of files rendered in parallel for directory input")
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
        )
        .get_matches();

    // Initialize logging; stdout is reserved for --json output
    let default_filter = if matches.get_flag("verbose") {
        "subtitle_forge=debug,info"
    } else {
        "subtitle_forge=info,warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(&PathBuf::from(path))?,
        None => Config::load()?,
    };
    apply_overrides(&mut config, &matches)?;
    config.validate()?;
    info!("{}", config.summary());

    let input = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or("-");
    let input_path = PathBuf::from(input);

    if input != "-" && input_path.is_dir() {
        if matches.get_flag("json") {
            anyhow::bail!("--json is only supported for a single input");
        }

        let renderer = BatchRenderer::new(&config);
        let results = renderer
            .render_directory(input_path, config.output.base_dir.clone())
            .await?;

        info!("🎉 Rendering completed in {:.2}s", results.total_time.as_secs_f64());
        info!("✅ Successful: {}", results.successful);
        info!("❌ Failed: {}", results.failed);

        if results.failed > 0 {
            anyhow::bail!("{} of {} files failed to render", results.failed, results.total);
        }
        return Ok(());
    }

    let json = if input == "-" {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .context("Failed to read transcription from stdin")?;
        buffer
    } else {
        tokio::fs::read_to_string(&input_path)
            .await
            .with_context(|| format!("Failed to read {}", input_path.display()))?
    };

    let transcription = TranscriptionResult::from_json(&json).map_err(|e| {
        error!("Invalid transcription result: {}", e);
        e
    })?;
    let emitter = CaptionEmitter::new(config.subtitles.clone());
    let subtitles = emitter.emit(&transcription)?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&subtitles)?);
        return Ok(());
    }

    let written = subtitles
        .write_to_dir(&config.output.base_dir, &config.output.stem, &config.output.formats)
        .await?;
    for path in &written {
        info!("💾 Wrote {}", path.display());
    }

    Ok(())
}

/// Apply command-line flags on top of the loaded configuration
fn apply_overrides(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config.output.base_dir = PathBuf::from(dir);
    }

    if let Some(stem) = matches.get_one::<String>("stem") {
        config.output.stem = stem.clone();
    }

    if let Some(formats) = matches.get_one::<String>("formats") {
        config.output.formats = formats
            .split(',')
            .filter(|format| !format.trim().is_empty())
            .map(|format| format.parse::<SubtitleFormat>())
            .collect::<subtitle_forge::Result<Vec<_>>>()?;
    }

    if let Some(max_chars) = matches.get_one::<String>("max-chars") {
        config.subtitles.max_chars = max_chars
            .parse()
            .with_context(|| format!("Invalid --max-chars: {}", max_chars))?;
    }

    if let Some(timing) = matches.get_one::<String>("timing") {
        config.subtitles.timing = match timing.as_str() {
            "flat" => TimingPolicy::Flat,
            _ => match config.subtitles.timing {
                TimingPolicy::Flat => TimingPolicy::default(),
                proportional => proportional,
            },
        };
    }

    if let Some(min_duration) = matches.get_one::<String>("min-line-duration") {
        let min_line_duration: f64 = min_duration
            .parse()
            .with_context(|| format!("Invalid --min-line-duration: {}", min_duration))?;
        if config.subtitles.timing == TimingPolicy::Flat {
            warn!("--min-line-duration has no effect with flat timing");
        } else {
            config.subtitles.timing = TimingPolicy::Proportional { min_line_duration };
        }
    }

    if let Some(source) = matches.get_one::<String>("txt-source") {
        config.subtitles.txt_source = match source.as_str() {
            "segments" => TxtSource::Segments,
            _ => TxtSource::Raw,
        };
    }

    if matches.get_flag("strip-fillers") {
        config.subtitles.strip_fillers = true;
    }

    if matches.get_flag("lead-in") {
        config.subtitles.emit_lead_in_cue = true;
    }

    if let Some(label) = matches.get_one::<String>("lead-in-label") {
        config.subtitles.lead_in_label = label.clone();
    }

    if let Some(workers) = matches.get_one::<String>("workers") {
        config.performance.max_workers = workers
            .parse()
            .with_context(|| format!("Invalid --workers: {}", workers))?;
    }

    Ok(())
}
