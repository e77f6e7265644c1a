mod cli;

use ffplan::{config, task};
use ffplan_av::{check_tools, MediaProbe, ProgressParser};
use ffplan_common::StreamCategory;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::io::{BufRead, Write};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "ffplan=debug,ffplan_av=debug,ffplan_common=debug".to_string()
        } else {
            "ffplan=info,ffplan_av=warn".to_string()
        }
    });

    // Logs go to stderr so stdout stays clean for JSON and argument output.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Probe { file, json } => probe_file(&file, cli.config.as_deref(), json),
        Commands::Plan {
            input,
            output,
            json,
        } => plan_file(&input, &output, cli.config.as_deref(), json),
        Commands::Progress { file, probe_json } => {
            track_progress(file.as_deref(), probe_json.as_deref(), cli.config.as_deref())
        }
        Commands::CheckTools => check_external_tools(cli.config.as_deref()),
        Commands::Validate { file } => {
            let path = file.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("ffplan {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let probe = config::build_prober(&config)
        .probe(file)
        .with_context(|| format!("Failed to probe {:?}", file))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&probe)?);
    } else {
        print_probe(file, &probe);
    }

    Ok(())
}

fn print_probe(file: &Path, probe: &MediaProbe) {
    println!("File: {}", file.display());
    if let Some(ref format) = probe.format.format_name {
        println!("Container: {}", format);
    }
    if let Some(size) = probe.format.size_bytes() {
        println!("Size: {} bytes", size);
    }
    if let Some(duration) = probe.duration_secs() {
        let secs = duration as u64;
        let mins = secs / 60;
        let hours = mins / 60;
        println!("Duration: {:02}:{:02}:{:02}", hours, mins % 60, secs % 60);
    }

    for category in StreamCategory::ALL {
        let streams: Vec<_> = probe.streams_of(category).collect();
        if streams.is_empty() {
            continue;
        }

        println!("\n{} streams: {}", category, streams.len());
        for (i, stream) in streams.iter().enumerate() {
            print!(
                "  [{}:{}] #{} {}",
                category.specifier(),
                i,
                stream.index,
                stream.codec_name
            );
            if let Some((w, h)) = stream.resolution() {
                print!(" {}x{}", w, h);
            }
            if let Some(fps) = stream.frame_rate() {
                print!(" {:.3} fps", fps);
            }
            if let Some(channels) = stream.channels {
                print!(" {}ch", channels);
            }
            if let Some(lang) = stream.language() {
                print!(" ({})", lang);
            }
            if let Some(title) = stream.title() {
                print!(" \"{}\"", title);
            }
            if stream.has_disposition("default") {
                print!(" [default]");
            }
            println!();
        }
    }
}

fn plan_file(input: &Path, output: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    tracing::info!("Planning {:?} with policy '{}'", input, config.policy.kind());
    let plan = task::plan_file(&config, input, output)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    match plan.args() {
        Some(args) => {
            for arg in args {
                println!("{}", arg);
            }
        }
        None => println!("Nothing to process: every stream would be copied unchanged."),
    }

    Ok(())
}

fn track_progress(
    file: Option<&Path>,
    probe_json: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let probe = match (probe_json, file) {
        (Some(path), _) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read probe document: {:?}", path))?;
            MediaProbe::from_json(&content)
                .with_context(|| format!("Invalid probe document: {:?}", path))?
        }
        (None, Some(file)) => {
            let config = config::load_config_or_default(config_path)?;
            config::build_prober(&config)
                .probe(file)
                .with_context(|| format!("Failed to probe {:?}", file))?
        }
        (None, None) => anyhow::bail!("Either a file or --probe-json is required"),
    };

    let mut parser = ProgressParser::for_probe(&probe);
    let mut last_percent = parser.state().percent;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    // ffmpeg rewrites its status line with '\r', so split on both separators.
    for chunk in std::io::stdin().lock().split(b'\r') {
        let chunk = chunk.context("Failed to read stdin")?;
        for line in String::from_utf8_lossy(&chunk).split('\n') {
            let state = parser.update(line);
            if state.percent != last_percent {
                last_percent = state.percent;
                write!(out, "{}%", state.percent)?;
                if state.frame > 0 {
                    write!(out, " frame={}", state.frame)?;
                }
                write!(out, " time={:.2}s", state.time)?;
                if let Some(speed) = state.speed {
                    write!(out, " speed={}x", speed)?;
                }
                writeln!(out)?;
                out.flush()?;
            }
        }
    }

    Ok(())
}

fn check_external_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = check_tools(
        config.tools.ffprobe_path.as_deref(),
        config.tools.ffmpeg_path.as_deref(),
    );
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to enable probing.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::load_config_or_default(None)?
        }
    };

    println!("✓ Configuration is valid");
    println!("  Policy: {}", config.policy.kind());
    println!(
        "  Allowed categories: {}",
        config
            .probe
            .allowed_categories
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  ffprobe: {}",
        config
            .tools
            .ffprobe_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "PATH lookup".to_string())
    );

    Ok(())
}
