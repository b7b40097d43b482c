//! Command-line profile inspector: import a profile file, build a
//! flamegraph, and print a textual summary.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use emberview_core::import::parse_auto;
use emberview_core::{Flamegraph, FlamegraphOptions, SortOrder};

#[derive(Parser, Debug)]
#[command(name = "emberview", version, about = "Inspect profiles as flamegraph summaries")]
struct Cli {
    /// Profile file to load (speedscope JSON)
    file: PathBuf,

    /// Sort order: "call order", "left heavy", or "alphabetical"
    #[arg(short, long, default_value = "call order")]
    sort: String,

    /// Interpret the profile bottom-up
    #[arg(short, long)]
    inverted: bool,

    /// Number of widest frames to list per profile
    #[arg(short, long, default_value_t = 10)]
    top: usize,

    /// Only list frames whose name matches exactly
    #[arg(long)]
    find: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let sort: SortOrder = cli.sort.parse()?;

    let data = std::fs::read(&cli.file)
        .with_context(|| format!("reading {}", cli.file.display()))?;
    let group = parse_auto(&data)
        .with_context(|| format!("parsing {}", cli.file.display()))?;
    log::info!(
        "loaded {} profile(s) from {}",
        group.profiles.len(),
        group.name.as_deref().unwrap_or("unnamed session")
    );

    for (index, profile) in group.profiles.into_iter().enumerate() {
        let label = profile
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("profile {index}"));
        log::debug!(
            "building {} flamegraph for {label} ({} nodes)",
            sort,
            profile.call_tree().len()
        );

        let fg = Flamegraph::new(
            Arc::new(profile),
            FlamegraphOptions {
                sort,
                inverted: cli.inverted,
                config_space: None,
            },
        )
        .with_context(|| format!("building flamegraph for {label}"))?;

        println!(
            "{label}: {} {} frames, depth {}, total {}",
            fg.profile().kind(),
            fg.frame_count(),
            fg.depth(),
            fg.format(fg.root().end),
        );

        let mut widest: Vec<_> = fg.frames().collect();
        widest.sort_by(|a, b| b.width().total_cmp(&a.width()));
        for frame in widest.iter().take(cli.top) {
            println!(
                "  {:>10}  depth {:>2}  {}",
                fg.format(frame.width()),
                frame.depth,
                fg.profile().frame(frame.frame).name,
            );
        }

        if let Some(name) = &cli.find {
            let matches = fg.find_all_matching_frames(name, None, trim_package);
            println!("  {} frame(s) named {name:?}", matches.len());
            for frame in matches {
                println!(
                    "    [{} .. {}] depth {}",
                    fg.format_timeline(frame.start),
                    fg.format_timeline(frame.end),
                    frame.depth,
                );
            }
        }
    }

    Ok(())
}

/// Strip directories and common shared-library suffixes from a package
/// path, so "/usr/lib/libfoo.so" matches a query for "libfoo".
fn trim_package(package: &str) -> String {
    let base = package
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(package);
    let base = base.strip_suffix(".so").unwrap_or(base);
    let base = base.strip_suffix(".dylib").unwrap_or(base);
    base.to_string()
}
