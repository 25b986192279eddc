//! gh-space-shooter command line
//!
//! Loads a saved contribution graph, prints it, and renders the battle to a
//! GIF/WebP file or splices it into a README as a WebP data URL.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;

use gh_space_shooter::consts::{DEFAULT_FPS, DEFAULT_SEED};
use gh_space_shooter::output::{data_url, img_tag, write_atomic, write_data_url_section};
use gh_space_shooter::{Config, ContributionGrid, OutputFormat, StrategyKind, encode_animation};

/// Cell glyphs for levels 0-4 in the console graph
const LEVEL_GLYPHS: [char; 5] = ['.', '-', '+', '*', '#'];
const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Parser, Debug)]
#[command(name = "gh-space-shooter")]
#[command(about = "Turn a GitHub contribution graph into a space shooter animation")]
struct Cli {
    /// GitHub username (defaults to the one stored in the input data)
    username: Option<String>,

    /// Contribution data JSON to load
    #[arg(long = "raw-input", visible_alias = "raw-in")]
    raw_input: PathBuf,

    /// Save the validated contribution data as JSON
    #[arg(long = "raw-output", visible_alias = "raw-out")]
    raw_output: Option<PathBuf>,

    /// Animation file to write; the extension picks the format (.gif or .webp)
    #[arg(short, long, conflicts_with = "write_dataurl_to")]
    output: Option<PathBuf>,

    /// Encode as WebP and splice an <img> data URL into this text file
    #[arg(long)]
    write_dataurl_to: Option<PathBuf>,

    /// Enemy activation strategy: column, row, random
    #[arg(short, long, default_value = "random")]
    strategy: String,

    /// Playback rate
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Stop after this many frames
    #[arg(long = "max-frame")]
    max_frame: Option<usize>,

    /// Seed for the random strategy and effects
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Draw the project watermark
    #[arg(long)]
    watermark: bool,
}

/// Where the encoded animation goes
enum Target {
    File(PathBuf),
    DataUrl(PathBuf),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut grid = ContributionGrid::from_file(&cli.raw_input)
        .with_context(|| format!("loading {}", cli.raw_input.display()))?;
    // A username on the command line wins over the stored one, HUD included
    if let Some(name) = cli.username.clone() {
        grid = grid.with_username(name);
    }
    let username = grid.username.clone();
    if username.is_empty() {
        bail!("a username is required (none given and none stored in the input data)");
    }

    let (target, output_format) = match (&cli.output, &cli.write_dataurl_to) {
        (_, Some(path)) => (Target::DataUrl(path.clone()), OutputFormat::Webp),
        (Some(path), None) => (Target::File(path.clone()), OutputFormat::from_path(path)?),
        (None, None) => {
            let path = PathBuf::from(format!("{username}-gh-space-shooter.gif"));
            (Target::File(path), OutputFormat::Gif)
        }
    };

    let config = Config {
        strategy: cli.strategy.parse::<StrategyKind>()?,
        fps: cli.fps,
        max_frame: cli.max_frame,
        output_format,
        seed: cli.seed,
        watermark: cli.watermark,
    };
    config.validate()?;

    print_stats(&grid);
    print_graph(&grid);

    if let Some(path) = &cli.raw_output {
        write_atomic(path, grid.to_json_string().as_bytes())
            .with_context(|| format!("saving contribution data to {}", path.display()))?;
        println!("Data saved to {}", path.display());
    }

    log::info!(
        "generating {} with strategy {} at {} fps",
        config.output_format.as_str(),
        config.strategy.as_str(),
        config.fps
    );
    let animation = encode_animation(&grid, &config)?;

    match target {
        Target::File(path) => {
            write_atomic(&path, &animation.bytes)?;
            report(&path, animation.frame_count, animation.bytes.len());
        }
        Target::DataUrl(path) => {
            let tag = img_tag(&data_url(&animation.bytes, animation.format));
            write_data_url_section(&path, &tag)
                .with_context(|| format!("updating {}", path.display()))?;
            report(&path, animation.frame_count, tag.len());
        }
    }
    println!("Outcome: {:?}, score {}", animation.outcome, animation.score);
    Ok(())
}

fn report(path: &Path, frames: usize, bytes: usize) {
    println!("Wrote {} ({frames} frames, {bytes} bytes)", path.display());
}

fn print_stats(grid: &ContributionGrid) {
    let busiest = grid.cells().max_by_key(|(_, _, day)| day.count);
    let mut per_level = [0usize; LEVEL_GLYPHS.len()];
    for (_, _, day) in grid.cells() {
        per_level[usize::from(day.level)] += 1;
    }

    println!("User:          {}", grid.username);
    println!("Contributions: {}", grid.total_contributions);
    println!("Weeks:         {}", grid.num_weeks());
    println!("Active days:   {}", grid.active_day_count());
    if let Some((_, _, day)) = busiest.filter(|(_, _, d)| d.count > 0) {
        println!("Busiest day:   {} ({} contributions)", day.date, day.count);
    }
    let breakdown: Vec<String> = per_level
        .iter()
        .enumerate()
        .map(|(level, n)| format!("L{level}={n}"))
        .collect();
    println!("Levels:        {}", breakdown.join(" "));
    println!();
}

fn print_graph(grid: &ContributionGrid) {
    for (weekday, label) in WEEKDAY_LABELS.iter().enumerate() {
        let row: String = (0..grid.num_weeks())
            .map(|week| match grid.day_at(week, weekday) {
                Some(day) => LEVEL_GLYPHS[usize::from(day.level)],
                None => ' ',
            })
            .collect();
        println!("{label} {row}");
    }
    println!();
}
