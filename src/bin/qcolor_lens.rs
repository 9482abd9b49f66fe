use std::io::Read;

use qcolor_lens::codec;
use qcolor_lens::config::LensConfig;
use qcolor_lens::edit::{ChannelEdit, EditError, EncodingPolicy, plan_edit};
use qcolor_lens::locator::{ColorMatch, ColumnUnit, Locator, Position, match_at};
use qcolor_lens::logging::LensLogger;
use qcolor_lens::swatch::{SwatchMode, detect_swatch_mode, render_swatch};
use unicode_width::UnicodeWidthStr;

/// Command-line front end for scanning and rewriting `QColor` literals.
///
/// Uses a small hand-rolled parser; the surface is too small for a CLI
/// framework.
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(args) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    };

    if cli.help {
        print!("{HELP_TEXT}");
        return;
    }

    if cli.log_level != LogLevel::Off {
        init_logger(cli.log_level);
    }

    let lens = cli.apply_to(LensConfig::from_env());
    if !lens.enabled {
        log::info!("disabled by QCOLOR_LENS_ENABLED");
        return;
    }

    let locator = match lens.locator() {
        Ok(locator) => locator,
        Err(err) => {
            eprintln!("Invalid constructor name `{}`: {err}", lens.constructor);
            std::process::exit(1);
        }
    };

    let code = match &cli.command {
        Some(Command::Scan { sources }) => run_scan(&cli, &lens, &locator, sources),
        Some(Command::Set(target)) => run_set(&lens, &locator, target),
        None => {
            eprintln!("Missing command.\n\nRun with `--help` to see usage.");
            2
        }
    };
    std::process::exit(code);
}

fn init_logger(level: LogLevel) {
    let logger = LensLogger::new()
        .level(level.to_level_filter())
        .color(std::io::IsTerminal::is_terminal(&std::io::stderr()));

    if let Err(err) = logger.init() {
        eprintln!("Warning: Failed to initialize logger: {err}");
    }
}

fn read_source(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(source)
    }
}

fn run_scan(cli: &Cli, lens: &LensConfig, locator: &Locator, sources: &[String]) -> i32 {
    let mode = if cli.swatch {
        detect_swatch_mode()
    } else {
        SwatchMode::Off
    };

    let stdin_only = ["-".to_string()];
    let sources = if sources.is_empty() {
        &stdin_only[..]
    } else {
        sources
    };

    let mut rows = Vec::new();
    let mut failed = false;
    for source in sources {
        match read_source(source) {
            Ok(text) => {
                let label = if source == "-" { "<stdin>" } else { source.as_str() };
                let found = locator.find_all(&text);
                log::debug!("{label}: {} match(es)", found.len());
                rows.extend(found.into_iter().map(|m| ScanRow::new(label, m)));
            }
            Err(err) => {
                eprintln!("{source}: {err}");
                failed = true;
            }
        }
    }

    print!("{}", render_rows(&rows, mode, lens.swatch_width));
    i32::from(failed)
}

fn run_set(lens: &LensConfig, locator: &Locator, target: &SetTarget) -> i32 {
    let text = match std::fs::read_to_string(&target.path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{}: {err}", target.path);
            return 1;
        }
    };

    let matches = locator.find_all(&text);
    let Some(found) = match_at(&matches, target.position) else {
        eprintln!("{}", EditError::NoColorAtPosition(target.position));
        return 1;
    };

    let replacement = plan_edit(locator.codec(), found, &target.edit, lens.encoding_policy);
    let updated = match replacement.apply(&text) {
        Ok(updated) => updated,
        Err(err) => {
            eprintln!("{}: {err}", target.path);
            return 1;
        }
    };

    if target.dry_run {
        print!("{updated}");
        return 0;
    }

    if let Err(err) = std::fs::write(&target.path, updated) {
        eprintln!("{}: {err}", target.path);
        return 1;
    }
    println!(
        "{}:{}  {} -> {}",
        target.path, found.span.start_pos, replacement.expected, replacement.text
    );
    0
}

#[derive(Debug, Clone)]
struct ScanRow {
    location: String,
    found: ColorMatch,
}

impl ScanRow {
    fn new(label: &str, found: ColorMatch) -> Self {
        Self {
            location: format!("{label}:{}", found.span.start_pos),
            found,
        }
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

/// Newlines inside a multi-line call would break the one-row-per-match layout.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_rows(rows: &[ScanRow], mode: SwatchMode, swatch_width: usize) -> String {
    let originals: Vec<String> = rows
        .iter()
        .map(|row| single_line(&row.found.original_text))
        .collect();
    let location_width = rows.iter().map(|r| r.location.width()).max().unwrap_or(0);
    let original_width = originals.iter().map(|o| o.width()).max().unwrap_or(0);
    let show_swatch = mode != SwatchMode::Off && swatch_width > 0;

    let mut out = String::new();
    for (row, original) in rows.iter().zip(&originals) {
        let value = &row.found.value;
        out.push_str(&pad(&row.location, location_width));
        out.push_str("  ");
        if show_swatch {
            out.push_str(&render_swatch(value, swatch_width, mode));
            out.push_str("  ");
        }
        out.push_str(&pad(value.encoding.name(), 5));
        out.push_str("  ");
        out.push_str(&pad(original, original_width));
        out.push_str("  ");
        out.push_str(&value.css());
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LogLevel {
    #[default]
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(format!(
                "Invalid --log-level value `{value}` (expected: off|error|warn|info|debug|trace)."
            )),
        }
    }

    fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SetTarget {
    path: String,
    position: Position,
    edit: ChannelEdit,
    dry_run: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Scan { sources: Vec<String> },
    Set(SetTarget),
}

#[derive(Debug, Clone, PartialEq)]
struct Cli {
    help: bool,
    command: Option<Command>,
    constructor: Option<String>,
    columns: Option<ColumnUnit>,
    swatch: bool,
    promote_alpha: bool,
    log_level: LogLevel,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            help: false,
            command: None,
            constructor: None,
            columns: None,
            swatch: true,
            promote_alpha: false,
            log_level: LogLevel::default(),
        }
    }
}

impl Cli {
    /// Flags win over environment settings.
    fn apply_to(&self, mut lens: LensConfig) -> LensConfig {
        if let Some(constructor) = &self.constructor {
            lens = lens.constructor(constructor.clone());
        }
        if let Some(unit) = self.columns {
            lens = lens.column_unit(unit);
        }
        if self.promote_alpha {
            lens = lens.encoding_policy(EncodingPolicy::PromoteAlpha);
        }
        lens
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Cli, String> {
    let mut iter = args.into_iter();
    // Drop binary name if present.
    let _ = iter.next();

    let mut cli = Cli::default();
    let mut positionals = Vec::new();
    let mut dry_run = false;

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => cli.help = true,
            "--constructor" => {
                let raw = next_value(&mut iter, "--constructor")?;
                if raw.trim().is_empty() {
                    return Err("Invalid --constructor value (expected a name).".to_string());
                }
                cli.constructor = Some(raw.trim().to_string());
            }
            "--columns" => {
                let raw = next_value(&mut iter, "--columns")?;
                cli.columns = Some(raw.parse()?);
            }
            "--no-swatch" => cli.swatch = false,
            "--promote-alpha" => cli.promote_alpha = true,
            "--dry-run" => dry_run = true,
            "--log-level" => {
                let raw = next_value(&mut iter, "--log-level")?;
                cli.log_level = LogLevel::parse(&raw)?;
            }
            "-" => positionals.push(arg),
            _ if arg.starts_with('-') => {
                return Err(format!(
                    "Unknown flag: {arg}\n\nRun with `--help` to see valid options."
                ));
            }
            _ => positionals.push(arg),
        }
    }

    if cli.help {
        return Ok(cli);
    }

    let mut positionals = positionals.into_iter();
    cli.command = match positionals.next().as_deref() {
        None => None,
        Some("scan") => {
            if dry_run {
                return Err("`--dry-run` only applies to `set`.".to_string());
            }
            Some(Command::Scan {
                sources: positionals.collect(),
            })
        }
        Some("set") => {
            let rest: Vec<String> = positionals.collect();
            let [path, position, color] = <[String; 3]>::try_from(rest).map_err(|rest| {
                format!(
                    "`set` takes FILE LINE:COL COLOR (got {} argument(s)).",
                    rest.len()
                )
            })?;
            Some(Command::Set(SetTarget {
                path,
                position: parse_position(&position)?,
                edit: parse_color(&color)?,
                dry_run,
            }))
        }
        Some(other) => {
            return Err(format!(
                "Unknown command `{other}` (expected: scan|set).\n\nRun with `--help` to see usage."
            ));
        }
    };

    Ok(cli)
}

fn next_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    iter.next()
        .ok_or_else(|| format!("Missing value for `{flag}`."))
}

/// `LINE:COL`, both 1-based.
fn parse_position(raw: &str) -> Result<Position, String> {
    let invalid = || format!("Invalid position `{raw}` (expected LINE:COL, both >= 1).");
    let (line, column) = raw.split_once(':').ok_or_else(invalid)?;
    let line = line.trim().parse::<usize>().map_err(|_| invalid())?;
    let column = column.trim().parse::<usize>().map_err(|_| invalid())?;
    if line == 0 || column == 0 {
        return Err(invalid());
    }
    Ok(Position::new(line - 1, column - 1))
}

/// `r,g,b[,a]` picker values (clamped later) or `#hex` in codec notation.
fn parse_color(raw: &str) -> Result<ChannelEdit, String> {
    let raw = raw.trim();
    if raw.starts_with('#') {
        let value = codec::parse(&format!("\"{raw}\""))
            .map_err(|rejection| format!("Invalid color `{raw}`: {rejection}."))?;
        return Ok(ChannelEdit::from_value(&value));
    }

    let values = raw
        .split(',')
        .map(|token| token.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("Invalid color `{raw}` (expected r,g,b[,a] or #hex)."))?;
    match values[..] {
        [red, green, blue] => Ok(ChannelEdit::new(red, green, blue, 255.0)),
        [red, green, blue, alpha] => Ok(ChannelEdit::new(red, green, blue, alpha)),
        _ => Err(format!(
            "Invalid color `{raw}` (expected 3 or 4 channels, got {}).",
            values.len()
        )),
    }
}

const HELP_TEXT: &str = r"qcolor-lens: find and edit QColor(...) literals

USAGE:
    qcolor-lens scan [FILE...] [OPTIONS]
    qcolor-lens set FILE LINE:COL COLOR [--dry-run] [OPTIONS]

COMMANDS:
    scan                        List every decodable call (stdin when no FILE or `-`)
    set                         Rewrite the call under LINE:COL (1-based) with COLOR

COLOR:
    r,g,b[,a]                   Channel values; out-of-range values are clamped
    #rgb #rgba #rrggbb #rrggbbaa

OPTIONS:
    --constructor <name>        Constructor to look for (default: QColor)
    --columns <unit>            Column unit: byte|char|utf16 (default: utf16)
    --no-swatch                 Do not paint color samples
    --promote-alpha             Keep edited alpha by switching rgb->rgba, named->hex
    --dry-run                   Print the edited text instead of writing the file
    --log-level <level>         Diagnostics on stderr (off|error|warn|info|debug|trace)
    -h, --help                  Print help and exit

ENVIRONMENT:
    QCOLOR_LENS_ENABLED, QCOLOR_LENS_CONSTRUCTOR, QCOLOR_LENS_COLUMNS,
    QCOLOR_LENS_SWATCH_WIDTH, QCOLOR_LENS_PROMOTE_ALPHA, QCOLOR_LENS_NAMED

EXIT STATUS:
    0 success, 1 runtime failure, 2 usage error
";
