//! binfile - inspect and resize binary files
//!
//! A thin command-line front end over the `binfile` library.

use anyhow::{Context, Result};
use binfile::binary::encoding_for_label;
use binfile::{BinaryFile, BinaryFileConfig, ReadAccessor, ReadExt, Seekable};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Bytes shown per hex dump row
const DUMP_WIDTH: usize = 16;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; RUST_LOG=debug shows backend selection
    env_logger::init();

    let matches = cli().get_matches();
    let config = load_config()?;

    match matches.subcommand() {
        Some(("info", args)) => info(args, config),
        Some(("dump", args)) => dump(args, config).await,
        Some(("resize", args)) => resize(args, config),
        Some(("string", args)) => string(args, config).await,
        _ => unreachable!("subcommand is required"),
    }
}

fn cli() -> Command {
    let file = Arg::new("file")
        .help("Path to the binary file")
        .required(true)
        .index(1);

    Command::new("binfile")
        .version(binfile::VERSION)
        .about("Inspect and resize binary files")
        .long_about(
            "binfile opens a file with the fastest backend that works (in-memory, \
             memory-mapped or stream) and reads, dumps or resizes it.",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("info")
                .about("Show length and the backend chosen for a file")
                .arg(file.clone()),
        )
        .subcommand(
            Command::new("dump")
                .about("Hex dump a range of a file")
                .arg(file.clone())
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .short('o')
                        .help("Start offset (decimal or 0x-prefixed hex)")
                        .default_value("0")
                        .value_parser(parse_number),
                )
                .arg(
                    Arg::new("length")
                        .long("length")
                        .short('n')
                        .help("Number of bytes to dump")
                        .default_value("256")
                        .value_parser(parse_number),
                ),
        )
        .subcommand(
            Command::new("resize")
                .about("Truncate or extend a file")
                .arg(file.clone())
                .arg(
                    Arg::new("length")
                        .help("New length in bytes")
                        .required(true)
                        .index(2)
                        .value_parser(parse_number),
                ),
        )
        .subcommand(
            Command::new("string")
                .about("Decode a null-terminated string")
                .arg(file)
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .short('o')
                        .help("Offset of the first character")
                        .required(true)
                        .value_parser(parse_number),
                )
                .arg(
                    Arg::new("encoding")
                        .long("encoding")
                        .short('e')
                        .help("utf8, utf16le, utf16be or latin1")
                        .default_value("utf8"),
                ),
        )
}

fn load_config() -> Result<BinaryFileConfig> {
    #[cfg(feature = "config")]
    let config = BinaryFileConfig::load_default().context("Failed to load configuration")?;
    #[cfg(not(feature = "config"))]
    let config = BinaryFileConfig::default();

    Ok(config.with_env_overrides())
}

fn open(args: &ArgMatches, config: BinaryFileConfig) -> Result<BinaryFile> {
    let path = PathBuf::from(
        args.get_one::<String>("file")
            .context("file argument is required")?,
    );

    BinaryFile::open_with(
        &path,
        std::sync::Arc::new(binfile::PhysicalFileSystem::new()),
        config,
    )
    .with_context(|| format!("Failed to open {}", path.display()))
}

/// Accept decimal or `0x`-prefixed hexadecimal
fn parse_number(value: &str) -> std::result::Result<u64, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid number {value:?}: {e}"))
}

fn describe_backend(file: &BinaryFile) -> String {
    file.backend_kind()
        .map_or_else(|| "closed".to_string(), |kind| kind.to_string())
}

fn info(args: &ArgMatches, config: BinaryFileConfig) -> Result<()> {
    let file = open(args, config)?;

    if let Some(path) = file.path() {
        println!("path:    {}", path.display());
    }
    println!("length:  {}", file.len());
    println!("backend: {}", describe_backend(&file));
    Ok(())
}

async fn dump(args: &ArgMatches, config: BinaryFileConfig) -> Result<()> {
    let file = open(args, config)?;
    let offset = *args.get_one::<u64>("offset").context("offset has a default")?;
    let requested = *args.get_one::<u64>("length").context("length has a default")?;

    // Stop at end of file rather than failing on a short tail
    let length = requested.min(file.len().saturating_sub(offset));
    let view = file.slice(offset, length)?;
    let bytes = view
        .read_array_async(0, usize::try_from(length)?)
        .await
        .with_context(|| format!("Failed to read {length} bytes at {offset:#x}"))?;

    for line in dump_lines(offset, &bytes) {
        println!("{line}");
    }
    Ok(())
}

/// Format `bytes` as `offset  hex  |text|` rows
fn dump_lines(base: u64, bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(DUMP_WIDTH)
        .enumerate()
        .map(|(row, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
            let text: String = chunk
                .iter()
                .map(|b| if b.is_ascii_graphic() || *b == b' ' { char::from(*b) } else { '.' })
                .collect();
            format!(
                "{:08x}  {:<width$}  |{text}|",
                base + (row * DUMP_WIDTH) as u64,
                hex.join(" "),
                width = DUMP_WIDTH * 3 - 1
            )
        })
        .collect()
}

fn resize(args: &ArgMatches, config: BinaryFileConfig) -> Result<()> {
    let mut file = open(args, config)?;
    let length = *args.get_one::<u64>("length").context("length is required")?;
    let before = file.len();

    file.set_len(length)
        .with_context(|| format!("Failed to resize to {length} bytes"))?;
    // In-memory files only change on disk when saved
    file.save().context("Failed to save resized file")?;

    println!("{before} -> {} bytes ({})", file.len(), describe_backend(&file));
    Ok(())
}

async fn string(args: &ArgMatches, config: BinaryFileConfig) -> Result<()> {
    let file = open(args, config)?;
    let offset = *args.get_one::<u64>("offset").context("offset is required")?;
    let label = args
        .get_one::<String>("encoding")
        .context("encoding has a default")?;
    let encoding =
        encoding_for_label(label).with_context(|| format!("Unknown encoding: {label}"))?;

    let text = file
        .read_null_terminated_string_async(offset, encoding)
        .await
        .with_context(|| format!("Failed to read a {} string at {offset:#x}", encoding.name()))?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!binfile::VERSION.is_empty());
    }

    #[test]
    fn test_cli_definition() {
        cli().debug_assert();
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Ok(42));
        assert_eq!(parse_number("0x10"), Ok(16));
        assert!(parse_number("ten").is_err());
    }

    #[test]
    fn test_dump_lines() {
        let lines = dump_lines(0x10, b"Hello, world!\x00\x01\x02next");

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000010  48 65 6c 6c 6f"));
        assert!(lines[0].ends_with("|Hello, world!...|"));
        assert!(lines[1].starts_with("00000020  6e 65 78 74"));
        assert!(lines[1].ends_with("|next|"));
    }
}
