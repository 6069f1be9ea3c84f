//! gbc-export - Game Boy Color graphics export tool
//!
//! Pulls LZ77-compressed and raw tile graphics out of a cartridge image as
//! greyscale PNG sheets, and writes edited sheets back in.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use gbc_rom::{BankAddress, RomImage};
use std::path::{Path, PathBuf};

use gbc_export::catalog::{Catalog, CatalogFormat, GraphicsEntry};
use gbc_export::{extract, insert, png};

#[derive(Parser)]
#[command(name = "gbc-export")]
#[command(about = "Game Boy Color graphics export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show cartridge header and checksum status
    Info {
        /// ROM image
        rom: PathBuf,
    },

    /// Export every catalog entry as a PNG sheet
    Extract {
        /// ROM image
        rom: PathBuf,

        /// Path to graphics.toml catalog
        #[arg(short, long, default_value = "graphics.toml")]
        catalog: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "gfx")]
        output: PathBuf,
    },

    /// Export a single location as a PNG sheet
    Dump {
        /// ROM image
        rom: PathBuf,

        /// Location as BB:AAAA (hex)
        location: BankAddress,

        /// Read uncompressed tiles instead of an LZ77 block
        #[arg(long, requires = "tiles")]
        raw: bool,

        /// Tile count (required with --raw)
        #[arg(short, long)]
        tiles: Option<usize>,

        /// Sheet width in tiles
        #[arg(long, default_value_t = 16)]
        tiles_per_row: usize,

        /// Tiles are 1BPP instead of 2BPP
        #[arg(long)]
        one_bpp: bool,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Re-encode edited sheets and write a patched ROM
    Insert {
        /// ROM image
        rom: PathBuf,

        /// Path to graphics.toml catalog
        #[arg(short, long, default_value = "graphics.toml")]
        catalog: PathBuf,

        /// Directory holding <id>.png sheets
        #[arg(short, long, default_value = "gfx")]
        input: PathBuf,

        /// Patched ROM to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// LZ77-compress a file
    Compress {
        input: PathBuf,
        output: PathBuf,
    },

    /// Decompress an LZ77 block from a file or ROM
    Decompress {
        input: PathBuf,
        output: PathBuf,

        /// Byte offset of the block (decimal or 0x-prefixed hex)
        #[arg(long, default_value = "0", value_parser = parse_offset)]
        offset: usize,
    },
}

fn parse_offset(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid offset '{s}': {e}"))
}

/// Load a ROM, warning (not failing) when the header disagrees with its size
fn load_rom(path: &Path) -> Result<RomImage> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read ROM: {}", path.display()))?;
    let rom = RomImage::from_banks(data).with_context(|| format!("Invalid ROM: {}", path.display()))?;

    match rom.header().and_then(|header| header.declared_rom_size()) {
        Ok(declared) if declared != rom.len() => tracing::warn!(
            "{}: header declares {:#X} bytes, image is {:#X}",
            path.display(),
            declared,
            rom.len()
        ),
        Ok(_) => {}
        Err(e) => tracing::warn!("{}: {}", path.display(), e),
    }

    Ok(rom)
}

fn show_info(path: &Path) -> Result<()> {
    let rom = load_rom(path)?;
    let header = rom.header()?;

    println!("Title:           {}", header.title);
    println!(
        "CGB:             {}",
        if header.is_cgb_only() {
            "CGB only"
        } else if header.is_cgb() {
            "CGB enhanced"
        } else {
            "DMG"
        }
    );
    println!(
        "Cartridge:       {:#04X} ({})",
        header.cartridge_type,
        header.mapper_name()
    );
    println!("ROM size code:   {:#04X}", header.rom_size_code);
    println!("RAM size code:   {:#04X}", header.ram_size_code);
    println!("Banks:           {}", rom.bank_count());
    println!(
        "Header checksum: {:#04X} ({})",
        header.header_checksum,
        if rom.header_checksum_valid() { "ok" } else { "BAD" }
    );
    println!(
        "Global checksum: {:#06X} ({})",
        header.global_checksum,
        if rom.global_checksum_valid() { "ok" } else { "BAD" }
    );
    Ok(())
}

fn extract_catalog(rom_path: &Path, catalog_path: &Path, output: &Path) -> Result<()> {
    let rom = load_rom(rom_path)?;
    let catalog = Catalog::load(catalog_path)?;
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let mut failed = 0;
    let results = extract::extract_all(&rom, &catalog);
    for (entry, (id, result)) in catalog.graphics.iter().zip(results) {
        let written = result.and_then(|graphics| {
            let path = output.join(entry.file_name());
            png::write_png(&path, &graphics.sheet())?;
            tracing::info!("{} -> {:?} ({} tiles)", graphics.location, path, graphics.tiles.len());
            Ok(())
        });
        if let Err(e) = written {
            tracing::error!("{}: {:#}", id, e);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} entries failed", failed, catalog.len());
    }
    tracing::info!("Extracted {} entries", catalog.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Info { rom } => show_info(&rom)?,

        Commands::Extract {
            rom,
            catalog,
            output,
        } => extract_catalog(&rom, &catalog, &output)?,

        Commands::Dump {
            rom,
            location,
            raw,
            tiles,
            tiles_per_row,
            one_bpp,
            output,
        } => {
            let rom = load_rom(&rom)?;
            let mut entry = GraphicsEntry::new("dump", location);
            entry.compressed = !raw;
            entry.tiles = tiles;
            entry.tiles_per_row = tiles_per_row;
            if one_bpp {
                entry.format = CatalogFormat::OneBpp;
            }

            let graphics = extract::extract_entry(&rom, &entry)?;
            png::write_png(&output, &graphics.sheet())?;
            tracing::info!(
                "{} -> {:?} ({} tiles, {} bytes in ROM)",
                location,
                output,
                graphics.tiles.len(),
                graphics.footprint
            );
        }

        Commands::Insert {
            rom: rom_path,
            catalog,
            input,
            output,
        } => {
            let mut rom = load_rom(&rom_path)?;
            let catalog = Catalog::load(&catalog)?;

            let reports = insert::insert_all(&mut rom, &catalog, |entry, current| {
                png::sheet_tiles(&input, entry, current)
            })?;
            for report in &reports {
                tracing::info!(
                    "{} at {}: {} of {} bytes",
                    report.id,
                    report.location,
                    report.written,
                    report.footprint
                );
            }

            std::fs::write(&output, rom.as_bytes())
                .with_context(|| format!("Failed to write ROM: {}", output.display()))?;
            tracing::info!("Inserted {} entries -> {:?}", reports.len(), output);
        }

        Commands::Compress { input, output } => {
            let raw = std::fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
            let block = gbc_lz77::compress(&raw)?;
            std::fs::write(&output, &block).with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!("{} -> {} bytes", raw.len(), block.len());
        }

        Commands::Decompress {
            input,
            output,
            offset,
        } => {
            let data = std::fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
            let block = gbc_lz77::decompress_block(&data, offset)
                .with_context(|| format!("No LZ77 block at {:#X} in {}", offset, input.display()))?;
            std::fs::write(&output, &block.data)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!("{} -> {} bytes", block.compressed_len, block.data.len());
        }
    }

    Ok(())
}
