use clap::{Args, ValueEnum};
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{fs::File, path::PathBuf};
use tracing::info;
use walkdir::WalkDir;

use ead_sarc::{write::SarcWriterOptions, ByteOrder, SarcWriter};

use crate::commands::create_output;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Endian {
    Big,
    #[default]
    Little,
}

impl From<Endian> for ByteOrder {
    fn from(value: Endian) -> Self {
        match value {
            Endian::Big => ByteOrder::Big,
            Endian::Little => ByteOrder::Little,
        }
    }
}

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target SARC file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Byte order of the archive
    #[arg(short, long, value_enum, default_value_t = Endian::Little)]
    byte_order: Endian,

    /// Alignment of every file, a power of two
    #[arg(short, long, default_value_t = 4)]
    alignment: usize,

    /// Alignment for files with a given extension, e.g. `sbfres=0x1000`
    #[arg(long = "align", value_name = "EXT=N", value_parser = parse_requirement)]
    requirements: Vec<(String, usize)>,
}

fn parse_requirement(value: &str) -> std::result::Result<(String, usize), String> {
    let (extension, alignment) = value
        .split_once('=')
        .ok_or_else(|| format!("expected EXT=N, found {value}"))?;

    let alignment = match alignment.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => alignment.parse(),
    }
    .map_err(|e| format!("invalid alignment {alignment}: {e}"))?;

    Ok((extension.trim_start_matches('.').to_string(), alignment))
}

/// Hash of a file named like an extracted unnamed entry, `0123abcd.bin`
fn unnamed_hash(name: &str) -> Option<u32> {
    let hex = name.strip_suffix(".bin")?;
    if hex.len() != 8 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        info!("creating {}", &self.file.display());

        let files = WalkDir::new(&self.directory)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(miette!("directory is empty"));
        }

        let mut out = create_output(&self.file, self.overwrite)?;

        let mut sarc = SarcWriter::new(
            &mut out,
            SarcWriterOptions::builder()
                .byte_order(self.byte_order.into())
                .min_alignment(self.alignment)
                .build(),
        );
        for (extension, alignment) in &self.requirements {
            sarc.add_alignment_requirement(extension, *alignment)?;
        }

        for file in files {
            let relative = file
                .path()
                .strip_prefix(&self.directory)
                .into_diagnostic()?;
            let name = relative
                .iter()
                .map(|c| {
                    c.to_str()
                        .ok_or(miette!("unable to convert {} to a string", relative.display()))
                })
                .collect::<Result<Vec<_>>>()?
                .join("/");

            let mut f = File::open(file.path())
                .into_diagnostic()
                .context(format!("opening {}", file.path().display()))?;

            match unnamed_hash(&name) {
                Some(hash) => {
                    info!("packing {} as unnamed file {hash:08x}", name);
                    let mut data = Vec::new();
                    std::io::copy(&mut f, &mut data)
                        .into_diagnostic()
                        .context(format!("reading {}", file.path().display()))?;
                    sarc.add_unnamed_file(hash, data);
                }
                None => {
                    info!("packing {}", name);
                    sarc.start_file(&name)
                        .context(format!("starting entry for {}", name))?;
                    std::io::copy(&mut f, &mut sarc)
                        .into_diagnostic()
                        .context(format!("copying {}", file.path().display()))?;
                }
            }
        }

        sarc.finish().context("finalizing sarc file")?;

        Ok(())
    }
}
