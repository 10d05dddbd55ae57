use clap::Args;
use miette::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;

use ead_sarc::SarcArchive;

use crate::commands::read_input;

#[derive(Args)]
pub struct ListArgs {
    /// An input SARC file, optionally Yaz0 compressed
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_input(&self.file)?;
        let sarc = SarcArchive::open_compressed(&data)?;

        println!(
            "{}: {}, {} files, alignment {:#x}",
            self.file.display().bold(),
            sarc.byte_order(),
            sarc.len(),
            sarc.guess_alignment()
        );

        for file in sarc.files() {
            let name = match file.name() {
                Some(name) => name.to_string(),
                None => "<unnamed>".dimmed().to_string(),
            };
            println!("{:>10} {:08x} {}", file.len(), file.name_hash(), name);
        }

        Ok(())
    }
}
