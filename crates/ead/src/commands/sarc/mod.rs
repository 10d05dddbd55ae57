pub mod diff;
pub mod extract;
pub mod list;
pub mod pack;

#[derive(clap::Subcommand)]
pub enum SarcCommands {
    /// Compare two SARC archives
    Diff(diff::DiffArgs),
    /// Extract a SARC archive into a directory
    Extract(extract::ExtractArgs),
    /// List the files of a SARC archive
    List(list::ListArgs),
    /// Pack a directory into a SARC archive
    Pack(pack::PackArgs),
}

impl SarcCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            SarcCommands::Diff(diff) => diff.handle(),
            SarcCommands::Extract(extract) => extract.handle(),
            SarcCommands::List(list) => list.handle(),
            SarcCommands::Pack(pack) => pack.handle(),
        }
    }
}

/// Name used on disk for a file stored without a name
pub(crate) fn unnamed_file_name(hash: u32) -> String {
    format!("{hash:08x}.bin")
}
