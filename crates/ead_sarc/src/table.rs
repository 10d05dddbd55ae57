//! Parsing and querying of the file allocation and file name tables.

use std::ops::Range;

use tracing::{debug, instrument, warn};

use crate::bytes::ByteReader;
use crate::error::{Error, Result};
use crate::hash::hash_name;
use crate::header::SarcHeader;

/// How to treat a file table that is not sorted by name hash
///
/// Archives produced by the game tools are always sorted. A table out of order is either corrupt
/// or hand crafted, and binary search over it would miss files.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum UnsortedTablePolicy {
    /// Refuse to open the archive with [`Error::CorruptTable`]
    #[default]
    Reject,

    /// Open the archive and look files up with a linear scan
    LinearScan,
}

/// One file of an archive
///
/// Holds absolute offsets into the archive buffer, never the data itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Hash of the file name
    pub name_hash: u32,

    /// Name of the file, absent for entries that only carry a hash
    pub name: Option<Box<str>>,

    /// Absolute offset of the first byte of the file
    pub data_start: u32,

    /// Absolute offset one past the last byte of the file
    pub data_end: u32,
}

impl FileEntry {
    /// Name of the file, if the archive stores one
    ///
    /// A record carries a name only when the collision counter in the high byte of its
    /// attributes is nonzero. Name offset bits alongside a zero counter are ignored.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Size of the file in bytes
    pub fn len(&self) -> usize {
        (self.data_end - self.data_start) as usize
    }

    /// Whether the file holds no data
    pub fn is_empty(&self) -> bool {
        self.data_start == self.data_end
    }

    pub(crate) fn range(&self) -> Range<usize> {
        self.data_start as usize..self.data_end as usize
    }
}

/// The parsed, queryable file table of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTable {
    hash_multiplier: u32,
    entries: Vec<FileEntry>,
    sorted: bool,
}

impl FileTable {
    /// The magic number of the file allocation table
    pub const SFAT_MAGIC: &'static [u8; 4] = b"SFAT";

    /// Size of the file allocation table header, including the magic
    pub const SFAT_SIZE: usize = 0x0C;

    /// The magic number of the file name table
    pub const SFNT_MAGIC: &'static [u8; 4] = b"SFNT";

    /// Size of the file name table header, including the magic
    pub const SFNT_SIZE: usize = 0x08;

    /// Size of a single file record
    pub const ENTRY_SIZE: usize = 0x10;

    /// Largest number of files a table can hold
    pub const MAX_FILES: usize = 0x3FFF;

    pub(crate) const NAME_OFFSET_MASK: u32 = 0x00FF_FFFF;
    pub(crate) const COLLISION_SHIFT: u32 = 24;

    /// Parse the tables following `header` in `data`.
    #[instrument(skip_all, err)]
    pub fn parse(data: &[u8], header: &SarcHeader, policy: UnsortedTablePolicy) -> Result<Self> {
        let reader = ByteReader::new(data, header.byte_order);

        let sfat = SarcHeader::SIZE;
        Self::check_section(&reader, sfat, Self::SFAT_MAGIC, Self::SFAT_SIZE)?;

        let count = reader.u16_at(sfat + 6)? as usize;
        if count > Self::MAX_FILES {
            return Err(Error::CorruptTable(format!(
                "{count} files exceed the maximum of {:#x}",
                Self::MAX_FILES
            )));
        }
        let hash_multiplier = reader.u32_at(sfat + 8)?;

        let entries_offset = sfat + Self::SFAT_SIZE;
        let sfnt = entries_offset + Self::ENTRY_SIZE * count;
        reader.span(entries_offset, Self::ENTRY_SIZE * count)?;
        Self::check_section(&reader, sfnt, Self::SFNT_MAGIC, Self::SFNT_SIZE)?;

        let names_offset = sfnt + Self::SFNT_SIZE;
        if names_offset > header.data_offset as usize {
            return Err(Error::CorruptTable(format!(
                "name table at {names_offset:#x} starts after the data section at {:#x}",
                header.data_offset
            )));
        }

        let entries = (0..count)
            .map(|i| {
                Self::parse_entry(
                    &reader,
                    entries_offset + i * Self::ENTRY_SIZE,
                    names_offset,
                    header.data_offset,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let sorted = entries
            .windows(2)
            .all(|pair| pair[0].name_hash <= pair[1].name_hash);
        if !sorted {
            match policy {
                UnsortedTablePolicy::Reject => {
                    return Err(Error::CorruptTable(
                        "entries are not sorted by name hash".into(),
                    ))
                }
                UnsortedTablePolicy::LinearScan => {
                    warn!("entries are not sorted by name hash, falling back to linear lookups")
                }
            }
        }

        debug!(count, hash_multiplier, sorted, "parsed file table");

        Ok(FileTable {
            hash_multiplier,
            entries,
            sorted,
        })
    }

    fn check_section(
        reader: &ByteReader<'_>,
        offset: usize,
        magic: &'static [u8; 4],
        size: usize,
    ) -> Result<()> {
        let found = reader.span(offset, magic.len())?;
        if found != magic {
            return Err(Error::CorruptTable(format!(
                "expected {} at {offset:#x}, found {found:02x?}",
                String::from_utf8_lossy(magic)
            )));
        }

        let header_size = reader.u16_at(offset + 4)? as usize;
        if header_size != size {
            return Err(Error::CorruptTable(format!(
                "{} header size {header_size:#x}, expected {size:#x}",
                String::from_utf8_lossy(magic)
            )));
        }

        Ok(())
    }

    fn parse_entry(
        reader: &ByteReader<'_>,
        offset: usize,
        names_offset: usize,
        data_offset: u32,
    ) -> Result<FileEntry> {
        let name_hash = reader.u32_at(offset)?;
        let attributes = reader.u32_at(offset + 4)?;
        let start = reader.u32_at(offset + 8)?;
        let end = reader.u32_at(offset + 12)?;

        let name = if attributes >> Self::COLLISION_SHIFT != 0 {
            let name_offset = names_offset + (attributes & Self::NAME_OFFSET_MASK) as usize * 4;
            let raw = reader.cstr_at(name_offset)?;
            let name = std::str::from_utf8(raw).map_err(|e| {
                Error::CorruptTable(format!("name at {name_offset:#x} is not utf-8: {e}"))
            })?;
            Some(name.into())
        } else {
            None
        };

        let (Some(data_start), Some(data_end)) =
            (data_offset.checked_add(start), data_offset.checked_add(end))
        else {
            return Err(Error::CorruptTable(format!(
                "data range {start:#x}..{end:#x} of record at {offset:#x} overflows"
            )));
        };
        if data_start > data_end {
            return Err(Error::CorruptTable(format!(
                "data range {start:#x}..{end:#x} of record at {offset:#x} is reversed"
            )));
        }
        reader.span(data_start as usize, (data_end - data_start) as usize)?;

        Ok(FileEntry {
            name_hash,
            name,
            data_start,
            data_end,
        })
    }

    /// Multiplier used to hash names in this table
    pub fn hash_multiplier(&self) -> u32 {
        self.hash_multiplier
    }

    /// All entries in table order
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the entries are sorted by hash, enabling binary search
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Get an entry by index
    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.entries.get(index)
    }

    /// Index of the entry called `name`.
    ///
    /// Entries sharing the hash of `name` are compared by name, so hash collisions never return
    /// the wrong file.
    pub fn position(&self, name: &str) -> Option<usize> {
        let hash = hash_name(self.hash_multiplier, name);
        if self.sorted {
            let start = self.entries.partition_point(|e| e.name_hash < hash);
            self.entries[start..]
                .iter()
                .take_while(|e| e.name_hash == hash)
                .position(|e| e.name() == Some(name))
                .map(|i| start + i)
        } else {
            self.entries
                .iter()
                .position(|e| e.name_hash == hash && e.name() == Some(name))
        }
    }

    /// Index of the first entry with the given hash.
    pub fn position_of_hash(&self, hash: u32) -> Option<usize> {
        if self.sorted {
            let start = self.entries.partition_point(|e| e.name_hash < hash);
            self.entries
                .get(start)
                .filter(|e| e.name_hash == hash)
                .map(|_| start)
        } else {
            self.entries.iter().position(|e| e.name_hash == hash)
        }
    }
}
