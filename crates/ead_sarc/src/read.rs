//! Types for reading SARC archives
//!

use bon::Builder;
use std::{
    borrow::Cow,
    collections::HashMap,
    fmt::{self, Debug},
};
use tracing::{debug, instrument};

use crate::{
    bytes::ByteOrder,
    error::{Error, FileNotFoundError, Result, SizeMismatch},
    header::SarcHeader,
    table::{FileEntry, FileTable, UnsortedTablePolicy},
};

/// Alignment is never reported above 2^13 bytes
const MAX_ALIGNMENT_SHIFT: u32 = 13;

/// Options for how a SARC archive should be opened
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct OpenOptions {
    /// What to do with a file table that is not sorted by name hash
    #[builder(default)]
    pub unsorted_table: UnsortedTablePolicy,

    /// Fail with [`Error::SizeMismatch`] instead of warning when the declared archive size does
    /// not match the buffer
    #[builder(default)]
    pub strict_size: bool,
}

/// A file of a SARC archive, borrowed from the archive buffer
#[derive(Clone, Copy)]
pub struct SarcFile<'a> {
    index: usize,
    entry: &'a FileEntry,
    data: &'a [u8],
}

impl Debug for SarcFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SarcFile({}, {:#?})", self.index, self.entry)
    }
}

/// Methods for retrieving information on SARC file entries
impl<'a> SarcFile<'a> {
    /// Position of the file in the file table
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the name of the file, if the archive stores one
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`).
    pub fn name(&self) -> Option<&'a str> {
        self.entry.name()
    }

    /// Get the hash of the file name
    pub fn name_hash(&self) -> u32 {
        self.entry.name_hash
    }

    /// Get the contents of the file
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Get the absolute offset of the file data in the archive
    pub fn data_start(&self) -> u32 {
        self.entry.data_start
    }

    /// Get the size of the file, in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the file holds no data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn key(&self) -> ContentKey<'a> {
        match self.entry.name() {
            Some(name) => ContentKey::Named(name),
            None => ContentKey::Unnamed(self.entry.name_hash),
        }
    }
}

/// Identity of a file when comparing archive contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ContentKey<'k> {
    Named(&'k str),
    Unnamed(u32),
}

/// SARC archive reader
///
/// The archive borrows the buffer it was opened from, and every lookup returns a slice of that
/// buffer without copying.
///
/// ```no_run
/// fn list_sarc_contents(data: &[u8]) -> ead_sarc::error::Result<()> {
///     let sarc = ead_sarc::SarcArchive::open(data)?;
///
///     for file in sarc.files() {
///         println!("{:?}: {} bytes", file.name(), file.len());
///     }
///
///     Ok(())
/// }
/// ```
pub struct SarcArchive<'a> {
    data: Cow<'a, [u8]>,
    header: SarcHeader,
    table: FileTable,
}

impl Debug for SarcArchive<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SarcArchive")
            .field("header", &self.header)
            .field("files", &self.table.len())
            .finish_non_exhaustive()
    }
}

impl<'a> SarcArchive<'a> {
    /// Open an archive with the default [`OpenOptions`].
    pub fn open(data: &'a [u8]) -> Result<SarcArchive<'a>> {
        Self::open_with(data, OpenOptions::default())
    }

    /// Open an archive.
    pub fn open_with(data: &'a [u8], options: OpenOptions) -> Result<SarcArchive<'a>> {
        Self::from_cow(Cow::Borrowed(data), options)
    }

    /// Open an archive that may be Yaz0 compressed, with the default [`OpenOptions`].
    ///
    /// Compressed input is decompressed in full before parsing and the archive takes ownership of
    /// the decompressed buffer.
    #[cfg(feature = "yaz0")]
    pub fn open_compressed(data: &'a [u8]) -> Result<SarcArchive<'a>> {
        Self::open_compressed_with(data, OpenOptions::default())
    }

    /// Open an archive that may be Yaz0 compressed.
    #[cfg(feature = "yaz0")]
    #[instrument(skip_all, err, fields(size = data.len()))]
    pub fn open_compressed_with(data: &'a [u8], options: OpenOptions) -> Result<SarcArchive<'a>> {
        if !ead_yaz0::is_compressed(data) {
            return Self::open_with(data, options);
        }

        let decompressed = ead_yaz0::decompress(data)?;
        debug!(
            compressed = data.len(),
            decompressed = decompressed.len(),
            "decompressed archive"
        );
        Self::from_cow(Cow::Owned(decompressed), options)
    }

    #[instrument(skip_all, err, fields(size = data.len()))]
    fn from_cow(data: Cow<'a, [u8]>, options: OpenOptions) -> Result<SarcArchive<'a>> {
        let header = SarcHeader::parse(&data)?;
        if options.strict_size {
            if let Some(mismatch) = header.size_mismatch {
                return Err(Error::SizeMismatch(mismatch));
            }
        }

        let table = FileTable::parse(&data, &header, options.unsorted_table)?;
        debug!(
            files = table.len(),
            byte_order = %header.byte_order,
            data_offset = header.data_offset,
            "opened archive"
        );

        Ok(SarcArchive {
            data,
            header,
            table,
        })
    }

    /// Number of files in the archive, as stored in the file table
    pub fn file_count(&self) -> u16 {
        // the table never holds more than 0x3FFF entries
        self.table.len() as u16
    }

    /// Number of files in the archive
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the archive contains no files
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Byte order of the archive
    pub fn byte_order(&self) -> ByteOrder {
        self.header.byte_order
    }

    /// Absolute offset of the data section
    pub fn data_section_offset(&self) -> u32 {
        self.header.data_offset
    }

    /// Multiplier used to hash file names
    pub fn hash_multiplier(&self) -> u32 {
        self.table.hash_multiplier()
    }

    /// Format version of the archive
    pub fn version(&self) -> u16 {
        self.header.version
    }

    /// Disagreement between the declared archive size and the buffer, if any
    pub fn size_mismatch(&self) -> Option<SizeMismatch> {
        self.header.size_mismatch
    }

    /// Whether lookups use binary search over a sorted file table
    pub fn is_sorted(&self) -> bool {
        self.table.is_sorted()
    }

    /// The parsed header
    pub fn header(&self) -> &SarcHeader {
        &self.header
    }

    /// The parsed file table
    pub fn table(&self) -> &FileTable {
        &self.table
    }

    /// Get the index of a file entry by name, if it's present.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.table.position(name)
    }

    /// Get the contents of a file by name
    pub fn get_by_name(&self, name: &str) -> Result<&[u8]> {
        let Some(index) = self.table.position(name) else {
            return Err(Error::NotFound(FileNotFoundError::Name(name.to_owned())));
        };
        self.get_by_index(index)
    }

    /// Get the contents of the first file with the given name hash
    ///
    /// This is the only way to look up files that are stored without a name.
    pub fn get_by_hash(&self, hash: u32) -> Result<&[u8]> {
        let Some(index) = self.table.position_of_hash(hash) else {
            return Err(Error::NotFound(FileNotFoundError::Hash(hash)));
        };
        self.get_by_index(index)
    }

    /// Get the contents of a file by index
    pub fn get_by_index(&self, index: usize) -> Result<&[u8]> {
        self.file(index).map(|file| file.data())
    }

    /// Get the name of a file by index
    pub fn name_at_index(&self, index: usize) -> Result<&str> {
        self.file(index)?.name().ok_or(Error::NameAbsent(index))
    }

    /// Get a contained file by index
    pub fn file(&self, index: usize) -> Result<SarcFile<'_>> {
        let entry = self.table.get(index).ok_or(Error::IndexOutOfRange {
            index,
            count: self.table.len(),
        })?;

        Ok(self.view(index, entry))
    }

    /// Iterate over all files in table order
    pub fn files(&self) -> impl ExactSizeIterator<Item = SarcFile<'_>> {
        self.table
            .entries()
            .iter()
            .enumerate()
            .map(move |(index, entry)| self.view(index, entry))
    }

    fn view<'s>(&'s self, index: usize, entry: &'s FileEntry) -> SarcFile<'s> {
        // ranges are checked against the buffer when the table is parsed
        let data = self.data.get(entry.range()).unwrap_or_default();
        SarcFile { index, entry, data }
    }

    /// Infer the alignment the archive was written with.
    ///
    /// The result is the largest power of two dividing the absolute start of every non empty
    /// file, capped at 2^13. Archives without such a file report 1.
    pub fn guess_alignment(&self) -> usize {
        let starts = self
            .table
            .entries()
            .iter()
            .filter(|entry| !entry.is_empty() && entry.data_start != 0)
            .fold(0u32, |bits, entry| bits | entry.data_start);

        if starts == 0 {
            return 1;
        }
        1 << starts.trailing_zeros().min(MAX_ALIGNMENT_SHIFT)
    }

    /// Whether both archives hold the same files.
    ///
    /// Files are matched by name, or by hash when they have none, and by content. Table order,
    /// offsets, padding and byte order are ignored.
    pub fn equals(&self, other: &SarcArchive<'_>) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let mut counts: HashMap<(ContentKey<'_>, &[u8]), usize> =
            HashMap::with_capacity(self.len());
        for file in self.files() {
            *counts.entry((file.key(), file.data())).or_default() += 1;
        }

        for file in other.files() {
            match counts.get_mut(&(file.key(), file.data())) {
                Some(count) if *count > 0 => *count -= 1,
                _ => return false,
            }
        }

        true
    }

    /// Borrow the whole archive buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Unwrap and return the archive buffer
    pub fn into_inner(self) -> Cow<'a, [u8]> {
        self.data
    }
}

impl<'b> PartialEq<SarcArchive<'b>> for SarcArchive<'_> {
    fn eq(&self, other: &SarcArchive<'b>) -> bool {
        self.equals(other)
    }
}

impl Eq for SarcArchive<'_> {}
