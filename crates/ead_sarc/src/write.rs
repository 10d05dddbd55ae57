//! Types for writing SARC archives
//!

use binrw::{BinWrite, Endian};
use bon::Builder;
use indexmap::IndexMap;
use std::io::{self, Cursor, Read, Write};
use tracing::{debug, instrument, Level};

use crate::bytes::ByteOrder;
use crate::error::{Error, Result};
use crate::hash::{hash_name, DEFAULT_HASH_MULTIPLIER};
use crate::header::SarcHeader;
use crate::read::SarcArchive;
use crate::table::FileTable;
use crate::types::{ResFatEntry, ResFatHeader, ResFntHeader, ResHeader};

/// Options for how the SARC file should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct SarcWriterOptions {
    /// Byte order of the archive, little endian unless told otherwise
    #[builder(default)]
    pub byte_order: ByteOrder,

    /// Alignment every file is padded to, must be a power of two
    #[builder(default = 4)]
    pub min_alignment: usize,

    /// Multiplier used to hash file names
    #[builder(default = DEFAULT_HASH_MULTIPLIER)]
    pub hash_multiplier: u32,
}

impl Default for SarcWriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SarcWriterOptions {
    /// Options reproducing the layout of an existing archive
    pub fn from_archive(archive: &SarcArchive<'_>) -> Self {
        Self::builder()
            .byte_order(archive.byte_order())
            .min_alignment(archive.guess_alignment())
            .hash_multiplier(archive.hash_multiplier())
            .build()
    }
}

/// A file queued for writing, borrowed from the writer
#[derive(Debug)]
struct PendingFile<'a> {
    hash: u32,
    name: Option<&'a str>,
    data: &'a [u8],
    alignment: usize,
}

/// SARC archive generator
///
/// Files are kept in memory until [`SarcWriter::finish`] lays out and writes the archive.
///
/// ```
/// # fn doit() -> ead_sarc::error::Result<()>
/// # {
/// # use ead_sarc::{ByteOrder, SarcWriter};
/// use std::io::Write;
/// use ead_sarc::write::SarcWriterOptions;
///
/// let mut sarc = SarcWriter::new(Vec::new(), SarcWriterOptions::builder()
///            .byte_order(ByteOrder::Big)
///            .build());
///
/// sarc.start_file("hello_world.txt")?;
/// sarc.write_all(b"Hello, World!")?;
/// sarc.add_file("Actor/Link.bxml", vec![0u8; 16])?;
///
/// let data = sarc.finish()?;
/// let archive = ead_sarc::SarcArchive::open(&data)?;
/// assert_eq!(archive.get_by_name("hello_world.txt")?, b"Hello, World!");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct SarcWriter<W: Write> {
    inner: W,
    options: SarcWriterOptions,
    alignment_requirements: IndexMap<String, usize>,
    files: IndexMap<String, Vec<u8>>,
    unnamed: Vec<(u32, Vec<u8>)>,
    current: Option<String>,
}

impl<W: Write> SarcWriter<W> {
    /// Initializes the archive.
    ///
    /// Either add whole files with [`SarcWriter::add_file`], or call [`SarcWriter::start_file`]
    /// and stream the contents through [`std::io::Write`].
    pub fn new(inner: W, options: SarcWriterOptions) -> SarcWriter<W> {
        SarcWriter {
            inner,
            options,
            alignment_requirements: IndexMap::new(),
            files: IndexMap::new(),
            unnamed: Vec::new(),
            current: None,
        }
    }

    /// Returns true if a file is currently open for writing.
    pub const fn is_writing_file(&self) -> bool {
        self.current.is_some()
    }

    /// Number of files queued so far
    pub fn len(&self) -> usize {
        self.files.len() + self.unnamed.len()
    }

    /// Whether no file has been queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start a new, empty file. Writes go to it until another file is started or added.
    ///
    /// Starting a file with a name already in use discards the previous contents.
    #[instrument(skip(self, name), err)]
    pub fn start_file(&mut self, name: impl ToString) -> Result<()> {
        let name = Self::check_name(name.to_string())?;
        self.files.insert(name.clone(), Vec::new());
        self.current = Some(name);

        Ok(())
    }

    /// Add a whole file, replacing any file of the same name.
    #[instrument(skip(self, name, data), err)]
    pub fn add_file(&mut self, name: impl ToString, data: impl Into<Vec<u8>>) -> Result<()> {
        let name = Self::check_name(name.to_string())?;
        self.current = None;
        self.files.insert(name, data.into());

        Ok(())
    }

    /// Add a file that is only known by its name hash.
    pub fn add_unnamed_file(&mut self, hash: u32, data: impl Into<Vec<u8>>) {
        self.current = None;
        self.unnamed.push((hash, data.into()));
    }

    /// Remove a named file, returning its contents.
    pub fn remove_file(&mut self, name: &str) -> Option<Vec<u8>> {
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        self.files.shift_remove(name)
    }

    /// Require files with the given extension to be aligned to `alignment` bytes.
    ///
    /// The extension is matched against everything after the last `.` of a file name.
    pub fn add_alignment_requirement(
        &mut self,
        extension: impl ToString,
        alignment: usize,
    ) -> Result<()> {
        if !alignment.is_power_of_two() {
            return Err(Error::InvalidAlignment(alignment));
        }
        self.alignment_requirements
            .insert(extension.to_string(), alignment);

        Ok(())
    }

    /// Queue every file of `archive`, named or not.
    pub fn add_files_from(&mut self, archive: &SarcArchive<'_>) -> Result<()> {
        for file in archive.files() {
            match file.name() {
                Some(name) => self.add_file(name, file.data())?,
                None => self.add_unnamed_file(file.name_hash(), file.data()),
            }
        }

        Ok(())
    }

    fn check_name(name: String) -> Result<String> {
        if name.is_empty() || name.contains('\0') {
            return Err(Error::InvalidName(name));
        }
        Ok(name)
    }

    fn alignment_for(&self, name: Option<&str>) -> usize {
        name.and_then(|name| name.rsplit_once('.'))
            .and_then(|(_, extension)| self.alignment_requirements.get(extension))
            .map_or(self.options.min_alignment, |&required| {
                // powers of two, so the larger one is also the least common multiple
                required.max(self.options.min_alignment)
            })
    }

    /// Lay out the archive and return it as a buffer.
    #[instrument(skip(self), err, fields(files = self.len()))]
    pub fn to_binary(&self) -> Result<Vec<u8>> {
        let options = &self.options;
        if !options.min_alignment.is_power_of_two() {
            return Err(Error::InvalidAlignment(options.min_alignment));
        }

        let count = self.len();
        if count > FileTable::MAX_FILES {
            return Err(Error::TooManyFiles(count));
        }

        let mut pending: Vec<PendingFile<'_>> = self
            .files
            .iter()
            .map(|(name, data)| PendingFile {
                hash: hash_name(options.hash_multiplier, name),
                name: Some(name.as_str()),
                data,
                alignment: self.alignment_for(Some(name)),
            })
            .chain(self.unnamed.iter().map(|(hash, data)| PendingFile {
                hash: *hash,
                name: None,
                data,
                alignment: options.min_alignment,
            }))
            .collect();
        pending.sort_by_key(|file| file.hash);

        let names_offset = SarcHeader::SIZE
            + FileTable::SFAT_SIZE
            + FileTable::ENTRY_SIZE * count
            + FileTable::SFNT_SIZE;

        let mut attributes = Vec::with_capacity(count);
        let mut ranges = Vec::with_capacity(count);
        let mut names_len = 0usize;
        let mut data_len = 0usize;
        let mut previous_hash = None;
        let mut collisions = 0u32;
        for file in &pending {
            attributes.push(match file.name {
                Some(name) => {
                    collisions = match previous_hash {
                        Some(hash) if hash == file.hash => (collisions + 1).min(0xFF),
                        _ => 1,
                    };
                    previous_hash = Some(file.hash);

                    let word = names_len / 4;
                    if word > FileTable::NAME_OFFSET_MASK as usize {
                        return Err(Error::ArchiveTooLarge(names_offset + names_len));
                    }
                    names_len += (name.len() + 1).next_multiple_of(4);
                    (collisions << FileTable::COLLISION_SHIFT) | word as u32
                }
                None => 0,
            });

            let start = data_len.next_multiple_of(file.alignment);
            data_len = start + file.data.len();
            ranges.push((start, data_len));
        }

        let data_alignment = pending
            .iter()
            .map(|file| file.alignment)
            .max()
            .unwrap_or(options.min_alignment);
        let data_offset = (names_offset + names_len).next_multiple_of(data_alignment);
        let file_size = data_offset + data_len;
        if u32::try_from(file_size).is_err() {
            return Err(Error::ArchiveTooLarge(file_size));
        }

        let endian = Endian::from(options.byte_order);
        let mut out = Cursor::new(Vec::with_capacity(file_size));

        ResHeader {
            header_size: SarcHeader::SIZE as u16,
            bom: ByteOrder::MARK,
            file_size: file_size as u32,
            data_offset: data_offset as u32,
            version: SarcHeader::VERSION,
            reserved: 0,
        }
        .write_options(&mut out, endian, ())?;

        ResFatHeader {
            header_size: FileTable::SFAT_SIZE as u16,
            num_files: count as u16,
            hash_multiplier: options.hash_multiplier,
        }
        .write_options(&mut out, endian, ())?;

        for ((file, name_attributes), (start, end)) in pending.iter().zip(attributes).zip(&ranges)
        {
            ResFatEntry {
                name_hash: file.hash,
                name_attributes,
                data_start: *start as u32,
                data_end: *end as u32,
            }
            .write_options(&mut out, endian, ())?;
        }

        ResFntHeader {
            header_size: FileTable::SFNT_SIZE as u16,
            reserved: 0,
        }
        .write_options(&mut out, endian, ())?;

        for name in pending.iter().filter_map(|file| file.name) {
            out.write_all(name.as_bytes())?;
            out.write_all(&[0])?;
            let end = out.get_ref().len().next_multiple_of(4);
            pad_to(&mut out, end)?;
        }

        for (file, (start, _)) in pending.iter().zip(&ranges) {
            pad_to(&mut out, data_offset + start)?;
            out.write_all(file.data)?;
        }

        debug!(
            files = count,
            size = file_size,
            data_offset,
            byte_order = %options.byte_order,
            "laid out archive"
        );

        Ok(out.into_inner())
    }

    /// Write the archive to the inner writer
    ///
    /// This will return the writer, but one should normally not append any data to the end of the file.
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        let data = self.to_binary()?;
        self.inner.write_all(&data)?;

        Ok(self.inner)
    }
}

/// Zero fill `out` up to `position`.
fn pad_to(out: &mut Cursor<Vec<u8>>, position: usize) -> io::Result<()> {
    let len = out.get_ref().len();
    if position > len {
        io::copy(&mut io::repeat(0).take((position - len) as u64), out)?;
    }

    Ok(())
}

impl<W: Write> Write for SarcWriter<W> {
    #[instrument(skip_all, err, ret(level = Level::TRACE), fields(size=buf.len()) )]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(name) = &self.current else {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "No file has been started",
            ));
        };
        let Some(data) = self.files.get_mut(name) else {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "The started file has been removed",
            ));
        };
        data.extend_from_slice(buf);

        Ok(buf.len())
    }

    #[instrument(skip(self), err)]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
