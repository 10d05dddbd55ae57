use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use ead_sarc::{
    error::{Error, FileNotFoundError},
    ByteOrder, OpenOptions, SarcArchive, SarcWriter, SarcWriterOptions, UnsortedTablePolicy,
};
use pretty_assertions::{assert_eq, assert_str_eq};
use tracing::{info, instrument};
use tracing_test::traced_test;
use walkdir::WalkDir;

fn read_resource(name: &str) -> Result<Vec<u8>> {
    std::fs::read(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("resources")
            .join(name),
    )
    .into_diagnostic()
}

#[instrument(skip(options))]
fn pack_dir(dir: &Path, options: SarcWriterOptions) -> Result<Vec<u8>> {
    let mut sarc = SarcWriter::new(Vec::new(), options);
    sarc.add_alignment_requirement("sbfres", 0x100)?;

    let mut buffer = Vec::new();
    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
    {
        let name = entry
            .path()
            .strip_prefix(dir)
            .into_diagnostic()?
            .to_string_lossy()
            .replace('\\', "/");
        info!("inserting {name}");

        sarc.start_file(&name)?;
        File::open(entry.path())
            .into_diagnostic()?
            .read_to_end(&mut buffer)
            .into_diagnostic()?;
        sarc.write_all(&buffer).into_diagnostic()?;
        buffer.clear();
    }

    Ok(sarc.finish()?)
}

// The reference archives were laid out by a separate script, not by this writer. The reader
// is also checked against the hand-written byte fixtures in the unit tests.
#[traced_test]
#[test]
fn pack_matches_reference() -> Result<()> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/dungeon");

    for (byte_order, reference) in [
        (ByteOrder::Little, "dungeon.sarc"),
        (ByteOrder::Big, "dungeon.be.sarc"),
    ] {
        let actual = pack_dir(
            &dir,
            SarcWriterOptions::builder()
                .byte_order(byte_order)
                .min_alignment(8)
                .build(),
        )?;
        let expected = read_resource(reference)?;

        assert_eq!(actual.len(), expected.len());
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));
    }

    Ok(())
}

#[traced_test]
#[test]
fn rewrite_preserves_contents() -> Result<()> {
    let input = read_resource("dungeon.be.sarc")?;
    let sarc_input = SarcArchive::open(&input)?;

    let mut sarc = SarcWriter::new(Vec::new(), SarcWriterOptions::from_archive(&sarc_input));
    sarc.add_files_from(&sarc_input)?;
    let output = sarc.finish()?;
    let sarc_output = SarcArchive::open(&output)?;

    assert_eq!(sarc_output.byte_order(), ByteOrder::Big);
    assert_eq!(sarc_input.len(), sarc_output.len());
    assert!(sarc_input.equals(&sarc_output));
    for file in sarc_output.files() {
        assert_eq!(file.data_start() % 16, 0);
    }

    Ok(())
}

#[test]
fn round_trip_named_files() -> Result<()> {
    let a = b"\x00\x01\x02".to_vec();
    let b = b"hello".to_vec();

    let mut sarc = SarcWriter::new(Vec::new(), SarcWriterOptions::default());
    sarc.add_file("a.bin", a.clone())?;
    sarc.add_file("b.txt", b.clone())?;
    let data = sarc.finish()?;

    let sarc = SarcArchive::open(&data)?;
    assert_eq!(sarc.file_count(), 2);
    assert_eq!(sarc.get_by_name("a.bin")?, &a[..]);
    assert_eq!(sarc.get_by_name("b.txt")?, &b[..]);
    assert!(matches!(
        sarc.get_by_name("missing"),
        Err(Error::NotFound(FileNotFoundError::Name(_)))
    ));

    for i in 0..sarc.len() {
        let name = sarc.name_at_index(i)?;
        assert_eq!(sarc.get_by_name(name)?, sarc.get_by_index(i)?);
    }

    Ok(())
}

#[test]
fn guess_alignment_of_written_archives() -> Result<()> {
    let mut sarc = SarcWriter::new(
        Vec::new(),
        SarcWriterOptions::builder().min_alignment(8).build(),
    );
    sarc.add_file("a.bin", b"abc".to_vec())?;
    sarc.add_file("b.txt", b"defgh".to_vec())?;
    let data = sarc.finish()?;

    // data starts at 0x58 and 0x60
    let sarc = SarcArchive::open(&data)?;
    assert_eq!(sarc.data_section_offset(), 0x58);
    assert_eq!(sarc.guess_alignment(), 8);

    let mut sarc = SarcWriter::new(Vec::new(), SarcWriterOptions::default());
    sarc.add_file("empty", Vec::new())?;
    let data = sarc.finish()?;
    assert_eq!(SarcArchive::open(&data)?.guess_alignment(), 1);

    let data = SarcWriter::new(Vec::new(), SarcWriterOptions::default()).finish()?;
    let sarc = SarcArchive::open(&data)?;
    assert!(sarc.is_empty());
    assert_eq!(sarc.guess_alignment(), 1);

    Ok(())
}

#[test]
fn equals_ignores_layout() -> Result<()> {
    let mut little = SarcWriter::new(Vec::new(), SarcWriterOptions::default());
    let mut big = SarcWriter::new(
        Vec::new(),
        SarcWriterOptions::builder()
            .byte_order(ByteOrder::Big)
            .min_alignment(0x80)
            .build(),
    );
    for sarc in [&mut little, &mut big] {
        sarc.add_file("Actor/Link.bxml", b"link".to_vec())?;
        sarc.add_file("Actor/Zelda.bxml", b"zelda".to_vec())?;
        sarc.add_unnamed_file(0x1234_5678, b"hidden".to_vec());
    }
    let little = little.finish()?;
    let big = big.finish()?;

    let a = SarcArchive::open(&little)?;
    let b = SarcArchive::open(&big)?;
    assert!(a.equals(&a));
    assert!(a.equals(&b));
    assert!(b.equals(&a));
    assert_eq!(a, b);

    Ok(())
}

#[test]
fn equals_ignores_table_order() -> Result<()> {
    let mut sarc = SarcWriter::new(Vec::new(), SarcWriterOptions::default());
    sarc.add_file("a.bin", b"first".to_vec())?;
    sarc.add_file("b.txt", b"second".to_vec())?;
    let sorted = sarc.finish()?;

    // swap both records of the file table
    let mut reordered = sorted.clone();
    reordered[0x20..0x40].rotate_left(0x10);

    let options = OpenOptions::builder()
        .unsorted_table(UnsortedTablePolicy::LinearScan)
        .build();
    let a = SarcArchive::open(&sorted)?;
    let b = SarcArchive::open_with(&reordered, options)?;

    assert!(!b.is_sorted());
    assert_eq!(b.name_at_index(0)?, "b.txt");
    assert!(a.equals(&b));
    assert!(b.equals(&a));
    assert!(matches!(
        SarcArchive::open(&reordered),
        Err(Error::CorruptTable(_))
    ));

    Ok(())
}

#[test]
fn equals_detects_differences() -> Result<()> {
    let build = |files: &[(&str, &str)]| -> Result<Vec<u8>> {
        let mut sarc = SarcWriter::new(Vec::new(), SarcWriterOptions::default());
        for (name, data) in files {
            sarc.add_file(name, data.as_bytes())?;
        }
        Ok(sarc.finish()?)
    };

    let base = build(&[("a.bin", "A"), ("b.txt", "B")])?;
    let renamed = build(&[("a.bin", "A"), ("c.txt", "B")])?;
    let changed = build(&[("a.bin", "A"), ("b.txt", "b")])?;
    let fewer = build(&[("a.bin", "A")])?;

    let base = SarcArchive::open(&base)?;
    for other in [&renamed, &changed, &fewer] {
        let other = SarcArchive::open(other)?;
        assert!(!base.equals(&other));
        assert!(!other.equals(&base));
    }

    Ok(())
}

#[test]
fn hash_collisions_resolve_by_name() -> Result<()> {
    // with a multiplier of 1 the hash is the sum of the bytes
    let mut sarc = SarcWriter::new(
        Vec::new(),
        SarcWriterOptions::builder().hash_multiplier(1).build(),
    );
    sarc.add_file("ab", b"first".to_vec())?;
    sarc.add_file("ba", b"second".to_vec())?;
    sarc.add_unnamed_file(0x61 + 0x62, b"third".to_vec());
    let data = sarc.finish()?;

    let sarc = SarcArchive::open(&data)?;
    assert_eq!(sarc.hash_multiplier(), 1);
    assert_eq!(sarc.get_by_name("ab")?, b"first");
    assert_eq!(sarc.get_by_name("ba")?, b"second");
    assert_eq!(sarc.get_by_hash(0x61 + 0x62)?, b"first");
    assert!(matches!(sarc.name_at_index(2), Err(Error::NameAbsent(2))));
    assert_eq!(sarc.get_by_index(2)?, b"third");

    Ok(())
}
