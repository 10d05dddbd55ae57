use clap::{Args, ValueEnum};
use itertools::Itertools;
use miette::{miette, Result};
use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};
use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    fmt::Display,
    path::PathBuf,
};
use tracing::{debug, info};

use ead_sarc::{SarcArchive, SarcHeader};

use crate::commands::{read_input, sarc::unnamed_file_name};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Mode {
    /// Compare names and contents
    #[default]
    Semantic,
    /// Also compare layout and show line changes of text files
    Full,
}

#[derive(Debug, Eq, PartialEq)]
enum Change {
    Added(String, String),
    Removed(String, String),
    Comparison(String, String, String),
    Context(Vec<String>),
    Modified(String, String, Vec<Change>, Vec<Change>),
}

impl Change {
    fn modified(key: &str, value: &str) -> Self {
        Change::Modified(key.into(), value.into(), Vec::new(), Vec::new())
    }

    pub fn with_children(&mut self, children: Vec<Change>) -> Result<()> {
        match self {
            Change::Modified(_, _, vec, _) => {
                vec.extend(children);
                vec.sort();
                Ok(())
            }
            _ => Err(miette!("tried to add children to an addition or removal")),
        }
    }

    pub fn with_related(&mut self, related: Vec<Change>) -> Result<()> {
        match self {
            Change::Modified(_, _, _, vec) => {
                vec.extend(related);
                vec.sort();
                Ok(())
            }
            _ => Err(miette!("tried to add related to an addition or removal")),
        }
    }
}

impl Change {
    fn rank(&self) -> u8 {
        match self {
            Change::Comparison(..) => 0,
            Change::Context(_) => 1,
            Change::Added(..) => 2,
            Change::Removed(..) => 3,
            Change::Modified(..) => 4,
        }
    }
}

impl Ord for Change {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Change::Added(key, value), Change::Added(other_key, other_value))
            | (Change::Removed(key, value), Change::Removed(other_key, other_value)) => {
                key.cmp(other_key).then_with(|| value.cmp(other_value))
            }
            (
                Change::Comparison(key, old, new),
                Change::Comparison(other_key, other_old, other_new),
            ) => (key, old, new).cmp(&(other_key, other_old, other_new)),
            (Change::Context(lines), Change::Context(other_lines)) => lines.cmp(other_lines),
            (
                Change::Modified(key, value, children, related),
                Change::Modified(other_key, other_value, other_children, other_related),
            ) => key
                .cmp(other_key)
                .then_with(|| value.cmp(other_value))
                .then_with(|| children.cmp(other_children))
                .then_with(|| related.cmp(other_related)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Change {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Added(_, v) => {
                writeln!(f, "✅ {}", v.green())
            }
            Change::Removed(_, v) => {
                writeln!(f, "❌ {}", v.red())
            }
            Change::Comparison(key, old, new) => {
                writeln!(f, "* {}: {} vs {}", key, old.red(), new.green())
            }
            Change::Context(values) => {
                writeln!(f, "{}", values.iter().map(|l| format!(" {l}")).join("\n"))
            }
            Change::Modified(_, v, children, related) => {
                let mut txt_final = related.iter().map(|c| format!("{}", c)).join("");

                let mut section = String::new();
                let mut current_key = String::new();
                for c in children {
                    let key = match c {
                        Change::Added(key, _) => format!("* {} added:\n", key),
                        Change::Removed(key, _) => format!("* {} removed:\n", key),
                        Change::Modified(key, _, _, _) => format!("* {} modified:\n", key),
                        _ => current_key.clone(),
                    };

                    if current_key != key {
                        if !section.is_empty() {
                            txt_final.push_str(&indent(&section));
                            txt_final.push('\n');
                        }
                        section.clear();

                        txt_final.push_str(&key);
                        current_key = key
                    }

                    section.push_str(&format!("{}\n", c));
                }

                txt_final.push_str(&indent(&section));

                writeln!(f, "🔃 {}", v.blue())?;
                writeln!(
                    f,
                    "{}",
                    txt_final
                        .split('\n')
                        .filter(|l| l.trim().len() > 1)
                        .map(|l| "  ".to_string() + l)
                        .join("\n")
                )
            }
        }
    }
}

fn indent(section: &str) -> String {
    section.split('\n').map(|l| "  ".to_string() + l).join("\n")
}

/// Name a file is compared under, extracted unnamed files use the same name
fn file_key(name: Option<&str>, hash: u32) -> String {
    match name {
        Some(name) => name.to_string(),
        None => unnamed_file_name(hash),
    }
}

/// Whether `data` may hold a nested archive
fn is_archive(data: &[u8]) -> bool {
    data.starts_with(SarcHeader::MAGIC) || ead_yaz0::is_compressed(data)
}

#[derive(Args)]
pub struct DiffArgs {
    /// An input SARC file, optionally Yaz0 compressed
    #[arg(value_name = "LEFT")]
    left: PathBuf,

    /// An input SARC file, optionally Yaz0 compressed
    #[arg(value_name = "RIGHT")]
    right: PathBuf,

    /// Comparison mode
    #[arg(short, long, value_enum, default_value_t = Mode::Semantic)]
    mode: Mode,
}

impl DiffArgs {
    fn handle_text_file(&self, left: &str, right: &str) -> Option<Change> {
        let diff = TextDiff::from_lines(left, right);
        if diff.ratio() >= 1.0 {
            return None;
        }

        let mut comparison = Vec::new();
        for op in diff.ops().iter() {
            for change in diff.iter_inline_changes(op) {
                if change.tag() == ChangeTag::Equal {
                    continue;
                }

                let mut context = String::new();
                for (emphasized, value) in change.iter_strings_lossy() {
                    let value = value.trim_end_matches('\n');
                    if emphasized {
                        if change.tag() == ChangeTag::Insert {
                            context.push_str(&format!("{}", value.green().underline()));
                        } else {
                            context.push_str(&format!("{}", value.red().underline()));
                        }
                    } else {
                        context.push_str(&format!("{}", value.dimmed()));
                    }
                }
                comparison.push(context);
            }
        }

        Some(Change::Context(comparison))
    }

    fn handle_file(&self, name: &str, left: &[u8], right: &[u8]) -> Result<Option<Change>> {
        if left == right {
            return Ok(None);
        }

        let mut result = Change::modified("files", name);

        if left.len() != right.len() {
            result.with_related(vec![Change::Comparison(
                "size".into(),
                left.len().to_string(),
                right.len().to_string(),
            )])?;
        }

        if is_archive(left) && is_archive(right) {
            match (
                SarcArchive::open_compressed(left),
                SarcArchive::open_compressed(right),
            ) {
                (Ok(left), Ok(right)) => {
                    let nested = self.handle_sarc(name, &left, &right)?;
                    // equal archives only differ in layout, which only full mode reports
                    if nested.is_some() || self.mode == Mode::Semantic {
                        return Ok(nested);
                    }
                }
                (left, right) => {
                    debug!(
                        "{name} is not a pair of archives: {:?} / {:?}",
                        left.err(),
                        right.err()
                    );
                }
            }
        }

        if self.mode == Mode::Full {
            if let (Ok(left), Ok(right)) = (std::str::from_utf8(left), std::str::from_utf8(right))
            {
                if let Some(context) = self.handle_text_file(left, right) {
                    result.with_related(vec![context])?;
                }
                return Ok(Some(result));
            }
        }

        if let Some(offset) = left.iter().zip(right).position(|(l, r)| l != r) {
            result.with_related(vec![Change::Comparison(
                "first difference".into(),
                format!("{offset:#x}"),
                format!("{offset:#x}"),
            )])?;
        }

        Ok(Some(result))
    }

    fn handle_sarc(
        &self,
        name: &str,
        left: &SarcArchive<'_>,
        right: &SarcArchive<'_>,
    ) -> Result<Option<Change>> {
        let mut result: Option<Change> = None;

        if self.mode == Mode::Full {
            let mut related = Vec::new();
            if left.byte_order() != right.byte_order() {
                related.push(Change::Comparison(
                    "byte order".into(),
                    left.byte_order().to_string(),
                    right.byte_order().to_string(),
                ));
            }
            if left.guess_alignment() != right.guess_alignment() {
                related.push(Change::Comparison(
                    "alignment".into(),
                    format!("{:#x}", left.guess_alignment()),
                    format!("{:#x}", right.guess_alignment()),
                ));
            }
            if left.hash_multiplier() != right.hash_multiplier() {
                related.push(Change::Comparison(
                    "hash multiplier".into(),
                    format!("{:#x}", left.hash_multiplier()),
                    format!("{:#x}", right.hash_multiplier()),
                ));
            }
            if !related.is_empty() {
                result
                    .get_or_insert_with(|| Change::modified("sarc", name))
                    .with_related(related)?;
            }
        }

        if left.equals(right) {
            return Ok(result);
        }

        if left.len() != right.len() {
            result
                .get_or_insert_with(|| Change::modified("sarc", name))
                .with_related(vec![Change::Comparison(
                    "entries".into(),
                    left.len().to_string(),
                    right.len().to_string(),
                )])?;
        }

        let left_files = left
            .files()
            .map(|f| (file_key(f.name(), f.name_hash()), f.data()))
            .collect::<HashMap<_, _>>();
        let right_files = right
            .files()
            .map(|f| (file_key(f.name(), f.name_hash()), f.data()))
            .collect::<HashMap<_, _>>();

        let left_names = left_files.keys().collect::<HashSet<_>>();
        let right_names = right_files.keys().collect::<HashSet<_>>();
        let all_names = left_names.union(&right_names).copied().sorted().collect::<Vec<_>>();

        let files_added: Vec<Change> = all_names
            .iter()
            .filter(|f| right_names.contains(*f) && !left_names.contains(*f))
            .map(|k| Change::Added("files".into(), k.to_string()))
            .collect();

        if !files_added.is_empty() {
            result
                .get_or_insert_with(|| Change::modified("sarc", name))
                .with_children(files_added)?;
        }

        let files_removed: Vec<Change> = all_names
            .iter()
            .filter(|f| !right_names.contains(*f) && left_names.contains(*f))
            .map(|k| Change::Removed("files".into(), k.to_string()))
            .collect();

        if !files_removed.is_empty() {
            result
                .get_or_insert_with(|| Change::modified("sarc", name))
                .with_children(files_removed)?;
        }

        for file in all_names
            .iter()
            .filter(|f| right_names.contains(*f) && left_names.contains(*f))
        {
            if let (Some(data_left), Some(data_right)) =
                (left_files.get(*file), right_files.get(*file))
            {
                if let Some(c) = self.handle_file(file, data_left, data_right)? {
                    result
                        .get_or_insert_with(|| Change::modified("sarc", name))
                        .with_children(vec![c])?;
                }
            }
        }

        Ok(result)
    }

    pub fn handle(&self) -> Result<()> {
        let l = read_input(&self.left)?;
        let left = SarcArchive::open_compressed(&l)?;

        let r = read_input(&self.right)?;
        let right = SarcArchive::open_compressed(&r)?;

        let difference = self.handle_sarc(&self.left.to_string_lossy(), &left, &right)?;

        match difference {
            Some(d) => println!("{}", d),
            None => info!("archives hold the same files"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use ead_sarc::{SarcArchive, SarcWriter, SarcWriterOptions};

    use super::{Change, DiffArgs, Mode};

    fn archive(files: &[(&str, &[u8])]) -> miette::Result<Vec<u8>> {
        let mut sarc = SarcWriter::new(Vec::new(), SarcWriterOptions::default());
        for (name, data) in files {
            sarc.add_file(name, *data)?;
        }
        Ok(sarc.finish()?)
    }

    fn diff(mode: Mode) -> DiffArgs {
        DiffArgs {
            left: "left.sarc".into(),
            right: "right.sarc".into(),
            mode,
        }
    }

    #[test]
    fn equal_archives_have_no_changes() -> miette::Result<()> {
        let data = archive(&[("a.txt", b"A".as_slice())])?;
        let left = SarcArchive::open(&data)?;
        let right = SarcArchive::open(&data)?;

        assert_eq!(
            diff(Mode::Semantic).handle_sarc("left.sarc", &left, &right)?,
            None
        );

        Ok(())
    }

    #[test]
    fn report_added_removed_and_modified() -> miette::Result<()> {
        let left = archive(&[
            ("a.txt", b"A".as_slice()),
            ("b.txt", b"B".as_slice()),
        ])?;
        let right = archive(&[
            ("a.txt", b"AA".as_slice()),
            ("c.txt", b"C".as_slice()),
        ])?;
        let left = SarcArchive::open(&left)?;
        let right = SarcArchive::open(&right)?;

        let Some(Change::Modified(key, name, children, _)) =
            diff(Mode::Semantic).handle_sarc("left.sarc", &left, &right)?
        else {
            panic!("archives should differ");
        };

        assert_eq!(key, "sarc");
        assert_eq!(name, "left.sarc");
        assert!(children.contains(&Change::Added("files".into(), "c.txt".into())));
        assert!(children.contains(&Change::Removed("files".into(), "b.txt".into())));
        assert!(children
            .iter()
            .any(|c| matches!(c, Change::Modified(_, name, _, _) if name == "a.txt")));

        Ok(())
    }

    #[test]
    fn recurse_into_nested_archives() -> miette::Result<()> {
        let inner_left = archive(&[("inner.txt", b"old".as_slice())])?;
        let inner_right = archive(&[("inner.txt", b"new".as_slice())])?;
        let left = archive(&[("Pack/nested.sarc", inner_left.as_slice())])?;
        let right = archive(&[("Pack/nested.sarc", inner_right.as_slice())])?;
        let left = SarcArchive::open(&left)?;
        let right = SarcArchive::open(&right)?;

        let Some(Change::Modified(_, _, children, _)) =
            diff(Mode::Semantic).handle_sarc("left.sarc", &left, &right)?
        else {
            panic!("archives should differ");
        };

        let [Change::Modified(key, name, nested, _)] = children.as_slice() else {
            panic!("expected a single nested change, found {children:?}");
        };
        assert_eq!(key, "sarc");
        assert_eq!(name, "Pack/nested.sarc");
        assert!(nested
            .iter()
            .any(|c| matches!(c, Change::Modified(_, name, _, _) if name == "inner.txt")));

        Ok(())
    }

    #[test]
    fn nested_archives_differing_in_layout() -> miette::Result<()> {
        let mut inner = Vec::new();
        for alignment in [4, 0x80] {
            let mut sarc = SarcWriter::new(
                Vec::new(),
                SarcWriterOptions::builder().min_alignment(alignment).build(),
            );
            sarc.add_file("inner.txt", b"same".as_slice())?;
            inner.push(sarc.finish()?);
        }
        assert_ne!(inner[0], inner[1]);

        let left = archive(&[("Pack/nested.sarc", inner[0].as_slice())])?;
        let right = archive(&[("Pack/nested.sarc", inner[1].as_slice())])?;
        let left = SarcArchive::open(&left)?;
        let right = SarcArchive::open(&right)?;

        assert_eq!(
            diff(Mode::Semantic).handle_sarc("left.sarc", &left, &right)?,
            None
        );

        let Some(Change::Modified(_, _, children, _)) =
            diff(Mode::Full).handle_sarc("left.sarc", &left, &right)?
        else {
            panic!("full mode should report the layout change");
        };
        let [Change::Modified(key, name, _, related)] = children.as_slice() else {
            panic!("expected a single nested change, found {children:?}");
        };
        assert_eq!(key, "sarc");
        assert_eq!(name, "Pack/nested.sarc");
        assert!(related
            .iter()
            .any(|c| matches!(c, Change::Comparison(key, _, _) if key == "alignment")));

        Ok(())
    }
}
