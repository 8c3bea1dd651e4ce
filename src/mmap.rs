use std::{fs::File, path::Path};

use memmap2::MmapOptions;
use rayon::prelude::*;

use crate::{
    error::Result,
    parser::{decode_line, encode_line, key_lines, line_number},
    Mapping,
};

/// Outcome of a bulk load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    /// Non-empty lines read.
    pub keys: usize,
    /// Entries held by the mapping afterwards.
    pub distinct: usize,
    /// Lines whose key did not read back the line that last wrote it.
    pub mismatches: usize,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.mismatches == 0
    }
}

/// Inserts every key of the file at `path` into `map`, then checks every key
/// on `threads` workers.
///
/// Inserts are sequential and each key is read back right after it is
/// written. A key listed more than once keeps the number of its last line,
/// so the parallel check only requires that the stored line number points
/// back at a line holding the same key. A line failing either check counts
/// once in [`Report::mismatches`].
pub fn with_mmap<M: Mapping + Sync>(
    path: &Path,
    map: &mut M,
    threads: usize,
) -> Result<Report> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(Report {
            distinct: map.len(),
            ..Report::default()
        });
    }
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    #[cfg(unix)]
    mmap.advise(memmap2::Advice::Sequential)?;

    let lines = key_lines(&mmap)
        .map(|(line, key)| Ok((line_number(line)?, key)))
        .collect::<Result<Vec<(u32, &[u8])>>>()?;
    tracing::debug!(keys = lines.len(), path = %path.display(), "key file mapped");

    let mut written = Vec::with_capacity(lines.len());
    for &(line, key) in &lines {
        map.set(key, &encode_line(line))?;
        written.push(map.get_value(key).and_then(decode_line) == Some(line));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(std::io::Error::other)?;
    let map = &*map;
    let mismatches = pool.install(|| {
        lines
            .par_iter()
            .zip(written.par_iter())
            .filter(|&(&(_, key), &fresh)| !fresh || !reads_back(map, &lines, key))
            .count()
    });

    let report = Report {
        keys: lines.len(),
        distinct: map.len(),
        mismatches,
    };
    tracing::info!(
        keys = report.keys,
        distinct = report.distinct,
        mismatches = report.mismatches,
        "bulk load finished"
    );
    Ok(report)
}

fn reads_back<M: Mapping>(map: &M, lines: &[(u32, &[u8])], key: &[u8]) -> bool {
    let Some(line) = map.get_value(key).and_then(decode_line) else {
        return false;
    };
    lines
        .binary_search_by_key(&line, |&(number, _)| number)
        .is_ok_and(|index| lines[index].1 == key)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::{OrderedTree, Table};

    fn key_file(contents: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.txt");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn duplicates_keep_last_line() {
        let (_dir, path) = key_file("a\nb\na\n");
        let mut table = Table::new().unwrap();
        let report = with_mmap(&path, &mut table, 2).unwrap();
        assert_eq!(
            report,
            Report {
                keys: 3,
                distinct: 2,
                mismatches: 0
            }
        );
        assert_eq!(table.get_value("a").and_then(decode_line), Some(3));
    }

    #[test]
    fn loads_into_tree() {
        let (_dir, path) = key_file("水调歌头\n🎃🎃\nPumpkins");
        let mut tree = OrderedTree::new();
        let report = with_mmap(&path, &mut tree, 1).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.distinct, 3);
        assert_eq!(tree.first().unwrap().key(), b"Pumpkins");
    }

    /// Accepts every write and never finds anything.
    struct Forgetful;

    impl Mapping for Forgetful {
        fn is_empty(&self) -> bool {
            true
        }

        fn len(&self) -> usize {
            0
        }

        fn set(&mut self, _key: &[u8], _value: &[u8]) -> Result<()> {
            Ok(())
        }

        fn get(&self, _key: &[u8]) -> Option<crate::Entry> {
            None
        }

        fn get_value(&self, _key: &[u8]) -> Option<&[u8]> {
            None
        }

        fn first(&self) -> Option<crate::Entry> {
            None
        }

        fn last(&self) -> Option<crate::Entry> {
            None
        }

        fn clear(&mut self) {}
    }

    #[test]
    fn failed_line_counts_once() {
        let (_dir, path) = key_file("a\nb\nc\n");
        let report = with_mmap(&path, &mut Forgetful, 2).unwrap();
        assert_eq!(report.keys, 3);
        assert_eq!(report.mismatches, 3);
        assert!(!report.is_clean());
    }

    #[test]
    fn empty_file_reports_existing_entries() {
        let (_dir, path) = key_file("");
        let mut table = Table::new().unwrap();
        table.set("pre", "loaded").unwrap();
        let report = with_mmap(&path, &mut table, 1).unwrap();
        assert_eq!(
            report,
            Report {
                keys: 0,
                distinct: 1,
                mismatches: 0
            }
        );
        assert_eq!(report.distinct, table.len());
    }

    #[test]
    fn blank_file_matches_empty_file() {
        let (_dir, empty) = key_file("");
        let (_blank_dir, blank) = key_file("\n\n");
        let mut table = Table::new().unwrap();
        table.set("pre", "loaded").unwrap();
        let from_empty = with_mmap(&empty, &mut table, 1).unwrap();
        let from_blank = with_mmap(&blank, &mut table, 1).unwrap();
        assert_eq!(from_empty, from_blank);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = Table::new().unwrap();
        assert!(matches!(
            with_mmap(&dir.path().join("missing.txt"), &mut table, 1),
            Err(crate::Error::Io(_))
        ));
    }
}
