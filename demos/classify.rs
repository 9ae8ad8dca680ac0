//! Classify org-mode lines with a pattern set.
//!
//! Reads lines from the files given as arguments, or from stdin, and prints
//! each line's kind and captures. Set `RUST_LOG=debug` to see compile
//! summaries.

use std::fmt;
use std::io::{self, BufRead, BufReader};

use pattern_machine::{PatternError, PatternSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKind {
    Headline,
    Keyword,
    ListItem,
    Footnote,
    Blank,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineKind::Headline => "headline",
            LineKind::Keyword => "keyword",
            LineKind::ListItem => "list-item",
            LineKind::Footnote => "footnote",
            LineKind::Blank => "blank",
        };
        f.pad(name)
    }
}

fn org_patterns() -> Result<PatternSet<LineKind>, PatternError> {
    PatternSet::compile([
        (r"(\*+)\s+.*", LineKind::Headline),
        (r"\s*#\+(\w+):\s*(.*)$", LineKind::Keyword),
        (r"\s*[-+]\s+(.*)", LineKind::ListItem),
        (r"\[fn:(\w+)\]\s+(.*)", LineKind::Footnote),
        (r"\s*$", LineKind::Blank),
    ])
}

fn classify<R: BufRead>(set: &PatternSet<LineKind>, input: R) -> io::Result<()> {
    for (n, line) in input.lines().enumerate() {
        let line = line?;
        let m = set.matches(&line);
        match m.payload {
            Some(kind) => println!("{:>4}  {:<10} {:?}", n + 1, kind, m.captures),
            None => println!("{:>4}  {:<10}", n + 1, "text"),
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let set = org_patterns()?;
    let paths: Vec<String> = std::env::args().skip(1).collect();

    if paths.is_empty() {
        classify(&set, io::stdin().lock())?;
    } else {
        for path in paths {
            let file = std::fs::File::open(&path)?;
            classify(&set, BufReader::new(file))?;
        }
    }
    Ok(())
}
