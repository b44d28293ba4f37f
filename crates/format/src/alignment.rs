//! Alignment readers.
//!
//! Two layouts are accepted:
//!
//! - the line format: a first line holding the species count `N`, then `N`
//!   lines of `name sequence` separated by a single space;
//! - FASTA: `>name` header lines followed by sequence lines.
//!
//! [`read_alignment`] picks FASTA when the first non-empty line starts with
//! `>`.

use std::fs;
use std::path::Path;

use log::debug;
use phylevo_sim::base::{Alignment, SpeciesGenome};

use crate::FormatError;

/// Read an alignment file, detecting its layout.
pub fn read_alignment(path: impl AsRef<Path>) -> Result<Alignment, FormatError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| FormatError::io(path, e))?;
    let alignment = parse_alignment(&text)?;
    debug!(
        "Loaded {} species x {} sites from {}",
        alignment.num_species(),
        alignment.sequence_len(),
        path.display()
    );
    Ok(alignment)
}

/// Parse alignment text, detecting its layout.
pub fn parse_alignment(text: &str) -> Result<Alignment, FormatError> {
    let is_fasta = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .is_some_and(|l| l.starts_with('>'));
    if is_fasta {
        parse_fasta(text)
    } else {
        parse_line_format(text)
    }
}

/// Parse the count-prefixed `name sequence` layout.
pub fn parse_line_format(text: &str) -> Result<Alignment, FormatError> {
    let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));

    let header = lines.next().unwrap_or_default();
    let count: usize = header
        .trim()
        .parse()
        .map_err(|_| FormatError::BadSpeciesCount(header.to_string()))?;

    let mut genomes = Vec::with_capacity(count);
    for (i, line) in lines.take(count).enumerate() {
        let fields: Vec<&str> = line.split(' ').collect();
        let &[name, sequence] = fields.as_slice() else {
            return Err(FormatError::bad_line(
                i + 2,
                format!("expected 'name sequence', found {} fields", fields.len()),
            ));
        };
        if name.is_empty() {
            return Err(FormatError::bad_line(i + 2, "empty species name"));
        }
        genomes.push(SpeciesGenome::parse(name, sequence)?);
    }

    if genomes.len() < count {
        return Err(FormatError::MissingSequences {
            expected: count,
            found: genomes.len(),
        });
    }
    Ok(Alignment::new(genomes)?)
}

/// Parse FASTA. The species name is the first whitespace-separated token
/// of the header; sequence lines are concatenated.
pub fn parse_fasta(text: &str) -> Result<Alignment, FormatError> {
    let mut records: Vec<(String, String)> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            let name = header
                .split_whitespace()
                .next()
                .ok_or_else(|| FormatError::bad_line(i + 1, "empty FASTA header"))?;
            records.push((name.to_string(), String::new()));
        } else {
            let (_, sequence) = records
                .last_mut()
                .ok_or_else(|| FormatError::bad_line(i + 1, "sequence data before first header"))?;
            sequence.push_str(line);
        }
    }

    let genomes = records
        .iter()
        .map(|(name, seq)| SpeciesGenome::parse(name.as_str(), seq))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Alignment::new(genomes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use phylevo_sim::base::Symbol;
    use phylevo_sim::errors::AlignmentError;

    #[test]
    fn test_line_format() {
        let aln = parse_line_format("3\nhomo ACGT\npan acg-\ngorilla AC.T\n").unwrap();
        assert_eq!(aln.num_species(), 3);
        assert_eq!(aln.sequence_len(), 4);
        assert_eq!(aln.get("pan").unwrap().get(3), Some(Symbol::Gap));
    }

    #[test]
    fn test_line_format_ignores_trailing_lines() {
        let aln = parse_line_format("2\r\na AC\r\nb AG\r\nc TT\n").unwrap();
        assert_eq!(aln.species_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_line_format_errors() {
        assert!(matches!(
            parse_line_format("two\na AC\nb AG"),
            Err(FormatError::BadSpeciesCount(_))
        ));
        assert!(matches!(
            parse_line_format("2\na  AC\nb AG"),
            Err(FormatError::BadLine { line: 2, .. })
        ));
        assert!(matches!(
            parse_line_format("3\na AC\nb AG"),
            Err(FormatError::MissingSequences { expected: 3, found: 2 })
        ));
        assert!(matches!(
            parse_line_format("2\na AC\nb AX"),
            Err(FormatError::Alignment(AlignmentError::InvalidSymbol { .. }))
        ));
        assert!(matches!(
            parse_line_format("2\na AC\nb A"),
            Err(FormatError::Alignment(AlignmentError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_fasta() {
        let text = ">homo sapiens\nACGT\nAC\n\n>pan\nACGTAA\n";
        let aln = parse_fasta(text).unwrap();
        assert_eq!(aln.species_names().collect::<Vec<_>>(), vec!["homo", "pan"]);
        assert_eq!(aln.sequence_len(), 6);
    }

    #[test]
    fn test_fasta_errors() {
        assert!(matches!(
            parse_fasta("ACGT\n>a\nAC"),
            Err(FormatError::BadLine { line: 1, .. })
        ));
        assert!(matches!(
            parse_fasta(">\nAC\n>b\nAC"),
            Err(FormatError::BadLine { line: 1, .. })
        ));
    }

    #[test]
    fn test_detection() {
        assert_eq!(parse_alignment("\n>a\nAC\n>b\nAG\n").unwrap().num_species(), 2);
        assert_eq!(parse_alignment("2\na AC\nb AG\n").unwrap().num_species(), 2);
    }
}
