use std::io::{self, Write};

use crate::tally::Ranking;

/// Renders the ranking as the console report.
pub fn write_report(mut out: impl Write, ranking: &Ranking, top_k: usize) -> io::Result<()> {
    writeln!(out, "\n--- Top {top_k} Congested Traffic Lights ---")?;
    for (location, count) in ranking.entries() {
        writeln!(out, "{location}: {count} cars")?;
    }
    writeln!(out, "{}", "-".repeat(40))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::from_pairs;

    #[test]
    fn test_report_format() {
        let tally = from_pairs(&[("A", 8), ("B", 3), ("C", 9)]);
        let mut out = Vec::new();
        write_report(&mut out, &tally.ranking(3), 3).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\n--- Top 3 Congested Traffic Lights ---\n\
             C: 9 cars\n\
             A: 8 cars\n\
             B: 3 cars\n\
             ----------------------------------------\n"
        );
    }

    #[test]
    fn test_report_with_no_entries() {
        let mut out = Vec::new();
        write_report(&mut out, &Ranking::default(), 3).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("Top 3 Congested"));
    }
}
