//! Output formatting for ranked search results

use crate::rank::RankedItem;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print ranked results as `<rank> <name> <score>` lines, 1-indexed.
///
/// Printing happens only after a query cycle has fully succeeded, so output
/// is all-or-nothing: a failed cycle prints no partial results.
pub fn print_ranked(items: &[RankedItem], color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_ranked(&mut stdout, items)
}

/// Print ranked results as a JSON array (for scripting).
pub fn print_json(items: &[RankedItem]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, items)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(stdout)
}

fn write_ranked<W: WriteColor>(out: &mut W, items: &[RankedItem]) -> io::Result<()> {
    for (i, item) in items.iter().enumerate() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{}", i + 1)?;
        out.reset()?;
        write!(out, " ")?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{}", item.name)?;
        out.reset()?;

        writeln!(out, " {}", item.score)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    fn render(items: &[RankedItem]) -> String {
        let mut out = NoColor::new(Vec::new());
        write_ranked(&mut out, items).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_ranked_lines_are_one_indexed() {
        let items = vec![
            RankedItem { name: "b.jpeg".to_string(), score: 0.8 },
            RankedItem { name: "c.jpeg".to_string(), score: 0.8 },
        ];

        assert_eq!(render(&items), "1 b.jpeg 0.8\n2 c.jpeg 0.8\n");
    }

    #[test]
    fn test_no_items_prints_nothing() {
        assert_eq!(render(&[]), "");
    }
}
