//! Output formatting for search results

use crate::index::types::SearchResult;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Order results by descending score, then id, for display
pub fn sort_for_display(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
}

fn score_color(score: u8) -> Color {
    match score {
        95..=100 => Color::Green,
        88..=94 => Color::Yellow,
        _ => Color::Cyan,
    }
}

/// Print results as `id<TAB>name<TAB>score`, coloring the score
pub fn print_results(results: &[SearchResult], color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    for r in results {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(stdout, "{}", r.id)?;
        stdout.reset()?;
        write!(stdout, "\t{}\t", r.name)?;
        stdout.set_color(ColorSpec::new().set_fg(Some(score_color(r.score))).set_bold(true))?;
        write!(stdout, "{}", r.score)?;
        stdout.reset()?;
        writeln!(stdout)?;
    }

    Ok(())
}

/// Print results as a JSON array
pub fn print_json(results: &[SearchResult]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer(&mut lock, results)?;
    writeln!(lock)
}

/// Run `work` behind a spinner on stderr (no-op without the `progress` feature)
pub fn with_spinner<T>(message: &str, work: impl FnOnce() -> T) -> T {
    #[cfg(feature = "progress")]
    {
        use indicatif::{ProgressBar, ProgressStyle};
        use std::io::IsTerminal;

        if !io::stderr().is_terminal() {
            return work();
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        let out = work();
        spinner.finish_and_clear();
        out
    }

    #[cfg(not(feature = "progress"))]
    {
        let _ = message;
        work()
    }
}
