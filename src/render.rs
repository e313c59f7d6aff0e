use crate::cue::format_timestamp;
use crate::viewer::{Surface, ViewerView};

use std::io::{BufWriter, Write};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;

/// Writes a plain-text rendition of the view.
pub fn serialise<W: Write>(view: &ViewerView, output: W) -> Result<()> {
    let mut writer = BufWriter::new(output);
    write_view(&mut writer, view).context("Failed to write view.")?;
    writer.flush().context("Failed to write view.")?;
    Ok(())
}

fn write_view<W: Write>(buf: &mut W, view: &ViewerView) -> Result<()> {
    writeln!(buf, "{}", view.header)?;
    writeln!(buf)?;

    match &view.main {
        Surface::Player { painting, tracks } => {
            writeln!(buf, "[player] {} ({})", painting.id, painting.kind.as_str())?;
            for track in tracks {
                writeln!(buf, "  track {}", track.id)?;
            }
        }
        Surface::Image { painting } => {
            write!(buf, "[image] {}", painting.id)?;
            if let (Some(width), Some(height)) = (painting.width, painting.height) {
                write!(buf, " {}x{}", width, height)?;
            }
            writeln!(buf)?;
        }
        Surface::Empty => {}
    }

    writeln!(buf, "[canvases]")?;
    for item in &view.media {
        let marker = if item.active { '*' } else { ' ' };
        writeln!(buf, "{} {}", marker, item.label)?;
    }

    if let Some(aside) = &view.aside {
        write!(buf, "[navigator {} @ ", aside.active_resource)?;
        write_ts(buf, view.current_time)?;
        writeln!(buf, "]")?;
        for cue in &aside.cues {
            let marker = if cue.active { '>' } else { ' ' };
            write!(buf, "{} ", marker)?;
            write_ts(buf, cue.time)?;
            writeln!(buf, " {}", plain_label(&cue.label))?;
        }
    }
    Ok(())
}

/// Drops WebVTT inline markup (`<v Speaker>`, `<i>`, timestamps) and folds
/// the cue onto one line.
fn plain_label(label: &str) -> String {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    let markup = MARKUP.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid markup regex"));
    markup
        .replace_all(label, "")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Playback times come from the command line, so anything a `Duration`
/// cannot hold is clamped: negative and NaN to zero, too large to the maximum.
fn write_ts<W: Write>(buf: &mut W, seconds: f64) -> Result<()> {
    let timestamp = if seconds.is_nan() || seconds <= 0.0 {
        Duration::ZERO
    } else {
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    };
    write!(buf, "{}", format_timestamp(timestamp))?;
    Ok(())
}
