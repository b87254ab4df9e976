use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::document::Character;
use crate::engine::{BackgroundEmission, Snapshot};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Terminal approximation of the piece: the heading word up top, derived
/// metrics, the typed sentences, and the most recent background emissions.
///
/// This is a pure consumer of engine output; font-variation axes collapse to
/// the closest terminal styles.
pub struct SessionView<'a> {
    pub snapshot: &'a Snapshot,
    pub emissions: &'a [BackgroundEmission],
}

/// True when the heading no longer fits its row; the shell forwards this to
/// the engine as an overflow report.
pub fn heading_overflows(snapshot: &Snapshot, area_width: u16) -> bool {
    let text: String = snapshot.heading.text();
    text.width() as f64 > area_width as f64 * 0.8
}

fn character_style(c: &Character) -> Style {
    let mut style = Style::default();

    if c.heading_weight > 900.0 {
        style = style.add_modifier(Modifier::BOLD);
    }
    if c.opacity < 0.7 {
        style = style.add_modifier(Modifier::DIM);
    }
    // the grade wave reads as a pulsing brightness
    if c.grade > 0.0 {
        style = style.fg(Color::White);
    } else if c.grade < -100.0 {
        style = style.fg(Color::DarkGray);
    } else {
        style = style.fg(Color::Gray);
    }

    style
}

fn heading_line(snapshot: &Snapshot) -> Line<'static> {
    let spans: Vec<Span> = snapshot
        .heading
        .chars
        .iter()
        .map(|c| Span::styled(c.letter.to_string(), character_style(c)))
        .collect();

    Line::from(spans)
}

fn metrics_line(snapshot: &Snapshot) -> Line<'static> {
    let anxious = snapshot.heart_rate > 130;
    let pulse_style = if anxious {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Magenta)
    };

    Line::from(vec![
        Span::styled(format!("♥ {} bpm", snapshot.heart_rate), pulse_style),
        Span::raw("   "),
        Span::styled(
            format!("anxiety {:.1}", snapshot.anxiety_level),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("   "),
        Span::raw(format!("{:.2} chars/s", snapshot.chars_per_second)),
        Span::raw("   "),
        Span::styled(
            format!("{}px", snapshot.font_size as u32),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ])
}

fn sentence_lines(snapshot: &Snapshot) -> Vec<Line<'static>> {
    snapshot
        .sentences
        .iter()
        .filter(|s| !s.words.is_empty())
        .map(|sentence| {
            let spans: Vec<Span> = sentence
                .words
                .iter()
                .flat_map(|word| {
                    let mut spans: Vec<Span> = word
                        .chars
                        .iter()
                        .map(|c| Span::styled(c.letter.to_string(), character_style(c)))
                        .collect();
                    spans.push(Span::raw(" "));
                    spans
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn emission_lines(emissions: &[BackgroundEmission]) -> Vec<Line<'static>> {
    let mistake_style = Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::ITALIC | Modifier::UNDERLINED);
    let faint_style = Style::default().add_modifier(Modifier::DIM);

    emissions
        .iter()
        .map(|emission| {
            let spans: Vec<Span> = emission
                .sentence
                .words
                .iter()
                .enumerate()
                .flat_map(|(idx, word)| {
                    let style = if Some(idx) == emission.mistake_index {
                        mistake_style
                    } else {
                        faint_style
                    };
                    vec![Span::styled(word.text(), style), Span::raw(" ")]
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

impl Widget for &SessionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(2), // heading
                    Constraint::Length(2), // metrics
                    Constraint::Min(3),    // sentences
                    Constraint::Length(6), // background emissions
                ]
                .as_ref(),
            )
            .split(area);

        let heading = Paragraph::new(heading_line(self.snapshot))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false });
        heading.render(chunks[0], buf);

        Paragraph::new(metrics_line(self.snapshot))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(sentence_lines(self.snapshot))
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);

        Paragraph::new(emission_lines(self.emissions))
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Tuning;
    use crate::document::Key;
    use crate::engine::Engine;

    fn snapshot_with_text() -> Snapshot {
        let clock = ManualClock::default();
        let mut e = Engine::new(Tuning::default(), &clock);
        for c in "anxious".chars() {
            e.on_key_down(Key::Char(c));
            e.on_key_up();
        }
        e.snapshot()
    }

    #[test]
    fn test_heading_line_has_span_per_char() {
        let snap = snapshot_with_text();
        assert_eq!(heading_line(&snap).spans.len(), 7);
    }

    #[test]
    fn test_heading_overflow_tracks_width() {
        let snap = snapshot_with_text();
        assert!(!heading_overflows(&snap, 80));
        assert!(heading_overflows(&snap, 5));
    }

    #[test]
    fn test_render_smoke() {
        let snap = snapshot_with_text();
        let view = SessionView {
            snapshot: &snap,
            emissions: &[],
        };
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        (&view).render(area, &mut buf);
    }

    #[test]
    fn test_empty_sentences_produce_no_lines() {
        let snap = snapshot_with_text();
        // only the open empty sentence exists, so nothing renders
        assert!(sentence_lines(&snap).is_empty());
    }
}
