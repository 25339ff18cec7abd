//! Overlay drawing
//!
//! Draws the detail view for one image over the main screen: title in the
//! border, picture (when the terminal can show one), date, credit,
//! explanation and the close control.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use ratatui_image::{Resize, StatefulImage};

use crate::app::App;
use crate::overlay::{Overlay, OverlayLayout, CLOSE_LABEL};
use crate::previews::PreviewTarget;

/// Draw the overlay and return its geometry for hit-testing
pub(crate) fn draw_overlay(f: &mut Frame, app: &App, overlay: &Overlay) -> OverlayLayout {
    let theme = app.theme();
    let layout = OverlayLayout::compute(f.area());
    let image = overlay.image();

    f.render_widget(Clear, layout.content);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(format!(" {} ", image.title))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(theme.background));
    let inner = block.inner(layout.content);
    f.render_widget(block, layout.content);

    // Everything above the close button row
    let body = Rect {
        height: layout.close_button.y.saturating_sub(inner.y),
        ..inner
    };

    let picture = app
        .previews()
        .get_cached(&image.url, PreviewTarget::Overlay)
        .filter(|_| app.config().images.enabled);
    let picture_height = if picture.is_some() { body.height / 2 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(picture_height), Constraint::Min(0)])
        .split(body);

    if let Some(protocol) = &picture {
        let widget = StatefulImage::new(None).resize(Resize::Fit(None));
        let mut proto = protocol.lock();
        f.render_stateful_widget(widget, chunks[0], &mut *proto);
    }

    let mut lines = vec![Line::from(Span::styled(
        image.date.clone(),
        Style::default().fg(theme.dimmed),
    ))];
    if let Some(ref copyright) = image.copyright {
        lines.push(Line::from(Span::styled(
            format!("© {}", copyright),
            Style::default().fg(theme.dimmed_alt),
        )));
    }
    if picture.is_none() && !image.url.is_empty() {
        lines.push(Line::from(Span::styled(
            image.url.clone(),
            Style::default().fg(theme.dimmed_alt).add_modifier(Modifier::UNDERLINED),
        )));
    }
    if let Some(ref hdurl) = image.hdurl {
        lines.push(Line::from(vec![
            Span::styled("HD: ", Style::default().fg(theme.dimmed_alt)),
            Span::styled(hdurl.clone(), Style::default().fg(theme.dimmed_alt)),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        image.explanation.clone(),
        Style::default().fg(theme.foreground),
    )));

    let text_area = Rect {
        x: chunks[1].x + 1,
        width: chunks[1].width.saturating_sub(2),
        ..chunks[1]
    };
    let text = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(theme.background));
    let wrapped = text.line_count(text_area.width);
    let max_scroll = u16::try_from(wrapped.saturating_sub(usize::from(text_area.height)))
        .unwrap_or(u16::MAX);
    f.render_widget(text.scroll((overlay.scroll().min(max_scroll), 0)), text_area);

    let close = Paragraph::new(CLOSE_LABEL)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(theme.focus)
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(close, layout.close_button);

    OverlayLayout { max_scroll, ..layout }
}
