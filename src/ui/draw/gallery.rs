//! Main screen drawing functions
//!
//! This module handles rendering the gallery screen:
//! - Date selectors and trigger
//! - Transient loading line
//! - Card grid or placeholder
//! - Status bar

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use ratatui_image::{Resize, StatefulImage};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Focus, HitMap};
use crate::gallery::GalleryView;
use crate::picker::SelectControl;
use crate::previews::PreviewTarget;
use crate::ui::image_card::{truncate, ImageCard};
use crate::ui::theme::Theme;

/// Space between groups in the controls row
const GROUP_GAP: u16 = 4;

pub(crate) fn draw_gallery_screen(f: &mut Frame, app: &App, hits: &mut HitMap) {
    let theme = app.theme();
    let area = f.area();
    let bg_block = Block::default().style(Style::default().bg(theme.background));
    f.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Date selectors + trigger
            Constraint::Length(1), // Loading line
            Constraint::Min(1),    // Cards
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_controls(f, app, chunks[0], hits, theme);
    draw_loading_banner(f, app, chunks[1], theme);
    draw_cards(f, app, chunks[2], hits, theme);
    draw_status_bar(f, app, chunks[3], theme);
}

/// Write `text` at (x, y) and return the area it occupies
fn put(buf: &mut Buffer, x: u16, y: u16, text: &str, style: Style) -> Rect {
    buf.set_string(x, y, text, style);
    Rect {
        x,
        y,
        width: text.width() as u16,
        height: 1,
    }
}

fn control_style(control: &SelectControl, focused: bool, theme: &Theme) -> Style {
    let base = if control.value().is_some() {
        Style::default().fg(theme.foreground)
    } else {
        Style::default().fg(theme.dimmed)
    };
    if focused {
        base.fg(theme.focus)
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        base.bg(theme.background)
    }
}

fn draw_controls(f: &mut Frame, app: &App, area: Rect, hits: &mut HitMap, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(" darkwall-apod ")
        .style(Style::default().bg(theme.background));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let label_style = Style::default().fg(theme.dimmed).bg(theme.background);
    let buf = f.buffer_mut();
    let y = inner.y;
    let mut x = inner.x + 1;

    for (group, label) in ["Start ", "End "].into_iter().enumerate() {
        x = put(buf, x, y, label, label_style).right();
        for part in 0..3 {
            let index = group * 3 + part;
            let Some(control) = app.picker().control(index) else {
                continue;
            };
            let text = format!("[{:^w$}]", control.display(), w = control.display_width());
            let focused = app.focus() == Focus::Picker(index);
            let rect = put(buf, x, y, &text, control_style(control, focused, theme));
            hits.pickers.push((rect, index));
            x = rect.right() + 1;
        }
        x += GROUP_GAP - 1;
    }

    let trigger = app.trigger();
    let mut style = if trigger.is_enabled() {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.busy)
    };
    style = if app.focus() == Focus::Trigger {
        style.bg(theme.selection_bg).add_modifier(Modifier::REVERSED)
    } else {
        style.bg(theme.background)
    };
    let rect = put(buf, x, y, &format!("[ {} ]", trigger.label()), style);
    hits.trigger = Some(rect);
}

fn draw_loading_banner(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    if let Some(text) = app.gallery().loading_banner() {
        let banner = Paragraph::new(format!(" {}", text))
            .style(Style::default().fg(theme.busy).bg(theme.background));
        f.render_widget(banner, area);
    }
}

fn draw_cards(f: &mut Frame, app: &App, area: Rect, hits: &mut HitMap, theme: &Theme) {
    let gallery = app.gallery();
    let images = gallery.images();

    let title = match gallery.view() {
        GalleryView::Content(_) => format!(" Gallery · {} images ", images.len()),
        _ => " Gallery ".to_string(),
    };
    let border = if app.focus() == Focus::Gallery { theme.focus } else { theme.dimmed_alt };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
        .style(Style::default().bg(theme.background));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if let Some((icon, text)) = gallery.placeholder() {
        let color = if matches!(gallery.view(), GalleryView::Error) { theme.error } else { theme.dimmed };
        let top = inner.y + inner.height.saturating_sub(2) / 2;
        let placeholder = Paragraph::new(vec![Line::from(icon), Line::from(text)])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(color).bg(theme.background));
        let area = Rect {
            y: top,
            height: inner.height - (top - inner.y),
            ..inner
        };
        f.render_widget(placeholder, area);
        return;
    }

    let grid = app.grid_layout();
    let selected = gallery.selected_index();
    let range = grid.visible_range(selected, images.len());
    let page_start = range.start;
    let areas = grid.card_areas(inner, range.len());

    let previews = app.previews();
    let graphics = app.config().images.enabled && previews.supports_graphics();

    for (local, card_area) in areas.into_iter().enumerate() {
        let index = page_start + local;
        let Some(image) = images.get(index) else {
            continue;
        };

        let card = ImageCard::new(image, theme)
            .selected(index == selected)
            .graphics(graphics);
        f.render_widget(card, card_area);
        hits.cards.push((card_area, index));

        if graphics {
            if let Some(protocol) = previews.get_cached(&image.url, PreviewTarget::Card) {
                let picture = StatefulImage::new(None).resize(Resize::Fit(None));
                let mut proto = protocol.lock();
                f.render_stateful_widget(picture, ImageCard::preview_area(card_area), &mut *proto);
            }
        }
    }
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let gallery = app.gallery();
    let total = gallery.images().len();

    let status = match gallery.view() {
        // Gallery navigation is locked while the overlay is up
        _ if app.is_scroll_locked() => {
            " ↑↓/PgUp/PgDn: scroll details | Esc/q/Enter: close | Ctrl+C: quit".to_string()
        }
        GalleryView::Content(_) => {
            let page_size = app.grid_layout().page_size();
            let page = gallery.selected_index() / page_size + 1;
            let pages = total.div_ceil(page_size);
            let title = gallery.selected_image().map_or("", |img| img.title.as_str());
            format!(
                " {}/{} {} | Page {}/{} | ←↑↓→: move | Enter: details | Tab: focus | F5: fetch | q: quit",
                gallery.selected_index() + 1,
                total,
                truncate(title, 24),
                page,
                pages.max(1)
            )
        }
        GalleryView::Loading => format!(" Fetching {}", app.config().feed.url),
        _ => " Tab: focus | ↑↓: change date | Del: clear | Enter/F5: fetch | q: quit".to_string(),
    };

    let status_bar =
        Paragraph::new(status).style(Style::default().fg(theme.dimmed).bg(theme.background));
    f.render_widget(status_bar, area);
}
