use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use image::DynamicImage;
use ratatui::layout::{Position, Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::config::Config;
use crate::feed::FeedClient;
use crate::gallery::{run_cycle, CycleOutcome, DateRange, Gallery};
use crate::overlay::{Overlay, OverlayHit, OverlayLayout, ScrollLock};
use crate::picker::{RangePicker, CONTROL_COUNT};
use crate::previews::PreviewManager;
use crate::trigger::Trigger;
use crate::ui::layout::GridLayout;
use crate::ui::theme::Theme;

/// Lines scrolled per PgUp/PgDn in the overlay
const OVERLAY_PAGE: u16 = 10;

/// Messages from background tasks to the UI loop
#[derive(Debug)]
pub enum AppEvent {
    FetchFinished(CycleOutcome),
    PreviewReady { url: String, image: DynamicImage },
    PreviewFailed { url: String },
}

/// Which control receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// One of the six date selectors, by index
    Picker(usize),
    Trigger,
    Gallery,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Picker(i) if i + 1 < CONTROL_COUNT => Focus::Picker(i + 1),
            Focus::Picker(_) => Focus::Trigger,
            Focus::Trigger => Focus::Gallery,
            Focus::Gallery => Focus::Picker(0),
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Picker(0) => Focus::Gallery,
            Focus::Picker(i) => Focus::Picker(i - 1),
            Focus::Trigger => Focus::Picker(CONTROL_COUNT - 1),
            Focus::Gallery => Focus::Trigger,
        }
    }
}

/// Screen regions from the last draw, for mouse hit-testing
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub pickers: Vec<(Rect, usize)>,
    pub trigger: Option<Rect>,
    /// Card areas with their index into the gallery's images
    pub cards: Vec<(Rect, usize)>,
    pub overlay: Option<OverlayLayout>,
}

impl HitMap {
    fn find(areas: &[(Rect, usize)], column: u16, row: u16) -> Option<usize> {
        let pos = Position::new(column, row);
        areas.iter().find(|(r, _)| r.contains(pos)).map(|&(_, i)| i)
    }
}

/// Reports a fetch cycle's outcome to the UI loop when dropped.
///
/// If the task ends without calling [`FetchCompletion::finish`] (it
/// panicked or was aborted) a failure is reported instead, so the trigger
/// always returns to idle.
pub struct FetchCompletion {
    events: UnboundedSender<AppEvent>,
    outcome: Option<CycleOutcome>,
}

impl FetchCompletion {
    pub fn new(events: UnboundedSender<AppEvent>) -> Self {
        Self {
            events,
            outcome: None,
        }
    }

    pub fn finish(mut self, outcome: CycleOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for FetchCompletion {
    fn drop(&mut self) {
        let outcome = self
            .outcome
            .take()
            .unwrap_or_else(|| CycleOutcome::Failed("fetch task ended without a result".into()));
        if self.events.send(AppEvent::FetchFinished(outcome)).is_err() {
            tracing::debug!("UI loop gone, dropping fetch result");
        }
    }
}

/// Application state
pub struct App {
    config: Config,
    theme: Theme,
    grid: GridLayout,
    picker: RangePicker,
    trigger: Trigger,
    gallery: Gallery,
    focus: Focus,
    /// At most one overlay; it owns the scroll lock while open
    overlay: Option<Overlay>,
    scroll_lock: ScrollLock,
    previews: PreviewManager,
    client: FeedClient,
    events: UnboundedSender<AppEvent>,
    hits: HitMap,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        picker: RangePicker,
        client: FeedClient,
        previews: PreviewManager,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let theme = config.resolve_theme();
        let grid = config.grid_layout();
        let trigger = Trigger::new(
            config.appearance.trigger_label.clone(),
            config.appearance.busy_label.clone(),
        );

        Self {
            config,
            theme,
            grid,
            picker,
            trigger,
            gallery: Gallery::new(),
            focus: Focus::Trigger,
            overlay: None,
            scroll_lock: ScrollLock::new(),
            previews,
            client,
            events,
            hits: HitMap::default(),
            should_quit: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn grid_layout(&self) -> &GridLayout {
        &self.grid
    }

    pub fn picker(&self) -> &RangePicker {
        &self.picker
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_lock.is_locked()
    }

    pub fn previews(&self) -> &PreviewManager {
        &self.previews
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_hits(&mut self, hits: HitMap) {
        if let (Some(overlay), Some(layout)) = (self.overlay.as_mut(), hits.overlay) {
            overlay.clamp_scroll(layout.max_scroll);
        }
        self.hits = hits;
    }

    /// Scroll limit measured by the last draw of the overlay
    fn overlay_max_scroll(&self) -> u16 {
        self.hits.overlay.map_or(u16::MAX, |layout| layout.max_scroll)
    }

    // ------------------------------------------------------------------
    // Fetch cycle
    // ------------------------------------------------------------------

    /// Enter the fetching state. Returns the range to fetch, or `None` if
    /// the trigger is disabled because a fetch is already running.
    pub fn begin_cycle(&mut self) -> Option<DateRange> {
        if !self.trigger.begin() {
            tracing::debug!("Trigger disabled, ignoring activation");
            return None;
        }
        self.overlay = None;
        self.previews.clear();
        self.gallery.begin_loading();
        Some(self.picker.range())
    }

    /// Activate the trigger: begin a cycle and run it in the background
    pub fn activate_trigger(&mut self) {
        if let Some(range) = self.begin_cycle() {
            let client = self.client.clone();
            let completion = FetchCompletion::new(self.events.clone());
            tokio::spawn(async move {
                let outcome = run_cycle(&client, range).await;
                completion.finish(outcome);
            });
        }
    }

    /// Apply a message from a background task
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::FetchFinished(outcome) => {
                // Restore the trigger before anything else can go wrong
                self.trigger.complete();
                self.gallery.finish(outcome);
            }
            AppEvent::PreviewReady { url, image } => {
                tracing::debug!("Preview ready: {}", url);
                self.previews.insert(&url, image);
            }
            AppEvent::PreviewFailed { url } => {
                self.previews.mark_failed(&url);
            }
        }
    }

    /// Start downloads for the pictures currently on screen
    pub fn request_visible_previews(&mut self) {
        if !self.config.images.enabled || !self.previews.supports_graphics() {
            return;
        }

        let mut urls: Vec<String> = self
            .hits
            .cards
            .iter()
            .filter_map(|&(_, i)| self.gallery.image(i).map(|img| img.url.clone()))
            .collect();
        if let Some(overlay) = &self.overlay {
            urls.push(overlay.image().url.clone());
        }

        for url in urls {
            if self.previews.claim(&url) {
                self.spawn_preview(url);
            }
        }
    }

    fn spawn_preview(&self, url: String) {
        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = match load_preview(&client, &url).await {
                Ok(image) => AppEvent::PreviewReady { url, image },
                Err(e) => {
                    tracing::debug!("Preview {} failed: {:#}", url, e);
                    AppEvent::PreviewFailed { url }
                }
            };
            let _ = events.send(event);
        });
    }

    // ------------------------------------------------------------------
    // Overlay
    // ------------------------------------------------------------------

    /// Open the overlay for the card at `index`, replacing any open one
    pub fn open_overlay(&mut self, index: usize) {
        // Drop the old overlay first so its guard releases before the new
        // one acquires
        self.overlay = None;
        self.hits.overlay = None;
        if let Some(image) = self.gallery.image(index).cloned() {
            self.gallery.select(index);
            self.overlay = Some(Overlay::open(image, &self.scroll_lock));
        }
    }

    pub fn close_overlay(&mut self) {
        if self.overlay.take().is_some() {
            tracing::debug!("Overlay closed");
        }
    }

    // ------------------------------------------------------------------
    // Gallery navigation
    // ------------------------------------------------------------------

    /// Move the card selection; suppressed while the scroll lock is held
    fn move_selection(&mut self, to: impl FnOnce(&GridLayout, usize, usize) -> usize) {
        if self.scroll_lock.is_locked() {
            return;
        }
        let total = self.gallery.images().len();
        if total == 0 {
            return;
        }
        let next = to(&self.grid, self.gallery.selected_index(), total);
        self.gallery.select(next);
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        let max_scroll = self.overlay_max_scroll();
        if let Some(overlay) = self.overlay.as_mut() {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => self.close_overlay(),
                KeyCode::Down | KeyCode::Char('j') => overlay.scroll_down(1, max_scroll),
                KeyCode::Up | KeyCode::Char('k') => overlay.scroll_up(1),
                KeyCode::PageDown => overlay.scroll_down(OVERLAY_PAGE, max_scroll),
                KeyCode::PageUp => overlay.scroll_up(OVERLAY_PAGE),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::F(5) => self.activate_trigger(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => match self.focus {
                Focus::Picker(i) => self.handle_picker_key(i, key.code),
                Focus::Trigger => {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                        self.activate_trigger();
                    }
                }
                Focus::Gallery => self.handle_gallery_key(key.code),
            },
        }
    }

    fn handle_picker_key(&mut self, index: usize, code: KeyCode) {
        match code {
            KeyCode::Left if index > 0 => self.focus = Focus::Picker(index - 1),
            KeyCode::Right => self.focus = Focus::Picker(index + 1).min_picker_or_trigger(),
            KeyCode::Enter => self.focus = self.focus.next(),
            _ => {
                let Some(control) = self.picker.control_mut(index) else {
                    return;
                };
                match code {
                    KeyCode::Down | KeyCode::Char('j') => control.select_next(),
                    KeyCode::Up | KeyCode::Char('k') => control.select_prev(),
                    KeyCode::Backspace | KeyCode::Delete => control.clear(),
                    _ => {}
                }
            }
        }
    }

    fn handle_gallery_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.move_selection(|g, cur, _| g.move_left(cur)),
            KeyCode::Right | KeyCode::Char('l') => self.move_selection(|g, cur, total| g.move_right(cur, total)),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(|g, cur, _| g.move_up(cur)),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(|g, cur, total| g.move_down(cur, total)),
            KeyCode::PageUp => self.move_selection(|g, cur, _| g.page_up(cur)),
            KeyCode::PageDown => self.move_selection(|g, cur, total| g.page_down(cur, total)),
            KeyCode::Home => self.move_selection(|_, _, _| 0),
            KeyCode::End => self.move_selection(|g, _, total| g.move_end(total)),
            KeyCode::Enter => self.open_overlay(self.gallery.selected_index()),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);

        let max_scroll = self.overlay_max_scroll();
        if let Some(overlay) = self.overlay.as_mut() {
            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    let hit = self
                        .hits
                        .overlay
                        .map_or(OverlayHit::Content, |layout| layout.hit(column, row));
                    if matches!(hit, OverlayHit::Background | OverlayHit::CloseButton) {
                        self.close_overlay();
                    }
                }
                MouseEventKind::ScrollDown => overlay.scroll_down(3, max_scroll),
                MouseEventKind::ScrollUp => overlay.scroll_up(3),
                _ => {}
            }
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(i) = HitMap::find(&self.hits.pickers, column, row) {
                    self.focus = Focus::Picker(i);
                } else if self.hits.trigger.is_some_and(|r| r.contains(Position::new(column, row))) {
                    self.focus = Focus::Trigger;
                    self.activate_trigger();
                } else if let Some(i) = HitMap::find(&self.hits.cards, column, row) {
                    self.focus = Focus::Gallery;
                    self.open_overlay(i);
                }
            }
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                let down = matches!(mouse.kind, MouseEventKind::ScrollDown);
                if let Some(i) = HitMap::find(&self.hits.pickers, column, row) {
                    if let Some(control) = self.picker.control_mut(i) {
                        if down {
                            control.select_next();
                        } else {
                            control.select_prev();
                        }
                    }
                } else if down {
                    self.move_selection(|g, cur, total| g.move_down(cur, total));
                } else {
                    self.move_selection(|g, cur, _| g.move_up(cur));
                }
            }
            _ => {}
        }
    }
}

impl Focus {
    /// Past the last selector, focus moves on to the trigger
    fn min_picker_or_trigger(self) -> Self {
        match self {
            Focus::Picker(i) if i >= CONTROL_COUNT => Focus::Trigger,
            other => other,
        }
    }
}

/// Download and decode one picture
async fn load_preview(client: &FeedClient, url: &str) -> anyhow::Result<DynamicImage> {
    let bytes = client.get_bytes(url).await?;
    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;
    Ok(image)
}
