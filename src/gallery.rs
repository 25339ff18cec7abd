//! Date-range filtering and the gallery's view state.
//!
//! One fetch-and-filter cycle produces a [`CycleOutcome`]; the [`Gallery`]
//! turns that into exactly one of its view states and always drops the
//! loading indicators on the way.

use crate::date_bound::{EpochMillis, FeedDate};
use crate::feed::{project_images, DisplayImage, FeedClient, FeedError, FeedItem};

pub const IDLE_TEXT: &str = "Pick a date range, then press Get Space Images.";
pub const LOADING_TEXT: &str = "Loading images…";
pub const LOADING_BANNER: &str = "Loading images.......";
pub const EMPTY_TEXT: &str = "No images found for the selected date range.";
pub const ERROR_TEXT: &str = "Error loading images. Please try again later.";

/// Inclusive range of dates; a missing end is unrestricted.
///
/// A start later than the end is kept as-is and simply matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<EpochMillis>,
    pub end: Option<EpochMillis>,
}

impl DateRange {
    pub fn new(start: Option<EpochMillis>, end: Option<EpochMillis>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: FeedDate) -> bool {
        match date {
            FeedDate::Missing => false,
            // An unreadable date is neither before nor after anything
            FeedDate::Unparsed => true,
            FeedDate::At(ms) => {
                self.start.map_or(true, |start| ms >= start) && self.end.map_or(true, |end| ms <= end)
            }
        }
    }
}

/// Keep images whose date falls in `range`, preserving order
pub fn filter_images(images: Vec<DisplayImage>, range: &DateRange) -> Vec<DisplayImage> {
    images
        .into_iter()
        .filter(|img| range.contains(img.feed_date()))
        .collect()
}

/// Result of one fetch-and-filter cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Loaded(Vec<DisplayImage>),
    NoMatches,
    /// Detail for the log; the user only ever sees [`ERROR_TEXT`]
    Failed(String),
}

impl CycleOutcome {
    pub fn from_fetch(result: Result<Vec<FeedItem>, FeedError>, range: &DateRange) -> Self {
        match result {
            Ok(items) => {
                let images = filter_images(project_images(items), range);
                if images.is_empty() {
                    CycleOutcome::NoMatches
                } else {
                    CycleOutcome::Loaded(images)
                }
            }
            Err(e) => {
                tracing::error!("Error fetching or processing data: {}", e);
                CycleOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Fetch the feed once and filter it against `range`
pub async fn run_cycle(client: &FeedClient, range: DateRange) -> CycleOutcome {
    tracing::info!("Fetching feed from {}", client.url());
    let outcome = CycleOutcome::from_fetch(client.fetch().await, &range);
    match &outcome {
        CycleOutcome::Loaded(images) => tracing::info!("{} images in range", images.len()),
        CycleOutcome::NoMatches => tracing::info!("No images in range"),
        CycleOutcome::Failed(_) => {}
    }
    outcome
}

/// What the gallery area currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryView {
    /// Nothing fetched yet
    Idle,
    Loading,
    /// One card per image; cards refer to images by index
    Content(Vec<DisplayImage>),
    NoMatches,
    Error,
}

/// Gallery state: current view, loading line and card selection
#[derive(Debug)]
pub struct Gallery {
    view: GalleryView,
    loading_banner: bool,
    selected: usize,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new()
    }
}

impl Gallery {
    pub fn new() -> Self {
        Self {
            view: GalleryView::Idle,
            loading_banner: false,
            selected: 0,
        }
    }

    pub fn view(&self) -> &GalleryView {
        &self.view
    }

    /// Enter the loading state; the previous cards are discarded
    pub fn begin_loading(&mut self) {
        self.view = GalleryView::Loading;
        self.loading_banner = true;
        self.selected = 0;
    }

    /// Leave the loading state with the cycle's result
    pub fn finish(&mut self, outcome: CycleOutcome) {
        self.loading_banner = false;
        self.selected = 0;
        self.view = match outcome {
            CycleOutcome::Loaded(images) if !images.is_empty() => GalleryView::Content(images),
            CycleOutcome::Loaded(_) | CycleOutcome::NoMatches => GalleryView::NoMatches,
            CycleOutcome::Failed(_) => GalleryView::Error,
        };
    }

    /// Transient status line shown above the gallery while loading
    pub fn loading_banner(&self) -> Option<&'static str> {
        self.loading_banner.then_some(LOADING_BANNER)
    }

    /// Placeholder text for the non-content states
    pub fn placeholder(&self) -> Option<(&'static str, &'static str)> {
        match self.view {
            GalleryView::Idle => Some(("✦", IDLE_TEXT)),
            GalleryView::Loading => Some(("⏳", LOADING_TEXT)),
            GalleryView::NoMatches => Some(("🔍", EMPTY_TEXT)),
            GalleryView::Error => Some(("⚠", ERROR_TEXT)),
            GalleryView::Content(_) => None,
        }
    }

    pub fn images(&self) -> &[DisplayImage] {
        match &self.view {
            GalleryView::Content(images) => images,
            _ => &[],
        }
    }

    pub fn image(&self, index: usize) -> Option<&DisplayImage> {
        self.images().get(index)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_image(&self) -> Option<&DisplayImage> {
        self.image(self.selected)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.images().len() {
            self.selected = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_bound::DateParts;
    use serde_json::Value;

    fn item(media_type: &str, title: &str, date: &str) -> FeedItem {
        FeedItem {
            media_type: Some(Value::from(media_type)),
            title: Some(Value::from(title)),
            url: Some(Value::from(format!("https://apod.example/{}.jpg", title))),
            date: Some(Value::from(date)),
            explanation: Some(Value::from(format!("About {}", title))),
            ..Default::default()
        }
    }

    fn bound(y: i32, m: u32, d: u32) -> Option<EpochMillis> {
        DateParts::new(Some(m), Some(d), Some(y)).bound()
    }

    fn titles(images: &[DisplayImage]) -> Vec<&str> {
        images.iter().map(|i| i.title.as_str()).collect()
    }

    fn sample() -> Vec<FeedItem> {
        vec![
            item("image", "a", "2020-05-31"),
            item("video", "b", "2020-06-01"),
            item("image", "c", "2020-06-01"),
            item("image", "d", "2020-06-15"),
            item("image", "e", "2020-06-30"),
            item("image", "f", "2020-07-01"),
        ]
    }

    #[test]
    fn test_unbounded_keeps_all_images_in_order() {
        let images = filter_images(project_images(sample()), &DateRange::default());
        assert_eq!(titles(&images), ["a", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let range = DateRange::new(bound(2020, 6, 1), bound(2020, 6, 30));
        let images = filter_images(project_images(sample()), &range);
        assert_eq!(titles(&images), ["c", "d", "e"]);
    }

    #[test]
    fn test_start_only_and_end_only() {
        let images = project_images(sample());

        let start_only = DateRange::new(bound(2020, 6, 15), None);
        assert_eq!(titles(&filter_images(images.clone(), &start_only)), ["d", "e", "f"]);

        let end_only = DateRange::new(None, bound(2020, 6, 1));
        assert_eq!(titles(&filter_images(images, &end_only)), ["a", "c"]);
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let range = DateRange::new(bound(2020, 7, 1), bound(2020, 5, 31));
        let images = filter_images(project_images(sample()), &range);
        assert!(images.is_empty());
    }

    #[test]
    fn test_single_day_range() {
        let feed = vec![
            item("video", "clip", "2020-06-01"),
            item("image", "match", "2020-06-01"),
            item("other", "misc", "2020-06-01"),
        ];
        let day = bound(2020, 6, 1);
        let outcome = CycleOutcome::from_fetch(Ok(feed), &DateRange::new(day, day));
        match outcome {
            CycleOutcome::Loaded(images) => assert_eq!(titles(&images), ["match"]),
            other => panic!("expected one image, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_and_unparsed_dates() {
        let mut no_date = item("image", "nodate", "");
        no_date.date = None;
        let images = project_images(vec![no_date, item("image", "garbled", "someday")]);

        let range = DateRange::new(bound(2020, 1, 1), bound(2020, 12, 31));
        assert_eq!(titles(&filter_images(images, &range)), ["garbled"]);
    }

    #[test]
    fn test_no_images_is_not_an_error() {
        let feed = vec![item("video", "clip", "2020-06-01")];
        let outcome = CycleOutcome::from_fetch(Ok(feed), &DateRange::default());
        assert_eq!(outcome, CycleOutcome::NoMatches);

        let mut gallery = Gallery::new();
        gallery.begin_loading();
        gallery.finish(outcome);
        assert_eq!(gallery.view(), &GalleryView::NoMatches);
        assert_eq!(gallery.placeholder().map(|p| p.1), Some(EMPTY_TEXT));
        assert_eq!(gallery.loading_banner(), None);
    }

    #[test]
    fn test_failure_shows_error_and_clears_loading() {
        let err = FeedError::Status {
            status: 500,
            reason: "Internal Server Error".into(),
        };
        let outcome = CycleOutcome::from_fetch(Err(err), &DateRange::default());
        assert!(matches!(outcome, CycleOutcome::Failed(_)));

        let mut gallery = Gallery::new();
        gallery.begin_loading();
        assert_eq!(gallery.loading_banner(), Some(LOADING_BANNER));
        assert_eq!(gallery.placeholder().map(|p| p.1), Some(LOADING_TEXT));

        gallery.finish(outcome);
        assert_eq!(gallery.view(), &GalleryView::Error);
        assert_eq!(gallery.placeholder().map(|p| p.1), Some(ERROR_TEXT));
        assert_eq!(gallery.loading_banner(), None);
    }

    #[test]
    fn test_content_selection() {
        let mut gallery = Gallery::new();
        gallery.begin_loading();
        gallery.finish(CycleOutcome::Loaded(project_images(sample())));
        assert_eq!(gallery.images().len(), 5);
        assert_eq!(gallery.loading_banner(), None);
        assert_eq!(gallery.placeholder(), None);

        gallery.select(3);
        assert_eq!(gallery.selected_image().map(|i| i.title.as_str()), Some("e"));
        gallery.select(99);
        assert_eq!(gallery.selected_index(), 3);

        // A new cycle drops the old cards
        gallery.begin_loading();
        assert!(gallery.images().is_empty());
        assert_eq!(gallery.selected_index(), 0);
    }

    #[tokio::test]
    async fn test_run_cycle_against_server() {
        let url = crate::feed::tests::serve_once(
            "200 OK",
            r#"[{"media_type":"image","title":"x","url":"u","date":"2020-06-01","explanation":"e"}]"#,
        )
        .await;
        let client = FeedClient::new(url, "darkwall-apod-test").unwrap();
        let outcome = run_cycle(&client, DateRange::default()).await;
        assert!(matches!(outcome, CycleOutcome::Loaded(ref v) if v.len() == 1));
    }

    #[tokio::test]
    async fn test_run_cycle_transport_failure() {
        let client = FeedClient::new(crate::feed::tests::dead_url().await, "darkwall-apod-test").unwrap();
        let outcome = run_cycle(&client, DateRange::default()).await;
        assert!(matches!(outcome, CycleOutcome::Failed(_)));
    }
}
