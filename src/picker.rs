//! The six date-part selectors (start/end × month/day/year).
//!
//! Each selector starts on its placeholder ("MM", "DD", "YYYY"). Months run
//! 1-12 and days 1-31 regardless of the chosen month; years run from the
//! configured first year up to the current year, newest first.

use chrono::NaiveDate;

use crate::date_bound::DateParts;
use crate::gallery::DateRange;

/// Number of selectors, in focus order
pub const CONTROL_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Month,
    Day,
    Year,
}

impl DatePart {
    pub fn placeholder(&self) -> &'static str {
        match self {
            DatePart::Month => "MM",
            DatePart::Day => "DD",
            DatePart::Year => "YYYY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// A single dropdown-style selector
#[derive(Debug, Clone)]
pub struct SelectControl {
    part: DatePart,
    options: Vec<i32>,
    /// Index into `options`; `None` is the placeholder
    selected: Option<usize>,
}

impl SelectControl {
    pub fn month() -> Self {
        Self::with_options(DatePart::Month, (1..=12).collect())
    }

    pub fn day() -> Self {
        Self::with_options(DatePart::Day, (1..=31).collect())
    }

    /// Years from `last` down to `first`
    pub fn year(first: i32, last: i32) -> Self {
        Self::with_options(DatePart::Year, (first..=last).rev().collect())
    }

    fn with_options(part: DatePart, options: Vec<i32>) -> Self {
        Self {
            part,
            options,
            selected: None,
        }
    }

    pub fn value(&self) -> Option<i32> {
        self.selected.map(|i| self.options[i])
    }

    /// Text shown in the control: the placeholder, or the value (months and
    /// days zero-padded)
    pub fn display(&self) -> String {
        match (self.value(), self.part) {
            (None, part) => part.placeholder().to_string(),
            (Some(v), DatePart::Year) => v.to_string(),
            (Some(v), _) => format!("{:02}", v),
        }
    }

    /// Width of the widest possible display text
    pub fn display_width(&self) -> usize {
        self.part.placeholder().len()
    }

    /// Move to the next option; from the placeholder, to the first option
    pub fn select_next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            None => 0,
            Some(i) => (i + 1).min(self.options.len() - 1),
        });
    }

    /// Move to the previous option, stopping at the first one. The
    /// placeholder is only reachable through [`SelectControl::clear`].
    pub fn select_prev(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            None => 0,
            Some(i) => i.saturating_sub(1),
        });
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Select `value` if it is one of the options
    pub fn select_value(&mut self, value: i32) -> bool {
        match self.options.iter().position(|&v| v == value) {
            Some(i) => {
                self.selected = Some(i);
                true
            }
            None => false,
        }
    }
}

/// Month/day/year selectors for one end of the range
#[derive(Debug, Clone)]
pub struct BoundPicker {
    pub month: SelectControl,
    pub day: SelectControl,
    pub year: SelectControl,
}

impl BoundPicker {
    pub fn new(first_year: i32, last_year: i32) -> Self {
        Self {
            month: SelectControl::month(),
            day: SelectControl::day(),
            year: SelectControl::year(first_year, last_year),
        }
    }

    pub fn parts(&self) -> DateParts {
        DateParts::new(
            self.month.value().and_then(|m| u32::try_from(m).ok()),
            self.day.value().and_then(|d| u32::try_from(d).ok()),
            self.year.value(),
        )
    }
}

/// All six selectors
#[derive(Debug, Clone)]
pub struct RangePicker {
    start: BoundPicker,
    end: BoundPicker,
}

impl RangePicker {
    pub fn new(first_year: i32, current_year: i32) -> Self {
        Self {
            start: BoundPicker::new(first_year, current_year),
            end: BoundPicker::new(first_year, current_year),
        }
    }

    /// Selector by focus index: start month/day/year, then end month/day/year
    pub fn control(&self, index: usize) -> Option<&SelectControl> {
        let bound = match index / 3 {
            0 => &self.start,
            1 => &self.end,
            _ => return None,
        };
        Some(match index % 3 {
            0 => &bound.month,
            1 => &bound.day,
            _ => &bound.year,
        })
    }

    pub fn control_mut(&mut self, index: usize) -> Option<&mut SelectControl> {
        let bound = match index / 3 {
            0 => &mut self.start,
            1 => &mut self.end,
            _ => return None,
        };
        Some(match index % 3 {
            0 => &mut bound.month,
            1 => &mut bound.day,
            _ => &mut bound.year,
        })
    }

    /// Bounds read from the current selections
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start.parts().bound(), self.end.parts().bound())
    }

    /// Set all three selectors of one endpoint from a calendar date.
    /// Returns `false` (leaving the endpoint untouched) if the year is out of
    /// the selectable range.
    pub fn preselect(&mut self, endpoint: Endpoint, date: NaiveDate) -> bool {
        let parts = DateParts::from_date(date);
        let bound = match endpoint {
            Endpoint::Start => &mut self.start,
            Endpoint::End => &mut self.end,
        };

        let mut candidate = bound.clone();
        let ok = parts.month.is_some_and(|m| candidate.month.select_value(m as i32))
            && parts.day.is_some_and(|d| candidate.day.select_value(d as i32))
            && parts.year.is_some_and(|y| candidate.year.select_value(y));
        if ok {
            *bound = candidate;
        }
        ok
    }
}
