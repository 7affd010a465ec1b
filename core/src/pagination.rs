//! Infinite-scroll window over a filtered payment list.
//!
//! Shows `initial` rows, grows by `step` each time the viewport sentinel
//! becomes visible, and snaps back to `initial` whenever the filter changes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListFooter {
    Loading,
    MoreAvailable,
    AllShown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InfiniteScroll {
    initial: usize,
    step:    usize,
    visible: usize,
}

impl InfiniteScroll {
    pub fn new(initial: usize, step: usize) -> Self {
        Self {
            initial,
            step,
            visible: initial,
        }
    }

    /// The requested window size. May exceed the list length;
    /// use `shown` for the number of rows actually on screen.
    pub fn visible_count(&self) -> usize {
        self.visible
    }

    pub fn shown(&self, total: usize) -> usize {
        self.visible.min(total)
    }

    /// Sentinel came into view. Grows the window by one step, never past
    /// `total`. Returns true when the window changed.
    pub fn on_sentinel_visible(&mut self, total: usize) -> bool {
        if self.visible >= total {
            return false;
        }
        self.visible = (self.visible + self.step).min(total);
        true
    }

    /// Filter changed: start over.
    pub fn reset(&mut self) {
        self.visible = self.initial;
    }

    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.shown(items.len())]
    }

    /// Footer shown under the list.
    pub fn status_line(&self, total: usize, loading: bool) -> ListFooter {
        if loading {
            ListFooter::Loading
        } else if self.shown(total) < total {
            ListFooter::MoreAvailable
        } else {
            ListFooter::AllShown
        }
    }
}
