//! Page-turn state owned by the coordinator.

use serde::{Deserialize, Serialize};

/// Direction of a page turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TurnDirection {
    /// Toward higher page indices
    #[default]
    Forward,
    /// Toward lower page indices
    Backward,
}

impl TurnDirection {
    /// +1 for forward, -1 for backward
    pub fn sign(self) -> f32 {
        match self {
            TurnDirection::Forward => 1.0,
            TurnDirection::Backward => -1.0,
        }
    }

    /// Progress the leaf rests at before this turn starts.
    ///
    /// A forward turn lifts the current leaf from the right (0); a backward
    /// turn brings the previous leaf back from the left (1).
    pub fn rest_progress(self) -> f32 {
        match self {
            TurnDirection::Forward => 0.0,
            TurnDirection::Backward => 1.0,
        }
    }

    /// Progress at which this turn is committed
    pub fn committed_progress(self) -> f32 {
        1.0 - self.rest_progress()
    }

    /// Apply the direction to a page index, `None` past either end
    pub fn step(self, index: usize, count: usize) -> Option<usize> {
        match self {
            TurnDirection::Forward => index.checked_add(1).filter(|next| *next < count),
            TurnDirection::Backward => index.checked_sub(1),
        }
    }
}

/// Reading position and turn status as seen by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnState {
    /// Zero-based page index, always within `[0, total_pages - 1]`
    pub current_page: usize,
    /// Number of pages (at least 1)
    pub total_pages: usize,
    /// Whether a drag or animation is in progress
    pub is_turning: bool,
    /// Direction of the current or last turn
    pub direction: TurnDirection,
    /// Turn progress, 0 whenever not turning
    pub progress: f32,
}

impl TurnState {
    /// New state at `current_page` (clamped) of `total_pages` (floored to 1)
    pub fn new(current_page: usize, total_pages: usize) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            current_page: current_page.min(total_pages - 1),
            total_pages,
            is_turning: false,
            direction: TurnDirection::Forward,
            progress: 0.0,
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.current_page == 0
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page + 1 >= self.total_pages
    }

    /// Reading position as a fraction of the book (0 on a single page)
    pub fn reading_fraction(&self) -> f32 {
        if self.total_pages <= 1 {
            0.0
        } else {
            self.current_page as f32 / (self.total_pages - 1) as f32
        }
    }

    /// Return to rest, keeping the page position
    pub fn settle(&mut self) {
        self.is_turning = false;
        self.progress = 0.0;
    }

    /// Change the page count, keeping the current page in range
    pub fn set_total_pages(&mut self, total_pages: usize) {
        self.total_pages = total_pages.max(1);
        self.current_page = self.current_page.min(self.total_pages - 1);
    }
}
