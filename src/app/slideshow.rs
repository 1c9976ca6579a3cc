// SPDX-License-Identifier: MPL-2.0

//! Timed slideshow over journal entries

use crate::journal::JournalEntry;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Playback options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideshowOptions {
    /// Time each slide stays up
    pub interval: Duration,
    /// Start over after the last slide
    pub looping: bool,
}

/// Cursor over a list of entries with wrap-around navigation
#[derive(Debug)]
pub struct Slideshow<'a> {
    entries: &'a [JournalEntry],
    position: usize,
}

impl<'a> Slideshow<'a> {
    pub fn new(entries: &'a [JournalEntry]) -> Self {
        Self {
            entries,
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Option<&'a JournalEntry> {
        self.entries.get(self.position)
    }

    /// Move to the next slide, wrapping to the first
    pub fn advance(&mut self) -> Option<&'a JournalEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.position = (self.position + 1) % self.entries.len();
        self.current()
    }

    /// Move to the previous slide, wrapping to the last
    pub fn rewind(&mut self) -> Option<&'a JournalEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.position = self
            .position
            .checked_sub(1)
            .unwrap_or(self.entries.len() - 1);
        self.current()
    }

    /// Play the slideshow
    ///
    /// `show` is called with each slide's position and entry. Playback ends when
    /// `stop` completes or, without looping, after the last slide's interval.
    /// Returns the number of slides shown.
    pub async fn play<F, S>(&mut self, options: SlideshowOptions, stop: S, mut show: F) -> usize
    where
        F: FnMut(usize, &JournalEntry),
        S: Future<Output = ()>,
    {
        if self.entries.is_empty() {
            return 0;
        }

        info!(
            slides = self.entries.len(),
            interval_ms = options.interval.as_millis() as u64,
            looping = options.looping,
            "Slideshow started"
        );

        tokio::pin!(stop);
        let mut shown = 0;
        loop {
            if let Some(entry) = self.current() {
                show(self.position, entry);
                shown += 1;
            }

            tokio::select! {
                _ = &mut stop => {
                    debug!("Slideshow stopped");
                    break;
                }
                _ = tokio::time::sleep(options.interval) => {}
            }

            let at_end = self.position + 1 == self.entries.len();
            if at_end && !options.looping {
                break;
            }
            self.advance();
        }

        info!(shown, "Slideshow finished");
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::NewEntry;

    fn entries(count: usize) -> Vec<JournalEntry> {
        (0..count)
            .map(|i| NewEntry::new().note(format!("slide {}", i)).into_entry())
            .collect()
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let entries = entries(3);
        let mut show = Slideshow::new(&entries);

        assert_eq!(show.rewind().map(|e| e.id), Some(entries[2].id));
        assert_eq!(show.advance().map(|e| e.id), Some(entries[0].id));
        assert_eq!(show.advance().map(|e| e.id), Some(entries[1].id));
    }

    #[test]
    fn empty_slideshow_has_nothing_to_show() {
        let entries = entries(0);
        let mut show = Slideshow::new(&entries);
        assert!(show.current().is_none());
        assert!(show.advance().is_none());
        assert!(show.rewind().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn plays_each_slide_once_without_looping() {
        let entries = entries(3);
        let mut seen = Vec::new();

        let shown = Slideshow::new(&entries)
            .play(
                SlideshowOptions {
                    interval: Duration::from_secs(3),
                    looping: false,
                },
                std::future::pending(),
                |position, _| seen.push(position),
            )
            .await;

        assert_eq!(shown, 3);
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn looping_stops_on_request() {
        let entries = entries(2);
        let mut seen = Vec::new();

        let shown = Slideshow::new(&entries)
            .play(
                SlideshowOptions {
                    interval: Duration::from_secs(2),
                    looping: true,
                },
                tokio::time::sleep(Duration::from_secs(9)),
                |position, _| seen.push(position),
            )
            .await;

        // Slides at t=0,2,4,6,8; stop fires at t=9
        assert_eq!(shown, 5);
        assert_eq!(seen, vec![0, 1, 0, 1, 0]);
    }
}
