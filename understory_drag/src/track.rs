// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer sample tracking for one contact: press point, last sample, and the
//! distance gate.
//!
//! ## Usage
//!
//! 1) Call [`PointerTrack::start`] with the press position.
//! 2) On each move sample, call [`PointerTrack::update`]; it returns `None` for a
//!    sample identical to the previous one, so callers can skip redundant work.
//! 3) Use [`PointerTrack::total_offset`] for the offset from the press point and
//!    [`PointerTrack::exceeds`] to test a minimum-distance gate.
//! 4) Call [`PointerTrack::end`] to reset.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_drag::track::PointerTrack;
//!
//! let mut track = PointerTrack::default();
//! track.start(Point::new(10.0, 20.0));
//!
//! assert_eq!(track.update(Point::new(15.0, 25.0)), Some(Vec2::new(5.0, 5.0)));
//! // The same sample again is a no-op.
//! assert_eq!(track.update(Point::new(15.0, 25.0)), None);
//! assert!(!track.exceeds(Point::new(15.0, 25.0), 10.0));
//! ```

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Vec2};

/// Tracks press and move samples for a single contact.
#[derive(Debug, Clone, Default, Copy)]
pub struct PointerTrack {
    /// Position of the press that started tracking.
    pub start_pos: Option<Point>,
    /// Last accepted move sample; `None` until the first move.
    pub last_pos: Option<Point>,
}

impl PointerTrack {
    /// Start tracking from a press position.
    ///
    /// The press itself is not a move sample: the first move is always accepted,
    /// even when it lands on the press position.
    pub fn start(&mut self, pos: Point) {
        self.start_pos = Some(pos);
        self.last_pos = None;
    }

    /// Accept a move sample, returning the delta since the previous sample.
    ///
    /// Returns `None` when not tracking, or when `pos` equals the previous
    /// sample exactly.
    pub fn update(&mut self, pos: Point) -> Option<Vec2> {
        let start = self.start_pos?;
        let previous = self.last_pos.unwrap_or(start);
        if self.last_pos == Some(pos) {
            return None;
        }
        self.last_pos = Some(pos);
        Some(pos - previous)
    }

    /// Offset from the press position.
    pub fn total_offset(&self, current_pos: Point) -> Option<Vec2> {
        self.start_pos.map(|start_pos| current_pos - start_pos)
    }

    /// Returns `true` once `pos` is farther than `distance` from the press
    /// position on either axis.
    pub fn exceeds(&self, pos: Point, distance: f64) -> bool {
        self.total_offset(pos)
            .is_some_and(|d| d.x.abs() > distance || d.y.abs() > distance)
    }

    /// Last accepted sample, or the press position before any move.
    pub fn current(&self) -> Option<Point> {
        self.last_pos.or(self.start_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_track_is_idle() {
        let track = PointerTrack::default();
        assert!(track.start_pos.is_none());
        assert!(track.current().is_none());
    }

    #[test]
    fn start_records_press_without_sample() {
        let mut track = PointerTrack::default();
        track.start(Point::new(10.0, 20.0));

        assert_eq!(track.start_pos, Some(Point::new(10.0, 20.0)));
        assert!(track.last_pos.is_none());
        assert_eq!(track.current(), Some(Point::new(10.0, 20.0)));
    }

    #[test]
    fn first_move_on_press_point_is_accepted() {
        let mut track = PointerTrack::default();
        track.start(Point::new(10.0, 20.0));

        assert_eq!(track.update(Point::new(10.0, 20.0)), Some(Vec2::ZERO));
        // A repeat of that same sample is skipped.
        assert_eq!(track.update(Point::new(10.0, 20.0)), None);
    }

    #[test]
    fn update_returns_none_when_idle() {
        let mut track = PointerTrack::default();
        assert_eq!(track.update(Point::new(15.0, 25.0)), None);
        assert!(track.last_pos.is_none());
    }

    #[test]
    fn updates_track_incremental_deltas() {
        let mut track = PointerTrack::default();
        track.start(Point::new(0.0, 0.0));

        assert_eq!(track.update(Point::new(5.0, 3.0)), Some(Vec2::new(5.0, 3.0)));
        assert_eq!(track.update(Point::new(8.0, 7.0)), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(track.update(Point::new(5.0, 3.0)), Some(Vec2::new(-3.0, -4.0)));
        assert_eq!(
            track.total_offset(Point::new(5.0, 3.0)),
            Some(Vec2::new(5.0, 3.0))
        );
    }

    #[test]
    fn distance_gate_uses_either_axis() {
        let mut track = PointerTrack::default();
        track.start(Point::new(110.0, 110.0));

        assert!(!track.exceeds(Point::new(112.0, 112.0), 10.0));
        assert!(!track.exceeds(Point::new(120.0, 110.0), 10.0));
        assert!(track.exceeds(Point::new(110.0, 121.0), 10.0));
        assert!(track.exceeds(Point::new(99.0, 110.0), 10.0));
    }

    #[test]
    fn restart_overwrites_previous_press() {
        let mut track = PointerTrack::default();
        track.start(Point::new(0.0, 0.0));
        track.update(Point::new(10.0, 10.0));

        track.start(Point::new(50.0, 60.0));
        assert_eq!(
            track.total_offset(Point::new(55.0, 65.0)),
            Some(Vec2::new(5.0, 5.0))
        );
    }
}
