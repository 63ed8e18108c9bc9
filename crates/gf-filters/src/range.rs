//! Range slider controller
//!
//! Two linked bounds over a numeric or date column. The window can be moved
//! three ways: typing a bound, dragging one handle, or dragging the filled
//! track between the handles. Whatever the input, the bounds satisfy
//! `domain.min <= lo <= hi <= domain.max` after every call.

use gf_core::{FilterModel, FilterableColumn, RangeDomain, RangeFilterModel};
use gf_data::value::{edit_text, format_value, parse_value};
use tracing::debug;

/// One of the two slider bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Lo,
    Hi,
}

/// Interaction state of a slider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderMode {
    Idle,
    DraggingHandle(Bound),
    DraggingTrack,
    EditingText(Bound),
}

/// Observable state of a slider
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSliderState {
    pub lo: f64,
    pub hi: f64,
    pub domain_min: f64,
    pub domain_max: f64,
    pub lo_text: String,
    pub hi_text: String,
    pub editing_lo: bool,
    pub editing_hi: bool,
}

/// Window the grid last accepted
#[derive(Debug, Clone, Copy, PartialEq)]
struct AppliedWindow {
    lo: f64,
    hi: f64,
    active: bool,
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    origin: (f64, f64),
    track_width: f64,
}

/// State machine behind a numeric or date range slider
#[derive(Debug, Clone)]
pub struct RangeSliderController {
    column: FilterableColumn,
    domain: RangeDomain,
    lo: f64,
    hi: f64,
    lo_text: String,
    hi_text: String,
    mode: SliderMode,
    gesture: Option<Gesture>,
    /// Whether a range model is applied to the grid
    active: bool,
    applied: AppliedWindow,
}

impl RangeSliderController {
    pub fn new(column: FilterableColumn) -> Self {
        Self {
            column,
            domain: RangeDomain::default(),
            lo: 0.0,
            hi: 0.0,
            lo_text: String::new(),
            hi_text: String::new(),
            mode: SliderMode::Idle,
            gesture: None,
            active: false,
            applied: AppliedWindow {
                lo: 0.0,
                hi: 0.0,
                active: false,
            },
        }
    }

    /// Controller seeded from a scanned domain
    pub fn with_domain(column: FilterableColumn, domain: RangeDomain) -> Self {
        let mut controller = Self::new(column);
        controller.initialize(domain);
        controller
    }

    pub fn column(&self) -> &FilterableColumn {
        &self.column
    }

    pub fn domain(&self) -> RangeDomain {
        self.domain
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn mode(&self) -> SliderMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, SliderMode::DraggingHandle(_) | SliderMode::DraggingTrack)
    }

    pub fn text(&self, which: Bound) -> &str {
        match which {
            Bound::Lo => &self.lo_text,
            Bound::Hi => &self.hi_text,
        }
    }

    pub fn state(&self) -> RangeSliderState {
        RangeSliderState {
            lo: self.lo,
            hi: self.hi,
            domain_min: self.domain.min,
            domain_max: self.domain.max,
            lo_text: self.lo_text.clone(),
            hi_text: self.hi_text.clone(),
            editing_lo: self.mode == SliderMode::EditingText(Bound::Lo),
            editing_hi: self.mode == SliderMode::EditingText(Bound::Hi),
        }
    }

    /// Seed the window from the displayed bounds of `domain`
    pub fn initialize(&mut self, domain: RangeDomain) {
        self.domain = domain;
        self.active = false;
        self.mode = SliderMode::Idle;
        self.gesture = None;
        self.seed_from_displayed();
        self.remember();
    }

    /// Replace the domain after the grid re-filtered.
    ///
    /// Without an active filter the window follows the displayed bounds;
    /// otherwise the current window is kept, clamped into the new domain.
    pub fn refresh(&mut self, domain: RangeDomain) {
        self.domain = domain;
        if self.active {
            let lo = domain.clamp(self.lo);
            let hi = domain.clamp(self.hi).max(lo);
            self.set_window(lo, hi);
        } else {
            self.seed_from_displayed();
        }

        self.applied = if self.applied.active {
            let lo = domain.clamp(self.applied.lo);
            AppliedWindow {
                lo,
                hi: domain.clamp(self.applied.hi).max(lo),
                active: true,
            }
        } else {
            AppliedWindow {
                lo: self.lo,
                hi: self.hi,
                active: false,
            }
        };
    }

    /// Reconcile with a model known to be applied (e.g. restored state)
    pub fn apply_model(&mut self, model: Option<&RangeFilterModel>) {
        self.mode = SliderMode::Idle;
        self.gesture = None;

        match model {
            Some(model) => {
                let (lower, upper) = model.bounds();
                let lo = self.domain.clamp(lower.unwrap_or(self.domain.min));
                let hi = self.domain.clamp(upper.unwrap_or(self.domain.max)).max(lo);
                self.active = true;
                self.set_window(lo, hi);
            }
            None => {
                self.active = false;
                self.seed_from_displayed();
            }
        }
        self.remember();
    }

    /// Record the current window as accepted by the grid
    pub fn mark_applied(&mut self) {
        self.active = true;
        self.remember();
    }

    /// Return to the window the grid last accepted, dropping any drag
    pub fn rollback(&mut self) {
        if self.is_dragging() {
            self.mode = SliderMode::Idle;
        }
        self.gesture = None;
        self.active = self.applied.active;
        self.set_window(self.applied.lo, self.applied.hi);

        if let SliderMode::EditingText(which) = self.mode {
            *self.text_mut(which) = edit_text(self.bound(which), &self.column);
        }
        debug!(column = %self.column.id, lo = self.lo, hi = self.hi, "Range window rolled back");
    }

    /// Clear the filter; the caller submits a null model
    pub fn reset(&mut self) {
        self.mode = SliderMode::Idle;
        self.gesture = None;
        self.active = false;
        self.seed_from_displayed();
        self.remember();
    }

    /// Grab one handle
    pub fn begin_handle_drag(&mut self, which: Bound) {
        self.begin_gesture(SliderMode::DraggingHandle(which), 0.0);
    }

    /// Move one handle to `raw` (live preview, nothing is committed).
    ///
    /// Crossing the other handle collapses both onto the new value.
    pub fn drag_handle(&mut self, which: Bound, raw: f64) {
        if !raw.is_finite() {
            return;
        }

        if self.mode != SliderMode::DraggingHandle(which) {
            self.begin_gesture(SliderMode::DraggingHandle(which), 0.0);
        }

        let value = self.domain.clamp(raw);
        let (lo, hi) = match which {
            Bound::Lo if value > self.hi => (value, value),
            Bound::Hi if value < self.lo => (value, value),
            Bound::Lo => (value, self.hi),
            Bound::Hi => (self.lo, value),
        };
        self.set_window(lo, hi);
    }

    /// Start dragging the filled track across `track_width_px` pixels
    pub fn begin_track_drag(&mut self, track_width_px: f32) {
        self.begin_gesture(SliderMode::DraggingTrack, track_width_px as f64);
    }

    /// Translate the window by a pointer movement of `delta_px`.
    ///
    /// A bound that would leave the domain stops at the edge while the other
    /// one keeps moving, so the window narrows by the excess.
    pub fn drag_track(&mut self, delta_px: f32) {
        let Some(gesture) = self.gesture.filter(|_| self.mode == SliderMode::DraggingTrack) else {
            return;
        };

        let delta = delta_px as f64;
        if !delta.is_finite() || gesture.track_width <= 0.0 || self.domain.is_degenerate() {
            return;
        }

        let shift = delta * self.domain.span() / gesture.track_width;
        let lo = self.domain.clamp(self.lo + shift);
        let hi = self.domain.clamp(self.hi + shift).max(lo);
        self.set_window(lo, hi);
    }

    /// Finish a drag; returns the model to commit.
    ///
    /// The window counts as applied only after [`Self::mark_applied`].
    pub fn end_drag(&mut self) -> Option<FilterModel> {
        if !self.is_dragging() {
            return None;
        }

        self.mode = SliderMode::Idle;
        self.gesture = None;
        debug!(column = %self.column.id, lo = self.lo, hi = self.hi, "Range drag finished");
        Some(self.filter_model())
    }

    /// Abort a drag, restoring the window captured when it began
    pub fn cancel_drag(&mut self) {
        if !self.is_dragging() {
            return;
        }

        if let Some(gesture) = self.gesture.take() {
            let (lo, hi) = gesture.origin;
            self.set_window(lo, hi);
        }
        self.mode = SliderMode::Idle;
    }

    /// Focus a text box; it shows the raw value while editing
    pub fn begin_edit(&mut self, which: Bound) {
        if self.is_dragging() {
            self.cancel_drag();
        }
        self.mode = SliderMode::EditingText(which);
        let raw = edit_text(self.bound(which), &self.column);
        *self.text_mut(which) = raw;
    }

    /// Update the text box content while typing; nothing is parsed yet
    pub fn type_text(&mut self, which: Bound, text: &str) {
        if self.mode == SliderMode::EditingText(which) {
            *self.text_mut(which) = text.to_string();
        }
    }

    /// Apply typed text to one bound.
    ///
    /// Malformed text reverts to the current value and commits nothing;
    /// a valid value moves the bound (clamped into the domain) and yields
    /// the model to commit.
    pub fn edit_text(&mut self, which: Bound, raw: &str) -> Option<FilterModel> {
        let Some(parsed) = parse_value(raw, &self.column).filter(|v| v.is_finite()) else {
            debug!(column = %self.column.id, text = raw, "Rejected slider text");
            let current = self.display_text(which);
            *self.text_mut(which) = current;
            return None;
        };

        let value = self.domain.clamp(parsed);
        let (lo, hi) = match which {
            Bound::Lo if value > self.hi => (value, value),
            Bound::Hi if value < self.lo => (value, value),
            Bound::Lo => (value, self.hi),
            Bound::Hi => (self.lo, value),
        };
        self.set_window(lo, hi);

        // The box keeps what was typed until the edit ends
        if self.mode == SliderMode::EditingText(which) {
            *self.text_mut(which) = raw.to_string();
        }

        Some(self.filter_model())
    }

    /// Leave the text box; the text is reformatted
    pub fn end_edit(&mut self, which: Bound) {
        if self.mode == SliderMode::EditingText(which) {
            self.mode = SliderMode::Idle;
        }
        let text = self.display_text(which);
        *self.text_mut(which) = text;
    }

    /// Position of `value` on the track, in percent
    pub fn percent_of(&self, value: f64) -> f64 {
        if self.domain.is_degenerate() {
            return 100.0;
        }
        (value - self.domain.min) / self.domain.span() * 100.0
    }

    /// Filled part of the track as `(start%, end%)`
    pub fn fill(&self) -> (f64, f64) {
        if self.domain.is_degenerate() {
            return (0.0, 100.0);
        }
        (self.percent_of(self.lo), self.percent_of(self.hi))
    }

    /// Slider value at a fraction (0..=1) of the track
    pub fn value_at(&self, fraction: f64) -> f64 {
        self.domain.min + fraction.clamp(0.0, 1.0) * self.domain.span()
    }

    /// `lo <= value <= hi`
    pub fn filter_model(&self) -> FilterModel {
        FilterModel::range(self.lo, self.hi)
    }

    fn begin_gesture(&mut self, mode: SliderMode, track_width: f64) {
        // A new gesture keeps the origin of one already in progress
        let origin = match self.gesture {
            Some(gesture) if self.is_dragging() => gesture.origin,
            _ => (self.lo, self.hi),
        };
        self.gesture = Some(Gesture { origin, track_width });
        self.mode = mode;
    }

    fn remember(&mut self) {
        self.applied = AppliedWindow {
            lo: self.lo,
            hi: self.hi,
            active: self.active,
        };
    }

    fn seed_from_displayed(&mut self) {
        let lo = self.domain.clamp(self.domain.min_displayed);
        let hi = self.domain.clamp(self.domain.max_displayed).max(lo);
        self.set_window(lo, hi);
    }

    fn set_window(&mut self, lo: f64, hi: f64) {
        self.lo = lo;
        self.hi = hi;
        for which in [Bound::Lo, Bound::Hi] {
            if self.mode != SliderMode::EditingText(which) {
                let text = self.display_text(which);
                *self.text_mut(which) = text;
            }
        }
    }

    fn bound(&self, which: Bound) -> f64 {
        match which {
            Bound::Lo => self.lo,
            Bound::Hi => self.hi,
        }
    }

    fn display_text(&self, which: Bound) -> String {
        format_value(self.bound(which), &self.column)
    }

    fn text_mut(&mut self, which: Bound) -> &mut String {
        match which {
            Bound::Lo => &mut self.lo_text,
            Bound::Hi => &mut self.hi_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::DateGranularity;

    fn slider(min: f64, max: f64) -> RangeSliderController {
        RangeSliderController::with_domain(FilterableColumn::number("n"), RangeDomain::full(min, max))
    }

    fn assert_ordered(s: &RangeSliderController) {
        let d = s.domain();
        assert!(d.min <= s.lo() && s.lo() <= s.hi() && s.hi() <= d.max, "{:?}", s.state());
    }

    #[test]
    fn test_initialize_uses_displayed_bounds() {
        let s = RangeSliderController::with_domain(
            FilterableColumn::number("n"),
            RangeDomain::new(10.0, 40.0, 10.0, 30.0),
        );
        assert_eq!((s.lo(), s.hi()), (10.0, 30.0));
        assert_eq!(s.mode(), SliderMode::Idle);
        assert!(!s.is_active());
        assert_eq!(s.text(Bound::Hi), "30");
    }

    #[test]
    fn test_handle_drag_clamps_to_domain() {
        let mut s = slider(0.0, 100.0);
        s.drag_handle(Bound::Lo, -50.0);
        assert_eq!(s.lo(), 0.0);
        s.drag_handle(Bound::Lo, 1e9);
        assert_eq!((s.lo(), s.hi()), (100.0, 100.0));
        assert_ordered(&s);
    }

    #[test]
    fn test_crossing_handles_collapse() {
        let mut s = slider(0.0, 100.0);
        s.drag_handle(Bound::Hi, 40.0);
        s.drag_handle(Bound::Lo, 60.0);
        assert_eq!((s.lo(), s.hi()), (60.0, 60.0));

        s.drag_handle(Bound::Hi, 20.0);
        assert_eq!((s.lo(), s.hi()), (20.0, 20.0));
    }

    #[test]
    fn test_nan_drag_is_ignored() {
        let mut s = slider(0.0, 10.0);
        s.drag_handle(Bound::Lo, f64::NAN);
        assert_eq!((s.lo(), s.hi()), (0.0, 10.0));
        assert_eq!(s.mode(), SliderMode::Idle);
    }

    #[test]
    fn test_track_drag_narrows_at_edges() {
        let mut s = slider(0.0, 100.0);
        s.drag_handle(Bound::Lo, 20.0);
        s.drag_handle(Bound::Hi, 40.0);
        s.end_drag();

        s.begin_track_drag(200.0);
        s.drag_track(20.0);
        assert_eq!((s.lo(), s.hi()), (30.0, 50.0));

        s.drag_track(-100.0);
        assert_eq!((s.lo(), s.hi()), (0.0, 0.0));
        assert_ordered(&s);

        let model = s.end_drag();
        assert_eq!(model, Some(FilterModel::range(0.0, 0.0)));
        assert!(!s.is_active());
        s.mark_applied();
        assert!(s.is_active());
    }

    #[test]
    fn test_every_drag_step_keeps_order() {
        let mut s = slider(-5.0, 5.0);
        s.begin_track_drag(50.0);
        for delta in [3.0, -17.0, 40.0, -2.5, 90.0, -300.0, 12.0] {
            s.drag_track(delta);
            assert_ordered(&s);
        }
        for raw in [-9.0, 2.0, 7.0, -1.0] {
            s.drag_handle(Bound::Hi, raw);
            assert_ordered(&s);
            s.drag_handle(Bound::Lo, -raw);
            assert_ordered(&s);
        }
    }

    #[test]
    fn test_cancel_restores_origin() {
        let mut s = slider(0.0, 100.0);
        s.drag_handle(Bound::Lo, 30.0);
        s.drag_handle(Bound::Hi, 70.0);
        s.cancel_drag();
        assert_eq!((s.lo(), s.hi()), (0.0, 100.0));
        assert_eq!(s.mode(), SliderMode::Idle);
        assert_eq!(s.end_drag(), None);
    }

    #[test]
    fn test_degenerate_domain() {
        let mut s = slider(7.0, 7.0);
        assert_eq!(s.percent_of(7.0), 100.0);
        assert_eq!(s.fill(), (0.0, 100.0));

        s.begin_track_drag(100.0);
        s.drag_track(30.0);
        assert_eq!((s.lo(), s.hi()), (7.0, 7.0));
    }

    #[test]
    fn test_fill_percentages() {
        let mut s = slider(0.0, 200.0);
        s.drag_handle(Bound::Lo, 50.0);
        s.drag_handle(Bound::Hi, 150.0);
        assert_eq!(s.fill(), (25.0, 75.0));
        assert_eq!(s.value_at(0.5), 100.0);
    }

    #[test]
    fn test_invalid_date_text_reverts() {
        let column = FilterableColumn::date("d", DateGranularity::Date);
        // 01.01.2024 .. 31.12.2024
        let domain = RangeDomain::full(1_704_067_200_000.0, 1_735_603_200_000.0);
        let mut s = RangeSliderController::with_domain(column, domain);
        let before = s.state();

        s.begin_edit(Bound::Lo);
        s.type_text(Bound::Lo, "31.02.2024");
        assert_eq!(s.edit_text(Bound::Lo, "31.02.2024"), None);

        let after = s.state();
        assert_eq!((after.lo, after.hi), (before.lo, before.hi));
        assert_eq!(after.lo_text, "01.01.2024");
    }

    #[test]
    fn test_valid_text_commits_immediately() {
        let mut s = slider(0.0, 1000.0);
        s.begin_edit(Bound::Hi);
        assert_eq!(s.text(Bound::Hi), "1000");

        let model = s.edit_text(Bound::Hi, "1,250");
        assert_eq!(model, Some(FilterModel::range(0.0, 1000.0)));

        let model = s.edit_text(Bound::Hi, "640.5");
        assert_eq!(model, Some(FilterModel::range(0.0, 640.5)));
        assert_eq!(s.text(Bound::Hi), "640.5");

        s.end_edit(Bound::Hi);
        assert_eq!(s.mode(), SliderMode::Idle);
        assert_eq!(s.text(Bound::Hi), "640.5");
    }

    #[test]
    fn test_text_below_lo_collapses() {
        let mut s = slider(0.0, 100.0);
        s.edit_text(Bound::Lo, "40");
        s.edit_text(Bound::Hi, "10");
        assert_eq!((s.lo(), s.hi()), (10.0, 10.0));
    }

    #[test]
    fn test_refresh_keeps_active_window() {
        let mut s = slider(0.0, 100.0);
        s.edit_text(Bound::Lo, "20");
        s.edit_text(Bound::Hi, "90");
        s.mark_applied();

        s.refresh(RangeDomain::new(0.0, 50.0, 5.0, 45.0));
        assert_eq!((s.lo(), s.hi()), (20.0, 50.0));

        s.reset();
        assert!(!s.is_active());
        assert_eq!((s.lo(), s.hi()), (5.0, 45.0));

        s.refresh(RangeDomain::new(0.0, 50.0, 10.0, 12.0));
        assert_eq!((s.lo(), s.hi()), (10.0, 12.0));
    }

    #[test]
    fn test_apply_model() {
        let mut s = slider(0.0, 100.0);
        s.apply_model(FilterModel::range(-10.0, 60.0).as_range());
        assert_eq!((s.lo(), s.hi()), (0.0, 60.0));
        assert!(s.is_active());

        s.apply_model(None);
        assert_eq!((s.lo(), s.hi()), (0.0, 100.0));
        assert!(!s.is_active());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut s = slider(0.0, 100.0);
        s.edit_text(Bound::Lo, "25");
        s.mark_applied();
        s.reset();
        let once = s.state();
        s.reset();
        assert_eq!(s.state(), once);
    }

    #[test]
    fn test_rollback_restores_applied_window() {
        let mut s = slider(0.0, 100.0);
        s.edit_text(Bound::Hi, "60");
        s.mark_applied();

        s.begin_edit(Bound::Lo);
        s.edit_text(Bound::Lo, "30");
        s.rollback();
        assert_eq!((s.lo(), s.hi()), (0.0, 60.0));
        assert_eq!(s.text(Bound::Lo), "0");
        assert_eq!(s.mode(), SliderMode::EditingText(Bound::Lo));
        assert!(s.is_active());

        s.drag_handle(Bound::Hi, 90.0);
        s.rollback();
        assert_eq!((s.lo(), s.hi()), (0.0, 60.0));
        assert!(!s.is_dragging());
    }

    #[test]
    fn test_rollback_without_applied_filter_follows_refresh() {
        let mut s = slider(0.0, 100.0);
        s.refresh(RangeDomain::new(0.0, 100.0, 10.0, 40.0));
        s.edit_text(Bound::Hi, "25");
        s.rollback();
        assert!(!s.is_active());
        assert_eq!((s.lo(), s.hi()), (10.0, 40.0));
    }
}
