//! Range slider widget
//!
//! Two text boxes above a track with two handles. Grabbing a handle moves
//! that bound; grabbing the filled part between the handles moves the whole
//! window. egui keeps delivering drag deltas while the pointer is captured,
//! even outside the widget, and the release ends the gesture anywhere.

use egui::{pos2, vec2, Color32, Id, Key, Rect, Response, Rounding, Sense, Stroke, TextEdit, Ui};
use gf_data::value::{edit_text, parse_value};
use gf_filters::{Bound, DragKind, RangeSliderController, SliderMode};

use crate::actions::FilterAction;
use crate::theme;
use crate::widget_utils::WidgetId;

const TRACK_HEIGHT: f32 = 4.0;
const HANDLE_RADIUS: f32 = 7.0;

/// Draw a range slider and collect what the user did with it
pub fn range_slider(
    ui: &mut Ui,
    table_key: &str,
    slider: &RangeSliderController,
    actions: &mut Vec<FilterAction>,
) {
    let column = &slider.column().id;
    let base = WidgetId::new("range").with(table_key).with(column);

    ui.label(egui::RichText::new(&slider.column().header).strong());

    ui.horizontal(|ui| {
        let width = (ui.available_width() - ui.spacing().item_spacing.x) / 2.0;
        bound_text(ui, base.clone().with("lo").id(), column, slider, Bound::Lo, width, actions);
        bound_text(ui, base.clone().with("hi").id(), column, slider, Bound::Hi, width, actions);
    });

    let (rect, response) = ui.allocate_exact_size(
        vec2(ui.available_width(), HANDLE_RADIUS * 2.0 + 4.0),
        Sense::click_and_drag(),
    );
    let track = rect.shrink2(vec2(HANDLE_RADIUS, 0.0));

    handle_pointer(ui, &response, track, column, slider, actions);
    paint(ui, rect, track, slider);
}

fn bound_text(
    ui: &mut Ui,
    id: Id,
    column: &str,
    slider: &RangeSliderController,
    which: Bound,
    width: f32,
    actions: &mut Vec<FilterAction>,
) {
    let mut text = slider.text(which).to_string();
    let response = ui.add(TextEdit::singleline(&mut text).id(id).desired_width(width));

    if response.gained_focus() {
        actions.push(FilterAction::BeginEdit {
            column: column.to_string(),
            which,
        });
    }
    if response.changed() {
        actions.extend(typed_actions(column, slider, which, text));
    }
    if response.lost_focus() {
        // Text that never parsed is reverted here
        actions.push(FilterAction::EndEdit {
            column: column.to_string(),
            which,
        });
    }
}

/// Actions for one change of a bound's text box.
///
/// Every change that parses commits right away; leaving the box untouched
/// must not activate the filter.
fn typed_actions(column: &str, slider: &RangeSliderController, which: Bound, text: String) -> Vec<FilterAction> {
    let current = match which {
        Bound::Lo => slider.lo(),
        Bound::Hi => slider.hi(),
    };
    let commit = parse_value(&text, slider.column()).is_some() && text != edit_text(current, slider.column());

    let mut actions = vec![FilterAction::TypeText {
        column: column.to_string(),
        which,
        text: text.clone(),
    }];
    if commit {
        actions.push(FilterAction::CommitText {
            column: column.to_string(),
            which,
            text,
        });
    }
    actions
}

fn handle_pointer(
    ui: &Ui,
    response: &Response,
    track: Rect,
    column: &str,
    slider: &RangeSliderController,
    actions: &mut Vec<FilterAction>,
) {
    let fraction_at = |x: f32| -> f64 {
        if track.width() <= 0.0 {
            return 0.0;
        }
        ((x - track.left()) / track.width()).clamp(0.0, 1.0) as f64
    };

    if response.drag_started() {
        if let Some(pointer) = response.interact_pointer_pos() {
            let kind = grab_kind(track, slider, pointer.x);
            actions.push(FilterAction::BeginDrag {
                column: column.to_string(),
                kind,
            });
            if let DragKind::Handle(which) = kind {
                actions.push(FilterAction::DragHandle {
                    which,
                    raw: slider.value_at(fraction_at(pointer.x)),
                });
            }
            if response.drag_released() {
                actions.push(FilterAction::EndDrag);
            }
        }
        return;
    }

    if !slider.is_dragging() {
        return;
    }

    if ui.input(|i| i.key_pressed(Key::Escape)) {
        actions.push(FilterAction::CancelDrag);
        return;
    }

    if response.dragged() {
        match slider.mode() {
            SliderMode::DraggingHandle(which) => {
                if let Some(pointer) = response.interact_pointer_pos() {
                    actions.push(FilterAction::DragHandle {
                        which,
                        raw: slider.value_at(fraction_at(pointer.x)),
                    });
                }
            }
            SliderMode::DraggingTrack => {
                let delta = response.drag_delta().x;
                if delta != 0.0 {
                    actions.push(FilterAction::DragTrack { delta_px: delta });
                }
            }
            _ => {}
        }
    }

    if response.drag_released() {
        actions.push(FilterAction::EndDrag);
    }
}

/// Nearest handle, or the track when grabbed between the handles
fn grab_kind(track: Rect, slider: &RangeSliderController, x: f32) -> DragKind {
    let (start, end) = slider.fill();
    let lo_x = track.left() + track.width() * (start / 100.0) as f32;
    let hi_x = track.left() + track.width() * (end / 100.0) as f32;

    let near_lo = (x - lo_x).abs() <= HANDLE_RADIUS;
    let near_hi = (x - hi_x).abs() <= HANDLE_RADIUS;

    match (near_lo, near_hi) {
        // Collapsed handles: pick by direction of the grab
        (true, true) if x < lo_x => DragKind::Handle(Bound::Lo),
        (true, true) => DragKind::Handle(Bound::Hi),
        (true, false) => DragKind::Handle(Bound::Lo),
        (false, true) => DragKind::Handle(Bound::Hi),
        _ if x > lo_x && x < hi_x => DragKind::Track {
            width_px: track.width(),
        },
        _ if (x - lo_x).abs() < (x - hi_x).abs() => DragKind::Handle(Bound::Lo),
        _ => DragKind::Handle(Bound::Hi),
    }
}

fn paint(ui: &Ui, rect: Rect, track: Rect, slider: &RangeSliderController) {
    let painter = ui.painter_at(rect);
    let center_y = rect.center().y;
    let (start, end) = slider.fill();
    let lo_x = track.left() + track.width() * (start / 100.0) as f32;
    let hi_x = track.left() + track.width() * (end / 100.0) as f32;

    let rail = Rect::from_min_max(
        pos2(track.left(), center_y - TRACK_HEIGHT / 2.0),
        pos2(track.right(), center_y + TRACK_HEIGHT / 2.0),
    );
    painter.rect_filled(rail, Rounding::same(2.0), theme::track_color(ui.visuals()));

    let fill = Rect::from_min_max(
        pos2(lo_x, center_y - TRACK_HEIGHT / 2.0),
        pos2(hi_x, center_y + TRACK_HEIGHT / 2.0),
    );
    painter.rect_filled(fill, Rounding::same(2.0), theme::accent_color());

    let handle_fill = if slider.is_active() {
        theme::accent_color()
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    for x in [lo_x, hi_x] {
        let center = pos2(x, center_y);
        painter.circle_filled(center, HANDLE_RADIUS, handle_fill);
        painter.circle_stroke(center, HANDLE_RADIUS, Stroke::new(1.5, Color32::WHITE));
    }
}
