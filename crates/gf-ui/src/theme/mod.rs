use egui::{Color32, Context, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};
use std::collections::BTreeMap;

/// Theme configuration
pub struct Theme {
    pub dark_mode: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self { dark_mode: false }
    }
}

/// Apply the dashboard theme
pub fn apply_theme(ctx: &Context, theme: &Theme) {
    let mut style = Style::default();
    let mut visuals = if theme.dark_mode {
        Visuals::dark()
    } else {
        Visuals::light()
    };

    let (panel_bg, widget_bg, border, text) = if theme.dark_mode {
        (
            Color32::from_rgb(31, 31, 31),
            Color32::from_rgb(40, 40, 40),
            Color32::from_rgb(70, 70, 70),
            Color32::from_rgb(220, 220, 220),
        )
    } else {
        (
            Color32::from_rgb(248, 248, 248),
            Color32::WHITE,
            Color32::from_rgb(219, 221, 223), // grid border grey
            Color32::from_rgb(24, 29, 31),
        )
    };

    visuals.panel_fill = panel_bg;
    visuals.window_fill = panel_bg;
    visuals.faint_bg_color = widget_bg;

    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
    ] {
        widget.bg_stroke = Stroke::new(1.0, border);
        widget.fg_stroke = Stroke::new(1.0, text);
        widget.rounding = Rounding::same(3.0);
    }
    visuals.widgets.inactive.bg_fill = widget_bg;
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, accent_color());
    visuals.widgets.active.rounding = Rounding::same(3.0);

    visuals.selection.bg_fill = accent_color().linear_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, accent_color());

    style.spacing.item_spacing = egui::vec2(6.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 3.0);

    let mut font_sizes = BTreeMap::new();
    font_sizes.insert(TextStyle::Small, FontId::new(11.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Body, FontId::new(13.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Button, FontId::new(13.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Heading, FontId::new(16.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace));
    style.text_styles = font_sizes;

    ctx.set_style(style);
    ctx.set_visuals(visuals);
}

/// Fill of an active slider range and of selections
pub fn accent_color() -> Color32 {
    Color32::from_rgb(33, 150, 243)
}

/// Unfilled slider rail
pub fn track_color(visuals: &Visuals) -> Color32 {
    if visuals.dark_mode {
        Color32::from_rgb(70, 70, 70)
    } else {
        Color32::from_rgb(210, 213, 216)
    }
}

/// Labels of values that no displayed row carries
pub fn muted_text(visuals: &Visuals) -> Color32 {
    visuals.weak_text_color()
}
