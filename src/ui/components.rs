//! Shared UI components.

use std::time::{Duration, Instant};

use eframe::egui::{self, Button, Color32, Response, RichText, Ui};
use egui_phosphor::regular::{CARET_LEFT, CARET_RIGHT, CHECK_CIRCLE, WARNING_CIRCLE};

/// Status indicator colors.
pub mod colors {
    use super::Color32;

    pub const PRIMARY: Color32 = Color32::from_rgb(34, 197, 94);
    pub const SUCCESS: Color32 = Color32::from_rgb(100, 200, 100);
    pub const ERROR: Color32 = Color32::from_rgb(255, 100, 100);
    pub const WARNING: Color32 = Color32::from_rgb(255, 200, 100);
    pub const NEUTRAL: Color32 = Color32::from_rgb(150, 150, 150);
}

/// Render a panel header with title.
pub fn panel_header(ui: &mut Ui, title: &str) {
    ui.heading(RichText::new(title).size(24.0));
    ui.add_space(10.0);
    ui.separator();
    ui.add_space(10.0);
}

/// Filled green button with an icon.
pub fn primary_button_with_icon(ui: &mut Ui, enabled: bool, icon: &str, text: &str) -> Response {
    let label = RichText::new(format!("{icon} {text}")).color(Color32::WHITE).strong();
    ui.add_enabled(enabled, Button::new(label).fill(colors::PRIMARY))
}

pub fn styled_button_with_icon(ui: &mut Ui, enabled: bool, icon: &str, text: &str) -> Response {
    ui.add_enabled(enabled, Button::new(format!("{icon} {text}")))
}

/// Red button for destructive actions.
pub fn danger_button(ui: &mut Ui, enabled: bool, text: &str) -> Response {
    let label = RichText::new(text).color(Color32::WHITE).strong();
    ui.add_enabled(enabled, Button::new(label).fill(colors::ERROR))
}

/// Icon-only table action with a hover tooltip.
pub fn icon_button(ui: &mut Ui, enabled: bool, icon: &str, tooltip: &str) -> bool {
    ui.add_enabled(enabled, Button::new(icon).frame(false))
        .on_hover_text(tooltip)
        .clicked()
}

/// Centered, fixed-size dialog window.
pub fn modal<'open>(title: &str) -> egui::Window<'open> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
}

/// Previous/next page controls. Returns the requested page, if any.
pub fn pager(ui: &mut Ui, page: usize, total_pages: usize) -> Option<usize> {
    let mut target = None;
    ui.horizontal(|ui| {
        if ui.add_enabled(page > 1, Button::new(CARET_LEFT)).clicked() {
            target = Some(page - 1);
        }
        ui.label(format!("Page {page} of {total_pages}"));
        if ui.add_enabled(page < total_pages, Button::new(CARET_RIGHT)).clicked() {
            target = Some(page + 1);
        }
    });
    target
}

/// Inline validation message under a field.
pub fn field_error(ui: &mut Ui, error: Option<&str>) {
    if let Some(msg) = error {
        ui.colored_label(colors::ERROR, RichText::new(msg).small());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient banner shown after an operation finishes.
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    shown_at: Instant,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.shown_at.elapsed() >= ttl
    }
}

/// Render the banner. Returns true when dismissed.
pub fn notification_banner(ui: &mut Ui, notification: &Notification) -> bool {
    let (color, icon) = match notification.level {
        NotificationLevel::Success => (colors::SUCCESS, CHECK_CIRCLE),
        NotificationLevel::Error => (colors::ERROR, WARNING_CIRCLE),
    };
    let mut dismissed = false;
    ui.horizontal(|ui| {
        ui.colored_label(color, RichText::new(format!("{icon} {}", notification.message)).strong());
        if ui.small_button("x").clicked() {
            dismissed = true;
        }
    });
    dismissed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_expiry() {
        let n = Notification::success("Saved");
        assert!(!n.is_expired(Duration::from_secs(60)));
        assert!(n.is_expired(Duration::ZERO));
        assert_eq!(Notification::error("x").level, NotificationLevel::Error);
    }
}
