use egui::{Color32, FontId, Painter, Pos2, Rect, Vec2};

#[derive(Debug, Clone)]
pub struct PopupStyle {
    pub background_color: Color32,
    pub border_color: Color32,
    pub border_width: f32,
    pub rounding: f32,
    pub padding: f32,
    pub title_font: FontId,
    pub body_font: FontId,
    pub text_color: Color32,
    pub max_width: f32,
    /// Gap between the anchor and the popup's bottom edge
    pub offset: f32,
    pub close_size: f32,
}

impl Default for PopupStyle {
    fn default() -> Self {
        Self {
            background_color: Color32::WHITE,
            border_color: Color32::GRAY,
            border_width: 1.0,
            rounding: 4.0,
            padding: 8.0,
            title_font: FontId::proportional(16.0),
            body_font: FontId::proportional(12.0),
            text_color: Color32::BLACK,
            max_width: 300.0,
            offset: 20.0,
            close_size: 14.0,
        }
    }
}

/// Where a popup lands on screen this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupLayout {
    pub rect: Rect,
    pub close_rect: Rect,
}

/// Info window anchored above a map position
#[derive(Debug, Clone)]
pub struct InfoPopup {
    pub title: String,
    pub body: String,
    pub style: PopupStyle,
}

impl InfoPopup {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            style: PopupStyle::default(),
        }
    }

    /// Centers the popup horizontally over `anchor`, above it
    pub fn layout(&self, painter: &Painter, anchor: Pos2) -> PopupLayout {
        let style = &self.style;
        let title_size = painter
            .layout_no_wrap(self.title.clone(), style.title_font.clone(), style.text_color)
            .size();
        let body_size = painter
            .layout_no_wrap(self.body.clone(), style.body_font.clone(), style.text_color)
            .size();

        let content = Vec2::new(
            title_size.x.max(body_size.x) + style.close_size + style.padding,
            title_size.y + body_size.y + style.padding,
        );
        let size = Vec2::new(
            (content.x + style.padding * 2.0).min(style.max_width),
            content.y + style.padding * 2.0,
        );

        let rect = Rect::from_min_size(
            Pos2::new(anchor.x - size.x / 2.0, anchor.y - style.offset - size.y),
            size,
        );
        let close_rect = Rect::from_min_size(
            Pos2::new(rect.max.x - style.padding - style.close_size, rect.min.y + style.padding),
            Vec2::splat(style.close_size),
        );
        PopupLayout { rect, close_rect }
    }

    pub fn paint(&self, painter: &Painter, layout: &PopupLayout) {
        let style = &self.style;
        painter.rect_filled(layout.rect, style.rounding, style.background_color);
        painter.rect_stroke(
            layout.rect,
            style.rounding,
            (style.border_width, style.border_color),
        );

        let text_origin = layout.rect.min + Vec2::splat(style.padding);
        let title = painter.text(
            text_origin,
            egui::Align2::LEFT_TOP,
            &self.title,
            style.title_font.clone(),
            style.text_color,
        );
        painter.text(
            Pos2::new(text_origin.x, title.max.y + style.padding / 2.0),
            egui::Align2::LEFT_TOP,
            &self.body,
            style.body_font.clone(),
            style.text_color,
        );

        painter.text(
            layout.close_rect.center(),
            egui::Align2::CENTER_CENTER,
            "×",
            style.body_font.clone(),
            style.border_color,
        );
    }
}
