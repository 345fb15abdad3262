//! Immediate-mode UI layout.
//!
//! Every frame the host declares the whole element tree, and [`Ui::end`] returns a flat list of
//! positioned [`RenderCommand`]s in paint order. Nothing is drawn here; the host's renderer
//! consumes the commands.
//!
//! ```
//! use ply_layout::prelude::*;
//!
//! let mut ply = Ply::<()>::new(Dimensions::new(800.0, 600.0));
//! ply.set_measure_text_function(|text, config| {
//!     Dimensions::new(text.len() as f32 * config.font_size as f32 * 0.5, config.font_size as f32)
//! });
//!
//! let mut ui = ply.begin();
//! ui.element()
//!     .id("Sidebar")
//!     .width(fixed!(200.0))
//!     .height(grow!())
//!     .background_color(Color::u_rgb(0x20, 0x20, 0x20))
//!     .layout(|l| l.padding(Padding::all(8)).direction(TopToBottom))
//!     .children(|ui| {
//!         ui.text("Hello", |t| t.font_size(16).color(Color::u_rgb(0xFF, 0xFF, 0xFF)));
//!     });
//! let commands = ui.end();
//! assert_eq!(commands.len(), 2);
//! ```

pub mod align;
pub mod color;
pub mod elements;
pub mod engine;
pub mod errors;
pub mod id;
pub mod layout;
pub mod math;
pub mod prelude;
pub mod render_commands;
pub mod text;

use std::borrow::Cow;
use std::fmt::Debug;

use elements::{
    BorderBuilder, BorderConfig, CornerRadius, ElementDeclaration, FloatingBuilder, ImageConfig,
    ScrollConfig,
};
use engine::{LayoutContext, PointerData, ScrollContainerData, Settings};
use errors::Error;
use id::Id;
use layout::{LayoutBuilder, SizingAxis};
use math::{BoundingBox, Dimensions, Vector2};
use render_commands::RenderCommand;
use text::TextConfig;

pub use color::Color;

/// Owns a layout context and hands out one [`Ui`] scope per frame.
///
/// `CustomElementData` is the payload type carried by custom elements into
/// [`render_commands::Custom`].
pub struct Ply<CustomElementData: Clone + Debug = ()> {
    context: LayoutContext<CustomElementData>,
}

impl<CustomElementData: Clone + Debug> Ply<CustomElementData> {
    pub fn new(dimensions: Dimensions) -> Self {
        Self::with_settings(dimensions, Settings::default())
    }

    /// Creates a context with explicit capacities. They cannot be changed afterwards.
    pub fn with_settings(dimensions: Dimensions, settings: Settings) -> Self {
        Self {
            context: LayoutContext::with_settings(dimensions, settings),
        }
    }

    /// Starts a frame. Declare elements on the returned scope, then call [`Ui::end`].
    ///
    /// A scope dropped without `end` leaves the frame open; the next `begin` reports it and
    /// starts over.
    pub fn begin(&mut self) -> Ui<'_, CustomElementData> {
        self.context.begin_layout();
        Ui {
            context: &mut self.context,
        }
    }

    /// Set the callback for text measurement.
    ///
    /// It must return the same dimensions for the same text and config; results are cached.
    pub fn set_measure_text_function<F>(&mut self, callback: F)
    where
        F: Fn(&str, &TextConfig) -> Dimensions + 'static,
    {
        self.context.set_measure_text_function(Box::new(callback));
    }

    /// Replaces the default error handler, which logs every error at `warn` level.
    pub fn set_error_handler<F>(&mut self, handler: F)
    where
        F: FnMut(Error) + 'static,
    {
        self.context.set_error_handler(Box::new(handler));
    }

    /// Supplies scroll offsets by element id while external scroll handling is enabled.
    pub fn set_external_scroll_offset_function<F>(&mut self, query: F)
    where
        F: Fn(u32) -> Vector2 + 'static,
    {
        self.context.set_query_scroll_offset_function(Box::new(query));
    }

    /// Sets the dimensions of the root element, for example after the window was resized.
    pub fn set_layout_dimensions(&mut self, dimensions: Dimensions) {
        self.context.set_layout_dimensions(dimensions);
    }

    /// Enables or disables culling of offscreen elements.
    pub fn set_culling(&mut self, enable: bool) {
        self.context.set_culling_enabled(enable);
    }

    pub fn set_external_scroll_handling(&mut self, enable: bool) {
        self.context.set_external_scroll_handling_enabled(enable);
    }

    /// Updates the pointer. Hover state and scroll targets are computed against the last
    /// completed frame, so call this before [`begin`](Self::begin).
    pub fn pointer_state(&mut self, position: Vector2, is_down: bool) {
        self.context.set_pointer_state(position, is_down);
    }

    pub fn update_scroll_containers(
        &mut self,
        drag_scrolling_enabled: bool,
        scroll_delta: Vector2,
        delta_time: f32,
    ) {
        self.context
            .update_scroll_containers(drag_scrolling_enabled, scroll_delta, delta_time);
    }

    /// Final bounding box of an element from the last frame.
    pub fn bounding_box(&self, id: impl Into<Id>) -> Option<BoundingBox> {
        let data = self.context.get_element_data(&id.into());
        data.found.then_some(data.bounding_box)
    }

    pub fn scroll_container_data(&self, id: impl Into<Id>) -> Option<ScrollContainerData> {
        let data = self.context.get_scroll_container_data(&id.into());
        data.found.then_some(data)
    }

    pub fn pointer_over(&self, id: impl Into<Id>) -> bool {
        self.context.pointer_over(&id.into())
    }

    /// Ids under the pointer, topmost root first.
    pub fn pointer_over_ids(&self) -> &[Id] {
        self.context.pointer_over_ids()
    }

    /// Render commands of the last completed frame.
    pub fn render_commands(&self) -> &[RenderCommand<CustomElementData>] {
        self.context.render_commands()
    }

    /// The underlying engine, for the raw open/configure/close protocol.
    pub fn context(&self) -> &LayoutContext<CustomElementData> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut LayoutContext<CustomElementData> {
        &mut self.context
    }
}

/// One frame of declarations.
pub struct Ui<'ply, CustomElementData: Clone + Debug = ()> {
    context: &'ply mut LayoutContext<CustomElementData>,
}

impl<'ply, CustomElementData: Clone + Debug> Ui<'ply, CustomElementData> {
    /// Starts declaring a child of the open element.
    pub fn element(&mut self) -> ElementBuilder<'_, 'ply, CustomElementData> {
        ElementBuilder {
            ui: self,
            declaration: ElementDeclaration::default(),
            aspect_ratio: None,
            on_hover: None,
        }
    }

    /// Adds a text leaf to the open element.
    ///
    /// `&'static str` text is borrowed for the whole frame and keyed in the measurement cache by
    /// address; owned text is moved in and keyed by content.
    pub fn text(
        &mut self,
        text: impl Into<Cow<'static, str>>,
        config: impl FnOnce(&mut TextConfig) -> &mut TextConfig,
    ) {
        let mut text_config = TextConfig::new();
        config(&mut text_config);
        self.context.open_text_element(text.into(), text_config);
    }

    /// Returns if the element being declared is under the pointer.
    pub fn hovered(&self) -> bool {
        self.context.hovered()
    }

    /// Scroll offset of the open element if it is a scroll container.
    pub fn scroll_offset(&self) -> Vector2 {
        self.context.get_scroll_offset()
    }

    pub fn pointer_over(&self, id: impl Into<Id>) -> bool {
        self.context.pointer_over(&id.into())
    }

    /// Ends the frame and lays it out.
    pub fn end(self) -> &'ply [RenderCommand<CustomElementData>] {
        self.context.end_layout()
    }
}

impl<'ply, CustomElementData: Clone + Debug> core::ops::Deref for Ui<'ply, CustomElementData> {
    type Target = LayoutContext<CustomElementData>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl<'ply, CustomElementData: Clone + Debug> core::ops::DerefMut for Ui<'ply, CustomElementData> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

/// Chained declaration of one element, finished by [`children`](Self::children) or
/// [`empty`](Self::empty).
#[must_use = "an element is only declared once `children` or `empty` is called"]
pub struct ElementBuilder<'ui, 'ply, CustomElementData: Clone + Debug = ()> {
    ui: &'ui mut Ui<'ply, CustomElementData>,
    declaration: ElementDeclaration<CustomElementData>,
    aspect_ratio: Option<f32>,
    on_hover: Option<Box<dyn FnMut(Id, PointerData)>>,
}

impl<'ui, 'ply, CustomElementData: Clone + Debug> ElementBuilder<'ui, 'ply, CustomElementData> {
    #[inline]
    pub fn id(mut self, id: impl Into<Id>) -> Self {
        self.declaration.id = Some(id.into());
        self
    }

    /// Id that only has to be unique among the descendants of the open element.
    #[inline]
    pub fn id_local(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        let parent_id = self.ui.context.get_open_element_id();
        self.declaration.id = Some(Id::new_local(label, parent_id));
        self
    }

    #[inline]
    pub fn width(mut self, width: impl Into<SizingAxis>) -> Self {
        self.declaration.layout.sizing.width = width.into();
        self
    }

    #[inline]
    pub fn height(mut self, height: impl Into<SizingAxis>) -> Self {
        self.declaration.layout.sizing.height = height.into();
        self
    }

    #[inline]
    pub fn layout(mut self, f: impl FnOnce(&mut LayoutBuilder) -> &mut LayoutBuilder) -> Self {
        let mut builder = LayoutBuilder {
            config: self.declaration.layout,
        };
        f(&mut builder);
        self.declaration.layout = builder.config;
        self
    }

    #[inline]
    pub fn background_color(mut self, color: impl Into<Color>) -> Self {
        self.declaration.background_color = color.into();
        self
    }

    #[inline]
    pub fn corner_radius(mut self, radius: impl Into<CornerRadius>) -> Self {
        self.declaration.corner_radius = radius.into();
        self
    }

    /// Takes the element out of flow and positions it against another element.
    #[inline]
    pub fn floating(mut self, f: impl FnOnce(&mut FloatingBuilder) -> &mut FloatingBuilder) -> Self {
        let mut builder = FloatingBuilder {
            config: self.declaration.floating.unwrap_or_default(),
        };
        f(&mut builder);
        self.declaration.floating = Some(builder.config);
        self
    }

    #[inline]
    pub fn border(mut self, f: impl FnOnce(&mut BorderBuilder) -> &mut BorderBuilder) -> Self {
        let mut builder = BorderBuilder {
            config: self.declaration.border.unwrap_or_else(BorderConfig::default),
        };
        f(&mut builder);
        self.declaration.border = Some(builder.config);
        self
    }

    /// Clips children to the element and lets them scroll on the enabled axes.
    #[inline]
    pub fn scroll(mut self, horizontal: bool, vertical: bool) -> Self {
        self.declaration.scroll = Some(ScrollConfig {
            horizontal,
            vertical,
            ..Default::default()
        });
        self
    }

    /// Draws the image behind the renderer handle `data` instead of a background rectangle.
    #[inline]
    pub fn image(mut self, data: usize) -> Self {
        self.declaration.image = Some(ImageConfig {
            data,
            aspect_ratio: 0.0,
        });
        self
    }

    /// Locks width / height of an image element.
    #[inline]
    pub fn aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    #[inline]
    pub fn custom(mut self, data: CustomElementData) -> Self {
        self.declaration.custom_data = Some(data);
        self
    }

    /// Opaque value copied onto the element's render commands.
    #[inline]
    pub fn user_data(mut self, user_data: usize) -> Self {
        self.declaration.user_data = user_data;
        self
    }

    /// Called from [`Ply::pointer_state`] while the pointer is over this element.
    #[inline]
    pub fn on_hover<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Id, PointerData) + 'static,
    {
        self.on_hover = Some(Box::new(callback));
        self
    }

    /// Declares the element and its children.
    pub fn children(self, f: impl FnOnce(&mut Ui<'ply, CustomElementData>)) {
        let Self {
            ui,
            mut declaration,
            aspect_ratio,
            on_hover,
        } = self;
        if let (Some(image), Some(aspect_ratio)) = (declaration.image.as_mut(), aspect_ratio) {
            image.aspect_ratio = aspect_ratio;
        }

        match declaration.id.take() {
            Some(id) => ui.context.open_element_with_id(&id),
            None => ui.context.open_element(),
        }
        ui.context.configure_open_element(&declaration);
        if let Some(callback) = on_hover {
            ui.context.on_hover(callback);
        }

        f(ui);

        ui.context.close_element();
    }

    /// Declares the element without children.
    pub fn empty(self) {
        self.children(|_| {});
    }
}
