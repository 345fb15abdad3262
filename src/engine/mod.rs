//! The layout engine proper.
//!
//! [`LayoutContext`] owns every buffer. Per-frame buffers are cleared by
//! [`begin_layout`](LayoutContext::begin_layout) and sized once at construction; the id registry,
//! the text measurement cache and scroll container state persist across frames.

mod builder;
mod registry;
mod render;
mod scroll;
mod sizing;
mod text_cache;
mod wrap;

use std::borrow::Cow;
use std::ops::Range;

use crate::elements::{
    BorderConfig, CornerRadius, ElementDeclaration, FloatingConfig, ImageConfig, ScrollConfig,
};
use crate::errors::{Error, ErrorType};
use crate::id::Id;
use crate::layout::{LayoutConfig, SizingAxis, SizingConfig};
use crate::math::{BoundingBox, Dimensions, Vector2};
use crate::render_commands::RenderCommand;
use crate::text::TextConfig;
use crate::color::Color;

use registry::Registry;
use text_cache::{MeasureTextCache, MeasureTextFn};

pub(crate) const EPSILON: f32 = 0.01;
pub(crate) const MAXFLOAT: f32 = f32::MAX;

/// Label of the element every frame starts with.
pub const ROOT_CONTAINER_LABEL: &str = "Ply__RootContainer";

const DEFAULT_MAX_ELEMENT_COUNT: usize = 8192;
const DEFAULT_MAX_MEASURE_TEXT_WORD_CACHE_COUNT: usize = 16384;

#[inline]
pub(crate) fn float_equal(left: f32, right: f32) -> bool {
    let diff = left - right;
    diff < EPSILON && diff > -EPSILON
}

// ============================================================================
// Public engine types
// ============================================================================

/// Capacities and runtime switches of a [`LayoutContext`].
///
/// The capacities are fixed for the life of the context.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Elements per frame, text elements included and the root excluded.
    pub max_element_count: usize,
    /// Size of the measured-word pool shared by all cached texts.
    pub max_measure_text_cache_word_count: usize,
    pub max_render_command_count: usize,
    /// Skip emitting commands for elements entirely outside the layout dimensions.
    pub culling_enabled: bool,
    /// Read scroll offsets from the host instead of the retained scroll state.
    pub external_scroll_handling_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_element_count: DEFAULT_MAX_ELEMENT_COUNT,
            max_measure_text_cache_word_count: DEFAULT_MAX_MEASURE_TEXT_WORD_CACHE_COUNT,
            max_render_command_count: DEFAULT_MAX_ELEMENT_COUNT * 2,
            culling_enabled: true,
            external_scroll_handling_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PointerDataInteractionState {
    PressedThisFrame,
    Pressed,
    ReleasedThisFrame,
    #[default]
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerData {
    pub position: Vector2,
    pub state: PointerDataInteractionState,
}

/// Retained state of one scroll container, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollContainerData {
    pub scroll_position: Vector2,
    pub scroll_container_dimensions: Dimensions,
    pub content_dimensions: Dimensions,
    pub config: ScrollConfig,
    pub found: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementData {
    pub bounding_box: BoundingBox,
    pub found: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    #[default]
    Idle,
    /// Between `begin_layout` and `end_layout`.
    Declaring,
}

// ============================================================================
// Frame store types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct SharedConfig {
    pub background_color: Color,
    pub corner_radius: CornerRadius,
    pub user_data: usize,
}

#[derive(Debug, Clone)]
pub(crate) enum ElementConfig<CustomElementData> {
    Shared(SharedConfig),
    Text(TextConfig),
    Image(ImageConfig),
    Floating(FloatingConfig),
    Scroll(ScrollConfig),
    Border(BorderConfig),
    Custom(CustomElementData),
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConfigSlice {
    pub start: usize,
    pub length: usize,
}

impl ConfigSlice {
    #[inline]
    fn range(self) -> Range<usize> {
        self.start..self.start + self.length
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum ElementContent {
    /// `start` indexes `layout_element_children` once the element has closed.
    Children { start: usize, length: usize },
    Text { data_index: usize },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutElement {
    pub id: u32,
    pub dimensions: Dimensions,
    pub min_dimensions: Dimensions,
    pub layout_config_index: usize,
    pub configs: ConfigSlice,
    pub content: ElementContent,
    pub floating_children_count: usize,
}

impl LayoutElement {
    fn new(id: u32) -> Self {
        Self {
            id,
            dimensions: Dimensions::default(),
            min_dimensions: Dimensions::default(),
            layout_config_index: 0,
            configs: ConfigSlice::default(),
            content: ElementContent::Children {
                start: 0,
                length: 0,
            },
            floating_children_count: 0,
        }
    }

    #[inline]
    pub fn children_length(&self) -> usize {
        match self.content {
            ElementContent::Children { length, .. } => length,
            ElementContent::Text { .. } => 0,
        }
    }

    #[inline]
    pub fn text_data_index(&self) -> Option<usize> {
        match self.content {
            ElementContent::Text { data_index } => Some(data_index),
            ElementContent::Children { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WrappedTextLine {
    pub dimensions: Dimensions,
    pub start: usize,
    pub length: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct TextElementData {
    pub text: Cow<'static, str>,
    pub preferred_dimensions: Dimensions,
    pub element_index: usize,
    /// `None` when no measurement was possible.
    pub cache_item: Option<usize>,
    pub wrapped_lines: Range<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LayoutElementTreeRoot {
    pub layout_element_index: usize,
    /// Element the root is positioned against. Zero for the main root.
    pub parent_id: u32,
    pub clip_element_id: u32,
    pub z_index: i16,
}

/// One-shot flags so capacity and setup problems are reported once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BooleanWarnings {
    pub max_elements_exceeded: bool,
    pub text_measurement_fn_not_set: bool,
    pub max_text_measure_cache_exceeded: bool,
    pub max_render_commands_exceeded: bool,
    pub max_wrapped_lines_exceeded: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ScrollContainerDataInternal {
    pub element_id: u32,
    pub layout_element_index: usize,
    pub bounding_box: BoundingBox,
    pub content_size: Dimensions,
    pub scroll_origin: Vector2,
    pub pointer_origin: Vector2,
    pub scroll_momentum: Vector2,
    pub scroll_position: Vector2,
    pub momentum_time: f32,
    pub open_this_frame: bool,
    pub pointer_scroll_active: bool,
    pub config: ScrollConfig,
}

// ============================================================================
// LayoutContext
// ============================================================================

pub struct LayoutContext<CustomElementData: Clone + std::fmt::Debug = ()> {
    settings: Settings,
    pub(crate) generation: u32,
    pub(crate) state: FrameState,
    pub(crate) boolean_warnings: BooleanWarnings,
    /// Opens refused for capacity that still await their close.
    pub(crate) dropped_open_depth: usize,

    pub(crate) pointer_info: PointerData,
    pub(crate) layout_dimensions: Dimensions,

    measure_text_fn: Option<Box<MeasureTextFn>>,
    query_scroll_offset_fn: Option<Box<dyn Fn(u32) -> Vector2>>,
    error_handler: Box<dyn FnMut(Error)>,

    // Frame store
    pub(crate) layout_elements: Vec<LayoutElement>,
    pub(crate) layout_configs: Vec<LayoutConfig>,
    pub(crate) element_configs: Vec<ElementConfig<CustomElementData>>,
    pub(crate) open_layout_element_stack: Vec<usize>,
    pub(crate) layout_element_children: Vec<usize>,
    pub(crate) layout_element_children_buffer: Vec<usize>,
    pub(crate) layout_element_clip_element_ids: Vec<u32>,
    pub(crate) open_clip_element_stack: Vec<u32>,
    pub(crate) text_element_data: Vec<TextElementData>,
    pub(crate) aspect_ratio_element_indexes: Vec<usize>,
    pub(crate) wrapped_text_lines: Vec<WrappedTextLine>,
    pub(crate) layout_element_tree_roots: Vec<LayoutElementTreeRoot>,
    pub(crate) render_commands: Vec<RenderCommand<CustomElementData>>,

    // Traversal scratch, taken by a pass and handed back when it finishes
    pub(crate) tree_node_buffer: Vec<usize>,
    pub(crate) tree_order_buffer: Vec<usize>,
    pub(crate) resizable_container_buffer: Vec<usize>,
    pub(crate) visit_stack: Vec<render::Visit>,
    pub(crate) child_visit_buffer: Vec<render::Visit>,

    // Persistent
    pub(crate) registry: Registry,
    pub(crate) text_cache: MeasureTextCache,
    pub(crate) scroll_container_datas: Vec<ScrollContainerDataInternal>,
    pub(crate) pointer_over_ids: Vec<Id>,
}

impl<CustomElementData: Clone + std::fmt::Debug> LayoutContext<CustomElementData> {
    pub fn new(dimensions: Dimensions) -> Self {
        Self::with_settings(dimensions, Settings::default())
    }

    pub fn with_settings(dimensions: Dimensions, settings: Settings) -> Self {
        let max_elements = settings.max_element_count;
        Self {
            settings,
            generation: 0,
            state: FrameState::Idle,
            boolean_warnings: BooleanWarnings::default(),
            dropped_open_depth: 0,
            pointer_info: PointerData::default(),
            layout_dimensions: dimensions,
            measure_text_fn: None,
            query_scroll_offset_fn: None,
            error_handler: Box::new(|error: Error| log::warn!("{error}")),
            layout_elements: Vec::with_capacity(max_elements + 1),
            layout_configs: Vec::with_capacity(max_elements + 1),
            element_configs: Vec::with_capacity(max_elements + 1),
            open_layout_element_stack: Vec::new(),
            layout_element_children: Vec::with_capacity(max_elements),
            layout_element_children_buffer: Vec::new(),
            layout_element_clip_element_ids: Vec::with_capacity(max_elements + 1),
            open_clip_element_stack: Vec::new(),
            text_element_data: Vec::new(),
            aspect_ratio_element_indexes: Vec::new(),
            wrapped_text_lines: Vec::with_capacity(max_elements),
            layout_element_tree_roots: Vec::new(),
            render_commands: Vec::with_capacity(settings.max_render_command_count),
            tree_node_buffer: Vec::with_capacity(max_elements + 1),
            tree_order_buffer: Vec::with_capacity(max_elements + 1),
            resizable_container_buffer: Vec::with_capacity(max_elements),
            visit_stack: Vec::with_capacity(max_elements + 1),
            child_visit_buffer: Vec::with_capacity(max_elements),
            registry: Registry::new(max_elements * 2),
            text_cache: MeasureTextCache::new(
                max_elements,
                settings.max_measure_text_cache_word_count,
            ),
            scroll_container_datas: Vec::new(),
            pointer_over_ids: Vec::new(),
        }
    }

    // ========================================================================
    // Settings and host callbacks
    // ========================================================================

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn set_layout_dimensions(&mut self, dimensions: Dimensions) {
        self.layout_dimensions = dimensions;
    }

    #[inline]
    pub fn layout_dimensions(&self) -> Dimensions {
        self.layout_dimensions
    }

    pub fn set_culling_enabled(&mut self, enabled: bool) {
        self.settings.culling_enabled = enabled;
    }

    pub fn set_external_scroll_handling_enabled(&mut self, enabled: bool) {
        self.settings.external_scroll_handling_enabled = enabled;
    }

    /// Sets the text measurement callback.
    ///
    /// Results are cached per text and config, so the callback must return the same dimensions
    /// for the same input.
    pub fn set_measure_text_function(&mut self, f: Box<MeasureTextFn>) {
        self.measure_text_fn = Some(f);
    }

    /// Sets the callback that supplies scroll offsets by element id when external scroll
    /// handling is enabled.
    pub fn set_query_scroll_offset_function(&mut self, f: Box<dyn Fn(u32) -> Vector2>) {
        self.query_scroll_offset_fn = Some(f);
    }

    /// Replaces the default handler, which logs each error at `warn` level.
    pub fn set_error_handler(&mut self, handler: Box<dyn FnMut(Error)>) {
        self.error_handler = handler;
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    pub(crate) fn report(&mut self, type_: ErrorType, text: impl Into<Cow<'static, str>>) {
        (self.error_handler)(Error::new(type_, text));
    }

    /// Reports and returns `false` when called outside a frame.
    pub(crate) fn declaring(&mut self, operation: &'static str) -> bool {
        if self.state == FrameState::Declaring {
            return true;
        }
        self.report(
            ErrorType::UnbalancedOpenClose,
            format!("{operation} called outside of begin_layout/end_layout"),
        );
        false
    }

    #[inline]
    pub(crate) fn open_element_index(&self) -> Option<usize> {
        self.open_layout_element_stack.last().copied()
    }

    #[inline]
    pub(crate) fn configs(&self, element_index: usize) -> &[ElementConfig<CustomElementData>] {
        &self.element_configs[self.layout_elements[element_index].configs.range()]
    }

    /// Positions of a closed element's children in `layout_element_children`.
    #[inline]
    pub(crate) fn children_range(&self, element_index: usize) -> Range<usize> {
        match self.layout_elements[element_index].content {
            ElementContent::Children { start, length } => start..start + length,
            ElementContent::Text { .. } => 0..0,
        }
    }

    #[inline]
    pub(crate) fn children(&self, element_index: usize) -> &[usize] {
        &self.layout_element_children[self.children_range(element_index)]
    }

    #[inline]
    pub(crate) fn layout_config(&self, element_index: usize) -> &LayoutConfig {
        &self.layout_configs[self.layout_elements[element_index].layout_config_index]
    }

    pub(crate) fn shared_config(&self, element_index: usize) -> Option<&SharedConfig> {
        self.configs(element_index).iter().find_map(|config| match config {
            ElementConfig::Shared(shared) => Some(shared),
            _ => None,
        })
    }

    pub(crate) fn text_config(&self, element_index: usize) -> Option<&TextConfig> {
        self.configs(element_index).iter().find_map(|config| match config {
            ElementConfig::Text(text) => Some(text),
            _ => None,
        })
    }

    pub(crate) fn image_config(&self, element_index: usize) -> Option<&ImageConfig> {
        self.configs(element_index).iter().find_map(|config| match config {
            ElementConfig::Image(image) => Some(image),
            _ => None,
        })
    }

    pub(crate) fn floating_config(&self, element_index: usize) -> Option<&FloatingConfig> {
        self.configs(element_index).iter().find_map(|config| match config {
            ElementConfig::Floating(floating) => Some(floating),
            _ => None,
        })
    }

    pub(crate) fn scroll_config(&self, element_index: usize) -> Option<&ScrollConfig> {
        self.configs(element_index).iter().find_map(|config| match config {
            ElementConfig::Scroll(scroll) => Some(scroll),
            _ => None,
        })
    }

    pub(crate) fn border_config(&self, element_index: usize) -> Option<&BorderConfig> {
        self.configs(element_index).iter().find_map(|config| match config {
            ElementConfig::Border(border) => Some(border),
            _ => None,
        })
    }

    /// Aspect ratio of an image element, if it locks one.
    pub(crate) fn aspect_ratio(&self, element_index: usize) -> Option<f32> {
        self.image_config(element_index)
            .map(|image| image.aspect_ratio)
            .filter(|ratio| *ratio > 0.0)
    }

    /// Derives the missing dimension of an aspect-locked element when only one is known.
    pub(crate) fn update_aspect_ratio_box(&mut self, element_index: usize) {
        let Some(aspect_ratio) = self.aspect_ratio(element_index) else {
            return;
        };
        let dimensions = &mut self.layout_elements[element_index].dimensions;
        if dimensions.width == 0.0 && dimensions.height != 0.0 {
            dimensions.width = dimensions.height * aspect_ratio;
        } else if dimensions.width != 0.0 && dimensions.height == 0.0 {
            dimensions.height = dimensions.width * (1.0 / aspect_ratio);
        }
    }

    fn initialize_ephemeral_memory(&mut self) {
        self.layout_elements.clear();
        self.layout_configs.clear();
        self.element_configs.clear();
        self.open_layout_element_stack.clear();
        self.layout_element_children.clear();
        self.layout_element_children_buffer.clear();
        self.layout_element_clip_element_ids.clear();
        self.open_clip_element_stack.clear();
        self.text_element_data.clear();
        self.aspect_ratio_element_indexes.clear();
        self.wrapped_text_lines.clear();
        self.layout_element_tree_roots.clear();
        self.render_commands.clear();
    }

    // ========================================================================
    // Frame protocol
    // ========================================================================

    /// Starts a frame: clears the frame store, bumps the generation and opens the root element
    /// sized to the layout dimensions.
    pub fn begin_layout(&mut self) {
        if self.state == FrameState::Declaring {
            self.report(
                ErrorType::UnbalancedOpenClose,
                "begin_layout called before the previous frame ended",
            );
        }
        self.initialize_ephemeral_memory();
        self.generation = self.generation.wrapping_add(1);
        self.boolean_warnings = BooleanWarnings::default();
        self.dropped_open_depth = 0;
        self.state = FrameState::Declaring;

        let root_id = Id::new(ROOT_CONTAINER_LABEL);
        self.open_element_with_id(&root_id);
        let dimensions = self.layout_dimensions;
        self.configure_open_element(&ElementDeclaration {
            layout: LayoutConfig {
                sizing: SizingConfig {
                    width: SizingAxis::fixed(dimensions.width),
                    height: SizingAxis::fixed(dimensions.height),
                },
                ..Default::default()
            },
            ..Default::default()
        });
        self.layout_element_tree_roots.push(LayoutElementTreeRoot {
            layout_element_index: 0,
            ..Default::default()
        });
        log::debug!(
            "begin_layout generation {} at {}x{}",
            self.generation,
            dimensions.width,
            dimensions.height
        );
    }

    /// Closes the root, runs sizing, wrapping and positioning, and returns the frame's render
    /// commands in paint order.
    pub fn end_layout(&mut self) -> &[RenderCommand<CustomElementData>] {
        if self.state != FrameState::Declaring {
            self.report(
                ErrorType::UnbalancedOpenClose,
                "end_layout called without a matching begin_layout",
            );
            return &self.render_commands;
        }

        let unclosed = self.open_layout_element_stack.len().saturating_sub(1);
        if unclosed > 0 || self.dropped_open_depth > 0 {
            self.report(
                ErrorType::UnbalancedOpenClose,
                format!(
                    "end_layout called with {} element(s) still open",
                    unclosed + self.dropped_open_depth
                ),
            );
            self.dropped_open_depth = 0;
            for _ in 0..unclosed {
                self.close_open_element();
            }
        }
        self.close_open_element();

        self.check_floating_anchors();
        self.calculate_final_layout();
        self.state = FrameState::Idle;
        log::debug!(
            "end_layout generation {}: {} elements, {} render commands",
            self.generation,
            self.layout_elements.len(),
            self.render_commands.len()
        );
        &self.render_commands
    }

    /// Render commands of the last completed frame.
    #[inline]
    pub fn render_commands(&self) -> &[RenderCommand<CustomElementData>] {
        &self.render_commands
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Final bounding box of the element declared with `id` in the current or last frame.
    pub fn get_element_data(&self, id: &Id) -> ElementData {
        match self.registry.get_live(id.id, self.generation) {
            Some(item) => ElementData {
                bounding_box: item.bounding_box,
                found: true,
            },
            None => ElementData::default(),
        }
    }

    pub fn get_scroll_container_data(&self, id: &Id) -> ScrollContainerData {
        let Some(data) = self
            .scroll_container_datas
            .iter()
            .find(|data| data.element_id == id.id)
        else {
            return ScrollContainerData::default();
        };
        ScrollContainerData {
            scroll_position: data.scroll_position,
            scroll_container_dimensions: data.bounding_box.dimensions(),
            content_dimensions: data.content_size,
            config: data.config,
            found: true,
        }
    }

    /// Id of the innermost open element, or zero outside a frame.
    pub fn get_open_element_id(&self) -> u32 {
        self.open_element_index()
            .map_or(0, |index| self.layout_elements[index].id)
    }
}
