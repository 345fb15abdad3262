use std::borrow::Cow;

use super::registry::{HoverCallback, Registration};
use super::text_cache::text_cache_key;
use super::{
    ConfigSlice, ElementConfig, ElementContent, LayoutContext, LayoutElement,
    LayoutElementTreeRoot, ScrollContainerDataInternal, SharedConfig, TextElementData, MAXFLOAT,
    ROOT_CONTAINER_LABEL,
};
use crate::elements::{ElementDeclaration, FloatingAttachToElement, FloatingClipToElement};
use crate::errors::ErrorType;
use crate::id::{hash_number, Id};
use crate::layout::{LayoutConfig, SizingType};
use crate::math::{Dimensions, Vector2};
use crate::text::TextConfig;

impl<CustomElementData: Clone + std::fmt::Debug> LayoutContext<CustomElementData> {
    // ========================================================================
    // Ids
    // ========================================================================

    fn register_id(&mut self, element_id: &Id, layout_element_index: usize, id_alias: u32) {
        match self
            .registry
            .register(element_id, layout_element_index, id_alias, self.generation)
        {
            Registration::Added => {}
            Registration::Duplicate => {
                let label = if element_id.label.is_empty() {
                    Cow::Owned(format!("{}", element_id.id))
                } else {
                    element_id.label.clone()
                };
                self.report(
                    ErrorType::DuplicateId,
                    format!("An element with id \"{label}\" was already declared this frame"),
                );
            }
            Registration::Full => self.exceed_element_capacity(),
        }
    }

    /// Anonymous id of the next child of the open element.
    fn next_child_id(&self) -> Id {
        match self.open_element_index() {
            Some(parent_index) => {
                let parent = &self.layout_elements[parent_index];
                let offset = parent.children_length() as u32 + parent.floating_children_count as u32;
                hash_number(offset, parent.id)
            }
            None => Id::default(),
        }
    }

    fn exceed_element_capacity(&mut self) {
        if !self.boolean_warnings.max_elements_exceeded {
            self.boolean_warnings.max_elements_exceeded = true;
            let max = self.settings().max_element_count;
            self.report(
                ErrorType::ElementsCapacityExceeded,
                format!(
                    "More than {max} elements were declared. Raise Settings::max_element_count."
                ),
            );
        }
    }

    /// Whether one more element fits in this frame. The root is not counted.
    fn reserve_element(&mut self) -> bool {
        if self.layout_elements.len() > self.settings().max_element_count {
            self.exceed_element_capacity();
            return false;
        }
        true
    }

    // ========================================================================
    // Element open / configure / close
    // ========================================================================

    /// Pushes a new open element with a default layout of its own, which
    /// `configure_open_element` overwrites.
    fn push_open_element(&mut self, id: u32) -> usize {
        self.layout_configs.push(LayoutConfig::default());
        let mut element = LayoutElement::new(id);
        element.layout_config_index = self.layout_configs.len() - 1;
        self.layout_elements.push(element);
        let index = self.layout_elements.len() - 1;
        self.open_layout_element_stack.push(index);
        let clip_id = self.open_clip_element_stack.last().copied().unwrap_or(0);
        self.layout_element_clip_element_ids.push(clip_id);
        index
    }

    /// Opens an element with an id derived from its position below the open element.
    pub fn open_element(&mut self) {
        if !self.declaring("open_element") {
            return;
        }
        if self.dropped_open_depth > 0 || !self.reserve_element() {
            self.dropped_open_depth += 1;
            return;
        }
        let element_id = self.next_child_id();
        let index = self.push_open_element(element_id.id);
        self.register_id(&element_id, index, 0);
    }

    pub fn open_element_with_id(&mut self, element_id: &Id) {
        if !self.declaring("open_element_with_id") {
            return;
        }
        if self.dropped_open_depth > 0 || !self.reserve_element() {
            self.dropped_open_depth += 1;
            return;
        }
        let index = self.push_open_element(element_id.id);
        self.register_id(element_id, index, 0);
    }

    /// Attaches layout and visual configuration to the open element.
    pub fn configure_open_element(&mut self, declaration: &ElementDeclaration<CustomElementData>) {
        if !self.declaring("configure_open_element") || self.dropped_open_depth > 0 {
            return;
        }
        let Some(open_index) = self.open_element_index() else {
            return;
        };

        if let Some(id) = &declaration.id {
            let anonymous_id = self.layout_elements[open_index].id;
            if id.id != anonymous_id {
                self.layout_elements[open_index].id = id.id;
                self.register_id(id, open_index, anonymous_id);
            }
        }

        let mut layout = declaration.layout;
        for (axis, sizing) in [("width", &mut layout.sizing.width), ("height", &mut layout.sizing.height)] {
            if sizing.type_ == SizingType::Percent && sizing.percent > 1.0 {
                let percent = sizing.percent;
                sizing.percent = 1.0;
                self.report(
                    ErrorType::PercentageOver1,
                    format!("Percent {axis} of {percent} is over 1.0, using 1.0"),
                );
            }
        }
        let layout_config_index = self.layout_elements[open_index].layout_config_index;
        self.layout_configs[layout_config_index] = layout;

        let configs_start = self.element_configs.len();

        if declaration.background_color.is_visible()
            || !declaration.corner_radius.is_zero()
            || declaration.user_data != 0
        {
            self.element_configs.push(ElementConfig::Shared(SharedConfig {
                background_color: declaration.background_color,
                corner_radius: declaration.corner_radius,
                user_data: declaration.user_data,
            }));
        }

        if let Some(image) = declaration.image {
            self.element_configs.push(ElementConfig::Image(image));
            if image.aspect_ratio > 0.0 {
                self.aspect_ratio_element_indexes.push(open_index);
            }
        }

        if let Some(floating) = declaration.floating {
            self.configure_floating(open_index, floating);
        }

        if let Some(custom_data) = &declaration.custom_data {
            self.element_configs
                .push(ElementConfig::Custom(custom_data.clone()));
        }

        if let Some(mut scroll) = declaration.scroll {
            if scroll.horizontal || scroll.vertical {
                let element_id = self.layout_elements[open_index].id;
                scroll.child_offset = self.scroll_offset_for(element_id);
                self.element_configs.push(ElementConfig::Scroll(scroll));
                self.open_clip_element_stack.push(element_id);

                match self
                    .scroll_container_datas
                    .iter_mut()
                    .find(|data| data.element_id == element_id)
                {
                    Some(data) => {
                        data.layout_element_index = open_index;
                        data.open_this_frame = true;
                        data.config = scroll;
                    }
                    None => self.scroll_container_datas.push(ScrollContainerDataInternal {
                        element_id,
                        layout_element_index: open_index,
                        scroll_origin: Vector2::new(-1.0, -1.0),
                        open_this_frame: true,
                        config: scroll,
                        ..Default::default()
                    }),
                }
            }
        }

        if let Some(border) = declaration.border {
            if !border.width.is_zero() {
                self.element_configs.push(ElementConfig::Border(border));
            }
        }

        self.layout_elements[open_index].configs = ConfigSlice {
            start: configs_start,
            length: self.element_configs.len() - configs_start,
        };
    }

    /// Retained or host-supplied offset of the scroll container `element_id`.
    fn scroll_offset_for(&self, element_id: u32) -> Vector2 {
        if self.settings().external_scroll_handling_enabled {
            return self
                .query_scroll_offset_fn
                .as_ref()
                .map_or(Vector2::default(), |query| query(element_id));
        }
        self.scroll_container_datas
            .iter()
            .find(|data| data.element_id == element_id)
            .map_or(Vector2::default(), |data| data.scroll_position)
    }

    fn configure_floating(&mut self, open_index: usize, mut floating: crate::elements::FloatingConfig) {
        let stack_len = self.open_layout_element_stack.len();
        if stack_len < 2 {
            return;
        }
        let hierarchical_parent_index = self.open_layout_element_stack[stack_len - 2];
        let mut clip_element_id = 0;

        match floating.attach_to {
            FloatingAttachToElement::Parent => {
                floating.parent_id = self.layout_elements[hierarchical_parent_index].id;
                clip_element_id = self.open_clip_element_stack.last().copied().unwrap_or(0);
            }
            // Anchors declared later in the frame are checked by `check_floating_anchors`.
            FloatingAttachToElement::ElementWithId => {
                if let Some(parent_item) = self.registry.get_live(floating.parent_id, self.generation)
                {
                    clip_element_id = self
                        .layout_element_clip_element_ids
                        .get(parent_item.layout_element_index)
                        .copied()
                        .unwrap_or(0);
                }
            }
            FloatingAttachToElement::Root => {
                floating.parent_id = Id::new(ROOT_CONTAINER_LABEL).id;
            }
        }

        if floating.clip_to == FloatingClipToElement::None {
            clip_element_id = 0;
        }

        self.layout_element_clip_element_ids[open_index] = clip_element_id;
        self.open_clip_element_stack.push(clip_element_id);
        self.layout_element_tree_roots.push(LayoutElementTreeRoot {
            layout_element_index: open_index,
            parent_id: floating.parent_id,
            clip_element_id,
            z_index: floating.z_index,
        });
        self.element_configs.push(ElementConfig::Floating(floating));
    }

    /// Reports every floating root whose anchor id was not declared in this frame.
    pub(crate) fn check_floating_anchors(&mut self) {
        for root_index in 1..self.layout_element_tree_roots.len() {
            let root = self.layout_element_tree_roots[root_index];
            let attached_by_id = self
                .floating_config(root.layout_element_index)
                .is_some_and(|floating| floating.attach_to == FloatingAttachToElement::ElementWithId);
            if !attached_by_id || self.registry.get_live(root.parent_id, self.generation).is_some() {
                continue;
            }
            let parent_id = root.parent_id;
            self.report(
                ErrorType::FloatingContainerParentNotFound,
                format!(
                    "Floating element attached to id {parent_id}, which was not declared this frame"
                ),
            );
        }
    }

    /// Closes the open element and rolls its children's sizes up into it.
    pub fn close_element(&mut self) {
        if !self.declaring("close_element") {
            return;
        }
        if self.dropped_open_depth > 0 {
            self.dropped_open_depth -= 1;
            return;
        }
        if self.open_layout_element_stack.len() <= 1 {
            self.report(
                ErrorType::UnbalancedOpenClose,
                "close_element called with no open element",
            );
            return;
        }
        self.close_open_element();
    }

    pub(crate) fn close_open_element(&mut self) {
        let Some(open_index) = self.open_element_index() else {
            return;
        };
        let layout_config_index = self.layout_elements[open_index].layout_config_index;
        let layout_config = self.layout_configs[layout_config_index];

        let mut scroll_horizontal = false;
        let mut scroll_vertical = false;
        let mut clip_pushes = 0;
        let mut is_floating = false;
        for config in self.configs(open_index) {
            match config {
                ElementConfig::Scroll(scroll) => {
                    scroll_horizontal = scroll.horizontal;
                    scroll_vertical = scroll.vertical;
                    clip_pushes += 1;
                }
                ElementConfig::Floating(_) => {
                    is_floating = true;
                    clip_pushes += 1;
                }
                _ => {}
            }
        }
        for _ in 0..clip_pushes {
            self.open_clip_element_stack.pop();
        }

        let children_length = self.layout_elements[open_index].children_length();
        let children_start = self.layout_element_children.len();
        let buffer_start = self.layout_element_children_buffer.len() - children_length;

        let along_x = layout_config.layout_direction.is_along(true);
        let padding_along = layout_config.padding.along(along_x);
        let padding_across = layout_config.padding.along(!along_x);
        let (clip_along, clip_across) = if along_x {
            (scroll_horizontal, scroll_vertical)
        } else {
            (scroll_vertical, scroll_horizontal)
        };

        let mut dimensions = Dimensions::default();
        let mut min_dimensions = Dimensions::default();
        *dimensions.along_mut(along_x) = padding_along;
        *min_dimensions.along_mut(along_x) = padding_along;

        for i in 0..children_length {
            let child_index = self.layout_element_children_buffer[buffer_start + i];
            let child = &self.layout_elements[child_index];

            *dimensions.along_mut(along_x) += child.dimensions.along(along_x);
            let across = dimensions.along_mut(!along_x);
            *across = across.max(child.dimensions.along(!along_x) + padding_across);

            if !clip_along {
                *min_dimensions.along_mut(along_x) += child.min_dimensions.along(along_x);
            }
            if !clip_across {
                let across = min_dimensions.along_mut(!along_x);
                *across = across.max(child.min_dimensions.along(!along_x) + padding_across);
            }
            self.layout_element_children.push(child_index);
        }
        let child_gap = children_length.saturating_sub(1) as f32 * layout_config.child_gap as f32;
        *dimensions.along_mut(along_x) += child_gap;
        if !clip_along {
            *min_dimensions.along_mut(along_x) += child_gap;
        }
        self.layout_element_children_buffer.truncate(buffer_start);

        for x_axis in [true, false] {
            let sizing = self.layout_configs[layout_config_index]
                .sizing
                .along_mut(x_axis);
            if sizing.type_ == SizingType::Percent {
                *dimensions.along_mut(x_axis) = 0.0;
                continue;
            }
            if sizing.min_max.max <= 0.0 {
                sizing.min_max.max = MAXFLOAT;
            }
            let (min, max) = (sizing.min_max.min, sizing.min_max.max);
            let size = dimensions.along_mut(x_axis);
            *size = size.max(min).min(max);
            let min_size = min_dimensions.along_mut(x_axis);
            *min_size = min_size.max(min).min(max);
        }

        let element = &mut self.layout_elements[open_index];
        element.dimensions = dimensions;
        element.min_dimensions = min_dimensions;
        if let ElementContent::Children { start, .. } = &mut element.content {
            *start = children_start;
        }
        self.update_aspect_ratio_box(open_index);

        self.open_layout_element_stack.pop();
        if let Some(parent_index) = self.open_element_index() {
            let parent = &mut self.layout_elements[parent_index];
            if is_floating {
                parent.floating_children_count += 1;
                return;
            }
            if let ElementContent::Children { length, .. } = &mut parent.content {
                *length += 1;
            }
            self.layout_element_children_buffer.push(open_index);
        }
    }

    // ========================================================================
    // Text elements
    // ========================================================================

    /// Declares a text leaf below the open element.
    ///
    /// Text is opened, measured and closed in one step; it never has children.
    pub fn open_text_element(&mut self, text: Cow<'static, str>, text_config: TextConfig) {
        if !self.declaring("open_text_element") || self.dropped_open_depth > 0 {
            return;
        }
        let Some(parent_index) = self.open_element_index() else {
            return;
        };
        if !self.reserve_element() {
            return;
        }

        let element_id = self.next_child_id();
        self.layout_elements.push(LayoutElement::new(element_id.id));
        let element_index = self.layout_elements.len() - 1;
        let clip_id = self.open_clip_element_stack.last().copied().unwrap_or(0);
        self.layout_element_clip_element_ids.push(clip_id);
        self.layout_element_children_buffer.push(element_index);
        self.register_id(&element_id, element_index, 0);

        let (preferred_dimensions, min_width, cache_item) =
            match self.measure_text_cached(&text, &text_config) {
                Some(index) => {
                    let item = self.text_cache.item(index);
                    (item.unwrapped_dimensions, item.min_width, Some(index))
                }
                None => (Dimensions::default(), 0.0, None),
            };
        let height = text_config.line_height_or(preferred_dimensions.height);

        self.text_element_data.push(TextElementData {
            text,
            preferred_dimensions,
            element_index,
            cache_item,
            wrapped_lines: 0..0,
        });
        let data_index = self.text_element_data.len() - 1;

        self.layout_configs.push(LayoutConfig::default());
        self.element_configs.push(ElementConfig::Text(text_config));
        let element = &mut self.layout_elements[element_index];
        element.dimensions = Dimensions::new(preferred_dimensions.width, height);
        element.min_dimensions = Dimensions::new(min_width, height);
        element.content = ElementContent::Text { data_index };
        element.layout_config_index = self.layout_configs.len() - 1;
        element.configs = ConfigSlice {
            start: self.element_configs.len() - 1,
            length: 1,
        };

        if let ElementContent::Children { length, .. } =
            &mut self.layout_elements[parent_index].content
        {
            *length += 1;
        }
    }

    /// Cache entry index for `text`, or `None` when it could not be measured.
    fn measure_text_cached(&mut self, text: &Cow<'static, str>, config: &TextConfig) -> Option<usize> {
        let Some(measure) = self.measure_text_fn.as_deref() else {
            if !self.boolean_warnings.text_measurement_fn_not_set {
                self.boolean_warnings.text_measurement_fn_not_set = true;
                self.report(
                    ErrorType::TextMeasurementFunctionNotProvided,
                    "A text element was declared but no text measurement function was set",
                );
            }
            return None;
        };
        let key = text_cache_key(text, config);
        let index = self
            .text_cache
            .measure(text, key, config, self.generation, measure);
        if index.is_none() && !self.boolean_warnings.max_text_measure_cache_exceeded {
            self.boolean_warnings.max_text_measure_cache_exceeded = true;
            let words = self.settings().max_measure_text_cache_word_count;
            self.report(
                ErrorType::TextMeasurementCapacityExceeded,
                format!(
                    "The text measurement cache is full ({words} words). \
                     Raise Settings::max_measure_text_cache_word_count."
                ),
            );
        }
        index
    }

    // ========================================================================
    // Hover
    // ========================================================================

    /// Whether the pointer was over the open element at the last pointer update.
    pub fn hovered(&self) -> bool {
        if self.dropped_open_depth > 0 {
            return false;
        }
        let open_id = self.get_open_element_id();
        open_id != 0 && self.pointer_over_ids.iter().any(|id| id.id == open_id)
    }

    /// Registers a callback for the open element, invoked by
    /// [`set_pointer_state`](Self::set_pointer_state) while the pointer is over it.
    pub fn on_hover(&mut self, callback: HoverCallback) {
        if self.state != super::FrameState::Declaring || self.dropped_open_depth > 0 {
            return;
        }
        let open_id = self.get_open_element_id();
        if let Some(item) = self.registry.get_mut(open_id) {
            item.on_hover = Some(callback);
        }
    }
}
