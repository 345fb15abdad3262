use super::{LayoutContext, PointerDataInteractionState, ScrollContainerDataInternal};
use crate::elements::PointerCaptureMode;
use crate::id::Id;
use crate::math::Vector2;

/// Drag distance below which a release leaves no momentum.
const MOMENTUM_MIN_DRAG_DISTANCE: f32 = 10.0;
const MOMENTUM_DECAY: f32 = 0.95;
const MOMENTUM_CUTOFF: f32 = 0.1;
/// A drag that stays this still for longer than `DRAG_REANCHOR_TIME` seconds restarts from the
/// current pointer position.
const DRAG_STILL_DISTANCE: f32 = 0.1;
const DRAG_REANCHOR_TIME: f32 = 0.15;

/// Lowest allowed scroll position on one axis. The highest is always zero.
#[inline]
fn min_scroll(content: f32, viewport: f32) -> f32 {
    -(content - viewport).max(0.0)
}

impl ScrollContainerDataInternal {
    fn clamp_position(&mut self) {
        let viewport = self.bounding_box.dimensions();
        self.scroll_position.x = self
            .scroll_position
            .x
            .max(min_scroll(self.content_size.width, viewport.width))
            .min(0.0);
        self.scroll_position.y = self
            .scroll_position
            .y
            .max(min_scroll(self.content_size.height, viewport.height))
            .min(0.0);
    }

    fn can_scroll(&self, x_axis: bool) -> bool {
        self.config.along(x_axis)
            && self.content_size.along(x_axis) > self.bounding_box.dimensions().along(x_axis)
    }
}

impl<CustomElementData: Clone + std::fmt::Debug> LayoutContext<CustomElementData> {
    /// Records the pointer and recomputes which elements of the last laid-out frame are under it.
    ///
    /// Hover callbacks fire for every element hit. A floating root that captures the pointer hides
    /// every root beneath it.
    pub fn set_pointer_state(&mut self, position: Vector2, is_pointer_down: bool) {
        use PointerDataInteractionState::*;

        self.pointer_info.state = match (is_pointer_down, self.pointer_info.state) {
            (true, Released | ReleasedThisFrame) => PressedThisFrame,
            (true, Pressed | PressedThisFrame) => Pressed,
            (false, Pressed | PressedThisFrame) => ReleasedThisFrame,
            (false, Released | ReleasedThisFrame) => Released,
        };
        self.pointer_info.position = position;

        if self.boolean_warnings.max_elements_exceeded {
            return;
        }
        self.pointer_over_ids.clear();

        let pointer = self.pointer_info;
        let external_scroll = self.settings().external_scroll_handling_enabled;
        let mut stack = std::mem::take(&mut self.tree_node_buffer);

        for root_index in (0..self.layout_element_tree_roots.len()).rev() {
            let root = self.layout_element_tree_roots[root_index];
            let mut root_hit = false;
            stack.clear();
            stack.push(root.layout_element_index);

            while let Some(element_index) = stack.pop() {
                let element_id = self.layout_elements[element_index].id;
                let clip_id = self
                    .layout_element_clip_element_ids
                    .get(element_index)
                    .copied()
                    .unwrap_or(0);
                let inside_clip = clip_id == 0
                    || external_scroll
                    || self
                        .registry
                        .get(clip_id)
                        .is_some_and(|clip| clip.bounding_box.contains(position));

                let Some(item) = self.registry.get(element_id) else {
                    continue;
                };
                if inside_clip && item.bounding_box.contains(position) {
                    let id = item.element_id.clone();
                    let alias = item.id_alias;
                    if let Some(on_hover) = self
                        .registry
                        .get_mut(element_id)
                        .and_then(|item| item.on_hover.as_mut())
                    {
                        on_hover(id.clone(), pointer);
                    }
                    self.pointer_over_ids.push(id);
                    if alias != 0 {
                        self.pointer_over_ids.push(Id {
                            id: alias,
                            ..Default::default()
                        });
                    }
                    root_hit |= element_index == root.layout_element_index;
                }

                if self.layout_elements[element_index].text_data_index().is_none() {
                    for slot in self.children_range(element_index).rev() {
                        stack.push(self.layout_element_children[slot]);
                    }
                }
            }

            let captures = self
                .floating_config(root.layout_element_index)
                .is_some_and(|floating| floating.pointer_capture_mode == PointerCaptureMode::Capture);
            if root_hit && captures {
                break;
            }
        }
        self.tree_node_buffer = stack;
        log::trace!("{} element(s) under the pointer", self.pointer_over_ids.len());
    }

    /// Advances retained scroll state by one frame.
    ///
    /// Containers not declared in the last frame are forgotten. `scroll_delta` is a wheel
    /// movement in layout units and goes to the innermost hovered container that can scroll.
    pub fn update_scroll_containers(
        &mut self,
        enable_drag_scrolling: bool,
        scroll_delta: Vector2,
        delta_time: f32,
    ) {
        let pointer = self.pointer_info;
        let pointer_active = enable_drag_scrolling
            && matches!(
                pointer.state,
                PointerDataInteractionState::Pressed | PointerDataInteractionState::PressedThisFrame
            );
        let wheel_moved = scroll_delta.x != 0.0 || scroll_delta.y != 0.0;

        let generation = self.generation;
        let registry = &self.registry;
        self.scroll_container_datas.retain_mut(|data| {
            let keep = data.open_this_frame && registry.get_live(data.element_id, generation).is_some();
            data.open_this_frame = false;
            keep
        });

        let mut target: Option<(usize, usize)> = None;
        for (data_index, data) in self.scroll_container_datas.iter_mut().enumerate() {
            if !pointer_active && data.pointer_scroll_active {
                let diff = Vector2::new(
                    data.scroll_position.x - data.scroll_origin.x,
                    data.scroll_position.y - data.scroll_origin.y,
                );
                if data.momentum_time > 0.0 {
                    if diff.x.abs() > MOMENTUM_MIN_DRAG_DISTANCE {
                        data.scroll_momentum.x = diff.x / (data.momentum_time * 25.0);
                    }
                    if diff.y.abs() > MOMENTUM_MIN_DRAG_DISTANCE {
                        data.scroll_momentum.y = diff.y / (data.momentum_time * 25.0);
                    }
                }
                data.pointer_scroll_active = false;
                data.pointer_origin = Vector2::default();
                data.scroll_origin = Vector2::default();
                data.momentum_time = 0.0;
            }

            data.scroll_position.x += data.scroll_momentum.x;
            data.scroll_momentum.x *= MOMENTUM_DECAY;
            if data.scroll_momentum.x.abs() < MOMENTUM_CUTOFF || wheel_moved {
                data.scroll_momentum.x = 0.0;
            }
            data.scroll_position.y += data.scroll_momentum.y;
            data.scroll_momentum.y *= MOMENTUM_DECAY;
            if data.scroll_momentum.y.abs() < MOMENTUM_CUTOFF || wheel_moved {
                data.scroll_momentum.y = 0.0;
            }
            data.clamp_position();

            if let Some(over_index) = self
                .pointer_over_ids
                .iter()
                .rposition(|id| id.id == data.element_id)
            {
                if target.map_or(true, |(best, _)| over_index > best) {
                    target = Some((over_index, data_index));
                }
            }
        }

        let Some((_, data_index)) = target else {
            return;
        };
        let data = &mut self.scroll_container_datas[data_index];
        let can_scroll_x = data.can_scroll(true);
        let can_scroll_y = data.can_scroll(false);

        if can_scroll_x {
            data.scroll_position.x += scroll_delta.x;
        }
        if can_scroll_y {
            data.scroll_position.y += scroll_delta.y;
        }

        if pointer_active {
            data.scroll_momentum = Vector2::default();
            if !data.pointer_scroll_active {
                data.pointer_origin = pointer.position;
                data.scroll_origin = data.scroll_position;
                data.pointer_scroll_active = true;
            } else {
                let before = data.scroll_position;
                if can_scroll_x {
                    data.scroll_position.x =
                        data.scroll_origin.x + (pointer.position.x - data.pointer_origin.x);
                }
                if can_scroll_y {
                    data.scroll_position.y =
                        data.scroll_origin.y + (pointer.position.y - data.pointer_origin.y);
                }
                data.clamp_position();
                let moved_x = data.scroll_position.x - before.x;
                let moved_y = data.scroll_position.y - before.y;
                if moved_x.abs() < DRAG_STILL_DISTANCE
                    && moved_y.abs() < DRAG_STILL_DISTANCE
                    && data.momentum_time > DRAG_REANCHOR_TIME
                {
                    data.momentum_time = 0.0;
                    data.pointer_origin = pointer.position;
                    data.scroll_origin = data.scroll_position;
                } else {
                    data.momentum_time += delta_time;
                }
            }
        }

        data.clamp_position();
    }

    /// Scroll position of the open element if it is a scroll container, zero otherwise.
    pub fn get_scroll_offset(&self) -> Vector2 {
        let open_id = self.get_open_element_id();
        self.scroll_container_datas
            .iter()
            .find(|data| data.element_id == open_id)
            .map_or(Vector2::default(), |data| data.scroll_position)
    }

    /// Whether the element with `id` was under the pointer at the last pointer update.
    pub fn pointer_over(&self, id: &Id) -> bool {
        self.pointer_over_ids.iter().any(|over| over == id)
    }

    /// Ids under the pointer, topmost root first and outermost element first within a root.
    #[inline]
    pub fn pointer_over_ids(&self) -> &[Id] {
        &self.pointer_over_ids
    }

    #[inline]
    pub fn pointer_state(&self) -> PointerDataInteractionState {
        self.pointer_info.state
    }
}
