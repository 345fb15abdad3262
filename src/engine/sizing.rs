use super::{float_equal, LayoutContext, EPSILON, MAXFLOAT};
use crate::layout::SizingType;
use crate::text::WrapMode;

impl<CustomElementData: Clone + std::fmt::Debug> LayoutContext<CustomElementData> {
    // ========================================================================
    // Layout algorithm
    // ========================================================================

    /// Resolves one axis for every tree, parents before children.
    pub(crate) fn size_containers_along_axis(&mut self, x_axis: bool) {
        let mut bfs_buffer = std::mem::take(&mut self.tree_node_buffer);
        let mut resizable_container_buffer = std::mem::take(&mut self.resizable_container_buffer);

        for root_index in 0..self.layout_element_tree_roots.len() {
            bfs_buffer.clear();
            let root = self.layout_element_tree_roots[root_index];
            let root_element = root.layout_element_index;
            bfs_buffer.push(root_element);

            // Floating roots resolve Grow and Percent against the element they attach to.
            if self.floating_config(root_element).is_some() {
                if let Some(parent) = self.registry.get_live(root.parent_id, self.generation) {
                    let parent_size = self.layout_elements[parent.layout_element_index]
                        .dimensions
                        .along(x_axis);
                    let sizing = *self.layout_config(root_element).sizing.along(x_axis);
                    let size = self.layout_elements[root_element]
                        .dimensions
                        .along_mut(x_axis);
                    match sizing.type_ {
                        SizingType::Grow => *size = parent_size,
                        SizingType::Percent => *size = parent_size * sizing.percent,
                        _ => {}
                    }
                }
            }

            let root_sizing = *self.layout_config(root_element).sizing.along(x_axis);
            if root_sizing.type_ != SizingType::Percent {
                let size = self.layout_elements[root_element]
                    .dimensions
                    .along_mut(x_axis);
                *size = size.max(root_sizing.min_max.min).min(root_sizing.min_max.max);
            }

            let mut i = 0;
            while i < bfs_buffer.len() {
                let parent_index = bfs_buffer[i];
                i += 1;

                let parent_config = *self.layout_config(parent_index);
                let parent_size = self.layout_elements[parent_index].dimensions.along(x_axis);
                let parent_padding = parent_config.padding.along(x_axis);
                let sizing_along_axis = parent_config.layout_direction.is_along(x_axis);
                let parent_scrolls = self
                    .scroll_config(parent_index)
                    .is_some_and(|scroll| scroll.along(x_axis));
                let parent_child_gap = parent_config.child_gap as f32;

                let mut inner_content_size = 0.0f32;
                let mut total_padding_and_child_gaps = parent_padding;
                let mut grow_container_count = 0;
                resizable_container_buffer.clear();

                let children = self.children_range(parent_index);
                for (child_offset, position) in children.clone().enumerate() {
                    let child_index = self.layout_element_children[position];
                    let child_sizing = *self.layout_config(child_index).sizing.along(x_axis);
                    let child_size = self.layout_elements[child_index].dimensions.along(x_axis);
                    let text_config = self.text_config(child_index).copied();

                    if text_config.is_none()
                        && self.layout_elements[child_index].children_length() > 0
                    {
                        bfs_buffer.push(child_index);
                    }

                    let wraps = text_config.map_or(true, |text| text.wrap_mode == WrapMode::Words);
                    let aspect_locked = !x_axis && self.aspect_ratio(child_index).is_some();
                    if child_sizing.type_ != SizingType::Percent
                        && child_sizing.type_ != SizingType::Fixed
                        && wraps
                        && !aspect_locked
                    {
                        resizable_container_buffer.push(child_index);
                    }

                    if sizing_along_axis {
                        if child_sizing.type_ != SizingType::Percent {
                            inner_content_size += child_size;
                        }
                        if child_sizing.type_ == SizingType::Grow {
                            grow_container_count += 1;
                        }
                        if child_offset > 0 {
                            inner_content_size += parent_child_gap;
                            total_padding_and_child_gaps += parent_child_gap;
                        }
                    } else {
                        inner_content_size = inner_content_size.max(child_size);
                    }
                }

                // Expand percentage containers
                for position in children {
                    let child_index = self.layout_element_children[position];
                    let child_sizing = *self.layout_config(child_index).sizing.along(x_axis);
                    if child_sizing.type_ == SizingType::Percent {
                        let new_size =
                            (parent_size - total_padding_and_child_gaps) * child_sizing.percent;
                        *self.layout_elements[child_index]
                            .dimensions
                            .along_mut(x_axis) = new_size;
                        if sizing_along_axis {
                            inner_content_size += new_size;
                        }
                        self.update_aspect_ratio_box(child_index);
                    }
                }

                if sizing_along_axis {
                    let size_to_distribute = parent_size - parent_padding - inner_content_size;
                    if size_to_distribute < 0.0 {
                        // Scrolling parents clip their overflow instead.
                        if parent_scrolls {
                            continue;
                        }
                        self.compress_children(
                            &mut resizable_container_buffer,
                            size_to_distribute,
                            x_axis,
                        );
                    } else if size_to_distribute > 0.0 && grow_container_count > 0 {
                        resizable_container_buffer.retain(|&child_index| {
                            self.layout_config(child_index).sizing.along(x_axis).type_
                                == SizingType::Grow
                        });
                        self.expand_children(
                            &mut resizable_container_buffer,
                            size_to_distribute,
                            x_axis,
                        );
                    }
                } else {
                    let mut max_size = parent_size - parent_padding;
                    if parent_scrolls {
                        max_size = max_size.max(inner_content_size);
                    }
                    for &child_index in &resizable_container_buffer {
                        let child_sizing = *self.layout_config(child_index).sizing.along(x_axis);
                        let element = &mut self.layout_elements[child_index];
                        let min_size = element.min_dimensions.along(x_axis);
                        let size = element.dimensions.along_mut(x_axis);
                        if child_sizing.type_ == SizingType::Grow {
                            *size = max_size.min(child_sizing.min_max.max);
                        }
                        *size = min_size.max(size.min(max_size));
                    }
                }
            }
        }
        self.tree_node_buffer = bfs_buffer;
        self.resizable_container_buffer = resizable_container_buffer;
    }

    /// Shrinks the largest children first, evening them out toward the next largest, until the
    /// overflow is gone or every child is pinned at its minimum.
    fn compress_children(&mut self, resizable: &mut Vec<usize>, mut distribute: f32, x_axis: bool) {
        while distribute < -EPSILON && !resizable.is_empty() {
            let mut largest = 0.0f32;
            let mut second_largest = 0.0f32;
            let mut width_to_add = distribute;

            for &child_index in resizable.iter() {
                let size = self.layout_elements[child_index].dimensions.along(x_axis);
                if float_equal(size, largest) {
                    continue;
                }
                if size > largest {
                    second_largest = largest;
                    largest = size;
                }
                if size < largest {
                    second_largest = second_largest.max(size);
                    width_to_add = second_largest - largest;
                }
            }
            width_to_add = width_to_add.max(distribute / resizable.len() as f32);

            let before = (distribute, resizable.len());
            let mut j = 0;
            while j < resizable.len() {
                let element = &mut self.layout_elements[resizable[j]];
                let current = element.dimensions.along(x_axis);
                let min_size = element.min_dimensions.along(x_axis);
                if float_equal(current, largest) {
                    let new_size = current + width_to_add;
                    if new_size <= min_size {
                        *element.dimensions.along_mut(x_axis) = min_size;
                        distribute -= min_size - current;
                        resizable.swap_remove(j);
                        continue;
                    }
                    *element.dimensions.along_mut(x_axis) = new_size;
                    distribute -= new_size - current;
                }
                j += 1;
            }
            if before == (distribute, resizable.len()) {
                break;
            }
        }
    }

    /// Grows the smallest Grow children first, evening them out toward the next smallest, until
    /// the slack is used up or every child has reached its maximum.
    fn expand_children(&mut self, resizable: &mut Vec<usize>, mut distribute: f32, x_axis: bool) {
        while distribute > EPSILON && !resizable.is_empty() {
            let mut smallest = MAXFLOAT;
            let mut second_smallest = MAXFLOAT;
            let mut width_to_add = distribute;

            for &child_index in resizable.iter() {
                let size = self.layout_elements[child_index].dimensions.along(x_axis);
                if float_equal(size, smallest) {
                    continue;
                }
                if size < smallest {
                    second_smallest = smallest;
                    smallest = size;
                }
                if size > smallest {
                    second_smallest = second_smallest.min(size);
                    width_to_add = second_smallest - smallest;
                }
            }
            width_to_add = width_to_add.min(distribute / resizable.len() as f32);

            let before = (distribute, resizable.len());
            let mut j = 0;
            while j < resizable.len() {
                let child_index = resizable[j];
                let max_size = self
                    .layout_config(child_index)
                    .sizing
                    .along(x_axis)
                    .min_max
                    .max;
                let size = self.layout_elements[child_index]
                    .dimensions
                    .along_mut(x_axis);
                if float_equal(*size, smallest) {
                    let previous = *size;
                    *size += width_to_add;
                    if *size >= max_size {
                        *size = max_size;
                        distribute -= *size - previous;
                        resizable.swap_remove(j);
                        continue;
                    }
                    distribute -= *size - previous;
                }
                j += 1;
            }
            if before == (distribute, resizable.len()) {
                break;
            }
        }
    }

    /// Recomputes container heights from their children after wrapping changed text heights.
    ///
    /// Children come before their parent in the reversed pre-order walk.
    pub(crate) fn propagate_sizes_up_tree(&mut self) {
        let mut stack = std::mem::take(&mut self.tree_node_buffer);
        let mut pre_order = std::mem::take(&mut self.tree_order_buffer);
        stack.clear();
        pre_order.clear();
        stack.extend(
            self.layout_element_tree_roots
                .iter()
                .map(|root| root.layout_element_index),
        );
        while let Some(element_index) = stack.pop() {
            pre_order.push(element_index);
            stack.extend_from_slice(self.children(element_index));
        }

        for &element_index in pre_order.iter().rev() {
            let children = self.children_range(element_index);
            if children.is_empty() {
                continue;
            }
            let config = *self.layout_config(element_index);
            let padding = config.padding.along(false);
            let mut height = if config.layout_direction.is_along(true) {
                let mut height = self.layout_elements[element_index].dimensions.height;
                for position in children {
                    let child_index = self.layout_element_children[position];
                    height = height.max(self.layout_elements[child_index].dimensions.height + padding);
                }
                height
            } else {
                let gaps = (children.len() - 1) as f32 * config.child_gap as f32;
                children
                    .map(|position| {
                        let child_index = self.layout_element_children[position];
                        self.layout_elements[child_index].dimensions.height
                    })
                    .sum::<f32>()
                    + padding
                    + gaps
            };
            let sizing = config.sizing.height;
            if sizing.type_ != SizingType::Percent {
                height = height.max(sizing.min_max.min).min(sizing.min_max.max);
            }
            self.layout_elements[element_index].dimensions.height = height;
        }
        self.tree_node_buffer = stack;
        self.tree_order_buffer = pre_order;
    }

    pub(crate) fn calculate_final_layout(&mut self) {
        self.size_containers_along_axis(true);

        self.wrap_text();

        // Heights of aspect-locked elements follow their resolved widths.
        for i in 0..self.aspect_ratio_element_indexes.len() {
            let element_index = self.aspect_ratio_element_indexes[i];
            let Some(aspect_ratio) = self.aspect_ratio(element_index) else {
                continue;
            };
            let height = (1.0 / aspect_ratio) * self.layout_elements[element_index].dimensions.width;
            self.layout_elements[element_index].dimensions.height = height;
            let layout_config_index = self.layout_elements[element_index].layout_config_index;
            self.layout_configs[layout_config_index]
                .sizing
                .height
                .min_max
                .max = height;
        }

        self.propagate_sizes_up_tree();

        self.size_containers_along_axis(false);

        for i in 0..self.aspect_ratio_element_indexes.len() {
            let element_index = self.aspect_ratio_element_indexes[i];
            let Some(aspect_ratio) = self.aspect_ratio(element_index) else {
                continue;
            };
            let element = &mut self.layout_elements[element_index];
            element.dimensions.width = aspect_ratio * element.dimensions.height;
        }

        // Stable, so roots with equal z-index keep declaration order.
        self.layout_element_tree_roots
            .sort_by_key(|root| root.z_index);

        self.generate_render_commands();
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::context;
    use crate::elements::ElementDeclaration;
    use crate::layout::{LayoutConfig, LayoutDirection, Padding, Sizing, SizingConfig};
    use crate::math::Dimensions;

    fn sized(width: Sizing, height: Sizing) -> ElementDeclaration {
        ElementDeclaration {
            layout: LayoutConfig {
                sizing: SizingConfig {
                    width: width.into(),
                    height: height.into(),
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn grow_children_split_slack_evenly() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element();
        let mut row = sized(Sizing::Fixed(200.0), Sizing::Fixed(50.0));
        row.layout.padding = Padding::horizontal(16);
        row.layout.child_gap = 16;
        ctx.configure_open_element(&row);
        for _ in 0..2 {
            ctx.open_element();
            ctx.configure_open_element(&sized(Sizing::Grow(0.0, 0.0), Sizing::Grow(0.0, 0.0)));
            ctx.close_element();
        }
        ctx.close_element();
        ctx.end_layout();

        assert_eq!(ctx.layout_elements[2].dimensions, Dimensions::new(76.0, 50.0));
        assert_eq!(ctx.layout_elements[3].dimensions, Dimensions::new(76.0, 50.0));
    }

    #[test]
    fn grow_stops_at_max_and_rest_goes_to_siblings() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element();
        ctx.configure_open_element(&sized(Sizing::Fixed(300.0), Sizing::Fixed(10.0)));
        ctx.open_element();
        ctx.configure_open_element(&sized(Sizing::Grow(0.0, 50.0), Sizing::Fixed(10.0)));
        ctx.close_element();
        ctx.open_element();
        ctx.configure_open_element(&sized(Sizing::Grow(0.0, 0.0), Sizing::Fixed(10.0)));
        ctx.close_element();
        ctx.close_element();
        ctx.end_layout();

        assert_eq!(ctx.layout_elements[2].dimensions.width, 50.0);
        assert_eq!(ctx.layout_elements[3].dimensions.width, 250.0);
    }

    #[test]
    fn shrink_takes_overflow_from_resizable_child() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element();
        ctx.configure_open_element(&sized(Sizing::Fixed(100.0), Sizing::Fixed(40.0)));
        ctx.open_text_element("aaaa aaaa".into(), Default::default());
        ctx.open_element();
        ctx.configure_open_element(&sized(Sizing::Fixed(40.0), Sizing::Fixed(10.0)));
        ctx.close_element();
        ctx.close_element();
        ctx.end_layout();

        // 90 + 40 overflows 100 by 30; the fixed child keeps its size.
        assert_eq!(ctx.layout_elements[2].dimensions.width, 60.0);
        assert_eq!(ctx.layout_elements[3].dimensions.width, 40.0);
    }

    #[test]
    fn shrink_never_goes_below_minimum() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element();
        ctx.configure_open_element(&sized(Sizing::Fixed(100.0), Sizing::Fixed(40.0)));
        ctx.open_text_element("aaaaaaaaa".into(), Default::default());
        ctx.open_element();
        ctx.configure_open_element(&sized(Sizing::Fixed(40.0), Sizing::Fixed(10.0)));
        ctx.close_element();
        ctx.close_element();
        ctx.end_layout();

        // A single word cannot be narrower than itself.
        assert_eq!(ctx.layout_elements[2].dimensions.width, 90.0);
    }

    #[test]
    fn shrink_evens_out_fit_children() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element();
        ctx.configure_open_element(&sized(Sizing::Fixed(100.0), Sizing::Fixed(10.0)));
        for _ in 0..2 {
            ctx.open_element();
            ctx.configure_open_element(&sized(Sizing::Fit(0.0, 0.0), Sizing::Fixed(10.0)));
            ctx.open_text_element("aaa aaa".into(), Default::default());
            ctx.close_element();
        }
        ctx.close_element();
        ctx.end_layout();

        // Two 70 px fit children in 100 px settle at 50 each.
        assert_eq!(ctx.layout_elements[2].dimensions.width, 50.0);
        assert_eq!(ctx.layout_elements[4].dimensions.width, 50.0);
    }

    #[test]
    fn percent_uses_space_after_padding() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element();
        let mut parent = sized(Sizing::Fixed(420.0), Sizing::Fixed(100.0));
        parent.layout.padding = Padding::horizontal(10);
        ctx.configure_open_element(&parent);
        ctx.open_element();
        ctx.configure_open_element(&sized(Sizing::Percent(0.5), Sizing::Percent(0.25)));
        ctx.close_element();
        ctx.close_element();
        ctx.end_layout();

        assert_eq!(ctx.layout_elements[2].dimensions, Dimensions::new(200.0, 25.0));
    }

    #[test]
    fn column_height_follows_wrapped_text() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element();
        let mut column = sized(Sizing::Fixed(60.0), Sizing::Fit(0.0, 0.0));
        column.layout.layout_direction = LayoutDirection::TopToBottom;
        ctx.configure_open_element(&column);
        ctx.open_text_element("aa bb cc".into(), Default::default());
        ctx.close_element();
        ctx.end_layout();

        // "aa bb" and "cc" at 20 px per line.
        assert_eq!(ctx.layout_elements[2].dimensions.height, 40.0);
        assert_eq!(ctx.layout_elements[1].dimensions.height, 40.0);
    }

    #[test]
    fn cross_axis_grow_fills_parent() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element();
        let mut row = sized(Sizing::Fixed(100.0), Sizing::Fixed(80.0));
        row.layout.padding = Padding::all(5);
        ctx.configure_open_element(&row);
        ctx.open_element();
        ctx.configure_open_element(&sized(Sizing::Fixed(10.0), Sizing::Grow(0.0, 0.0)));
        ctx.close_element();
        ctx.close_element();
        ctx.end_layout();

        assert_eq!(ctx.layout_elements[2].dimensions.height, 70.0);
    }
}
