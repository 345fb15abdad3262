use std::borrow::Cow;

use super::{ElementConfig, LayoutContext, SharedConfig};
use crate::elements::CornerRadius;
use crate::errors::ErrorType;
use crate::id::hash_number;
use crate::math::{BoundingBox, Dimensions, Vector2};
use crate::render_commands::{
    Border, Custom, Image, Rectangle, RenderCommand, RenderCommandConfig, Text,
};
use crate::text::TextConfig;

/// One step of the downward traversal. An element is entered, its children are visited, then
/// it is exited to close what it opened.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Visit {
    Enter {
        element_index: usize,
        position: Vector2,
    },
    Exit {
        element_index: usize,
        position: Vector2,
        bounding_box: BoundingBox,
        scroll_offset: Vector2,
        visible: bool,
    },
}

impl<CustomElementData: Clone + std::fmt::Debug> LayoutContext<CustomElementData> {
    fn element_is_offscreen(&self, bounding_box: &BoundingBox) -> bool {
        if !self.settings().culling_enabled {
            return false;
        }
        bounding_box.x > self.layout_dimensions.width
            || bounding_box.y > self.layout_dimensions.height
            || bounding_box.x + bounding_box.width < 0.0
            || bounding_box.y + bounding_box.height < 0.0
    }

    fn add_render_command(&mut self, command: RenderCommand<CustomElementData>) {
        if self.render_commands.len() >= self.settings().max_render_command_count {
            if !self.boolean_warnings.max_render_commands_exceeded {
                self.boolean_warnings.max_render_commands_exceeded = true;
                let max = self.settings().max_render_command_count;
                self.report(
                    ErrorType::RenderCommandsCapacityExceeded,
                    format!(
                        "More than {max} render commands were produced. \
                         Raise Settings::max_render_command_count."
                    ),
                );
            }
            return;
        }
        self.render_commands.push(command);
    }

    /// Top-left corner of a root: the origin for the main root, the resolved attach point for a
    /// floating one.
    fn root_position(&self, element_index: usize, parent_id: u32) -> Vector2 {
        let Some(floating) = self.floating_config(element_index) else {
            return Vector2::default();
        };
        let Some(parent) = self.registry.get_live(parent_id, self.generation) else {
            return Vector2::default();
        };
        let parent_box = parent.bounding_box;
        let dimensions = self.layout_elements[element_index].dimensions;
        let points = floating.attach_points;
        Vector2::new(
            parent_box.x + points.parent_x.leading_share(parent_box.width)
                - points.element_x.leading_share(dimensions.width)
                + floating.offset.x,
            parent_box.y + points.parent_y.leading_share(parent_box.height)
                - points.element_y.leading_share(dimensions.height)
                + floating.offset.y,
        )
    }

    pub(crate) fn generate_render_commands(&mut self) {
        self.render_commands.clear();
        let mut stack = std::mem::take(&mut self.visit_stack);
        let mut child_visits = std::mem::take(&mut self.child_visit_buffer);
        stack.clear();

        for root_index in 0..self.layout_element_tree_roots.len() {
            let root = self.layout_element_tree_roots[root_index];
            let root_element = root.layout_element_index;
            let root_id = self.layout_elements[root_element].id;
            let root_children = self.layout_elements[root_element].children_length() as u32;

            let mut root_clipped = false;
            if root.clip_element_id != 0 {
                if let Some(clip_item) = self.registry.get(root.clip_element_id) {
                    let bounding_box = clip_item.bounding_box;
                    self.add_render_command(RenderCommand {
                        bounding_box,
                        config: RenderCommandConfig::ScissorStart,
                        id: hash_number(root_id, root_children + 10).id,
                        z_index: root.z_index,
                        user_data: 0,
                    });
                    root_clipped = true;
                }
            }

            stack.push(Visit::Enter {
                element_index: root_element,
                position: self.root_position(root_element, root.parent_id),
            });

            while let Some(visit) = stack.pop() {
                match visit {
                    Visit::Enter {
                        element_index,
                        position,
                    } => {
                        let exit = self.enter_element(element_index, position, root.z_index);
                        stack.push(exit);
                        self.place_children(exit, &mut child_visits);
                        stack.extend(child_visits.drain(..).rev());
                    }
                    Visit::Exit {
                        element_index,
                        bounding_box,
                        scroll_offset,
                        visible,
                        ..
                    } => {
                        if visible {
                            self.exit_element(
                                element_index,
                                bounding_box,
                                scroll_offset,
                                root.z_index,
                                root_children,
                            );
                        }
                    }
                }
            }

            if root_clipped {
                self.add_render_command(RenderCommand {
                    bounding_box: BoundingBox::default(),
                    config: RenderCommandConfig::ScissorEnd,
                    id: hash_number(root_id, root_children + 11).id,
                    z_index: root.z_index,
                    user_data: 0,
                });
            }
        }
        self.visit_stack = stack;
        self.child_visit_buffer = child_visits;
    }

    /// Records the element's final box and emits everything drawn beneath its children.
    fn enter_element(&mut self, element_index: usize, position: Vector2, z_index: i16) -> Visit {
        let element = self.layout_elements[element_index];
        let element_id = element.id;
        let mut bounding_box = BoundingBox::new(
            position.x,
            position.y,
            element.dimensions.width,
            element.dimensions.height,
        );
        if let Some(floating) = self.floating_config(element_index) {
            let expand = floating.expand;
            bounding_box.x -= expand.width;
            bounding_box.width += expand.width * 2.0;
            bounding_box.y -= expand.height;
            bounding_box.height += expand.height * 2.0;
        }

        let mut scroll_offset = Vector2::default();
        if let Some(scroll) = self.scroll_config(element_index).copied() {
            if let Some(data) = self
                .scroll_container_datas
                .iter_mut()
                .find(|data| data.element_id == element_id && data.open_this_frame)
            {
                data.bounding_box = bounding_box;
                scroll_offset = scroll.child_offset;
            }
        }

        if let Some(item) = self.registry.get_mut(element_id) {
            item.bounding_box = bounding_box;
        }

        let visible = !self.element_is_offscreen(&bounding_box);
        if visible {
            self.emit_element_commands(element_index, bounding_box, z_index);
        }

        Visit::Exit {
            element_index,
            position,
            bounding_box,
            scroll_offset,
            visible,
        }
    }

    fn emit_element_commands(
        &mut self,
        element_index: usize,
        bounding_box: BoundingBox,
        z_index: i16,
    ) {
        let element_id = self.layout_elements[element_index].id;
        let shared = self
            .shared_config(element_index)
            .copied()
            .unwrap_or_default();

        let mut emit_rectangle = shared.background_color.is_visible();
        let mut image = None;
        let mut custom = None;
        let mut text = None;
        let mut scissor = false;
        for config in self.configs(element_index) {
            match config {
                ElementConfig::Image(config) => {
                    emit_rectangle = false;
                    image = Some(*config);
                }
                ElementConfig::Custom(data) => {
                    emit_rectangle = false;
                    custom = Some(data.clone());
                }
                ElementConfig::Text(config) => text = Some(*config),
                ElementConfig::Scroll(_) => scissor = true,
                ElementConfig::Shared(_) | ElementConfig::Floating(_) | ElementConfig::Border(_) => {}
            }
        }

        let command = |config, user_data| RenderCommand {
            bounding_box,
            config,
            id: element_id,
            z_index,
            user_data,
        };

        if emit_rectangle {
            self.add_render_command(command(
                RenderCommandConfig::Rectangle(Rectangle {
                    color: shared.background_color,
                    corner_radii: shared.corner_radius,
                }),
                shared.user_data,
            ));
        }
        if let Some(image) = image {
            self.add_render_command(command(
                RenderCommandConfig::Image(Image {
                    background_color: shared.background_color,
                    corner_radii: shared.corner_radius,
                    data: image.data,
                }),
                shared.user_data,
            ));
        }
        if let Some(text_config) = text {
            self.emit_text_lines(element_index, bounding_box, &text_config, z_index);
        }
        if let Some(data) = custom {
            self.add_render_command(command(
                RenderCommandConfig::Custom(Custom {
                    background_color: shared.background_color,
                    corner_radii: shared.corner_radius,
                    data,
                }),
                shared.user_data,
            ));
        }
        if scissor {
            self.add_render_command(command(RenderCommandConfig::ScissorStart, 0));
        }
    }

    fn emit_text_lines(
        &mut self,
        element_index: usize,
        bounding_box: BoundingBox,
        config: &TextConfig,
        z_index: i16,
    ) {
        let Some(data_index) = self.layout_elements[element_index].text_data_index() else {
            return;
        };
        let element_id = self.layout_elements[element_index].id;
        let data = &self.text_element_data[data_index];
        let natural_line_height = data.preferred_dimensions.height;
        let final_line_height = config.line_height_or(natural_line_height);
        let mut y_position = (final_line_height - natural_line_height) / 2.0;

        let mut lines = Vec::with_capacity(data.wrapped_lines.len());
        for (line_index, line) in self.wrapped_text_lines[data.wrapped_lines.clone()]
            .iter()
            .enumerate()
        {
            if line.length == 0 {
                y_position += final_line_height;
                continue;
            }
            let offset = config
                .alignment
                .leading_share(bounding_box.width - line.dimensions.width);
            let line_box = BoundingBox::new(
                bounding_box.x + offset,
                bounding_box.y + y_position,
                line.dimensions.width,
                line.dimensions.height,
            );
            y_position += final_line_height;

            let range = line.start..line.start + line.length;
            let text = match &data.text {
                Cow::Borrowed(text) => {
                    let text: &'static str = text;
                    Cow::Borrowed(&text[range])
                }
                Cow::Owned(text) => Cow::Owned(text[range].to_owned()),
            };
            lines.push((line_index as u32, line_box, text));
        }

        for (line_index, line_box, text) in lines {
            if self.element_is_offscreen(&line_box) {
                continue;
            }
            self.add_render_command(RenderCommand {
                bounding_box: line_box,
                config: RenderCommandConfig::Text(Text {
                    text,
                    color: config.color,
                    font_id: config.font_id,
                    font_size: config.font_size,
                    letter_spacing: config.letter_spacing,
                    line_height: config.line_height,
                }),
                id: hash_number(line_index, element_id).id,
                z_index,
                user_data: config.user_data,
            });
        }
    }

    /// Computes each child's position from alignment, gaps and the scroll offset.
    fn place_children(&mut self, exit: Visit, child_visits: &mut Vec<Visit>) {
        let Visit::Exit {
            element_index,
            position: origin,
            scroll_offset,
            ..
        } = exit
        else {
            return;
        };
        if self.layout_elements[element_index].text_data_index().is_some() {
            return;
        }
        let element = self.layout_elements[element_index];
        let config = *self.layout_config(element_index);
        let along_x = config.layout_direction.is_along(true);
        let children = self.children_range(element_index);
        let gap = config.child_gap as f32;

        let mut content = Dimensions::default();
        for position in children.clone() {
            let child = &self.layout_elements[self.layout_element_children[position]];
            *content.along_mut(along_x) += child.dimensions.along(along_x);
            let across = content.along_mut(!along_x);
            *across = across.max(child.dimensions.along(!along_x));
        }
        *content.along_mut(along_x) += children.len().saturating_sub(1) as f32 * gap;

        if self.scroll_config(element_index).is_some() {
            let element_id = element.id;
            if let Some(data) = self
                .scroll_container_datas
                .iter_mut()
                .find(|data| data.element_id == element_id && data.open_this_frame)
            {
                data.content_size = Dimensions::new(
                    content.width + config.padding.along(true),
                    content.height + config.padding.along(false),
                );
            }
        }

        let padding = config.padding;
        let extra_space = element.dimensions.along(along_x) - padding.along(along_x)
            - content.along(along_x);
        let mut cursor = if along_x {
            padding.left as f32 + config.child_alignment.x.leading_share(extra_space)
        } else {
            padding.top as f32 + config.child_alignment.y.leading_share(extra_space)
        };

        for position in children {
            let child_index = self.layout_element_children[position];
            let child = self.layout_elements[child_index].dimensions;
            let (x, y) = if along_x {
                let whitespace = element.dimensions.height - padding.along(false) - child.height;
                (
                    cursor,
                    padding.top as f32 + config.child_alignment.y.leading_share(whitespace),
                )
            } else {
                let whitespace = element.dimensions.width - padding.along(true) - child.width;
                (
                    padding.left as f32 + config.child_alignment.x.leading_share(whitespace),
                    cursor,
                )
            };
            child_visits.push(Visit::Enter {
                element_index: child_index,
                position: Vector2::new(
                    origin.x + x + scroll_offset.x,
                    origin.y + y + scroll_offset.y,
                ),
            });
            cursor += child.along(along_x) + gap;
        }
    }

    /// Emits everything drawn above the element's children.
    fn exit_element(
        &mut self,
        element_index: usize,
        bounding_box: BoundingBox,
        scroll_offset: Vector2,
        z_index: i16,
        root_children: u32,
    ) {
        let element = self.layout_elements[element_index];
        let children_length = element.children_length() as u32;

        if let Some(border) = self.border_config(element_index).copied() {
            let shared: SharedConfig = self
                .shared_config(element_index)
                .copied()
                .unwrap_or_default();
            self.add_render_command(RenderCommand {
                bounding_box,
                config: RenderCommandConfig::Border(Border {
                    color: border.color,
                    corner_radii: shared.corner_radius,
                    width: border.width,
                }),
                id: hash_number(element.id, children_length).id,
                z_index,
                user_data: shared.user_data,
            });

            if border.width.between_children > 0 && border.color.is_visible() {
                let config = *self.layout_config(element_index);
                let along_x = config.layout_direction.is_along(true);
                let half_gap = config.child_gap as f32 / 2.0;
                let thickness = border.width.between_children as f32;
                let mut border_offset = if along_x {
                    config.padding.left as f32 - half_gap
                } else {
                    config.padding.top as f32 - half_gap
                };
                let children = self.children_range(element_index);
                for (i, position) in children.enumerate() {
                    let child_index = self.layout_element_children[position];
                    if i > 0 {
                        let separator = if along_x {
                            BoundingBox::new(
                                bounding_box.x + border_offset + scroll_offset.x,
                                bounding_box.y + scroll_offset.y,
                                thickness,
                                element.dimensions.height,
                            )
                        } else {
                            BoundingBox::new(
                                bounding_box.x + scroll_offset.x,
                                bounding_box.y + border_offset + scroll_offset.y,
                                element.dimensions.width,
                                thickness,
                            )
                        };
                        self.add_render_command(RenderCommand {
                            bounding_box: separator,
                            config: RenderCommandConfig::Rectangle(Rectangle {
                                color: border.color,
                                corner_radii: CornerRadius::default(),
                            }),
                            id: hash_number(element.id, children_length + 1 + i as u32).id,
                            z_index,
                            user_data: shared.user_data,
                        });
                    }
                    border_offset += self.layout_elements[child_index]
                        .dimensions
                        .along(along_x)
                        + config.child_gap as f32;
                }
            }
        }

        if self.scroll_config(element_index).is_some() {
            self.add_render_command(RenderCommand {
                bounding_box: BoundingBox::default(),
                config: RenderCommandConfig::ScissorEnd,
                id: hash_number(element.id, root_children + 11).id,
                z_index,
                user_data: 0,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{collect_errors, context};
    use super::super::{LayoutContext, Settings};
    use crate::align::{AlignX, AlignY};
    use crate::color::Color;
    use crate::elements::{
        BorderConfig, BorderWidth, ElementDeclaration, FloatingAttachPoints, FloatingConfig,
        ScrollConfig,
    };
    use crate::errors::ErrorType;
    use crate::id::Id;
    use crate::layout::{ChildAlignment, LayoutConfig, LayoutDirection, Sizing, SizingConfig};
    use crate::math::{BoundingBox, Dimensions};
    use crate::render_commands::{RenderCommandConfig, RenderCommandType};

    const RED: Color = Color::rgb(255.0, 0.0, 0.0);

    fn block(width: f32, height: f32) -> ElementDeclaration {
        ElementDeclaration {
            layout: LayoutConfig {
                sizing: SizingConfig {
                    width: Sizing::Fixed(width).into(),
                    height: Sizing::Fixed(height).into(),
                },
                ..Default::default()
            },
            background_color: RED,
            ..Default::default()
        }
    }

    fn leaf(ctx: &mut LayoutContext, declaration: &ElementDeclaration) {
        ctx.open_element();
        ctx.configure_open_element(declaration);
        ctx.close_element();
    }

    #[test]
    fn children_are_aligned_along_and_across() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element();
        let mut parent = block(100.0, 100.0);
        parent.background_color = Color::TRANSPARENT;
        parent.layout.child_alignment = ChildAlignment {
            x: AlignX::Right,
            y: AlignY::CenterY,
        };
        ctx.configure_open_element(&parent);
        leaf(&mut ctx, &block(20.0, 10.0));
        leaf(&mut ctx, &block(30.0, 20.0));
        ctx.close_element();
        let commands = ctx.end_layout();

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].bounding_box, BoundingBox::new(50.0, 45.0, 20.0, 10.0));
        assert_eq!(commands[1].bounding_box, BoundingBox::new(70.0, 40.0, 30.0, 20.0));
    }

    #[test]
    fn floating_roots_sort_by_z_and_anchor_to_parent() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element_with_id(&Id::new("Anchor"));
        ctx.configure_open_element(&block(100.0, 40.0));
        ctx.open_element();
        let mut tooltip = block(20.0, 10.0);
        tooltip.floating = Some(FloatingConfig {
            z_index: 5,
            attach_points: FloatingAttachPoints {
                element_x: AlignX::CenterX,
                element_y: AlignY::Top,
                parent_x: AlignX::CenterX,
                parent_y: AlignY::Bottom,
            },
            offset: (0.0, -2.0).into(),
            ..Default::default()
        });
        ctx.configure_open_element(&tooltip);
        ctx.close_element();
        ctx.close_element();
        let commands = ctx.end_layout();

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].z_index, 0);
        assert_eq!(commands[1].z_index, 5);
        assert_eq!(commands[1].bounding_box, BoundingBox::new(40.0, 38.0, 20.0, 10.0));
    }

    #[test]
    fn scroll_container_brackets_children_with_scissors() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element_with_id(&Id::new("List"));
        let mut list = block(100.0, 50.0);
        list.background_color = Color::TRANSPARENT;
        list.layout.layout_direction = LayoutDirection::TopToBottom;
        list.scroll = Some(ScrollConfig {
            vertical: true,
            ..Default::default()
        });
        ctx.configure_open_element(&list);
        for _ in 0..3 {
            leaf(&mut ctx, &block(100.0, 40.0));
        }
        ctx.close_element();
        let types: Vec<_> = ctx
            .end_layout()
            .iter()
            .map(|command| command.command_type())
            .collect();

        assert_eq!(
            types,
            vec![
                RenderCommandType::ScissorStart,
                RenderCommandType::Rectangle,
                RenderCommandType::Rectangle,
                RenderCommandType::Rectangle,
                RenderCommandType::ScissorEnd,
            ]
        );
        let data = ctx.get_scroll_container_data(&Id::new("List"));
        assert!(data.found);
        assert_eq!(data.content_dimensions, Dimensions::new(100.0, 120.0));
        assert_eq!(data.scroll_container_dimensions, Dimensions::new(100.0, 50.0));
    }

    #[test]
    fn borders_follow_children_and_separate_them() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element();
        let mut row = block(100.0, 20.0);
        row.background_color = Color::TRANSPARENT;
        row.layout.child_gap = 10;
        row.border = Some(BorderConfig {
            color: RED,
            width: BorderWidth {
                left: 1,
                right: 1,
                top: 1,
                bottom: 1,
                between_children: 2,
            },
        });
        ctx.configure_open_element(&row);
        leaf(&mut ctx, &block(30.0, 20.0));
        leaf(&mut ctx, &block(30.0, 20.0));
        ctx.close_element();
        let commands = ctx.end_layout();

        assert_eq!(commands.len(), 4);
        assert_eq!(commands[2].command_type(), RenderCommandType::Border);
        match &commands[3].config {
            RenderCommandConfig::Rectangle(rect) => assert_eq!(rect.color, RED),
            _ => panic!("Expected a separator rectangle"),
        }
        assert_eq!(commands[3].bounding_box, BoundingBox::new(35.0, 0.0, 2.0, 20.0));
    }

    #[test]
    fn offscreen_elements_are_culled_unless_disabled() {
        for culling in [true, false] {
            let mut ctx = context(100.0, 100.0);
            ctx.set_culling_enabled(culling);
            ctx.begin_layout();
            ctx.open_element();
            let mut column = block(100.0, 300.0);
            column.background_color = Color::TRANSPARENT;
            column.layout.layout_direction = LayoutDirection::TopToBottom;
            ctx.configure_open_element(&column);
            leaf(&mut ctx, &block(100.0, 150.0));
            leaf(&mut ctx, &block(100.0, 150.0));
            ctx.close_element();
            let expected = if culling { 1 } else { 2 };
            assert_eq!(ctx.end_layout().len(), expected);
        }
    }

    #[test]
    fn text_lines_are_emitted_per_line() {
        let mut ctx = context(800.0, 600.0);
        ctx.begin_layout();
        ctx.open_element();
        ctx.configure_open_element(&ElementDeclaration {
            layout: LayoutConfig {
                sizing: SizingConfig {
                    width: Sizing::Fixed(60.0).into(),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        });
        let mut config = crate::text::TextConfig::default();
        config.alignment = AlignX::Right;
        ctx.open_text_element("aa bb cc".into(), config);
        ctx.close_element();
        let commands = ctx.end_layout();

        let lines: Vec<_> = commands
            .iter()
            .map(|command| match &command.config {
                RenderCommandConfig::Text(text) => (text.text.to_string(), command.bounding_box),
                _ => panic!("Expected text"),
            })
            .collect();
        assert_eq!(
            lines,
            vec![
                ("aa bb".to_string(), BoundingBox::new(10.0, 0.0, 50.0, 20.0)),
                ("cc".to_string(), BoundingBox::new(40.0, 20.0, 20.0, 20.0)),
            ]
        );
    }

    #[test]
    fn render_command_capacity_is_reported_once() {
        let mut ctx: LayoutContext = LayoutContext::with_settings(
            Dimensions::new(800.0, 600.0),
            Settings {
                max_render_command_count: 2,
                ..Default::default()
            },
        );
        let errors = collect_errors(&mut ctx);
        ctx.begin_layout();
        for _ in 0..4 {
            leaf(&mut ctx, &block(10.0, 10.0));
        }
        assert_eq!(ctx.end_layout().len(), 2);
        assert_eq!(
            *errors.borrow(),
            vec![ErrorType::RenderCommandsCapacityExceeded]
        );
    }
}
