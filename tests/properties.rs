use proptest::prelude::*;

use ply_layout::engine::Settings;
use ply_layout::id::{hash_number, hash_string, Id};
use ply_layout::prelude::*;

const CHAR_WIDTH: f32 = 10.0;

fn ply(settings: Settings) -> Ply {
    let mut ply = Ply::with_settings(Dimensions::new(4000.0, 4000.0), settings);
    ply.set_measure_text_function(|text, _| Dimensions::new(text.len() as f32 * CHAR_WIDTH, 20.0));
    ply
}

#[derive(Debug, Clone, Copy)]
struct Child {
    grow: bool,
    min: f32,
    max: f32,
    /// Words of `word_len` letters, laid out inside the child as one text element.
    words: usize,
    word_len: usize,
}

impl Child {
    fn sizing(self) -> Sizing {
        if self.grow {
            Sizing::Grow(self.min, self.max)
        } else {
            Sizing::Fit(self.min, self.max)
        }
    }

    fn text(self) -> String {
        vec!["a".repeat(self.word_len); self.words].join(" ")
    }

    /// Narrowest width the solver may give the child: its longest word, within its bounds.
    fn floor(self) -> f32 {
        (self.word_len as f32 * CHAR_WIDTH).max(self.min).min(self.max)
    }

    /// Width before any shrinking: the unwrapped text, within its bounds.
    fn preferred(self) -> f32 {
        let chars = self.words * self.word_len + self.words - 1;
        (chars as f32 * CHAR_WIDTH).max(self.min).min(self.max)
    }
}

fn child_strategy() -> impl Strategy<Value = Child> {
    (0u16..60, 1u16..300, any::<bool>(), 1usize..6, 1usize..6).prop_map(
        |(min, extra, grow, words, word_len)| Child {
            grow,
            min: min as f32,
            max: (min + extra) as f32,
            words,
            word_len,
        },
    )
}

#[derive(Debug, Clone, Copy)]
enum Input {
    Wheel(f32),
    Press(f32),
    Release,
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        (-200.0f32..200.0).prop_map(Input::Wheel),
        (0.0f32..50.0).prop_map(Input::Press),
        Just(Input::Release),
    ]
}

fn declare_scroll_list(ply: &mut Ply, rows: u32) {
    let mut ui = ply.begin();
    ui.element()
        .id("List")
        .width(fixed!(100.0))
        .height(fixed!(50.0))
        .scroll(false, true)
        .layout(|l| l.direction(TopToBottom))
        .children(|ui| {
            for _ in 0..rows {
                ui.element().width(grow!()).height(fixed!(30.0)).empty();
            }
        });
    ui.end();
}

proptest! {
    #[test]
    fn hashing_is_deterministic(label in "[a-zA-Z0-9_]{0,24}", offset in any::<u32>(), seed in any::<u32>()) {
        let first = hash_string(label.clone(), offset, seed);
        let second = hash_string(label.clone(), offset, seed);
        prop_assert_eq!(first.id, second.id);
        prop_assert_eq!(first.base_id, second.base_id);
        prop_assert_eq!(hash_number(offset, seed).id, hash_number(offset, seed).id);
        prop_assert_eq!(Id::new_index(label.clone(), offset), Id::new_index(label, offset));
    }

    #[test]
    fn row_children_respect_bounds_and_parent(
        children in prop::collection::vec(child_strategy(), 1..8),
        gap in 0u16..12,
        padding in 0u16..12,
        slack in -300.0f32..300.0,
    ) {
        let spacing = gap as f32 * (children.len() - 1) as f32 + padding as f32 * 2.0;
        let floor_total: f32 = children.iter().map(|child| child.floor()).sum::<f32>() + spacing;
        let parent_width = (floor_total + slack).max(1.0).ceil();

        let mut ply = ply(Settings { culling_enabled: false, ..Default::default() });
        let mut ui = ply.begin();
        ui.element()
            .width(fixed!(parent_width))
            .height(fixed!(20.0))
            .layout(|l| l.gap(gap).padding(Padding::horizontal(padding)))
            .children(|ui| {
                for (i, child) in children.iter().enumerate() {
                    let text = child.text();
                    ui.element()
                        .id(("Child", i as u32))
                        .width(child.sizing())
                        .children(|ui| ui.text(text, |t| t.wrap_mode(WrapMode::Words)));
                }
            });
        ui.end();

        let preferred_total: f32 =
            children.iter().map(|child| child.preferred()).sum::<f32>() + spacing;
        let mut used = spacing;
        for (i, child) in children.iter().enumerate() {
            let width = ply.bounding_box(("Child", i as u32)).map(|b| b.width);
            prop_assert!(width.is_some());
            let width = width.unwrap_or_default();
            prop_assert!(width >= child.min - 0.05, "child {} width {} below min {}", i, width, child.min);
            prop_assert!(width >= child.floor() - 0.05, "child {} width {} below {}", i, width, child.floor());
            prop_assert!(width <= child.max + 0.05, "child {} width {} above max {}", i, width, child.max);
            if preferred_total > parent_width && !child.grow {
                prop_assert!(width <= child.preferred() + 0.05, "child {} grew while shrinking", i);
            }
            used += width;
        }
        if parent_width >= floor_total {
            prop_assert!(used <= parent_width + 0.05, "children use {} of {}", used, parent_width);
        }
    }

    #[test]
    fn wrapping_keeps_every_character_and_fits_the_width(
        words in prop::collection::vec("[a-z]{1,8}", 1..16),
        width in 30.0f32..300.0,
    ) {
        let text = words.join(" ");
        let longest = words.iter().map(|word| word.len()).max().unwrap_or(0) as f32 * CHAR_WIDTH;
        let limit = width.max(longest);

        let mut ply = ply(Settings { culling_enabled: false, ..Default::default() });
        let mut ui = ply.begin();
        let owned = text.clone();
        ui.element().width(fixed!(width)).children(|ui| {
            ui.text(owned, |t| t.wrap_mode(WrapMode::Words));
        });
        let commands = ui.end();

        let mut rebuilt = String::new();
        for command in commands {
            if let RenderCommandConfig::Text(line) = &command.config {
                let trimmed = line.text.trim_end();
                prop_assert!(
                    command.bounding_box.width <= limit + 0.01 || !trimmed.contains(' '),
                    "line {:?} is {} wide in {}", line.text, command.bounding_box.width, limit
                );
                rebuilt.push_str(&line.text);
            }
        }
        prop_assert_eq!(rebuilt.replace(' ', ""), text.replace(' ', ""));
    }

    #[test]
    fn scroll_position_stays_clamped(
        rows in 0u32..8,
        inputs in prop::collection::vec(input_strategy(), 1..24),
    ) {
        let mut ply = ply(Settings::default());
        for input in inputs {
            declare_scroll_list(&mut ply, rows);
            match input {
                Input::Wheel(delta) => {
                    ply.pointer_state(Vector2::new(50.0, 25.0), false);
                    ply.update_scroll_containers(true, Vector2::new(0.0, delta), 0.016);
                }
                Input::Press(y) => {
                    ply.pointer_state(Vector2::new(50.0, y), true);
                    ply.update_scroll_containers(true, Vector2::default(), 0.016);
                }
                Input::Release => {
                    ply.pointer_state(Vector2::new(50.0, 25.0), false);
                    ply.update_scroll_containers(true, Vector2::default(), 0.016);
                }
            }

            let data = ply.scroll_container_data("List");
            prop_assert!(data.is_some());
            let data = data.unwrap_or_default();
            let min_y = -(data.content_dimensions.height - data.scroll_container_dimensions.height).max(0.0);
            prop_assert!(data.scroll_position.y <= 0.0);
            prop_assert!(data.scroll_position.y >= min_y - 0.01);
            prop_assert_eq!(data.scroll_position.x, 0.0);
        }
    }
}
