use super::text_cache::MeasuredWord;
use super::{LayoutContext, WrappedTextLine};
use crate::errors::ErrorType;
use crate::math::Dimensions;
use crate::text::WrapMode;

struct LineMetrics {
    container_width: f32,
    line_height: f32,
    letter_spacing: f32,
    space_width: f32,
}

/// Breaks a measured word list into lines no wider than the container, appending them to `lines`
/// until it holds `max_lines`.
///
/// Returns `false` when lines were dropped at the cap.
fn wrap_words<'a>(
    text: &str,
    words: impl Iterator<Item = &'a MeasuredWord>,
    metrics: &LineMetrics,
    lines: &mut Vec<WrappedTextLine>,
    max_lines: usize,
) -> bool {
    let mut line_width = 0.0f32;
    let mut line_length = 0usize;
    let mut line_start = 0usize;
    let mut words = words.peekable();

    while let Some(word) = words.peek().copied() {
        if lines.len() >= max_lines {
            return false;
        }
        if line_length == 0 && line_width + word.width > metrics.container_width {
            // A lone word wider than the container gets a line of its own.
            lines.push(WrappedTextLine {
                dimensions: Dimensions::new(word.width, metrics.line_height),
                start: word.start_offset,
                length: word.length,
            });
            words.next();
            line_start = word.start_offset + word.length;
        } else if word.length == 0 || line_width + word.width > metrics.container_width {
            let final_char_is_space =
                line_length > 0 && text.as_bytes()[line_start + line_length - 1] == b' ';
            let (width, length) = if final_char_is_space {
                (line_width - metrics.space_width, line_length - 1)
            } else {
                (line_width, line_length)
            };
            lines.push(WrappedTextLine {
                dimensions: Dimensions::new(width, metrics.line_height),
                start: line_start,
                length,
            });
            if line_length == 0 || word.length == 0 {
                words.next();
            }
            line_width = 0.0;
            line_length = 0;
            line_start = word.start_offset;
        } else {
            line_width += word.width + metrics.letter_spacing;
            line_length += word.length;
            words.next();
        }
    }

    if line_length == 0 {
        return true;
    }
    if lines.len() >= max_lines {
        return false;
    }
    lines.push(WrappedTextLine {
        dimensions: Dimensions::new(line_width - metrics.letter_spacing, metrics.line_height),
        start: line_start,
        length: line_length,
    });
    true
}

impl<CustomElementData: Clone + std::fmt::Debug> LayoutContext<CustomElementData> {
    /// Splits every text element into lines for its final width and sets its height to the
    /// height of those lines.
    pub(crate) fn wrap_text(&mut self) {
        let max_lines = self.settings().max_element_count;
        let mut all_lines_kept = true;

        for data_index in 0..self.text_element_data.len() {
            let data = &self.text_element_data[data_index];
            let element_index = data.element_index;
            let Some(config) = self.text_config(element_index).copied() else {
                continue;
            };
            let container = self.layout_elements[element_index].dimensions;
            let line_height = config.line_height_or(data.preferred_dimensions.height);

            let lines_start = self.wrapped_text_lines.len();
            let item = data.cache_item.map(|index| *self.text_cache.item(index));
            let container_width = match config.wrap_mode {
                WrapMode::Newline => f32::MAX,
                _ => container.width,
            };

            let single_line = match (&item, config.wrap_mode) {
                (None, _) | (_, WrapMode::None) => true,
                (Some(item), _) => {
                    !item.contains_newlines && data.preferred_dimensions.width <= container_width
                }
            };

            if single_line {
                if self.wrapped_text_lines.len() < max_lines {
                    self.wrapped_text_lines.push(WrappedTextLine {
                        dimensions: Dimensions::new(container.width, line_height),
                        start: 0,
                        length: data.text.len(),
                    });
                } else {
                    all_lines_kept = false;
                }
            } else if let Some(item) = item {
                let metrics = LineMetrics {
                    container_width,
                    line_height,
                    letter_spacing: config.letter_spacing as f32,
                    space_width: item.space_width,
                };
                all_lines_kept &= wrap_words(
                    &data.text,
                    self.text_cache.words(&item),
                    &metrics,
                    &mut self.wrapped_text_lines,
                    max_lines,
                );
            }

            let lines = lines_start..self.wrapped_text_lines.len();
            self.layout_elements[element_index].dimensions.height =
                line_height * lines.len() as f32;
            self.text_element_data[data_index].wrapped_lines = lines;
        }

        if !all_lines_kept && !self.boolean_warnings.max_wrapped_lines_exceeded {
            self.boolean_warnings.max_wrapped_lines_exceeded = true;
            self.report(
                ErrorType::ElementsCapacityExceeded,
                format!(
                    "Wrapped text needs more than {max_lines} lines; the rest were dropped. \
                     Raise Settings::max_element_count."
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(triples: &[(usize, usize, f32)]) -> Vec<MeasuredWord> {
        triples.iter()
            .map(|&(start_offset, length, width)| MeasuredWord {
                start_offset,
                length,
                width,
                next: None,
            })
            .collect()
    }

    fn metrics(container_width: f32) -> LineMetrics {
        LineMetrics {
            container_width,
            line_height: 20.0,
            letter_spacing: 0.0,
            space_width: 10.0,
        }
    }

    fn wrap(text: &str, measured: &[MeasuredWord], width: f32) -> Vec<(String, f32)> {
        let mut lines = Vec::new();
        wrap_words(text, measured.iter(), &metrics(width), &mut lines, 100);
        lines
            .iter()
            .map(|line| {
                (
                    text[line.start..line.start + line.length].to_string(),
                    line.dimensions.width,
                )
            })
            .collect()
    }

    #[test]
    fn breaks_before_overflowing_word_and_trims_space() {
        // "aa bb cc" at 10 px per byte.
        let measured = words(&[(0, 3, 30.0), (3, 3, 30.0), (6, 2, 20.0)]);
        assert_eq!(
            wrap("aa bb cc", &measured, 60.0),
            vec![("aa bb".to_string(), 50.0), ("cc".to_string(), 20.0)]
        );
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let measured = words(&[(0, 11, 110.0), (11, 2, 20.0)]);
        assert_eq!(
            wrap("abcdefghij ok", &measured, 50.0),
            vec![("abcdefghij ".to_string(), 110.0), ("ok".to_string(), 20.0)]
        );
    }

    #[test]
    fn newline_markers_flush_and_blank_lines_survive() {
        // "ab\n\ncd"
        let measured = words(&[(0, 2, 20.0), (3, 0, 0.0), (4, 0, 0.0), (4, 2, 20.0)]);
        assert_eq!(
            wrap("ab\n\ncd", &measured, 500.0),
            vec![
                ("ab".to_string(), 20.0),
                (String::new(), 0.0),
                ("cd".to_string(), 20.0)
            ]
        );
    }

    #[test]
    fn line_count_is_capped() {
        let measured = words(&[(0, 2, 20.0), (2, 2, 20.0), (4, 2, 20.0)]);
        let mut lines = Vec::new();
        assert!(!wrap_words("a b c ", measured.iter(), &metrics(5.0), &mut lines, 2));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn dropped_lines_are_reported_once() {
        use super::super::tests::collect_errors;
        use crate::elements::ElementDeclaration;
        use crate::engine::Settings;
        use crate::layout::{LayoutConfig, Sizing, SizingConfig};
        use crate::text::TextConfig;
        use std::borrow::Cow;

        let mut ctx: LayoutContext = LayoutContext::with_settings(
            Dimensions::new(800.0, 600.0),
            Settings {
                max_element_count: 3,
                ..Default::default()
            },
        );
        ctx.set_measure_text_function(Box::new(|text: &str, _: &TextConfig| {
            Dimensions::new(text.len() as f32 * 10.0, 20.0)
        }));
        let errors = collect_errors(&mut ctx);

        ctx.begin_layout();
        ctx.open_element();
        ctx.configure_open_element(&ElementDeclaration {
            layout: LayoutConfig {
                sizing: SizingConfig {
                    width: Sizing::Fixed(30.0).into(),
                    height: Sizing::Fit(0.0, 0.0).into(),
                },
                ..Default::default()
            },
            ..Default::default()
        });
        ctx.open_text_element(Cow::Borrowed("aa bb cc dd"), TextConfig::default());
        ctx.open_text_element(Cow::Borrowed("ee ff"), TextConfig::default());
        ctx.close_element();
        ctx.end_layout();

        assert_eq!(*errors.borrow(), vec![crate::errors::ErrorType::ElementsCapacityExceeded]);
        assert_eq!(ctx.wrapped_text_lines.len(), 3);
    }
}
