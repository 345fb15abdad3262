use std::borrow::Cow;

use crate::id::{finalize, mix};
use crate::math::Dimensions;
use crate::text::TextConfig;

pub(crate) type MeasureTextFn = dyn Fn(&str, &TextConfig) -> Dimensions;

/// One whitespace-delimited run of a measured text.
///
/// A run that ended in a space includes that space in `length` and `width`. A zero `length`
/// marks a line break; its `start_offset` is the first byte after the `'\n'`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct MeasuredWord {
    pub start_offset: usize,
    pub length: usize,
    pub width: f32,
    pub next: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MeasureTextCacheItem {
    pub unwrapped_dimensions: Dimensions,
    pub measured_words_start: Option<usize>,
    /// Width of the widest single word.
    pub min_width: f32,
    pub space_width: f32,
    pub contains_newlines: bool,
    pub id: u32,
    /// Next item in the same bucket.
    pub next_index: Option<usize>,
    pub generation: u32,
}

/// Cache key for `text` measured with `config`.
///
/// Borrowed static text is keyed on its address, which is stable for string literals. Owned text,
/// or any text when `hash_string_contents` is set, is keyed on its bytes.
pub(crate) fn text_cache_key(text: &Cow<'static, str>, config: &TextConfig) -> u32 {
    let mut hash = 0u32;
    match text {
        Cow::Borrowed(text) if !config.hash_string_contents => {
            let address = text.as_ptr() as usize as u64;
            hash = mix(hash, address as u32);
            hash = mix(hash, (address >> 32) as u32);
        }
        _ => {
            hash = text.bytes().fold(hash, |hash, byte| mix(hash, byte as u32));
        }
    }
    hash = mix(hash, text.len() as u32);
    hash = mix(hash, config.font_id as u32);
    hash = mix(hash, config.font_size as u32);
    hash = mix(hash, config.line_height as u32);
    hash = mix(hash, config.letter_spacing as u32);
    hash = mix(hash, config.wrap_mode as u32);
    finalize(hash).wrapping_add(1)
}

/// Generation-stamped text measurements with pooled word storage.
///
/// Entries live in bucket chains. Lookups unlink any entry they pass that has not been touched for
/// more than two generations, returning its slot and words to the free lists.
pub(crate) struct MeasureTextCache {
    buckets: Vec<Option<usize>>,
    items: Vec<MeasureTextCacheItem>,
    item_free_list: Vec<usize>,
    words: Vec<MeasuredWord>,
    word_free_list: Vec<usize>,
    max_items: usize,
    max_words: usize,
}

impl MeasureTextCache {
    pub fn new(max_items: usize, max_words: usize) -> Self {
        Self {
            buckets: vec![None; (max_words / 32).max(1)],
            items: Vec::with_capacity(max_items),
            item_free_list: Vec::new(),
            words: Vec::with_capacity(max_words),
            word_free_list: Vec::new(),
            max_items,
            max_words,
        }
    }

    #[inline]
    pub fn item(&self, index: usize) -> &MeasureTextCacheItem {
        &self.items[index]
    }

    pub fn words<'a>(
        &'a self,
        item: &MeasureTextCacheItem,
    ) -> impl Iterator<Item = &'a MeasuredWord> + 'a {
        std::iter::successors(item.measured_words_start.map(|i| &self.words[i]), |word| {
            word.next.map(|i| &self.words[i])
        })
    }

    /// Returns the index of the entry for `key`, measuring `text` on a miss.
    ///
    /// `None` means the slot or word pool is exhausted; nothing is left allocated in that case.
    pub fn measure(
        &mut self,
        text: &str,
        key: u32,
        config: &TextConfig,
        generation: u32,
        measure: &MeasureTextFn,
    ) -> Option<usize> {
        let bucket = key as usize % self.buckets.len();
        let mut element_index = self.buckets[bucket];
        let mut previous: Option<usize> = None;

        while let Some(index) = element_index {
            let item = &mut self.items[index];
            if item.id == key {
                item.generation = generation;
                log::trace!("text cache hit {key:#010x}");
                return Some(index);
            }
            let next = item.next_index;
            if generation.wrapping_sub(item.generation) > 2 {
                self.evict(index);
                match previous {
                    Some(previous) => self.items[previous].next_index = next,
                    None => self.buckets[bucket] = next,
                }
            } else {
                previous = Some(index);
            }
            element_index = next;
        }

        let index = self.allocate_item()?;
        let Some(mut item) = self.measure_words(text, config, measure) else {
            self.item_free_list.push(index);
            return None;
        };
        item.id = key;
        item.generation = generation;
        self.items[index] = item;
        match previous {
            Some(previous) => self.items[previous].next_index = Some(index),
            None => self.buckets[bucket] = Some(index),
        }
        Some(index)
    }

    fn allocate_item(&mut self) -> Option<usize> {
        if let Some(index) = self.item_free_list.pop() {
            return Some(index);
        }
        if self.items.len() < self.max_items {
            self.items.push(MeasureTextCacheItem::default());
            return Some(self.items.len() - 1);
        }
        None
    }

    fn evict(&mut self, index: usize) {
        let item = self.items[index];
        log::trace!("text cache evict {:#010x}", item.id);
        let mut word_index = item.measured_words_start;
        while let Some(current) = word_index {
            self.word_free_list.push(current);
            word_index = self.words[current].next;
        }
        self.items[index] = MeasureTextCacheItem::default();
        self.item_free_list.push(index);
    }

    fn measure_words(
        &mut self,
        text: &str,
        config: &TextConfig,
        measure: &MeasureTextFn,
    ) -> Option<MeasureTextCacheItem> {
        let letter_spacing = config.letter_spacing as f32;
        let space_width = measure(" ", config).width;

        let mut measured = Vec::new();
        let mut start = 0;
        let mut line_width = 0.0f32;
        let mut measured_width = 0.0f32;
        let mut measured_height = 0.0f32;
        let mut min_width = 0.0f32;
        let mut contains_newlines = false;

        for (end, byte) in text.bytes().enumerate() {
            if byte != b' ' && byte != b'\n' {
                continue;
            }
            let length = end - start;
            let mut dimensions = if length > 0 {
                measure(&text[start..end], config)
            } else {
                Dimensions::default()
            };
            min_width = min_width.max(dimensions.width);
            measured_height = measured_height.max(dimensions.height);

            if byte == b' ' {
                dimensions.width += space_width;
                measured.push(MeasuredWord {
                    start_offset: start,
                    length: length + 1,
                    width: dimensions.width,
                    next: None,
                });
                line_width += dimensions.width + letter_spacing;
            } else {
                if length > 0 {
                    measured.push(MeasuredWord {
                        start_offset: start,
                        length,
                        width: dimensions.width,
                        next: None,
                    });
                    line_width += dimensions.width + letter_spacing;
                }
                measured.push(MeasuredWord {
                    start_offset: end + 1,
                    length: 0,
                    width: 0.0,
                    next: None,
                });
                measured_width = measured_width.max(line_width);
                contains_newlines = true;
                line_width = 0.0;
            }
            start = end + 1;
        }

        if start < text.len() {
            let dimensions = measure(&text[start..], config);
            measured.push(MeasuredWord {
                start_offset: start,
                length: text.len() - start,
                width: dimensions.width,
                next: None,
            });
            line_width += dimensions.width + letter_spacing;
            measured_height = measured_height.max(dimensions.height);
            min_width = min_width.max(dimensions.width);
        }
        measured_width = (measured_width.max(line_width) - letter_spacing).max(0.0);

        let available = self.word_free_list.len() + (self.max_words - self.words.len());
        if measured.len() > available {
            return None;
        }

        let mut first = None;
        let mut previous: Option<usize> = None;
        for word in measured {
            let index = match self.word_free_list.pop() {
                Some(index) => {
                    self.words[index] = word;
                    index
                }
                None => {
                    self.words.push(word);
                    self.words.len() - 1
                }
            };
            match previous {
                Some(previous) => self.words[previous].next = Some(index),
                None => first = Some(index),
            }
            previous = Some(index);
        }

        Some(MeasureTextCacheItem {
            unwrapped_dimensions: Dimensions::new(measured_width, measured_height),
            measured_words_start: first,
            min_width,
            space_width,
            contains_newlines,
            ..Default::default()
        })
    }

    #[cfg(test)]
    fn words_in_use(&self) -> usize {
        self.words.len() - self.word_free_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_measure() -> (Rc<Cell<usize>>, Box<MeasureTextFn>) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let measure = Box::new(move |text: &str, _: &TextConfig| {
            counter.set(counter.get() + 1);
            Dimensions::new(text.len() as f32 * 10.0, 20.0)
        });
        (calls, measure)
    }

    #[test]
    fn splits_on_spaces_and_newlines() {
        let (_, measure) = counting_measure();
        let mut cache = MeasureTextCache::new(16, 64);
        let config = TextConfig::default();
        let text = "ab cd\nef";
        let index = cache.measure(text, 1, &config, 0, &measure).unwrap();
        let item = *cache.item(index);
        let words: Vec<_> = cache
            .words(&item)
            .map(|w| (w.start_offset, w.length, w.width))
            .collect();
        assert_eq!(
            words,
            vec![(0, 3, 30.0), (3, 2, 20.0), (6, 0, 0.0), (6, 2, 20.0)]
        );
        assert!(item.contains_newlines);
        assert_eq!(item.unwrapped_dimensions, Dimensions::new(50.0, 20.0));
        assert_eq!(item.min_width, 20.0);
        assert_eq!(item.space_width, 10.0);
    }

    #[test]
    fn hit_skips_measurement() {
        let (calls, measure) = counting_measure();
        let mut cache = MeasureTextCache::new(16, 64);
        let config = TextConfig::default();
        let first = cache.measure("Hello world", 9, &config, 1, &measure).unwrap();
        let after_miss = calls.get();
        let second = cache.measure("Hello world", 9, &config, 2, &measure).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), after_miss);
        assert_eq!(cache.item(second).generation, 2);
    }

    #[test]
    fn stale_entries_are_evicted_during_lookup() {
        let (_, measure) = counting_measure();
        // Single bucket so every key shares one chain.
        let mut cache = MeasureTextCache::new(1, 8);
        let config = TextConfig::default();

        let old = cache.measure("one two", 1, &config, 0, &measure).unwrap();
        assert_eq!(cache.words_in_use(), 2);
        // Slot capacity is one, so a second key only fits once the first is stale.
        assert!(cache.measure("three", 2, &config, 2, &measure).is_none());
        let reused = cache.measure("three", 2, &config, 3, &measure).unwrap();
        assert_eq!(old, reused);
        assert_eq!(cache.words_in_use(), 1);
    }

    #[test]
    fn word_pool_overflow_leaves_nothing_allocated() {
        let (_, measure) = counting_measure();
        let mut cache = MeasureTextCache::new(4, 2);
        let config = TextConfig::default();
        assert!(cache.measure("a b c", 1, &config, 0, &measure).is_none());
        assert_eq!(cache.words_in_use(), 0);
        assert!(cache.measure("a b", 2, &config, 0, &measure).is_some());
    }

    #[test]
    fn key_depends_on_config_and_storage() {
        let config = TextConfig::default();
        let mut sized = config;
        sized.font_size = 24;
        let literal: Cow<'static, str> = Cow::Borrowed("label");
        assert_ne!(text_cache_key(&literal, &config), text_cache_key(&literal, &sized));

        let owned_a: Cow<'static, str> = Cow::Owned("label".to_string());
        let owned_b: Cow<'static, str> = Cow::Owned("label".to_string());
        assert_eq!(
            text_cache_key(&owned_a, &config),
            text_cache_key(&owned_b, &config)
        );

        let mut by_contents = config;
        by_contents.hash_string_contents = true;
        assert_eq!(
            text_cache_key(&literal, &by_contents),
            text_cache_key(&owned_a, &by_contents)
        );
    }
}
