use rustc_hash::FxHashMap;

use super::PointerData;
use crate::id::Id;
use crate::math::BoundingBox;

pub(crate) type HoverCallback = Box<dyn FnMut(Id, PointerData)>;

/// Per-id record that outlives the frame that created it.
pub(crate) struct RegistryItem {
    pub element_id: Id,
    pub bounding_box: BoundingBox,
    pub layout_element_index: usize,
    pub on_hover: Option<HoverCallback>,
    /// Frame generation plus one at the time of the last registration.
    pub generation: u32,
    /// Anonymous id the element had before a declared id replaced it. Zero when none.
    pub id_alias: u32,
    pub collision: bool,
    pub collapsed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Registration {
    Added,
    /// The id was already registered during this frame.
    Duplicate,
    /// No room even after dropping entries not seen this frame.
    Full,
}

/// Id to element association, keyed by `Id::id`.
pub(crate) struct Registry {
    items: FxHashMap<u32, RegistryItem>,
    capacity: usize,
}

impl Registry {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    /// Registers `element_id` for the frame with generation `generation`.
    ///
    /// An entry from an earlier frame is refreshed in place. A second registration within the
    /// same frame keeps the first element and flags the collision.
    pub fn register(
        &mut self,
        element_id: &Id,
        layout_element_index: usize,
        id_alias: u32,
        generation: u32,
    ) -> Registration {
        if let Some(item) = self.items.get_mut(&element_id.id) {
            if item.generation <= generation {
                item.element_id = element_id.clone();
                item.generation = generation + 1;
                item.layout_element_index = layout_element_index;
                item.id_alias = id_alias;
                item.collision = false;
                item.on_hover = None;
                return Registration::Added;
            }
            item.collision = true;
            return Registration::Duplicate;
        }

        if self.items.len() >= self.capacity {
            self.items.retain(|_, item| item.generation > generation);
            log::trace!("registry full, {} live entries kept", self.items.len());
            if self.items.len() >= self.capacity {
                return Registration::Full;
            }
        }

        self.items.insert(
            element_id.id,
            RegistryItem {
                element_id: element_id.clone(),
                bounding_box: BoundingBox::default(),
                layout_element_index,
                on_hover: None,
                generation: generation + 1,
                id_alias,
                collision: false,
                collapsed: false,
            },
        );
        Registration::Added
    }

    /// Any entry for `id`, however old.
    #[inline]
    pub fn get(&self, id: u32) -> Option<&RegistryItem> {
        self.items.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: u32) -> Option<&mut RegistryItem> {
        self.items.get_mut(&id)
    }

    /// The entry for `id` only if it was registered during the frame with `generation`.
    #[inline]
    pub fn get_live(&self, id: u32, generation: u32) -> Option<&RegistryItem> {
        self.items
            .get(&id)
            .filter(|item| item.generation == generation.wrapping_add(1))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
