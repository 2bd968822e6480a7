//! Typed metadata attached to a [`FakeFile`](super::FakeFile).
//!
//! A property is any `'static + Clone + Debug` type implementing the
//! [`FileProperty`] marker. Lookup is keyed by the concrete type, so a file
//! carries at most one value per property type.
//!
//! Built-in properties drive the default [`StubFileSystem`](super::StubFileSystem)
//! model:
//!
//! | Property | Meaning |
//! |----------|---------|
//! | [`Content`] | File bytes; a file with content exists |
//! | [`Exists`] | Explicit existence flag, overrides the derived state |
//! | [`Directory`] | Marks the file as a directory |
//! | [`Permissions`] | Read/write/execute flags checked by stream operations |
//!
//! # Custom properties
//!
//! ```rust
//! use fakefs::{FakeFile, FileProperty};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Owner(String);
//!
//! impl FileProperty for Owner {}
//!
//! let file = FakeFile::new("/srv/data").with_property(Owner("ops".into()));
//! assert_eq!(file.property::<Owner>(), Some(Owner("ops".into())));
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Marker trait for values that can be attached to a [`FakeFile`](super::FakeFile).
pub trait FileProperty: Any + Clone + fmt::Debug {}

struct Slot {
    name: &'static str,
    value: Box<dyn Any>,
}

/// Type-keyed property storage. One value per concrete type.
#[derive(Default)]
pub(crate) struct PropertyBag {
    slots: HashMap<TypeId, Slot>,
}

impl PropertyBag {
    pub(crate) fn insert<P: FileProperty>(&mut self, property: P) -> Option<P> {
        let previous = self.slots.insert(
            TypeId::of::<P>(),
            Slot {
                name: std::any::type_name::<P>(),
                value: Box::new(property),
            },
        );
        previous.and_then(|slot| slot.value.downcast::<P>().ok().map(|p| *p))
    }

    pub(crate) fn get<P: FileProperty>(&self) -> Option<&P> {
        self.slots
            .get(&TypeId::of::<P>())
            .and_then(|slot| slot.value.downcast_ref::<P>())
    }

    pub(crate) fn get_mut<P: FileProperty>(&mut self) -> Option<&mut P> {
        self.slots
            .get_mut(&TypeId::of::<P>())
            .and_then(|slot| slot.value.downcast_mut::<P>())
    }

    pub(crate) fn remove<P: FileProperty>(&mut self) -> Option<P> {
        self.slots
            .remove(&TypeId::of::<P>())
            .and_then(|slot| slot.value.downcast::<P>().ok().map(|p| *p))
    }

    pub(crate) fn contains<P: FileProperty>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<P>())
    }

    pub(crate) fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.slots.values().map(|slot| slot.name).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// File content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content(pub Vec<u8>);

impl Content {
    /// Content from raw bytes.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Content from UTF-8 text.
    pub fn text(text: impl Into<String>) -> Self {
        Self(text.into().into_bytes())
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Content as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FileProperty for Content {}

/// Explicit existence flag.
///
/// When present it wins over the state derived from [`Content`] and
/// [`Directory`]: `Exists(true)` makes an empty file exist, `Exists(false)`
/// hides a file that still carries content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exists(pub bool);

impl FileProperty for Exists {}

/// Directory marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directory;

impl FileProperty for Directory {}

/// Permission flags.
///
/// Files without this property are fully accessible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub readable: bool,
    pub writable: bool,
    pub executable: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            readable: true,
            writable: true,
            executable: false,
        }
    }
}

impl Permissions {
    /// Readable, not writable.
    pub fn read_only() -> Self {
        Self {
            writable: false,
            ..Self::default()
        }
    }

    /// Writable, not readable.
    pub fn write_only() -> Self {
        Self {
            readable: false,
            ..Self::default()
        }
    }

    /// No access at all.
    pub fn none() -> Self {
        Self {
            readable: false,
            writable: false,
            executable: false,
        }
    }

    /// Build from a Unix mode, looking at the owner bits only.
    pub fn from_mode(mode: u32) -> Self {
        Self {
            readable: mode & 0o400 != 0,
            writable: mode & 0o200 != 0,
            executable: mode & 0o100 != 0,
        }
    }
}

impl FileProperty for Permissions {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag(&'static str);

    impl FileProperty for Tag {}

    #[test]
    fn insert_replaces_same_type() {
        let mut bag = PropertyBag::default();
        assert!(bag.insert(Tag("first")).is_none());
        assert_eq!(bag.insert(Tag("second")), Some(Tag("first")));
        assert_eq!(bag.get::<Tag>(), Some(&Tag("second")));
        assert_eq!(bag.names().len(), 1);
    }

    #[test]
    fn distinct_types_coexist() {
        let mut bag = PropertyBag::default();
        bag.insert(Tag("t"));
        bag.insert(Content::text("abc"));
        bag.insert(Exists(true));
        assert!(bag.contains::<Tag>());
        assert!(bag.contains::<Content>());
        assert!(!bag.contains::<Directory>());
        assert_eq!(bag.names().len(), 3);
    }

    #[test]
    fn remove_and_get_mut() {
        let mut bag = PropertyBag::default();
        bag.insert(Content::text("ab"));
        bag.get_mut::<Content>().unwrap().0.push(b'c');
        assert_eq!(bag.remove::<Content>(), Some(Content::text("abc")));
        assert!(bag.names().is_empty());
        assert_eq!(bag.remove::<Content>(), None);
    }

    #[test]
    fn content_helpers() {
        let content = Content::text("hello");
        assert_eq!(content.as_bytes(), b"hello");
        assert_eq!(content.as_str(), Some("hello"));
        assert_eq!(content.len(), 5);
        assert!(Content::bytes(vec![0xff, 0xfe]).as_str().is_none());
        assert!(Content::default().is_empty());
    }

    #[test]
    fn permissions_from_mode() {
        assert_eq!(Permissions::from_mode(0o644), Permissions::default());
        assert_eq!(Permissions::from_mode(0o444), Permissions::read_only());
        assert_eq!(Permissions::from_mode(0o000), Permissions::none());
        assert!(Permissions::from_mode(0o755).executable);
    }
}
