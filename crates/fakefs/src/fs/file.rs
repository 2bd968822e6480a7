//! In-memory file handle.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::property::{FileProperty, PropertyBag};

/// In-memory stand-in for a file, identified by its path.
///
/// A `FakeFile` is a passive data holder: a path plus a bag of typed
/// [`FileProperty`] values. Clones share the same bag, so a property set
/// through one handle is visible through every other handle for that file.
///
/// Equality and hashing use the path only. Two handles for the same path are
/// interchangeable as map keys regardless of their properties.
///
/// # Example
///
/// ```rust
/// use fakefs::{Content, Exists, FakeFile};
///
/// let file = FakeFile::new("/tmp/notes.txt")
///     .with_property(Content::text("draft"))
///     .with_property(Exists(true));
///
/// assert_eq!(file.path(), "/tmp/notes.txt");
/// assert_eq!(file.property::<Content>(), Some(Content::text("draft")));
/// ```
#[derive(Clone)]
pub struct FakeFile {
    path: String,
    properties: Rc<RefCell<PropertyBag>>,
}

impl FakeFile {
    /// Create a handle with an empty property bag.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            properties: Rc::new(RefCell::new(PropertyBag::default())),
        }
    }

    /// The identity path, exactly as given at construction.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment, ignoring trailing slashes.
    pub fn name(&self) -> &str {
        let trimmed = dir_key(&self.path);
        match trimmed.rfind('/') {
            Some(idx) if trimmed.len() > 1 => &trimmed[idx + 1..],
            _ => trimmed,
        }
    }

    /// Parent path, or `None` for a root or a single relative segment.
    pub fn parent_path(&self) -> Option<&str> {
        parent_of(&self.path)
    }

    /// Attach `property`, replacing any value of the same type, and return
    /// this handle for chaining.
    pub fn with_property<P: FileProperty>(self, property: P) -> Self {
        self.set_property(property);
        self
    }

    /// Attach `property`, returning the value it replaced.
    pub fn set_property<P: FileProperty>(&self, property: P) -> Option<P> {
        self.properties.borrow_mut().insert(property)
    }

    /// Look up the property of type `P`.
    pub fn property<P: FileProperty>(&self) -> Option<P> {
        self.properties.borrow().get::<P>().cloned()
    }

    /// True if a property of type `P` is attached.
    pub fn has_property<P: FileProperty>(&self) -> bool {
        self.properties.borrow().contains::<P>()
    }

    /// Detach the property of type `P`.
    pub fn remove_property<P: FileProperty>(&self) -> Option<P> {
        self.properties.borrow_mut().remove::<P>()
    }

    /// Read the property of type `P` without cloning it.
    ///
    /// The property is detached while `f` runs, so `f` may freely use this
    /// handle. A lookup of `P` from inside `f` sees nothing.
    pub fn inspect_property<P: FileProperty, R>(&self, f: impl FnOnce(&P) -> R) -> Option<R> {
        self.update_property(|property: &mut P| f(property))
    }

    /// Mutate the property of type `P` in place.
    ///
    /// Returns `None` without calling `f` if the property is absent. The
    /// property is detached while `f` runs and reattached afterwards,
    /// replacing any `P` set from inside `f`.
    pub fn update_property<P: FileProperty, R>(&self, f: impl FnOnce(&mut P) -> R) -> Option<R> {
        let mut property = self.properties.borrow_mut().remove::<P>()?;
        let result = f(&mut property);
        self.properties.borrow_mut().insert(property);
        Some(result)
    }

    /// Type names of the attached properties, sorted.
    pub fn property_names(&self) -> Vec<&'static str> {
        self.properties.borrow().names()
    }

    /// True if both handles share one property bag.
    pub fn shares_properties_with(&self, other: &FakeFile) -> bool {
        Rc::ptr_eq(&self.properties, &other.properties)
    }

    pub(crate) fn take_properties(&self) -> PropertyBag {
        std::mem::take(&mut *self.properties.borrow_mut())
    }

    pub(crate) fn replace_properties(&self, bag: PropertyBag) {
        *self.properties.borrow_mut() = bag;
    }
}

impl PartialEq for FakeFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FakeFile {}

impl Hash for FakeFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl fmt::Debug for FakeFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeFile")
            .field("path", &self.path)
            .field("properties", &*self.properties.borrow())
            .finish()
    }
}

impl fmt::Display for FakeFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Path with trailing slashes removed. The root stays `/`.
pub(crate) fn dir_key(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/"
    } else {
        trimmed
    }
}

pub(crate) fn parent_of(path: &str) -> Option<&str> {
    let key = dir_key(path);
    if key == "/" || key.is_empty() {
        return None;
    }
    match key.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(dir_key(&key[..idx])),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{Content, Exists};
    use std::collections::HashSet;

    #[test]
    fn path_is_kept_verbatim() {
        for path in ["/a/b", "relative/x", "/", "", "/trailing/"] {
            assert_eq!(FakeFile::new(path).path(), path);
        }
    }

    #[test]
    fn name_and_parent() {
        let file = FakeFile::new("/home/user/notes.txt");
        assert_eq!(file.name(), "notes.txt");
        assert_eq!(file.parent_path(), Some("/home/user"));

        assert_eq!(FakeFile::new("/top").parent_path(), Some("/"));
        assert_eq!(FakeFile::new("/").parent_path(), None);
        assert_eq!(FakeFile::new("single").parent_path(), None);
        assert_eq!(FakeFile::new("a/b/").parent_path(), Some("a"));
        assert_eq!(FakeFile::new("a/b/").name(), "b");
        assert_eq!(FakeFile::new("/").name(), "/");
    }

    #[test]
    fn with_property_is_last_set_wins() {
        let file = FakeFile::new("/f")
            .with_property(Content::text("one"))
            .with_property(Content::text("two"));
        assert_eq!(file.property::<Content>(), Some(Content::text("two")));
    }

    #[test]
    fn clones_share_properties() {
        let file = FakeFile::new("/f");
        let other = file.clone();
        other.set_property(Exists(true));
        assert_eq!(file.property::<Exists>(), Some(Exists(true)));
        assert!(file.shares_properties_with(&other));
    }

    #[test]
    fn equality_ignores_properties() {
        let a = FakeFile::new("/same").with_property(Content::text("a"));
        let b = FakeFile::new("/same");
        assert_eq!(a, b);
        assert!(!a.shares_properties_with(&b));

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&FakeFile::new("/other")));
    }

    #[test]
    fn update_property_in_place() {
        let file = FakeFile::new("/f").with_property(Content::text("ab"));
        let len = file.update_property(|c: &mut Content| {
            c.0.extend_from_slice(b"cd");
            c.len()
        });
        assert_eq!(len, Some(4));
        assert_eq!(file.update_property(|_: &mut Exists| ()), None);
    }

    #[test]
    fn closures_may_touch_the_same_file() {
        let file = FakeFile::new("/f").with_property(Content::text("abc"));

        let len = file.inspect_property(|c: &Content| {
            file.set_property(Exists(true));
            assert!(file.property::<Content>().is_none());
            c.len()
        });
        assert_eq!(len, Some(3));
        assert_eq!(file.property::<Exists>(), Some(Exists(true)));

        file.update_property(|c: &mut Content| {
            file.remove_property::<Exists>();
            file.set_property(Content::text("ignored"));
            c.0.push(b'd');
        });
        assert_eq!(file.property::<Content>(), Some(Content::text("abcd")));
        assert!(!file.has_property::<Exists>());
    }

    #[test]
    fn take_and_replace_properties() {
        let from = FakeFile::new("/from").with_property(Content::text("x"));
        let to = FakeFile::new("/to");
        to.replace_properties(from.take_properties());
        assert!(!from.has_property::<Content>());
        assert_eq!(to.property::<Content>(), Some(Content::text("x")));
    }
}
