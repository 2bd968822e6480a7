//! In-memory, per-operation overridable filesystem.
//!
//! [`StubFileSystem`] keeps its whole state in the property bags of the
//! [`FakeFile`] handles it hands out. No real I/O happens.
//!
//! # State model
//!
//! | Question | Answer |
//! |----------|--------|
//! | exists? | [`Exists`] flag if set, else carries [`Content`] or [`Directory`] |
//! | directory? | exists and carries [`Directory`] |
//! | readable? | exists, not a directory, has [`Content`], [`Permissions`] allow it |
//! | children? | registered, existing files whose parent path is the directory |
//!
//! # Overrides
//!
//! Each operation has a slot on [`StubFileSystemBuilder`]. A slot receives a
//! [`Defaults`] view that runs the built-in behavior, so an override can
//! constrain or instrument one operation and delegate the rest:
//!
//! ```rust
//! use fakefs::{Content, Error, FileSystem, StubFileSystem};
//!
//! let fs = StubFileSystem::builder()
//!     .on_delete(|_, file| Err(Error::forbidden(format!("delete {}", file.path()))))
//!     .build();
//!
//! let file = fs.file("/data/report.csv").with_property(Content::text("a,b"));
//! assert!(fs.delete(&file).unwrap_err().is_forbidden());
//! assert!(fs.exists(&file).unwrap());
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufReader, BufWriter, Cursor};
use std::rc::Rc;

use super::file::{FakeFile, dir_key, parent_of};
use super::limits::{FsLimits, FsUsage};
use super::property::{Content, Directory, Exists, Permissions};
use super::stream::ContentWriter;
use super::traits::{FileSystem, InputStream, OutputStream, TextReader, TextWriter, fs_errors};
use crate::error::Result;
use crate::logging_impl::LogConfig;

/// Handles registered by path. Ordered so listings are deterministic.
pub(crate) type Registry = Rc<RefCell<BTreeMap<String, FakeFile>>>;

type PathHook = Box<dyn Fn(&Defaults<'_>, &str) -> FakeFile>;
type FileHook<R> = Box<dyn Fn(&Defaults<'_>, &FakeFile) -> Result<R>>;
type OutputHook = Box<dyn Fn(&Defaults<'_>, &FakeFile, bool) -> Result<OutputStream>>;
type RenameHook = Box<dyn Fn(&Defaults<'_>, &FakeFile, &FakeFile) -> Result<bool>>;

#[derive(Default)]
struct Hooks {
    file: Option<PathHook>,
    exists: Option<FileHook<bool>>,
    is_directory: Option<FileHook<bool>>,
    delete: Option<FileHook<bool>>,
    mkdirs: Option<FileHook<bool>>,
    list: Option<FileHook<Vec<FakeFile>>>,
    input_stream: Option<FileHook<InputStream>>,
    output_stream: Option<OutputHook>,
    reader: Option<FileHook<TextReader>>,
    writer: Option<FileHook<TextWriter>>,
    rename: Option<RenameHook>,
}

impl Hooks {
    fn names(&self) -> Vec<&'static str> {
        let slots = [
            ("file", self.file.is_some()),
            ("exists", self.exists.is_some()),
            ("is_directory", self.is_directory.is_some()),
            ("delete", self.delete.is_some()),
            ("mkdirs", self.mkdirs.is_some()),
            ("list", self.list.is_some()),
            ("get_input_stream", self.input_stream.is_some()),
            ("get_output_stream", self.output_stream.is_some()),
            ("reader", self.reader.is_some()),
            ("writer", self.writer.is_some()),
            ("rename", self.rename.is_some()),
        ];
        slots
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }
}

/// In-memory filesystem test double.
///
/// Each instance owns a private registry of [`FakeFile`] handles: asking for
/// the same path twice returns handles sharing one property bag.
///
/// Not `Send`: the stub is meant for single-threaded unit tests.
pub struct StubFileSystem {
    registry: Registry,
    limits: FsLimits,
    log_config: LogConfig,
    hooks: Hooks,
}

impl Default for StubFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl StubFileSystem {
    /// Create a stub with default limits and no overrides.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder to configure limits and overrides.
    pub fn builder() -> StubFileSystemBuilder {
        StubFileSystemBuilder::default()
    }

    /// The built-in behavior, bypassing every override.
    pub fn defaults(&self) -> Defaults<'_> {
        Defaults { fs: self }
    }

    pub fn limits(&self) -> &FsLimits {
        &self.limits
    }

    pub fn log_config(&self) -> &LogConfig {
        &self.log_config
    }

    /// Current content and entry counts.
    pub fn usage(&self) -> FsUsage {
        usage_of(&self.registry.borrow())
    }

    /// Every handle this stub has registered, ordered by path.
    pub fn files(&self) -> Vec<FakeFile> {
        self.registry.borrow().values().cloned().collect()
    }

    #[cfg_attr(not(feature = "logging"), allow(unused_variables))]
    fn dispatch<R>(
        &self,
        op: &'static str,
        hook: &Option<FileHook<R>>,
        file: &FakeFile,
        default: impl FnOnce(&Defaults<'_>) -> Result<R>,
    ) -> Result<R> {
        #[cfg(feature = "logging")]
        tracing::debug!(
            target: "fakefs::stub",
            op,
            path = %file.path(),
            overridden = hook.is_some()
        );

        let defaults = self.defaults();
        match hook {
            Some(hook) => hook(&defaults, file),
            None => default(&defaults),
        }
    }
}

impl fmt::Debug for StubFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubFileSystem")
            .field("files", &self.registry.borrow().keys().collect::<Vec<_>>())
            .field("limits", &self.limits)
            .field("overrides", &self.hooks.names())
            .finish()
    }
}

impl FileSystem for StubFileSystem {
    fn file(&self, path: &str) -> FakeFile {
        let defaults = self.defaults();
        match &self.hooks.file {
            Some(hook) => hook(&defaults, path),
            None => defaults.file(path),
        }
    }

    fn exists(&self, file: &FakeFile) -> Result<bool> {
        self.dispatch("exists", &self.hooks.exists, file, |d| d.exists(file))
    }

    fn is_directory(&self, file: &FakeFile) -> Result<bool> {
        self.dispatch("is_directory", &self.hooks.is_directory, file, |d| {
            d.is_directory(file)
        })
    }

    fn delete(&self, file: &FakeFile) -> Result<bool> {
        self.dispatch("delete", &self.hooks.delete, file, |d| d.delete(file))
    }

    fn mkdirs(&self, file: &FakeFile) -> Result<bool> {
        self.dispatch("mkdirs", &self.hooks.mkdirs, file, |d| d.mkdirs(file))
    }

    fn list(&self, file: &FakeFile) -> Result<Vec<FakeFile>> {
        self.dispatch("list", &self.hooks.list, file, |d| d.list(file))
    }

    fn get_input_stream(&self, file: &FakeFile) -> Result<InputStream> {
        self.dispatch("get_input_stream", &self.hooks.input_stream, file, |d| {
            d.get_input_stream(file)
        })
    }

    fn get_output_stream(&self, file: &FakeFile, append: bool) -> Result<OutputStream> {
        #[cfg(feature = "logging")]
        tracing::debug!(
            target: "fakefs::stub",
            op = "get_output_stream",
            path = %file.path(),
            append,
            overridden = self.hooks.output_stream.is_some()
        );

        let defaults = self.defaults();
        match &self.hooks.output_stream {
            Some(hook) => hook(&defaults, file, append),
            None => defaults.get_output_stream(file, append),
        }
    }

    // Without a reader/writer override these layer over `self`, so stream
    // overrides are honored by the text conveniences too.
    fn reader(&self, file: &FakeFile) -> Result<TextReader> {
        self.dispatch("reader", &self.hooks.reader, file, |_| {
            Ok(BufReader::new(self.get_input_stream(file)?))
        })
    }

    fn writer(&self, file: &FakeFile) -> Result<TextWriter> {
        self.dispatch("writer", &self.hooks.writer, file, |_| {
            Ok(BufWriter::new(self.get_output_stream(file, false)?))
        })
    }

    fn rename(&self, from: &FakeFile, to: &FakeFile) -> Result<bool> {
        #[cfg(feature = "logging")]
        tracing::debug!(
            target: "fakefs::stub",
            op = "rename",
            from = %from.path(),
            to = %to.path(),
            overridden = self.hooks.rename.is_some()
        );

        let defaults = self.defaults();
        match &self.hooks.rename {
            Some(hook) => hook(&defaults, from, to),
            None => defaults.rename(from, to),
        }
    }
}

/// Builder for [`StubFileSystem`].
///
/// Every `on_*` method installs the override for one operation. Operations
/// without an override keep the built-in behavior.
#[derive(Default)]
pub struct StubFileSystemBuilder {
    limits: FsLimits,
    log_config: LogConfig,
    hooks: Hooks,
}

impl StubFileSystemBuilder {
    /// Set resource limits.
    pub fn limits(mut self, limits: FsLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set logging configuration.
    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn on_file<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Defaults<'_>, &str) -> FakeFile + 'static,
    {
        self.hooks.file = Some(Box::new(hook));
        self
    }

    pub fn on_exists<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Defaults<'_>, &FakeFile) -> Result<bool> + 'static,
    {
        self.hooks.exists = Some(Box::new(hook));
        self
    }

    pub fn on_is_directory<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Defaults<'_>, &FakeFile) -> Result<bool> + 'static,
    {
        self.hooks.is_directory = Some(Box::new(hook));
        self
    }

    pub fn on_delete<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Defaults<'_>, &FakeFile) -> Result<bool> + 'static,
    {
        self.hooks.delete = Some(Box::new(hook));
        self
    }

    pub fn on_mkdirs<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Defaults<'_>, &FakeFile) -> Result<bool> + 'static,
    {
        self.hooks.mkdirs = Some(Box::new(hook));
        self
    }

    pub fn on_list<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Defaults<'_>, &FakeFile) -> Result<Vec<FakeFile>> + 'static,
    {
        self.hooks.list = Some(Box::new(hook));
        self
    }

    /// Override `get_input_stream`. Also affects `reader` unless that has
    /// its own override.
    pub fn on_input_stream<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Defaults<'_>, &FakeFile) -> Result<InputStream> + 'static,
    {
        self.hooks.input_stream = Some(Box::new(hook));
        self
    }

    /// Override `get_output_stream`. Also affects `writer` unless that has
    /// its own override.
    pub fn on_output_stream<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Defaults<'_>, &FakeFile, bool) -> Result<OutputStream> + 'static,
    {
        self.hooks.output_stream = Some(Box::new(hook));
        self
    }

    pub fn on_reader<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Defaults<'_>, &FakeFile) -> Result<TextReader> + 'static,
    {
        self.hooks.reader = Some(Box::new(hook));
        self
    }

    pub fn on_writer<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Defaults<'_>, &FakeFile) -> Result<TextWriter> + 'static,
    {
        self.hooks.writer = Some(Box::new(hook));
        self
    }

    pub fn on_rename<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Defaults<'_>, &FakeFile, &FakeFile) -> Result<bool> + 'static,
    {
        self.hooks.rename = Some(Box::new(hook));
        self
    }

    /// Build the stub.
    pub fn build(self) -> StubFileSystem {
        StubFileSystem {
            registry: Rc::new(RefCell::new(BTreeMap::new())),
            limits: self.limits,
            log_config: self.log_config,
            hooks: self.hooks,
        }
    }
}

/// Built-in stub behavior, handed to overrides for delegation.
///
/// Calls on `Defaults` never reach an override, including the `reader` and
/// `writer` conveniences.
#[derive(Clone, Copy)]
pub struct Defaults<'a> {
    fs: &'a StubFileSystem,
}

impl Defaults<'_> {
    /// The handle registered for `file`'s path, or `file` itself if the stub
    /// has never seen that path.
    fn resolve(&self, file: &FakeFile) -> FakeFile {
        self.fs
            .registry
            .borrow()
            .get(file.path())
            .cloned()
            .unwrap_or_else(|| file.clone())
    }

    /// Like [`resolve`](Self::resolve), registering `file` when its path is
    /// unknown.
    fn track(&self, file: &FakeFile) -> FakeFile {
        self.fs
            .registry
            .borrow_mut()
            .entry(file.path().to_string())
            .or_insert_with(|| file.clone())
            .clone()
    }

    fn mark_directory(file: &FakeFile) {
        file.remove_property::<Exists>();
        file.remove_property::<Content>();
        file.set_property(Directory);
    }

    fn descendants(&self, dir: &FakeFile) -> Vec<FakeFile> {
        let prefix = child_prefix(dir.path());
        self.fs
            .registry
            .borrow()
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .map(|(_, file)| file.clone())
            .collect()
    }

    /// Reasons the host filesystem would refuse to move `from` onto an
    /// existing `to`.
    fn check_replace(&self, from: &FakeFile, to: &FakeFile) -> Result<()> {
        match (is_directory_state(from), is_directory_state(to)) {
            (false, true) => Err(fs_errors::is_a_directory(to.path())),
            (true, false) => Err(fs_errors::not_a_directory(to.path())),
            (true, true) if !self.list(to)?.is_empty() => {
                Err(fs_errors::directory_not_empty(to.path()))
            }
            _ => Ok(()),
        }
    }
}

impl FileSystem for Defaults<'_> {
    fn file(&self, path: &str) -> FakeFile {
        self.fs
            .registry
            .borrow_mut()
            .entry(path.to_string())
            .or_insert_with(|| FakeFile::new(path))
            .clone()
    }

    fn exists(&self, file: &FakeFile) -> Result<bool> {
        Ok(exists_state(&self.resolve(file)))
    }

    fn is_directory(&self, file: &FakeFile) -> Result<bool> {
        Ok(is_directory_state(&self.resolve(file)))
    }

    fn delete(&self, file: &FakeFile) -> Result<bool> {
        let file = self.resolve(file);
        if !exists_state(&file) {
            return Ok(false);
        }
        if is_directory_state(&file) && !self.list(&file)?.is_empty() {
            return Ok(false);
        }

        file.remove_property::<Content>();
        file.remove_property::<Directory>();
        file.remove_property::<Exists>();
        Ok(true)
    }

    fn mkdirs(&self, file: &FakeFile) -> Result<bool> {
        if exists_state(&self.resolve(file)) {
            return Ok(false);
        }
        self.fs.limits.validate_path(file.path())?;

        let mut missing = Vec::new();
        let mut current = file.parent_path();
        while let Some(path) = current {
            let ancestor = self.file(path);
            if exists_state(&ancestor) {
                if !is_directory_state(&ancestor) {
                    return Ok(false);
                }
            } else {
                missing.push(ancestor);
            }
            current = parent_of(path);
        }

        for ancestor in &missing {
            Self::mark_directory(ancestor);
        }
        Self::mark_directory(&self.track(file));
        Ok(true)
    }

    fn list(&self, file: &FakeFile) -> Result<Vec<FakeFile>> {
        if !is_directory_state(&self.resolve(file)) {
            return Ok(Vec::new());
        }

        let key = dir_key(file.path());
        let children: Vec<FakeFile> = self
            .fs
            .registry
            .borrow()
            .values()
            .filter(|child| parent_of(child.path()) == Some(key))
            .cloned()
            .collect();

        Ok(children.into_iter().filter(exists_state).collect())
    }

    fn get_input_stream(&self, file: &FakeFile) -> Result<InputStream> {
        let file = self.resolve(file);
        if !exists_state(&file) {
            return Err(fs_errors::not_found(file.path()));
        }
        if is_directory_state(&file) {
            return Err(fs_errors::is_a_directory(file.path()));
        }
        if file
            .inspect_property(|p: &Permissions| !p.readable)
            .unwrap_or(false)
        {
            return Err(fs_errors::permission_denied(file.path()));
        }

        let content = file
            .property::<Content>()
            .ok_or_else(|| fs_errors::not_found(file.path()))?;

        #[cfg(feature = "logging")]
        tracing::trace!(
            target: "fakefs::stub",
            path = %file.path(),
            content = %self.fs.log_config.format_content_for_log(content.as_bytes()),
            "read"
        );

        Ok(Box::new(Cursor::new(content.0)))
    }

    fn get_output_stream(&self, file: &FakeFile, append: bool) -> Result<OutputStream> {
        let resolved = self.resolve(file);
        if is_directory_state(&resolved) {
            return Err(fs_errors::is_a_directory(file.path()));
        }
        if resolved
            .inspect_property(|p: &Permissions| !p.writable)
            .unwrap_or(false)
        {
            return Err(fs_errors::permission_denied(file.path()));
        }
        self.fs.limits.validate_path(file.path())?;

        let has_content = exists_state(&resolved) && resolved.has_property::<Content>();
        if !has_content {
            let usage = usage_of(&self.fs.registry.borrow());
            self.fs.limits.check_file_count(usage.file_count)?;
        }

        let file = self.track(&resolved);
        if !append || !has_content {
            file.set_property(Content::default());
        }
        file.remove_property::<Exists>();

        Ok(Box::new(ContentWriter::new(
            file,
            Rc::clone(&self.fs.registry),
            self.fs.limits.clone(),
            self.fs.log_config.clone(),
        )))
    }

    fn rename(&self, from: &FakeFile, to: &FakeFile) -> Result<bool> {
        let (from, to) = (self.resolve(from), self.resolve(to));
        if !exists_state(&from) {
            return Ok(false);
        }
        if dir_key(from.path()) == dir_key(to.path()) {
            return Ok(true);
        }
        if to.path().starts_with(&child_prefix(from.path())) {
            return Err(fs_errors::invalid_input(
                to.path(),
                "cannot move a directory into itself",
            ));
        }
        if exists_state(&to) {
            self.check_replace(&from, &to)?;
        }
        self.fs.limits.validate_path(to.path())?;

        let (from, to) = (self.track(&from), self.track(&to));
        let descendants = if is_directory_state(&from) {
            self.descendants(&from)
        } else {
            Vec::new()
        };

        to.replace_properties(from.take_properties());

        let from_prefix = child_prefix(from.path());
        let to_prefix = child_prefix(to.path());
        for descendant in descendants {
            let rest = &descendant.path()[from_prefix.len()..];
            let target = self.file(&format!("{}{}", to_prefix, rest));
            target.replace_properties(descendant.take_properties());
        }
        Ok(true)
    }
}

fn exists_state(file: &FakeFile) -> bool {
    match file.property::<Exists>() {
        Some(Exists(flag)) => flag,
        None => file.has_property::<Content>() || file.has_property::<Directory>(),
    }
}

fn is_directory_state(file: &FakeFile) -> bool {
    exists_state(file) && file.has_property::<Directory>()
}

/// `dir/` prefix shared by every path below `dir`.
fn child_prefix(dir: &str) -> String {
    let key = dir_key(dir);
    if key.ends_with('/') {
        key.to_string()
    } else {
        format!("{}/", key)
    }
}

pub(crate) fn usage_of(files: &BTreeMap<String, FakeFile>) -> FsUsage {
    let mut usage = FsUsage::default();
    for file in files.values().filter(|file| exists_state(file)) {
        if file.has_property::<Directory>() {
            usage.dir_count += 1;
        } else if let Some(len) = file.inspect_property(|c: &Content| c.len() as u64) {
            usage.total_bytes += len;
            usage.file_count += 1;
        }
    }
    usage
}
