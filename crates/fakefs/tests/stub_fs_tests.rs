//! Tests for StubFileSystem overrides and scenarios
//!
//! These exercise the stub through the public API only, the way code under
//! test would see it.

use fakefs::{
    Content, DigestWriter, Error, Exists, FakeFile, FileProperty, FileSystem, InputStream,
    OutputStream, Sha256, StubFileSystem, hex_digest,
};
use pretty_assertions::assert_eq;
use std::cell::{Cell, RefCell};
use std::io::{BufRead, Read, Write};
use std::rc::Rc;

fn read_bytes(fs: &dyn FileSystem, file: &FakeFile) -> fakefs::Result<Vec<u8>> {
    let mut buf = Vec::new();
    fs.get_input_stream(file)?.read_to_end(&mut buf)?;
    Ok(buf)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn in_memory_content_becomes_readable_once_attached() {
    let fs = StubFileSystem::new();
    let file = fs.file("/var/data/memory.txt");

    let err = fs.get_input_stream(&file).err().unwrap();
    assert!(err.is_not_found(), "expected not found, got: {}", err);

    file.set_property(Content::text("this is some text in memory."));
    assert_eq!(
        read_bytes(&fs, &file).unwrap(),
        b"this is some text in memory.".to_vec()
    );
}

#[test]
fn digest_of_written_content_matches_independent_digest() {
    let fs = StubFileSystem::new();
    let file = fs.file("/tmp/fake.txt");

    let mut sink = DigestWriter::<_, Sha256>::new(fs.get_output_stream(&file, false).unwrap());
    sink.write_all(b"fake file with text.").unwrap();
    let (_, digest) = sink.finish();

    assert_eq!(digest, hex_digest::<Sha256>(b"fake file with text."));
    assert_eq!(fs.read_to_string(&file).unwrap(), "fake file with text.");
}

#[test]
fn digest_sink_installed_as_output_override() {
    let digests: Rc<RefCell<Vec<fakefs::DigestHandle<Sha256>>>> = Rc::default();
    let recorded = Rc::clone(&digests);

    let fs = StubFileSystem::builder()
        .on_output_stream(move |defaults, file, append| {
            let writer =
                DigestWriter::<_, Sha256>::new(defaults.get_output_stream(file, append)?);
            recorded.borrow_mut().push(writer.handle());
            Ok(Box::new(writer) as OutputStream)
        })
        .build();

    // Code under test only sees the trait
    let file = fs.file("/out/report.txt");
    fs.write_string(&file, "fake file with text.").unwrap();

    let digests = digests.borrow();
    assert_eq!(digests.len(), 1);
    assert_eq!(
        digests[0].hex_digest(),
        hex_digest::<Sha256>(b"fake file with text.")
    );
    assert_eq!(fs.read_to_string(&file).unwrap(), "fake file with text.");
}

#[test]
fn raising_delete_leaves_state_unchanged() {
    let fs = StubFileSystem::builder()
        .on_delete(|_, file| Err(Error::forbidden(format!("delete {}", file.path()))))
        .build();
    let file = fs
        .file("/precious.db")
        .with_property(Content::text("rows"));

    let err = fs.delete(&file).unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(err.to_string(), "operation forbidden: delete /precious.db");
    assert!(fs.exists(&file).unwrap());
    assert_eq!(file.property::<Content>(), Some(Content::text("rows")));
}

// =============================================================================
// Override isolation and delegation
// =============================================================================

#[test]
fn delete_override_leaves_other_operations_default() {
    let fs = StubFileSystem::builder()
        .on_delete(|_, _| Err(Error::unsupported("delete")))
        .build();
    let file = fs.file("/a.txt");

    assert!(!fs.exists(&file).unwrap());
    fs.write_string(&file, "one").unwrap();
    assert!(fs.exists(&file).unwrap());
    assert_eq!(fs.read_to_string(&file).unwrap(), "one");

    assert!(fs.mkdirs(&fs.file("/dir/sub")).unwrap());
    assert!(fs.rename(&file, &fs.file("/dir/a.txt")).unwrap());
    assert_eq!(fs.list(&fs.file("/dir")).unwrap().len(), 2);

    assert!(fs.delete(&file).unwrap_err().is_unsupported());
}

#[test]
fn override_can_delegate_to_defaults() {
    let deletes = Rc::new(Cell::new(0));
    let counter = Rc::clone(&deletes);

    let fs = StubFileSystem::builder()
        .on_delete(move |defaults, file| {
            counter.set(counter.get() + 1);
            defaults.delete(file)
        })
        .build();
    let file = fs.file("/tmp/x").with_property(Content::text("x"));

    assert!(fs.delete(&file).unwrap());
    assert!(!fs.delete(&file).unwrap());
    assert_eq!(deletes.get(), 2);
    assert!(!fs.exists(&file).unwrap());
}

#[test]
fn defaults_bypass_every_override() {
    let fs = StubFileSystem::builder()
        .on_exists(|_, _| Err(Error::unsupported("exists")))
        .build();
    let file = fs.file("/f").with_property(Exists(true));

    assert!(fs.exists(&file).is_err());
    assert!(fs.defaults().exists(&file).unwrap());
}

#[test]
fn input_override_feeds_reader() {
    let fs = StubFileSystem::builder()
        .on_input_stream(|_, _| Ok(Box::new(&b"line one\nline two\n"[..]) as InputStream))
        .build();
    let file = fs.file("/anything");

    let lines: Vec<String> = fs
        .reader(&file)
        .unwrap()
        .lines()
        .collect::<std::io::Result<_>>()
        .unwrap();
    assert_eq!(lines, vec!["line one", "line two"]);
    // No content was ever attached
    assert!(!fs.exists(&file).unwrap());
}

#[test]
fn output_override_captures_writer_traffic() {
    let captured: Rc<RefCell<Vec<u8>>> = Rc::default();
    let sink = Rc::clone(&captured);

    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let fs = StubFileSystem::builder()
        .on_output_stream(move |_, _, _| Ok(Box::new(Capture(Rc::clone(&sink))) as OutputStream))
        .build();
    let file = fs.file("/dev/capture");

    let mut writer = fs.writer(&file).unwrap();
    writeln!(writer, "hello {}", "world").unwrap();
    writer.flush().unwrap();

    assert_eq!(captured.borrow().as_slice(), b"hello world\n");
    assert!(!fs.exists(&file).unwrap());
}

#[test]
fn rename_override_asserts_not_called() {
    let fs = StubFileSystem::builder()
        .on_rename(|_, from, to| {
            Err(Error::unsupported(format!(
                "rename {} -> {}",
                from.path(),
                to.path()
            )))
        })
        .build();
    let from = fs.file("/a").with_property(Content::text("a"));
    let err = fs.rename(&from, &fs.file("/b")).unwrap_err();
    assert!(err.is_unsupported());
    assert!(fs.exists(&from).unwrap());
}

#[test]
fn file_override_can_seed_handles() {
    let fs = StubFileSystem::builder()
        .on_file(|defaults, path| {
            let file = defaults.file(path);
            if path.ends_with(".cfg") && !file.has_property::<Content>() {
                file.set_property(Content::text("default=1"));
            }
            file
        })
        .build();
    assert_eq!(fs.read_to_string(&fs.file("/etc/app.cfg")).unwrap(), "default=1");
    assert!(!fs.exists(&fs.file("/etc/other")).unwrap());
}

// =============================================================================
// Properties
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct FailNextRead(bool);

impl FileProperty for FailNextRead {}

#[test]
fn custom_property_drives_override() {
    let fs = StubFileSystem::builder()
        .on_input_stream(|defaults, file| {
            if file.remove_property::<FailNextRead>() == Some(FailNextRead(true)) {
                return Err(std::io::Error::other("simulated read failure").into());
            }
            defaults.get_input_stream(file)
        })
        .build();
    let file = fs
        .file("/flaky")
        .with_property(Content::text("ok"))
        .with_property(FailNextRead(true));

    assert!(fs.read_to_string(&file).is_err());
    assert_eq!(fs.read_to_string(&file).unwrap(), "ok");
}

#[test]
fn handles_for_same_path_share_properties() {
    let fs = StubFileSystem::new();
    fs.file("/shared").set_property(Content::text("v1"));
    assert_eq!(fs.read_to_string(&fs.file("/shared")).unwrap(), "v1");
}

#[test]
fn stubs_do_not_share_state() {
    let first = StubFileSystem::new();
    let second = StubFileSystem::new();
    first.file("/x").set_property(Content::text("x"));
    assert!(!second.exists(&second.file("/x")).unwrap());
}

#[test]
fn append_concatenates_writes_in_order() {
    let fs = StubFileSystem::new();
    let file = fs.file("/log.txt");
    for chunk in ["a", "b", "c"] {
        let mut out = fs.get_output_stream(&file, true).unwrap();
        out.write_all(chunk.as_bytes()).unwrap();
    }
    assert_eq!(fs.read_to_string(&file).unwrap(), "abc");
}
