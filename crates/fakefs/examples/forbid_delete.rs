//! Forbidden delete example
//!
//! Code under test archives a report and removes the original. The stub
//! refuses every delete, so the run shows what the code does when cleanup
//! fails while the rest of the filesystem keeps working in memory.
//!
//! Run with: cargo run --example forbid_delete

use fakefs::{Content, Error, FileSystem, StubFileSystem};
use std::cell::Cell;
use std::rc::Rc;

/// Copy `path` next to itself with a `.bak` suffix, then remove the original.
fn archive(fs: &dyn FileSystem, path: &str) -> fakefs::Result<()> {
    let source = fs.file(path);
    let text = fs.read_to_string(&source)?;
    fs.write_string(&fs.file(&format!("{}.bak", path)), &text)?;
    fs.delete(&source)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let attempts = Rc::new(Cell::new(0));
    let counter = Rc::clone(&attempts);

    let fs = StubFileSystem::builder()
        .on_delete(move |_, file| {
            counter.set(counter.get() + 1);
            Err(Error::forbidden(format!("delete {}", file.path())))
        })
        .build();
    fs.file("/reports/q3.csv")
        .set_property(Content::text("region,revenue\nnorth,42\n"));

    match archive(&fs, "/reports/q3.csv") {
        Ok(()) => println!("Unexpected success"),
        Err(e) => println!("Archive failed as expected: {}", e),
    }

    println!("delete attempts: {}", attempts.get());
    for file in fs.files() {
        if fs.exists(&file)? {
            println!("{} ({} bytes)", file, fs.read_to_string(&file)?.len());
        }
    }
    Ok(())
}
