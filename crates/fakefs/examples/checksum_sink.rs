//! Checksum sink example
//!
//! Installs an output-stream override that hashes everything written while
//! still storing it in memory, then checks the digest against an
//! independently computed one.
//!
//! Run with: cargo run --example checksum_sink

use fakefs::{
    DigestHandle, DigestWriter, FileSystem, OutputStream, Sha256, StubFileSystem, hex_digest,
};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

fn export(fs: &dyn FileSystem, path: &str, rows: &[&str]) -> fakefs::Result<()> {
    let mut out = fs.writer(&fs.file(path))?;
    for row in rows {
        writeln!(out, "{}", row)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let handles: Rc<RefCell<Vec<(String, DigestHandle<Sha256>)>>> = Rc::default();
    let recorded = Rc::clone(&handles);

    let fs = StubFileSystem::builder()
        .on_output_stream(move |defaults, file, append| {
            let writer =
                DigestWriter::<_, Sha256>::new(defaults.get_output_stream(file, append)?);
            recorded
                .borrow_mut()
                .push((file.path().to_string(), writer.handle()));
            Ok(Box::new(writer) as OutputStream)
        })
        .build();

    let rows = ["id,name", "1,alpha", "2,beta"];
    export(&fs, "/exports/users.csv", &rows)?;

    let expected = hex_digest::<Sha256>(format!("{}\n", rows.join("\n")).as_bytes());
    for (path, handle) in handles.borrow().iter() {
        let actual = handle.hex_digest();
        println!("{}: {}", path, actual);
        anyhow::ensure!(actual == expected, "digest mismatch for {}", path);
    }

    println!("stored: {:?}", fs.read_to_string(&fs.file("/exports/users.csv"))?);
    Ok(())
}
