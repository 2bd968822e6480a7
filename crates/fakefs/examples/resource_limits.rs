//! Resource limits example
//!
//! Demonstrates the in-memory limits that keep a runaway test from
//! exhausting memory.
//! Run with: cargo run --example resource_limits

use fakefs::{FileSystem, FsLimits, StubFileSystem};
use std::io::Write;

fn main() -> anyhow::Result<()> {
    println!("=== File Size Limit ===\n");
    file_size_example();

    println!("\n=== File Count Limit ===\n");
    file_count_example();

    println!("\n=== Usage ===\n");
    usage_example()?;

    Ok(())
}

fn file_size_example() {
    let fs = StubFileSystem::builder()
        .limits(FsLimits::new().max_file_size(16))
        .build();
    let file = fs.file("/tmp/big.bin");

    // Fails on the write that would grow the file past 16 bytes
    let result = fs
        .get_output_stream(&file, false)
        .map_err(anyhow::Error::from)
        .and_then(|mut out| Ok(out.write_all(&[0u8; 64])?));

    match result {
        Ok(()) => println!("Unexpected success"),
        Err(e) => println!("Blocked as expected: {}", e),
    }
}

fn file_count_example() {
    let fs = StubFileSystem::builder()
        .limits(FsLimits::new().max_file_count(2))
        .build();

    for i in 0..3 {
        match fs.write_string(&fs.file(&format!("/tmp/{}.txt", i)), "x") {
            Ok(()) => println!("created /tmp/{}.txt", i),
            Err(e) => println!("Blocked as expected: {}", e),
        }
    }
}

fn usage_example() -> anyhow::Result<()> {
    let fs = StubFileSystem::new();
    fs.mkdirs(&fs.file("/data/raw"))?;
    fs.write_string(&fs.file("/data/raw/a.txt"), "hello")?;
    fs.write_string(&fs.file("/data/raw/b.txt"), "world!")?;

    let usage = fs.usage();
    println!(
        "{} files, {} directories, {} bytes",
        usage.file_count, usage.dir_count, usage.total_bytes
    );
    Ok(())
}
