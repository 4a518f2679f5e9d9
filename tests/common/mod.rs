#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Signature plus IHDR chunk of a PNG; enough for dimension sniffing.
pub fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    // bit depth 8, truecolour, default compression/filter/interlace, zero CRC
    bytes.extend_from_slice(&[8, 2, 0, 0, 0, 0, 0, 0, 0]);
    bytes
}

/// Writes a `width` x `height` PNG named `name` into `dir` and returns its path.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, png_header(width, height)).expect("write png file");
    path
}
