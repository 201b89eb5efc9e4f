//! Archive builders for extraction tests

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::{Builder, EntryType, Header};

/// Pack `tree` into `<dir>/<name>` as a gzip tar
pub fn pack_directory(tree: &Path, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
    builder.append_dir_all(".", tree).unwrap();
    builder.into_inner().unwrap().finish().unwrap();
    path
}

/// In-memory gzip tar writer that accepts hostile member names
pub struct ArchiveWriter {
    builder: Builder<GzEncoder<Vec<u8>>>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            builder: Builder::new(GzEncoder::new(Vec::new(), Compression::default())),
        }
    }

    pub fn file(mut self, name: &str, data: &[u8]) -> Self {
        let mut header = Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        self.builder.append_data(&mut header, name, data).unwrap();
        self
    }

    /// Regular file whose name bypasses the writer's path checks
    pub fn raw_file(mut self, name: &str, data: &[u8]) -> Self {
        let mut header = Header::new_gnu();
        let slot = &mut header.as_old_mut().name;
        slot[..name.len()].copy_from_slice(name.as_bytes());
        header.set_entry_type(EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    pub fn dir(mut self, name: &str) -> Self {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Directory);
        header.set_size(0);
        header.set_mode(0o755);
        self.builder.append_data(&mut header, name, &[][..]).unwrap();
        self
    }

    pub fn symlink(mut self, name: &str, target: &str) -> Self {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        header.set_mode(0o777);
        self.builder.append_link(&mut header, name, target).unwrap();
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.builder.into_inner().unwrap().finish().unwrap()
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}
