//! Safe extraction of collection archives
//!
//! Extracts `.tar.gz` archives into a caller-owned directory while
//! guarding against:
//! - Absolute member names and `../` traversal
//! - Symlinks and hard links whose targets resolve outside the root
//! - Device nodes, FIFOs and other special members
//! - Excessive member counts and unpacked sizes (gzip bombs)
//!
//! On the first violation the whole extraction is aborted. Whatever was
//! already unpacked stays on disk; the caller owns the directory.

use flate2::read::GzDecoder;
use galaxy_importer_core::{Error, ImporterConfig, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};
use tracing::{debug, info};

/// Which validation layers run for each member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionFilter {
    /// Manual validation, then tar's traversal-aware `unpack_in`
    #[default]
    Builtin,
    /// Manual validation only; members are unpacked to the validated path
    ManualOnly,
}

/// Resource limits applied while extracting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractLimits {
    /// Maximum number of archive members
    pub max_members: usize,
    /// Maximum sum of member sizes in bytes
    pub max_unpacked_bytes: u64,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        let config = ImporterConfig::default();
        Self::from(&config)
    }
}

impl From<&ImporterConfig> for ExtractLimits {
    fn from(config: &ImporterConfig) -> Self {
        Self {
            max_members: config.max_archive_members,
            max_unpacked_bytes: config.max_unpacked_bytes,
        }
    }
}

/// What an extraction produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Members unpacked, including directories and links
    pub members: usize,
    /// Sum of member sizes
    pub unpacked_bytes: u64,
}

/// Extracts gzip-compressed tar archives with containment checks
#[derive(Debug, Clone, Default)]
pub struct ArchiveExtractor {
    filter: ExtractionFilter,
    limits: ExtractLimits,
}

impl ArchiveExtractor {
    pub fn new(limits: ExtractLimits) -> Self {
        Self {
            filter: ExtractionFilter::default(),
            limits,
        }
    }

    /// Select the validation layers
    pub fn with_filter(mut self, filter: ExtractionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> ExtractionFilter {
        self.filter
    }

    /// Extract an archive file into `dest`, which must exist
    pub fn extract_file(&self, archive: &Path, dest: &Path) -> Result<ExtractSummary> {
        info!("Extracting {} to {}", archive.display(), dest.display());
        let file = File::open(archive).map_err(|e| {
            Error::importer(format!("Failed to open archive {}: {}", archive.display(), e))
        })?;
        self.extract_from_reader(file, dest)
    }

    /// Extract a gzip-compressed tar stream into `dest`, which must exist
    pub fn extract_from_reader<R: Read>(&self, reader: R, dest: &Path) -> Result<ExtractSummary> {
        let root = dest.canonicalize().map_err(|e| {
            Error::importer(format!(
                "Extraction directory {} is not usable: {}",
                dest.display(),
                e
            ))
        })?;

        let mut archive = Archive::new(GzDecoder::new(reader));
        archive.set_preserve_permissions(false);

        let mut summary = ExtractSummary::default();
        let mut links = Vec::new();

        let entries = archive
            .entries()
            .map_err(|e| Error::importer(format!("Failed to read archive: {}", e)))?;

        for entry in entries {
            let mut entry =
                entry.map_err(|e| Error::importer(format!("Failed to read archive member: {}", e)))?;

            summary.members += 1;
            if summary.members > self.limits.max_members {
                return Err(Error::importer(format!(
                    "Archive exceeds maximum member count ({})",
                    self.limits.max_members
                )));
            }

            let size = entry.header().size().unwrap_or(0);
            summary.unpacked_bytes = summary.unpacked_bytes.saturating_add(size);
            if summary.unpacked_bytes > self.limits.max_unpacked_bytes {
                return Err(Error::importer(format!(
                    "Archive exceeds maximum unpacked size ({} bytes)",
                    self.limits.max_unpacked_bytes
                )));
            }

            let raw_path = entry
                .path()
                .map_err(|e| Error::importer(format!("Invalid archive member name: {}", e)))?
                .into_owned();
            let member = raw_path.display().to_string();

            let rel_path = validate_member(&entry, &raw_path, &root)?;
            if rel_path.as_os_str().is_empty() {
                // the archive root itself
                continue;
            }

            if entry.header().entry_type().is_symlink() {
                links.push(rel_path.clone());
            }

            debug!("Extracting member {}", member);
            match self.filter {
                ExtractionFilter::Builtin => {
                    let unpacked = entry.unpack_in(&root).map_err(|e| {
                        Error::importer(format!("Failed to extract {}: {}", member, e))
                    })?;
                    if !unpacked {
                        return Err(Error::unsafe_member(
                            member,
                            "rejected by the archive library's path filter",
                        ));
                    }
                }
                ExtractionFilter::ManualOnly => {
                    let target = root.join(&rel_path);
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                        ensure_inside(&root, parent, &member)?;
                    }
                    entry.unpack(&target).map_err(|e| {
                        Error::importer(format!("Failed to extract {}: {}", member, e))
                    })?;
                }
            }
        }

        recheck_symlinks(&root, &links)?;

        info!(
            "Extracted {} members ({} bytes)",
            summary.members, summary.unpacked_bytes
        );
        Ok(summary)
    }
}

/// Extract with default limits and the builtin filter
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<ExtractSummary> {
    ArchiveExtractor::default().extract_file(archive, dest)
}

/// Validate one member and return its normalized path below the root
fn validate_member<R: Read>(entry: &tar::Entry<'_, R>, raw_path: &Path, root: &Path) -> Result<PathBuf> {
    let member = raw_path.display().to_string();

    let entry_type = entry.header().entry_type();
    if !is_supported_entry_type(entry_type) {
        return Err(Error::unsafe_member(
            member,
            format!("unsupported member type {:?}", entry_type),
        ));
    }

    if has_root(raw_path) {
        return Err(Error::unsafe_member(member, "absolute path"));
    }

    let rel_path = normalize(raw_path)
        .ok_or_else(|| Error::unsafe_member(&member, "path escapes the extraction directory"))?;

    if entry_type.is_symlink() || entry_type.is_hard_link() {
        let target = entry
            .link_name()
            .map_err(|e| Error::importer(format!("Invalid link target for {}: {}", member, e)))?
            .ok_or_else(|| Error::unsafe_member(&member, "link without a target"))?
            .into_owned();

        if has_root(&target) {
            return Err(Error::unsafe_member(
                member,
                format!("link target '{}' is absolute", target.display()),
            ));
        }

        // symlinks resolve from the member's directory, hard links from the root
        let base = if entry_type.is_symlink() {
            rel_path.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            PathBuf::new()
        };

        if normalize(&base.join(&target)).is_none() {
            return Err(Error::unsafe_member(
                member,
                format!(
                    "link target '{}' resolves outside the extraction directory",
                    target.display()
                ),
            ));
        }

        if resolve_below(root, &base.join(&target)).is_none() {
            return Err(Error::unsafe_member(
                member,
                format!(
                    "link target '{}' resolves outside the extraction directory",
                    target.display()
                ),
            ));
        }
    }

    Ok(rel_path)
}

/// Member types allowed in a collection archive
pub fn is_supported_entry_type(entry_type: EntryType) -> bool {
    matches!(
        entry_type,
        EntryType::Regular
            | EntryType::Continuous
            | EntryType::Directory
            | EntryType::Symlink
            | EntryType::Link
            | EntryType::GNULongName
            | EntryType::GNULongLink
            | EntryType::XHeader
            | EntryType::XGlobalHeader
    )
}

fn has_root(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
}

/// Lexically normalize a relative path; `None` when `..` climbs above the
/// start
pub fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

/// Limit on links followed while resolving one path
const MAX_LINK_HOPS: usize = 40;

enum Step {
    Parent,
    Name(OsString),
}

/// Resolve a relative path below `root`, following symlinks already on
/// disk at every step; `None` when any step leaves the root
pub fn resolve_below(root: &Path, path: &Path) -> Option<PathBuf> {
    let mut pending = Vec::new();
    push_steps(&mut pending, path)?;

    let mut resolved = PathBuf::new();
    let mut hops = 0;
    while let Some(step) = pending.pop() {
        let name = match step {
            Step::Parent => {
                if !resolved.pop() {
                    return None;
                }
                continue;
            }
            Step::Name(name) => name,
        };

        let candidate = resolved.join(&name);
        let on_disk = root.join(&candidate);
        match fs::symlink_metadata(&on_disk) {
            Ok(meta) if meta.file_type().is_symlink() => {
                hops += 1;
                if hops > MAX_LINK_HOPS {
                    return None;
                }
                // link targets are relative to the directory holding the link
                let link = fs::read_link(&on_disk).ok()?;
                push_steps(&mut pending, &link)?;
            }
            _ => resolved = candidate,
        }
    }
    Some(resolved)
}

/// Queue the components of `path` so the first one is popped next
fn push_steps(pending: &mut Vec<Step>, path: &Path) -> Option<()> {
    let mut steps = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => steps.push(Step::Name(part.to_os_string())),
            Component::ParentDir => steps.push(Step::Parent),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    pending.extend(steps.into_iter().rev());
    Some(())
}

/// Re-resolve every extracted symlink once the whole tree is on disk; a
/// later member may have turned an earlier target into an escape
fn recheck_symlinks(root: &Path, links: &[PathBuf]) -> Result<()> {
    for link in links {
        let on_disk = root.join(link);
        let Ok(target) = fs::read_link(&on_disk) else {
            continue;
        };
        let base = link.parent().map(Path::to_path_buf).unwrap_or_default();
        if resolve_below(root, &base.join(&target)).is_none() {
            fs::remove_file(&on_disk)?;
            return Err(Error::unsafe_member(
                link.display().to_string(),
                format!(
                    "link target '{}' resolves outside the extraction directory",
                    target.display()
                ),
            ));
        }
    }
    Ok(())
}

fn ensure_inside(root: &Path, dir: &Path, member: &str) -> Result<()> {
    let resolved = dir.canonicalize()?;
    if resolved.starts_with(root) {
        Ok(())
    } else {
        Err(Error::unsafe_member(
            member,
            "member directory resolves outside the extraction directory",
        ))
    }
}
