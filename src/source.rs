//! Where class file bytes come from.
//!
//! A build only ever asks its source for siblings in the same directory: the
//! `Outer$Inner.class` files holding inner classes of the class being built.

use std::{
    collections::HashMap,
    fmt::{self, Debug},
    fs::{self, File},
    io::{self, Read, Seek},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use zip::ZipArchive;

const CLASS_EXTENSION: &str = ".class";
const MAX_ENTRY_SIZE_HINT: u64 = 1 << 20;

pub trait ClassSource {
    /// File name without the `.class` extension, e.g. `Outer$Inner`.
    fn base_name(&self) -> &str;

    /// `<base_name>.class` next to this file, if it exists.
    fn find_sibling(&self, base_name: &str) -> Option<Self>
    where
        Self: Sized;

    fn read(&self) -> io::Result<Vec<u8>>;
}

/// A `.class` file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryClassFile {
    path: PathBuf,
    base_name: String,
}

impl DirectoryClassFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let base_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.strip_suffix(CLASS_EXTENSION).unwrap_or(name))
            .unwrap_or_default()
            .to_string();
        Self { path, base_name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClassSource for DirectoryClassFile {
    fn base_name(&self) -> &str {
        &self.base_name
    }

    fn find_sibling(&self, base_name: &str) -> Option<Self> {
        let path = self
            .path
            .with_file_name(format!("{base_name}{CLASS_EXTENSION}"));
        path.is_file().then(|| Self {
            path,
            base_name: base_name.to_string(),
        })
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

/// A jar (zip) archive. Entry reads are serialized, so one archive can back any
/// number of builds.
pub struct JarArchive<R = File> {
    archive: Mutex<ZipArchive<R>>,
}

impl<R> Debug for JarArchive<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JarArchive").finish_non_exhaustive()
    }
}

impl JarArchive<File> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> JarArchive<R> {
    pub fn new(reader: R) -> io::Result<Self> {
        let archive = ZipArchive::new(reader).map_err(io::Error::other)?;
        Ok(Self {
            archive: Mutex::new(archive),
        })
    }

    /// The class file stored under `entry_name`, e.g. `pkg/Outer.class`.
    pub fn class_file(&self, entry_name: &str) -> Option<JarClassFile<'_, R>> {
        let (directory, file_name) = match entry_name.rsplit_once('/') {
            Some((directory, file_name)) => (format!("{directory}/"), file_name),
            None => (String::new(), entry_name),
        };
        let base_name = file_name.strip_suffix(CLASS_EXTENSION)?.to_string();
        self.contains(entry_name).then(|| JarClassFile {
            archive: self,
            directory,
            base_name,
        })
    }

    pub fn contains(&self, entry_name: &str) -> bool {
        self.archive.lock().index_for_name(entry_name).is_some()
    }

    fn read_entry(&self, entry_name: &str) -> io::Result<Vec<u8>> {
        let mut archive = self.archive.lock();
        let mut entry = archive.by_name(entry_name).map_err(io::Error::other)?;
        // the declared size is only a hint from the archive
        let capacity = entry.size().min(MAX_ENTRY_SIZE_HINT) as usize;
        let mut content = Vec::with_capacity(capacity);
        entry.read_to_end(&mut content)?;
        Ok(content)
    }
}

pub struct JarClassFile<'a, R = File> {
    archive: &'a JarArchive<R>,
    /// Entry directory with its trailing `/`, empty at the archive root.
    directory: String,
    base_name: String,
}

impl<R> Debug for JarClassFile<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JarClassFile")
            .field("entry", &self.entry_name())
            .finish()
    }
}

impl<R> JarClassFile<'_, R> {
    pub fn entry_name(&self) -> String {
        format!("{}{}{CLASS_EXTENSION}", self.directory, self.base_name)
    }
}

impl<R: Read + Seek> ClassSource for JarClassFile<'_, R> {
    fn base_name(&self) -> &str {
        &self.base_name
    }

    fn find_sibling(&self, base_name: &str) -> Option<Self> {
        let sibling = Self {
            archive: self.archive,
            directory: self.directory.clone(),
            base_name: base_name.to_string(),
        };
        self.archive
            .contains(&sibling.entry_name())
            .then_some(sibling)
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        self.archive.read_entry(&self.entry_name())
    }
}

/// Class files held in memory, keyed by base name. All of them are siblings.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    classes: HashMap<String, Vec<u8>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, base_name: impl Into<String>, bytes: Vec<u8>) {
        self.classes.insert(base_name.into(), bytes);
    }

    pub fn class_file(&self, base_name: &str) -> Option<MemoryClassFile<'_>> {
        self.classes
            .contains_key(base_name)
            .then(|| MemoryClassFile {
                directory: self,
                base_name: base_name.to_string(),
            })
    }
}

#[derive(Debug, Clone)]
pub struct MemoryClassFile<'a> {
    directory: &'a MemoryDirectory,
    base_name: String,
}

impl ClassSource for MemoryClassFile<'_> {
    fn base_name(&self) -> &str {
        &self.base_name
    }

    fn find_sibling(&self, base_name: &str) -> Option<Self> {
        self.directory.class_file(base_name)
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        self.directory
            .classes
            .get(&self.base_name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, self.base_name.clone()))
    }
}
