use crate::error::Result;
use crate::filename::IMAGE_EXTENSIONS;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 已下載檔案索引
///
/// 建構時建立目的資料夾並掃描現有檔案的主檔名；之後只增不減。
/// 下載前先查這份索引，同名檔案直接跳過，重跑同一個資料夾不會重抓。
pub struct ExistingIndex {
    dir: PathBuf,
    stems: HashSet<String>,
}

impl ExistingIndex {
    /// 建立索引並從目的資料夾現況載入
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut stems = HashSet::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    stems.insert(stem.to_string());
                }
            }
        }

        Ok(Self { dir, stems })
    }

    /// 已知的檔案數量
    pub fn len(&self) -> usize {
        self.stems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }

    /// 主檔名是否已存在
    ///
    /// 先查記憶體索引，再對每個允許的副檔名探一次磁碟，
    /// 涵蓋索引載入後才出現的檔案。
    pub fn exists(&self, stem: &str) -> bool {
        if self.stems.contains(stem) {
            return true;
        }

        IMAGE_EXTENSIONS
            .iter()
            .any(|ext| self.dir.join(format!("{}{}", stem, ext)).exists())
    }

    /// 登記一個剛完成下載的主檔名
    pub fn insert(&mut self, stem: &str) {
        self.stems.insert(stem.to_string());
    }

    /// 目的資料夾路徑
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_from_directory_contents() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("DSC01.jpg"), b"x").unwrap();
        fs::write(tmp.path().join("DSC02.png"), b"x").unwrap();

        let index = ExistingIndex::new(tmp.path()).unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.exists("DSC01"));
        assert!(index.exists("DSC02"));
        assert!(!index.exists("DSC03"));
    }

    #[test]
    fn test_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/images");

        let index = ExistingIndex::new(&nested).unwrap();

        assert!(nested.is_dir());
        assert!(index.is_empty());
    }

    #[test]
    fn test_disk_probe_catches_files_added_after_seeding() {
        let tmp = tempfile::tempdir().unwrap();
        let index = ExistingIndex::new(tmp.path()).unwrap();
        assert!(!index.exists("late"));

        // 索引建好之後才落地的檔案，靠磁碟探測補上
        fs::write(tmp.path().join("late.webp"), b"x").unwrap();
        assert!(index.exists("late"));
    }

    #[test]
    fn test_insert_grows_monotonically() {
        let tmp = tempfile::tempdir().unwrap();
        let mut index = ExistingIndex::new(tmp.path()).unwrap();

        index.insert("new_one");
        assert!(index.exists("new_one"));
        assert_eq!(index.len(), 1);
    }
}
