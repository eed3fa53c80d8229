use sha2::{Digest, Sha256};

/// 目的資料夾接受的副檔名（檢視器原生支援的點陣格式）
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".gif", ".bmp", ".tiff"];

/// 無法辨識或不支援的格式一律落到這個副檔名
pub const DEFAULT_EXTENSION: &str = ".jpg";

const MAX_STEM_LEN: usize = 50;

/// 解析完成的檔名：主檔名（去重鍵）加上保證合法的副檔名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub stem: String,
    pub ext: String,
}

impl FileRecord {
    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem, self.ext)
    }
}

/// 從 URL 導出穩定的磁碟檔名
///
/// 路徑末段有可用的名字就沿用（副檔名正規化進允許清單，
/// .avif 轉成預設格式）；否則退回 `img_{序號}_{雜湊}` 命名，
/// 同一個 URL 的雜湊永遠相同，保證可重跑也不互撞。
pub fn resolve(url: &str, index: usize) -> FileRecord {
    if let Some(record) = resolve_from_path(url) {
        return record;
    }

    FileRecord {
        stem: format!("img_{:04}_{}", index, short_hash(url)),
        ext: DEFAULT_EXTENSION.to_string(),
    }
}

/// URL 路徑本身是否就是圖片連結（免抓頁面、免解析）
pub fn is_direct_image_url(url: &str) -> bool {
    let path = url_path(url).to_lowercase();
    if path.is_empty() {
        return false;
    }

    if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return true;
    }

    // 路徑中夾帶圖片副檔名也算（.avif 雖不直接存檔，但也是圖片連結）
    IMAGE_EXTENSIONS
        .iter()
        .chain(std::iter::once(&".avif"))
        .any(|ext| path.contains(ext))
}

fn resolve_from_path(url: &str) -> Option<FileRecord> {
    let decoded = urlencoding::decode(url).ok()?;
    let path = url_path(&decoded);
    let name = path.rsplit('/').next()?;

    if name.is_empty() || !name.contains('.') {
        return None;
    }

    // 去掉 query/@ 殘留，再替換檔案系統非法字元
    let name = name.split(['?', '#', '@']).next()?;
    let scrubbed: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect();

    let dot = scrubbed.rfind('.')?;
    let (stem_part, ext_part) = scrubbed.split_at(dot);
    if stem_part.is_empty() {
        return None;
    }

    let stem: String = stem_part.chars().take(MAX_STEM_LEN).collect();
    let mut ext = ext_part.to_lowercase();

    // avif 目的端檢視器不支援，改存預設格式
    if ext == ".avif" {
        ext = DEFAULT_EXTENSION.to_string();
    }
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        ext = DEFAULT_EXTENSION.to_string();
    }

    Some(FileRecord { stem, ext })
}

/// 取出 URL 的路徑部分（去掉 scheme、主機、query 與 fragment）
fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let path = match rest.find('/') {
        Some(i) => &rest[i..],
        None => return "",
    };
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// URL 字串的 SHA-256 前 6 碼十六進位
fn short_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..6].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_keeps_path_name() {
        let record = resolve("https://example.com/photos/Cat_01.JPG?w=300", 1);
        assert_eq!(record.stem, "Cat_01");
        assert_eq!(record.ext, ".jpg");
        assert_eq!(record.file_name(), "Cat_01.jpg");
    }

    #[test]
    fn test_resolve_decodes_percent_escapes() {
        let record = resolve("https://example.com/%E5%9C%96%E7%89%87.png", 1);
        assert_eq!(record.stem, "圖片");
        assert_eq!(record.ext, ".png");
    }

    #[test]
    fn test_resolve_normalizes_avif_to_default() {
        let record = resolve("https://cdn.example.com/a/b/cover.avif", 1);
        assert_eq!(record.stem, "cover");
        assert_eq!(record.ext, ".jpg");
    }

    #[test]
    fn test_resolve_foreign_extension_falls_to_default() {
        let record = resolve("https://example.com/view.php", 1);
        assert_eq!(record.stem, "view");
        assert_eq!(record.ext, ".jpg");
    }

    #[test]
    fn test_resolve_scrubs_illegal_characters() {
        let record = resolve("https://example.com/a|b<c>.png", 3);
        assert_eq!(record.stem, "a_b_c_");
        assert_eq!(record.ext, ".png");
    }

    #[test]
    fn test_fallback_pattern_and_stable_hash() {
        let record = resolve("https://example.com/gallery", 1);

        assert!(record.stem.starts_with("img_0001_"));
        assert_eq!(record.stem.len(), "img_0001_".len() + 6);
        assert_eq!(record.ext, ".jpg");

        // 同一個 URL 的雜湊必須穩定
        let again = resolve("https://example.com/gallery", 1);
        assert_eq!(record, again);

        // 不同 URL 的雜湊應該不同
        let other = resolve("https://example.com/another", 1);
        assert_ne!(record.stem, other.stem);
    }

    #[test]
    fn test_fallback_zero_pads_index() {
        let record = resolve("https://example.com/", 42);
        assert!(record.stem.starts_with("img_0042_"));
    }

    #[test]
    fn test_direct_image_url_detection() {
        assert!(is_direct_image_url("https://example.com/pic.png"));
        assert!(is_direct_image_url("https://example.com/pic.jpg?width=1200"));
        assert!(is_direct_image_url("https://example.com/pic.avif"));
        assert!(is_direct_image_url("https://example.com/photo.jpg.html"));

        assert!(!is_direct_image_url("https://example.com/gallery"));
        assert!(!is_direct_image_url("https://example.com"));
    }
}
