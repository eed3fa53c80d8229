/// 來源網站分類
///
/// 依目標 URL 判斷要套用哪一套擷取與請求頭策略。
/// 比對不到任何已知特徵時一律歸為 `Generic`，沒有失敗情況。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// pixiv 系列（pixiv.net 頁面與 pximg.net 圖片伺服器）
    PixivLike,
    /// photos18 系列（圖片放在自家 CDN）
    Photos18Like,
    /// foamgirl 系列（圖片放在 image.acg.lol）
    FoamgirlLike,
    /// 其他網站，走通用解析
    Generic,
}

/// 各來源的 URL 特徵字串（不分大小寫的子字串比對）
const PIXIV_SIGNATURES: &[&str] = &["pixiv.net", "pximg.net"];
const PHOTOS18_SIGNATURES: &[&str] = &["photos18.com"];
const FOAMGIRL_SIGNATURES: &[&str] = &["foamgirl", "acg.lol"];

/// 將 URL 分類到對應的來源
pub fn classify(url: &str) -> Origin {
    let lower = url.to_lowercase();

    if PIXIV_SIGNATURES.iter().any(|sig| lower.contains(sig)) {
        Origin::PixivLike
    } else if PHOTOS18_SIGNATURES.iter().any(|sig| lower.contains(sig)) {
        Origin::Photos18Like
    } else if FOAMGIRL_SIGNATURES.iter().any(|sig| lower.contains(sig)) {
        Origin::FoamgirlLike
    } else {
        Origin::Generic
    }
}
