use crate::error::Result;
use crate::fetcher::HttpFetcher;
use crate::origin::Origin;

/// 擷取策略 Trait - 每種來源一個實作
///
/// 回傳 Err 或空清單時，調度器會改走下一個策略（最後是通用解析），
/// 不會讓整次爬取失敗。
#[async_trait::async_trait]
pub trait ExtractStrategy: Send + Sync {
    /// 策略名稱（日誌用）
    fn name(&self) -> &str;

    /// 此策略對應的來源
    fn origin(&self) -> Origin;

    /// 從頁面內容（或來源的 API）擷取候選圖片 URL
    async fn extract(
        &self,
        html: &str,
        target_url: &str,
        fetcher: &HttpFetcher,
    ) -> Result<Vec<String>>;
}
