use thiserror::Error;

/// 爬取過程中的錯誤分類
///
/// 重試策略依類型而定：
/// - `Transport` / `HttpStatus` / `Undersized`：指數退避重試，直到次數上限
/// - `Decode`：不重試，改用下一個擷取策略
/// - `Filesystem`：不重試，該項目直接視為失敗，整體流程繼續
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("連線失敗: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP 狀態錯誤: {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("JSON 解析失敗: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("檔案過小 ({0} bytes)")]
    Undersized(u64),

    #[error("檔案系統錯誤: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("選擇器解析失敗: {0}")]
    Selector(String),
}

impl CrawlError {
    pub fn selector(msg: impl Into<String>) -> Self {
        Self::Selector(msg.into())
    }

    /// 此錯誤是否值得重試
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::HttpStatus(_) | Self::Undersized(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
