use crate::origin::{Origin, classify};
use rand::seq::IndexedRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderValue, REFERER, USER_AGENT};

/// 請求用途，決定 Accept 的變體
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// 抓取 HTML 頁面或 API
    Page,
    /// 抓取圖片本體
    Image,
}

const ACCEPT_PAGE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_IMAGE: &str = "image/webp,image/apng,image/*,*/*;q=0.8";

/// 預設的桌面瀏覽器 User-Agent 池，每次請求隨機挑一個
const USER_AGENT_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
];

const PIXIV_REFERER: &str = "https://www.pixiv.net/";
const PHOTOS18_REFERER: &str = "https://www.photos18.com/";
const FOAMGIRL_REFERER: &str = "https://www.foamgirl.net/";

/// 請求頭策略
///
/// 建構後不可變；pixiv 的 session 憑證在建構時注入，呼叫端不再修改。
/// pixiv 的圖片與 API 伺服器缺 Referer 會直接回 403，所以 pixiv 系列
/// 一律帶 Referer 與 session cookie；photos18 / foamgirl 只帶 Referer；
/// 通用來源兩者都不帶（對陌生網站送 Referer 反而容易觸發反爬）。
#[derive(Clone)]
pub struct HeaderPolicy {
    user_agents: Vec<String>,
    pixiv_session: Option<String>,
}

impl HeaderPolicy {
    pub fn new(pixiv_session: Option<String>) -> Self {
        Self {
            user_agents: USER_AGENT_POOL.iter().map(|ua| ua.to_string()).collect(),
            pixiv_session,
        }
    }

    /// 依 URL 來源與用途組出請求頭
    pub fn headers_for(&self, url: &str, purpose: Purpose) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let ua = {
            let mut rng = rand::rng();
            self.user_agents
                .choose(&mut rng)
                .map(String::as_str)
                .unwrap_or(USER_AGENT_POOL[0])
        };
        if let Ok(value) = HeaderValue::from_str(ua) {
            headers.insert(USER_AGENT, value);
        }

        let accept = match purpose {
            Purpose::Page => ACCEPT_PAGE,
            Purpose::Image => ACCEPT_IMAGE,
        };
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9"));

        match classify(url) {
            Origin::PixivLike => {
                headers.insert(REFERER, HeaderValue::from_static(PIXIV_REFERER));
                if let Some(session) = &self.pixiv_session {
                    if let Ok(value) = HeaderValue::from_str(&format!("PHPSESSID={}", session)) {
                        headers.insert(COOKIE, value);
                    }
                }
            }
            Origin::Photos18Like => {
                headers.insert(REFERER, HeaderValue::from_static(PHOTOS18_REFERER));
            }
            Origin::FoamgirlLike => {
                headers.insert(REFERER, HeaderValue::from_static(FOAMGIRL_REFERER));
            }
            Origin::Generic => {}
        }

        headers
    }
}
