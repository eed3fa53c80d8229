use std::sync::Arc;

/// 文字日誌回呼：每行一則人類可讀的狀態訊息
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;
/// 數值進度回呼：(目前完成數, 總數)
pub type ProgressSink = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// 進度回報器
///
/// 日誌與進度都是呼叫端可選註冊的依賴，未註冊時靜默略過。
/// 以值傳遞（`Clone`）分發給各元件，註冊後不再變動。
#[derive(Clone, Default)]
pub struct Reporter {
    log: Option<LogSink>,
    progress: Option<ProgressSink>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.log = Some(Arc::new(sink));
        self
    }

    pub fn with_progress(mut self, sink: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(sink));
        self
    }

    pub fn log(&self, message: &str) {
        if let Some(sink) = &self.log {
            sink(message);
        }
    }

    pub fn progress(&self, current: usize, total: usize) {
        if let Some(sink) = &self.progress {
            sink(current, total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_sinks_receive_events() {
        let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let ticks: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));

        let lines_ref = Arc::clone(&lines);
        let ticks_ref = Arc::clone(&ticks);
        let reporter = Reporter::new()
            .with_log(move |msg| lines_ref.lock().unwrap().push(msg.to_string()))
            .with_progress(move |cur, total| ticks_ref.lock().unwrap().push((cur, total)));

        reporter.log("你好");
        reporter.progress(1, 3);

        assert_eq!(lines.lock().unwrap().as_slice(), ["你好"]);
        assert_eq!(ticks.lock().unwrap().as_slice(), [(1, 3)]);
    }

    #[test]
    fn test_unregistered_sinks_are_noops() {
        let reporter = Reporter::new();
        reporter.log("沒有註冊也不會出錯");
        reporter.progress(0, 0);
    }
}
