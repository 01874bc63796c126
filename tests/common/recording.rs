use parking_lot::Mutex;
use std::sync::Arc;

/// Records every `(url, prev)` pair a resolver is called with
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, url: &str, prev: &str) {
        self.calls.lock().push((url.to_string(), prev.to_string()));
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn count_for(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|(u, _)| u == url).count()
    }

    /// `[[a main.scss] [b a]]`, matching how call sequences are written in assertions
    pub fn render(&self) -> String {
        let pairs: Vec<String> = self
            .calls
            .lock()
            .iter()
            .map(|(url, prev)| format!("[{url} {prev}]"))
            .collect();
        format!("[{}]", pairs.join(" "))
    }
}

/// Body returned for the magic module `a`, which imports `b`
pub const A_SOURCE: &str = ".a { color: #aaaaaa }\n@import 'b';";
pub const B_SOURCE: &str = ".b { color: #bbbbbb }";

/// Expected output once `a` and `b` are both inlined
pub const AB_CSS: &str = ".a { color: #aaaaaa }\n.b { color: #bbbbbb }\n";
