//! Debounced search input.
//!
//! [`Debounce`] is the bare quiet-period tracker; [`SearchInput`] drives it
//! on a task and forwards settled text to [`CatalogStore::search`].

use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};

use crate::store::CatalogStore;

pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Quiet-period tracker: the last text set becomes ready once `delay` has
/// passed without another change.
#[derive(Debug)]
pub struct Debounce {
    last_text: String,
    last_change: Instant,
    delay: Duration,
    pending: bool,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            last_text: String::new(),
            last_change: Instant::now(),
            delay,
            pending: false,
        }
    }

    /// Record new text; restarts the quiet period only if it changed.
    pub fn set(&mut self, s: &str) {
        if s != self.last_text {
            self.last_text.clear();
            self.last_text.push_str(s);
            self.last_change = Instant::now();
            self.pending = true;
        }
    }

    /// When the pending text becomes ready, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.then(|| self.last_change + self.delay)
    }

    pub fn ready(&mut self) -> Option<String> {
        if self.pending && self.last_change.elapsed() >= self.delay {
            self.pending = false;
            return Some(self.last_text.clone());
        }
        None
    }

    /// Adopt `s` as current without scheduling it (used on submit).
    pub fn settle(&mut self, s: &str) {
        self.last_text.clear();
        self.last_text.push_str(s);
        self.pending = false;
    }
}

#[derive(Debug)]
enum InputEvent {
    Changed(String),
    Submit(String),
}

/// Search box wired to a store: keystrokes are debounced, submits are not.
pub struct SearchInput {
    tx: UnboundedSender<InputEvent>,
    task: JoinHandle<()>,
}

impl SearchInput {
    pub fn spawn(store: Arc<CatalogStore>, delay: Duration) -> Self {
        let (tx, rx) = unbounded_channel();
        let task = tokio::spawn(run_input(store, rx, delay));
        Self { tx, task }
    }

    /// The text box content changed.
    pub fn set_text(&self, text: impl Into<String>) {
        let _ = self.tx.send(InputEvent::Changed(text.into()));
    }

    /// Form submitted: search right away, dropping any pending debounce.
    pub fn submit(&self, text: impl Into<String>) {
        let _ = self.tx.send(InputEvent::Submit(text.into()));
    }
}

impl Drop for SearchInput {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_input(store: Arc<CatalogStore>, mut rx: UnboundedReceiver<InputEvent>, delay: Duration) {
    let mut debounce = Debounce::new(delay);
    debounce.settle(&store.search_query());

    loop {
        let event = match debounce.deadline() {
            Some(deadline) => tokio::select! {
                ev = rx.recv() => ev,
                _ = sleep_until(deadline) => {
                    if let Some(text) = debounce.ready() {
                        if text != store.search_query() {
                            log::debug!("[search] debounced query '{text}'");
                            spawn_search(&store, text);
                        }
                    }
                    continue;
                }
            },
            None => rx.recv().await,
        };

        match event {
            Some(InputEvent::Changed(text)) => debounce.set(&text),
            Some(InputEvent::Submit(text)) => {
                debounce.settle(&text);
                log::debug!("[search] submitted query '{text}'");
                spawn_search(&store, text);
            }
            None => break,
        }
    }
}

fn spawn_search(store: &Arc<CatalogStore>, text: String) {
    let store = Arc::clone(store);
    tokio::spawn(async move { store.search(&text).await });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ready_only_after_quiet_period() {
        let mut d = Debounce::new(Duration::from_millis(500));
        assert_eq!(d.deadline(), None);

        d.set("pi");
        tokio::time::advance(Duration::from_millis(300)).await;
        d.set("pik");
        tokio::time::advance(Duration::from_millis(499)).await;
        assert_eq!(d.ready(), None);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(d.ready(), Some("pik".to_string()));
        assert_eq!(d.ready(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_text_does_not_restart() {
        let mut d = Debounce::new(Duration::from_millis(500));
        d.set("eevee");
        let first = d.deadline().unwrap();
        tokio::time::advance(Duration::from_millis(200)).await;
        d.set("eevee");
        assert_eq!(d.deadline(), Some(first));
    }

    #[tokio::test(start_paused = true)]
    async fn settle_clears_pending() {
        let mut d = Debounce::new(Duration::from_millis(500));
        d.set("abc");
        d.settle("abc");
        assert_eq!(d.deadline(), None);
        d.set("abc");
        assert_eq!(d.deadline(), None);
    }
}
