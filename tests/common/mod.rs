#![allow(dead_code)]

pub mod mock_backend;

use mock_backend::MockBackend;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tuxreader::notify::{ChannelNotifier, Notice};
use tuxreader::speech::{CollapsePolicy, PlaybackEngine, Progress, ProgressReceiver};

const TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestContext {
    pub backend: Arc<MockBackend>,
    pub engine: PlaybackEngine,
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

impl TestContext {
    pub fn new(backend: MockBackend) -> Self {
        let backend = Arc::new(backend);
        let (notifier, notices) = ChannelNotifier::new();
        let engine = PlaybackEngine::new(
            backend.clone(),
            Arc::new(notifier),
            CollapsePolicy::default(),
        );
        Self {
            backend,
            engine,
            notices,
        }
    }

    /// Wait for the speaking flag to drop
    pub async fn wait_idle(&self) {
        let mut speaking = self.engine.speaking();
        tokio::time::timeout(TIMEOUT, speaking.wait_for(|speaking| !*speaking))
            .await
            .expect("playback did not finish")
            .expect("engine dropped");
    }

    /// Release held utterances until the session is over
    pub async fn play_through(&self) {
        tokio::time::timeout(TIMEOUT, async {
            while self.engine.is_speaking() {
                self.backend.complete_all();
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("playback did not finish");
    }

    /// Let the driver run until `count` utterances are held
    pub async fn wait_pending(&self, count: usize) {
        tokio::time::timeout(TIMEOUT, async {
            while self.backend.pending_count() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("utterance was never submitted");
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            notices.push(notice);
        }
        notices
    }
}

pub fn drain(progress: &mut ProgressReceiver) -> Vec<Progress> {
    let mut events = Vec::new();
    while let Some(event) = progress.try_recv() {
        events.push(event);
    }
    events
}

/// Give spawned tasks a few turns on the current-thread runtime
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
