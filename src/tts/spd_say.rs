//! Speech-dispatcher backend driving the `spd-say` client
//!
//! Each utterance is one `spd-say -w` process; the utterance completes
//! when that process exits.

use super::{SpeechBackend, Utterance, Voice};
use anyhow::{Context, Result};
use std::process::Stdio;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

const PROGRAM: &str = "spd-say";

#[derive(Debug)]
pub struct SpdSayBackend {
    program: String,
    voices: Vec<Voice>,
    rate: AtomicI32,
    voice: Mutex<Option<String>>,
    /// Kill switch for the process of the in-flight utterance
    current: Mutex<Option<oneshot::Sender<()>>>,
}

impl SpdSayBackend {
    /// Probe speech-dispatcher by listing its synthesis voices
    pub async fn connect() -> Result<Self> {
        Self::with_program(PROGRAM).await
    }

    /// Use a different `spd-say` executable
    pub async fn with_program(program: impl Into<String>) -> Result<Self> {
        let program = program.into();
        let output = Command::new(&program)
            .arg("-L")
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("failed to run {}", program))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} -L failed with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let voices = parse_voice_list(&String::from_utf8_lossy(&output.stdout));
        info!("🔊 Connected to speech-dispatcher ({} voices)", voices.len());
        Ok(Self::with_voices(program, voices))
    }

    fn with_voices(program: impl Into<String>, voices: Vec<Voice>) -> Self {
        Self {
            program: program.into(),
            voices,
            rate: AtomicI32::new(0),
            voice: Mutex::new(None),
            current: Mutex::new(None),
        }
    }
}

impl SpeechBackend for SpdSayBackend {
    fn name(&self) -> &str {
        "spd-say"
    }

    fn set_rate(&self, rate: i32) {
        self.rate.store(rate.clamp(-100, 100), Ordering::SeqCst);
    }

    fn set_voice(&self, name: &str) {
        *self.voice.lock().unwrap_or_else(PoisonError::into_inner) = Some(name.to_string());
    }

    fn list_voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn say(&self, text: &str) -> Result<Utterance> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-w")
            .arg("-r")
            .arg(self.rate.load(Ordering::SeqCst).to_string());
        if let Some(voice) = self
            .voice
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_deref()
        {
            cmd.arg("-y").arg(voice);
        }
        cmd.arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.program))?;
        debug!("📢 spd-say speaking {} chars", text.len());

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        // A replaced switch drops its sender, which kills the older process
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(kill_tx);

        let (done, utterance) = Utterance::pending();
        tokio::spawn(async move {
            let killed = tokio::select! {
                status = child.wait() => {
                    match status {
                        Ok(status) if !status.success() => warn!("⚠️ spd-say exited with {}", status),
                        Ok(_) => {}
                        Err(e) => warn!("⚠️ Failed to wait on spd-say: {}", e),
                    }
                    false
                }
                _ = kill_rx => true,
            };
            if killed {
                if let Err(e) = child.kill().await {
                    debug!("spd-say already gone: {}", e);
                }
            }
            done.complete();
        });
        Ok(utterance)
    }

    fn stop_talking(&self) {
        if let Some(kill) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let _ = kill.send(());
        }
        // Killing the client does not flush what the daemon already queued.
        // `-C` returns at once; waiting on it keeps a late flush from
        // cancelling the next utterance and reaps the child.
        match std::process::Command::new(&self.program)
            .arg("-C")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if !status.success() => {
                warn!("⚠️ {} -C exited with {}", self.program, status)
            }
            Ok(_) => {}
            Err(e) => warn!("⚠️ Failed to cancel speech-dispatcher output: {}", e),
        }
    }
}

/// Parse `spd-say -L` output.
///
/// Columns are NAME, LANGUAGE and VARIANT; names may contain spaces, so
/// the line is read from the right.
pub fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .filter(|line| !line.trim_start().starts_with("NAME"))
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [] | [_] => None,
                [name, locale] => Some(Voice::new(*name, *locale)),
                [name @ .., locale, variant] => Some(Voice {
                    name: name.join(" "),
                    locale: locale.to_string(),
                    variant: (*variant != "none").then(|| variant.to_string()),
                }),
            }
        })
        .collect()
}
