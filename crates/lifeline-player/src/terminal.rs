//! The terminal event loop.
//!
//! Three sources feed one `tokio::select!` loop: countdown pulses, animation
//! frames and input lines. Only the loop touches the controller, so every
//! session call runs to completion before the next one starts.

use std::io::BufRead;
use std::time::Duration;

use lifeline_session::application::ticker::{CountdownPulse, TICK_PERIOD, spawn_countdown_ticker};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::controller::{Action, Animation, Controller};
use crate::error::AppError;

/// Output produced by an animation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Next piece of text.
    Text {
        /// Animation the text belongs to.
        generation: u64,
        /// The text.
        text: String,
    },
    /// The animation is complete.
    Done {
        /// Animation that completed.
        generation: u64,
    },
}

/// Spawns the typing task for `animation`. Characters are sent one by one
/// when `per_char` is non-zero, otherwise the whole text at once.
#[must_use]
pub fn spawn_animation(animation: Animation, frames: mpsc::Sender<Frame>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Animation {
            generation,
            text,
            delay,
            per_char,
        } = animation;

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if per_char.is_zero() {
            if frames.send(Frame::Text { generation, text }).await.is_err() {
                return;
            }
        } else {
            for c in text.chars() {
                let frame = Frame::Text {
                    generation,
                    text: c.to_string(),
                };
                if frames.send(frame).await.is_err() {
                    return;
                }
                tokio::time::sleep(per_char).await;
            }
        }

        let _ = frames.send(Frame::Done { generation }).await;
    })
}

/// Forwards lines from `reader` on a dedicated thread until it is
/// exhausted or the receiver is dropped. A blocking read cannot be
/// cancelled, so the thread is left detached when the player quits.
pub fn spawn_line_reader<R>(reader: R, lines: mpsc::Sender<String>) -> std::thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if lines.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    debug!(error = %err, "input closed");
                    break;
                }
            }
        }
    })
}

/// Plays the session on `out`, reading player input from `input`, until
/// the player quits or input ends.
///
/// # Errors
///
/// Returns `AppError::Io` if writing to `out` fails.
#[instrument(skip_all, fields(session_id = %controller.session().id()))]
pub async fn run<W>(
    mut controller: Controller,
    mut input: mpsc::Receiver<String>,
    out: &mut W,
) -> Result<(), AppError>
where
    W: AsyncWrite + Unpin,
{
    run_with_period(&mut controller, &mut input, out, TICK_PERIOD).await
}

async fn run_with_period<W>(
    controller: &mut Controller,
    input: &mut mpsc::Receiver<String>,
    out: &mut W,
    period: Duration,
) -> Result<(), AppError>
where
    W: AsyncWrite + Unpin,
{
    let (pulse_tx, mut pulses) = mpsc::channel::<CountdownPulse>(4);
    let ticker = spawn_countdown_ticker(period, pulse_tx);
    let (frame_tx, mut frames) = mpsc::channel::<Frame>(64);
    let mut animation: Option<JoinHandle<()>> = None;

    let mut actions = controller.start();
    loop {
        if apply(actions, &mut animation, &frame_tx, out).await? {
            break;
        }

        actions = tokio::select! {
            Some(pulse) = pulses.recv() => {
                debug!(sequence = pulse.sequence, "countdown pulse");
                controller.on_pulse()
            }
            Some(frame) = frames.recv() => match frame {
                Frame::Text { generation, text } => {
                    if generation == controller.generation() {
                        out.write_all(text.as_bytes()).await?;
                        out.flush().await?;
                    }
                    Vec::new()
                }
                Frame::Done { generation } => {
                    if generation == controller.generation() {
                        out.write_all(b"\n").await?;
                    }
                    controller.on_animation_done(generation)
                }
            },
            line = input.recv() => match line {
                Some(line) => controller.on_input(&line),
                None => {
                    info!("input closed, leaving");
                    break;
                }
            },
        };
    }

    if let Some(handle) = animation.take() {
        handle.abort();
    }
    ticker.abort();
    out.flush().await?;
    Ok(())
}

/// Carries out `actions`. Returns whether the player asked to quit.
async fn apply<W>(
    actions: Vec<Action>,
    animation: &mut Option<JoinHandle<()>>,
    frames: &mpsc::Sender<Frame>,
    out: &mut W,
) -> Result<bool, AppError>
where
    W: AsyncWrite + Unpin,
{
    for action in actions {
        match action {
            Action::Print(line) => {
                out.write_all(line.as_bytes()).await?;
                if !line.ends_with('\n') {
                    out.write_all(b"\n").await?;
                }
            }
            Action::Animate(next) => {
                if let Some(previous) = animation.replace(spawn_animation(next, frames.clone())) {
                    previous.abort();
                }
            }
            Action::CancelAnimation => {
                if let Some(previous) = animation.take() {
                    previous.abort();
                }
            }
            Action::Quit => return Ok(true),
        }
    }
    out.flush().await?;
    Ok(false)
}
