use crate::events::RoundEvent;
use crate::game_trait::ArcadeGame;
use crate::input::Command;
use crate::render::{RenderSink, RoundObserver};

/// Result of one driven frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Running,
    Paused,
    /// Round over; waiting for Try Again or teardown.
    Finished,
    /// Torn down; the host should stop calling.
    Stopped,
}

/// Owns a game and pumps it from the host's frame callback.
///
/// The driver is the only caller of `update`. It forwards each tick's frame
/// to the sink and the round notifications to the observer, dispatching at
/// most one completion per round even if a game misbehaves.
pub struct LoopDriver<G: ArcadeGame, S: RenderSink, O: RoundObserver> {
    game: G,
    sink: S,
    observer: O,
    started: bool,
    stopped: bool,
    completion_dispatched: bool,
    pending_try_again: bool,
    /// Paused by visibility rather than by the player.
    auto_paused: bool,
}

impl<G: ArcadeGame, S: RenderSink, O: RoundObserver> LoopDriver<G, S, O> {
    pub fn new(game: G, sink: S, observer: O) -> Self {
        Self {
            game,
            sink,
            observer,
            started: false,
            stopped: false,
            completion_dispatched: false,
            pending_try_again: false,
            auto_paused: false,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn start(&mut self, now_ms: u64) {
        if self.started || self.stopped {
            return;
        }
        self.started = true;
        self.game.start(now_ms);
        tracing::info!(game = %self.game.metadata().name, "Loop started");
        self.sink.present(&self.game.frame());
    }

    /// Record a command; it takes effect on the next frame.
    pub fn input(&mut self, command: Command) {
        if self.stopped {
            return;
        }
        if command == Command::TryAgain {
            self.pending_try_again = true;
        } else {
            self.game.apply_command(command);
        }
    }

    /// Host visibility change. Hiding pauses, showing resumes only a pause
    /// that hiding caused.
    pub fn visibility(&mut self, hidden: bool, now_ms: u64) {
        if self.stopped || !self.started {
            return;
        }
        if hidden {
            if !self.game.session().paused {
                self.game.pause(now_ms);
                self.auto_paused = self.game.session().paused;
            }
        } else if self.auto_paused {
            self.auto_paused = false;
            self.game.resume(now_ms);
        }
    }

    /// One host frame.
    pub fn frame(&mut self, now_ms: u64) -> FrameStatus {
        if self.stopped {
            return FrameStatus::Stopped;
        }
        if !self.started {
            // Starting presents the opening frame; the first tick runs next frame.
            self.start(now_ms);
            return self.status();
        }
        if self.pending_try_again {
            self.pending_try_again = false;
            self.try_again(now_ms);
        }

        let events = self.game.update(now_ms);
        self.dispatch(&events);
        self.sink.present(&self.game.frame());
        self.status()
    }

    fn status(&self) -> FrameStatus {
        if self.game.is_finished() {
            FrameStatus::Finished
        } else if self.game.session().paused {
            FrameStatus::Paused
        } else {
            FrameStatus::Running
        }
    }

    /// Restart the round right away.
    pub fn try_again(&mut self, now_ms: u64) {
        if self.stopped {
            return;
        }
        self.completion_dispatched = false;
        self.auto_paused = false;
        self.game.try_again(now_ms);
    }

    /// Stop ticking and cancel everything pending. Idempotent.
    pub fn teardown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.game.teardown();
        tracing::info!("Loop torn down");
    }

    fn dispatch(&mut self, events: &[RoundEvent]) {
        for event in events {
            if event.is_wrong_answer() {
                self.observer.on_wrong_answer();
            }
            if let RoundEvent::Completed(outcome) = event {
                if self.completion_dispatched {
                    tracing::warn!("Dropping duplicate round completion");
                    continue;
                }
                self.completion_dispatched = true;
                self.observer.on_complete(outcome);
            }
        }
    }
}
