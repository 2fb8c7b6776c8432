use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::RoundClock;
use crate::config::RoundConfig;
use crate::error::EngineError;
use crate::events::{RoundEvent, RoundOutcome};
use crate::game_trait::{AfterWrong, GameRules, Question};
use crate::options::{AnswerOption, generate_options};
use crate::schedule::{Deferred, Scheduler, TimerId};

/// Mutable per-round state the HUD shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSession {
    pub lives: u8,
    pub starting_lives: u8,
    pub score: u32,
    pub question_index: u32,
    pub total_questions: u32,
    pub paused: bool,
    /// Post-collision window; the world does not move.
    pub frozen: bool,
    /// Wrong-answer slowdown; the player moves at half speed.
    pub slowed: bool,
    /// Hint already spent on the current question index.
    pub hint_used: bool,
    pub clock: RoundClock,
}

impl RoundSession {
    pub fn new(config: &RoundConfig) -> Self {
        Self {
            lives: config.starting_lives,
            starting_lives: config.starting_lives,
            score: 0,
            question_index: 0,
            total_questions: config.total_questions,
            paused: false,
            frozen: false,
            slowed: false,
            hint_used: false,
            clock: RoundClock::default(),
        }
    }
}

/// Where the round lifecycle stands. Pausing is tracked separately on the
/// session and never changes the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Not started yet, or producing a question.
    Generating,
    AwaitingInput,
    Evaluating,
    Advancing,
    Penalizing,
    Completed,
    GameOver,
}

impl RoundPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, RoundPhase::Completed | RoundPhase::GameOver)
    }
}

/// What an input did to the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Dropped: paused, frozen, finished or not started.
    Ignored,
    /// Correct; next question is up.
    Advanced,
    /// Correct on the last question.
    Completed,
    /// Wrong, with lives left. `replace_options` is set when the option set
    /// was regenerated and needs placing again.
    Penalized { replace_options: bool },
    /// Hazard hit with lives left; the world is frozen for a while.
    Frozen,
    /// Out of lives.
    GameOver,
}

/// The question/answer lifecycle of one round, generic over the variant rules.
#[derive(Debug)]
pub struct RoundMachine<R: GameRules> {
    rules: R,
    config: RoundConfig,
    session: RoundSession,
    phase: RoundPhase,
    question: Option<Question>,
    options: Vec<AnswerOption>,
    /// Bumped every time the option set is replaced.
    serial: u64,
    scheduler: Scheduler,
    hint_timer: Option<TimerId>,
    unfreeze_timer: Option<TimerId>,
    slow_timer: Option<TimerId>,
    events: Vec<RoundEvent>,
    outcome: Option<RoundOutcome>,
    started: bool,
    torn_down: bool,
}

impl<R: GameRules> RoundMachine<R> {
    pub fn new(rules: R, config: RoundConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            rules,
            session: RoundSession::new(&config),
            config,
            phase: RoundPhase::Generating,
            question: None,
            options: Vec::new(),
            serial: 0,
            scheduler: Scheduler::default(),
            hint_timer: None,
            unfreeze_timer: None,
            slow_timer: None,
            events: Vec::new(),
            outcome: None,
            started: false,
            torn_down: false,
        })
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn session(&self) -> &RoundSession {
        &self.session
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    /// For placing options in the world; values and correctness stay put.
    pub fn options_mut(&mut self) -> &mut [AnswerOption] {
        &mut self.options
    }

    /// Identifies the current option set.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn outcome(&self) -> Option<&RoundOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn is_finished(&self) -> bool {
        self.torn_down || self.phase.is_terminal()
    }

    /// True when ticks should move the world.
    pub fn is_running(&self) -> bool {
        self.started && !self.is_finished() && !self.session.paused
    }

    /// Active (pause-excluded) ms since the round started.
    pub fn active_ms(&self, now_ms: u64) -> u64 {
        self.session.clock.elapsed_ms(now_ms)
    }

    /// Take the events raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start the clock and produce the first question.
    pub fn start<G: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut G) {
        if self.torn_down || self.started {
            return;
        }
        self.started = true;
        self.session.clock.start(now_ms);
        tracing::info!(
            level = self.config.level,
            total = self.config.total_questions,
            lives = self.session.lives,
            "Round started"
        );
        self.new_question(rng);
    }

    /// Restore the starting state and begin again at `now_ms`.
    pub fn reset<G: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut G) {
        if self.torn_down {
            return;
        }
        self.scheduler.cancel_all();
        self.hint_timer = None;
        self.unfreeze_timer = None;
        self.slow_timer = None;
        self.session = RoundSession::new(&self.config);
        self.outcome = None;
        self.events.clear();
        self.phase = RoundPhase::Generating;
        self.started = false;
        tracing::info!("Round reset");
        self.start(now_ms, rng);
    }

    /// Stop for good. Pending transitions are dropped.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.events.clear();
        let dropped = self.scheduler.cancel_all();
        self.hint_timer = None;
        self.unfreeze_timer = None;
        self.slow_timer = None;
        tracing::debug!(dropped, "Round torn down");
    }

    pub fn pause(&mut self, now_ms: u64) -> bool {
        if !self.started || self.is_finished() || !self.session.clock.pause(now_ms) {
            return false;
        }
        self.session.paused = true;
        self.events.push(RoundEvent::Paused);
        tracing::debug!(active_ms = self.active_ms(now_ms), "Round paused");
        true
    }

    pub fn resume(&mut self, now_ms: u64) -> bool {
        if self.is_finished() || !self.session.clock.resume(now_ms) {
            return false;
        }
        self.session.paused = false;
        self.events.push(RoundEvent::Resumed);
        tracing::debug!(active_ms = self.active_ms(now_ms), "Round resumed");
        true
    }

    pub fn toggle_pause(&mut self, now_ms: u64) -> bool {
        if self.session.paused {
            self.resume(now_ms)
        } else {
            self.pause(now_ms)
        }
    }

    fn accepting(&self) -> bool {
        self.is_running() && !self.session.frozen && self.phase == RoundPhase::AwaitingInput
    }

    /// Judge a submitted answer.
    pub fn evaluate<G: Rng + ?Sized>(&mut self, value: i64, now_ms: u64, rng: &mut G) -> Verdict {
        if !self.accepting() {
            return Verdict::Ignored;
        }
        let Some(answer) = self.question.as_ref().map(|q| q.answer) else {
            return Verdict::Ignored;
        };
        self.set_phase(RoundPhase::Evaluating);

        if value != answer {
            return self.wrong(value, false, now_ms, rng);
        }

        self.session.score += self.rules.score_for_correct();
        self.events.push(RoundEvent::Correct {
            value,
            score: self.session.score,
        });
        if self.session.question_index + 1 >= self.session.total_questions {
            self.finish(true, now_ms);
            return Verdict::Completed;
        }
        self.set_phase(RoundPhase::Advancing);
        self.session.question_index += 1;
        self.session.hint_used = false;
        self.new_question(rng);
        Verdict::Advanced
    }

    /// The correct answer escaped; counts as a wrong answer.
    pub fn miss<G: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut G) -> Verdict {
        if !self.accepting() {
            return Verdict::Ignored;
        }
        let Some(answer) = self.question.as_ref().map(|q| q.answer) else {
            return Verdict::Ignored;
        };
        self.set_phase(RoundPhase::Evaluating);
        self.wrong(answer, true, now_ms, rng)
    }

    fn wrong<G: Rng + ?Sized>(
        &mut self,
        value: i64,
        missed: bool,
        now_ms: u64,
        rng: &mut G,
    ) -> Verdict {
        self.session.lives = self.session.lives.saturating_sub(1);
        let lives = self.session.lives;
        self.events.push(if missed {
            RoundEvent::Missed { value, lives }
        } else {
            RoundEvent::Wrong { value, lives }
        });
        if lives == 0 {
            self.finish(false, now_ms);
            return Verdict::GameOver;
        }

        self.set_phase(RoundPhase::Penalizing);
        let penalty = self.rules.penalty_for_incorrect();
        self.session.score = self.session.score.saturating_sub(penalty.score_deduction);
        if let Some(slow_ms) = penalty.slow_ms {
            if let Some(id) = self.slow_timer.take() {
                self.scheduler.cancel(id);
            }
            self.session.slowed = true;
            let due = self.active_ms(now_ms) + slow_ms;
            self.slow_timer = Some(self.scheduler.schedule(due, Deferred::EndSlow));
        }

        let replace_options = match penalty.after {
            AfterWrong::NewQuestion => {
                self.new_question(rng);
                true
            },
            AfterWrong::ReshuffleOptions => {
                self.reshuffle(rng);
                self.set_phase(RoundPhase::AwaitingInput);
                true
            },
            AfterWrong::EliminateChoice => {
                self.set_phase(RoundPhase::AwaitingInput);
                false
            },
        };
        Verdict::Penalized { replace_options }
    }

    /// Player collided with a hazard.
    pub fn hazard_hit(&mut self, now_ms: u64) -> Verdict {
        if !self.accepting() {
            return Verdict::Ignored;
        }
        self.session.lives = self.session.lives.saturating_sub(1);
        self.events.push(RoundEvent::LifeLost {
            lives: self.session.lives,
        });
        if self.session.lives == 0 {
            self.finish(false, now_ms);
            return Verdict::GameOver;
        }
        self.session.frozen = true;
        let due = self.active_ms(now_ms) + self.config.frozen_ms;
        self.unfreeze_timer = Some(self.scheduler.schedule(due, Deferred::Unfreeze));
        tracing::debug!(lives = self.session.lives, "Hazard hit, freezing");
        Verdict::Frozen
    }

    /// Ask for a replacement question after the hint delay.
    pub fn request_hint(&mut self, now_ms: u64) -> bool {
        if !self.accepting() || self.session.hint_used {
            return false;
        }
        self.session.hint_used = true;
        let due = self.active_ms(now_ms) + self.config.hint_delay_ms;
        self.hint_timer = Some(self.scheduler.schedule(due, Deferred::RegenerateQuestion));
        self.events.push(RoundEvent::HintRequested);
        true
    }

    /// Fire due transitions. Returns true if the option set was replaced.
    pub fn advance_timers<G: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut G) -> bool {
        if !self.is_running() {
            return false;
        }
        let mut replaced = false;
        for (id, transition) in self.scheduler.drain_due(self.active_ms(now_ms)) {
            match transition {
                Deferred::RegenerateQuestion => {
                    if self.hint_timer == Some(id) {
                        self.hint_timer = None;
                        self.new_question(rng);
                        self.events.push(RoundEvent::HintApplied);
                        replaced = true;
                    }
                },
                Deferred::Unfreeze => {
                    if self.unfreeze_timer == Some(id) {
                        self.unfreeze_timer = None;
                        self.session.frozen = false;
                        self.events.push(RoundEvent::Unfrozen);
                    }
                },
                Deferred::EndSlow => {
                    if self.slow_timer == Some(id) {
                        self.slow_timer = None;
                        self.session.slowed = false;
                        self.events.push(RoundEvent::SlowEnded);
                    }
                },
            }
        }
        replaced
    }

    fn new_question<G: Rng + ?Sized>(&mut self, rng: &mut G) {
        self.set_phase(RoundPhase::Generating);
        if let Some(id) = self.hint_timer.take() {
            self.scheduler.cancel(id);
        }
        let question = self.rules.generate_question(self.config.level, rng);
        tracing::debug!(
            index = self.session.question_index,
            prompt = %question.prompt,
            "Question generated"
        );
        self.question = Some(question);
        self.reshuffle(rng);
        self.events.push(RoundEvent::QuestionStarted {
            index: self.session.question_index,
            serial: self.serial,
        });
        self.set_phase(RoundPhase::AwaitingInput);
    }

    /// Fresh option set for the current question.
    fn reshuffle<G: Rng + ?Sized>(&mut self, rng: &mut G) {
        let Some(answer) = self.question.as_ref().map(|q| q.answer) else {
            return;
        };
        self.options = generate_options(answer, self.config.option_count, rng)
            .unwrap_or_else(|_| vec![AnswerOption::new(answer, true)]);
        self.serial += 1;
    }

    fn finish(&mut self, won: bool, now_ms: u64) {
        self.set_phase(if won {
            RoundPhase::Completed
        } else {
            RoundPhase::GameOver
        });
        self.scheduler.cancel_all();
        self.hint_timer = None;
        self.unfreeze_timer = None;
        self.slow_timer = None;
        self.session.frozen = false;
        self.session.slowed = false;

        let stars = self.rules.star_thresholds().rate(
            self.session.score,
            self.session.total_questions,
            !won,
        );
        let outcome = RoundOutcome {
            score: self.session.score,
            stars,
            time_taken_secs: self.session.clock.elapsed_secs(now_ms),
            won,
        };
        tracing::info!(
            won,
            score = outcome.score,
            stars,
            secs = outcome.time_taken_secs,
            "Round finished"
        );
        self.outcome = Some(outcome.clone());
        self.events.push(RoundEvent::Completed(outcome));
    }

    fn set_phase(&mut self, next: RoundPhase) {
        if self.phase != next {
            tracing::debug!(from = ?self.phase, to = ?next, "Round phase");
            self.phase = next;
        }
    }
}
