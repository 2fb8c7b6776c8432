pub mod chase;
pub mod clock;
pub mod collision;
pub mod config;
pub mod driver;
pub mod entity;
pub mod error;
pub mod events;
pub mod game_trait;
pub mod grid;
pub mod input;
pub mod motion;
pub mod options;
pub mod placement;
pub mod render;
pub mod round;
pub mod schedule;
pub mod scoring;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::config::RoundConfig;
    use crate::events::{RoundEvent, RoundOutcome};
    use crate::game_trait::ArcadeGame;
    use crate::render::{Hud, RenderFrame, RenderSink, RoundObserver};

    /// Counts presented frames and keeps the last HUD.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub frames: usize,
        pub last_hud: Option<Hud>,
    }

    impl RenderSink for RecordingSink {
        fn present(&mut self, frame: &RenderFrame<'_>) {
            self.frames += 1;
            self.last_hud = Some(frame.hud.clone());
        }
    }

    /// Records every notification.
    #[derive(Debug, Default)]
    pub struct RecordingObserver {
        pub outcomes: Vec<RoundOutcome>,
        pub wrong_answers: u32,
    }

    impl RoundObserver for RecordingObserver {
        fn on_complete(&mut self, outcome: &RoundOutcome) {
            self.outcomes.push(outcome.clone());
        }

        fn on_wrong_answer(&mut self) {
            self.wrong_answers += 1;
        }
    }

    /// Default round settings with the given question count and lives.
    pub fn round_config(total_questions: u32, starting_lives: u8) -> RoundConfig {
        RoundConfig {
            total_questions,
            starting_lives,
            ..Default::default()
        }
    }

    /// Run `n` ticks `step_ms` apart starting after `from_ms`, collecting events.
    pub fn run_ticks<G: ArcadeGame + ?Sized>(
        game: &mut G,
        from_ms: u64,
        n: usize,
        step_ms: u64,
    ) -> Vec<RoundEvent> {
        let mut all_events = Vec::new();
        for i in 1..=n as u64 {
            all_events.extend(game.update(from_ms + i * step_ms));
        }
        all_events
    }

    pub fn count_completions(events: &[RoundEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, RoundEvent::Completed(_)))
            .count()
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Every ArcadeGame implementation must pass these. Variant crates call
    // them from their own #[cfg(test)] modules with a fresh game.

    /// start() must yield a live round with full lives and encodable state.
    pub fn contract_start_creates_state(game: &mut dyn ArcadeGame) {
        game.start(0);
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return bytes after start"
        );
        let session = game.session();
        assert_eq!(session.lives, session.starting_lives);
        assert_eq!(session.score, 0);
        assert_eq!(session.question_index, 0);
        assert!(!game.is_finished());
        assert!(!game.frame().hud.prompt.is_empty(), "a question must be showing");
    }

    /// While paused, ticks must not change state and the clock must not run.
    pub fn contract_pause_freezes_state(game: &mut dyn ArcadeGame) {
        game.start(0);
        run_ticks(game, 0, 5, 16);
        game.pause(100);
        let before = game.serialize_state();
        let elapsed = game.session().clock.elapsed_ms(100);
        run_ticks(game, 100, 30, 16);
        assert_eq!(
            before,
            game.serialize_state(),
            "State must not change while paused"
        );
        assert_eq!(game.session().clock.elapsed_ms(5_000), elapsed);
        assert!(game.frame().hud.paused);

        game.resume(5_000);
        assert!(!game.session().paused);
        assert_eq!(game.session().clock.elapsed_ms(5_100), elapsed + 100);
    }

    /// A round run to game over by `answer_wrong` completes exactly once with
    /// the variant's minimum stars, and later ticks are no-ops.
    pub fn contract_game_over_fires_once<G: ArcadeGame>(
        game: &mut G,
        mut answer_wrong: impl FnMut(&mut G, u64),
        expected_stars: u8,
    ) {
        game.start(0);
        let mut events = Vec::new();
        let mut now = 0;
        for _ in 0..200 {
            if game.is_finished() {
                break;
            }
            now += 16;
            answer_wrong(game, now);
            events.extend(game.update(now));
        }
        assert!(game.is_finished(), "Round must end once lives run out");
        assert_eq!(game.session().lives, 0);
        assert_eq!(count_completions(&events), 1, "Exactly one completion");
        let outcome = events.iter().find_map(|e| match e {
            RoundEvent::Completed(o) => Some(o.clone()),
            _ => None,
        });
        let outcome = outcome.expect("completion event");
        assert!(!outcome.won);
        assert_eq!(outcome.stars, expected_stars);

        let before = game.serialize_state();
        let later = run_ticks(game, now, 20, 16);
        assert_eq!(count_completions(&later), 0);
        assert_eq!(before, game.serialize_state(), "Finished rounds must not tick");
    }

    /// Try Again restores lives and score and starts a fresh clock.
    pub fn contract_try_again_resets<G: ArcadeGame>(
        game: &mut G,
        mut answer_wrong: impl FnMut(&mut G, u64),
    ) {
        game.start(0);
        answer_wrong(game, 16);
        game.update(16);
        assert!(game.session().lives < game.session().starting_lives);
        game.try_again(1_000);
        let session = game.session();
        assert_eq!(session.lives, session.starting_lives);
        assert_eq!(session.score, 0);
        assert_eq!(session.question_index, 0);
        assert_eq!(session.clock.elapsed_ms(1_250), 250);
        assert!(!game.is_finished());
    }

    /// After teardown every call is a no-op.
    pub fn contract_teardown_stops_updates(game: &mut dyn ArcadeGame) {
        game.start(0);
        run_ticks(game, 0, 3, 16);
        game.teardown();
        let before = game.serialize_state();
        let events = run_ticks(game, 48, 50, 16);
        assert!(events.is_empty(), "No events after teardown");
        game.pause(2_000);
        game.try_again(2_100);
        assert_eq!(before, game.serialize_state());
        assert!(game.is_finished());
    }
}
