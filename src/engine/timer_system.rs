use super::*;

impl GameEngine {
    /// Mode cycles and the power countdown. Only called while PLAYING, so a
    /// pause freezes both.
    pub(super) fn advance_gameplay_timers(&mut self, dt_ms: u64) {
        for pursuer in &mut self.pursuers {
            if let Some(mode) = pursuer.advance_cycle(dt_ms) {
                debug!(kind = %pursuer.kind(), ?mode, "pursuer mode switched");
            }
        }

        if self.player.tick_power(dt_ms) {
            for pursuer in &mut self.pursuers {
                pursuer.unscare();
            }
            self.events.push(RuntimeEvent::PowerEnded);
            debug!("power mode ended");
        }
    }

    pub(super) fn advance_transition(&mut self, dt_ms: u64) {
        let Some(mut transition) = self.transition.take() else {
            return;
        };
        transition.remaining_ms = transition.remaining_ms.saturating_sub(dt_ms);
        if transition.remaining_ms > 0 {
            self.transition = Some(transition);
            return;
        }

        match transition.kind {
            TransitionKind::Respawn => {
                debug!(lives = self.lives, "respawn delay elapsed");
            }
            TransitionKind::NextLevel => {
                self.populate_level();
                info!(
                    level = self.level,
                    pursuer_speed = self.level_speeds.for_level(self.level),
                    "level started"
                );
            }
        }
        self.last_frame_at = None;
        self.set_state(GameState::Playing);
    }
}
