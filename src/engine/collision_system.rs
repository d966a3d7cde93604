use super::*;

impl GameEngine {
    /// Pellets, then power items, then pursuer contact, then level check.
    /// A death ends resolution for the tick.
    pub(super) fn resolve_collisions(&mut self) {
        self.collect_pellets();
        self.collect_power_items();
        if self.resolve_pursuer_contact() {
            return;
        }
        if self.pellets.is_empty() && self.power_items.is_empty() {
            self.handle_level_complete();
        }
    }

    fn collect_pellets(&mut self) {
        let eaten = take_within(&mut self.pellets, self.player.pos(), PICKUP_RADIUS);
        for pellet in eaten {
            self.award(PELLET_POINTS);
            self.events.push(RuntimeEvent::PelletEaten {
                x: pellet.x,
                y: pellet.y,
            });
        }
    }

    fn collect_power_items(&mut self) {
        let eaten = take_within(&mut self.power_items, self.player.pos(), PICKUP_RADIUS);
        for item in eaten {
            self.award(POWER_ITEM_POINTS);
            self.player.activate_power_mode(self.config.power_duration_ms);
            for pursuer in &mut self.pursuers {
                pursuer.scare();
            }
            self.events.push(RuntimeEvent::PowerItemEaten {
                x: item.x,
                y: item.y,
            });
            debug!(
                duration_ms = self.config.power_duration_ms,
                "power mode activated"
            );
        }
    }

    /// Returns true when the player died this tick.
    fn resolve_pursuer_contact(&mut self) -> bool {
        for idx in 0..self.pursuers.len() {
            if !self.player.collides_with(&self.pursuers[idx], 1.0) {
                continue;
            }
            if !self.pursuers[idx].is_scared() {
                self.handle_player_death();
                return true;
            }

            let kind = self.pursuers[idx].kind();
            self.pursuers[idx].reset();
            self.award(PURSUER_POINTS);
            self.events.push(RuntimeEvent::PursuerEaten { kind });
            debug!(%kind, score = self.score, "pursuer eaten");
        }
        false
    }

    pub(super) fn handle_player_death(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.events.push(RuntimeEvent::PlayerDied {
            lives_left: self.lives,
        });
        self.notify_score();
        debug!(lives_left = self.lives, level = self.level, "player died");

        if self.lives == 0 {
            self.transition = None;
            self.player.cancel_power();
            info!(score = self.score, level = self.level, "game over");
            self.set_state(GameState::GameOver);
            return;
        }

        self.player.reset(self.maze.player_start());
        for pursuer in &mut self.pursuers {
            pursuer.reset();
        }
        self.transition = Some(PendingTransition {
            kind: TransitionKind::Respawn,
            remaining_ms: self.config.respawn_delay_ms,
        });
        self.set_state(GameState::Paused);
    }

    fn handle_level_complete(&mut self) {
        let cleared_level = self.level;
        self.level += 1;
        self.notify_score();
        self.events
            .push(RuntimeEvent::LevelCompleted { cleared_level });
        info!(cleared_level, score = self.score, "level complete");

        self.transition = Some(PendingTransition {
            kind: TransitionKind::NextLevel,
            remaining_ms: self.config.level_transition_ms,
        });
        self.set_state(GameState::LevelComplete);
    }

    fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.notify_score();
    }
}

/// Removes and returns every item strictly closer than `radius` to `pos`.
fn take_within(items: &mut Vec<Vec2>, pos: Vec2, radius: f32) -> Vec<Vec2> {
    let mut taken = Vec::new();
    items.retain(|item| {
        if item.distance(pos) < radius {
            taken.push(*item);
            false
        } else {
            true
        }
    });
    taken
}
