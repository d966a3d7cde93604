use super::*;

impl GameEngine {
    /// Applies the buffered turn. A reversal happens at once; any other turn
    /// waits until the player is near a cell center and the new heading is
    /// open from there.
    pub(super) fn apply_pending_intent(&mut self) {
        let Some(requested) = self.pending_intent else {
            return;
        };
        if requested == self.player.dir().reverse() {
            self.player.mover_mut().dir = requested;
            self.pending_intent = None;
            return;
        }

        let pos = self.player.pos();
        let center = snap_to_center(pos);
        let tolerance = self.player.mover().speed / 2.0;
        if (pos.x - center.x).abs() >= tolerance || (pos.y - center.y).abs() >= tolerance {
            return;
        }

        let ahead = center.offset(requested, self.player.mover().speed);
        if !self.maze.footprint_clear(ahead, self.player.mover().radius) {
            return;
        }
        let mover = self.player.mover_mut();
        mover.pos = center;
        mover.dir = requested;
        self.pending_intent = None;
    }

    pub(super) fn move_player(&mut self) {
        let maze = &self.maze;
        let radius = self.player.mover().radius;
        self.player
            .advance(&|pos: Vec2| maze.footprint_clear(pos, radius));
    }

    /// Every pursuer picks a heading against the player's post-move
    /// position, then steps.
    pub(super) fn move_pursuers(&mut self) {
        let quarry = Quarry {
            pos: self.player.pos(),
            dir: self.player.dir(),
        };
        let maze = &self.maze;
        for pursuer in &mut self.pursuers {
            let radius = pursuer.mover().radius;
            let traversable = |pos: Vec2| maze.footprint_clear(pos, radius);
            pursuer.choose_heading(&quarry, &traversable, &mut self.rng);
            pursuer.advance(&traversable);
        }
    }

    /// Post-tick invariant: every agent footprint is inside open cells. A
    /// violation latches a fault that halts the session until reset.
    pub(super) fn verify_footprints(&mut self) -> Result<(), EngineError> {
        let clipped = if self
            .maze
            .footprint_clear(self.player.pos(), self.player.mover().radius)
        {
            self.pursuers
                .iter()
                .find(|pursuer| !self.maze.footprint_clear(pursuer.pos(), pursuer.mover().radius))
                .map(|pursuer| (format!("{} pursuer", pursuer.kind()), pursuer.pos()))
        } else {
            Some(("player".to_string(), self.player.pos()))
        };
        let Some((agent, pos)) = clipped else {
            return Ok(());
        };

        let error = EngineError::AgentClipped {
            agent,
            x: pos.x,
            y: pos.y,
        };
        warn!(%error, tick = self.tick_counter, "tick fault, halting session");
        self.fault = Some(error.to_string());
        self.transition = None;
        self.pending_intent = None;
        Err(error)
    }
}
