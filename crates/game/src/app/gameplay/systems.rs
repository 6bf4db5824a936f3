#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameplaySystemId {
    Behavior,
    Kinematics,
    Encounter,
    Animation,
}

impl GameplaySystemId {
    #[cfg(test)]
    fn name(self) -> &'static str {
        match self {
            Self::Behavior => "Behavior",
            Self::Kinematics => "Kinematics",
            Self::Encounter => "Encounter",
            Self::Animation => "Animation",
        }
    }
}

const GAMEPLAY_SYSTEM_ORDER: [GameplaySystemId; 4] = [
    GameplaySystemId::Behavior,
    GameplaySystemId::Kinematics,
    GameplaySystemId::Encounter,
    GameplaySystemId::Animation,
];

/// The whole mutable game state. Owns the grid and every actor; actor 0 is
/// the player and the remaining indices are stable enemy slots.
#[derive(Debug, Clone)]
struct Simulation {
    grid: TileGrid,
    actors: Vec<Actor>,
    tick: u64,
    last_tick_order: Vec<GameplaySystemId>,
}

impl Simulation {
    fn new(grid: TileGrid, player: Actor, enemies: impl IntoIterator<Item = Actor>) -> Self {
        let mut actors = vec![player];
        actors.extend(enemies);
        Self {
            grid,
            actors,
            tick: 0,
            last_tick_order: Vec::with_capacity(GAMEPLAY_SYSTEM_ORDER.len()),
        }
    }

    fn player(&self) -> &Actor {
        &self.actors[PLAYER_INDEX]
    }

    fn active_enemy_count(&self) -> usize {
        self.actors.iter().filter(|actor| actor.is_active_enemy()).count()
    }

    fn enemy_count(&self) -> usize {
        self.actors.len() - 1
    }

    /// Loss is checked before win, so a final mutual contact reads as a loss.
    fn outcome(&self) -> Option<Outcome> {
        if !self.player().is_active() {
            Some(Outcome::Lost)
        } else if self.active_enemy_count() == 0 {
            Some(Outcome::Won)
        } else {
            None
        }
    }

    fn tick(&mut self, dt: f32, input: &InputSnapshot) -> TickEvents {
        let mut events = TickEvents::default();
        self.last_tick_order.clear();
        for system_id in GAMEPLAY_SYSTEM_ORDER {
            self.last_tick_order.push(system_id);
            match system_id {
                GameplaySystemId::Behavior => self.run_behavior(dt, input, &mut events),
                GameplaySystemId::Kinematics => self.run_kinematics(dt),
                GameplaySystemId::Encounter => resolve_contacts(&mut self.actors, &mut events),
                GameplaySystemId::Animation => self.run_animation(dt),
            }
        }
        self.tick = self.tick.saturating_add(1);
        events
    }

    fn run_behavior(&mut self, dt: f32, input: &InputSnapshot, events: &mut TickEvents) {
        if self.player().is_active() {
            let player = &mut self.actors[PLAYER_INDEX];
            player.body.set_movement(player_intent(input));
            if input.jump_pressed() && player.body.jump() {
                events.player_jumped = true;
            }
            if input.attack_pressed() {
                resolve_attack(&mut self.actors, events);
            }
        }

        for actor in self.actors.iter_mut().skip(1) {
            if !actor.is_active() {
                continue;
            }
            let Role::Enemy(behavior) = &mut actor.role else {
                continue;
            };
            match behavior {
                EnemyBehavior::Spinner => actor.body.set_movement(Vec3::ZERO),
                EnemyBehavior::VerticalMover(oscillator) => {
                    let intent = match actor.ai_state {
                        AiState::Walking => {
                            Vec3::xy(0.0, oscillator.advance(dt, VERTICAL_MOVER_PERIOD_SECONDS))
                        }
                        AiState::Idle => Vec3::ZERO,
                    };
                    actor.body.set_movement(intent);
                }
                EnemyBehavior::Jumper => {
                    actor.body.set_movement(Vec3::ZERO);
                    actor.body.jump();
                }
            }
        }
    }

    fn run_kinematics(&mut self, dt: f32) {
        let grid = &self.grid;
        for actor in self.actors.iter_mut() {
            if actor.is_active() && !actor.role.is_stationary() {
                actor.body.step(dt, grid);
            }
        }
    }

    fn run_animation(&mut self, dt: f32) {
        for actor in self.actors.iter_mut().filter(|actor| actor.is_active()) {
            let movement = actor.body.movement();
            let facing = Facing::from_horizontal(movement.x, actor.clock.facing());
            actor.clock.set_facing(facing);
            if actor.role.animates_while_idle() || !movement.is_zero() {
                actor.clock.advance(dt);
            }
        }
    }
}

/// Left wins when both directions are held.
fn player_intent(input: &InputSnapshot) -> Vec3 {
    let x = if input.is_down(InputAction::MoveLeft) {
        -1.0
    } else if input.is_down(InputAction::MoveRight) {
        1.0
    } else {
        0.0
    };
    Vec3::xy(x, 0.0)
}
