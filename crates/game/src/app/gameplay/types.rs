/// Flip timer for the vertical mover: a constant vertical intent whose sign
/// reverses every `VERTICAL_MOVER_PERIOD_SECONDS` of walking time.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Oscillator {
    direction: f32,
    elapsed: f32,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self {
            direction: 1.0,
            elapsed: 0.0,
        }
    }
}

impl Oscillator {
    fn advance(&mut self, dt: f32, period: f32) -> f32 {
        self.elapsed += dt;
        if self.elapsed >= period {
            self.elapsed -= period;
            self.direction = -self.direction;
        }
        self.direction
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EnemyBehavior {
    Spinner,
    VerticalMover(Oscillator),
    Jumper,
}

impl EnemyBehavior {
    fn name(self) -> &'static str {
        match self {
            Self::Spinner => "spinner",
            Self::VerticalMover(_) => "vertical_mover",
            Self::Jumper => "jumper",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Role {
    Player,
    Enemy(EnemyBehavior),
}

impl Role {
    fn from_actor_role(role: ActorRole) -> Self {
        match role {
            ActorRole::Player => Self::Player,
            ActorRole::Spinner => Self::Enemy(EnemyBehavior::Spinner),
            ActorRole::VerticalMover => {
                Self::Enemy(EnemyBehavior::VerticalMover(Oscillator::default()))
            }
            ActorRole::Jumper => Self::Enemy(EnemyBehavior::Jumper),
        }
    }

    fn is_enemy(self) -> bool {
        matches!(self, Self::Enemy(_))
    }

    /// Stationary hazards skip kinematics entirely.
    fn is_stationary(self) -> bool {
        matches!(self, Self::Enemy(EnemyBehavior::Spinner))
    }

    /// Enemies whose intent is always zero still play their cycle.
    fn animates_while_idle(self) -> bool {
        matches!(
            self,
            Self::Enemy(EnemyBehavior::Spinner | EnemyBehavior::Jumper)
        )
    }
}

#[derive(Debug, Clone)]
struct Actor {
    role: Role,
    ai_state: AiState,
    body: KinematicBody,
    clock: AnimationClock,
    animation: AnimationTable,
    scale: Vec2,
    texture: TextureHandle,
}

impl Actor {
    fn from_def(def: &ActorDef, texture: TextureHandle) -> Self {
        let body = KinematicBody::new(def.position, def.speed, def.half_width, def.half_height)
            .with_acceleration(def.acceleration)
            .with_jumping_power(def.jumping_power);
        Self {
            role: Role::from_actor_role(def.role),
            ai_state: def.ai_state,
            body,
            clock: AnimationClock::default(),
            animation: def.animation,
            scale: def.scale,
            texture,
        }
    }

    fn is_active(&self) -> bool {
        self.body.is_active()
    }

    fn is_active_enemy(&self) -> bool {
        self.role.is_enemy() && self.is_active()
    }

    fn current_cell(&self) -> u32 {
        self.clock.current_cell(&self.animation)
    }
}

/// Things a tick did that the scene reacts to outside the simulation.
#[derive(Debug, Clone, Default, PartialEq)]
struct TickEvents {
    player_jumped: bool,
    defeated_enemies: Vec<(usize, DefeatCause)>,
    player_defeated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefeatCause {
    Attack,
    Contact,
}
