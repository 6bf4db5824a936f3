pub const FRAMES_PER_DIRECTION: usize = 4;
pub const DEFAULT_SECONDS_PER_FRAME: f32 = 0.25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    #[default]
    Right,
    Up,
    Down,
}

impl Facing {
    const fn row(self) -> usize {
        match self {
            Facing::Left => 0,
            Facing::Right => 1,
            Facing::Up => 2,
            Facing::Down => 3,
        }
    }

    /// Facing implied by a horizontal intent; zero keeps the current facing.
    pub fn from_horizontal(movement_x: f32, current: Facing) -> Facing {
        if movement_x < 0.0 {
            Facing::Left
        } else if movement_x > 0.0 {
            Facing::Right
        } else {
            current
        }
    }
}

/// Spritesheet cell indices, one row of frames per facing
/// (left, right, up, down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTable {
    pub frames: [[u32; FRAMES_PER_DIRECTION]; 4],
    pub sheet_columns: u32,
    pub sheet_rows: u32,
}

impl AnimationTable {
    /// A one-cell sheet: every facing and frame shows the whole texture.
    pub const fn single_frame() -> Self {
        Self {
            frames: [[0; FRAMES_PER_DIRECTION]; 4],
            sheet_columns: 1,
            sheet_rows: 1,
        }
    }

    pub fn cell(&self, facing: Facing, frame_index: usize) -> u32 {
        self.frames[facing.row()][frame_index % FRAMES_PER_DIRECTION]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClock {
    facing: Facing,
    frame_index: usize,
    elapsed: f32,
    seconds_per_frame: f32,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(DEFAULT_SECONDS_PER_FRAME)
    }
}

impl AnimationClock {
    pub fn new(seconds_per_frame: f32) -> Self {
        Self {
            facing: Facing::default(),
            frame_index: 0,
            elapsed: 0.0,
            seconds_per_frame,
        }
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    /// Accumulates time and steps to the next frame each time the per-frame
    /// duration is crossed. The accumulator resets on every step.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        if self.elapsed >= self.seconds_per_frame {
            self.frame_index = (self.frame_index + 1) % FRAMES_PER_DIRECTION;
            self.elapsed = 0.0;
        }
    }

    pub fn current_cell(&self, table: &AnimationTable) -> u32 {
        table.cell(self.facing, self.frame_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALK: AnimationTable = AnimationTable {
        frames: [[1, 5, 9, 13], [3, 7, 11, 15], [2, 6, 10, 14], [0, 4, 8, 12]],
        sheet_columns: 4,
        sheet_rows: 4,
    };

    #[test]
    fn advances_one_frame_per_threshold_and_wraps() {
        let mut clock = AnimationClock::new(0.25);
        clock.advance(0.2);
        assert_eq!(clock.frame_index(), 0);
        clock.advance(0.1);
        assert_eq!(clock.frame_index(), 1);
        for _ in 0..3 {
            clock.advance(0.25);
        }
        assert_eq!(clock.frame_index(), 0);
    }

    #[test]
    fn zero_horizontal_intent_holds_facing() {
        assert_eq!(Facing::from_horizontal(-1.0, Facing::Right), Facing::Left);
        assert_eq!(Facing::from_horizontal(0.0, Facing::Left), Facing::Left);
        assert_eq!(Facing::from_horizontal(0.3, Facing::Left), Facing::Right);
    }

    #[test]
    fn cell_comes_from_facing_row() {
        let mut clock = AnimationClock::new(0.25);
        clock.set_facing(Facing::Left);
        clock.advance(0.25);
        assert_eq!(clock.current_cell(&WALK), 5);
        clock.set_facing(Facing::Right);
        assert_eq!(clock.current_cell(&WALK), 7);
    }
}
