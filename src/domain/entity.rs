/// Entities: Player, Enemy, Coin.
/// Plain mutable records. All coordinates are world pixels and every box
/// is axis-aligned with its origin at the TOP-LEFT corner.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1 for left, +1 for right.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Frame input: sampled once per frame from held keys / buttons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
}

impl FrameInput {
    /// Horizontal intent: -1, 0 or +1.
    pub fn horizontal(self) -> f32 {
        (self.right as i32 - self.left as i32) as f32
    }
}

/// Axis-aligned box.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Box of size `w`×`h` centered on `(cx, cy)`.
    pub fn centered(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Rect { x: cx - w / 2.0, y: cy - h / 2.0, w, h }
    }

    pub fn right(&self) -> f32 { self.x + self.w }
    pub fn bottom(&self) -> f32 { self.y + self.h }
    pub fn center_x(&self) -> f32 { self.x + self.w / 2.0 }
    pub fn center_y(&self) -> f32 { self.y + self.h / 2.0 }

    /// Strict intersection: touching edges do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// A moving box the collision resolver can push around.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Body {
    pub rect: Rect,
    pub vx: f32,
    pub vy: f32,
    /// Set by a downward clamp, cleared by a vertical pass that touches nothing.
    pub on_ground: bool,
}

impl Body {
    pub fn new(rect: Rect) -> Self {
        Body { rect, vx: 0.0, vy: 0.0, on_ground: false }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub body: Body,
    pub facing: Facing,
    pub alive: bool,
}

impl Player {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Player {
            body: Body::new(Rect::new(x, y, w, h)),
            facing: Facing::Right,
            alive: true,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect
    }

    /// Back to `(x, y)` at rest. Facing and the alive flag are untouched.
    pub fn respawn_at(&mut self, x: f32, y: f32) {
        self.body.rect.x = x;
        self.body.rect.y = y;
        self.body.vx = 0.0;
        self.body.vy = 0.0;
        self.body.on_ground = false;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub id: usize,
    pub rect: Rect,
    pub speed: f32,
    pub dir: Facing,
    pub alive: bool,
}

impl Enemy {
    pub fn new(id: usize, x: f32, y: f32, w: f32, h: f32, speed: f32) -> Self {
        Enemy {
            id,
            rect: Rect::new(x, y, w, h),
            speed,
            dir: Facing::Left,
            alive: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Coin {
    /// Cell-centered world position.
    pub x: f32,
    pub y: f32,
    pub col: usize,
    pub row: usize,
    pub picked: bool,
}

impl Coin {
    pub fn new(col: usize, row: usize, tile_size: f32) -> Self {
        Coin {
            x: (col as f32 + 0.5) * tile_size,
            y: (row as f32 + 0.5) * tile_size,
            col,
            row,
            picked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(!a.overlaps(&c));
        let d = Rect::new(9.5, 9.5, 10.0, 10.0);
        assert!(a.overlaps(&d));
        assert!(d.overlaps(&a));
    }

    #[test]
    fn centered_rect() {
        let r = Rect::centered(48.0, 16.0, 20.0, 20.0);
        assert_eq!(r, Rect::new(38.0, 6.0, 20.0, 20.0));
        assert_eq!(r.center_x(), 48.0);
        assert_eq!(r.center_y(), 16.0);
    }

    #[test]
    fn horizontal_intent() {
        let none = FrameInput::default();
        let both = FrameInput { left: true, right: true, up: false };
        let left = FrameInput { left: true, ..FrameInput::default() };
        assert_eq!(none.horizontal(), 0.0);
        assert_eq!(both.horizontal(), 0.0);
        assert_eq!(left.horizontal(), -1.0);
    }

    #[test]
    fn coin_is_cell_centered() {
        let c = Coin::new(3, 2, 32.0);
        assert_eq!((c.x, c.y), (112.0, 80.0));
        assert!(!c.picked);
    }

    #[test]
    fn respawn_clears_motion() {
        let mut p = Player::new(0.0, 0.0, 24.0, 30.0);
        p.body.rect.x = 500.0;
        p.body.vx = 220.0;
        p.body.vy = -300.0;
        p.body.on_ground = true;
        p.facing = Facing::Left;
        p.respawn_at(4.0, 2.0);
        assert_eq!((p.body.rect.x, p.body.rect.y), (4.0, 2.0));
        assert_eq!((p.body.vx, p.body.vy), (0.0, 0.0));
        assert!(!p.body.on_ground);
        assert_eq!(p.facing, Facing::Left);
    }

    #[test]
    fn facing_flips() {
        assert_eq!(Facing::Left.flipped(), Facing::Right);
        assert_eq!(Facing::Right.sign(), 1.0);
    }
}
