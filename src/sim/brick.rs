//! Brick archetypes and instances
//!
//! A fixed registry maps layout tokens to shared, immutable archetypes.
//! Behavior hooks are data, not code: each archetype carries a hit
//! validation rule and an optional destruction effect, dispatched by the
//! session when a brick is struck.

use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Side};

/// 8-bit RGB color. The gradient math is integer on purpose so renders
/// are reproducible across platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Position of a brick in the layout grid (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPos {
    pub col: i32,
    pub row: i32,
}

impl GridPos {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The four orthogonally adjacent cells.
    pub fn neighbors(self) -> [GridPos; 4] {
        [
            GridPos::new(self.col + 1, self.row),
            GridPos::new(self.col - 1, self.row),
            GridPos::new(self.col, self.row + 1),
            GridPos::new(self.col, self.row - 1),
        ]
    }
}

/// Context handed to archetype hooks when a brick is struck.
#[derive(Debug, Clone, Copy)]
pub struct CollisionPayload {
    /// Side of the brick the ball touched
    pub side: Side,
    /// The struck brick's grid coordinate
    pub grid: GridPos,
    /// Whether the session is currently in no-clip mode
    pub no_clip: bool,
}

/// When a hit counts as valid damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitValidation {
    /// Every hit damages the brick
    Always,
    /// No hit ever damages the brick (permanent)
    Never,
    /// Only damaged while the session is in no-clip mode
    NoClipOnly,
}

/// Side effect fired when a brick is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyEffect {
    None,
    /// Hit all four orthogonal neighbors, cascading through chains
    Explode,
}

/// Shared, immutable definition of a brick's visuals, scoring and hooks.
#[derive(Debug)]
pub struct BrickType {
    pub name: &'static str,
    /// Base color (health 1)
    pub color: Rgb,
    /// Color at full health (equals `color` for single-health bricks)
    pub max_health_color: Rgb,
    pub score: u32,
    pub max_health: u32,
    pub validation: HitValidation,
    pub on_destroy: DestroyEffect,
}

impl BrickType {
    /// Whether a hit with this payload is allowed to damage the brick.
    pub fn validates(&self, payload: &CollisionPayload) -> bool {
        match self.validation {
            HitValidation::Always => true,
            HitValidation::Never => false,
            HitValidation::NoClipOnly => payload.no_clip,
        }
    }

    /// Color of a brick of this archetype at `health`.
    ///
    /// Integer interpolation between the base and full-health colors,
    /// weighted by how far health sits between 1 and `max_health`.
    pub fn color_for_health(&self, health: u32) -> Rgb {
        if health == 1 || self.max_health == 1 {
            return self.color;
        }
        if health == self.max_health {
            return self.max_health_color;
        }

        let mix = |base: u8, full: u8| -> u8 {
            let base = base as u32;
            let full = full as u32;
            ((base * (self.max_health - health) + full * health) / self.max_health) as u8
        };

        Rgb::new(
            mix(self.color.r, self.max_health_color.r),
            mix(self.color.g, self.max_health_color.g),
            mix(self.color.b, self.max_health_color.b),
        )
    }
}

/// One registry row: the token key and its archetype. Multi-character
/// keys grade initial health by the token's rank within the key.
struct RegistryEntry {
    tokens: &'static str,
    brick_type: BrickType,
}

const fn plain(name: &'static str, color: Rgb) -> BrickType {
    BrickType {
        name,
        color,
        max_health_color: color,
        score: 10,
        max_health: 1,
        validation: HitValidation::Always,
        on_destroy: DestroyEffect::None,
    }
}

static REGISTRY: &[RegistryEntry] = &[
    RegistryEntry {
        tokens: "-23",
        brick_type: BrickType {
            name: "Brick",
            color: Rgb::new(255, 0, 0),
            max_health_color: Rgb::new(255, 165, 0),
            score: 10,
            max_health: 3,
            validation: HitValidation::Always,
            on_destroy: DestroyEffect::None,
        },
    },
    RegistryEntry {
        tokens: "*",
        brick_type: BrickType {
            name: "Explosion",
            color: Rgb::new(128, 0, 128),
            max_health_color: Rgb::new(128, 0, 128),
            score: 30,
            max_health: 1,
            validation: HitValidation::Always,
            on_destroy: DestroyEffect::Explode,
        },
    },
    RegistryEntry {
        tokens: "x",
        brick_type: BrickType {
            name: "Indestructible",
            color: Rgb::new(90, 90, 100),
            max_health_color: Rgb::new(90, 90, 100),
            score: 0,
            max_health: 1,
            validation: HitValidation::Never,
            on_destroy: DestroyEffect::None,
        },
    },
    RegistryEntry {
        tokens: "@",
        brick_type: BrickType {
            name: "Semi-Destructible",
            color: Rgb::new(50, 50, 70),
            max_health_color: Rgb::new(50, 50, 70),
            score: 20,
            max_health: 1,
            validation: HitValidation::NoClipOnly,
            on_destroy: DestroyEffect::None,
        },
    },
    RegistryEntry {
        tokens: "g",
        brick_type: plain("Green", Rgb::new(0, 128, 0)),
    },
    RegistryEntry {
        tokens: "b",
        brick_type: plain("Blue", Rgb::new(0, 0, 255)),
    },
    RegistryEntry {
        tokens: "m",
        brick_type: plain("Magenta", Rgb::new(255, 0, 255)),
    },
    RegistryEntry {
        tokens: "t",
        brick_type: plain("Turquoise", Rgb::new(64, 224, 208)),
    },
    RegistryEntry {
        tokens: "w",
        brick_type: plain("White", Rgb::new(255, 255, 255)),
    },
    RegistryEntry {
        tokens: "d",
        brick_type: plain("Dark", Rgb::new(150, 150, 170)),
    },
];

/// Stable handle to a registry archetype. Cheap to copy and serialize;
/// resolves back to the shared `BrickType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickTypeId(usize);

impl BrickTypeId {
    pub fn get(self) -> &'static BrickType {
        &REGISTRY[self.0].brick_type
    }
}

/// Resolve a layout token to its archetype and graded initial health.
/// Returns `None` for spaces and unrecognized tokens (empty cells).
pub fn resolve_token(token: char) -> Option<(BrickTypeId, u32)> {
    REGISTRY.iter().enumerate().find_map(|(index, entry)| {
        let rank = entry.tokens.find(token)?;
        let key_len = entry.tokens.len() as u32;
        let health = entry.brick_type.max_health / key_len * (rank as u32 + 1);
        Some((BrickTypeId(index), health))
    })
}

/// A brick instance on the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub kind: BrickTypeId,
    pub rect: Rect,
    pub grid: GridPos,
    pub health: u32,
}

impl Brick {
    pub fn new(kind: BrickTypeId, rect: Rect, grid: GridPos, health: u32) -> Self {
        debug_assert!(health >= 1 && health <= kind.get().max_health);
        Self {
            kind,
            rect,
            grid,
            health,
        }
    }

    /// Current render color, derived from health.
    pub fn color(&self) -> Rgb {
        self.kind.get().color_for_health(self.health)
    }
}
