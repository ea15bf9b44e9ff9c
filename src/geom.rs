//! # Built-in Geometric Value Types
//!
//! The default codec set covers three fixed-size `f32` aggregates commonly
//! produced by the embedding application: 2D and 3D vectors and an RGBA
//! color. All three are plain `Copy` value types; the persistence boundary
//! copies them, it never references them.
//!
//! | Type | Components | Blob width |
//! |------|------------|------------|
//! | `Vec2` | x, y | 8 bytes |
//! | `Vec3` | x, y, z | 12 bytes |
//! | `Rgba` | r, g, b, a | 16 bytes |

/// 2-component single-precision vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 3-component single-precision vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// RGBA color with four named `f32` channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}
