//! Lighting model for the turning page.
//!
//! Pure functions of `(progress, is_back_side)`. Shadow opacity follows
//! `sin(progress·π)`: zero at both rest states, peaking mid-turn, which gives
//! the "page lifts and settles" cue.

use glam::Vec2;

/// Back side of the leaf receives less light
const BACK_SIDE_FACTOR: f32 = 0.6;

/// Drop shadow cast by the lifted page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    /// Shadow opacity (0-1)
    pub opacity: f32,
    /// Blur radius in points
    pub blur_radius: f32,
    /// Offset of the shadow in points
    pub offset: Vec2,
}

impl ShadowParams {
    /// No shadow at all
    pub const NONE: ShadowParams = ShadowParams {
        opacity: 0.0,
        blur_radius: 0.0,
        offset: Vec2::ZERO,
    };
}

/// One stop of a linear gradient across the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position across the page (0 = spine, 1 = outer edge)
    pub position: f32,
    /// Darkening applied at this stop (0 = none, 1 = black)
    pub darkness: f32,
}

/// Two-stop gradient approximating directional light falloff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightGradient {
    pub start: GradientStop,
    pub end: GradientStop,
}

impl LightGradient {
    /// Darkness interpolated at `position`
    pub fn darkness_at(&self, position: f32) -> f32 {
        let span = self.end.position - self.start.position;
        if span.abs() < f32::EPSILON {
            return self.start.darkness;
        }
        let t = ((position - self.start.position) / span).clamp(0.0, 1.0);
        self.start.darkness + (self.end.darkness - self.start.darkness) * t
    }
}

/// Tunable lighting constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingModel {
    /// Opacity at mid-turn
    pub max_shadow_opacity: f32,
    /// Blur radius at mid-turn (points)
    pub max_blur_radius: f32,
    /// Shadow offset at mid-turn (points)
    pub max_offset: Vec2,
    /// Darkness of the fold at mid-turn
    pub max_fold_darkness: f32,
    /// Whether shadows are drawn at all
    pub shadows_enabled: bool,
}

impl Default for LightingModel {
    fn default() -> Self {
        Self {
            max_shadow_opacity: 0.45,
            max_blur_radius: 18.0,
            max_offset: Vec2::new(-12.0, 6.0),
            max_fold_darkness: 0.35,
            shadows_enabled: true,
        }
    }
}

impl LightingModel {
    pub fn new(shadows_enabled: bool) -> Self {
        Self {
            shadows_enabled,
            ..Self::default()
        }
    }

    /// Normalized shadow intensity, exactly `sin(progress·π)`
    pub fn intensity(progress: f32) -> f32 {
        (progress.clamp(0.0, 1.0) * std::f32::consts::PI).sin().max(0.0)
    }

    /// Shadow under the lifted page
    pub fn shadow(&self, progress: f32, is_back_side: bool) -> ShadowParams {
        if !self.shadows_enabled {
            return ShadowParams::NONE;
        }
        let intensity = Self::intensity(progress);
        let side = if is_back_side { BACK_SIDE_FACTOR } else { 1.0 };

        ShadowParams {
            opacity: self.max_shadow_opacity * intensity * side,
            blur_radius: self.max_blur_radius * intensity,
            offset: self.max_offset * intensity,
        }
    }

    /// Light falloff from the fold toward the outer edge
    pub fn gradient(&self, progress: f32, is_back_side: bool) -> LightGradient {
        let intensity = Self::intensity(progress);
        let fold = self.max_fold_darkness * intensity;
        let fold = if is_back_side {
            (fold / BACK_SIDE_FACTOR).min(1.0)
        } else {
            fold
        };

        LightGradient {
            start: GradientStop {
                position: 0.0,
                darkness: fold,
            },
            end: GradientStop {
                position: 1.0,
                darkness: fold * 0.15,
            },
        }
    }
}
