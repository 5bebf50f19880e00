use std::time::Duration;

/// Identifier of a window owned by the window system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// Identifier of a texture allocated by the graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Texture sampling filter applied on minification and magnification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
}

/// One corner of a textured quad, in unit coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedVertex {
    pub tex: [f32; 2],
    pub pos: [f32; 2],
}

/// Full-viewport quad with the texture mapped corner to corner.
pub const UNIT_QUAD: [TexturedVertex; 4] = [
    TexturedVertex {
        tex: [0.0, 0.0],
        pos: [0.0, 0.0],
    },
    TexturedVertex {
        tex: [1.0, 0.0],
        pos: [1.0, 0.0],
    },
    TexturedVertex {
        tex: [1.0, 1.0],
        pos: [1.0, 1.0],
    },
    TexturedVertex {
        tex: [0.0, 1.0],
        pos: [0.0, 1.0],
    },
];

/// Settings for a viewer session.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Title of the window created by [`Viewer::open`](crate::Viewer::open).
    pub title: String,
    /// Cadence of the frames-per-second report.
    pub report_interval: Duration,
    /// Colour the framebuffer is cleared to before each frame.
    pub clear_color: [f32; 4],
    /// Synchronise buffer swaps with the display refresh.
    pub vsync: bool,
}

impl Default for ViewerConfig {
    /// Opaque black, one report per second, swaps as fast as possible.
    fn default() -> Self {
        Self {
            title: "sinoscope".to_string(),
            report_interval: Duration::from_millis(1000),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            vsync: false,
        }
    }
}

/// Everything the window system needs to create the viewer window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub title: String,
    pub position: (i32, i32),
    pub size: (u32, u32),
    pub vsync: bool,
}

/// Top-left position that centres a window of `window` size on `screen`.
///
/// Windows larger than the screen are pinned to the origin.
pub fn centered_position(screen: (u32, u32), window: (u32, u32)) -> (i32, i32) {
    let axis = |screen: u32, window: u32| {
        let offset = (i64::from(screen) - i64::from(window)) / 2;
        offset.clamp(0, i64::from(i32::MAX)) as i32
    };
    (axis(screen.0, window.0), axis(screen.1, window.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_window_on_screen() {
        assert_eq!(centered_position((1920, 1080), (800, 600)), (560, 240));
    }

    #[test]
    fn oversized_window_is_pinned_to_origin() {
        assert_eq!(centered_position((800, 600), (1024, 768)), (0, 0));
    }

    #[test]
    fn unit_quad_maps_texture_corners_to_matching_vertices() {
        for vertex in UNIT_QUAD {
            assert_eq!(vertex.tex, vertex.pos);
        }
        let corners: Vec<[f32; 2]> = UNIT_QUAD.iter().map(|vertex| vertex.pos).collect();
        assert_eq!(
            corners,
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
        );
    }
}
