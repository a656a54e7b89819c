use ws_world::{PreviewWorld, TileFlags};

/// Capture retries before giving up on a world that keeps coming out
/// black (a grid that never got any biome or elevation painted).
pub const MAX_CAPTURE_ATTEMPTS: u32 = 5;

const RIVER_COLOR: [u8; 3] = [52, 101, 164];
const LAKE_COLOR: [u8; 3] = [64, 120, 180];
const ANCIENT_ROAD_COLOR: [u8; 3] = [120, 96, 70];
const ROAD_COLOR: [u8; 3] = [168, 140, 100];
const SITE_COLOR: [u8; 3] = [130, 130, 130];

/// A CPU-side RGBA capture of a preview world, one pixel per tile.
#[derive(Debug, Clone)]
pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl PreviewImage {
    pub fn is_black(&self) -> bool {
        self.rgba
            .chunks_exact(4)
            .all(|px| px[0] == 0 && px[1] == 0 && px[2] == 0)
    }
}

/// Rasterize a finished world into an RGBA image.
///
/// Returns None for a world with no grid, or when the capture comes out
/// entirely black; the caller treats both as a failed capture and may
/// retry up to [`MAX_CAPTURE_ATTEMPTS`] times.
pub fn render_preview(world: &PreviewWorld) -> Option<PreviewImage> {
    if !world.has_grid() {
        return None;
    }

    let mut rgba = Vec::with_capacity(world.width * world.height * 4);
    for tile in &world.tiles {
        let base = tile
            .biome
            .and_then(|i| world.biome_palette.get(i as usize))
            .map(|entry| entry.color)
            .unwrap_or_else(|| elevation_gray(tile.elevation));

        let mut color = shade(base, tile.elevation);
        if tile.flags.contains(TileFlags::LAKE) {
            color = LAKE_COLOR;
        }
        if tile.flags.contains(TileFlags::RIVER) {
            color = RIVER_COLOR;
        }
        if tile.flags.contains(TileFlags::ANCIENT_ROAD) {
            color = ANCIENT_ROAD_COLOR;
        }
        if tile.flags.contains(TileFlags::ROAD) {
            color = ROAD_COLOR;
        }
        if tile.flags.contains(TileFlags::ANCIENT_SITE) {
            color = SITE_COLOR;
        }
        rgba.extend_from_slice(&[color[0], color[1], color[2], 255]);
    }

    let image = PreviewImage {
        width: world.width,
        height: world.height,
        rgba,
    };
    if image.is_black() {
        return None;
    }
    Some(image)
}

/// Fallback when a tile never got a biome: map elevation to a gray.
fn elevation_gray(elevation: f32) -> [u8; 3] {
    let v = ((elevation + 1.0) * 0.5).clamp(0.0, 1.0);
    let g = (40.0 + v * 180.0) as u8;
    [g, g, g]
}

/// Darken lowlands, lighten highlands, leaving sea untouched.
fn shade(base: [u8; 3], elevation: f32) -> [u8; 3] {
    if elevation < 0.0 {
        return base;
    }
    let factor = 0.85 + (elevation.clamp(0.0, 1.0) * 0.3);
    base.map(|c| ((c as f32 * factor).round() as u32).min(255) as u8)
}
