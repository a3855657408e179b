//! Map deformation.

use roam_core::{GridPos, GridRect, HeightMap, HeightSource, Result};

/// Dig a bowl-shaped crater of `depth` into the map around `centre`.
///
/// Returns the rectangle of corners that changed, clipped to the map, for
/// forwarding to the mesh, or `None` if the crater misses the map.
pub fn dig_crater(
    map: &mut HeightMap,
    centre: GridPos,
    radius: u32,
    depth: f32,
) -> Result<Option<GridRect>> {
    let r = radius as i32;
    let bounds = GridRect::new(centre.x - r, centre.z - r, centre.x + r, centre.z + r);
    let Some(rect) = bounds.intersection(&map.corner_rect()) else {
        return Ok(None);
    };

    let radius = radius.max(1) as f32;
    for pos in rect.positions() {
        let dx = (pos.x - centre.x) as f32;
        let dz = (pos.z - centre.z) as f32;
        let t = (dx * dx + dz * dz).sqrt() / radius;
        if t < 1.0 {
            let falloff = 1.0 - t * t;
            let height = map.corner_height(pos) - depth * falloff;
            map.set_height(pos, height)?;
        }
    }
    map.recompute_bounds();
    Ok(Some(rect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crater_lowers_centre_most() {
        let mut map = HeightMap::flat(32, 32, 10.0);
        let rect = dig_crater(&mut map, GridPos::new(16, 16), 4, 20.0)
            .unwrap()
            .unwrap();
        assert_eq!(rect, GridRect::new(12, 12, 20, 20));

        assert_eq!(map.corner_height(GridPos::new(16, 16)), -10.0);
        let near = map.corner_height(GridPos::new(17, 16));
        assert!(near > -10.0 && near < 10.0);
        assert_eq!(map.corner_height(GridPos::new(20, 16)), 10.0);
        assert_eq!(map.corner_height(GridPos::new(0, 0)), 10.0);
        assert_eq!(map.min_height(), -10.0);
    }

    #[test]
    fn crater_is_clipped_to_the_map() {
        let mut map = HeightMap::flat(8, 8, 0.0);
        let rect = dig_crater(&mut map, GridPos::new(0, 8), 3, 5.0)
            .unwrap()
            .unwrap();
        assert_eq!(rect, GridRect::new(0, 5, 3, 8));

        assert!(dig_crater(&mut map, GridPos::new(40, 40), 3, 5.0)
            .unwrap()
            .is_none());
    }
}
