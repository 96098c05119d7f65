use crate::assets::AssetError;
use crate::constants::PROCEDURAL_MATCAP_SIZE;
use glam::Vec3;

/// RGBA8 image used as a matcap reflectance map.
#[derive(Clone, Debug, PartialEq)]
pub struct MatcapImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl MatcapImage {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(AssetError::MalformedImage {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn procedural_default() -> Self {
        Self::procedural(PROCEDURAL_MATCAP_SIZE)
    }

    /// Chrome-like studio matcap: cool ambient, a warm key light up-left and
    /// two hard specular spots. Texels outside the unit disc repeat the rim.
    pub fn procedural(size: u32) -> Self {
        let size = size.max(2);
        let key = Vec3::new(-0.45, 0.55, 0.7).normalize();
        let fill = Vec3::new(0.6, -0.3, 0.75).normalize();
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for py in 0..size {
            for px in 0..size {
                let x = (px as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                let y = 1.0 - (py as f32 + 0.5) / size as f32 * 2.0;
                let r2 = (x * x + y * y).min(1.0);
                let n = Vec3::new(x, y, (1.0 - r2).sqrt()).normalize_or_zero();

                let horizon = (0.5 + 0.5 * n.y).powf(1.5);
                let ambient = Vec3::new(0.10, 0.11, 0.14) + Vec3::splat(0.25) * horizon;
                let diffuse = Vec3::new(0.95, 0.90, 0.82) * n.dot(key).max(0.0) * 0.55
                    + Vec3::new(0.55, 0.65, 0.9) * n.dot(fill).max(0.0) * 0.25;
                let spec = n.dot(key).max(0.0).powf(60.0) * 1.6 + n.dot(fill).max(0.0).powf(90.0);

                let c = (ambient + diffuse + Vec3::splat(spec)).clamp(Vec3::ZERO, Vec3::ONE);
                rgba.extend_from_slice(&[
                    (c.x * 255.0).round() as u8,
                    (c.y * 255.0).round() as u8,
                    (c.z * 255.0).round() as u8,
                    255,
                ]);
            }
        }
        Self {
            width: size,
            height: size,
            rgba,
        }
    }
}
