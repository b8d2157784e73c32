use crate::math::Mat4;

use super::ConfigError;

/// Fixed-capacity bone transform table, updated once per animation frame.
///
/// Unset entries are identity. The capacity equals the kernel's `max_bones`,
/// so the whole table is uploaded as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct BonePalette {
    transforms: Vec<Mat4>,
}

impl BonePalette {
    pub fn new(capacity: u32) -> Self {
        Self {
            transforms: vec![Mat4::IDENTITY; capacity as usize],
        }
    }

    /// Sets bone `index`.
    pub fn set(&mut self, index: u32, transform: Mat4) -> Result<(), ConfigError> {
        let capacity = self.transforms.len();
        let slot = self
            .transforms
            .get_mut(index as usize)
            .ok_or(ConfigError::PaletteIndex { index, capacity })?;
        *slot = transform;
        Ok(())
    }

    /// Copies `transforms` into the leading slots; the rest are reset to identity.
    pub fn assign(&mut self, transforms: &[Mat4]) -> Result<(), ConfigError> {
        if transforms.len() > self.transforms.len() {
            return Err(ConfigError::PaletteCapacity {
                palette: transforms.len(),
                expected: self.transforms.len() as u32,
            });
        }
        let (head, tail) = self.transforms.split_at_mut(transforms.len());
        head.copy_from_slice(transforms);
        tail.fill(Mat4::IDENTITY);
        Ok(())
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<&Mat4> {
        self.transforms.get(index as usize)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Mat4] {
        &self.transforms
    }
}
