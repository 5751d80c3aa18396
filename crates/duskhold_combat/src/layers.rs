//! Collision Layers Constants
//!
//! Битовые маски слоёв для sweep casts, projectile collision и LOS raycasts.
//!
//! - **Layer:** на каком слое находится объект
//! - **Mask:** с какими слоями запрос пересекается
//!
//! Слой 1 (0b1) зарезервирован.

/// Layer 2: Actors (живые существа — players, NPCs)
pub const LAYER_ACTORS: u32 = 0b10;

/// Layer 3: Environment (стены, препятствия, terrain)
pub const LAYER_ENVIRONMENT: u32 = 0b100;

/// Layer 4: Projectiles (снаряды)
pub const LAYER_PROJECTILES: u32 = 0b1000;

/// Mask: melee sweep задевает только акторов
pub const MASK_MELEE_SWEEP: u32 = LAYER_ACTORS;

/// Mask: снаряды сталкиваются с акторами и окружением
///
/// НЕ сталкиваются с другими снарядами (слой 4 отсутствует в маске).
pub const MASK_PROJECTILES: u32 = LAYER_ACTORS | LAYER_ENVIRONMENT;

/// Mask: occlusion check для зрения (только окружение заслоняет)
pub const MASK_VISION_OCCLUDERS: u32 = LAYER_ENVIRONMENT;

/// Название слоя для debug логов
pub fn layer_name(layer_bits: u32) -> &'static str {
    match layer_bits {
        LAYER_ACTORS => "Actors",
        LAYER_ENVIRONMENT => "Environment",
        LAYER_PROJECTILES => "Projectiles",
        _ => "Mixed/Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_do_not_overlap_reserved_layer() {
        assert_eq!(MASK_MELEE_SWEEP & 0b1, 0);
        assert_eq!(MASK_PROJECTILES & 0b1, 0);
        assert_eq!(MASK_VISION_OCCLUDERS & 0b1, 0);
    }

    #[test]
    fn test_projectiles_ignore_each_other() {
        assert_eq!(MASK_PROJECTILES & LAYER_PROJECTILES, 0);
    }
}
