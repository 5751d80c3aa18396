//! Идентификация: стабильный uid + labels, Targetable capability
//!
//! Identity — поверхность entity/identity provider: уникальный id и список
//! ярлыков ("orcs", "guards", "undead"), по которым relation graph считает
//! отношение. Labels разделяются группами акторов, uid — нет.

use bevy::prelude::*;

/// Идентификация актора для relations/targeting
///
/// Автоматически добавляет Health через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(super::Health)]
pub struct Identity {
    /// Stable unique ID (не переиспользуется, выдаёт хост)
    pub uid: u64,
    /// Ярлыки группы/фракции ("orcs", "bandits", ...)
    pub labels: Vec<String>,
}

impl Identity {
    pub fn new(uid: u64) -> Self {
        Self {
            uid,
            labels: Vec::new(),
        }
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Targetable capability — entity можно выбрать целью
///
/// Читается targeting-подсистемой, мутирует только владелец
/// (enabled=false при смерти/неуязвимости/стелсе).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Targetable {
    pub enabled: bool,
    /// Bounding radius (метры) — грубый объём тела
    pub radius: f32,
    /// Смещение центра от origin (обычно вверх к торсу)
    pub center_offset: Vec3,
}

impl Default for Targetable {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 0.5,
            center_offset: Vec3::new(0.0, 0.9, 0.0),
        }
    }
}

impl Targetable {
    /// Мировой центр тела (точка прицеливания)
    pub fn center(&self, transform: &Transform) -> Vec3 {
        transform.translation + transform.rotation * self.center_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_labels() {
        let id = Identity::new(7).with_labels(["orcs", "raiders"]);
        assert!(id.has_label("orcs"));
        assert!(id.has_label("raiders"));
        assert!(!id.has_label("guards"));
    }

    #[test]
    fn test_targetable_center_offset() {
        let targetable = Targetable::default();
        let transform = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let center = targetable.center(&transform);
        assert_eq!(center, Vec3::new(1.0, 0.9, 0.0));
    }
}
