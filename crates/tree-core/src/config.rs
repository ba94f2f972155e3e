use crate::error::SceneResult;
use crate::gallery::GalleryConfig;
use crate::gesture::GestureBindings;
use crate::layer::LayerConfig;
use crate::layout::TreeDims;
use crate::view::ViewConfig;

/// Everything needed to build a [`Scene`](crate::scene::Scene).
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub seed: u64,
    pub dims: TreeDims,
    pub layers: Vec<LayerConfig>,
    pub snow: LayerConfig,
    pub view: ViewConfig,
    pub gallery: GalleryConfig,
    pub bindings: GestureBindings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            dims: TreeDims::default(),
            layers: LayerConfig::tree_catalogue(),
            snow: LayerConfig::snow(),
            view: ViewConfig::default(),
            gallery: GalleryConfig::default(),
            bindings: GestureBindings::default(),
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> SceneResult<()> {
        for layer in &self.layers {
            layer.validate()?;
        }
        self.snow.validate()?;
        self.view.validate()?;
        self.gallery.validate()?;
        Ok(())
    }

    /// Same scene with every layer count divided by `factor` (at least one
    /// particle each).
    pub fn thinned(mut self, factor: usize) -> Self {
        let factor = factor.max(1);
        for layer in self.layers.iter_mut().chain(std::iter::once(&mut self.snow)) {
            layer.count = (layer.count / factor).max(1);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damping::DampRates;
    use crate::error::SceneError;

    #[test]
    fn default_config_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn negative_rate_is_caught() {
        let mut cfg = SceneConfig::default();
        cfg.layers[0].rates = DampRates {
            outward: -3.0,
            inward: 6.0,
        };
        assert!(matches!(cfg.validate(), Err(SceneError::InvalidRate { .. })));
    }

    #[test]
    fn thinning_keeps_every_layer() {
        let cfg = SceneConfig::default().thinned(1_000_000);
        assert!(cfg.layers.iter().all(|l| l.count == 1));
    }
}
