// ── Command router ──
//
// Feature tag -> registered controllers, in registration order.

use std::collections::HashMap;

use dronesync_api::FeatureTag;

#[derive(Debug, Default)]
pub struct CommandRouter {
    routes: HashMap<FeatureTag, Vec<usize>>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register controller `index` for every tag in `features`.
    pub fn register(&mut self, index: usize, features: &[FeatureTag]) {
        for feature in features {
            let targets = self.routes.entry(*feature).or_default();
            if !targets.contains(&index) {
                targets.push(index);
            }
        }
    }

    /// Controllers interested in `feature`; empty when none registered.
    pub fn targets(&self, feature: FeatureTag) -> &[usize] {
        self.routes.get(&feature).map_or(&[], Vec::as_slice)
    }
}
