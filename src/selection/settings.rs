use crate::core::config::{ExportConfig, ExportSampling};

/// Output resolution and sampling chosen for the next export.
///
/// The resolution moves through a fixed ladder of steps and stops at either
/// end instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    steps: Vec<u32>,
    index: usize,
    pub sampling: ExportSampling,
}

impl ExportSettings {
    /// Starts at the configured resolution, or the nearest step to it
    pub fn from_config(config: &ExportConfig) -> Self {
        let mut steps = config.resolution_steps.clone();
        steps.retain(|step| *step > 0);
        steps.sort_unstable();
        steps.dedup();
        if steps.is_empty() {
            steps.push(config.resolution.max(1));
        }

        let index = steps
            .iter()
            .enumerate()
            .min_by_key(|(_, step)| step.abs_diff(config.resolution))
            .map_or(0, |(index, _)| index);

        Self {
            steps,
            index,
            sampling: config.sampling,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.steps[self.index]
    }

    pub fn steps(&self) -> &[u32] {
        &self.steps
    }

    /// Returns whether the resolution changed
    pub fn step_up(&mut self) -> bool {
        if self.index + 1 < self.steps.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn step_down(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn can_step_up(&self) -> bool {
        self.index + 1 < self.steps.len()
    }

    pub fn can_step_down(&self) -> bool {
        self.index > 0
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}
