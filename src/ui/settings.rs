use std::ops::RangeInclusive;

pub const RAM_STEP_MIB: u64 = 512;
pub const RAM_MIN_MIB: u64 = 1024;
/// Upper bound used while the machine's memory is unknown.
pub const RAM_FALLBACK_MAX_MIB: u64 = 8192;
pub const RAM_DEFAULT_MIB: u64 = 2048;

/// Memory allocation slider state. All values are MiB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RamSettings {
    total_mib: Option<u64>,
    usage_mib: u64,
}

impl Default for RamSettings {
    fn default() -> Self {
        Self {
            total_mib: None,
            usage_mib: RAM_DEFAULT_MIB,
        }
    }
}

impl RamSettings {
    pub fn set_total(&mut self, total_mib: u64) {
        self.total_mib = Some(total_mib);
        self.usage_mib = self.snap(self.usage_mib);
    }

    pub fn usage(&self) -> u64 {
        self.usage_mib
    }

    /// Store `mib`, snapped to the slider step and range.
    pub fn set_usage(&mut self, mib: u64) {
        self.usage_mib = self.snap(mib);
    }

    pub fn max_mib(&self) -> u64 {
        match self.total_mib {
            Some(total) if total > RAM_MIN_MIB => {
                (total / RAM_STEP_MIB * RAM_STEP_MIB).max(RAM_MIN_MIB)
            }
            _ => RAM_FALLBACK_MAX_MIB,
        }
    }

    pub fn range(&self) -> RangeInclusive<u64> {
        RAM_MIN_MIB..=self.max_mib()
    }

    /// Usage in GiB with one decimal, e.g. `2.5 GB`.
    pub fn label(&self) -> String {
        format!("{:.1} GB", self.usage_mib as f64 / 1024.0)
    }

    fn snap(&self, mib: u64) -> u64 {
        let rounded = (mib + RAM_STEP_MIB / 2) / RAM_STEP_MIB * RAM_STEP_MIB;
        rounded.clamp(RAM_MIN_MIB, self.max_mib())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_total_uses_fallback_range() {
        let ram = RamSettings::default();
        assert_eq!(ram.range(), 1024..=8192);
        assert_eq!(ram.usage(), 2048);
        assert_eq!(ram.label(), "2.0 GB");
    }

    #[test]
    fn tiny_totals_also_use_the_fallback() {
        let mut ram = RamSettings::default();
        ram.set_total(512);
        assert_eq!(ram.max_mib(), RAM_FALLBACK_MAX_MIB);
    }

    #[test]
    fn total_bounds_the_slider_on_step_boundaries() {
        let mut ram = RamSettings::default();
        ram.set_total(16_100);
        assert_eq!(ram.max_mib(), 15_872);

        ram.set_usage(40_000);
        assert_eq!(ram.usage(), 15_872);
        ram.set_usage(10);
        assert_eq!(ram.usage(), 1024);
        ram.set_usage(2_800);
        assert_eq!(ram.usage(), 2_560);
        assert_eq!(ram.label(), "2.5 GB");
        ram.set_usage(2_900);
        assert_eq!(ram.usage(), 3_072);
    }

    #[test]
    fn learning_total_reclamps_current_usage() {
        let mut ram = RamSettings::default();
        ram.set_usage(8192);
        ram.set_total(4096);
        assert_eq!(ram.usage(), 4096);
    }
}
