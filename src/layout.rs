use std::collections::BTreeMap;

/// Alert regions in top-to-bottom stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlertRegion {
  SpendingLimits,
  DueNotices,
  Thresholds,
}

/// Reserves vertical space so stacked alert regions never overlap.
///
/// Regions report their rendered height whenever it changes; a region that
/// is hidden reports zero or is removed.
#[derive(Debug, Clone)]
pub struct StackLayout {
  base_offset: f32,
  gap: f32,
  heights: BTreeMap<AlertRegion, f32>,
}

impl StackLayout {
  pub fn new(base_offset: f32, gap: f32) -> Self {
    Self {
      base_offset,
      gap,
      heights: BTreeMap::new(),
    }
  }

  /// Returns true when the offsets of regions below may have moved.
  pub fn report_height(&mut self, region: AlertRegion, height: f32) -> bool {
    if !height.is_finite() || height <= 0.0 {
      return self.remove(region);
    }
    self.heights.insert(region, height) != Some(height)
  }

  pub fn remove(&mut self, region: AlertRegion) -> bool {
    self.heights.remove(&region).is_some()
  }

  pub fn offset_for(&self, region: AlertRegion) -> f32 {
    self
      .heights
      .range(..region)
      .map(|(_, height)| height + self.gap)
      .fold(self.base_offset, |acc, step| acc + step)
  }

  pub fn total_height(&self) -> f32 {
    self.heights.values().map(|height| height + self.gap).sum()
  }
}

impl Default for StackLayout {
  fn default() -> Self {
    Self::new(16.0, 8.0)
  }
}
