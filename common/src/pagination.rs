use crate::config::PagerConfig;

/// Which sheet is on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Pager {
    current: usize,
    total: usize,
    last_wheel_ms: Option<u64>,
    config: PagerConfig,
}

impl Pager {
    pub fn new(total: usize, config: PagerConfig) -> Self {
        Self {
            current: 0,
            total: total.max(1),
            last_wheel_ms: None,
            config,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn can_prev(&self) -> bool {
        self.current > 0
    }

    pub fn can_next(&self) -> bool {
        self.current + 1 < self.total
    }

    /// Returns whether the page changed.
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Returns whether the page changed.
    pub fn prev(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Jump to `index`, clamped to the last sheet.
    pub fn go_to(&mut self, index: usize) {
        self.current = index.min(self.total - 1);
    }

    /// Adopt a new sheet count after the date range changed.
    pub fn set_total(&mut self, total: usize) {
        self.total = total.max(1);
        if self.current >= self.total {
            tracing::debug!(
                "sheet {} no longer exists, clamping to {}",
                self.current + 1,
                self.total
            );
            self.current = self.total - 1;
        }
    }

    /// Page with the mouse wheel.
    ///
    /// Small deltas are ignored, and so is anything arriving within the
    /// debounce window of the last wheel event that turned a page. Returns
    /// whether the page changed.
    pub fn on_wheel(&mut self, delta_y: f64, now_ms: u64) -> bool {
        if let Some(last) = self.last_wheel_ms {
            if now_ms.saturating_sub(last) < self.config.wheel_debounce_ms {
                return false;
            }
        }
        if delta_y.abs() < self.config.wheel_noise {
            return false;
        }

        let moved = if delta_y > 0.0 { self.next() } else { self.prev() };
        if moved {
            self.last_wheel_ms = Some(now_ms);
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pager(total: usize) -> Pager {
        Pager::new(total, PagerConfig::default())
    }

    #[test]
    fn bounds_are_idempotent() {
        let mut p = pager(3);
        assert!(!p.prev());
        assert_eq!(p.current(), 0);

        assert!(p.next());
        assert!(p.next());
        assert!(!p.next());
        assert_eq!(p.current(), 2);
        assert!(!p.can_next());
        assert!(p.can_prev());
    }

    #[test]
    fn single_sheet_cannot_move() {
        let mut p = pager(0);
        assert_eq!(p.total(), 1);
        assert!(!p.next());
        assert!(!p.prev());
    }

    #[test]
    fn shrinking_total_clamps_current() {
        let mut p = pager(5);
        p.go_to(4);
        p.set_total(2);
        assert_eq!(p.current(), 1);
        p.set_total(8);
        assert_eq!(p.current(), 1);
        p.go_to(100);
        assert_eq!(p.current(), 7);
    }

    #[test]
    fn wheel_ignores_noise() {
        let mut p = pager(3);
        assert!(!p.on_wheel(9.9, 1_000));
        assert!(!p.on_wheel(-5.0, 2_000));
        assert_eq!(p.current(), 0);
    }

    #[test]
    fn wheel_is_debounced() {
        let mut p = pager(5);
        assert!(p.on_wheel(120.0, 1_000));
        assert!(!p.on_wheel(120.0, 1_200));
        assert!(!p.on_wheel(120.0, 1_399));
        assert_eq!(p.current(), 1);
        assert!(p.on_wheel(120.0, 1_400));
        assert_eq!(p.current(), 2);
        assert!(p.on_wheel(-40.0, 2_000));
        assert_eq!(p.current(), 1);
    }

    #[test]
    fn wheel_at_bound_does_not_start_debounce() {
        let mut p = pager(2);
        assert!(!p.on_wheel(-120.0, 1_000));
        assert!(p.on_wheel(120.0, 1_050));
        assert_eq!(p.current(), 1);
    }
}
