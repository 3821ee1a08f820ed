//! Count-up animation for stat counters.

pub const DEFAULT_DURATION_MS: f64 = 2000.0;

/// `1 - (1 - p)^3`, with `p` clamped to `0..=1`.
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Leading integer of `raw` the way `data-*` counters are written: optional
/// whitespace and sign, then digits; anything after the digits is ignored
/// (`"500+"` is 500, `"2.5"` is 2, `"1500ms"` is 1500).
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    rest[..digits].parse::<i64>().ok().map(|v| v * sign)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterFrame {
    pub value: i64,
    pub done: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct CounterAnimation {
    target: i64,
    duration_ms: f64,
    start_ms: f64,
}

impl CounterAnimation {
    pub fn new(target: i64, duration_ms: f64, start_ms: f64) -> Self {
        Self {
            target,
            duration_ms: duration_ms.max(0.0),
            start_ms,
        }
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn sample(&self, now_ms: f64) -> CounterFrame {
        let progress = if self.duration_ms > 0.0 {
            ((now_ms - self.start_ms) / self.duration_ms).min(1.0)
        } else {
            1.0
        };
        if progress >= 1.0 {
            return CounterFrame {
                value: self.target,
                done: true,
            };
        }
        CounterFrame {
            value: (ease_out_cubic(progress) * self.target as f64).floor() as i64,
            done: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_integer_ignores_trailing_text() {
        assert_eq!(parse_leading_int("500+"), Some(500));
        assert_eq!(parse_leading_int("2.5"), Some(2));
        assert_eq!(parse_leading_int(" 1500ms"), Some(1500));
        assert_eq!(parse_leading_int("-40%"), Some(-40));
        assert_eq!(parse_leading_int("12,500"), Some(12));
        assert_eq!(parse_leading_int("ms"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn keeps_its_target() {
        let anim = CounterAnimation::new(500, 1000.0, 0.0);
        assert_eq!(anim.target(), 500);
        assert_eq!(anim.sample(1000.0).value, anim.target());
    }

    #[test]
    fn easing_hits_both_ends() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn counts_up_monotonically_and_lands_on_target() {
        let counter = CounterAnimation::new(1234, 2000.0, 100.0);
        let mut last = 0;
        for step in 0..=40 {
            let frame = counter.sample(100.0 + f64::from(step) * 50.0);
            assert!(frame.value >= last);
            last = frame.value;
        }
        assert_eq!(
            counter.sample(2100.0),
            CounterFrame {
                value: 1234,
                done: true
            }
        );
    }

    #[test]
    fn halfway_shows_eased_value() {
        let counter = CounterAnimation::new(1000, 2000.0, 0.0);
        assert_eq!(counter.sample(1000.0).value, 875);
        assert!(!counter.sample(1000.0).done);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let counter = CounterAnimation::new(42, 0.0, 0.0);
        assert_eq!(counter.sample(0.0), CounterFrame { value: 42, done: true });
    }
}
