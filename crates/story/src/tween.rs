//! Time-based numeric transitions driven by the frame clock.

/// Cubic ease-in-out, symmetric around `t = 0.5`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

pub fn ease_cubic_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    CubicOut,
    CubicInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t.clamp(0.0, 1.0),
            Easing::CubicOut => ease_cubic_out(t),
            Easing::CubicInOut => ease_cubic_in_out(t),
        }
    }
}

/// A scalar moving from `from` to `to` over `duration` seconds starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start: f64,
    pub duration: f64,
    pub easing: Easing,
}

impl Tween {
    /// A tween already at rest on `value`.
    pub fn settled(value: f64) -> Self {
        Self {
            from: value,
            to: value,
            start: 0.0,
            duration: 0.0,
            easing: Easing::Linear,
        }
    }

    /// Fraction of the transition elapsed at `now`, before easing.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, now: f64) -> f64 {
        let t = self.easing.apply(self.progress(now));
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Restart toward `to` from wherever the tween currently is.
    pub fn retarget(&mut self, to: f64, now: f64, duration: f64, easing: Easing) {
        self.from = self.value_at(now);
        self.to = to;
        self.start = now;
        self.duration = duration;
        self.easing = easing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::CubicOut, Easing::CubicInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-12);
        assert!(ease_cubic_out(0.5) > 0.5);
    }

    #[test]
    fn test_tween_interpolates() {
        let tween = Tween {
            from: 2.0,
            to: 4.0,
            start: 10.0,
            duration: 0.8,
            easing: Easing::Linear,
        };
        assert_eq!(tween.value_at(9.0), 2.0);
        assert!((tween.value_at(10.4) - 3.0).abs() < 1e-9);
        assert_eq!(tween.value_at(11.0), 4.0);
        assert!(tween.is_finished(10.8));
        assert!(!tween.is_finished(10.5));
    }

    #[test]
    fn test_retarget_starts_from_current_value() {
        let mut tween = Tween {
            from: 0.0,
            to: 10.0,
            start: 0.0,
            duration: 1.0,
            easing: Easing::Linear,
        };
        tween.retarget(0.0, 0.5, 1.0, Easing::CubicInOut);
        assert!((tween.from - 5.0).abs() < 1e-9);
        assert_eq!(tween.value_at(0.5), 5.0);
        assert_eq!(tween.value_at(1.5), 0.0);
    }

    #[test]
    fn test_settled_tween_is_constant() {
        let tween = Tween::settled(7.25);
        assert_eq!(tween.value_at(0.0), 7.25);
        assert_eq!(tween.value_at(100.0), 7.25);
        assert!(tween.is_finished(0.0));
    }
}
