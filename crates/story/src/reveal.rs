//! Scroll-linked reveal progress.
//!
//! Both functions take positions in viewport coordinates (the element's top
//! edge relative to the top of the visible area) and return a fraction in
//! `[0, 1]` used to widen a clip rect over the plot.

/// Reveal of a chart element: starts when its top is 20% into the viewport
/// and completes after scrolling one element height further.
pub fn reveal_progress(viewport_height: f32, element_top: f32, element_height: f32) -> f32 {
    let start = viewport_height * 0.2;
    let end = start + element_height;
    progress(viewport_height - element_top - start, end - start)
}

/// Reveal of a whole section: starts as it enters from the bottom and
/// completes once the section has moved up past 40% of the viewport.
pub fn section_reveal_progress(viewport_height: f32, section_top: f32, section_height: f32) -> f32 {
    let start = viewport_height;
    let end = viewport_height * 0.4;
    let span = viewport_height + section_height - (start + (viewport_height - end));
    progress(viewport_height - section_top - start, span)
}

/// Hermite ease used on top of [`reveal_progress`].
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn progress(travelled: f32, span: f32) -> f32 {
    if span <= 0.0 || !span.is_finite() {
        return if travelled > 0.0 { 1.0 } else { 0.0 };
    }
    (travelled / span).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_before_and_after() {
        // element well below the fold
        assert_eq!(reveal_progress(1000.0, 2000.0, 400.0), 0.0);
        // element scrolled far past the top
        assert_eq!(reveal_progress(1000.0, -3000.0, 400.0), 1.0);
    }

    #[test]
    fn test_reveal_midway() {
        // travelled = 1000 - 600 - 200 = 200 of 400
        assert!((reveal_progress(1000.0, 600.0, 400.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_reveal_zero_height_element() {
        assert_eq!(reveal_progress(1000.0, 900.0, 0.0), 0.0);
        assert_eq!(reveal_progress(1000.0, 700.0, 0.0), 1.0);
    }

    #[test]
    fn test_section_reveal_range() {
        // span = 1000 + 500 - (1000 + 600) = -100: degenerate
        assert_eq!(section_reveal_progress(1000.0, 100.0, 500.0), 0.0);
        assert_eq!(section_reveal_progress(1000.0, -100.0, 500.0), 1.0);

        // span = 1000 + 1000 - 1600 = 400; travelled = -top
        assert_eq!(section_reveal_progress(1000.0, 0.0, 1000.0), 0.0);
        assert!((section_reveal_progress(1000.0, -200.0, 1000.0) - 0.5).abs() < 1e-6);
        assert_eq!(section_reveal_progress(1000.0, -900.0, 1000.0), 1.0);
    }

    #[test]
    fn test_progress_always_in_unit_range() {
        for top in (-3000..3000).step_by(97) {
            for height in [0.0, 50.0, 400.0, 2500.0] {
                let p = reveal_progress(900.0, top as f32, height);
                assert!((0.0..=1.0).contains(&p));
                let p = section_reveal_progress(900.0, top as f32, height);
                assert!((0.0..=1.0).contains(&p));
            }
        }
    }

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert!(smoothstep(0.25) < 0.25);
        assert!(smoothstep(0.75) > 0.75);
    }
}
