/// Point colour inference and the elevation gradient fallback
use crate::bounds::GeodeticBounds;
use crate::progress::{PHASE_COLOURING, ProgressSink, report_interval};
use constants::render_settings::PROGRESS_STEPS;

/// Map normalised elevation onto a blue-cyan-green-yellow-red ramp.
pub fn elevation_colour(t: f32) -> [f32; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    if t < 0.25 {
        [0.0, t * 4.0, 1.0]
    } else if t < 0.5 {
        [0.0, 1.0, 1.0 - (t - 0.25) * 4.0]
    } else if t < 0.75 {
        [(t - 0.5) * 4.0, 1.0, 0.0]
    } else {
        [1.0, 1.0 - (t - 0.75) * 4.0, 0.0]
    }
}

/// Normalise a recorded RGB triple, or `None` when the gradient should be used.
///
/// All-zero channels count as "no colour recorded". Values above 255 mean the
/// writer used the full 16-bit range; otherwise the values are 8-bit.
pub fn infer_colour(rgb: Option<[u16; 3]>) -> Option<[f32; 3]> {
    let rgb = rgb?;
    if rgb == [0, 0, 0] {
        return None;
    }
    let scale = if rgb.iter().any(|&c| c > 255) {
        65535.0
    } else {
        255.0
    };
    Some(rgb.map(|c| f32::from(c) / scale))
}

/// Build the interleaved colour buffer for every retained point.
///
/// Returns the buffer and whether any point carried usable recorded colour.
/// Reports the second half (50-100%) of the decode progress range.
pub fn colourise(
    elevations: impl ExactSizeIterator<Item = f64>,
    raw_colours: &[Option<[u16; 3]>],
    bounds: &GeodeticBounds,
    progress: &dyn ProgressSink,
) -> (Vec<f32>, bool) {
    let total = elevations.len();
    let interval = report_interval(total as u64, PROGRESS_STEPS as u64) as usize;
    let mut colours = Vec::with_capacity(total * 3);
    let mut has_colour = false;

    for (i, (elevation, rgb)) in elevations.zip(raw_colours.iter()).enumerate() {
        let colour = match infer_colour(*rgb) {
            Some(colour) => {
                has_colour = true;
                colour
            }
            None => elevation_colour(bounds.normalize_elevation(elevation)),
        };
        colours.extend_from_slice(&colour);

        if i % interval == 0 {
            progress.report(50.0 + 50.0 * i as f32 / total as f32, PHASE_COLOURING);
        }
    }

    progress.report(100.0, PHASE_COLOURING);
    (colours, has_colour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use approx::assert_relative_eq;

    #[test]
    fn ramp_endpoints_and_knots() {
        assert_eq!(elevation_colour(0.0), [0.0, 0.0, 1.0]);
        assert_eq!(elevation_colour(0.25), [0.0, 1.0, 1.0]);
        assert_eq!(elevation_colour(0.5), [0.0, 1.0, 0.0]);
        assert_eq!(elevation_colour(0.75), [1.0, 1.0, 0.0]);
        assert_eq!(elevation_colour(1.0), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn ramp_clamps_out_of_range_input() {
        assert_eq!(elevation_colour(-3.0), elevation_colour(0.0));
        assert_eq!(elevation_colour(7.0), elevation_colour(1.0));
        assert_eq!(elevation_colour(f32::NAN), elevation_colour(0.0));
    }

    #[test]
    fn black_and_missing_colour_fall_back() {
        assert_eq!(infer_colour(None), None);
        assert_eq!(infer_colour(Some([0, 0, 0])), None);
    }

    #[test]
    fn bit_depth_is_inferred_from_channel_range() {
        let sixteen = infer_colour(Some([300, 0, 0])).unwrap();
        assert_relative_eq!(sixteen[0], 300.0 / 65535.0);
        let eight = infer_colour(Some([255, 128, 0])).unwrap();
        assert_relative_eq!(eight[0], 1.0);
        assert_relative_eq!(eight[1], 128.0 / 255.0);
    }

    #[test]
    fn colourise_mixes_recorded_and_gradient() {
        let mut bounds = GeodeticBounds::new();
        bounds.update(0.0, 0.0, 0.0);
        bounds.update(0.0, 0.0, 10.0);
        let raw = [Some([0, 0, 0]), Some([255, 0, 0]), None];
        let (colours, has_colour) =
            colourise([0.0, 5.0, 10.0].into_iter(), &raw, &bounds, &NoProgress);
        assert!(has_colour);
        assert_eq!(&colours[0..3], &[0.0, 0.0, 1.0]);
        assert_eq!(&colours[3..6], &[1.0, 0.0, 0.0]);
        assert_eq!(&colours[6..9], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn colourise_reports_the_upper_half() {
        use crate::progress::PHASE_COLOURING;
        use std::sync::Mutex;

        let mut bounds = GeodeticBounds::new();
        bounds.update(0.0, 0.0, 0.0);
        bounds.update(0.0, 0.0, 1000.0);
        let elevations: Vec<f64> = (0..1000).map(f64::from).collect();
        let raw = vec![None; elevations.len()];

        let reports = Mutex::new(Vec::new());
        let sink = |percent: f32, phase: &str| {
            reports.lock().unwrap().push((percent, phase.to_string()));
        };
        colourise(elevations.into_iter(), &raw, &bounds, &sink);

        let reports = reports.into_inner().unwrap();
        assert!(reports.len() > 2);
        assert_eq!(reports.first().unwrap().0, 50.0);
        assert_eq!(reports.last().unwrap().0, 100.0);
        assert!(reports.windows(2).all(|pair| pair[0].0 <= pair[1].0));
        assert!(reports.iter().all(|(percent, _)| (50.0..=100.0).contains(percent)));
        assert!(reports.iter().all(|(_, phase)| phase == PHASE_COLOURING));
    }
}
