use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};

/// Upper bound of [`sample`]; values span `0..=VALUE_RANGE`.
pub(crate) const VALUE_RANGE: f32 = 200.0;

/// Per-frame field parameters, laid out to match the compute shader's
/// uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct FieldParams {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) order: u32,
    pub(crate) interval: u32,
    pub(crate) dx: f32,
    pub(crate) dy: f32,
    pub(crate) phase0: f32,
    pub(crate) phase1: f32,
    pub(crate) time: f32,
    pub(crate) _padding: [f32; 3],
}

/// Field value at pixel (`row`, `column`), in `0..=VALUE_RANGE`.
pub(crate) fn sample(params: &FieldParams, row: u32, column: u32) -> f32 {
    let px = params.dx * column as f32 - 2.0 * PI;
    let py = params.dy * row as f32 - 2.0 * PI;

    let mut value = 0.0f32;
    let mut k = 1;
    while k <= params.order {
        let kf = k as f32;
        value += (px * kf * params.phase1 + params.time).sin() / kf;
        value += (py * kf * params.phase0).cos() / kf;
        k += 2;
    }

    value = (value.atan() - (-value).atan()) / PI;
    (value + 1.0) * (VALUE_RANGE / 2.0)
}

/// Banded colour ramp: blue, cyan, green, yellow, red.
pub(crate) fn palette(value: f32, interval: u32) -> [u8; 3] {
    let interval = interval.max(1);
    let value = value.clamp(0.0, VALUE_RANGE) as u32;
    let x = ((value % interval) * 255 / interval) as u8;
    match value / interval {
        0 => [0, x, 255],
        1 => [0, 255, 255 - x],
        2 => [x, 255, 0],
        3 => [255, 255 - x, 0],
        _ => [255, 0, x],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(order: u32) -> FieldParams {
        FieldParams {
            width: 64,
            height: 48,
            order,
            interval: 50,
            dx: 4.0 * PI / 64.0,
            dy: 4.0 * PI / 48.0,
            phase0: 0.5,
            phase1: 0.75,
            time: 0.3,
            _padding: [0.0; 3],
        }
    }

    #[test]
    fn samples_stay_within_range() {
        for order in [1, 2, 7, 31] {
            let params = params(order);
            for row in (0..params.height).step_by(5) {
                for column in (0..params.width).step_by(5) {
                    let value = sample(&params, row, column);
                    assert!((0.0..=VALUE_RANGE).contains(&value), "{value}");
                }
            }
        }
    }

    #[test]
    fn even_orders_add_no_terms() {
        let odd = params(3);
        let even = params(4);
        assert_eq!(sample(&odd, 10, 20), sample(&even, 10, 20));
    }

    #[test]
    fn first_order_matches_closed_form() {
        let params = params(1);
        let px = params.dx * 5.0 - 2.0 * PI;
        let py = params.dy * 3.0 - 2.0 * PI;
        let series = (px * params.phase1 + params.time).sin() + (py * params.phase0).cos();
        let expected = (2.0 * series.atan() / PI + 1.0) * 100.0;
        assert!((sample(&params, 3, 5) - expected).abs() < 1e-3);
    }

    #[test]
    fn palette_walks_the_bands() {
        assert_eq!(palette(0.0, 50), [0, 0, 255]);
        assert_eq!(palette(50.0, 50), [0, 255, 255]);
        assert_eq!(palette(100.0, 50), [0, 255, 0]);
        assert_eq!(palette(150.0, 50), [255, 255, 0]);
        assert_eq!(palette(VALUE_RANGE, 50), [255, 0, 0]);
        assert_eq!(palette(-3.0, 50), palette(0.0, 50));
    }

    #[test]
    fn params_match_uniform_block_size() {
        assert_eq!(std::mem::size_of::<FieldParams>(), 48);
    }
}
