use rayon::prelude::*;

use crate::field::{palette, sample, FieldParams};

pub(crate) fn fill_serial(params: &FieldParams, buffer: &mut [u8]) {
    let row_bytes = params.width as usize * 3;
    for (row, line) in buffer.chunks_exact_mut(row_bytes).enumerate() {
        fill_row(params, row as u32, line);
    }
}

pub(crate) fn fill_parallel(params: &FieldParams, buffer: &mut [u8]) {
    let row_bytes = params.width as usize * 3;
    buffer
        .par_chunks_exact_mut(row_bytes)
        .enumerate()
        .for_each(|(row, line)| fill_row(params, row as u32, line));
}

fn fill_row(params: &FieldParams, row: u32, line: &mut [u8]) {
    for (column, pixel) in line.chunks_exact_mut(3).enumerate() {
        let value = sample(params, row, column as u32);
        pixel.copy_from_slice(&palette(value, params.interval));
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    #[test]
    fn parallel_rows_match_serial_rows() {
        let params = FieldParams {
            width: 37,
            height: 23,
            order: 9,
            interval: 50,
            dx: 4.0 * PI / 37.0,
            dy: 4.0 * PI / 23.0,
            phase0: 0.5,
            phase1: 0.75,
            time: 1.25,
            _padding: [0.0; 3],
        };
        let len = (params.width * params.height * 3) as usize;
        let mut serial = vec![0u8; len];
        let mut parallel = vec![0u8; len];

        fill_serial(&params, &mut serial);
        fill_parallel(&params, &mut parallel);

        assert_eq!(serial, parallel);
        assert!(serial.iter().any(|&byte| byte != 0));
    }
}
