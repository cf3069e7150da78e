use crate::{frame::Frame, observability::log_debug, option::TransformOptions};

/// Truncate every frame to its first `limit` rows, in place.
///
/// A `limit` of zero or less falls back to the configured default.
pub fn limit(frames: &mut [Frame], limit: i64, options: &TransformOptions) {
    let cap = options.limit_or_default(limit);
    for frame in frames.iter_mut() {
        let rows_in = frame.row_count();
        frame.truncate(cap);
        log_debug!(
            component = "limit",
            event = "limit_applied",
            frame = %frame.name,
            cap,
            rows_in,
            rows_out = frame.row_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frame::Field, value::Value};

    fn counting(name: &str, rows: usize) -> Frame {
        Frame::new(name)
            .with_field(Field::new_float64(
                "n",
                (0..rows).map(|n| Some(n as f64)).collect(),
            ))
            .with_field(Field::new_string(
                "label",
                (0..rows).map(|n| Some(format!("row {n}"))).collect(),
            ))
    }

    #[test]
    fn keeps_leading_rows_of_each_frame() {
        let mut frames = vec![counting("a", 5), counting("b", 2)];
        limit(&mut frames, 3, &TransformOptions::default());

        assert_eq!(frames[0].row_count(), 3);
        assert_eq!(frames[0].fields[1].len(), 3);
        assert_eq!(frames[0].fields[0].value(2), Value::Float(2.0));
        assert_eq!(frames[1].row_count(), 2);
    }

    #[test]
    fn non_positive_limit_uses_default() {
        let mut frames = vec![counting("a", 25)];
        limit(&mut frames, 0, &TransformOptions::default());
        assert_eq!(frames[0].row_count(), 10);

        let mut frames = vec![counting("a", 25)];
        limit(&mut frames, -4, &TransformOptions::default().default_limit(20));
        assert_eq!(frames[0].row_count(), 20);
    }
}
