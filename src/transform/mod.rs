//! Frame transformations and the pipeline that applies them in order.
//!
//! Filter, summarize and merge build new frames and leave their input alone.
//! Limit and computed columns change their input frames in place.

mod computed;
mod filter;
mod limit;
mod merge;
mod summarize;

pub use computed::computed_columns;
pub use filter::filter;
pub use limit::limit;
pub use merge::merge;
pub use summarize::summarize;

use crate::{
    error::TransformError,
    expression::FrameBinder,
    frame::Frame,
    observability::{log_debug, log_warn},
    option::TransformOptions,
};

/// One computed column: the expression producing it and the name to give it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedColumn {
    /// Expression evaluated once per row. Blank selectors are skipped.
    pub selector: String,
    /// Output field name. Blank means the selector text is used.
    pub alias: String,
}

impl ComputedColumn {
    /// A computed column from its selector and alias.
    pub fn new(selector: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            alias: alias.into(),
        }
    }
}

/// A single pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    /// Keep the first `limit` rows of every frame.
    Limit {
        /// Row cap; zero or less means the configured default.
        limit: i64,
    },
    /// Keep the rows matching a predicate.
    Filter {
        /// Predicate evaluated once per row.
        expression: String,
    },
    /// Append computed fields.
    ComputedColumns {
        /// Columns to append, in order.
        columns: Vec<ComputedColumn>,
    },
    /// Reduce every frame to a one-row summary.
    ///
    /// `by` names grouping keys. Grouping is not supported: the keys are
    /// accepted and ignored.
    Summarize {
        /// Expression evaluated once over whole fields.
        expression: String,
        /// Name of the output field; blank means the configured name.
        alias: String,
        /// Grouping keys.
        by: Vec<String>,
    },
    /// Concatenate the whole batch into one frame.
    Merge,
}

impl Transformation {
    fn name(&self) -> &'static str {
        match self {
            Transformation::Limit { .. } => "limit",
            Transformation::Filter { .. } => "filter",
            Transformation::ComputedColumns { .. } => "computed_columns",
            Transformation::Summarize { .. } => "summarize",
            Transformation::Merge => "merge",
        }
    }
}

/// Apply `transformations` in order to every frame of `frames`.
///
/// A failing filter or summarize step leaves the batch as it was before that
/// step. A failing computed-columns step leaves the columns already appended.
/// A failing merge leaves the batch untouched.
pub fn apply_transformations(
    frames: &mut Vec<Frame>,
    transformations: &[Transformation],
    options: &TransformOptions,
) -> Result<(), TransformError> {
    for (step, transformation) in transformations.iter().enumerate() {
        log_debug!(
            component = "pipeline",
            event = "transformation_started",
            step,
            transformation = transformation.name(),
            frames = frames.len()
        );
        match transformation {
            Transformation::Limit { limit: cap } => limit(frames, *cap, options),
            Transformation::Filter { expression } => {
                let filtered = frames
                    .iter()
                    .map(|frame| filter(frame, expression, options))
                    .collect::<Result<Vec<_>, _>>()?;
                *frames = filtered;
            }
            Transformation::ComputedColumns { columns } => {
                for frame in frames.iter_mut() {
                    computed_columns(frame, columns, options)?;
                }
            }
            Transformation::Summarize {
                expression,
                alias,
                by,
            } => {
                if !by.is_empty() {
                    log_warn!(
                        component = "summarize",
                        event = "summarize_group_ignored",
                        by = ?by
                    );
                }
                let summaries = frames
                    .iter()
                    .map(|frame| summarize(frame, expression, alias, options))
                    .collect::<Result<Vec<_>, _>>()?;
                *frames = summaries;
            }
            Transformation::Merge => {
                let merged = merge(frames)?;
                *frames = vec![merged];
            }
        }
    }
    Ok(())
}

/// In strict mode, refuse frames holding columns that can only be bound as
/// opaque values.
fn check_recognized(
    binder: &FrameBinder<'_>,
    options: &TransformOptions,
) -> Result<(), TransformError> {
    if !options.is_strict() {
        return Ok(());
    }
    match binder.unrecognized_fields().next() {
        Some(field) => Err(TransformError::UnrecognizedType {
            field: field.name.clone(),
            data_type: field.data_type().clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{ErrorKind, SchemaError},
        frame::Field,
        value::Value,
    };

    fn cars(name: &str, horsepower: Vec<f64>) -> Frame {
        let cylinders = horsepower.iter().map(|hp| Some((hp / 25.0).round())).collect();
        Frame::new(name)
            .with_field(Field::new_float64(
                "Horsepower",
                horsepower.into_iter().map(Some).collect(),
            ))
            .with_field(Field::new_float64("Cylinders", cylinders))
    }

    #[test]
    fn steps_run_in_order() {
        let mut frames = vec![
            cars("a", vec![100.0, 200.0, 150.0]),
            cars("b", vec![50.0, 175.0]),
        ];
        apply_transformations(
            &mut frames,
            &[
                Transformation::Filter {
                    expression: "horsepower > 75".into(),
                },
                Transformation::ComputedColumns {
                    columns: vec![ComputedColumn::new(
                        "horsepower / cylinders",
                        "per_cylinder",
                    )],
                },
                Transformation::Merge,
                Transformation::Limit { limit: 3 },
                Transformation::Summarize {
                    expression: "count(per_cylinder)".into(),
                    alias: String::new(),
                    by: vec!["ignored".into()],
                },
            ],
            &TransformOptions::default(),
        )
        .unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].name, "a");
        assert_eq!(frames[0].fields[0].name, "summary");
        assert_eq!(frames[0].fields[0].value(0), Value::Float(3.0));
    }

    #[test]
    fn failing_filter_leaves_batch_unchanged() {
        let mut frames = vec![cars("a", vec![100.0]), cars("b", vec![50.0])];
        let err = apply_transformations(
            &mut frames,
            &[
                Transformation::Limit { limit: 1 },
                Transformation::Filter {
                    expression: "horsepower".into(),
                },
            ],
            &TransformOptions::default(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].row_count(), 1);
    }

    #[test]
    fn failing_merge_leaves_batch_unchanged() {
        let other =
            Frame::new("other").with_field(Field::new_float64("Torque", vec![Some(1.0)]));
        let mut frames = vec![cars("a", vec![100.0]), other];
        let err = apply_transformations(
            &mut frames,
            &[Transformation::Merge],
            &TransformOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TransformError::Schema(SchemaError::FieldCountMismatch { frame: 1, .. })
        ));
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn empty_pipeline_is_a_no_op() {
        let mut frames = vec![cars("a", vec![1.0, 2.0])];
        apply_transformations(&mut frames, &[], &TransformOptions::default()).unwrap();
        assert_eq!(frames[0].row_count(), 2);
    }
}
