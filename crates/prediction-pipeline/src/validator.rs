//! Input Validation

use std::fmt;

use cultivation_schema::{FeatureVector, Parameter};
use serde::Serialize;

use crate::error::PipelineError;

/// A parameter outside the range the operator is offered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainWarning {
    pub field: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for DomainWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} value {} is outside the operator domain [{}, {}]",
            self.field, self.value, self.min, self.max
        )
    }
}

/// Checks applied to raw feature vectors before scaling
pub struct InputValidator;

impl InputValidator {
    /// Reject NaN and infinities, naming the first offending field
    pub fn check_finite(features: &FeatureVector) -> Result<(), PipelineError> {
        match features.iter().find(|(_, value)| !value.is_finite()) {
            Some((param, value)) => Err(PipelineError::InvalidInput {
                field: param.name(),
                value,
            }),
            None => Ok(()),
        }
    }

    /// Advisory range check; out-of-domain values are still predicted
    pub fn check_domain(features: &FeatureVector) -> Vec<DomainWarning> {
        features
            .out_of_domain()
            .into_iter()
            .map(|param: Parameter| {
                let (min, max) = param.domain();
                DomainWarning {
                    field: param.name(),
                    value: features.get(param),
                    min,
                    max,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_input_passes() {
        assert!(InputValidator::check_finite(&FeatureVector::default()).is_ok());
    }

    #[test]
    fn test_non_finite_names_field() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let v = FeatureVector {
                phosphorus_source: bad,
                ..Default::default()
            };
            match InputValidator::check_finite(&v) {
                Err(PipelineError::InvalidInput { field, .. }) => {
                    assert_eq!(field, "phosphorus_source")
                }
                other => panic!("unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_first_offender_reported() {
        let v = FeatureVector {
            temperature: f64::NAN,
            nacl: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            InputValidator::check_finite(&v),
            Err(PipelineError::InvalidInput { field: "temperature", .. })
        ));
    }

    #[test]
    fn test_domain_warnings() {
        let v = FeatureVector {
            light_intensity: 250.0,
            ..Default::default()
        };
        let warnings = InputValidator::check_domain(&v);
        assert_eq!(
            warnings,
            vec![DomainWarning {
                field: "light_intensity",
                value: 250.0,
                min: 0.0,
                max: 200.0,
            }]
        );
        assert!(warnings[0].to_string().contains("[0, 200]"));
        assert!(InputValidator::check_domain(&FeatureVector::default()).is_empty());
    }
}
