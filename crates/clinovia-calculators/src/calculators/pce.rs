//! Pooled cohort equation coefficients.
//!
//! The table is a value, not code: [`PceTable::acc_aha_2013`] carries the
//! published 2013 ACC/AHA coefficients and [`PceTable::from_path`] loads a
//! replacement without touching the scoring logic.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CalculatorError;

/// Per-cohort coefficients on log-transformed risk factors. Absent terms
/// are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PceBetas {
    pub ln_age: f64,
    pub ln_age_sq: f64,
    pub ln_tc: f64,
    pub ln_age_ln_tc: f64,
    pub ln_hdl: f64,
    pub ln_age_ln_hdl: f64,
    pub ln_sbp_treated: f64,
    pub ln_age_ln_sbp_treated: f64,
    pub ln_sbp_untreated: f64,
    pub ln_age_ln_sbp_untreated: f64,
    pub smoker: f64,
    pub ln_age_smoker: f64,
    pub diabetes: f64,
}

impl PceBetas {
    fn values(&self) -> [f64; 13] {
        [
            self.ln_age,
            self.ln_age_sq,
            self.ln_tc,
            self.ln_age_ln_tc,
            self.ln_hdl,
            self.ln_age_ln_hdl,
            self.ln_sbp_treated,
            self.ln_age_ln_sbp_treated,
            self.ln_sbp_untreated,
            self.ln_age_ln_sbp_untreated,
            self.smoker,
            self.ln_age_smoker,
            self.diabetes,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PceCohort {
    /// 10-year baseline survival, S0.
    pub baseline_survival: f64,
    pub mean_linear_predictor: f64,
    pub betas: PceBetas,
}

/// Risk factors for one patient, in the units the equations expect
/// (years, mg/dL, mmHg).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PceFactors {
    pub age: f64,
    pub total_cholesterol: f64,
    pub hdl_cholesterol: f64,
    pub systolic_bp: f64,
    pub on_hypertension_treatment: bool,
    pub smoker: bool,
    pub diabetes: bool,
}

impl PceCohort {
    pub fn linear_predictor(&self, f: &PceFactors) -> f64 {
        let b = &self.betas;
        let ln_age = f.age.ln();
        let ln_tc = f.total_cholesterol.ln();
        let ln_hdl = f.hdl_cholesterol.ln();
        let ln_sbp = f.systolic_bp.ln();

        let mut lp = b.ln_age * ln_age
            + b.ln_age_sq * ln_age * ln_age
            + b.ln_tc * ln_tc
            + b.ln_age_ln_tc * ln_age * ln_tc
            + b.ln_hdl * ln_hdl
            + b.ln_age_ln_hdl * ln_age * ln_hdl;

        lp += if f.on_hypertension_treatment {
            b.ln_sbp_treated * ln_sbp + b.ln_age_ln_sbp_treated * ln_age * ln_sbp
        } else {
            b.ln_sbp_untreated * ln_sbp + b.ln_age_ln_sbp_untreated * ln_age * ln_sbp
        };

        if f.smoker {
            lp += b.smoker + b.ln_age_smoker * ln_age;
        }
        if f.diabetes {
            lp += b.diabetes;
        }
        lp
    }

    /// 10-year risk as a fraction in `[0, 1]`.
    pub fn ten_year_risk(&self, f: &PceFactors) -> f64 {
        let exponent = (self.linear_predictor(f) - self.mean_linear_predictor).exp();
        let risk = 1.0 - self.baseline_survival.powf(exponent);
        if risk.is_nan() { 0.0 } else { risk.clamp(0.0, 1.0) }
    }
}

/// Coefficients for the four sex/race cohorts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PceTable {
    pub white_female: PceCohort,
    pub black_female: PceCohort,
    pub white_male: PceCohort,
    pub black_male: PceCohort,
}

impl Default for PceTable {
    fn default() -> Self {
        Self::acc_aha_2013()
    }
}

impl PceTable {
    /// Goff et al., 2013 ACC/AHA Guideline on the Assessment of
    /// Cardiovascular Risk, Table A.
    pub fn acc_aha_2013() -> Self {
        Self {
            white_female: PceCohort {
                baseline_survival: 0.9665,
                mean_linear_predictor: -29.18,
                betas: PceBetas {
                    ln_age: -29.799,
                    ln_age_sq: 4.884,
                    ln_tc: 13.540,
                    ln_age_ln_tc: -3.114,
                    ln_hdl: -13.578,
                    ln_age_ln_hdl: 3.149,
                    ln_sbp_treated: 2.019,
                    ln_sbp_untreated: 1.957,
                    smoker: 7.574,
                    ln_age_smoker: -1.665,
                    diabetes: 0.661,
                    ..PceBetas::default()
                },
            },
            black_female: PceCohort {
                baseline_survival: 0.9533,
                mean_linear_predictor: 86.61,
                betas: PceBetas {
                    ln_age: 17.114,
                    ln_tc: 0.940,
                    ln_hdl: -18.920,
                    ln_age_ln_hdl: 4.475,
                    ln_sbp_treated: 29.291,
                    ln_age_ln_sbp_treated: -6.432,
                    ln_sbp_untreated: 27.820,
                    ln_age_ln_sbp_untreated: -6.087,
                    smoker: 0.691,
                    diabetes: 0.874,
                    ..PceBetas::default()
                },
            },
            white_male: PceCohort {
                baseline_survival: 0.9144,
                mean_linear_predictor: 61.18,
                betas: PceBetas {
                    ln_age: 12.344,
                    ln_tc: 11.853,
                    ln_age_ln_tc: -2.664,
                    ln_hdl: -7.990,
                    ln_age_ln_hdl: 1.769,
                    ln_sbp_treated: 1.797,
                    ln_sbp_untreated: 1.764,
                    smoker: 7.837,
                    ln_age_smoker: -1.795,
                    diabetes: 0.658,
                    ..PceBetas::default()
                },
            },
            black_male: PceCohort {
                baseline_survival: 0.8954,
                mean_linear_predictor: 19.54,
                betas: PceBetas {
                    ln_age: 2.469,
                    ln_tc: 0.302,
                    ln_hdl: -0.307,
                    ln_sbp_treated: 1.916,
                    ln_sbp_untreated: 1.809,
                    smoker: 0.549,
                    diabetes: 0.645,
                    ..PceBetas::default()
                },
            },
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CalculatorError> {
        let table: PceTable = serde_json::from_str(json)?;
        table.check()?;
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self, CalculatorError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Select the cohort for a sex/race pair. Races without their own
    /// published cohort use the white equations.
    pub fn cohort(&self, female: bool, black: bool) -> &PceCohort {
        match (female, black) {
            (true, true) => &self.black_female,
            (true, false) => &self.white_female,
            (false, true) => &self.black_male,
            (false, false) => &self.white_male,
        }
    }

    fn check(&self) -> Result<(), CalculatorError> {
        let cohorts = [
            ("white_female", &self.white_female),
            ("black_female", &self.black_female),
            ("white_male", &self.white_male),
            ("black_male", &self.black_male),
        ];
        for (name, cohort) in cohorts {
            let s0 = cohort.baseline_survival;
            if !(s0 > 0.0 && s0 < 1.0) {
                return Err(CalculatorError::InvalidCoefficients(format!(
                    "{name}: baseline_survival {s0} must be in (0, 1)"
                )));
            }
            if !cohort.mean_linear_predictor.is_finite()
                || cohort.betas.values().iter().any(|b| !b.is_finite())
            {
                return Err(CalculatorError::InvalidCoefficients(format!(
                    "{name}: coefficients must be finite"
                )));
            }
        }
        Ok(())
    }
}
