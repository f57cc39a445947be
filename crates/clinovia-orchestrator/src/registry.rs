use std::collections::BTreeMap;
use std::sync::Arc;

use clinovia_calculators::calculators::{
    alzheimer, ascvd, bp_category, cha2ds2vasc, ecg, ejection_fraction, pce::PceTable,
    risk_screener,
};
use clinovia_calculators::{Calculator, RuleCalculator};
use clinovia_core::calculator::{CalculatorId, CalculatorSpec, StrategyKind};
use clinovia_inference::artifact::ArtifactStore;
use clinovia_inference::classifier::{Classifier, SoftmaxClassifier};
use clinovia_inference::ef::EfEstimator;
use clinovia_inference::normalize::LabelSet;

use crate::error::RegistryError;

/// How a calculator's validated input is turned into an output.
#[derive(Clone)]
pub enum Strategy {
    Rule(Arc<dyn RuleCalculator>),
    Classifier {
        classifier: Arc<dyn Classifier>,
        labels: LabelSet,
    },
    EjectionFraction(Arc<dyn EfEstimator>),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Rule(_) => StrategyKind::Rule,
            Strategy::Classifier { .. } | Strategy::EjectionFraction(_) => StrategyKind::Model,
        }
    }
}

/// One calculator's input table and its bound strategy.
#[derive(Clone)]
pub struct Registration {
    pub calculator: Arc<dyn Calculator>,
    pub strategy: Strategy,
}

impl Registration {
    pub fn spec(&self) -> CalculatorSpec {
        self.calculator.id().spec()
    }
}

/// Everything the standard strategies need from the outside.
pub struct Backends {
    pub pce_table: PceTable,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub ef: Arc<dyn EfEstimator>,
}

/// Maps every calculator in the catalog to exactly one strategy.
#[derive(Clone)]
pub struct StrategyRegistry {
    entries: BTreeMap<CalculatorId, Registration>,
}

impl StrategyRegistry {
    /// Bind every catalog entry to its production strategy.
    pub fn standard(backends: &Backends) -> Self {
        let entries = CalculatorId::ALL
            .into_iter()
            .map(|id| (id, standard_registration(id, backends)))
            .collect();
        Self { entries }
    }

    /// An empty registry. `verify` fails until every calculator is bound.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn register(mut self, registration: Registration) -> Self {
        self.entries
            .insert(registration.calculator.id(), registration);
        self
    }

    /// Swap the classifier behind a model calculator, keeping its input
    /// table and label set.
    pub fn with_classifier(mut self, id: CalculatorId, classifier: Arc<dyn Classifier>) -> Self {
        if let Some(Registration {
            strategy: Strategy::Classifier { classifier: c, .. },
            ..
        }) = self.entries.get_mut(&id)
        {
            *c = classifier;
        }
        self
    }

    pub fn with_ef_estimator(mut self, estimator: Arc<dyn EfEstimator>) -> Self {
        if let Some(reg) = self.entries.get_mut(&CalculatorId::EfPrediction) {
            reg.strategy = Strategy::EjectionFraction(estimator);
        }
        self
    }

    pub fn get(&self, id: CalculatorId) -> Option<&Registration> {
        self.entries.get(&id)
    }

    pub fn registrations(&self) -> impl Iterator<Item = &Registration> {
        self.entries.values()
    }

    /// Check that every catalog entry has exactly one registration, of the
    /// strategy kind its `CalculatorSpec` declares.
    pub fn verify(&self) -> Result<(), RegistryError> {
        for id in CalculatorId::ALL {
            let reg = self.entries.get(&id).ok_or(RegistryError::Missing(id))?;
            let declared = id.spec().strategy;
            let bound = reg.strategy.kind();
            if declared != bound {
                return Err(RegistryError::KindMismatch {
                    calculator: id,
                    declared,
                    bound,
                });
            }
        }
        Ok(())
    }
}

fn standard_registration(id: CalculatorId, backends: &Backends) -> Registration {
    match id {
        CalculatorId::Ascvd => rule(ascvd::Ascvd::new(backends.pce_table)),
        CalculatorId::BpCategory => rule(bp_category::BpCategoryRule),
        CalculatorId::Cha2ds2Vasc => rule(cha2ds2vasc::Cha2ds2Vasc),
        CalculatorId::EcgInterpreter => rule(ecg::EcgInterpreter),
        CalculatorId::AlzheimerRiskScreener => rule(risk_screener::RiskScreener),
        CalculatorId::EfPrediction => Registration {
            calculator: Arc::new(ejection_fraction::EfPrediction),
            strategy: Strategy::EjectionFraction(backends.ef.clone()),
        },
        CalculatorId::AlzheimerDiagnosisBasic => {
            model(alzheimer::DiagnosisBasic, LabelSet::Diagnosis, backends)
        }
        CalculatorId::AlzheimerDiagnosisExtended => {
            model(alzheimer::DiagnosisExtended, LabelSet::Diagnosis, backends)
        }
        CalculatorId::AlzheimerDiagnosisScreening => {
            model(alzheimer::DiagnosisScreening, LabelSet::Diagnosis, backends)
        }
        CalculatorId::AlzheimerPrognosis2yr => {
            model(alzheimer::Prognosis2yr, LabelSet::Prognosis, backends)
        }
        CalculatorId::AlzheimerPrognosis2yrExtended => {
            model(alzheimer::Prognosis2yrExtended, LabelSet::Prognosis, backends)
        }
    }
}

fn rule<C: RuleCalculator + 'static>(calculator: C) -> Registration {
    let calculator = Arc::new(calculator);
    Registration {
        calculator: calculator.clone(),
        strategy: Strategy::Rule(calculator),
    }
}

fn model<C: Calculator + 'static>(calculator: C, labels: LabelSet, backends: &Backends) -> Registration {
    let id = calculator.id();
    let version = id.spec().provenance.model_version;
    Registration {
        calculator: Arc::new(calculator),
        strategy: Strategy::Classifier {
            classifier: Arc::new(SoftmaxClassifier::new(id, version, backends.artifacts.clone())),
            labels,
        },
    }
}
