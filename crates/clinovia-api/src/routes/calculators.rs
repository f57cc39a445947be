use axum::Json;
use axum::extract::Path;
use serde::Serialize;

use clinovia_calculators::schema::FieldSpec;
use clinovia_calculators::{Calculator, all_calculators, get_calculator};
use clinovia_core::calculator::{CalculatorId, ClinicalDomain, StrategyKind};

use crate::API_PREFIX;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct CalculatorSummary {
    id: CalculatorId,
    name: String,
    domain: ClinicalDomain,
    strategy: StrategyKind,
    route: String,
    version: String,
    model_name: String,
    model_version: String,
}

#[derive(Serialize)]
pub struct CalculatorDetail {
    #[serde(flatten)]
    summary: CalculatorSummary,
    fields: Vec<FieldSpec>,
    /// Set for calculators that take a file upload instead of fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    upload_field: Option<&'static str>,
}

fn summary(calculator: &dyn Calculator) -> CalculatorSummary {
    let spec = calculator.id().spec();
    CalculatorSummary {
        id: spec.id,
        name: calculator.name().to_string(),
        domain: spec.domain,
        strategy: spec.strategy,
        route: format!("{API_PREFIX}{}", spec.route_path()),
        version: spec.version.to_string(),
        model_name: spec.provenance.model_name.to_string(),
        model_version: spec.provenance.model_version.to_string(),
    }
}

pub async fn list_calculators() -> Json<Vec<CalculatorSummary>> {
    let calculators: Vec<CalculatorSummary> = all_calculators()
        .iter()
        .map(|c| summary(c.as_ref()))
        .collect();
    Json(calculators)
}

pub async fn get_calculator_detail(
    Path(id): Path<String>,
) -> Result<Json<CalculatorDetail>, ApiError> {
    let id: CalculatorId = id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("calculator not found: {id}")))?;
    let calculator = get_calculator(id);

    Ok(Json(CalculatorDetail {
        summary: summary(calculator.as_ref()),
        fields: calculator.fields().to_vec(),
        upload_field: (id == CalculatorId::EfPrediction).then_some("video"),
    }))
}
