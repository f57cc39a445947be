pub mod alzheimer;
pub mod ascvd;
pub mod bp_category;
pub mod cha2ds2vasc;
pub mod ecg;
pub mod ejection_fraction;
pub mod pce;
pub mod risk_screener;
