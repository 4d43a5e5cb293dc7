use actix_web::{web, HttpResponse};

use super::dto::{MedicineDto, MedicineListResponse, MedicineResponse};
use super::parse_id;
use crate::error::AppResult;
use crate::services::MedicineService;

pub async fn list_medicines(service: web::Data<MedicineService>) -> AppResult<HttpResponse> {
    let medicines: Vec<MedicineDto> = service
        .get_all_medicines()
        .await?
        .into_iter()
        .map(MedicineDto::from)
        .collect();

    Ok(HttpResponse::Ok().json(MedicineListResponse {
        total: medicines.len(),
        medicines,
    }))
}

pub async fn get_medicine(service: web::Data<MedicineService>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "medicine ID")?;
    let medicine = service.get_medicine_by_id(id).await?;
    Ok(HttpResponse::Ok().json(MedicineResponse {
        medicine: medicine.into(),
    }))
}
