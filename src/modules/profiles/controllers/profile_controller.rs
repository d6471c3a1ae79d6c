use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::{ActionResult, Result};
use crate::middleware::auth::CurrentUser;
use crate::modules::profiles::models::ProfileForm;
use crate::modules::profiles::services::ProfileService;

/// GET /profile
pub async fn get_profile(
    service: web::Data<Arc<ProfileService>>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    let profile = service.get_or_create(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(ActionResult::success(profile)))
}

/// PUT /profile
pub async fn update_profile(
    service: web::Data<Arc<ProfileService>>,
    user: CurrentUser,
    form: web::Json<ProfileForm>,
) -> Result<HttpResponse> {
    let profile = service.update(&user.user_id, form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ActionResult::success(profile)))
}

/// GET /profile/invoice-defaults
pub async fn invoice_defaults(
    service: web::Data<Arc<ProfileService>>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    let defaults = service.invoice_defaults(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(ActionResult::success(defaults)))
}

/// Configure profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/profile")
            .route("", web::get().to(get_profile))
            .route("", web::put().to(update_profile))
            .route("/invoice-defaults", web::get().to(invoice_defaults)),
    );
}
