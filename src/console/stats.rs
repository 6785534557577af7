use actix_web::{Responder, get, web};

use super::models::AppState;
use super::text;
use crate::snapshot::View;

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    text(state.views.get(View::Stats))
}
