use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{parse_coordinate, SearchQuery};
use crate::services::ProximitySearch;

/// Raw query string; coordinates are parsed leniently.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub range: Option<String>,
}

impl SearchParams {
    pub fn into_query(self) -> Result<SearchQuery> {
        let radius_km = match self.range.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<f64>()
                    .map_err(|_| AppError::BadRequest(format!("invalid range: {}", raw)))?,
            ),
        };

        Ok(SearchQuery {
            lat: parse_coordinate(self.lat.as_deref().unwrap_or_default()),
            lon: parse_coordinate(self.lon.as_deref().unwrap_or_default()),
            radius_km,
        })
    }
}

/// GET /search?lat=&lon=&range=
pub async fn search_posts(
    search: web::Data<ProximitySearch>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse> {
    let query = params.into_inner().into_query()?;
    let posts = search.search(query).await?;

    Ok(HttpResponse::Ok().json(posts))
}
