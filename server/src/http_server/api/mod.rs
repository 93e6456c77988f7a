use axum::http::StatusCode;
use color_eyre::eyre::WrapErr;
use db::catalog::{RecipeFilter, RecipeStatus};
use serde::Deserialize;
use uuid::Uuid;

use super::{errors::WithStatus as _, ResponseResult};

pub(crate) mod comments;
pub(crate) mod keywords;
pub(crate) mod links;
pub(crate) mod recipes;
pub(crate) mod reference;
pub(crate) mod salads;
pub(crate) mod steps;

/// `?ingredients=<uuid,...>&types=<uuid,...>&min_rating=&status=&page=`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AvailabilityParams {
    ingredients: Option<String>,
    types: Option<String>,
    min_rating: Option<f64>,
    status: Option<RecipeStatus>,
    page: Option<i64>,
}

impl AvailabilityParams {
    pub(crate) fn into_filter(self) -> ResponseResult<(RecipeFilter, i64)> {
        let filter = RecipeFilter {
            available_ingredients: parse_ids("ingredients", self.ingredients.as_deref())?,
            salad_types: parse_ids("types", self.types.as_deref())?,
            min_rating: self.min_rating.unwrap_or(0.0),
            status: self.status.unwrap_or(RecipeStatus::Published),
        };

        Ok((filter, self.page.unwrap_or(1)))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageParams {
    pub page: Option<i64>,
}

/// Parses a comma separated id list. Missing or blank means "no constraint".
fn parse_ids(field: &str, raw: Option<&str>) -> ResponseResult<Vec<Uuid>> {
    let raw = raw.unwrap_or_default();

    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<Uuid>()
                .wrap_err_with(|| format!("Invalid id {id:?} in {field}"))
        })
        .collect::<Result<Vec<_>, _>>()
        .with_status(StatusCode::BAD_REQUEST)?;

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_id_lists_are_wildcards() {
        assert!(parse_ids("ingredients", None).unwrap().is_empty());
        assert!(parse_ids("ingredients", Some("")).unwrap().is_empty());
        assert!(parse_ids("ingredients", Some(" , ")).unwrap().is_empty());
    }

    #[test]
    fn id_lists_split_on_commas() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let ids = parse_ids("types", Some(&format!("{a}, {b}"))).unwrap();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn malformed_ids_are_bad_requests() {
        let err = parse_ids("types", Some("lettuce")).unwrap_err();
        assert_eq!(err.1, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn params_default_to_published_first_page() {
        let (filter, page) = AvailabilityParams::default().into_filter().unwrap();

        assert_eq!(page, 1);
        assert_eq!(filter.status, RecipeStatus::Published);
        assert!(filter.min_rating.abs() < f64::EPSILON);
    }
}
