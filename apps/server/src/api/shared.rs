use academy_core::context::ActorContext;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

pub const ACADEMY_HEADER: &str = "x-academy-no";
pub const USER_HEADER: &str = "x-user-id";

/// The tenant and staff member a request acts for, taken from
/// `X-Academy-No` and the optional `X-User-Id` header.
pub struct Actor(pub ActorContext);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let academy_no = header(ACADEMY_HEADER)
            .ok_or_else(|| ApiError::BadRequest("Missing X-Academy-No header".to_string()))?;
        Ok(Actor(ActorContext::new(academy_no, header(USER_HEADER))))
    }
}

/// Splits a comma separated query value and parses each entry.
pub fn parse_list<T>(raw: Option<&str>) -> Result<Option<Vec<T>>, ApiError>
where
    T: std::str::FromStr<Err = academy_core::Error>,
{
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(T::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(values).filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::fees::ChallanStatus;

    #[test]
    fn parses_comma_separated_statuses() {
        let statuses = parse_list::<ChallanStatus>(Some("overdue, pending")).unwrap();
        assert_eq!(
            statuses,
            Some(vec![ChallanStatus::Overdue, ChallanStatus::Pending])
        );
    }

    #[test]
    fn separators_only_means_no_filter() {
        assert_eq!(parse_list::<ChallanStatus>(Some(",")).unwrap(), None);
        assert_eq!(parse_list::<ChallanStatus>(Some(" , ,")).unwrap(), None);
        assert_eq!(parse_list::<ChallanStatus>(None).unwrap(), None);
    }

    #[test]
    fn unknown_entry_is_rejected() {
        assert!(parse_list::<ChallanStatus>(Some("pending,settled")).is_err());
    }
}
