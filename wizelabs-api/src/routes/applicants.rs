/// Internship pipeline
///
/// # Endpoints
///
/// - `POST  /v1/applicants`: apply (for yourself; admins may enter anyone)
/// - `GET   /v1/applicants`: admin search (q, status, page, per_page)
/// - `GET   /v1/applicants/:id`: the applicant themself or an admin
/// - `PATCH /v1/applicants/:id/status`: admin; follows the pipeline rules
/// - `PATCH /v1/applicants/:id/assignment`: admin; accepted applicants only
///
/// # Errors
///
/// - `409 Conflict`: duplicate application, or a transition out of a final status

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use wizelabs_shared::{
    auth::{
        authorization::{require_admin, AuthzError},
        middleware::AuthContext,
    },
    models::{
        applicant::{Applicant, ApplicantFilter, ApplicantStatus, CreateApplicant},
        normalize_email,
        profile::Profile,
        project::Project,
        Pagination,
    },
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateApplicantRequest {
    /// Defaults to the caller's email; only admins may set another
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 255, message = "First name must be 1-255 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255, message = "Last name must be 1-255 characters"))]
    pub last_name: String,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 100, message = "Country must be at most 100 characters"))]
    pub country: Option<String>,

    #[validate(length(max = 255, message = "University must be at most 255 characters"))]
    pub university: Option<String>,

    #[validate(length(max = 255, message = "Degree must be at most 255 characters"))]
    pub degree: Option<String>,

    #[validate(range(min = 1950, max = 2100, message = "Graduation year is out of range"))]
    pub graduation_year: Option<i32>,

    #[validate(url(message = "CV must be a valid URL"))]
    pub cv_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListApplicantsQuery {
    pub q: Option<String>,
    pub status: Option<ApplicantStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: ApplicantStatus,

    #[validate(length(max = 5000, message = "Notes must be at most 5000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub project_id: Option<Uuid>,
    pub mentor_id: Option<Uuid>,
}

async fn find_applicant(state: &AppState, id: Uuid) -> ApiResult<Applicant> {
    Applicant::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Applicant"))
}

pub async fn create_applicant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateApplicantRequest>,
) -> ApiResult<(StatusCode, Json<Applicant>)> {
    req.validate()?;

    let email = match req.email {
        Some(email) if normalize_email(&email) != normalize_email(&auth.email) => {
            require_admin(&auth)?;
            email
        }
        Some(email) => email,
        None => auth.email.clone(),
    };

    if Applicant::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("An application already exists for this email".to_string()));
    }

    let applicant = Applicant::create(
        &state.db,
        CreateApplicant {
            email,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            country: req.country,
            university: req.university,
            degree: req.degree,
            graduation_year: req.graduation_year,
            cv_url: req.cv_url,
        },
    )
    .await?;

    tracing::info!(applicant_id = %applicant.id, "Application received");

    Ok((StatusCode::CREATED, Json(applicant)))
}

pub async fn list_applicants(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListApplicantsQuery>,
) -> ApiResult<Json<Vec<Applicant>>> {
    require_admin(&auth)?;

    let filter = ApplicantFilter {
        q: query.q,
        status: query.status,
    };
    let defaults = Pagination::default();
    let page = Pagination::new(
        query.page.unwrap_or(defaults.page),
        query.per_page.unwrap_or(defaults.per_page),
    );

    Ok(Json(Applicant::search(&state.db, &filter, page).await?))
}

pub async fn get_applicant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Applicant>> {
    let applicant = find_applicant(&state, id).await?;

    if !auth.is_admin() && applicant.email != normalize_email(&auth.email) {
        return Err(AuthzError::NotAuthorized.into());
    }

    Ok(Json(applicant))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Applicant>> {
    require_admin(&auth)?;
    req.validate()?;

    let applicant = Applicant::transition(&state.db, id, req.status, req.notes.as_deref()).await??;

    tracing::info!(
        applicant_id = %id,
        status = applicant.status.as_str(),
        "Applicant status changed"
    );

    Ok(Json(applicant))
}

pub async fn update_assignment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAssignmentRequest>,
) -> ApiResult<Json<Applicant>> {
    require_admin(&auth)?;

    let applicant = find_applicant(&state, id).await?;
    if applicant.status != ApplicantStatus::Accepted {
        return Err(ApiError::Conflict(
            "Only accepted applicants can be assigned".to_string(),
        ));
    }

    if let Some(project_id) = req.project_id {
        if Project::find_by_id(&state.db, project_id).await?.is_none() {
            return Err(ApiError::not_found("Project"));
        }
    }
    if let Some(mentor_id) = req.mentor_id {
        if Profile::find_by_id(&state.db, mentor_id).await?.is_none() {
            return Err(ApiError::not_found("Mentor profile"));
        }
    }

    let applicant = Applicant::assign(&state.db, id, req.project_id, req.mentor_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Applicant"))?;

    Ok(Json(applicant))
}
