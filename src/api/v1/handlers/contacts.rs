/*
 * Responsibility
 * - /contacts 系 handler (CRUD / 検索 / 集計 / 一括削除)
 * - 所有者は AuthCtx の principal だけから決まる (path / body / query の値は使わない)
 * - {id} は公開 ID (sqids)。他人の contact は存在しない contact と同じ 404
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::MessageResponse,
        dto::contacts::{
            ContactQuery, ContactRequest, ContactResponse, ContactStatsResponse, DeletedResponse,
            PagedResponse,
        },
        extractors::{AuthCtx, AuthCtxExtractor, PublicContactId},
    },
    error::AppError,
    repos::contact_repo::{ContactFilter, Page},
    state::AppState,
};

fn validation(m: &'static str) -> AppError {
    AppError::bad_request("VALIDATION_ERROR", m)
}

pub async fn create_contact(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    req.validate().map_err(validation)?;

    let contact = state.contacts.create(&ctx.principal, req.into_draft()).await?;
    let res = ContactResponse::from_contact(contact, &state.id_codec)?;

    Ok((StatusCode::CREATED, Json(res)))
}

async fn page_of(
    state: &AppState,
    ctx: &AuthCtx,
    filter: &ContactFilter,
    q: &ContactQuery,
) -> Result<Json<PagedResponse<ContactResponse>>, AppError> {
    let page_request = q.page_request().map_err(validation)?;
    let page = state
        .contacts
        .search(&ctx.principal, filter, page_request)
        .await?;

    let items = page
        .items
        .into_iter()
        .map(|c| ContactResponse::from_contact(c, &state.id_codec))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(PagedResponse::from(Page {
        items,
        page: page.page,
        size: page.size,
        total: page.total,
    })))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Query(q): Query<ContactQuery>,
) -> Result<Json<PagedResponse<ContactResponse>>, AppError> {
    page_of(&state, &ctx, &ContactFilter::default(), &q).await
}

pub async fn search_contacts(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Query(q): Query<ContactQuery>,
) -> Result<Json<PagedResponse<ContactResponse>>, AppError> {
    page_of(&state, &ctx, &q.filter(), &q).await
}

pub async fn get_contact(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    contact_id: PublicContactId,
) -> Result<Json<ContactResponse>, AppError> {
    let contact = state.contacts.get(&ctx.principal, contact_id.id).await?;
    Ok(Json(ContactResponse::from_contact(contact, &state.id_codec)?))
}

pub async fn update_contact(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    contact_id: PublicContactId,
    Json(req): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    req.validate().map_err(validation)?;

    let contact = state
        .contacts
        .update(&ctx.principal, contact_id.id, req.into_draft())
        .await?;
    Ok(Json(ContactResponse::from_contact(contact, &state.id_codec)?))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    contact_id: PublicContactId,
) -> Result<Json<MessageResponse>, AppError> {
    state.contacts.delete(&ctx.principal, contact_id.id).await?;
    Ok(Json(MessageResponse {
        message: "contact deleted",
    }))
}

pub async fn delete_all_contacts(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = state.contacts.delete_all(&ctx.principal).await?;
    Ok(Json(DeletedResponse { deleted }))
}

pub async fn contact_stats(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<ContactStatsResponse>, AppError> {
    let total_contacts = state.contacts.count(&ctx.principal).await?;
    Ok(Json(ContactStatsResponse { total_contacts }))
}
