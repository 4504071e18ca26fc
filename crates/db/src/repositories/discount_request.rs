use sqlx::Row;

use abmdesk_core::domain::request::{
    AbmReview, AbmStatus, AdminOverlay, DiscountRequest, RequestId,
};
use abmdesk_core::review::UpdatePayload;

use super::{decode_err, format_timestamp, parse_timestamp, DiscountRequestRepository, RepositoryError};
use crate::DbPool;

const SELECT_COLUMNS: &str = "request_id, eligible, eligibility_reason, customer_id, customer_name,
    customer_contact, campaign_type, sku_id, sku_name, order_qty, discount_value, discount_type,
    reason, requested_by, requested_by_user_name, requested_by_contact, abm_id, abm_user_name,
    created_at, abm_status, abm_order_qty, abm_discount_value, abm_discount_type, abm_remarks,
    abm_reviewed_at, status, admin_status, admin_remarks, admin_discount_value,
    admin_discount_type";

pub struct SqlDiscountRequestRepository {
    pool: DbPool,
}

impl SqlDiscountRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_request(row: &sqlx::sqlite::SqliteRow) -> Result<DiscountRequest, RepositoryError> {
    let eligible: i64 = row.try_get("eligible").map_err(decode_err)?;
    let eligible = match eligible {
        0 => false,
        1 => true,
        other => return Err(RepositoryError::Decode(format!("eligible must be 0 or 1, got {other}"))),
    };

    let created_at: String = row.try_get("created_at").map_err(decode_err)?;
    let abm_status: Option<String> = row.try_get("abm_status").map_err(decode_err)?;
    let abm_reviewed_at: Option<String> = row.try_get("abm_reviewed_at").map_err(decode_err)?;

    let review = AbmReview {
        abm_status: abm_status
            .map(|value| value.parse::<AbmStatus>())
            .transpose()
            .map_err(decode_err)?,
        abm_order_qty: row.try_get("abm_order_qty").map_err(decode_err)?,
        abm_discount_value: row.try_get("abm_discount_value").map_err(decode_err)?,
        abm_discount_type: row.try_get("abm_discount_type").map_err(decode_err)?,
        abm_remarks: row.try_get("abm_remarks").map_err(decode_err)?,
        abm_reviewed_at: abm_reviewed_at
            .map(|value| parse_timestamp("abm_reviewed_at", &value))
            .transpose()?,
    };

    let admin = AdminOverlay {
        status: row.try_get("status").map_err(decode_err)?,
        admin_status: row.try_get("admin_status").map_err(decode_err)?,
        admin_remarks: row.try_get("admin_remarks").map_err(decode_err)?,
        admin_discount_value: row.try_get("admin_discount_value").map_err(decode_err)?,
        admin_discount_type: row.try_get("admin_discount_type").map_err(decode_err)?,
    };

    Ok(DiscountRequest {
        request_id: RequestId(row.try_get("request_id").map_err(decode_err)?),
        eligible,
        eligibility_reason: row.try_get("eligibility_reason").map_err(decode_err)?,
        customer_id: row.try_get("customer_id").map_err(decode_err)?,
        customer_name: row.try_get("customer_name").map_err(decode_err)?,
        customer_contact: row.try_get("customer_contact").map_err(decode_err)?,
        campaign_type: row.try_get("campaign_type").map_err(decode_err)?,
        sku_id: row.try_get("sku_id").map_err(decode_err)?,
        sku_name: row.try_get("sku_name").map_err(decode_err)?,
        order_qty: row.try_get("order_qty").map_err(decode_err)?,
        discount_value: row.try_get("discount_value").map_err(decode_err)?,
        discount_type: row.try_get("discount_type").map_err(decode_err)?,
        reason: row.try_get("reason").map_err(decode_err)?,
        requested_by: row.try_get("requested_by").map_err(decode_err)?,
        requested_by_user_name: row.try_get("requested_by_user_name").map_err(decode_err)?,
        requested_by_contact: row.try_get("requested_by_contact").map_err(decode_err)?,
        abm_id: row.try_get("abm_id").map_err(decode_err)?,
        abm_user_name: row.try_get("abm_user_name").map_err(decode_err)?,
        created_at: parse_timestamp("created_at", &created_at)?,
        review,
        admin,
    })
}

#[async_trait::async_trait]
impl DiscountRequestRepository for SqlDiscountRequestRepository {
    async fn list_for_reviewer(
        &self,
        abm_user_name: &str,
    ) -> Result<Vec<DiscountRequest>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS}
             FROM discount_request
             WHERE abm_user_name = ?
             ORDER BY created_at DESC, request_id DESC"
        ))
        .bind(abm_user_name)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_request).collect()
    }

    async fn insert(&self, request: DiscountRequest) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO discount_request (
                request_id, eligible, eligibility_reason, customer_id, customer_name,
                customer_contact, campaign_type, sku_id, sku_name, order_qty, discount_value,
                discount_type, reason, requested_by, requested_by_user_name,
                requested_by_contact, abm_id, abm_user_name, created_at, abm_status,
                abm_order_qty, abm_discount_value, abm_discount_type, abm_remarks,
                abm_reviewed_at, status, admin_status, admin_remarks, admin_discount_value,
                admin_discount_type
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                       ?, ?, ?, ?, ?)",
        )
        .bind(request.request_id.0)
        .bind(i64::from(request.eligible))
        .bind(&request.eligibility_reason)
        .bind(request.customer_id)
        .bind(&request.customer_name)
        .bind(&request.customer_contact)
        .bind(&request.campaign_type)
        .bind(request.sku_id)
        .bind(&request.sku_name)
        .bind(request.order_qty)
        .bind(request.discount_value)
        .bind(&request.discount_type)
        .bind(&request.reason)
        .bind(request.requested_by)
        .bind(&request.requested_by_user_name)
        .bind(&request.requested_by_contact)
        .bind(request.abm_id)
        .bind(&request.abm_user_name)
        .bind(format_timestamp(request.created_at))
        .bind(request.review.abm_status.map(|status| status.as_str()))
        .bind(request.review.abm_order_qty)
        .bind(request.review.abm_discount_value)
        .bind(&request.review.abm_discount_type)
        .bind(&request.review.abm_remarks)
        .bind(request.review.abm_reviewed_at.map(format_timestamp))
        .bind(&request.admin.status)
        .bind(&request.admin.admin_status)
        .bind(&request.admin.admin_remarks)
        .bind(request.admin.admin_discount_value)
        .bind(&request.admin.admin_discount_type)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn apply_review(&self, payload: &UpdatePayload) -> Result<u64, RepositoryError> {
        if payload.ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; payload.ids.len()].join(", ");
        let sql = format!(
            "UPDATE discount_request SET
                abm_status = ?,
                abm_order_qty = ?,
                abm_discount_type = ?,
                abm_discount_value = ?,
                abm_remarks = ?,
                abm_reviewed_by = ?,
                abm_reviewed_at = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             WHERE request_id IN ({placeholders})"
        );

        let mut query = sqlx::query(&sql)
            .bind(payload.abm_status.as_str())
            .bind(payload.abm_order_qty)
            .bind(&payload.abm_discount_type)
            .bind(payload.abm_discount_value)
            .bind(&payload.abm_remarks)
            .bind(&payload.abm_reviewed_by)
            .bind(format_timestamp(payload.abm_reviewed_at));
        for id in &payload.ids {
            query = query.bind(id.0);
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
