use chrono::NaiveDate;
use serde::Deserialize;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use super::{parse_enum, Pagination};
use crate::models::{
    InvoiceFilter, InvoiceMeta, InvoiceStatus, InvoiceType, LineItemInput, PartySnapshot,
    PaymentStatus,
};

/// Inline customer details, optionally carrying the id of an existing record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub details: PartySnapshot,
}

impl CustomerInput {
    pub fn parsed_id(&self) -> Option<Uuid> {
        self.id.as_deref().and_then(|id| Uuid::parse_str(id.trim()).ok())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCustomerRef {
    Id(String),
    Inline(CustomerInput),
}

/// How a request names its customer, decided once when the body is parsed.
///
/// A bare string that is not a UUID, an empty object, `null` or a missing
/// field all resolve to [`CustomerRef::Unresolved`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Option<RawCustomerRef>")]
pub enum CustomerRef {
    ById(Uuid),
    Inline(CustomerInput),
    #[default]
    Unresolved,
}

impl From<Option<RawCustomerRef>> for CustomerRef {
    fn from(raw: Option<RawCustomerRef>) -> Self {
        match raw {
            Some(RawCustomerRef::Id(id)) => Uuid::parse_str(id.trim())
                .map(CustomerRef::ById)
                .unwrap_or(CustomerRef::Unresolved),
            Some(RawCustomerRef::Inline(input)) => {
                if input.id.is_none() && input.details.is_empty() {
                    CustomerRef::Unresolved
                } else {
                    CustomerRef::Inline(input)
                }
            }
            None => CustomerRef::Unresolved,
        }
    }
}

/// Invoice header fields as sent by clients. Absent fields keep their current value on edit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceMetaInput {
    pub invoice_type: Option<InvoiceType>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub po_number: Option<String>,
    pub place_of_supply: Option<String>,
    pub place_of_delivery: Option<String>,
    pub notes: Option<String>,
}

impl InvoiceMetaInput {
    /// Overlay the supplied fields on `base`.
    pub fn applied_to(self, base: InvoiceMeta) -> InvoiceMeta {
        InvoiceMeta {
            invoice_type: self.invoice_type.unwrap_or(base.invoice_type),
            invoice_date: self.invoice_date.unwrap_or(base.invoice_date),
            due_date: self.due_date.or(base.due_date),
            po_number: self.po_number.or(base.po_number),
            place_of_supply: self.place_of_supply.or(base.place_of_supply),
            place_of_delivery: self.place_of_delivery.or(base.place_of_delivery),
            notes: self.notes.or(base.notes),
        }
    }

    /// Header of a new invoice dated `today` unless a date was supplied.
    pub fn into_meta(self, today: NaiveDate) -> InvoiceMeta {
        self.applied_to(InvoiceMeta {
            invoice_date: today,
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    #[serde(default, alias = "buyer")]
    pub customer: CustomerRef,
    #[serde(default)]
    pub items: Vec<LineItemInput>,
    #[serde(default)]
    pub ship_to: Option<PartySnapshot>,
    #[serde(flatten)]
    pub meta: InvoiceMetaInput,
}

/// Partial invoice edit. Omitted `items` means "recompute the existing lines".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    #[serde(default)]
    pub customer: CustomerRef,
    #[serde(default)]
    pub buyer: Option<PartySnapshot>,
    #[serde(default)]
    pub ship_to: Option<PartySnapshot>,
    #[serde(default)]
    pub seller: Option<PartySnapshot>,
    #[serde(default)]
    pub items: Option<Vec<LineItemInput>>,
    #[serde(flatten)]
    pub meta: InvoiceMetaInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    pub payment_status: String,
}

impl PaymentStatusRequest {
    pub fn parse(&self) -> Result<PaymentStatus, AppError> {
        self.payment_status
            .trim()
            .parse::<PaymentStatus>()
            .map_err(AppError::bad_request)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PdfSnapshotRequest {
    #[validate(length(min = 1, max = 2048))]
    pub url: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub generator: Option<String>,
}

/// `GET /invoices` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub customer_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl InvoiceListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            sort: self.sort.clone(),
        }
    }

    pub fn filter(&self) -> Result<InvoiceFilter, AppError> {
        Ok(InvoiceFilter {
            status: parse_enum::<InvoiceStatus>(self.status.as_deref())?,
            payment_status: parse_enum::<PaymentStatus>(self.payment_status.as_deref())?,
            customer_id: self.customer_id,
            from: self.from,
            to: self.to,
            exclude_void: false,
        })
    }
}
